//! Playwright browser automation
//!
//! A scenario keeps one browser page alive across all of its steps, so the
//! session runs a small Node.js driver for its whole lifetime. Commands and
//! replies are newline-delimited JSON over the driver's stdin/stdout:
//!
//! ```text
//! → {"id":3,"op":"fill","selector":"#user-message","value":"hello world"}
//! ← {"id":3,"ok":true,"value":null}
//! → {"id":4,"op":"click","selector":"#missing"}
//! ← {"id":4,"ok":false,"kind":"not_found","error":"Timeout 30000ms exceeded..."}
//! ```

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::page::{PageError, PageResult, PageSession, SessionLauncher};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Playwright's own timeout for each action and navigation
    pub timeout_ms: u64,

    /// Browser start-up allowance
    pub launch_timeout_ms: u64,

    /// Node.js executable
    pub node_binary: PathBuf,

    /// Directory holding the `playwright` package, exported as `NODE_PATH`
    pub node_path: Option<PathBuf>,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            timeout_ms: 30_000,
            launch_timeout_ms: 60_000,
            node_binary: PathBuf::from("node"),
            node_path: None,
        }
    }
}

impl PlaywrightConfig {
    /// Upper bound for one driver round trip. Playwright times out first, so
    /// this only fires when the driver itself hangs.
    fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms + 5_000)
    }
}

const DRIVER_SCRIPT: &str = r#"
const playwright = require('playwright');
const readline = require('readline');

const CONFIG = __CONFIG__;

const reply = (msg) => process.stdout.write(JSON.stringify(msg) + '\n');

function classify(op, error) {
  const message = String((error && error.message) || error);
  if (op === 'goto') return 'navigation';
  if (/not visible|not enabled|not editable|intercepts pointer events|not an <input>/i.test(message)) {
    return 'interaction';
  }
  if (error && error.name === 'TimeoutError') return 'not_found';
  return 'error';
}

(async () => {
  const browser = await playwright[CONFIG.browser].launch({ headless: CONFIG.headless });
  const context = await browser.newContext({
    viewport: { width: CONFIG.width, height: CONFIG.height },
  });
  const page = await context.newPage();
  page.setDefaultTimeout(CONFIG.timeout);
  page.setDefaultNavigationTimeout(CONFIG.timeout);

  reply({ id: 0, ok: true, value: null });

  const rl = readline.createInterface({ input: process.stdin });
  for await (const line of rl) {
    if (!line.trim()) continue;
    const cmd = JSON.parse(line);
    try {
      let value = null;
      switch (cmd.op) {
        case 'goto':
          await page.goto(cmd.url);
          break;
        case 'fill':
          await page.fill(cmd.selector, cmd.value);
          break;
        case 'click':
          await page.click(cmd.selector);
          break;
        case 'text_content':
          value = await page.textContent(cmd.selector);
          break;
        case 'close':
          await browser.close();
          reply({ id: cmd.id, ok: true, value: null });
          process.exit(0);
        default:
          throw new Error('unknown op ' + cmd.op);
      }
      reply({ id: cmd.id, ok: true, value });
    } catch (error) {
      reply({ id: cmd.id, ok: false, kind: classify(cmd.op, error), error: String(error.message || error) });
    }
  }
  await browser.close();
})().catch((error) => {
  console.error(error && error.stack ? error.stack : String(error));
  process.exit(1);
});
"#;

#[derive(Serialize)]
struct DriverConfig {
    browser: &'static str,
    headless: bool,
    width: u32,
    height: u32,
    timeout: u64,
}

/// Build the Node.js driver script for a configuration
pub fn build_driver_script(config: &PlaywrightConfig) -> E2eResult<String> {
    let driver_config = serde_json::to_string(&DriverConfig {
        browser: config.browser.as_str(),
        headless: config.headless,
        width: config.viewport_width,
        height: config.viewport_height,
        timeout: config.timeout_ms,
    })?;
    Ok(DRIVER_SCRIPT.replace("__CONFIG__", &driver_config))
}

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum DriverOp<'a> {
    Goto { url: &'a str },
    Fill { selector: &'a str, value: &'a str },
    Click { selector: &'a str },
    TextContent { selector: &'a str },
    Close,
}

impl DriverOp<'_> {
    fn describe(&self) -> String {
        match self {
            DriverOp::Goto { url } => format!("goto {url}"),
            DriverOp::Fill { selector, .. } => format!("fill {selector}"),
            DriverOp::Click { selector } => format!("click {selector}"),
            DriverOp::TextContent { selector } => format!("text_content {selector}"),
            DriverOp::Close => "close".to_string(),
        }
    }

    fn target(&self) -> &str {
        match self {
            DriverOp::Goto { url } => url,
            DriverOp::Fill { selector, .. }
            | DriverOp::Click { selector }
            | DriverOp::TextContent { selector } => selector,
            DriverOp::Close => "",
        }
    }
}

#[derive(Serialize)]
struct DriverCommand<'a> {
    id: u64,
    #[serde(flatten)]
    op: &'a DriverOp<'a>,
}

#[derive(Debug, Deserialize)]
struct DriverReply {
    id: u64,
    ok: bool,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl DriverReply {
    fn into_result(self, op: &DriverOp<'_>, timeout_ms: u64) -> PageResult<Option<String>> {
        if self.ok {
            return Ok(self.value);
        }

        let reason = self.error.unwrap_or_else(|| "unknown driver error".to_string());
        let target = op.target().to_string();
        Err(match self.kind.as_deref() {
            Some("not_found") => PageError::ElementNotFound { selector: target },
            Some("interaction") => PageError::Interaction {
                selector: target,
                reason,
            },
            Some("navigation") => PageError::Navigation { url: target, reason },
            Some("timeout") => PageError::Timeout {
                operation: op.describe(),
                ms: timeout_ms,
            },
            _ => PageError::Driver(reason),
        })
    }
}

fn driver_io(err: std::io::Error) -> PageError {
    PageError::Driver(err.to_string())
}

/// A live browser page driven through Playwright
pub struct PlaywrightSession {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    timeout_ms: u64,
    command_timeout: Duration,
    closed: bool,

    // Holds driver.js on disk while node runs it
    _script_dir: tempfile::TempDir,
}

impl PlaywrightSession {
    /// Start a browser and open a page.
    ///
    /// Does not run [`Self::check_playwright_installed`]; callers check once
    /// up front.
    pub async fn launch(config: &PlaywrightConfig) -> E2eResult<Self> {
        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("driver.js");
        std::fs::write(&script_path, build_driver_script(config)?)?;

        debug!("Starting Playwright driver: {}", script_path.display());

        let mut cmd = TokioCommand::new(&config.node_binary);
        cmd.arg(&script_path)
            .current_dir(script_dir.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(node_path) = &config.node_path {
            cmd.env("NODE_PATH", node_path);
        }

        let mut child = cmd.spawn().map_err(|e| {
            E2eError::Playwright(format!(
                "Failed to spawn {}: {}",
                config.node_binary.display(),
                e
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Playwright("driver stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Playwright("driver stdout unavailable".to_string()))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    warn!("[playwright] {}", line);
                }
            });
        }

        let mut session = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 0,
            timeout_ms: config.timeout_ms,
            command_timeout: config.command_timeout(),
            closed: false,
            _script_dir: script_dir,
        };

        session
            .await_reply(0, "launch", Duration::from_millis(config.launch_timeout_ms))
            .await
            .map_err(|e| E2eError::Playwright(format!("Browser failed to start: {e}")))?;

        info!(
            "Playwright {} page ready ({}x{}, headless: {})",
            config.browser.as_str(),
            config.viewport_width,
            config.viewport_height,
            config.headless
        );
        Ok(session)
    }

    /// Fail with [`E2eError::PlaywrightNotFound`] unless `npx playwright` runs.
    pub fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    async fn request(&mut self, op: DriverOp<'_>) -> PageResult<Option<String>> {
        if self.closed {
            return Err(PageError::Closed);
        }

        self.next_id += 1;
        let id = self.next_id;
        let mut line = serde_json::to_string(&DriverCommand { id, op: &op })
            .map_err(|e| PageError::Driver(e.to_string()))?;
        debug!("→ driver {}", line);
        line.push('\n');

        self.stdin.write_all(line.as_bytes()).await.map_err(driver_io)?;
        self.stdin.flush().await.map_err(driver_io)?;

        let reply = self
            .await_reply(id, &op.describe(), self.command_timeout)
            .await?;
        reply.into_result(&op, self.timeout_ms)
    }

    /// Read driver output until the reply for `id` arrives.
    async fn await_reply(&mut self, id: u64, operation: &str, limit: Duration) -> PageResult<DriverReply> {
        let stdout = &mut self.stdout;
        let read = async {
            loop {
                let Some(line) = stdout.next_line().await.map_err(driver_io)? else {
                    return Err(PageError::Driver("driver exited".to_string()));
                };
                match serde_json::from_str::<DriverReply>(&line) {
                    Ok(reply) if reply.id == id => return Ok(reply),
                    Ok(reply) => debug!("Ignoring stale driver reply {}", reply.id),
                    Err(_) => debug!("[playwright] {}", line),
                }
            }
        };

        timeout(limit, read).await.map_err(|_| PageError::Timeout {
            operation: operation.to_string(),
            ms: limit.as_millis() as u64,
        })?
    }
}

#[async_trait]
impl PageSession for PlaywrightSession {
    async fn goto(&mut self, url: &str) -> PageResult<()> {
        self.request(DriverOp::Goto { url }).await.map(|_| ())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> PageResult<()> {
        self.request(DriverOp::Fill { selector, value }).await.map(|_| ())
    }

    async fn click(&mut self, selector: &str) -> PageResult<()> {
        self.request(DriverOp::Click { selector }).await.map(|_| ())
    }

    async fn text_content(&mut self, selector: &str) -> PageResult<Option<String>> {
        self.request(DriverOp::TextContent { selector }).await
    }

    async fn close(&mut self) -> PageResult<()> {
        if self.closed {
            return Ok(());
        }

        let result = self.request(DriverOp::Close).await.map(|_| ());
        self.closed = true;

        match timeout(Duration::from_secs(5), self.child.wait()).await {
            Ok(Ok(status)) => debug!("Playwright driver exited: {}", status),
            _ => {
                warn!("Playwright driver did not exit, killing it");
                self.child.kill().await.map_err(driver_io)?;
            }
        }
        result
    }
}

/// Launches one Playwright page per scenario
#[derive(Debug, Clone, Default)]
pub struct PlaywrightLauncher {
    config: PlaywrightConfig,
}

impl PlaywrightLauncher {
    pub fn new(config: PlaywrightConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionLauncher for PlaywrightLauncher {
    async fn launch(&self) -> E2eResult<Box<dyn PageSession>> {
        let session = PlaywrightSession::launch(&self.config).await?;
        Ok(Box::new(session))
    }

    fn describe(&self) -> String {
        format!("playwright {}", self.config.browser.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_launch_reports_spawn_failure_without_install_check() {
        let config = PlaywrightConfig {
            node_binary: PathBuf::from("/nonexistent/formcheck-node"),
            ..Default::default()
        };
        match PlaywrightSession::launch(&config).await {
            Err(E2eError::Playwright(message)) => {
                assert!(message.contains("Failed to spawn"), "{message}")
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("launch should fail without a node binary"),
        }
    }

    #[test]
    fn test_driver_script_embeds_config() {
        let config = PlaywrightConfig {
            browser: Browser::Firefox,
            headless: false,
            timeout_ms: 1234,
            ..Default::default()
        };
        let script = build_driver_script(&config).unwrap();
        assert!(!script.contains("__CONFIG__"));
        assert!(script.contains(
            r#"const CONFIG = {"browser":"firefox","headless":false,"width":1280,"height":720,"timeout":1234};"#
        ));
        for op in ["'goto'", "'fill'", "'click'", "'text_content'", "'close'"] {
            assert!(script.contains(op), "driver handles {op}");
        }
    }

    #[test]
    fn test_command_wire_format() {
        let op = DriverOp::Fill {
            selector: "#user-message",
            value: "it's \"quoted\"",
        };
        let json = serde_json::to_value(DriverCommand { id: 7, op: &op }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "op": "fill",
                "selector": "#user-message",
                "value": "it's \"quoted\"",
            })
        );

        let json = serde_json::to_value(DriverCommand {
            id: 8,
            op: &DriverOp::TextContent { selector: "#message" },
        })
        .unwrap();
        assert_eq!(json["op"], "text_content");
    }

    fn reply(json: &str) -> DriverReply {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_successful_replies() {
        let op = DriverOp::TextContent { selector: "#message" };
        assert_eq!(
            reply(r#"{"id":1,"ok":true,"value":"hello world"}"#)
                .into_result(&op, 100)
                .unwrap(),
            Some("hello world".to_string())
        );
        assert_eq!(
            reply(r#"{"id":1,"ok":true,"value":null}"#)
                .into_result(&op, 100)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_failure_replies_map_to_page_errors() {
        let click = DriverOp::Click { selector: "#showInput" };
        assert_eq!(
            reply(r#"{"id":2,"ok":false,"kind":"not_found","error":"Timeout 30000ms exceeded"}"#)
                .into_result(&click, 30_000)
                .unwrap_err(),
            PageError::ElementNotFound {
                selector: "#showInput".into()
            }
        );
        assert_eq!(
            reply(r#"{"id":2,"ok":false,"kind":"interaction","error":"element is not visible"}"#)
                .into_result(&click, 30_000)
                .unwrap_err(),
            PageError::Interaction {
                selector: "#showInput".into(),
                reason: "element is not visible".into()
            }
        );
        assert_eq!(
            reply(r#"{"id":2,"ok":false,"kind":"timeout"}"#)
                .into_result(&click, 30_000)
                .unwrap_err(),
            PageError::Timeout {
                operation: "click #showInput".into(),
                ms: 30_000
            }
        );

        let goto = DriverOp::Goto { url: "https://invalid.test/" };
        assert!(matches!(
            reply(r#"{"id":3,"ok":false,"kind":"navigation","error":"net::ERR_NAME_NOT_RESOLVED"}"#)
                .into_result(&goto, 30_000)
                .unwrap_err(),
            PageError::Navigation { .. }
        ));
        assert_eq!(
            reply(r#"{"id":3,"ok":false,"error":"boom"}"#)
                .into_result(&goto, 30_000)
                .unwrap_err(),
            PageError::Driver("boom".into())
        );
    }

    #[test]
    fn test_config_from_toml_fills_defaults() {
        let config: PlaywrightConfig = toml::from_str(
            r#"
browser = "webkit"
timeout_ms = 5000
"#,
        )
        .unwrap();
        assert_eq!(config.browser, Browser::Webkit);
        assert_eq!(config.timeout_ms, 5000);
        assert!(config.headless);
        assert_eq!(config.command_timeout(), Duration::from_millis(10_000));
    }
}
