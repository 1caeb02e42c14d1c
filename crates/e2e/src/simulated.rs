//! In-memory stand-in for the message form page
//!
//! Models the three elements the form scenario touches: the message input,
//! the submit control and the element that echoes the submitted message.
//! Every call is appended to an operation log shared between clones, so a
//! test can keep one handle while the runner owns another.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::E2eResult;
use crate::form_steps::FormTarget;
use crate::page::{PageError, PageResult, PageSession, SessionLauncher};

/// One call made against a simulated page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOp {
    Goto(String),
    Fill { selector: String, value: String },
    Click(String),
    TextContent(String),
    Close,
}

type Render = Arc<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Debug, Default)]
struct PageState {
    url: Option<String>,
    input: String,
    display: Option<String>,
    ops: Vec<PageOp>,
    closed: bool,
}

#[derive(Clone)]
pub struct SimulatedPage {
    target: FormTarget,
    render: Render,
    submit_disabled: bool,
    state: Arc<Mutex<PageState>>,
}

impl std::fmt::Debug for SimulatedPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedPage")
            .field("target", &self.target)
            .field("submit_disabled", &self.submit_disabled)
            .field("state", &*self.state.lock())
            .finish()
    }
}

impl SimulatedPage {
    /// A page that echoes the submitted message unchanged.
    pub fn new(target: FormTarget) -> Self {
        Self {
            target,
            render: Arc::new(str::to_string),
            submit_disabled: false,
            state: Arc::new(Mutex::new(PageState::default())),
        }
    }

    /// Transform the submitted message before it is displayed.
    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.render = Arc::new(render);
        self
    }

    /// Make the submit control present but not clickable.
    pub fn with_submit_disabled(mut self) -> Self {
        self.submit_disabled = true;
        self
    }

    /// Same behaviour, new empty state.
    pub fn fresh(&self) -> Self {
        Self {
            state: Arc::new(Mutex::new(PageState::default())),
            ..self.clone()
        }
    }

    /// Operations performed so far, in call order.
    pub fn ops(&self) -> Vec<PageOp> {
        self.state.lock().ops.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Current value of the message input
    pub fn input(&self) -> String {
        self.state.lock().input.clone()
    }

    fn on_form(state: &PageState, target: &FormTarget) -> bool {
        state.url.as_deref() == Some(target.url.as_str())
    }

    fn not_found(selector: &str) -> PageError {
        PageError::ElementNotFound {
            selector: selector.to_string(),
        }
    }
}

#[async_trait]
impl PageSession for SimulatedPage {
    async fn goto(&mut self, url: &str) -> PageResult<()> {
        let mut state = self.state.lock();
        state.ops.push(PageOp::Goto(url.to_string()));
        if state.closed {
            return Err(PageError::Closed);
        }

        state.url = Some(url.to_string());
        state.input.clear();
        state.display = None;
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> PageResult<()> {
        let mut state = self.state.lock();
        state.ops.push(PageOp::Fill {
            selector: selector.to_string(),
            value: value.to_string(),
        });
        if state.closed {
            return Err(PageError::Closed);
        }
        if !Self::on_form(&state, &self.target) || selector != self.target.message_selector {
            return Err(Self::not_found(selector));
        }

        state.input = value.to_string();
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> PageResult<()> {
        let mut state = self.state.lock();
        state.ops.push(PageOp::Click(selector.to_string()));
        if state.closed {
            return Err(PageError::Closed);
        }
        if !Self::on_form(&state, &self.target) || selector != self.target.submit_selector {
            return Err(Self::not_found(selector));
        }
        if self.submit_disabled {
            return Err(PageError::Interaction {
                selector: selector.to_string(),
                reason: "element is not enabled".to_string(),
            });
        }

        let shown = (self.render)(&state.input);
        state.display = Some(shown);
        Ok(())
    }

    async fn text_content(&mut self, selector: &str) -> PageResult<Option<String>> {
        let mut state = self.state.lock();
        state.ops.push(PageOp::TextContent(selector.to_string()));
        if state.closed {
            return Err(PageError::Closed);
        }
        if !Self::on_form(&state, &self.target) || selector != self.target.display_selector {
            return Err(Self::not_found(selector));
        }

        // The display element exists before submission, just empty
        Ok(Some(state.display.clone().unwrap_or_default()))
    }

    async fn close(&mut self) -> PageResult<()> {
        let mut state = self.state.lock();
        state.ops.push(PageOp::Close);
        state.closed = true;
        Ok(())
    }
}

/// Launches a fresh [`SimulatedPage`] per scenario and keeps a handle to each
#[derive(Debug)]
pub struct SimulatedLauncher {
    template: SimulatedPage,
    launched: Mutex<Vec<SimulatedPage>>,
}

impl SimulatedLauncher {
    pub fn new(template: SimulatedPage) -> Self {
        Self {
            template,
            launched: Mutex::new(Vec::new()),
        }
    }

    /// Handles to every page launched so far, in launch order.
    pub fn pages(&self) -> Vec<SimulatedPage> {
        self.launched.lock().clone()
    }
}

#[async_trait]
impl SessionLauncher for SimulatedLauncher {
    async fn launch(&self) -> E2eResult<Box<dyn PageSession>> {
        let page = self.template.fresh();
        self.launched.lock().push(page.clone());
        Ok(Box::new(page))
    }

    fn describe(&self) -> String {
        format!("simulated form page at {}", self.template.target.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> FormTarget {
        FormTarget::default()
    }

    #[tokio::test]
    async fn test_submit_echoes_message() {
        let t = target();
        let mut page = SimulatedPage::new(t.clone());
        page.goto(&t.url).await.unwrap();
        assert_eq!(page.text_content(&t.display_selector).await.unwrap(), Some(String::new()));

        page.fill(&t.message_selector, "hello world").await.unwrap();
        page.click(&t.submit_selector).await.unwrap();
        assert_eq!(
            page.text_content(&t.display_selector).await.unwrap(),
            Some("hello world".into())
        );
    }

    #[tokio::test]
    async fn test_elements_missing_off_the_form_page() {
        let t = target();
        let mut page = SimulatedPage::new(t.clone());
        assert_eq!(
            page.click(&t.submit_selector).await.unwrap_err(),
            PageError::ElementNotFound {
                selector: t.submit_selector.clone()
            }
        );

        page.goto("https://example.com/").await.unwrap();
        assert!(page.fill(&t.message_selector, "x").await.is_err());

        page.goto(&t.url).await.unwrap();
        assert!(matches!(
            page.fill("#nope", "x").await.unwrap_err(),
            PageError::ElementNotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_disabled_submit_is_an_interaction_error() {
        let t = target();
        let mut page = SimulatedPage::new(t.clone()).with_submit_disabled();
        page.goto(&t.url).await.unwrap();
        assert!(matches!(
            page.click(&t.submit_selector).await.unwrap_err(),
            PageError::Interaction { .. }
        ));
    }

    #[tokio::test]
    async fn test_closed_page_rejects_calls_and_clones_share_state() {
        let t = target();
        let handle = SimulatedPage::new(t.clone());
        let mut page = handle.clone();
        page.goto(&t.url).await.unwrap();
        page.fill(&t.message_selector, "abc").await.unwrap();
        assert_eq!(handle.input(), "abc");

        page.close().await.unwrap();
        assert!(handle.is_closed());
        assert_eq!(page.goto(&t.url).await.unwrap_err(), PageError::Closed);
        assert_eq!(handle.ops().last(), Some(&PageOp::Goto(t.url.clone())));
    }

    #[tokio::test]
    async fn test_launcher_gives_each_scenario_fresh_state() {
        let t = target();
        let launcher = SimulatedLauncher::new(SimulatedPage::new(t.clone()));
        let mut first = launcher.launch().await.unwrap();
        first.goto(&t.url).await.unwrap();
        let _second = launcher.launch().await.unwrap();

        let pages = launcher.pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].ops().len(), 1);
        assert!(pages[1].ops().is_empty());
    }
}
