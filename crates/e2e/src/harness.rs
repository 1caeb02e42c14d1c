//! Command-line helpers for the `harness = false` test binary

/// libtest switches that take no value
const LIBTEST_SWITCHES: &[&str] = &[
    "--nocapture",
    "--no-capture",
    "--show-output",
    "--quiet",
    "-q",
    "--ignored",
    "--include-ignored",
    "--exact",
    "--list",
    "--test",
    "--bench",
    "--report-time",
];

/// libtest options followed by a value, as `--opt value` or `--opt=value`
const LIBTEST_OPTIONS: &[&str] = &["--test-threads", "--color", "--format", "--skip", "--logfile", "-Z"];

/// Drop the flags `cargo test -- ...` forwards to every test binary so the
/// runner's own parser only sees its own arguments.
pub fn strip_libtest_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut kept = Vec::new();
    let mut args = args.into_iter().map(Into::into);

    while let Some(arg) = args.next() {
        if LIBTEST_SWITCHES.contains(&arg.as_str()) {
            continue;
        }
        if LIBTEST_OPTIONS.contains(&arg.as_str()) {
            args.next();
            continue;
        }
        if LIBTEST_OPTIONS
            .iter()
            .any(|opt| arg.strip_prefix(opt).is_some_and(|rest| rest.starts_with('=')))
        {
            continue;
        }
        kept.push(arg);
    }

    kept
}
