//! Argument handling and top-level error reporting shared by the binaries.
//!
//! Every program exits with status 0: usage errors print the clap message,
//! runtime failures print the error chain to stderr.

use clap::{Args, Parser};

/// Flags accepted by every program.
#[derive(Args, Debug, Clone, Default)]
pub struct DisplayArgs {
    /// Run without opening windows; key waits return immediately
    #[arg(long)]
    pub headless: bool,
}

/// Install the `env_logger` backend, defaulting to `info`.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Parse `A` from the command line and run `body`, reporting any failure.
pub fn run<A, F>(body: F)
where
    A: Parser,
    F: FnOnce(A) -> anyhow::Result<()>,
{
    init_logging();
    let args = match A::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help/--version go to stdout, usage errors to stderr
            let _ = e.print();
            return;
        }
    };
    if let Err(e) = body(args) {
        eprintln!("{e:#}");
    }
}

/// Parse a positive, finite float.
pub fn parse_positive(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {s}"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("Value must be positive: {s}"));
    }
    Ok(value)
}
