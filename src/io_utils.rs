use std::fmt;
use std::io;

#[derive(Debug)]
pub struct CliError {
    pub msg: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.msg.fmt(f)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Suggestion for the most common I/O failures.
pub fn io_suggestion(err: &io::Error) -> &'static str {
    use io::ErrorKind::*;
    match err.kind() {
        NotFound => "Check that the file exists and the path is correct.",
        PermissionDenied => "Check permissions or run as a different user.",
        WriteZero => "Disk may be full. Free up space and try again.",
        Other if err.raw_os_error() == Some(28) => "Disk may be full. Free up space and try again.",
        _ => "Check permissions or free up disk space.",
    }
}

/// Simple CLI error from string.
pub fn simple_cli_error(msg: &str) -> CliError {
    CliError {
        msg: msg.to_string(),
        source: None,
    }
}

/// Convert a library error into a CLI error with a hint.
pub fn ecosort_cli_error(context: &str, err: crate::EcoSortError) -> CliError {
    CliError {
        msg: format!("{}: {}", context, cli_hint(&err)),
        source: Some(Box::new(err)),
    }
}

/// Return an actionable hint for an error variant.
pub fn cli_hint(err: &crate::EcoSortError) -> String {
    use crate::EcoSortError::*;
    match err {
        Precondition(msg) => format!("{msg}. Adjust the input and try again."),
        Config(msg) => format!("{msg}. Invalid configuration."),
        Csv(e) => format!("{e}. Check the output path."),
        Json(e) => format!("{e}. Check the configuration file syntax."),
        Llm(e) => format!("{e}. Check that the model runner is installed and the model is pulled."),
        Io(io) => format!("{io}. {}", io_suggestion(io)),
        Internal(msg) => format!("{msg}. This is a bug."),
    }
}
