//! Error handling for the endpoint probe tools
//!
//! Per-unit request failures are recorded as data (see
//! [`crate::models::FailureKind`]); `AppError` covers everything that stops a
//! run: configuration problems, client construction and the liveness probe.

use colored::{Color, Colorize};
use thiserror::Error;

/// Everything that can stop `dupcheck` or `latcmp`
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad flags, environment values or `.env` content
    #[error("Configuration error: {0}")]
    Config(String),

    /// The server under test could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status
    #[error("HTTP request error: {0}")]
    HttpRequest(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Terminal or file I/O
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (URLs, JSON, port specs, etc.)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// A spawned request task panicked or was cancelled
    #[error("Dispatch error: {0}")]
    Dispatch(String),
}

impl AppError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    pub fn http_request<S: Into<String>>(message: S) -> Self {
        Self::HttpRequest(message.into())
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    pub fn dispatch<S: Into<String>>(message: S) -> Self {
        Self::Dispatch(message.into())
    }

    /// Short tag used in console output and log entries
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Network(_) => "NETWORK",
            Self::HttpRequest(_) => "HTTP",
            Self::Timeout(_) => "TIMEOUT",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Dispatch(_) => "DISPATCH",
        }
    }

    /// Whether the server side was at fault, so a later run could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::HttpRequest(_) | Self::Timeout(_))
    }

    fn suggestion(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::Parse(_) => {
                "Check the command line, the environment and your .env file (see --env-help)."
            }
            Self::Network(_) => "Make sure the service is running and the host/port are correct.",
            Self::HttpRequest(_) => "The server answered with an unexpected status. Check its logs.",
            Self::Timeout(_) => "Increase the timeout value using --timeout.",
            Self::Io(_) => "Check file permissions and the terminal.",
            Self::Dispatch(_) => "A request task died unexpectedly. Please report this with the command line you used.",
        }
    }

    /// Error text followed by a hint on what to try next
    pub fn user_friendly_message(&self) -> String {
        let headline = match self {
            Self::Network(msg) => format!("Cannot reach the server under test: {}", msg),
            other => other.to_string(),
        };
        format!("{}\n\nSuggestion: {}", headline, self.suggestion())
    }

    /// Process exit status; 1 means the run never started
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Parse(_) => 1,
            Self::Network(_) | Self::HttpRequest(_) => 2,
            Self::Timeout(_) => 3,
            Self::Io(_) => 5,
            Self::Dispatch(_) => 6,
        }
    }

    fn console_color(&self) -> Color {
        match self {
            Self::Config(_) | Self::Parse(_) => Color::Red,
            Self::Network(_) | Self::HttpRequest(_) => Color::Yellow,
            Self::Timeout(_) => Color::Blue,
            Self::Io(_) => Color::Cyan,
            Self::Dispatch(_) => Color::BrightRed,
        }
    }

    /// `[CATEGORY] message`, colored by category when requested
    pub fn format_for_console(&self, use_color: bool) -> String {
        let message = self.to_string();
        if use_color {
            let color = self.console_color();
            format!("[{}] {}", self.category().color(color).bold(), message.color(color))
        } else {
            format!("[{}] {}", self.category(), message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(error.to_string())
        } else if error.is_connect() || error.is_request() {
            Self::network(error.to_string())
        } else {
            Self::http_request(error.to_string())
        }
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error reporter for user-facing error output
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", error.format_for_console(self.use_color));

        if self.verbose {
            eprintln!();
            eprintln!("{}", error.user_friendly_message());
        }

        if error.is_recoverable() {
            eprintln!();
            if self.use_color {
                eprintln!("{}", "This error might be temporary. You can try running the command again.".green());
            } else {
                eprintln!("This error might be temporary. You can try running the command again.");
            }
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}
