//! Structured diagnostics logging
//!
//! Log entries carry a level, a component name and arbitrary JSON fields.
//! In debug mode entries are emitted as JSON lines with source locations;
//! otherwise a single human-readable line is written. Warnings and above go
//! to stderr so they never interleave with report output piped from stdout.

use crate::error::AppError;
use crate::models::{LatencySample, OutputSettings, SampleFailure, UnitOutcome};
use crate::types::ProcessingMode;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Level label padded to five columns, optionally colorized
    fn label(&self, use_color: bool) -> String {
        let padded = format!("{:>5}", self.as_str());
        if !use_color {
            return padded;
        }

        match self {
            LogLevel::Trace => padded.white().to_string(),
            LogLevel::Debug => padded.cyan().to_string(),
            LogLevel::Info => padded.green().to_string(),
            LogLevel::Warn => padded.yellow().to_string(),
            LogLevel::Error => padded.red().bold().to_string(),
        }
    }
}

/// One structured log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Component that produced the entry
    pub logger: String,
    pub correlation_id: Option<String>,
    pub fields: HashMap<String, serde_json::Value>,
    pub location: Option<LogLocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
    pub module: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Timestamped human-readable line
    Console,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
    current_correlation_id: Option<String>,
    context_fields: HashMap<String, serde_json::Value>,
}

pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    include_location: bool,
    format: LogFormat,
    name: String,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Debug enables JSON output with locations; verbose enables info;
    /// otherwise only warnings and errors are written.
    pub fn with_settings(name: impl Into<String>, settings: &OutputSettings) -> Self {
        let min_level = if settings.debug {
            LogLevel::Debug
        } else if settings.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            min_level,
            use_color: settings.enable_color,
            include_location: settings.debug,
            format: if settings.debug { LogFormat::Json } else { LogFormat::Console },
            name: name.into(),
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn set_session_id(&self, session_id: String) {
        self.context.write().await.session_id = Some(session_id);
    }

    /// Field attached to every subsequent entry
    pub async fn add_context_field<T: Serialize>(&self, key: &str, value: T) {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.context.write().await.context_fields.insert(key.to_string(), json_value);
        }
    }

    /// Begin a correlated operation and return its id
    pub async fn start_operation(&self, operation_name: &str) -> String {
        let correlation_id = Uuid::new_v4().to_string();
        self.context.write().await.current_correlation_id = Some(correlation_id.clone());

        self.info(&format!("Started {}", operation_name))
            .correlation_id(&correlation_id)
            .field("operation", operation_name)
            .field("phase", "start")
            .log()
            .await;

        correlation_id
    }

    pub async fn end_operation(&self, correlation_id: &str, operation_name: &str, success: bool) {
        self.info(&format!("Finished {} (success: {})", operation_name, success))
            .correlation_id(correlation_id)
            .field("operation", operation_name)
            .field("phase", "end")
            .field("success", success)
            .log()
            .await;

        let mut context = self.context.write().await;
        if context.current_correlation_id.as_deref() == Some(correlation_id) {
            context.current_correlation_id = None;
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        {
            let context = self.context.read().await;
            if let Some(session_id) = &context.session_id {
                entry
                    .fields
                    .insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
            }
            if entry.correlation_id.is_none() {
                entry.correlation_id = context.current_correlation_id.clone();
            }
            for (key, value) in &context.context_fields {
                entry.fields.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }

        let output = self.render(&entry);

        if entry.level >= LogLevel::Warn {
            let _ = writeln!(io::stderr(), "{}", output);
        } else {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }

    fn render(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let mut output = format!(
            "{} {} [{}] {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.level.label(self.use_color),
            entry.logger,
            entry.message
        );

        if let Some(correlation_id) = &entry.correlation_id {
            let short: String = correlation_id.chars().take(8).collect();
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let mut fields: Vec<String> = entry.fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            fields.sort();
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        if self.include_location {
            if let Some(location) = &entry.location {
                output.push_str(&format!(" @ {}:{}", location.file, location.line));
            }
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        serde_json::to_string(entry).unwrap_or_else(|_| {
            serde_json::json!({ "error": "unserializable log entry", "message": entry.message }).to_string()
        })
    }
}

/// Builder returned by the level methods on [`Logger`]
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: HashMap::new(),
                location: None,
            },
        }
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    pub fn location(mut self, file: &str, line: u32, module: Option<&str>) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
            module: module.map(String::from),
        });
        self
    }

    /// Port, sequence index, requested name and result of one create call
    pub fn unit(self, unit: &UnitOutcome) -> Self {
        let builder = self
            .field("port", unit.port())
            .field("seq", unit.seq())
            .field("success", unit.is_success());

        match unit {
            UnitOutcome::Created { requested_name, outcome, .. } => builder
                .field("requested_name", requested_name)
                .field("user_id", outcome.user_id.0)
                .field("returned_name", &outcome.name),
            UnitOutcome::Failed(failure) => builder
                .field("requested_name", &failure.requested_name)
                .field("failure", failure.kind.to_string()),
        }
    }

    /// Latency sample timings
    pub fn sample(self, mode: ProcessingMode, sample: &LatencySample) -> Self {
        self.field("mode", mode.label())
            .field("attempt", sample.attempt)
            .field("server_ms", sample.server_ms)
            .field("client_ms", sample.client_ms)
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_recoverable", error.is_recoverable())
            .field("error_exit_code", error.exit_code())
    }

    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Logger specialised for per-request events of both tools
pub struct ProbeLogger {
    logger: Logger,
}

impl ProbeLogger {
    pub fn new(settings: &OutputSettings) -> Self {
        Self {
            logger: Logger::with_settings("PROBE", settings),
        }
    }

    pub fn inner(&self) -> &Logger {
        &self.logger
    }

    /// Failures go out at warn. The binaries only call this with
    /// `--verbose`/`--debug`; the progress line already shows every unit.
    pub async fn log_unit(&self, unit: &UnitOutcome) {
        let (level, message) = unit_event(unit);
        self.logger.log(level, &message).unit(unit).log().await;
    }

    pub async fn log_sample(&self, mode: ProcessingMode, sample: &LatencySample) {
        self.logger
            .debug(&format!("{} attempt {} took {:.1}ms server-side", mode, sample.attempt, sample.server_ms))
            .sample(mode, sample)
            .log()
            .await;
    }

    pub async fn log_sample_failure(&self, mode: ProcessingMode, failure: &SampleFailure) {
        self.logger
            .warn(&format!("{} attempt {} failed: {}", mode, failure.attempt, failure.reason))
            .field("mode", mode.label())
            .field("attempt", failure.attempt)
            .field("reason", &failure.reason)
            .log()
            .await;
    }

    pub async fn log_error(&self, error: &AppError, context: &str) {
        self.logger
            .error(&format!("{}: {}", context, error))
            .error_info(error)
            .field("context", context)
            .log()
            .await;
    }
}

fn unit_event(unit: &UnitOutcome) -> (LogLevel, String) {
    match unit {
        UnitOutcome::Created { outcome, .. } => (
            LogLevel::Debug,
            format!("port {} unit {} created id {}", outcome.port, unit.seq(), outcome.user_id),
        ),
        UnitOutcome::Failed(failure) => (
            LogLevel::Warn,
            format!("port {} unit {} failed: {}", failure.port, failure.seq, failure.kind),
        ),
    }
}

/// Hands out loggers that share one session id
pub struct LoggerFactory {
    settings: OutputSettings,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(settings: OutputSettings) -> Self {
        Self {
            settings,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    pub async fn create_probe_logger(&self) -> ProbeLogger {
        let probe = ProbeLogger::new(&self.settings);
        probe.logger.set_session_id(self.session_id.clone()).await;
        probe
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FailureKind, RequestOutcome, UnitFailure};

    fn settings(debug: bool, verbose: bool, enable_color: bool) -> OutputSettings {
        OutputSettings { enable_color, verbose, debug }
    }

    fn entry(level: LogLevel) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            level,
            message: "port 9001 unit 3 created id 17".to_string(),
            logger: "PROBE".to_string(),
            correlation_id: Some("0123456789abcdef".to_string()),
            fields: HashMap::from([("port".to_string(), serde_json::json!(9001))]),
            location: Some(LogLocation {
                file: "dispatch.rs".to_string(),
                line: 42,
                module: None,
            }),
        }
    }

    #[test]
    fn test_settings_select_level_and_format() {
        let quiet = Logger::with_settings("T", &settings(false, false, true));
        assert_eq!(quiet.min_level, LogLevel::Warn);
        assert_eq!(quiet.format, LogFormat::Console);

        let verbose = Logger::with_settings("T", &settings(false, true, true));
        assert_eq!(verbose.min_level, LogLevel::Info);

        let debug = Logger::with_settings("T", &settings(true, false, false));
        assert_eq!(debug.min_level, LogLevel::Debug);
        assert_eq!(debug.format, LogFormat::Json);
        assert!(debug.include_location);
        assert!(!debug.use_color);
    }

    #[test]
    fn test_would_log() {
        let logger = Logger::with_settings("T", &settings(false, false, false));

        assert!(!logger.would_log(LogLevel::Debug));
        assert!(!logger.would_log(LogLevel::Info));
        assert!(logger.would_log(LogLevel::Warn));
        assert!(logger.would_log(LogLevel::Error));
    }

    #[test]
    fn test_console_format() {
        let mut logger = Logger::with_settings("PROBE", &settings(false, true, false));
        logger.include_location = true;

        let line = logger.format_console(&entry(LogLevel::Info));
        assert!(line.contains(" INFO [PROBE] port 9001 unit 3 created id 17"));
        assert!(line.contains("[01234567]"));
        assert!(line.contains("{port=9001}"));
        assert!(line.ends_with("@ dispatch.rs:42"));
    }

    #[test]
    fn test_json_format_round_trips() {
        let logger = Logger::with_settings("PROBE", &settings(true, false, false));
        let json = logger.render(&entry(LogLevel::Debug));

        let parsed: LogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.level, LogLevel::Debug);
        assert_eq!(parsed.fields["port"], serde_json::json!(9001));
    }

    #[test]
    fn test_unit_event_levels() {
        let created = UnitOutcome::Created {
            seq: 0,
            requested_name: "9001_0_1".to_string(),
            outcome: RequestOutcome::new(9001, 5, "9001_0_1"),
        };
        let (level, message) = unit_event(&created);
        assert_eq!(level, LogLevel::Debug);
        assert_eq!(message, "port 9001 unit 0 created id 5");

        let failed = UnitOutcome::Failed(UnitFailure {
            port: 9001,
            seq: 4,
            requested_name: "9001_4_1".to_string(),
            kind: FailureKind::Timeout,
        });
        let (level, _) = unit_event(&failed);
        assert_eq!(level, LogLevel::Warn);

        let quiet = Logger::with_settings("PROBE", &settings(false, false, false));
        assert!(quiet.would_log(level));
    }

    #[test]
    fn test_unit_fields() {
        let logger = Logger::with_settings("PROBE", &settings(false, false, false));

        let created = UnitOutcome::Created {
            seq: 3,
            requested_name: "9001_3_12345".to_string(),
            outcome: RequestOutcome::new(9001, 17, "9001_3_12345"),
        };
        let builder = logger.debug("created").unit(&created);
        assert_eq!(builder.entry.fields["user_id"], serde_json::json!(17));
        assert_eq!(builder.entry.fields["success"], serde_json::json!(true));

        let failed = UnitOutcome::Failed(UnitFailure {
            port: 9002,
            seq: 0,
            requested_name: "9002_0_1".to_string(),
            kind: FailureKind::Status(503),
        });
        let builder = logger.warn("failed").unit(&failed);
        assert_eq!(builder.entry.fields["failure"], serde_json::json!("HTTP 503"));
        assert_eq!(builder.entry.fields["port"], serde_json::json!(9002));
    }

    #[tokio::test]
    async fn test_context_fields_and_session() {
        let logger = Logger::with_settings("T", &settings(false, false, false));
        logger.set_session_id("session-1".to_string()).await;
        logger.add_context_field("tool", "dupcheck").await;

        let context = logger.context.read().await;
        assert_eq!(context.session_id.as_deref(), Some("session-1"));
        assert!(context.context_fields.contains_key("tool"));
    }

    #[tokio::test]
    async fn test_operation_correlation_is_cleared() {
        let logger = Logger::with_settings("T", &settings(false, false, false));
        let id = logger.start_operation("dispatch").await;
        assert_eq!(id.len(), 36);
        assert_eq!(logger.context.read().await.current_correlation_id.as_deref(), Some(id.as_str()));

        logger.end_operation(&id, "dispatch", true).await;
        assert!(logger.context.read().await.current_correlation_id.is_none());
    }

    #[tokio::test]
    async fn test_factory_shares_session() {
        let factory = LoggerFactory::new(settings(false, false, false));
        let probe = factory.create_probe_logger().await;

        assert_eq!(probe.inner().name(), "PROBE");
        assert_eq!(
            probe.inner().context.read().await.session_id.as_deref(),
            Some(factory.session_id())
        );
    }

    #[tokio::test]
    async fn test_probe_logger_writes_without_panicking() {
        let probe = ProbeLogger::new(&settings(false, false, false));
        let sample = LatencySample { attempt: 1, client_ms: 12.0, server_ms: 10.0 };
        probe.log_sample(ProcessingMode::Serial, &sample).await;
        probe
            .log_error(&AppError::network("refused"), "liveness probe")
            .await;
    }
}
