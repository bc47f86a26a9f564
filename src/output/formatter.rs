//! Core formatting trait and the plain text implementation

use crate::{
    error::{AppError, Result},
    models::{DupCheckConfig, LatencyConfig, LatencySample, RunSummary, SampleFailure, UnitOutcome, FailureKind},
    stats::{Aggregate, DuplicateReport, LatencyComparison, Verdict},
    types::ProcessingMode,
};
use std::fmt::Write as _;

/// Console rendering for both tools
pub trait OutputFormatter {
    fn format_header(&self, title: &str) -> Result<String>;

    /// Echo of the duplicate checker's target and port plan
    fn format_dupcheck_config(&self, config: &DupCheckConfig) -> Result<String>;

    /// Echo of the latency comparator's endpoints and sample count
    fn format_latency_config(&self, config: &LatencyConfig) -> Result<String>;

    /// One progress line for a finished unit
    fn format_unit_progress(&self, unit: &UnitOutcome) -> Result<String>;

    /// Elapsed time and success/error counts
    fn format_run_completion(&self, summary: &RunSummary) -> Result<String>;

    /// Per-port statistics, duplicate list and totals
    fn format_aggregate(&self, aggregate: &Aggregate) -> Result<String>;

    /// Section heading printed before a mode is sampled
    fn format_mode_heading(&self, mode: ProcessingMode) -> Result<String>;

    fn format_sample(&self, sample: &LatencySample) -> Result<String>;

    fn format_sample_failure(&self, failure: &SampleFailure) -> Result<String>;

    /// Averages and verdict, or an explanation when no comparison is possible
    fn format_latency_comparison(&self, comparison: Option<&LatencyComparison>) -> Result<String>;

    fn format_success(&self, message: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct FormattingOptions {
    pub enable_color: bool,
    /// Show requested names, client averages and per-duplicate port lists
    pub verbose_mode: bool,
    pub max_width: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            max_width: 60,
        }
    }
}

pub(crate) fn fmt_error(e: std::fmt::Error) -> AppError {
    AppError::io(format!("Failed to format output: {}", e))
}

/// Closing line of the latency comparison
pub(crate) fn verdict_line(comparison: &LatencyComparison) -> String {
    match comparison.verdict() {
        Verdict::ParallelFaster => format!(
            "🎉 Parallel processing is {} faster than serial",
            format_percentage(comparison.improvement_pct)
        ),
        Verdict::ParallelSlower => format!(
            "⚠️ Parallel processing is {} slower than serial",
            format_percentage(comparison.improvement_pct.abs())
        ),
        Verdict::NoDifference => "➖ Parallel and serial processing took the same time".to_string(),
        Verdict::Undetermined => "⚠️ Serial average is 0 ms, no improvement percentage can be computed".to_string(),
    }
}

/// Marker printed in front of a unit's progress line
pub(crate) fn unit_marker(unit: &UnitOutcome) -> &'static str {
    match unit {
        UnitOutcome::Created { .. } => "✅",
        UnitOutcome::Failed(failure) => match failure.kind {
            FailureKind::Status(_) => "❌",
            FailureKind::Timeout | FailureKind::Transport(_) | FailureKind::MalformedBody(_) => "💥",
        },
    }
}

/// Position of a mode in the sampling order, 1-based
pub(crate) fn mode_ordinal(mode: ProcessingMode) -> usize {
    ProcessingMode::ALL
        .iter()
        .position(|m| *m == mode)
        .map_or(0, |index| index + 1)
}

/// Range of ids as `min-max`, or a single id when both are equal
pub(crate) fn id_range(report: &DuplicateReport, port: u16) -> String {
    match report.port(port) {
        Some(summary) if summary.min_id == summary.max_id => summary.min_id.to_string(),
        Some(summary) => format!("{}-{}", summary.min_id, summary.max_id),
        None => "-".to_string(),
    }
}

pub(crate) fn format_millis(ms: f64) -> String {
    if ms < 1000.0 {
        format!("{:.0} ms", ms)
    } else {
        format!("{:.2} s", ms / 1000.0)
    }
}

pub(crate) fn format_percentage(percentage: f64) -> String {
    format!("{:.1}%", percentage)
}

pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    fn separator(&self) -> String {
        "-".repeat(self.options.max_width)
    }

    fn format_report(&self, report: &DuplicateReport, output: &mut String) -> Result<()> {
        writeln!(output, "📈 Per-port statistics:").map_err(fmt_error)?;
        for summary in &report.per_port {
            writeln!(
                output,
                "  port {}: {} records, id range {}",
                summary.port,
                summary.record_count,
                id_range(report, summary.port)
            )
            .map_err(fmt_error)?;
        }

        writeln!(output).map_err(fmt_error)?;
        writeln!(output, "🔍 Duplicate id check:").map_err(fmt_error)?;
        if report.has_duplicates() {
            writeln!(output, "❌ Found {} duplicate ids:", report.duplicates.len()).map_err(fmt_error)?;
            for duplicate in &report.duplicates {
                writeln!(
                    output,
                    "  id {}: seen {} times, from ports {:?}",
                    duplicate.id,
                    duplicate.occurrences,
                    duplicate.port_list()
                )
                .map_err(fmt_error)?;
            }
        } else {
            writeln!(output, "✅ No duplicate ids").map_err(fmt_error)?;
        }

        writeln!(output).map_err(fmt_error)?;
        write!(
            output,
            "📊 Summary: {} ids, {} unique ids",
            report.total_ids, report.unique_ids
        )
        .map_err(fmt_error)?;

        Ok(())
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(self.options.max_width.max(title.chars().count() + 4));

        writeln!(output, "{}", border).map_err(fmt_error)?;
        writeln!(output, "  {}", title).map_err(fmt_error)?;
        write!(output, "{}", border).map_err(fmt_error)?;

        Ok(output)
    }

    fn format_dupcheck_config(&self, config: &DupCheckConfig) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Target host: {}", config.host).map_err(fmt_error)?;
        writeln!(output, "Port plan:").map_err(fmt_error)?;
        for (port, count) in config.ports.iter() {
            writeln!(output, "  port {}: {} concurrent requests", port, count).map_err(fmt_error)?;
        }
        write!(
            output,
            "Total requests: {} (timeout {}s)",
            config.ports.total_units(),
            config.timeout_seconds
        )
        .map_err(fmt_error)?;

        if let Some(limit) = config.max_in_flight {
            write!(output, "\nMax in flight: {}", limit).map_err(fmt_error)?;
        }

        Ok(output)
    }

    fn format_latency_config(&self, config: &LatencyConfig) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Base URL: {}", config.base_url).map_err(fmt_error)?;
        write!(
            output,
            "Samples per mode: {} (timeout {}s)",
            config.sample_count, config.timeout_seconds
        )
        .map_err(fmt_error)?;

        Ok(output)
    }

    fn format_unit_progress(&self, unit: &UnitOutcome) -> Result<String> {
        let marker = unit_marker(unit);
        Ok(match unit {
            UnitOutcome::Created { seq, requested_name, outcome } => format!(
                "{} [{}] unit {}: '{}' -> id {}",
                marker, outcome.port, seq, requested_name, outcome.user_id
            ),
            UnitOutcome::Failed(failure) if self.options.verbose_mode => format!(
                "{} [{}] unit {}: '{}' {}",
                marker, failure.port, failure.seq, failure.requested_name, failure.kind
            ),
            UnitOutcome::Failed(failure) => {
                format!("{} [{}] unit {}: {}", marker, failure.port, failure.seq, failure.kind)
            }
        })
    }

    fn format_run_completion(&self, summary: &RunSummary) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "✅ Run complete in {:.2}s", summary.elapsed.as_secs_f64()).map_err(fmt_error)?;
        write!(
            output,
            "📊 Succeeded: {}, Failed: {}",
            summary.success_count, summary.error_count
        )
        .map_err(fmt_error)?;

        if self.options.verbose_mode {
            write!(output, " ({} success rate)", format_percentage(summary.success_rate())).map_err(fmt_error)?;
        }

        Ok(output)
    }

    fn format_aggregate(&self, aggregate: &Aggregate) -> Result<String> {
        match aggregate {
            Aggregate::NoSuccessfulRequests => Ok("❌ No successful requests".to_string()),
            Aggregate::Report(report) => {
                let mut output = String::new();
                self.format_report(report, &mut output)?;
                Ok(output)
            }
        }
    }

    fn format_mode_heading(&self, mode: ProcessingMode) -> Result<String> {
        Ok(format!("[{}/{}] {}...", mode_ordinal(mode), ProcessingMode::ALL.len(), mode.label()))
    }

    fn format_sample(&self, sample: &LatencySample) -> Result<String> {
        Ok(format!(
            "   attempt {}: server {:.0} ms, client {:.0} ms",
            sample.attempt, sample.server_ms, sample.client_ms
        ))
    }

    fn format_sample_failure(&self, failure: &SampleFailure) -> Result<String> {
        Ok(format!("   attempt {}: failed, {}", failure.attempt, failure.reason))
    }

    fn format_latency_comparison(&self, comparison: Option<&LatencyComparison>) -> Result<String> {
        let Some(comparison) = comparison else {
            return Ok("❌ Comparison failed: no valid samples for at least one mode".to_string());
        };

        let mut output = String::new();

        writeln!(output, "📊 Latency comparison").map_err(fmt_error)?;
        writeln!(output, "{}", self.separator()).map_err(fmt_error)?;
        writeln!(output, "Serial average:     {}", format_millis(comparison.serial_avg_ms)).map_err(fmt_error)?;
        writeln!(output, "Parallel average:   {}", format_millis(comparison.parallel_avg_ms)).map_err(fmt_error)?;
        writeln!(output, "Latency reduction:  {:.0} ms", comparison.reduction_ms).map_err(fmt_error)?;
        writeln!(output, "Improvement:        {}", format_percentage(comparison.improvement_pct)).map_err(fmt_error)?;
        writeln!(output).map_err(fmt_error)?;

        write!(output, "{}", verdict_line(comparison)).map_err(fmt_error)?;

        Ok(output)
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("SUCCESS: {}", message))
    }
}
