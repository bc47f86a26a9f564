//! Colored formatter for terminals

use super::formatter::{
    fmt_error, format_millis, format_percentage, id_range, mode_ordinal, unit_marker, verdict_line,
    FormattingOptions, OutputFormatter,
};
use crate::{
    error::Result,
    models::{DupCheckConfig, FailureKind, LatencyConfig, LatencySample, RunSummary, SampleFailure, UnitOutcome},
    stats::{Aggregate, DuplicateReport, LatencyComparison},
    types::ProcessingMode,
};
use colored::*;
use std::fmt::Write as _;

/// How strongly the parallel endpoint outperformed the serial one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImprovementLevel {
    /// At least a third faster
    Strong,
    Modest,
    /// Parallel was not faster
    Regression,
}

impl ImprovementLevel {
    pub fn from_percentage(improvement_pct: f64) -> Self {
        if improvement_pct >= 33.0 {
            Self::Strong
        } else if improvement_pct > 0.0 {
            Self::Modest
        } else {
            Self::Regression
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Strong => Color::Green,
            Self::Modest => Color::Yellow,
            Self::Regression => Color::Red,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub highlight: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            highlight: Color::Magenta,
            muted: Color::BrightBlack,
        }
    }
}

pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    fn dimmed(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.dimmed()
        } else {
            text.normal()
        }
    }

    /// Bold and colored, or plain when colors are disabled
    fn emphasis(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color).bold()
        } else {
            text.normal()
        }
    }

    fn section_header(&self, icon: &str, title: &str) -> String {
        format!("{} {}", icon, self.emphasis(title, self.color_scheme.header))
    }

    fn failure_color(&self, kind: &FailureKind) -> Color {
        match kind {
            FailureKind::Status(_) => self.color_scheme.error,
            FailureKind::Timeout => self.color_scheme.warning,
            FailureKind::Transport(_) | FailureKind::MalformedBody(_) => self.color_scheme.highlight,
        }
    }

    fn format_report(&self, report: &DuplicateReport, output: &mut String) -> Result<()> {
        writeln!(output, "{}", self.section_header("📈", "Per-port statistics")).map_err(fmt_error)?;
        for summary in &report.per_port {
            writeln!(
                output,
                "  port {}: {} records, id range {}",
                self.colorize(&summary.port.to_string(), self.color_scheme.info),
                self.bold(&summary.record_count.to_string()),
                self.dimmed(&id_range(report, summary.port))
            )
            .map_err(fmt_error)?;
        }

        writeln!(output).map_err(fmt_error)?;
        writeln!(output, "{}", self.section_header("🔍", "Duplicate id check")).map_err(fmt_error)?;

        if report.has_duplicates() {
            let headline = format!("❌ Found {} duplicate ids:", report.duplicates.len());
            writeln!(output, "{}", self.emphasis(&headline, self.color_scheme.error)).map_err(fmt_error)?;

            for duplicate in &report.duplicates {
                let ports = if self.options.verbose_mode {
                    format!("{:?}", duplicate.port_list())
                } else {
                    format!("{:?}", duplicate.ports.keys().collect::<Vec<_>>())
                };
                writeln!(
                    output,
                    "  id {}: seen {} times, from ports {}",
                    self.colorize(&duplicate.id.to_string(), self.color_scheme.error),
                    self.bold(&duplicate.occurrences.to_string()),
                    self.dimmed(&ports)
                )
                .map_err(fmt_error)?;
            }
        } else {
            writeln!(output, "{}", self.colorize("✅ No duplicate ids", self.color_scheme.success)).map_err(fmt_error)?;
        }

        writeln!(output).map_err(fmt_error)?;
        write!(
            output,
            "{} {} ids, {} unique ids",
            self.section_header("📊", "Summary:"),
            self.bold(&report.total_ids.to_string()),
            self.bold(&report.unique_ids.to_string())
        )
        .map_err(fmt_error)?;

        Ok(())
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(self.options.max_width.max(title.chars().count() + 4));

        writeln!(output, "{}", self.colorize(&border, self.color_scheme.header)).map_err(fmt_error)?;
        writeln!(output, "  {}", self.emphasis(title, self.color_scheme.header)).map_err(fmt_error)?;
        write!(output, "{}", self.colorize(&border, self.color_scheme.header)).map_err(fmt_error)?;

        Ok(output)
    }

    fn format_dupcheck_config(&self, config: &DupCheckConfig) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "🎯 Target host: {}", self.emphasis(&config.host, self.color_scheme.info)).map_err(fmt_error)?;
        writeln!(output, "Port plan:").map_err(fmt_error)?;
        for (port, count) in config.ports.iter() {
            writeln!(
                output,
                "  port {}: {} concurrent requests",
                self.colorize(&port.to_string(), self.color_scheme.info),
                self.bold(&count.to_string())
            )
            .map_err(fmt_error)?;
        }
        write!(
            output,
            "Total requests: {} {}",
            self.bold(&config.ports.total_units().to_string()),
            self.dimmed(&format!("(timeout {}s)", config.timeout_seconds))
        )
        .map_err(fmt_error)?;

        if let Some(limit) = config.max_in_flight {
            write!(output, "\nMax in flight: {}", self.bold(&limit.to_string())).map_err(fmt_error)?;
        }

        Ok(output)
    }

    fn format_latency_config(&self, config: &LatencyConfig) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "🎯 Base URL: {}", self.emphasis(&config.base_url, self.color_scheme.info)).map_err(fmt_error)?;
        write!(
            output,
            "Samples per mode: {} {}",
            self.bold(&config.sample_count.to_string()),
            self.dimmed(&format!("(timeout {}s)", config.timeout_seconds))
        )
        .map_err(fmt_error)?;

        Ok(output)
    }

    fn format_unit_progress(&self, unit: &UnitOutcome) -> Result<String> {
        let marker = unit_marker(unit);
        Ok(match unit {
            UnitOutcome::Created { seq, requested_name, outcome } => format!(
                "{} [{}] unit {}: '{}' -> id {}",
                marker,
                self.colorize(&outcome.port.to_string(), self.color_scheme.info),
                seq,
                self.dimmed(requested_name),
                self.colorize(&outcome.user_id.to_string(), self.color_scheme.success)
            ),
            UnitOutcome::Failed(failure) => {
                let reason = self.colorize(&failure.kind.to_string(), self.failure_color(&failure.kind));
                if self.options.verbose_mode {
                    format!(
                        "{} [{}] unit {}: '{}' {}",
                        marker,
                        self.colorize(&failure.port.to_string(), self.color_scheme.info),
                        failure.seq,
                        self.dimmed(&failure.requested_name),
                        reason
                    )
                } else {
                    format!(
                        "{} [{}] unit {}: {}",
                        marker,
                        self.colorize(&failure.port.to_string(), self.color_scheme.info),
                        failure.seq,
                        reason
                    )
                }
            }
        })
    }

    fn format_run_completion(&self, summary: &RunSummary) -> Result<String> {
        let mut output = String::new();

        writeln!(
            output,
            "✅ Run complete in {}",
            self.bold(&format!("{:.2}s", summary.elapsed.as_secs_f64()))
        )
        .map_err(fmt_error)?;

        let failed_color = if summary.error_count == 0 {
            self.color_scheme.muted
        } else {
            self.color_scheme.error
        };
        write!(
            output,
            "📊 Succeeded: {}, Failed: {}",
            self.colorize(&summary.success_count.to_string(), self.color_scheme.success),
            self.colorize(&summary.error_count.to_string(), failed_color)
        )
        .map_err(fmt_error)?;

        if self.options.verbose_mode {
            write!(
                output,
                " {}",
                self.dimmed(&format!("({} success rate)", format_percentage(summary.success_rate())))
            )
            .map_err(fmt_error)?;
        }

        Ok(output)
    }

    fn format_aggregate(&self, aggregate: &Aggregate) -> Result<String> {
        match aggregate {
            Aggregate::NoSuccessfulRequests => {
                Ok(self.colorize("❌ No successful requests", self.color_scheme.error).to_string())
            }
            Aggregate::Report(report) => {
                let mut output = String::new();
                self.format_report(report, &mut output)?;
                Ok(output)
            }
        }
    }

    fn format_mode_heading(&self, mode: ProcessingMode) -> Result<String> {
        Ok(format!(
            "{} {}",
            self.dimmed(&format!("[{}/{}]", mode_ordinal(mode), ProcessingMode::ALL.len())),
            self.emphasis(&format!("{}...", mode.label()), self.color_scheme.header)
        ))
    }

    fn format_sample(&self, sample: &LatencySample) -> Result<String> {
        Ok(format!(
            "   attempt {}: server {} ms, client {} ms",
            sample.attempt,
            self.bold(&format!("{:.0}", sample.server_ms)),
            self.dimmed(&format!("{:.0}", sample.client_ms))
        ))
    }

    fn format_sample_failure(&self, failure: &SampleFailure) -> Result<String> {
        Ok(format!(
            "   attempt {}: {}",
            failure.attempt,
            self.colorize(&format!("failed, {}", failure.reason), self.color_scheme.error)
        ))
    }

    fn format_latency_comparison(&self, comparison: Option<&LatencyComparison>) -> Result<String> {
        let Some(comparison) = comparison else {
            return Ok(self
                .colorize(
                    "❌ Comparison failed: no valid samples for at least one mode",
                    self.color_scheme.error,
                )
                .to_string());
        };

        let level = ImprovementLevel::from_percentage(comparison.improvement_pct);
        let mut output = String::new();

        writeln!(output, "{}", self.section_header("📊", "Latency comparison")).map_err(fmt_error)?;
        writeln!(output, "{}", self.colorize(&"-".repeat(self.options.max_width), self.color_scheme.muted))
            .map_err(fmt_error)?;
        writeln!(output, "Serial average:     {}", self.bold(&format_millis(comparison.serial_avg_ms))).map_err(fmt_error)?;
        writeln!(output, "Parallel average:   {}", self.bold(&format_millis(comparison.parallel_avg_ms))).map_err(fmt_error)?;
        writeln!(output, "Latency reduction:  {:.0} ms", comparison.reduction_ms).map_err(fmt_error)?;
        writeln!(
            output,
            "Improvement:        {}",
            self.emphasis(&format_percentage(comparison.improvement_pct), level.color())
        )
        .map_err(fmt_error)?;
        writeln!(output).map_err(fmt_error)?;

        write!(output, "{}", self.colorize(&verdict_line(comparison), level.color())).map_err(fmt_error)?;

        Ok(output)
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("{} {}", self.colorize("✅", self.color_scheme.success), message))
    }
}
