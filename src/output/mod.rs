//! Console output for both tools
//!
//! Formatters return strings; the binaries decide where they are printed.

mod colored;
mod formatter;

pub use colored::{ColorScheme, ColoredFormatter, ImprovementLevel};
pub use formatter::{FormattingOptions, OutputFormatter, PlainFormatter};

use crate::models::OutputSettings;

pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Colored formatter when color is enabled, plain otherwise
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            ..FormattingOptions::default()
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    pub fn from_settings(settings: &OutputSettings) -> Box<dyn OutputFormatter> {
        Self::create_formatter(settings.enable_color, settings.verbose || settings.debug)
    }

    /// Plain text for scripts and logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false, false)
    }
}
