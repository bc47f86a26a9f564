//! latcmp - serial vs parallel latency comparator
//!
//! Checks that the performance API is up, samples the serial and the
//! parallel processing endpoint one call at a time, and compares the
//! server-reported averages.

use clap::Parser;
use endpoint_probe::{
    cli::LatencyCli,
    client::{HttpProbeClient, ProbeClient},
    config::{
        display_latency_summary, load_latency_config, run_env_command, ConfigValidator, EnvManager,
        ValidationLevel,
    },
    error::{AppError, ErrorReporter, Result},
    log_info, log_warn,
    logging::LoggerFactory,
    output::OutputFormatterFactory,
    sampler::{LatencySampler, SampleEvent},
    PKG_NAME, VERSION,
};
use std::{
    io::{self, BufRead, IsTerminal, Write},
    process,
    sync::Arc,
};

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("Please report this issue together with the command line you used.");
        process::exit(1);
    }));

    let cli = LatencyCli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.output.verbose);
    let pause = cli.pause_on_exit(io::stdin().is_terminal());

    let result = run_application(cli).await;
    if let Err(e) = &result {
        reporter.report_error(e);
        print_error_suggestions(e);
    }

    if pause {
        if let Err(e) = wait_for_enter() {
            eprintln!("{}", e.format_for_console(false));
        }
    }

    if let Err(e) = result {
        process::exit(e.exit_code());
    }
}

async fn run_application(cli: LatencyCli) -> Result<()> {
    cli.validate().map_err(AppError::config)?;

    if run_env_command(&cli.env, cli.use_colors())? {
        return Ok(());
    }

    if cli.output.debug {
        println!("{} v{} (latcmp)", PKG_NAME, VERSION);
        println!(
            "Built {} from {}",
            option_env!("BUILD_TIME").unwrap_or("unknown"),
            option_env!("GIT_COMMIT").unwrap_or("unknown")
        );
        println!();
    }

    let config = load_latency_config(cli)?;
    let mut warnings = ConfigValidator::validate_latency(&config)?;
    warnings.extend(EnvManager::validate_current_env());
    let show_details = config.output.verbose || config.output.debug;

    if config.output.debug {
        println!("Configuration Summary:");
        println!("{}", display_latency_summary(&config));
        println!();
    }

    let shown: Vec<_> = warnings
        .iter()
        .filter(|w| show_details || w.level != ValidationLevel::Info)
        .collect();
    if !shown.is_empty() {
        println!("Configuration Warnings:");
        for warning in shown {
            println!("  {}", warning.format(config.output.enable_color));
        }
        println!();
    }

    let formatter = OutputFormatterFactory::from_settings(&config.output);
    println!("{}", formatter.format_header("Serial vs Parallel Latency Comparison")?);
    println!("{}", formatter.format_latency_config(&config)?);
    println!();

    let logger_factory = LoggerFactory::new(config.output.clone());
    let logger = logger_factory.create_probe_logger().await;
    logger.inner().add_context_field("base_url", &config.base_url).await;
    let operation = logger.inner().start_operation("latcmp").await;
    log_info!(logger.inner(), "Checking liveness at {}", config.health_url());

    let client: Arc<dyn ProbeClient> = Arc::new(HttpProbeClient::new()?);
    let sampler = LatencySampler::new(client, &config);

    let mut render_error: Option<AppError> = None;
    let outcome = sampler
        .run(|event| {
            let line = match event {
                SampleEvent::Live => formatter.format_success("Server connection OK"),
                SampleEvent::ModeStarted(mode) => formatter.format_mode_heading(mode),
                SampleEvent::Sample(_, sample) => formatter.format_sample(sample),
                SampleEvent::Failure(_, failure) => formatter.format_sample_failure(failure),
            };
            match line {
                Ok(line) => println!("{}", line),
                Err(e) => {
                    render_error.get_or_insert(e);
                }
            }
        })
        .await;

    let run = match outcome {
        Ok(run) => run,
        Err(e) => {
            if show_details {
                logger.log_error(&e, "liveness probe").await;
            }
            logger.inner().end_operation(&operation, "latcmp", false).await;
            return Err(e);
        }
    };

    if let Some(e) = render_error {
        return Err(e);
    }

    if show_details {
        for mode_samples in [&run.serial, &run.parallel] {
            for sample in &mode_samples.samples {
                logger.log_sample(mode_samples.mode, sample).await;
            }
            for failure in &mode_samples.failures {
                logger.log_sample_failure(mode_samples.mode, failure).await;
            }
        }
    }

    let failed = run.serial.failures.len() + run.parallel.failures.len();
    if failed > 0 {
        log_warn!(logger.inner(), "{} of {} processing calls failed", failed, run.total_attempts());
    }

    let comparison = run.comparison();
    println!();
    println!("{}", formatter.format_latency_comparison(comparison.as_ref())?);

    logger.inner().end_operation(&operation, "latcmp", comparison.is_some()).await;

    Ok(())
}

/// Keep the console window open until the user confirms
fn wait_for_enter() -> Result<()> {
    print!("\nPress Enter to exit...");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    Ok(())
}

fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Network(_) | AppError::HttpRequest(_) | AppError::Timeout(_) => {
            eprintln!();
            eprintln!("Make sure the performance API is running and reachable:");
            eprintln!("  - The liveness probe requests <base-url>/test-data");
            eprintln!("  - Override the base URL with --base-url or LATENCY_BASE_URL");
            eprintln!("  - Increase --health-timeout if the server is slow to answer");
        }
        AppError::Config(_) | AppError::Parse(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - The base URL must start with http:// or https://");
            eprintln!("  - Sample count must be between 1 and 100");
            eprintln!("  - Check your .env file format");
        }
        _ => {}
    }
}
