//! dupcheck - concurrent duplicate-ID checker
//!
//! Fires every configured create call at once across the target ports, then
//! reports per-port id ranges and any id the server handed out twice.

use clap::Parser;
use endpoint_probe::{
    cli::DupCheckCli,
    client::{HttpProbeClient, ProbeClient},
    config::{
        display_dupcheck_summary, load_dupcheck_config, run_env_command, ConfigValidator, EnvManager,
        ValidationLevel,
    },
    error::{AppError, ErrorReporter, Result},
    executor::Dispatcher,
    log_debug, log_info,
    logging::LoggerFactory,
    models::UnitOutcome,
    output::OutputFormatterFactory,
    stats::analyze,
    PKG_NAME, VERSION,
};
use std::{process, sync::Arc};

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("Please report this issue together with the command line you used.");
        process::exit(1);
    }));

    let cli = DupCheckCli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.output.verbose);

    if let Err(e) = run_application(cli).await {
        reporter.report_error(&e);
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

async fn run_application(cli: DupCheckCli) -> Result<()> {
    cli.validate().map_err(AppError::config)?;

    if run_env_command(&cli.env, cli.use_colors())? {
        return Ok(());
    }

    if cli.output.debug {
        println!("{} v{} (dupcheck)", PKG_NAME, VERSION);
        println!(
            "Built {} from {}",
            option_env!("BUILD_TIME").unwrap_or("unknown"),
            option_env!("GIT_COMMIT").unwrap_or("unknown")
        );
        println!();
    }

    let config = load_dupcheck_config(cli)?;
    let mut warnings = ConfigValidator::validate_dupcheck(&config)?;
    warnings.extend(EnvManager::validate_current_env());
    let show_details = config.output.verbose || config.output.debug;

    if config.output.debug {
        println!("Configuration Summary:");
        println!("{}", display_dupcheck_summary(&config));
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
    println!("{}", formatter.format_header("Concurrent Duplicate ID Check")?);
    println!("{}", formatter.format_dupcheck_config(&config)?);
    println!();

    let logger_factory = LoggerFactory::new(config.output.clone());
    let logger = logger_factory.create_probe_logger().await;
    logger.inner().add_context_field("host", &config.host).await;
    let operation = logger.inner().start_operation("dupcheck").await;
    log_info!(
        logger.inner(),
        "Dispatching {} requests across {} ports",
        config.ports.total_units(),
        config.ports.len()
    );

    let client: Arc<dyn ProbeClient> = Arc::new(HttpProbeClient::new()?);
    let dispatcher = Dispatcher::new(client, &config);

    let mut finished: Vec<UnitOutcome> = Vec::new();
    let mut render_error: Option<AppError> = None;

    let summary = dispatcher
        .run(&config.ports, |unit| {
            match formatter.format_unit_progress(unit) {
                Ok(line) => println!("{}", line),
                Err(e) => {
                    render_error.get_or_insert(e);
                }
            }
            if show_details {
                finished.push(unit.clone());
            }
        })
        .await?;

    if let Some(e) = render_error {
        return Err(e);
    }

    for unit in &finished {
        logger.log_unit(unit).await;
    }
    log_debug!(logger.inner(), "Aggregating {} successful outcomes", summary.outcomes.len());

    println!();
    println!("{}", formatter.format_run_completion(&summary)?);
    println!();
    println!("{}", formatter.format_aggregate(&analyze(&summary.outcomes))?);

    logger.inner().end_operation(&operation, "dupcheck", true).await;

    Ok(())
}

fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Parse(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Ports are given as PORT:COUNT, e.g. --port 10001:80");
            eprintln!("  - PROBE_PORTS takes a comma-separated list of the same pairs");
            eprintln!("  - The host must not include a scheme or path");
            eprintln!("  - Check your .env file format");
        }
        AppError::Network(_) | AppError::HttpRequest(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Verify the server is listening on every configured port");
            eprintln!("  - Check firewall settings between this machine and the host");
        }
        _ => {}
    }
}
