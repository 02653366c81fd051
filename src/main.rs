mod cli;
mod prompt;

use cli::{CliConfig, CliError};
use shapesort_core::{
    print_summary, progress, sort_images, write_json, CountingAllocator, FailurePolicy,
    FileInspector, Ledger, MoveLedger, NameAllocator, PlacementEngine, ScanningAllocator,
    SortConfig,
};
use std::io;
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let cli = CliConfig::from_env().unwrap_or_else(|err| match err {
        CliError::Help | CliError::Version => {
            println!("{}", err);
            process::exit(0);
        }
        _ => {
            eprintln!("{}", err);
            eprintln!("Try --help for usage.");
            process::exit(1);
        }
    });

    let config = build_config(&cli).unwrap_or_else(|err| {
        eprintln!("Error: {}", err);
        process::exit(1);
    });

    let completed = if cli.rescan {
        run(&config, &cli, ScanningAllocator)
    } else {
        run(&config, &cli, CountingAllocator::new())
    };
    if !completed {
        process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn build_config(cli: &CliConfig) -> Result<SortConfig, Box<dyn std::error::Error>> {
    let source = resolve_directory(cli.source.clone(), prompt::SOURCE_PROMPT)?;
    let destination = resolve_directory(cli.destination.clone(), prompt::DESTINATION_PROMPT)?;

    let mut config = SortConfig::new(source, destination)?;
    if let Some(log) = cli.log.clone() {
        config = config.with_log_path(log);
    }
    if let Some(extensions) = cli.extensions.as_ref() {
        config = config.with_extensions(extensions);
    }
    if cli.strict {
        config = config.with_failure_policy(FailurePolicy::Abort);
    }
    Ok(config)
}

/// Uses the command-line value when present, otherwise asks on stdin.
fn resolve_directory(given: Option<PathBuf>, message: &str) -> io::Result<PathBuf> {
    match given {
        Some(path) => Ok(path),
        None => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            prompt::prompt_directory(&mut stdin.lock(), &mut stdout.lock(), message)
        }
    }
}

fn run<A: NameAllocator>(config: &SortConfig, cli: &CliConfig, allocator: A) -> bool {
    let mut ledger = match MoveLedger::create(&config.log_path) {
        Ok(ledger) => ledger,
        Err(error) => {
            eprintln!("Error: {}", error);
            return false;
        }
    };
    let mut engine = PlacementEngine::with_parts(&config.destination, FileInspector, allocator);

    info!(
        source = %config.source.display(),
        destination = %config.destination.display(),
        log = %config.log_path.display(),
        "starting run"
    );
    let progress_bar = progress::sort_bar();
    let outcome = sort_images(config, &mut engine, &mut ledger, &progress_bar);
    progress_bar.finish_with_message("Sorting complete");

    print_summary(ledger.summary());
    println!("\nMove log written to {}", ledger.path().display());

    if let Some(report) = cli.report.as_ref() {
        match write_json(
            ledger.summary(),
            ledger.records(),
            &config.source,
            &config.destination,
            report,
        ) {
            Ok(_) => println!("JSON report written to {}", report.display()),
            Err(error) => eprintln!("Error writing JSON report: {}", error),
        }
    }

    match outcome {
        Ok(()) => true,
        Err(error) => {
            eprintln!("Error: {}", error);
            false
        }
    }
}
