use clap::Parser;
use std::process::ExitCode;
use std::sync::atomic::{ AtomicBool, Ordering };
use tracing::info;
use tracing_subscriber::EnvFilter;
use volley::{ Cli, Commander, Summary };

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let mut commander = match Commander::with_config(cli.attack_config()) {
        Ok(commander) => commander,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    // first signal ends the assault and still prints the summary, a second one exits
    let stop = commander.stop_handle();
    let interrupted = AtomicBool::new(false);
    ctrlc
        ::set_handler(move || {
            if interrupted.swap(true, Ordering::SeqCst) {
                std::process::exit(130);
            }
            stop.stop();
        })
        .expect("Error setting Ctrl+C handler");

    let rate = cli.rate.as_deref().unwrap_or("");
    let result = match cli.time_span.as_deref() {
        Some(time_span) => commander.assault(&cli.url, rate, time_span),
        None => {
            info!("no time span given, running until interrupted");
            commander.siege(&cli.url, rate)
        }
    };

    match result {
        Ok(summary) => print_summary(&summary, cli.json),
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber
        ::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_summary(summary: &Summary, json: bool) -> ExitCode {
    if !json {
        println!("{}", summary);
        return ExitCode::SUCCESS;
    }
    match serde_json::to_string_pretty(summary) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Failed to encode summary: {}", err);
            ExitCode::FAILURE
        }
    }
}
