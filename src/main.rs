use clap::Parser;
use cpal::traits::{DeviceTrait, HostTrait};
use dialoguer::{Select, theme::ColorfulTheme};
use soundpulse::app::{self, ExitCode};
use soundpulse::config::{Args, Commands, Config};
use soundpulse::error::AppResult;
use soundpulse::summary::LevelSummary;
use tracing_subscriber::EnvFilter;

fn list_devices() -> AppResult<()> {
    let host = cpal::default_host();
    let devices = host.input_devices()?;

    let device_list: Vec<String> = devices.filter_map(|d| d.name().ok()).collect();

    if device_list.is_empty() {
        println!("No audio input devices found.");
        return Ok(());
    }

    // Interactive selection
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select an audio input device")
        .items(&device_list)
        .default(0)
        .interact()?;

    println!("{}", device_list[selection]);

    Ok(())
}

fn print_summary(summary: &LevelSummary) {
    println!("Levels: {}", summary.count());
    match (summary.max(), summary.mean()) {
        (Some(max), Some(mean)) => {
            println!("Max level: {:.3}", max);
            println!("Mean level: {:.3}", mean);
        }
        _ => println!("No levels received."),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("soundpulse=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let args = Args::parse();

    let config = match args.command {
        Commands::List(_) => {
            if let Err(e) = list_devices() {
                eprintln!("Error listing devices: {}", e);
                std::process::exit(ExitCode::Error as i32);
            }
            return;
        }
        Commands::Monitor(monitor_args) => Config::from_monitor_args(monitor_args),
        Commands::Simulate(simulate_args) => Config::from_simulate_args(simulate_args),
    };

    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(ExitCode::Error as i32);
        }
    };
    let quiet = config.quiet;

    let run_result = app::App::new(config).run().await;
    match run_result.result {
        Ok(summary) => {
            if !quiet {
                print_summary(&summary);
            }
            std::process::exit(run_result.exit_code as i32);
        }
        Err(e) => {
            eprintln!("Application error: {}", e);
            std::process::exit(ExitCode::Error as i32);
        }
    }
}
