mod app;
mod paths;
mod service;
mod settings;
mod spooler;
mod tenant;
mod terminal;

use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use simplelog::{Config, LevelFilter, WriteLogger};
use tokio::runtime::Handle;

use crate::app::App;
use crate::settings::Settings;
use crate::terminal::TerminalGuard;

/// Terminal front end for the gridline table engine.
#[derive(Debug, Parser)]
#[command(name = "gridline-tui", version, long_about = None)]
struct Args {
    /// Settings file (JSON). Defaults to the platform config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file. Defaults to the rotated cache log.
    #[arg(long)]
    log: Option<PathBuf>,
}

fn init_logging(path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = match path {
        Some(path) => path,
        None => {
            paths::rotate_logs();
            paths::log_file()
        }
    };
    let log_file = File::create(&path).or_else(|_| File::create(paths::FALLBACK_LOG))?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)?;
    log::info!("logging to {}", path.display());
    Ok(())
}

async fn run(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = TerminalGuard::new()?;
    let (width, _) = terminal.size()?;
    let (app, rx) = App::new(settings, width, Handle::current());
    app.run(rx, &mut terminal).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(args.log) {
        eprintln!("Error: failed to initialize logger: {e}");
        std::process::exit(1);
    }

    let config = args.config.or_else(paths::config_file);
    let settings = match config.as_deref() {
        Some(path) => Settings::load(path),
        None => Ok(Settings::default()),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    log::info!(
        "starting with {} tenants, {} per page",
        settings.tenants,
        settings.page_size
    );

    // The terminal guard is dropped inside `run`, so errors print to a
    // restored screen.
    if let Err(e) = run(settings).await {
        log::error!("{e}");
        eprintln!("Error: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_take_config_and_log_paths() {
        let args = Args::try_parse_from([
            "gridline-tui",
            "--config",
            "tenants.json",
            "--log",
            "run.log",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("tenants.json")));
        assert_eq!(args.log, Some(PathBuf::from("run.log")));
    }

    #[test]
    fn test_args_default_to_none() {
        let args = Args::try_parse_from(["gridline-tui"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.log.is_none());
    }

    #[test]
    fn test_args_reject_unknown_flag() {
        assert!(Args::try_parse_from(["gridline-tui", "--verbose"]).is_err());
    }
}
