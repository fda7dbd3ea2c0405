use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where log lines go. The interactive viewer owns the terminal, so it only
/// logs when a file is given.
#[derive(Debug, Clone)]
pub enum LogOutput {
    Stderr,
    File(PathBuf),
    Disabled,
}

fn cli_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("threepub=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("threepub=info"))
    }
}

pub fn init_cli_logger(verbose: bool, output: LogOutput) {
    match output {
        LogOutput::Stderr => {
            tracing_subscriber::registry()
                .with(cli_filter(verbose))
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .init();
        }
        LogOutput::File(path) => {
            let file = match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("⚠️  Cannot open log file {}: {}", path.display(), e);
                    return;
                }
            };

            tracing_subscriber::registry()
                .with(cli_filter(verbose))
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .init();
        }
        LogOutput::Disabled => {}
    }
}
