mod bootstrap;
mod demo;
mod settings;

use anyhow::Result;
use clap::Parser;
use multispin_runtime::Spinners;
use multispin_term::StdoutStream;

use crate::demo::DemoPlan;
use crate::settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;
    tracing::info!("multispin v{} starting", env!("CARGO_PKG_VERSION"));

    let config = settings.spinners_config()?;
    let spinners = match settings.stream.as_str() {
        "stdout" => Spinners::with_stream(config, StdoutStream::new()),
        _ => Spinners::new(config),
    };
    tracing::debug!(animated = spinners.is_animated(), "spinner set ready");

    let plan = DemoPlan::from_settings(&settings);
    tokio::select! {
        result = demo::run(&spinners, &plan) => {
            result?;
        }
        signal = shutdown_signal() => {
            let signal = signal?;
            tracing::info!(signal, "stopping spinners");
            // Final paint first, then whatever hooks are still registered.
            let stopped = spinners.stop_all(None);
            multispin_term::run_exit_hooks();
            stopped?;
        }
    }

    spinners.log_to_stdout();
    Ok(())
}

/// Resolves with the signal name on Ctrl-C, and on SIGTERM or SIGHUP on unix.
async fn shutdown_signal() -> Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        let mut hangup = signal(SignalKind::hangup())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                Ok("SIGINT")
            }
            _ = terminate.recv() => Ok("SIGTERM"),
            _ = hangup.recv() => Ok("SIGHUP"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok("Ctrl+C")
    }
}
