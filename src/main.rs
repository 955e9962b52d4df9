use std::process::ExitCode;
use std::thread;

use clap::Parser;
use coinbot::cli::{run_with_shutdown, Cli};
use coinbot::domain::shutdown::ShutdownSignal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let shutdown = ShutdownSignal::new();
    spawn_ctrl_c_listener(shutdown.clone());
    run_with_shutdown(Cli::parse(), shutdown)
}

/// Triggers `shutdown` on the first Ctrl+C. The loop notices it between cycles.
fn spawn_ctrl_c_listener(shutdown: ShutdownSignal) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                warn!(error = %e, "could not start signal runtime, Ctrl+C will not stop cleanly");
                return;
            }
        };
        runtime.block_on(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl+C received, stopping after the current cycle");
                    shutdown.trigger();
                }
                Err(e) => warn!(error = %e, "failed to install Ctrl+C handler"),
            }
        });
    });
}
