//! Records the data stream of a networked eye tracker to a file.
//!
//! ```text
//! eyetrack --config lab.toml --output session-01.xml --calibrate
//! ```
//!
//! Tracking stops on Ctrl+C, or when the tracker closes the connection.

use clap::Parser;
use eyetracker::{Config, RecordLog, Session};
use std::{path::PathBuf, process::ExitCode};
use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "eyetrack", about = "Record the data stream of a networked eye tracker")]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults are used if omitted.
    #[arg(long, env = "EYETRACK_CONFIG")]
    config: Option<PathBuf>,

    /// Host of the tracker's server, overriding the configuration.
    #[arg(long)]
    host: Option<String>,

    /// Port of the tracker's server, overriding the configuration.
    #[arg(long)]
    port: Option<u16>,

    /// File that receives one raw record per line.
    #[arg(long, short)]
    output: PathBuf,

    /// Bring up the tracker's calibration screen once tracking has started.
    #[arg(long)]
    calibrate: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "eye tracking failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> eyetracker::Result<()> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!(config = %path.display(), "loading configuration");
            Config::load(path).await?
        }
        None => Config::default(),
    };
    config.override_endpoint(cli.host, cli.port);

    let file = tokio::fs::File::create(&cli.output).await?;
    let mut log = RecordLog::new(file);

    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, stopping");
            interrupt.cancel();
        }
    });

    let mut session = Session::new(config);
    session.start_eyetracking().await?;
    let tracked = track(&mut session, &mut log, cli.calibrate, &token).await;
    let stopped = session.stop_eyetracking().await;

    let written = tracked?;
    stopped?;
    tracing::info!(
        records = written,
        output = %cli.output.display(),
        "finished eye tracking"
    );
    Ok(())
}

async fn track<W>(
    session: &mut Session,
    log: &mut RecordLog<W>,
    calibrate: bool,
    token: &CancellationToken,
) -> eyetracker::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    if calibrate {
        session.calibrate().await?;
    }
    session.record(log, token).await
}
