//! Session controller.
//!
//! A [`Session`] sequences the start and stop protocol against the tracker's server:
//!
//! 1. [`Session::start_eyetracking`] connects and sends the start-configuration payload.
//! 2. The tracker streams records, which the caller may read with [`Session::next_record`] or
//!    forward to a [`RecordLog`] with [`Session::record`].
//! 3. [`Session::stop_eyetracking`] sends the stop payload and closes the connection.
//!
//! A session can be started again after it has been stopped.

use crate::{net::Connection, Command, Config, Error, Record, RecordLog, Result};
use std::net::SocketAddr;
use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;


/// Controls a single eye tracker.
#[derive(Debug)]
pub struct Session {
    config: Config,
    connection: Option<Connection>,
}

impl Session {
    /// Creates a new, idle [`Session`].
    pub fn new(config: Config) -> Self {
        Self {
            config,
            connection: None,
        }
    }

    /// Returns the configuration of the session.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns `true` if the session holds an open connection.
    pub fn is_started(&self) -> bool {
        self.connection.is_some()
    }

    /// Returns the address of the tracker, if the session is started.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.connection.as_ref().map(Connection::peer_addr)
    }

    /// Connects to the tracker and sends the start-configuration payload.
    ///
    /// Returns once the payload has been written. The tracker acknowledges each statement and
    /// then starts streaming, all of which arrives through [`Session::next_record`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyStarted`] if the session is already started, in which case the
    /// existing connection is left untouched. Returns an error if the payload is invalid, if the
    /// connection cannot be established, or if the payload cannot be sent. The session stays
    /// idle in all of these cases.
    pub async fn start_eyetracking(&mut self) -> Result<()> {
        if self.connection.is_some() {
            return Err(Error::AlreadyStarted);
        }
        let commands = self.config.start_commands()?;
        let mut connection = Connection::connect(
            &self.config.endpoint,
            self.config.connect_timeout(),
            self.config.max_record_len,
        )
        .await?;
        connection.send_all(&commands).await?;
        tracing::info!(
            peer = %connection.peer_addr(),
            commands = commands.len(),
            "sent start configuration"
        );
        self.connection = Some(connection);
        Ok(())
    }

    /// Sends the stop payload and closes the connection.
    ///
    /// The connection is closed even if the stop payload cannot be sent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if the session is not started. Otherwise, returns the first
    /// error encountered while sending the payload or closing the connection.
    pub async fn stop_eyetracking(&mut self) -> Result<()> {
        let mut connection = self.connection.take().ok_or(Error::NotConnected)?;
        let sent = match self.config.stop_commands() {
            Ok(commands) => connection.send_all(&commands).await,
            Err(error) => Err(error),
        };
        if let Err(error) = &sent {
            tracing::warn!(%error, "failed to send stop payload");
        }
        let closed = connection.close().await;
        sent.and(closed)
    }

    /// Asks the tracker to show its calibration screen and start calibrating.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if the session is not started, or an error if the
    /// calibration statements could not be sent.
    pub async fn calibrate(&mut self) -> Result<()> {
        let commands = self.config.calibration_commands()?;
        self.connection()?.send_all(&commands).await?;
        tracing::info!("requested calibration");
        Ok(())
    }

    /// Sends an arbitrary command to the tracker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if the session is not started, or an error if the command
    /// could not be sent.
    pub async fn send(&mut self, command: &Command) -> Result<()> {
        self.connection()?.send(command).await
    }

    /// Receives the next record streamed by the tracker.
    ///
    /// Returns [`None`] once the tracker closes the stream. This method is cancel-safe.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if the session is not started, or an error if the stream
    /// could not be read.
    pub async fn next_record(&mut self) -> Result<Option<Record>> {
        self.connection()?.recv().await
    }

    /// Forwards records to the `log` until the `token` is cancelled or the stream ends.
    ///
    /// Returns the number of records written by this call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if the session is not started, or the first error
    /// encountered while reading the stream or writing the log.
    pub async fn record<W>(
        &mut self,
        log: &mut RecordLog<W>,
        token: &CancellationToken,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let connection = self.connection()?;
        let mut written = 0;
        loop {
            let next = tokio::select! {
                biased;
                () = token.cancelled() => break,
                next = connection.recv() => next?,
            };
            let Some(record) = next else {
                break;
            };
            log.write(&record).await?;
            written += 1;
        }
        tracing::info!(records = written, "stopped recording");
        Ok(written)
    }

    fn connection(&mut self) -> Result<&mut Connection> {
        self.connection.as_mut().ok_or(Error::NotConnected)
    }
}
