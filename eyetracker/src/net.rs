//! TCP transport to the tracker's server.

use crate::{
    command::CommandCodec, config::Endpoint, record::RecordCodec, Command, Error, Record, Result,
};
use bytes::BytesMut;
use std::{net::SocketAddr, time::Duration};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};
use tokio_util::codec::{Decoder, Encoder};

#[cfg(test)]
mod tests;

/// Number of bytes reserved in the read buffer before each read.
const READ_CHUNK: usize = 4096;

/// An open connection to the tracker's server.
///
/// Outbound [`Command`]s are written as terminated lines, and inbound bytes are split into
/// [`Record`]s.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    codec: RecordCodec,
    read_buffer: BytesMut,
    write_buffer: BytesMut,
    eof: bool,
}

impl Connection {
    /// Establishes a TCP connection to the given `endpoint`.
    ///
    /// Every address the endpoint resolves to is tried in turn. If a `timeout` is given, it bounds
    /// the whole attempt, including name resolution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the timeout elapses, [`Error::Unresolved`] if the host has no
    /// addresses, or [`Error::Io`] if no connection could be established.
    pub async fn connect(
        endpoint: &Endpoint,
        timeout: Option<Duration>,
        max_record_len: usize,
    ) -> Result<Self> {
        let attempt = establish(endpoint);
        let stream = match timeout {
            Some(limit) => tokio::time::timeout(limit, attempt)
                .await
                .map_err(|_| Error::Timeout(limit))??,
            None => attempt.await?,
        };
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        tracing::info!(%endpoint, %peer, "connected to eye tracker");
        Ok(Self::new(stream, peer, max_record_len))
    }

    fn new(stream: TcpStream, peer: SocketAddr, max_record_len: usize) -> Self {
        Self {
            stream,
            peer,
            codec: RecordCodec::new(max_record_len),
            read_buffer: BytesMut::with_capacity(READ_CHUNK),
            write_buffer: BytesMut::new(),
            eof: false,
        }
    }

    /// Returns the address of the tracker's server.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Sends a single command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command could not be written to the socket.
    pub async fn send(&mut self, command: &Command) -> Result<()> {
        self.send_all(std::slice::from_ref(command)).await
    }

    /// Sends the `commands` in order, with a single write.
    ///
    /// # Errors
    ///
    /// Returns an error if the commands could not be written to the socket.
    pub async fn send_all(&mut self, commands: &[Command]) -> Result<()> {
        self.write_buffer.clear();
        for command in commands {
            CommandCodec.encode(command, &mut self.write_buffer)?;
            tracing::trace!(peer = %self.peer, %command, "sending command");
        }
        self.stream.write_all(&self.write_buffer).await?;
        tracing::debug!(
            peer = %self.peer,
            commands = commands.len(),
            bytes = self.write_buffer.len(),
            "sent commands"
        );
        Ok(())
    }

    /// Receives the next record.
    ///
    /// Returns [`None`] once the tracker closes the stream. This method is cancel-safe: if it is
    /// dropped before completing, no data is lost.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket could not be read, or if a record exceeds the maximum length.
    pub async fn recv(&mut self) -> Result<Option<Record>> {
        loop {
            if self.eof {
                return self.codec.decode_eof(&mut self.read_buffer);
            }
            if let Some(record) = self.codec.decode(&mut self.read_buffer)? {
                return Ok(Some(record));
            }
            self.read_buffer.reserve(READ_CHUNK);
            if self.stream.read_buf(&mut self.read_buffer).await? == 0 {
                tracing::debug!(peer = %self.peer, "eye tracker closed the stream");
                self.eof = true;
            }
        }
    }

    /// Shuts down the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket could not be shut down cleanly. The socket is closed either
    /// way.
    pub async fn close(mut self) -> Result<()> {
        let result = self.stream.shutdown().await;
        tracing::info!(peer = %self.peer, "disconnected from eye tracker");
        result.map_err(Error::from)
    }
}

/// Tries each address of the `endpoint` until a connection is established.
async fn establish(endpoint: &Endpoint) -> Result<TcpStream> {
    let mut last_error = None;
    for address in tokio::net::lookup_host((endpoint.host.as_str(), endpoint.port)).await? {
        match TcpStream::connect(address).await {
            Ok(stream) => return Ok(stream),
            Err(error) => {
                tracing::debug!(%address, %error, "connection attempt failed");
                last_error = Some(error);
            }
        }
    }
    Err(last_error.map_or_else(|| Error::Unresolved(endpoint.to_string()), Error::from))
}
