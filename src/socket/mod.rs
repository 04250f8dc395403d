//! BIRD control-socket transport
//!
//! Every operation opens its own [`BirdConnection`], sends one command and
//! reads one reply. Nothing is pooled or retried; the configured timeout is
//! the only way a call gets cut short.

mod codec;

pub use codec::{ReplyCodec, ReplyLine, ReplyProtocol};

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use log::{debug, trace, warn};
use tokio::net::UnixStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;

use crate::models::Reply;

/// Sends a rendered command and returns the daemon's reply text
///
/// When `allow_empty_lines` is false, the first blank line ends the reply text.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, command: &str, allow_empty_lines: bool) -> Reply<String>;
}

/// Opens a fresh [`Transport`] for each operation
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Transport;

    async fn connect(&self) -> io::Result<Self::Connection>;
}

/// Address of one BIRD control socket
#[derive(Debug, Clone)]
pub struct BirdSocket {
    path: PathBuf,
    timeout: Duration,
}

impl BirdSocket {
    pub fn new<P: AsRef<Path>>(path: P, timeout: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Connector for BirdSocket {
    type Connection = BirdConnection;

    async fn connect(&self) -> io::Result<BirdConnection> {
        debug!("Connecting to BIRD at {}", self.path.display());
        let stream = timeout(self.timeout, UnixStream::connect(&self.path))
            .await
            .map_err(|_| timed_out("connecting", self.timeout))??;
        let mut conn = BirdConnection {
            protocol: Framed::new(stream, ReplyCodec::new()),
            timeout: self.timeout,
        };
        // BIRD greets every client with "0001 BIRD x.y.z ready."
        let (ok, welcome) = conn.read_reply(true).await?;
        if !ok {
            return Err(io::Error::new(ErrorKind::ConnectionRefused, welcome));
        }
        trace!("Connected: {}", welcome);
        Ok(conn)
    }
}

pub struct BirdConnection {
    protocol: ReplyProtocol,
    timeout: Duration,
}

impl BirdConnection {
    /// Read lines until the reply's final status line
    ///
    /// Returns whether the status was a success, plus the text of the lines.
    async fn read_reply(&mut self, allow_empty_lines: bool) -> io::Result<(bool, String)> {
        let mut lines: Vec<String> = Vec::new();
        let mut collecting = true;
        loop {
            let line = match timeout(self.timeout, self.protocol.next()).await {
                Ok(Some(line)) => line?,
                Ok(None) => {
                    return Err(io::Error::new(
                        ErrorKind::UnexpectedEof,
                        "BIRD closed the connection mid-reply",
                    ))
                }
                Err(_) => return Err(timed_out("reading reply", self.timeout)),
            };
            trace!("{:?}", line);

            if line.is_final() {
                let is_error = line.is_error();
                // Keep the error text even after a blank line stopped collection
                if (collecting || is_error) && !line.text.is_empty() {
                    lines.push(line.text);
                }
                return Ok((!is_error, lines.join("\n")));
            }
            if !collecting {
                continue;
            }
            if line.text.is_empty() && !allow_empty_lines {
                collecting = false;
                continue;
            }
            lines.push(line.text);
        }
    }
}

#[async_trait]
impl Transport for BirdConnection {
    async fn send(&mut self, command: &str, allow_empty_lines: bool) -> Reply<String> {
        debug!("Sending command: {}", command);
        let sent = timeout(self.timeout, self.protocol.send(command.to_string())).await;
        let sent = match sent {
            Ok(sent) => sent,
            Err(_) => Err(timed_out("sending command", self.timeout)),
        };
        if let Err(err) = sent {
            warn!("Failed to send '{}': {}", command, err);
            return Reply::Failure(err.to_string());
        }
        match self.read_reply(allow_empty_lines).await {
            Ok((true, text)) => {
                debug!("Received {} bytes for '{}'", text.len(), command);
                Reply::Success(text)
            }
            Ok((false, text)) => {
                debug!("BIRD rejected '{}': {}", command, text);
                Reply::Failure(text)
            }
            Err(err) => {
                warn!("Failed to read reply for '{}': {}", command, err);
                Reply::Failure(err.to_string())
            }
        }
    }
}

fn timed_out(action: &str, after: Duration) -> io::Error {
    io::Error::new(
        ErrorKind::TimedOut,
        format!("Timed out {} after {:?}", action, after),
    )
}
