//! In-memory stand-ins for the control socket

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::models::Reply;
use crate::socket::{Connector, Transport};

type SentLog = Arc<Mutex<Vec<(String, bool)>>>;

/// Answers each command with the next scripted reply and records what was sent
pub struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<Reply<String>>>>,
    sent: SentLog,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Reply<String>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            sent: Arc::default(),
        }
    }

    pub fn sent(&self) -> Vec<(String, bool)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&mut self, command: &str, allow_empty_lines: bool) -> Reply<String> {
        self.sent
            .lock()
            .unwrap()
            .push((command.to_string(), allow_empty_lines));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::Failure("no scripted reply".to_string()))
    }
}

/// Hands out transports that share one reply script and one sent-command log
pub struct ScriptedConnector {
    replies: Arc<Mutex<VecDeque<Reply<String>>>>,
    sent: SentLog,
    refuse: bool,
    connections: Arc<Mutex<usize>>,
}

impl ScriptedConnector {
    pub fn new(replies: Vec<Reply<String>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            sent: Arc::default(),
            refuse: false,
            connections: Arc::default(),
        }
    }

    /// A connector whose socket is never reachable
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::new(vec![])
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(command, _)| command.clone())
            .collect()
    }

    pub fn connection_count(&self) -> usize {
        *self.connections.lock().unwrap()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Connection = ScriptedTransport;

    async fn connect(&self) -> io::Result<ScriptedTransport> {
        if self.refuse {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "Connection refused",
            ));
        }
        *self.connections.lock().unwrap() += 1;
        Ok(ScriptedTransport {
            replies: Arc::clone(&self.replies),
            sent: Arc::clone(&self.sent),
        })
    }
}
