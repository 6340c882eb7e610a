use tether_protocol::Request;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::error::{Result, SchedulerError};

/// The transport side of one persistent connection, as the scheduler sees it.
///
/// `send` must never block: it hands the request to the write path and
/// returns. Failures are reported but the scheduler never retries early.
pub trait Connection: Send + Sync {
    fn is_open(&self) -> bool;

    fn send(&self, request: Request) -> Result<()>;
}

/// [`Connection`] that queues requests onto a bounded mpsc channel drained by
/// the transport's writer task.
///
/// The connection counts as open for as long as the receiving side is alive.
#[derive(Debug, Clone)]
pub struct ChannelConnection {
    tx: mpsc::Sender<Request>,
}

impl ChannelConnection {
    pub fn new(tx: mpsc::Sender<Request>) -> Self {
        Self { tx }
    }

    /// Build a connection plus the receiver its writer task should drain.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Request>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

impl Connection for ChannelConnection {
    fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send(&self, request: Request) -> Result<()> {
        // try_send never blocks a task body; a full queue drops this emission.
        self.tx.try_send(request).map_err(|e| match e {
            TrySendError::Full(_) => SchedulerError::SendFailed("outbound queue full".to_string()),
            TrySendError::Closed(_) => SchedulerError::ConnectionClosed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_until_receiver_dropped() {
        let (conn, rx) = ChannelConnection::channel(4);
        assert!(conn.is_open());
        drop(rx);
        assert!(!conn.is_open());
        assert!(matches!(
            conn.send(Request::heartbeat(None)),
            Err(SchedulerError::ConnectionClosed)
        ));
    }

    #[test]
    fn full_queue_is_a_send_failure() {
        let (conn, mut rx) = ChannelConnection::channel(1);
        conn.send(Request::heartbeat(None)).unwrap();
        assert!(matches!(
            conn.send(Request::heartbeat(None)),
            Err(SchedulerError::SendFailed(_))
        ));
        assert!(rx.try_recv().is_ok());
    }
}
