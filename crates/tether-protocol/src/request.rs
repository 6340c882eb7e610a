use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a request asks the peer to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Liveness ping, sent while the session is idle.
    Heartbeat,
    /// A changed screen snapshot, sent while the session is under control.
    Screen,
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Command::Heartbeat => "heartbeat",
            Command::Screen => "screen",
        };
        write!(f, "{s}")
    }
}

/// Client → server request envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// UUID v4, unique per emission.
    pub id: String,
    pub command: Command,
    /// Name the server assigned to this client on connect, if any yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    /// Raw bytes for `Screen`; always absent for `Heartbeat`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Vec<u8>>,
    /// Unix epoch milliseconds at build time.
    pub ts: i64,
}

impl Request {
    fn build(command: Command, session: Option<&str>, payload: Option<Vec<u8>>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            command,
            session: session.map(str::to_string),
            payload,
            ts: Utc::now().timestamp_millis(),
        }
    }

    pub fn heartbeat(session: Option<&str>) -> Self {
        Self::build(Command::Heartbeat, session, None)
    }

    pub fn screen(session: Option<&str>, snapshot: Vec<u8>) -> Self {
        Self::build(Command::Screen, session, Some(snapshot))
    }

    pub fn payload_len(&self) -> usize {
        self.payload.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heartbeat_carries_no_payload() {
        let req = Request::heartbeat(Some("puppet-7"));
        assert_eq!(req.command, Command::Heartbeat);
        assert_eq!(req.session.as_deref(), Some("puppet-7"));
        assert!(req.payload.is_none());
        assert_eq!(req.payload_len(), 0);
    }

    #[test]
    fn screen_carries_snapshot_bytes() {
        let req = Request::screen(None, vec![1, 2, 3, 9]);
        assert_eq!(req.command, Command::Screen);
        assert_eq!(req.payload.as_deref(), Some(&[1u8, 2, 3, 9][..]));
        assert!(req.session.is_none());
    }

    #[test]
    fn every_request_gets_its_own_id() {
        let a = Request::heartbeat(None);
        let b = Request::heartbeat(None);
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }
}
