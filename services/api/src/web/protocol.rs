//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the site's countdown banner and
//! the API server.

use academy_core::{RemainingTime, Rollover, RolloverKind};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Starts a new cycle immediately.
    Reset,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The time left in the current cycle. Sent once a second.
    Tick {
        hours: u64,
        minutes: u64,
        seconds: u64,
        total_seconds: u64,
    },

    /// A new cycle started, either because the old one ran out or after a reset.
    CycleRestarted { anchor_ms: i64, manual: bool },

    /// Reports an error to the client, which should stop showing the countdown.
    Error { message: String },
}

impl From<RemainingTime> for ServerMessage {
    fn from(remaining: RemainingTime) -> Self {
        Self::Tick {
            hours: remaining.hours,
            minutes: remaining.minutes,
            seconds: remaining.seconds,
            total_seconds: remaining.total_seconds,
        }
    }
}

impl From<&Rollover> for ServerMessage {
    fn from(rollover: &Rollover) -> Self {
        Self::CycleRestarted {
            anchor_ms: rollover.anchor_ms,
            manual: rollover.kind == RolloverKind::Manual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tick_serializes_with_type_tag() {
        let msg = ServerMessage::from(RemainingTime::from_millis(3_723_000));
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "tick", "hours": 1, "minutes": 2, "seconds": 3, "total_seconds": 3723})
        );
    }

    #[test]
    fn reset_parses_from_client_json() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"reset"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Reset));
    }
}
