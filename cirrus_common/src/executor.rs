use ::core::fmt::Display;

use ::serde::{Deserialize, Serialize};

/// Base port of the pin socket of an executor, offset by the slot id.
pub const PIN_PORT: u16 = 4000;
/// Base port of the unpin socket of an executor, offset by the slot id.
pub const UNPIN_PORT: u16 = 4010;

/// One execution slot: a thread on an executor node.
/// Ordered by node address then slot, which is the tie-break order of placement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExecutorLocation {
    pub node: String,
    pub slot: u16,
}

impl ExecutorLocation {
    pub fn new(node: impl Into<String>, slot: u16) -> Self {
        Self {
            node: node.into(),
            slot,
        }
    }

    /// URL of the pin endpoint when the pin sockets start at `base_port`.
    pub fn pin_address(&self, base_port: u16) -> String {
        self.address(base_port, "pin")
    }

    /// URL of the unpin endpoint when the unpin sockets start at `base_port`.
    pub fn unpin_address(&self, base_port: u16) -> String {
        self.address(base_port, "unpin")
    }

    fn address(&self, base_port: u16, path: &str) -> String {
        let port = u32::from(base_port) + u32::from(self.slot);
        format!("http://{}:{}/{}", self.node, port, path)
    }
}

impl Display for ExecutorLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.node, self.slot)
    }
}

/// Body of a pin request: who asks and which function to pin.
pub fn pin_message(requester_ip: &str, function: &str) -> String {
    format!("{}:{}", requester_ip, function)
}

/// Reply of an executor to a pin request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinResponse {
    #[serde(flatten)]
    pub location: ExecutorLocation,
    pub success: bool,
}

impl PinResponse {
    pub fn accepted(location: ExecutorLocation) -> Self {
        Self {
            location,
            success: true,
        }
    }

    pub fn rejected(location: ExecutorLocation) -> Self {
        Self {
            location,
            success: false,
        }
    }
}
