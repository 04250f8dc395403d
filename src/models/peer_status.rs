use serde::{Deserialize, Serialize};

/// Route counters from a protocol's `Routes:` line
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Prefixes {
    pub imported: u64,
    pub exported: u64,
    pub preferred: u64,
}

/// State of one `peer_*` protocol as reported by `show protocols all`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PeerStatus {
    pub session_name: String,
    pub description: Option<String>,
    pub ip_address: Option<String>,
    pub as_number: Option<u32>,
    pub bgp_state: Option<String>,
    pub prefixes: Prefixes,
}

impl PeerStatus {
    pub fn new(session_name: &str) -> Self {
        PeerStatus {
            session_name: session_name.to_string(),
            description: None,
            ip_address: None,
            as_number: None,
            bgp_state: None,
            prefixes: Prefixes::default(),
        }
    }

    pub fn is_established(&self) -> bool {
        self.bgp_state.as_deref() == Some("Established")
    }
}
