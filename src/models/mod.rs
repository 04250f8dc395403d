mod peer_status;
mod reply;
mod route;

pub use peer_status::{PeerStatus, Prefixes};
pub use reply::Reply;
pub use route::Route;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Address family served by one BIRD instance (BIRD 1.x runs `bird` and `bird6`)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    Ipv4,
    Ipv6,
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let word = match self {
            IpVersion::Ipv4 => "ipv4",
            IpVersion::Ipv6 => "ipv6",
        };
        write!(f, "{}", word)
    }
}

impl FromStr for IpVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ipv4" => Ok(IpVersion::Ipv4),
            "ipv6" => Ok(IpVersion::Ipv6),
            _ => Err(Error::Configuration(format!("Invalid IP version: {}", s))),
        }
    }
}

/// Which side of a protocol's export filter `show route` should look at
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Routes accepted by the export filter
    Export,
    /// Routes offered to the export filter
    Preexport,
    /// Routes rejected by the export filter
    Noexport,
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let word = match self {
            ExportMode::Export => "export",
            ExportMode::Preexport => "preexport",
            ExportMode::Noexport => "noexport",
        };
        write!(f, "{}", word)
    }
}

impl FromStr for ExportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "export" => Ok(ExportMode::Export),
            "preexport" => Ok(ExportMode::Preexport),
            "noexport" => Ok(ExportMode::Noexport),
            _ => Err(Error::Configuration(format!("Invalid export mode: {}", s))),
        }
    }
}
