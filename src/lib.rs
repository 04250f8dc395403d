//! # bird-proxy
//!
//! Query and reconfigure a running [BIRD](https://bird.network.cz/) routing
//! daemon over its control socket: peer session status, route tables, and a
//! validate-then-activate deployment of new configuration files.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use bird_proxy::{BirdManager, IpVersion, ProxyConfig};
//!
//! let config = ProxyConfig::from_file("/etc/bird-proxy/bird-proxy.toml")?;
//! let manager = BirdManager::new(IpVersion::Ipv4, &config);
//! if let Some(peers) = manager.protocol_information(Some("peer_*")).await?.success() {
//!     for peer in peers {
//!         println!("{} {:?}", peer.session_name, peer.bgp_state);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod deploy;
pub mod error;
pub mod manager;
pub mod models;
pub mod parse;
pub mod socket;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(test)]
mod testing;

pub use config::ProxyConfig;
pub use deploy::ConfigUpload;
pub use error::{Error, Result};
pub use manager::{BirdManager, RouteQuery};
pub use models::{ExportMode, IpVersion, PeerStatus, Reply, Route};
