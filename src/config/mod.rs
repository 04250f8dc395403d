mod file;

use std::io::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::IpVersion;
use crate::socket::BirdSocket;

/// Proxy settings, loaded from a TOML file
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bird_socket: PathBuf,
    pub bird6_socket: PathBuf,
    pub config_folder: PathBuf,
    pub socket_timeout: Duration,
}

impl ProxyConfig {
    /// Parse a TOML config file and return a ProxyConfig
    pub fn from_file(path: &str) -> Result<Self> {
        let spec = file::ProxyConfigSpec::from_file(path)?;
        Ok(Self::from_spec(spec))
    }

    fn from_spec(spec: file::ProxyConfigSpec) -> Self {
        Self {
            bird_socket: spec.bird_socket,
            bird6_socket: spec.bird6_socket,
            config_folder: spec.config_folder,
            socket_timeout: Duration::from_secs(spec.socket_timeout),
        }
    }

    /// Control socket path of the daemon serving `ip_version`
    pub fn socket_path(&self, ip_version: IpVersion) -> &Path {
        match ip_version {
            IpVersion::Ipv4 => &self.bird_socket,
            IpVersion::Ipv6 => &self.bird6_socket,
        }
    }

    pub fn socket_for(&self, ip_version: IpVersion) -> BirdSocket {
        BirdSocket::new(self.socket_path(ip_version), self.socket_timeout)
    }
}
