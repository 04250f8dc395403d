use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use serde::Deserialize;

struct Defaults {}

impl Defaults {
    fn bird_socket() -> PathBuf {
        PathBuf::from("/var/run/bird/bird.ctl")
    }

    fn bird6_socket() -> PathBuf {
        PathBuf::from("/var/run/bird/bird6.ctl")
    }

    fn socket_timeout() -> u64 {
        10
    }
}

/// Config (toml) representation of the proxy settings
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct ProxyConfigSpec {
    // Control socket of the IPv4 daemon
    #[serde(default = "Defaults::bird_socket")]
    pub(super) bird_socket: PathBuf,
    // Control socket of the IPv6 daemon
    #[serde(default = "Defaults::bird6_socket")]
    pub(super) bird6_socket: PathBuf,
    // Where deployed configs and the per-version "latest" links are kept
    pub(super) config_folder: PathBuf,
    // Seconds allowed for connecting and for each reply line
    #[serde(default = "Defaults::socket_timeout")]
    pub(super) socket_timeout: u64,
}

impl ProxyConfigSpec {
    pub(super) fn from_str(contents: &str) -> io::Result<Self> {
        toml::from_str(contents).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    pub(super) fn from_file(path: &str) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_str(&contents)
    }
}
