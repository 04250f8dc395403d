use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::command::{execute, BirdCommand, Params, ShowProtocols, ShowRoute};
use crate::config::ProxyConfig;
use crate::deploy::{self, ConfigUpload};
use crate::error::{Error, Result};
use crate::models::{ExportMode, IpVersion, PeerStatus, Reply, Route};
use crate::socket::{BirdSocket, Connector};

/// Options of a `show route` query; everything unset is left out of the command
#[derive(Debug, Clone, Default)]
pub struct RouteQuery {
    pub prefix: Option<String>,
    /// Look `prefix` up the way the forwarding table would (`for <prefix>`)
    pub forwarding_table: bool,
    pub table: Option<String>,
    pub filter: Option<String>,
    pub where_expr: Option<String>,
    pub detail: bool,
    pub export_mode: Option<ExportMode>,
    pub export_protocol: Option<String>,
    pub protocol: Option<String>,
}

// An empty string counts as not supplied
fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

impl RouteQuery {
    /// Translate the query into `show route` template parameters
    ///
    /// Conflicting or incomplete options are a configuration error.
    pub fn to_params(&self) -> Result<Params> {
        let prefix = match (supplied(&self.prefix), self.forwarding_table) {
            (Some(prefix), true) => format!("for {}", prefix),
            (Some(prefix), false) => prefix.to_string(),
            (None, _) => String::new(),
        };
        let cond = match (supplied(&self.filter), supplied(&self.where_expr)) {
            (Some(_), Some(_)) => {
                return Err(Error::Configuration(
                    "Incoherent show route parameters: filter, where".to_string(),
                ))
            }
            (Some(filter), None) => format!("filter {}", filter),
            (None, Some(expr)) => format!("where {}", expr),
            (None, None) => String::new(),
        };
        let export = match (self.export_mode, supplied(&self.export_protocol)) {
            (Some(mode), Some(protocol)) => format!("{} {}", mode, protocol),
            (Some(_), None) => {
                return Err(Error::Configuration(
                    "Missing value for export mode".to_string(),
                ))
            }
            (None, _) => String::new(),
        };
        let protocol = supplied(&self.protocol)
            .map(|name| format!("protocol {}", name))
            .unwrap_or_default();

        Ok(Params::new()
            .with("prefix", prefix)
            .with("table", supplied(&self.table).unwrap_or_default())
            .with("cond", cond)
            .with("detail", if self.detail { "all" } else { "" })
            .with("export", export)
            .with("protocol", protocol))
    }
}

/// Operations against the BIRD daemon serving one IP version
///
/// Every call opens its own connection; nothing is shared between calls.
pub struct BirdManager<C: Connector = BirdSocket> {
    ip_version: IpVersion,
    connector: C,
    config_folder: PathBuf,
}

impl BirdManager<BirdSocket> {
    pub fn new(ip_version: IpVersion, config: &ProxyConfig) -> Self {
        Self::with_connector(
            ip_version,
            config.socket_for(ip_version),
            &config.config_folder,
        )
    }
}

impl<C: Connector> BirdManager<C> {
    pub fn with_connector<P: AsRef<Path>>(ip_version: IpVersion, connector: C, config_folder: P) -> Self {
        Self {
            ip_version,
            connector,
            config_folder: config_folder.as_ref().to_path_buf(),
        }
    }

    pub fn ip_version(&self) -> IpVersion {
        self.ip_version
    }

    /// `show protocols all [wildcard]`, one record per `peer_*` session
    pub async fn protocol_information(&self, wildcard: Option<&str>) -> Result<Reply<Vec<PeerStatus>>> {
        let params = Params::new().with("wildcard", wildcard.unwrap_or_default());
        self.run::<ShowProtocols>(&params).await
    }

    /// `show route ...` built from `query`
    ///
    /// The query is checked before a connection is opened.
    pub async fn routes_information(&self, query: &RouteQuery) -> Result<Reply<Vec<Route>>> {
        let params = query.to_params()?;
        self.run::<ShowRoute>(&params).await
    }

    /// Store, validate and activate a new config, see [`deploy::deploy_config`]
    pub async fn deploy_config(&self, upload: &ConfigUpload) -> Result<Reply<String>> {
        deploy::deploy_config(&self.connector, &self.config_folder, self.ip_version, upload).await
    }

    async fn run<B: BirdCommand>(&self, params: &Params) -> Result<Reply<B::Output>> {
        let mut conn = match self.connector.connect().await {
            Ok(conn) => conn,
            Err(err) => {
                warn!("Unable to reach BIRD for {}: {}", self.ip_version, err);
                return Ok(Reply::Failure(err.to_string()));
            }
        };
        debug!("Connected to BIRD for {}", self.ip_version);
        execute::<B, _>(&mut conn, params).await
    }
}
