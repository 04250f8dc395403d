//! Safe deployment of a new BIRD configuration
//!
//! The uploaded file is stored, checked with `configure check`, activated with
//! `configure`, and only then recorded as the `bird-<ip_version>-latest.conf`
//! link. A file BIRD rejects is removed again so the folder only holds
//! configs that were (at least once) accepted.

use std::io;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::{info, warn};
use regex::Regex;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::command::{execute, Configure, Params, ValidateConfig};
use crate::error::{Error, Result};
use crate::models::{IpVersion, Reply};
use crate::socket::Connector;

lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();
}

/// A config file as handed to us by a caller
#[derive(Debug, Clone)]
pub struct ConfigUpload {
    pub filename: String,
    pub contents: Vec<u8>,
}

impl ConfigUpload {
    pub fn new<S: Into<String>, B: Into<Vec<u8>>>(filename: S, contents: B) -> Self {
        Self {
            filename: filename.into(),
            contents: contents.into(),
        }
    }
}

/// Reduce a caller-supplied filename to a plain, ASCII-only file name
///
/// Path separators become underscores and leading/trailing dots are dropped,
/// so the result can never leave the config folder. May return an empty string.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    UNSAFE_CHARS
        .replace_all(&joined, "")
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Path of the link naming the active config for `ip_version`
pub fn latest_path(folder: &Path, ip_version: IpVersion) -> PathBuf {
    folder.join(format!("bird-{}-latest.conf", ip_version))
}

async fn write_contents(file: &mut fs::File, contents: &[u8]) -> io::Result<()> {
    file.write_all(contents).await?;
    file.sync_all().await
}

/// Save the upload under its sanitized name in `folder`
///
/// Never replaces an existing file: the name may belong to the active config
/// or to one of the `latest` links.
async fn store_config_file(folder: &Path, upload: &ConfigUpload) -> Result<PathBuf> {
    let filename = secure_filename(&upload.filename);
    if filename.is_empty() {
        return Err(Error::Configuration(format!(
            "Invalid config filename: {:?}",
            upload.filename
        )));
    }
    let path = folder.join(filename);
    if [IpVersion::Ipv4, IpVersion::Ipv6]
        .iter()
        .any(|ip_version| path == latest_path(folder, *ip_version))
    {
        return Err(Error::Configuration(format!(
            "Reserved config filename: {}",
            path.display()
        )));
    }

    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
    {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            return Err(Error::Configuration(format!(
                "Config file {} already exists",
                path.display()
            )))
        }
        Err(err) => {
            return Err(Error::Storage(format!(
                "Unable to save config file {}: {}",
                path.display(),
                err
            )))
        }
    };
    if let Err(err) = write_contents(&mut file, &upload.contents).await {
        drop(file);
        // Don't leave a half-written file behind
        let _ = fs::remove_file(&path).await;
        return Err(Error::Storage(format!(
            "Unable to save config file {}: {}",
            path.display(),
            err
        )));
    }
    Ok(path)
}

async fn remove_config_file(path: &Path) -> Result<()> {
    fs::remove_file(path).await.map_err(|err| {
        Error::Storage(format!(
            "Unable to remove config file {}: {}",
            path.display(),
            err
        ))
    })
}

/// Point the `latest` link for `ip_version` at `target`
///
/// The new link is created under a temporary name and renamed over the old
/// one, so readers always see either the previous or the new target.
pub async fn repoint_latest(folder: &Path, ip_version: IpVersion, target: &Path) -> Result<PathBuf> {
    let latest = latest_path(folder, ip_version);
    let staging = folder.join(format!(".bird-{}-latest.conf.tmp", ip_version));
    let storage_err = |action: &str, err: io::Error| {
        Error::Storage(format!(
            "Unable to {} {}: {}",
            action,
            latest.display(),
            err
        ))
    };

    // Left over from an interrupted deploy
    match fs::remove_file(&staging).await {
        Err(err) if err.kind() != io::ErrorKind::NotFound => {
            return Err(storage_err("clear staging link for", err))
        }
        _ => (),
    }
    fs::symlink(target, &staging)
        .await
        .map_err(|err| storage_err("create staging link for", err))?;
    if let Err(err) = fs::rename(&staging, &latest).await {
        let _ = fs::remove_file(&staging).await;
        return Err(storage_err("replace", err));
    }
    Ok(latest)
}

/// Store → validate → commit → repoint `latest`
///
/// Returns the reply of the last command that ran: the validation failure
/// when BIRD rejects the file (which is then removed), otherwise the reply of
/// `configure`. The link only moves when `configure` succeeded.
pub async fn deploy_config<C: Connector>(
    connector: &C,
    folder: &Path,
    ip_version: IpVersion,
    upload: &ConfigUpload,
) -> Result<Reply<String>> {
    let path = store_config_file(folder, upload).await?;
    info!("Stored {} config at {}", ip_version, path.display());

    let mut conn = match connector.connect().await {
        Ok(conn) => conn,
        Err(err) => {
            warn!("Unable to reach BIRD ({}), removing {}", err, path.display());
            remove_config_file(&path).await?;
            return Ok(Reply::Failure(err.to_string()));
        }
    };

    let params = Params::new().with("config_filename", path.to_string_lossy().into_owned());
    let validation = execute::<ValidateConfig, _>(&mut conn, &params).await?;
    if let Reply::Failure(message) = &validation {
        warn!("{} rejected by BIRD, removing: {}", path.display(), message);
        remove_config_file(&path).await?;
        return Ok(validation);
    }
    info!("Validated {}", path.display());

    let configured = execute::<Configure, _>(&mut conn, &params).await?;
    match &configured {
        Reply::Success(_) => {
            let latest = repoint_latest(folder, ip_version, &path).await?;
            info!("Committed {}, {} updated", path.display(), latest.display());
        }
        Reply::Failure(message) => warn!("Failed to activate {}: {}", path.display(), message),
    }
    Ok(configured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedConnector;

    fn ok(text: &str) -> Reply<String> {
        Reply::Success(text.to_string())
    }

    fn failed(text: &str) -> Reply<String> {
        Reply::Failure(text.to_string())
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("bird.conf"), "bird.conf");
        assert_eq!(secure_filename("My new config.conf"), "My_new_config.conf");
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("..\\bird.conf"), "bird.conf");
        assert_eq!(secure_filename("rs-1 (final);.conf"), "rs-1_final.conf");
        assert_eq!(secure_filename("ñbird.conf"), "bird.conf");
        assert_eq!(secure_filename("..."), "");
    }

    #[test]
    fn test_latest_path() {
        assert_eq!(
            latest_path(Path::new("/etc/bird"), IpVersion::Ipv6),
            PathBuf::from("/etc/bird/bird-ipv6-latest.conf")
        );
    }

    #[tokio::test]
    async fn test_deploy_success_repoints_latest() {
        let dir = tempfile::tempdir().unwrap();
        let connector = ScriptedConnector::new(vec![
            ok("Configuration OK"),
            ok("Reconfigured"),
        ]);
        let upload = ConfigUpload::new("rs1.conf", "router id 192.0.2.1;\n");

        let reply = deploy_config(&connector, dir.path(), IpVersion::Ipv4, &upload)
            .await
            .unwrap();

        let stored = dir.path().join("rs1.conf");
        assert_eq!(reply, ok("Reconfigured"));
        assert_eq!(
            std::fs::read_to_string(&stored).unwrap(),
            "router id 192.0.2.1;\n"
        );
        let latest = dir.path().join("bird-ipv4-latest.conf");
        assert_eq!(std::fs::read_link(&latest).unwrap(), stored);
        assert_eq!(
            connector.sent(),
            vec![
                format!("configure check \"{}\"", stored.display()),
                format!("configure \"{}\"", stored.display()),
            ]
        );
        // Both commands share one connection
        assert_eq!(connector.connection_count(), 1);
        assert!(!dir.path().join(".bird-ipv4-latest.conf.tmp").exists());
    }

    #[tokio::test]
    async fn test_deploy_validation_failure_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let previous = dir.path().join("old.conf");
        std::fs::write(&previous, "# old\n").unwrap();
        let latest = dir.path().join("bird-ipv4-latest.conf");
        std::os::unix::fs::symlink(&previous, &latest).unwrap();

        let connector =
            ScriptedConnector::new(vec![failed("new.conf, line 1: syntax error")]);
        let upload = ConfigUpload::new("new.conf", "router id;\n");
        let reply = deploy_config(&connector, dir.path(), IpVersion::Ipv4, &upload)
            .await
            .unwrap();

        assert_eq!(reply, failed("new.conf, line 1: syntax error"));
        assert!(!dir.path().join("new.conf").exists());
        assert_eq!(std::fs::read_link(&latest).unwrap(), previous);
        // Never got as far as `configure`
        assert_eq!(connector.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_deploy_commit_failure_keeps_latest() {
        let dir = tempfile::tempdir().unwrap();
        let connector = ScriptedConnector::new(vec![
            ok("Configuration OK"),
            failed("Reconfiguration in progress"),
        ]);
        let upload = ConfigUpload::new("rs1.conf", "router id 192.0.2.1;\n");
        let reply = deploy_config(&connector, dir.path(), IpVersion::Ipv6, &upload)
            .await
            .unwrap();

        assert_eq!(reply, failed("Reconfiguration in progress"));
        assert!(dir.path().join("rs1.conf").exists());
        assert!(std::fs::symlink_metadata(dir.path().join("bird-ipv6-latest.conf")).is_err());
    }

    #[tokio::test]
    async fn test_repoint_replaces_existing_link() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.conf");
        let second = dir.path().join("second.conf");
        std::fs::write(&first, "").unwrap();
        std::fs::write(&second, "").unwrap();

        repoint_latest(dir.path(), IpVersion::Ipv4, &first)
            .await
            .unwrap();
        let latest = repoint_latest(dir.path(), IpVersion::Ipv4, &second)
            .await
            .unwrap();
        assert_eq!(std::fs::read_link(&latest).unwrap(), second);
        // The IPv6 link is untouched
        assert!(std::fs::symlink_metadata(latest_path(dir.path(), IpVersion::Ipv6)).is_err());
    }

    #[tokio::test]
    async fn test_deploy_storage_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let connector = ScriptedConnector::new(vec![]);
        let upload = ConfigUpload::new("rs1.conf", "");
        let err = deploy_config(&connector, &missing, IpVersion::Ipv4, &upload)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(connector.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_deploy_rejects_empty_filename() {
        let dir = tempfile::tempdir().unwrap();
        let connector = ScriptedConnector::new(vec![]);
        let upload = ConfigUpload::new("../..", "");
        let err = deploy_config(&connector, dir.path(), IpVersion::Ipv4, &upload)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_deploy_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let active = dir.path().join("rs1.conf");
        std::fs::write(&active, "router id 192.0.2.1;\n").unwrap();
        let latest = dir.path().join("bird-ipv4-latest.conf");
        std::os::unix::fs::symlink(&active, &latest).unwrap();

        let connector = ScriptedConnector::new(vec![failed("syntax error")]);
        let upload = ConfigUpload::new("rs1.conf", "router id;\n");
        let err = deploy_config(&connector, dir.path(), IpVersion::Ipv4, &upload)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(
            std::fs::read_to_string(&latest).unwrap(),
            "router id 192.0.2.1;\n"
        );
        assert_eq!(std::fs::read_link(&latest).unwrap(), active);
        assert_eq!(connector.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_deploy_rejects_latest_link_name() {
        let dir = tempfile::tempdir().unwrap();
        let previous = dir.path().join("rs1.conf");
        std::fs::write(&previous, "first;\n").unwrap();
        let latest = dir.path().join("bird-ipv4-latest.conf");
        std::os::unix::fs::symlink(&previous, &latest).unwrap();

        let connector = ScriptedConnector::new(vec![ok(""), ok("")]);
        for name in &["bird-ipv4-latest.conf", "bird-ipv6-latest.conf"] {
            let upload = ConfigUpload::new(*name, "second;\n");
            let err = deploy_config(&connector, dir.path(), IpVersion::Ipv4, &upload)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Configuration(_)));
        }

        assert_eq!(std::fs::read_to_string(&previous).unwrap(), "first;\n");
        assert_eq!(std::fs::read_link(&latest).unwrap(), previous);
        assert!(std::fs::symlink_metadata(dir.path().join("bird-ipv6-latest.conf")).is_err());
        assert_eq!(connector.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_deploy_unreachable_daemon_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let connector = ScriptedConnector::refusing();
        let upload = ConfigUpload::new("rs1.conf", "");
        let reply = deploy_config(&connector, dir.path(), IpVersion::Ipv4, &upload)
            .await
            .unwrap();
        assert!(!reply.is_success());
        assert!(!dir.path().join("rs1.conf").exists());
    }
}
