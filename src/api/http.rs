//! HTTP/JSON transport for the daemon's prune endpoints.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, ClientBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use super::{
    ApiVersion, DEFAULT_API_VERSION, Engine, FALLBACK_API_VERSION, ImageDeleted,
    ImagePruneReport, PruneReport,
};
use crate::error::{ReclaimError, Result};
use crate::filters::Filters;

/// Daemon address used when nothing else is configured.
pub const DEFAULT_HOST: &str = "unix:///var/run/docker.sock";

/// Request authority for socket connections; the daemon ignores it.
const SOCKET_BASE_URL: &str = "http://localhost";

/// Blocking HTTP client talking to one daemon.
pub struct HttpEngine {
    host: String,
    base_url: String,
    client: Client,
    pinned_version: Option<ApiVersion>,
    negotiated_version: OnceCell<ApiVersion>,
}

impl HttpEngine {
    /// Build a client for `host`. With `api_version` set, no negotiation
    /// request is made. Without a timeout, requests wait for the daemon.
    pub fn new(
        host: &str,
        api_version: Option<ApiVersion>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let endpoint = Endpoint::parse(host)?;
        let mut builder = Client::builder().timeout(timeout);
        if let Some(socket) = &endpoint.socket {
            builder = via_socket(builder, socket)?;
        }
        let client = builder
            .build()
            .map_err(|e| ReclaimError::Config(format!("http client: {}", e)))?;
        debug!(
            host = %host,
            base_url = %endpoint.base_url,
            socket = ?endpoint.socket,
            ?api_version,
            "Created daemon client"
        );
        Ok(Self {
            host: host.to_string(),
            base_url: endpoint.base_url,
            client,
            pinned_version: api_version,
            negotiated_version: OnceCell::new(),
        })
    }

    fn negotiate(&self) -> Result<ApiVersion> {
        let url = format!("{}/version", self.base_url);
        trace!(url = %url, "Negotiating API version");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.send_error(e))?;
        let wire: VersionWire = read_json(response)?;
        let daemon = match wire.api_version.as_deref() {
            Some(v) if !v.is_empty() => v.parse()?,
            _ => FALLBACK_API_VERSION,
        };
        let version = daemon.min(DEFAULT_API_VERSION);
        debug!(daemon = %daemon, using = %version, "Negotiated API version");
        Ok(version)
    }

    fn post_prune<T: DeserializeOwned>(&self, path: &str, filters: &Filters) -> Result<T> {
        let version = self.api_version()?;
        let url = format!(
            "{}/v{}{}?filters={}",
            self.base_url,
            version,
            path,
            urlencoding::encode(&filters.to_json()?)
        );
        debug!(url = %url, "POST prune");
        let response = self
            .client
            .post(&url)
            .send()
            .map_err(|e| self.send_error(e))?;
        read_json(response)
    }

    fn send_error(&self, err: reqwest::Error) -> ReclaimError {
        if err.is_connect() {
            ReclaimError::Unreachable {
                host: self.host.clone(),
                source: err,
            }
        } else {
            ReclaimError::Transport(err)
        }
    }
}

impl Engine for HttpEngine {
    fn api_version(&self) -> Result<ApiVersion> {
        if let Some(version) = self.pinned_version {
            return Ok(version);
        }
        if let Some(version) = self.negotiated_version.get() {
            return Ok(*version);
        }
        let version = self.negotiate()?;
        let _ = self.negotiated_version.set(version);
        Ok(version)
    }

    fn containers_prune(&self, filters: &Filters) -> Result<PruneReport> {
        let wire: ContainersPruneWire = self.post_prune("/containers/prune", filters)?;
        Ok(wire.into())
    }

    fn volumes_prune(&self, filters: &Filters) -> Result<PruneReport> {
        let wire: VolumesPruneWire = self.post_prune("/volumes/prune", filters)?;
        Ok(wire.into())
    }

    fn networks_prune(&self, filters: &Filters) -> Result<PruneReport> {
        let wire: NetworksPruneWire = self.post_prune("/networks/prune", filters)?;
        Ok(wire.into())
    }

    fn images_prune(&self, filters: &Filters) -> Result<ImagePruneReport> {
        let wire: ImagesPruneWire = self.post_prune("/images/prune", filters)?;
        Ok(wire.into())
    }

    fn build_cache_prune(&self, filters: &Filters) -> Result<PruneReport> {
        let wire: BuildCachePruneWire = self.post_prune("/build/prune", filters)?;
        Ok(wire.into())
    }
}

/// Where requests for a daemon host go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub base_url: String,
    /// Set for `unix://` hosts: every connection is made over this socket.
    pub socket: Option<PathBuf>,
}

impl Endpoint {
    /// Resolve a daemon host setting.
    ///
    /// `unix://` connects over the socket, `tcp://` maps to plain HTTP and
    /// `http://` and `https://` pass through.
    pub fn parse(host: &str) -> Result<Self> {
        let host = host.trim();
        if let Some(path) = host.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(ReclaimError::Config(format!(
                    "daemon host '{}' has no socket path",
                    host
                )));
            }
            return Ok(Endpoint {
                base_url: SOCKET_BASE_URL.to_string(),
                socket: Some(PathBuf::from(path)),
            });
        }

        let host = host.trim_end_matches('/');
        let base_url = if let Some(rest) = host.strip_prefix("tcp://") {
            format!("http://{}", rest)
        } else if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            return Err(match host.split_once("://") {
                Some((scheme, _)) => ReclaimError::Config(format!(
                    "unsupported daemon host scheme '{}' in {} (use unix://, tcp://, http:// or https://)",
                    scheme, host
                )),
                None => ReclaimError::Config(format!(
                    "daemon host '{}' has no scheme (expected e.g. {})",
                    host, DEFAULT_HOST
                )),
            });
        };
        Ok(Endpoint {
            base_url,
            socket: None,
        })
    }
}

#[cfg(unix)]
fn via_socket(builder: ClientBuilder, socket: &Path) -> Result<ClientBuilder> {
    Ok(builder.unix_socket(socket.to_path_buf()))
}

#[cfg(not(unix))]
fn via_socket(_builder: ClientBuilder, socket: &Path) -> Result<ClientBuilder> {
    Err(ReclaimError::Config(format!(
        "unix sockets are not supported on this platform: {}",
        socket.display()
    )))
}

fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(daemon_error(status, &body));
    }
    trace!(%status, body = %body, "Daemon response");
    Ok(serde_json::from_str(&body)?)
}

#[derive(Deserialize)]
struct ErrorWire {
    message: String,
}

fn daemon_error(status: StatusCode, body: &str) -> ReclaimError {
    let message = match serde_json::from_str::<ErrorWire>(body) {
        Ok(wire) => wire.message,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => format!("HTTP {}", status),
    };
    ReclaimError::Daemon(message)
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VersionWire {
    #[serde(default)]
    api_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ContainersPruneWire {
    #[serde(default)]
    containers_deleted: Option<Vec<String>>,
    #[serde(default)]
    space_reclaimed: u64,
}

impl From<ContainersPruneWire> for PruneReport {
    fn from(wire: ContainersPruneWire) -> Self {
        PruneReport {
            deleted: wire.containers_deleted.unwrap_or_default(),
            space_reclaimed: wire.space_reclaimed,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VolumesPruneWire {
    #[serde(default)]
    volumes_deleted: Option<Vec<String>>,
    #[serde(default)]
    space_reclaimed: u64,
}

impl From<VolumesPruneWire> for PruneReport {
    fn from(wire: VolumesPruneWire) -> Self {
        PruneReport {
            deleted: wire.volumes_deleted.unwrap_or_default(),
            space_reclaimed: wire.space_reclaimed,
        }
    }
}

// The network endpoint reports no reclaimed space; it decodes as zero.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NetworksPruneWire {
    #[serde(default)]
    networks_deleted: Option<Vec<String>>,
    #[serde(default)]
    space_reclaimed: u64,
}

impl From<NetworksPruneWire> for PruneReport {
    fn from(wire: NetworksPruneWire) -> Self {
        PruneReport {
            deleted: wire.networks_deleted.unwrap_or_default(),
            space_reclaimed: wire.space_reclaimed,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ImageDeleteWire {
    #[serde(default)]
    untagged: Option<String>,
    #[serde(default)]
    deleted: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ImagesPruneWire {
    #[serde(default)]
    images_deleted: Option<Vec<ImageDeleteWire>>,
    #[serde(default)]
    space_reclaimed: u64,
}

impl From<ImagesPruneWire> for ImagePruneReport {
    fn from(wire: ImagesPruneWire) -> Self {
        let deleted = wire
            .images_deleted
            .unwrap_or_default()
            .into_iter()
            .map(|item| match item.untagged.filter(|u| !u.is_empty()) {
                Some(reference) => ImageDeleted::Untagged(reference),
                None => ImageDeleted::Deleted(item.deleted.unwrap_or_default()),
            })
            .collect();
        ImagePruneReport {
            deleted,
            space_reclaimed: wire.space_reclaimed,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BuildCachePruneWire {
    #[serde(default)]
    caches_deleted: Option<Vec<String>>,
    #[serde(default)]
    space_reclaimed: u64,
}

impl From<BuildCachePruneWire> for PruneReport {
    fn from(wire: BuildCachePruneWire) -> Self {
        PruneReport {
            deleted: wire.caches_deleted.unwrap_or_default(),
            space_reclaimed: wire.space_reclaimed,
        }
    }
}
