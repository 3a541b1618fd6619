//! Remote daemon API consumed by the prune commands.
//!
//! All matching, reference counting and reclamation happens on the daemon.
//! This module only describes the calls and their reports; [`http`] holds
//! the production transport.

pub mod http;

use std::fmt;
use std::str::FromStr;

use crate::error::{ReclaimError, Result};
use crate::filters::Filters;

/// Report returned by the container, volume, network and build cache
/// prune endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub deleted: Vec<String>,
    pub space_reclaimed: u64,
}

/// One entry of an image prune report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageDeleted {
    Untagged(String),
    Deleted(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePruneReport {
    pub deleted: Vec<ImageDeleted>,
    pub space_reclaimed: u64,
}

/// Daemon API version, compared numerically (`1.9 < 1.31`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

/// Version this client speaks when the daemon supports it.
pub const DEFAULT_API_VERSION: ApiVersion = ApiVersion::new(1, 41);

/// Assumed when the daemon does not report a version.
pub const FALLBACK_API_VERSION: ApiVersion = ApiVersion::new(1, 24);

/// First API version with the build cache prune endpoint.
pub const BUILD_CACHE_PRUNE_MIN_VERSION: ApiVersion = ApiVersion::new(1, 31);

impl FromStr for ApiVersion {
    type Err = ReclaimError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_start_matches('v');
        let invalid = || ReclaimError::InvalidApiVersion(s.to_string());
        let (major, minor) = trimmed.split_once('.').ok_or_else(invalid)?;
        Ok(ApiVersion {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The remote collaborator: one call per prune endpoint plus version access.
pub trait Engine {
    /// API version requests are made with, negotiated with the daemon if needed.
    fn api_version(&self) -> Result<ApiVersion>;

    fn containers_prune(&self, filters: &Filters) -> Result<PruneReport>;

    fn volumes_prune(&self, filters: &Filters) -> Result<PruneReport>;

    fn networks_prune(&self, filters: &Filters) -> Result<PruneReport>;

    fn images_prune(&self, filters: &Filters) -> Result<ImagePruneReport>;

    fn build_cache_prune(&self, filters: &Filters) -> Result<PruneReport>;
}
