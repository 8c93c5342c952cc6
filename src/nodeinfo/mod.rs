/// NodeInfo Resolution System
///
/// Resolves a fediverse domain to the software it reports through the
/// NodeInfo well-known discovery protocol, caching results per domain.

pub mod cache;
pub mod discovery;
pub mod resolver;
pub mod snapshot;

pub use cache::SoftwareCache;
pub use resolver::NodeInfoResolver;

use serde::{Deserialize, Serialize};

/// Well-known discovery path, relative to the domain root
pub const WELL_KNOWN_PATH: &str = "/.well-known/nodeinfo";

/// NodeInfo 2.0 schema relation
pub const SCHEMA_2_0: &str = "http://nodeinfo.diaspora.software/ns/schema/2.0";

/// NodeInfo 2.1 schema relation
pub const SCHEMA_2_1: &str = "http://nodeinfo.diaspora.software/ns/schema/2.1";

/// Software identity a remote instance reports about itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Software {
    #[serde(default, deserialize_with = "discovery::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "discovery::null_as_default")]
    pub version: String,
}

impl Software {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Resolution result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Normalized domain the lookup was made for
    pub domain: String,
    pub software: Software,
}
