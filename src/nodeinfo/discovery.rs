/// NodeInfo discovery documents
///
/// The two discovery hops decode independently: the well-known document
/// yields a link, the linked document yields the software.
use crate::{
    error::{FedinfoError, FedinfoResult},
    nodeinfo::{Software, SCHEMA_2_0, SCHEMA_2_1},
};
use serde::{Deserialize, Deserializer, Serialize};

/// Document served at `/.well-known/nodeinfo`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WellKnownNodeInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<Link>,
}

/// A link to a versioned NodeInfo document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rel: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub href: String,
}

/// The part of a versioned NodeInfo document we care about
#[derive(Debug, Deserialize)]
struct NodeInfoDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    software: Software,
}

/// Treat an explicit JSON `null` like an absent field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl WellKnownNodeInfo {
    /// Pick the versioned document to fetch
    ///
    /// A 2.1 link wins wherever it appears. Otherwise the first 2.0 link is
    /// used. Returns `None` when neither schema is advertised.
    pub fn nodeinfo_href(&self) -> Option<&str> {
        let mut fallback = None;

        for link in &self.links {
            match link.rel.as_str() {
                SCHEMA_2_1 => return Some(link.href.as_str()),
                SCHEMA_2_0 if fallback.is_none() => fallback = Some(link.href.as_str()),
                _ => {}
            }
        }

        fallback
    }
}

/// Decode the well-known discovery document
pub fn parse_well_known(body: &[u8]) -> FedinfoResult<WellKnownNodeInfo> {
    serde_json::from_slice(body)
        .map_err(|e| FedinfoError::Fetch(format!("Invalid well-known nodeinfo document: {}", e)))
}

/// Decode the software identity from a versioned NodeInfo document
pub fn parse_software(body: &[u8]) -> FedinfoResult<Software> {
    let doc: NodeInfoDocument = serde_json::from_slice(body)
        .map_err(|e| FedinfoError::Fetch(format!("Invalid nodeinfo document: {}", e)))?;
    Ok(doc.software)
}
