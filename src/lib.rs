/// fedinfo - NodeInfo software lookup service
///
/// Resolves fediverse domains to the software name and version they report
/// through NodeInfo discovery, caching results per domain.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod nodeinfo;
pub mod server;

pub use context::AppContext;
pub use error::{FedinfoError, FedinfoResult};
