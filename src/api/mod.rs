/// API routes and handlers
pub mod node_info;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new().merge(node_info::routes())
}
