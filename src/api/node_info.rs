/// NodeInfo lookup endpoint
use crate::{
    context::AppContext,
    error::{FedinfoError, FedinfoResult},
    nodeinfo::NodeInfo,
};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct NodeInfoParams {
    /// Domain or URL of the instance (e.g. "mastodon.social")
    #[serde(default)]
    pub domain: Option<String>,
}

/// GET /node-info?domain=...
pub async fn node_info(
    State(ctx): State<AppContext>,
    Query(params): Query<NodeInfoParams>,
) -> FedinfoResult<Json<NodeInfo>> {
    let domain = params
        .domain
        .filter(|d| !d.is_empty())
        .ok_or_else(|| FedinfoError::MissingParameter("domain".to_string()))?;

    info!("request received for {}", domain);

    let info = ctx.resolver.resolve(&domain).await?;

    Ok(Json(info))
}

/// Build NodeInfo routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/node-info", get(node_info))
}
