//! Tag allow-list endpoint

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, CachePolicy};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::sync::Arc;

/// `GET /tags`: the current allow-list as a JSON array
pub async fn get_tags(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let tags = state.tags.get_tags().await;
    http::build_json_response(tags.as_slice(), CachePolicy::Public(60), ctx.is_head)
}
