//! Module asset serving
//!
//! Streams `metadata.json` and `scripts.zip` from the folder of the release
//! that applies to the client's mod version. File contents are passed through
//! untouched.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, CachePolicy};
use crate::logger;
use crate::resolver::{self, ResolutionError};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Served release artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    Metadata,
    Scripts,
}

impl Asset {
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Metadata => "metadata.json",
            Self::Scripts => "scripts.zip",
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Metadata => "application/json",
            Self::Scripts => "application/zip",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("release {release_id} has no asset at {}", path.display())]
    Missing { release_id: u64, path: PathBuf },
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AssetError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Resolution(e) => e.status(),
            Self::Missing { .. } => StatusCode::NOT_FOUND,
            Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn client_message(&self) -> &'static str {
        match self {
            Self::Resolution(e) => e.client_message(),
            Self::Missing { .. } => "Asset not found",
            Self::Io { .. } => "Internal server error",
        }
    }
}

/// Resolve the release for the request and read `asset` from its folder
pub async fn load_asset(
    state: &AppState,
    module_name: &str,
    mod_version: Option<&str>,
    asset: Asset,
) -> Result<Bytes, AssetError> {
    let folder = resolver::resolve_release_folder(
        state.store.as_ref(),
        &state.storage_root,
        module_name,
        mod_version,
    )?;

    let path = folder.file(asset.file_name());
    match tokio::fs::read(&path).await {
        Ok(data) => Ok(Bytes::from(data)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(AssetError::Missing {
            release_id: folder.release_id,
            path,
        }),
        Err(source) => Err(AssetError::Io { path, source }),
    }
}

/// Serve `metadata.json` or `scripts.zip` for a module
pub async fn serve_asset(
    ctx: &RequestContext<'_>,
    state: &Arc<AppState>,
    module_name: &str,
    asset: Asset,
) -> Response<Full<Bytes>> {
    let mod_version = http::query_param(ctx.query, "modVersion");

    match load_asset(state, module_name, mod_version.as_deref(), asset).await {
        Ok(data) => {
            let etag = cache::generate_etag(&data);
            if cache::check_etag_match(ctx.if_none_match, &etag) {
                return http::build_304_response(&etag, CachePolicy::NoCache);
            }
            http::build_bytes_response(
                data,
                asset.content_type(),
                &etag,
                CachePolicy::NoCache,
                ctx.is_head,
            )
        }
        Err(e) => {
            log_asset_error(module_name, &e);
            http::build_error_response(e.status(), e.client_message())
        }
    }
}

fn log_asset_error(module_name: &str, error: &AssetError) {
    match error {
        AssetError::Resolution(ResolutionError::VersionParse(detail)) => {
            logger::log_resolution_failure(module_name, &detail.to_string());
        }
        AssetError::Resolution(ResolutionError::Store(_)) | AssetError::Io { .. } => {
            logger::log_error(&error.to_string());
        }
        AssetError::Missing { .. } => logger::log_warning(&error.to_string()),
        AssetError::Resolution(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_support::{body_string, fixture, request};
    use hyper::header::HeaderValue;
    use hyper::Method;

    fn ctx<'a>(query: Option<&'a str>, is_head: bool, etag: Option<&'a str>) -> RequestContext<'a> {
        RequestContext {
            path: "/",
            query,
            is_head,
            if_none_match: etag,
        }
    }

    #[test]
    fn test_asset_file_names_and_types() {
        assert_eq!(Asset::Metadata.file_name(), "metadata.json");
        assert_eq!(Asset::Metadata.content_type(), "application/json");
        assert_eq!(Asset::Scripts.file_name(), "scripts.zip");
        assert_eq!(Asset::Scripts.content_type(), "application/zip");
    }

    #[tokio::test]
    async fn test_scripts_bytes_pass_through() {
        let fx = fixture().await;
        let response = serve_asset(
            &ctx(Some("modVersion=1.2.0"), false, None),
            &fx.state,
            "skyblockaddon",
            Asset::Scripts,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Content-Type"], "application/zip");

        let body = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        assert_eq!(&body[..], crate::handler::test_support::SCRIPTS_BYTES);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let fx = fixture().await;
        // Release 9 resolves but has no folder on disk
        let err = load_asset(&fx.state, "SkyblockAddon", Some("1.3"), Asset::Metadata)
            .await
            .unwrap_err();
        assert!(matches!(err, AssetError::Missing { release_id: 9, .. }));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unreadable_path_is_internal_error() {
        let fx = fixture().await;
        // metadata.json of release 10 is a directory
        let err = load_asset(&fx.state, "SkyblockAddon", Some("1.4"), Asset::Metadata)
            .await
            .unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_resolution_errors_propagate() {
        let fx = fixture().await;
        let response = serve_asset(
            &ctx(Some("modVersion=banana"), false, None),
            &fx.state,
            "SkyblockAddon",
            Asset::Metadata,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response).await.contains("Invalid query."));

        let response = serve_asset(
            &ctx(Some("modVersion=2.0"), false, None),
            &fx.state,
            "SkyblockAddon",
            Asset::Metadata,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response)
            .await
            .contains("No release applicable for specified mod version."));
    }

    #[tokio::test]
    async fn test_conditional_and_head_requests() {
        let fx = fixture().await;
        let first = serve_asset(
            &ctx(Some("modVersion=1.2"), false, None),
            &fx.state,
            "SkyblockAddon",
            Asset::Metadata,
        )
        .await;
        let etag = first.headers()["ETag"].to_str().unwrap().to_string();

        let cached = serve_asset(
            &ctx(Some("modVersion=1.2"), false, Some(etag.as_str())),
            &fx.state,
            "SkyblockAddon",
            Asset::Metadata,
        )
        .await;
        assert_eq!(cached.status(), StatusCode::NOT_MODIFIED);

        let mut req = request(Method::HEAD, "/modules/SkyblockAddon/metadata?modVersion=1.2");
        req.headers_mut()
            .insert("user-agent", HeaderValue::from_static("ModClient/1.2"));
        let head = crate::handler::handle_request(req, Arc::clone(&fx.state), fx.peer)
            .await
            .unwrap();
        assert_eq!(head.status(), StatusCode::OK);
        assert_eq!(head.headers()["Content-Length"], "17");
        assert!(body_string(head).await.is_empty());
    }
}
