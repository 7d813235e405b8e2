//! The browser client: built assets under the static directory, with
//! client-side routes answered by `index.html`.
use std::io;
use std::path::{Component, Path, PathBuf};

use mime_guess::{mime, MimeGuess};
use serde_json::json;
use tokio::fs;
use warp::http::header::{HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use warp::http::StatusCode;
use warp::hyper::Body;
use warp::reply::Response;

use crate::errors::{ErrorSeverity, IntoErrorResponse};

const INDEX: &str = "index.html";
const ASSET_CACHE: &str = "public, max-age=86400";
const ERROR_CACHE: &str = "no-store";

#[derive(Debug, thiserror::Error)]
pub enum StaticError {
    #[error("no static asset at `{0}`")]
    NotFound(String),
    #[error("failed to read static asset `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl StaticError {
    pub fn path(&self) -> &str {
        match self {
            StaticError::NotFound(path) | StaticError::Io { path, .. } => path,
        }
    }

    /// JSON error body with caching disabled, so a later deploy of the
    /// missing file is picked up.
    pub fn into_reply(self) -> Response {
        let mut response = self.into_http_response();
        response
            .headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static(ERROR_CACHE));
        response
    }
}

impl IntoErrorResponse for StaticError {
    fn status_code(&self) -> StatusCode {
        match self {
            StaticError::NotFound(_) => StatusCode::NOT_FOUND,
            StaticError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            StaticError::NotFound(_) => "static_not_found",
            StaticError::Io { .. } => "static_io_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        Some(json!({ "path": self.path() }))
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            StaticError::NotFound(_) => ErrorSeverity::Client,
            StaticError::Io { .. } => ErrorSeverity::Server,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StaticHandler {
    root: PathBuf,
}

impl StaticHandler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Response for a GET of `path`, errors included.
    pub async fn serve(&self, path: &str) -> Response {
        self.client(path)
            .await
            .unwrap_or_else(StaticError::into_reply)
    }

    /// Files by path. Paths without an extension are client-side routes and
    /// get `index.html` when no such file exists.
    pub async fn client(&self, path: &str) -> Result<Response, StaticError> {
        if path.is_empty() {
            return self.read(INDEX).await;
        }
        match self.read(path).await {
            Err(StaticError::NotFound(_)) if !has_extension(path) => self.read(INDEX).await,
            other => other,
        }
    }

    async fn read(&self, relative: &str) -> Result<Response, StaticError> {
        let file = self
            .resolve(relative)
            .ok_or_else(|| StaticError::NotFound(relative.to_string()))?;

        let bytes = fs::read(&file).await.map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StaticError::NotFound(relative.to_string())
            } else {
                StaticError::Io {
                    path: relative.to_string(),
                    source,
                }
            }
        })?;

        tracing::debug!(path = relative, bytes = bytes.len(), "serving static asset");
        Ok(asset_response(bytes, MimeGuess::from_path(&file).first_or_octet_stream()))
    }

    /// Joins `path` under the root. Parent and prefix components are refused
    /// so a request can never leave the static directory.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let mut relative = PathBuf::new();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(segment) => relative.push(segment),
                Component::CurDir | Component::RootDir => {}
                Component::Prefix(_) | Component::ParentDir => return None,
            }
        }

        if relative.as_os_str().is_empty() {
            None
        } else {
            Some(self.root.join(relative))
        }
    }
}

fn asset_response(bytes: Vec<u8>, mime: mime::Mime) -> Response {
    let content_type = if mime.type_() == mime::TEXT {
        format!("{}; charset=utf-8", mime.essence_str())
    } else {
        mime.essence_str().to_string()
    };

    let mut response = Response::new(Body::from(bytes));
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(ASSET_CACHE));
    response
}

fn has_extension(path: &str) -> bool {
    Path::new(path).extension().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorResponse;
    use crate::logging::TestLogSubscriber;
    use std::fs as std_fs;
    use tempfile::TempDir;
    use tracing::Level;
    use warp::hyper::body::to_bytes;

    fn site() -> (TempDir, StaticHandler) {
        let dir = TempDir::new().expect("temp dir");
        std_fs::write(dir.path().join(INDEX), "<h1>gang</h1>").expect("index");
        std_fs::create_dir(dir.path().join("assets")).expect("assets dir");
        std_fs::write(dir.path().join("assets").join("app.js"), "console.log(1)").expect("js");
        let handler = StaticHandler::new(dir.path());
        (dir, handler)
    }

    fn header(response: &Response, name: warp::http::header::HeaderName) -> String {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn serves_assets_with_mime_type() {
        let (_dir, handler) = site();
        let response = handler.serve("assets/app.js").await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = header(&response, CONTENT_TYPE);
        assert!(content_type.contains("javascript"), "{content_type}");
        assert_eq!(header(&response, CACHE_CONTROL), ASSET_CACHE);
    }

    #[tokio::test]
    async fn client_routes_fall_back_to_index() {
        let (_dir, handler) = site();
        for path in ["", "lobby", "game/round/2"] {
            let response = handler.client(path).await.expect("index");
            let body = to_bytes(response.into_body()).await.expect("body");
            assert_eq!(&body[..], b"<h1>gang</h1>");
        }
    }

    #[tokio::test]
    async fn missing_asset_is_not_found() {
        let (_dir, handler) = site();
        match handler.client("assets/missing.css").await {
            Err(StaticError::NotFound(path)) => assert_eq!(path, "assets/missing.css"),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_asset_replies_with_json_error() {
        let (_dir, handler) = site();
        let response = handler.serve("assets/missing.css").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(header(&response, CACHE_CONTROL), ERROR_CACHE);
        let body = to_bytes(response.into_body()).await.expect("body");
        let error: ErrorResponse = serde_json::from_slice(&body).expect("json body");
        assert_eq!(error.error, "static_not_found");
        assert_eq!(
            error.details,
            Some(json!({ "path": "assets/missing.css" }))
        );
    }

    #[tokio::test]
    async fn missing_index_is_not_found_for_client_routes() {
        let dir = TempDir::new().expect("temp dir");
        let handler = StaticHandler::new(dir.path());
        let response = handler.serve("lobby").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn error_reply_logs_by_severity() {
        let logs = TestLogSubscriber::new();
        let (not_found, unreadable) = logs.capture(|| {
            let not_found = StaticError::NotFound("assets/gone.js".into()).into_reply();
            let unreadable = StaticError::Io {
                path: INDEX.into(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            }
            .into_reply();
            (not_found, unreadable)
        });

        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(unreadable.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(header(&unreadable, CACHE_CONTROL), ERROR_CACHE);

        let client = logs.find(Level::INFO, "client error");
        assert_eq!(client.len(), 1);
        assert_eq!(client[0].field("error"), Some("static_not_found"));

        let server = logs.find(Level::ERROR, "server error");
        assert_eq!(server.len(), 1);
        assert_eq!(server[0].field("error"), Some("static_io_error"));
    }

    #[test]
    fn parent_components_are_refused() {
        let handler = StaticHandler::new("/srv/static");
        assert_eq!(handler.resolve("../secret"), None);
        assert_eq!(handler.resolve("/"), None);
        assert_eq!(
            handler.resolve("./assets/app.js"),
            Some(PathBuf::from("/srv/static/assets/app.js"))
        );
    }
}
