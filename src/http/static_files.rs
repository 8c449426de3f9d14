//! Serving files from a directory.

use std::path::{Path, PathBuf};

use crate::http::mime;
use crate::http::request::{Method, Request};
use crate::http::responder::Responder;
use crate::http::response::{Response, ResponseBuilder, StatusCode};

/// Answers GET and HEAD requests for files that exist under `root`.
///
/// Directory paths are served through their index file. Requests whose path
/// tries to climb out of `root`, directly or through a symlink, never match.
/// Paths are matched after percent-decoding.
pub struct StaticFileResponder {
    root: PathBuf,
    index: String,
}

impl StaticFileResponder {
    pub fn new(root: impl Into<PathBuf>, index: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index: index.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a request onto an existing file below the root.
    fn resolve(&self, request: &Request) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for segment in request.path_only().split('/') {
            match segment {
                "" | "." => continue,
                ".." => return None,
                s if s.contains('\\') || s.contains('\0') => return None,
                s => path.push(s),
            }
        }

        if path.is_dir() {
            path.push(&self.index);
        }

        // Symlinks may point anywhere; only the real location counts.
        let root = self.root.canonicalize().ok()?;
        let file = path.canonicalize().ok()?;
        if !file.starts_with(&root) {
            tracing::debug!(path = %path.display(), "Refusing file outside the static root");
            return None;
        }
        file.is_file().then_some(file)
    }
}

impl Responder for StaticFileResponder {
    fn matches(&self, request: &Request) -> bool {
        matches!(request.method, Method::GET | Method::HEAD) && self.resolve(request).is_some()
    }

    fn respond(&self, request: &Request) -> Response {
        let Some(path) = self.resolve(request) else {
            return Response::not_found(&request.path_only());
        };

        match std::fs::read(&path) {
            Ok(contents) => ResponseBuilder::new(StatusCode::Ok)
                .header("Content-Type", mime::content_type_for(&path))
                .body(contents)
                .build(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read static file");
                Response::internal_error()
            }
        }
    }
}
