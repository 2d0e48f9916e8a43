//! Serves the files of a directory tree.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use http::header::{self, HeaderValue};
use strand_http::protocol::mime_types;
use thiserror::Error;
use tracing::debug;

use crate::handler::{Handler, HandlerResult};
use crate::router::{Next, RouteError, Router};
use crate::{Request, Response};

const INDEX_FILE: &str = "index.html";

#[derive(Error, Debug)]
pub enum StaticError {
    #[error("can't list {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("file name is not valid utf-8: {path}")]
    InvalidFileName { path: PathBuf },

    #[error(transparent)]
    Route(#[from] RouteError),
}

/// Builds a router with one `GET` route per file found under `dir`.
///
/// The route path is the file path relative to `dir`, an `index.html` also answers
/// the path of its directory. The directory is listed once, the files are read on
/// every request. Mount the router to serve the files under a prefix.
///
/// # Errors
///
/// [`StaticError`] if the directory can't be listed or a file name can't be used
/// as a route path.
pub fn serve_static(dir: impl AsRef<Path>) -> Result<Router, StaticError> {
    let mut router = Router::new();
    let mut pending = vec![(dir.as_ref().to_path_buf(), String::new())];

    while let Some((dir, prefix)) = pending.pop() {
        let mut entries = std::fs::read_dir(&dir)
            .and_then(|entries| entries.collect::<Result<Vec<_>, _>>())
            .map_err(|source| StaticError::Io { path: dir.clone(), source })?;
        entries.sort_by_key(std::fs::DirEntry::file_name);

        for entry in entries {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                return Err(StaticError::InvalidFileName { path });
            };
            let route_path = format!("{prefix}/{name}");

            let file_type = entry.file_type().map_err(|source| StaticError::Io { path: path.clone(), source })?;
            if file_type.is_dir() {
                pending.push((path, route_path));
                continue;
            }

            if name == INDEX_FILE {
                let dir_path = if prefix.is_empty() { "/" } else { prefix.as_str() };
                router.get(dir_path, StaticFile::new(path.clone()))?;
            }
            debug!(route = %route_path, file = %path.display(), "static file");
            router.get(&route_path, StaticFile::new(path))?;
        }
    }

    Ok(router)
}

/// Sends one file with the MIME type of its extension.
#[derive(Debug, Clone)]
pub struct StaticFile {
    path: PathBuf,
}

impl StaticFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Handler for StaticFile {
    async fn call(&self, _req: &mut Request, res: &mut Response<'_>, _next: Next<'_>) -> HandlerResult {
        let content = tokio::fs::read(&self.path).await?;

        let mime = mime_types::from_path(&self.path);
        res.set_header(header::CONTENT_TYPE, HeaderValue::from_str(mime.as_ref())?)?;
        res.send_with(content, false).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::tests::request;
    use crate::response::tests::{received, writer};
    use http::Method;

    fn public_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        std::fs::create_dir(dir.path().join("css")).unwrap();
        std::fs::write(dir.path().join("css").join("site.css"), "body{}").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs").join("index.html"), "<p>docs</p>").unwrap();
        dir
    }

    async fn get(router: &Router, target: &str) -> String {
        let (client, mut writer) = writer();
        let mut req = request(Method::GET, target, "");
        let mut res = Response::new(&mut writer);
        router.handle(&mut req, &mut res).await.unwrap();
        received(client).await
    }

    #[test]
    fn one_route_per_file() {
        let dir = public_dir();
        let router = serve_static(dir.path()).unwrap();

        let mut paths: Vec<_> = router.routes().iter().filter_map(|route| route.endpoint_info()).map(|(_, path)| path.to_string()).collect();
        paths.sort();
        assert_eq!(paths, ["/", "/app.js", "/css/site.css", "/docs", "/docs/index.html", "/index.html"]);
    }

    #[tokio::test]
    async fn serves_files_with_their_mime_type() {
        let dir = public_dir();
        let router = serve_static(dir.path()).unwrap();

        let output = get(&router, "/app.js").await;
        assert!(output.contains("content-type: application/javascript\r\n"));
        assert!(output.ends_with("console.log(1)"));

        let output = get(&router, "/css/site.css").await;
        assert!(output.contains("content-type: text/css\r\n"));
    }

    #[tokio::test]
    async fn index_answers_its_directory() {
        let dir = public_dir();
        let router = serve_static(dir.path()).unwrap();

        assert!(get(&router, "/").await.ends_with("<h1>home</h1>"));
        assert!(get(&router, "/docs").await.ends_with("<p>docs</p>"));
    }

    #[tokio::test]
    async fn mounted_under_a_prefix() {
        let dir = public_dir();
        let mut router = Router::new();
        router.mount("/static", serve_static(dir.path()).unwrap()).unwrap();

        assert!(get(&router, "/static/app.js").await.ends_with("console.log(1)"));
        assert!(get(&router, "/static").await.ends_with("<h1>home</h1>"));
        assert!(get(&router, "/app.js").await.starts_with("HTTP/1.1 404 Not Found"));
    }

    #[test]
    fn missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = serve_static(dir.path().join("nope"));
        assert!(matches!(result, Err(StaticError::Io { .. })));
    }
}
