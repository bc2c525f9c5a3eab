use muistutin::error::{other_error, AppResult};
use std::env;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tiny_http::{Header, Response, Server};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ROOT: &str = "public";

fn main() -> miette::Result<()> {
    dotenvy::dotenv().ok();

    let root_arg = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ROOT.to_string());
    let port = read_port()?;

    let root = fs::canonicalize(&root_arg)
        .map_err(|e| other_error(&format!("Cannot serve '{}': {}", root_arg, e)))?;

    let server = Server::http(("0.0.0.0", port))
        .map_err(|e| other_error(&format!("Could not bind port {}: {}", port, e)))?;

    println!("Serving {} on http://localhost:{}", root.display(), port);

    for request in server.incoming_requests() {
        let url = request.url().to_string();
        let response = match resolve(&root, &url) {
            Ok(path) => match fs::read(&path) {
                Ok(body) => Response::from_data(body).with_header(content_type_header(&path)),
                Err(_) => plain_status(404),
            },
            Err(status) => plain_status(status),
        };
        if let Err(e) = request.respond(response) {
            eprintln!("Failed to respond to {}: {}", url, e);
        }
    }

    Ok(())
}

/// Port from DEV_SERVER_PORT, falling back to the default
fn read_port() -> AppResult<u16> {
    match env::var("DEV_SERVER_PORT") {
        Ok(value) => value
            .parse::<u16>()
            .map_err(|_| other_error(&format!("Invalid DEV_SERVER_PORT: '{}'", value))),
        Err(_) => Ok(DEFAULT_PORT),
    }
}

/// Resolve a request path to a file inside the served root
///
/// Err(403) for anything trying to escape the root, Err(404) for paths
/// that do not exist. "/" and directories fall back to their index.html.
fn resolve(root: &Path, url: &str) -> Result<PathBuf, u16> {
    let path = url
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or("")
        .trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    // Reject raw traversal segments before touching the filesystem
    if path.split('/').any(|segment| segment == "..") {
        return Err(403);
    }

    let candidate = match fs::canonicalize(root.join(path)) {
        Ok(candidate) => candidate,
        Err(_) => return Err(404),
    };
    // Symlinks can still point outside the root
    if !candidate.starts_with(root) {
        return Err(403);
    }

    let candidate = if candidate.is_dir() {
        candidate.join("index.html")
    } else {
        candidate
    };
    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(404)
    }
}

fn content_type_header(path: &Path) -> Header {
    Header::from_bytes(&b"Content-Type"[..], mime_type(path).as_bytes())
        .expect("static header is valid")
}

/// Content type from the file extension
fn mime_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "html" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "application/javascript; charset=utf-8",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "wasm" => "application/wasm",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

fn plain_status(status: u16) -> Response<Cursor<Vec<u8>>> {
    let text = match status {
        403 => "Forbidden",
        404 => "Not found",
        _ => "Error",
    };
    Response::from_string(text).with_status_code(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!(
            "muistutin-devserver-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("assets")).unwrap();
        fs::write(dir.join("index.html"), "<html></html>").unwrap();
        fs::write(dir.join("assets/app.js"), "console.log(1)").unwrap();
        fs::canonicalize(dir).unwrap()
    }

    #[test]
    fn test_resolve_serves_index_for_root() {
        let root = temp_root("root");
        let resolved = resolve(&root, "/").unwrap();
        assert!(resolved.ends_with("index.html"));
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_resolve_nested_file_with_query() {
        let root = temp_root("nested");
        let resolved = resolve(&root, "/assets/app.js?v=1").unwrap();
        assert!(resolved.ends_with("app.js"));
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let root = temp_root("traversal");
        assert_eq!(resolve(&root, "/../etc/passwd"), Err(403));
        assert_eq!(resolve(&root, "/assets/../../outside.txt"), Err(403));
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_resolve_missing_is_not_found() {
        let root = temp_root("missing");
        assert_eq!(resolve(&root, "/nope.css"), Err(404));
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type(Path::new("a.html")), "text/html; charset=utf-8");
        assert_eq!(mime_type(Path::new("a.css")), "text/css; charset=utf-8");
        assert_eq!(
            mime_type(Path::new("a.js")),
            "application/javascript; charset=utf-8"
        );
        assert_eq!(mime_type(Path::new("a.svg")), "image/svg+xml");
        assert_eq!(mime_type(Path::new("a.bin")), "application/octet-stream");
        assert_eq!(mime_type(Path::new("noext")), "application/octet-stream");
    }
}
