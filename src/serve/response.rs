//! HTTP response handlers.

use anyhow::{Context, Result};
use std::{fs, path::Path};
use tiny_http::{Header, Request, Response, StatusCode};

use crate::config::PipelineConfig;
use crate::embed::{livereload_js, livereload_script_tag};
use crate::utils::mime;

/// Respond with a static file, injecting the live-reload script into HTML.
pub fn respond_file(request: Request, path: &Path, ws_port: Option<u16>) -> Result<()> {
    let content_type = mime::from_path(path);
    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let body = maybe_inject_livereload(body, content_type, ws_port);
    send_body(request, 200, content_type, body)
}

/// Respond with 404 (the site's own `404.html` when present).
pub fn respond_not_found(
    request: Request,
    config: &PipelineConfig,
    ws_port: Option<u16>,
) -> Result<()> {
    let custom = config.output_root().join("404.html");
    if let Ok(body) = fs::read(&custom) {
        let body = maybe_inject_livereload(body, mime::types::HTML, ws_port);
        return send_body(request, 404, mime::types::HTML, body);
    }
    send_body(request, 404, mime::types::PLAIN, b"404 Not Found".to_vec())
}

/// Respond with a self-refreshing loading page (initial build running).
pub fn respond_loading(request: Request) -> Result<()> {
    let body = "<!doctype html><html><head><meta http-equiv=\"refresh\" content=\"1\">\
                <title>paver</title></head>\
                <body><p>building&hellip;</p></body></html>";
    send_body(request, 503, mime::types::HTML, body.as_bytes().to_vec())
}

/// Respond with 503 (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(
        request,
        503,
        mime::types::PLAIN,
        b"503 Service Unavailable".to_vec(),
    )
}

/// Respond with the live-reload client from memory.
pub fn respond_livereload_js(request: Request, ws_port: u16) -> Result<()> {
    let body = livereload_js(ws_port);
    send_body(request, 200, mime::types::JAVASCRIPT, body.into_bytes())
}

/// Inject the live-reload script if content is HTML and reload is active.
fn maybe_inject_livereload(body: Vec<u8>, content_type: &str, ws_port: Option<u16>) -> Vec<u8> {
    match (content_type.starts_with("text/html"), ws_port) {
        (true, Some(_)) => inject_script(&body),
        _ => body,
    }
}

/// Insert the script tag before `</body>`, or append when absent.
fn inject_script(content: &[u8]) -> Vec<u8> {
    let script = livereload_script_tag();
    let script_bytes = script.as_bytes();

    const PATTERN: &[u8] = b"</body>";

    let insert_at = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script_bytes.len());
    result.extend_from_slice(&content[..insert_at]);
    result.extend_from_slice(script_bytes);
    result.extend_from_slice(&content[insert_at..]);
    result
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(
            Header::from_bytes("Content-Type", content_type)
                .expect("static content-type header"),
        );
    request.respond(response)?;
    Ok(())
}
