//! Embedded static resources.
//!
//! The live-reload client is minified at compile time by `build.rs` and
//! embedded into the binary; the WebSocket port is injected at serve time.

/// Minified live-reload client (see `build.rs`).
const LIVERELOAD_MIN_JS: &str = include_str!(concat!(env!("OUT_DIR"), "/livereload.min.js"));

/// URL path the dev server serves the client script from.
pub const LIVERELOAD_JS_PATH: &str = "/.paver/livereload.js";

/// The live-reload client with the WebSocket port filled in.
pub fn livereload_js(ws_port: u16) -> String {
    LIVERELOAD_MIN_JS.replace("__PAVER_WS_PORT__", &ws_port.to_string())
}

/// `<script>` tag injected before `</body>` of served HTML.
pub fn livereload_script_tag() -> String {
    format!(r#"<script src="{LIVERELOAD_JS_PATH}"></script>"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_livereload_port_injection() {
        let rendered = livereload_js(35729);
        assert!(rendered.contains("35729"));
        assert!(!rendered.contains("__PAVER_WS_PORT__"));
    }

    #[test]
    fn test_script_tag() {
        let tag = livereload_script_tag();
        assert!(tag.starts_with("<script"));
        assert!(tag.contains(LIVERELOAD_JS_PATH));
    }
}
