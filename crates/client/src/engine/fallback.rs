//! Degraded-but-valid responses for when neither network nor cache can help.
//!
//! Assets only have fallbacks for scripts and stylesheets; images, fonts and
//! anything else surface the network error.

use pwacache_core::Response;
use url::Url;

use super::classify::RequestClass;

pub const SCRIPT_BODY: &str = "// Offline - JS file unavailable";
pub const STYLESHEET_BODY: &str = "/* Offline - CSS file unavailable */";
pub const API_ERROR_BODY: &str = r#"{"error": "Offline - API unavailable"}"#;

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Minimal offline document titled `{app_name} - Offline`.
pub fn offline_html(app_name: &str) -> String {
    let name = escape_html(app_name);
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{name} - Offline</title></head>\
<body><h1>{name}</h1><p>You are offline. Please check your connection.</p></body></html>"
    )
}

/// File type inferred from the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileHint {
    Script,
    Stylesheet,
    Other,
}

pub fn file_hint(url: &Url) -> FileHint {
    let path = url.path().to_ascii_lowercase();
    if path.ends_with(".js") || path.ends_with(".mjs") {
        FileHint::Script
    } else if path.ends_with(".css") {
        FileHint::Stylesheet
    } else {
        FileHint::Other
    }
}

pub fn empty_script() -> Response {
    Response::synthetic(200, "application/javascript", SCRIPT_BODY)
}

pub fn empty_stylesheet() -> Response {
    Response::synthetic(200, "text/css", STYLESHEET_BODY)
}

pub fn offline_page(app_name: &str) -> Response {
    Response::synthetic(200, "text/html; charset=utf-8", offline_html(app_name))
}

pub fn api_unavailable() -> Response {
    Response::synthetic(200, "application/json", API_ERROR_BODY)
}

/// Map (class, file-type hint) to a synthetic response.
///
/// Returns None for the combinations that have no fallback.
pub fn synthesize(class: RequestClass, url: &Url, app_name: &str) -> Option<Response> {
    match class {
        RequestClass::Asset => match file_hint(url) {
            FileHint::Script => Some(empty_script()),
            FileHint::Stylesheet => Some(empty_stylesheet()),
            FileHint::Other => None,
        },
        RequestClass::Navigable => Some(offline_page(app_name)),
        RequestClass::Live => Some(api_unavailable()),
        RequestClass::Unhandled => None,
    }
}
