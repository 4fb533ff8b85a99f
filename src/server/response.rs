use crate::proxy::ProxiedResponse;
use may_minihttp::Response;
use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};
use tracing::debug;

/// Headers may_minihttp writes itself on every response.
const SERVER_OWNED: [&str; 2] = ["date", "server"];

/// Reason phrase for `status`.
pub fn status_reason(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown")
}

/// Whether `name: value` is a well-formed header (token name, no CR/LF or
/// other control bytes in the value).
pub fn is_valid_header(name: &str, value: &str) -> bool {
    http::HeaderName::from_bytes(name.as_bytes()).is_ok()
        && http::HeaderValue::from_str(value).is_ok()
}

/// The `'static` line may_minihttp writes for `name: value`.
///
/// Lines are interned: each distinct line is allocated once for the life of
/// the process and reused afterwards.
pub fn header_line(name: &str, value: &str) -> &'static str {
    intern(format!("{name}: {value}"))
}

fn intern(line: String) -> &'static str {
    static LINES: OnceLock<Mutex<HashSet<&'static str>>> = OnceLock::new();
    let lines = LINES.get_or_init(|| Mutex::new(HashSet::new()));
    let mut lines = match lines.lock() {
        Ok(lines) => lines,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(&interned) = lines.get(line.as_str()) {
        return interned;
    }
    let interned: &'static str = Box::leak(line.into_boxed_str());
    lines.insert(interned);
    interned
}

pub fn write_redirect(res: &mut Response, status: u16, location_line: &'static str) {
    res.status_code(status as usize, status_reason(status));
    res.header(location_line);
    res.header("Content-Type: text/plain; charset=utf-8");
    res.body_vec(format!("{}. Redirecting to {}", status_reason(status), location_value(location_line)).into_bytes());
}

/// Write a file response.
///
/// may_minihttp derives `Content-Length` from the body, so a HEAD answer
/// carries the body to advertise the real length and closes the
/// connection; the client stops reading after the header block.
pub fn write_file(res: &mut Response, bytes: Vec<u8>, content_type: &'static str, head_only: bool) {
    res.status_code(200, "OK");
    res.header(header_line("Content-Type", content_type));
    if head_only {
        res.header("Connection: close");
    }
    res.body_vec(bytes);
}

pub fn write_text_error(res: &mut Response, status: u16) {
    let reason = status_reason(status);
    res.status_code(status as usize, reason);
    res.header("Content-Type: text/plain; charset=utf-8");
    res.body(reason);
}

pub fn write_proxied(res: &mut Response, proxied: ProxiedResponse) {
    res.status_code(proxied.status as usize, status_reason(proxied.status));
    for (name, value) in &proxied.headers {
        if SERVER_OWNED.iter().any(|owned| name.eq_ignore_ascii_case(owned)) {
            continue;
        }
        if !is_valid_header(name, value) {
            debug!(header = %name, "Dropping malformed upstream header");
            continue;
        }
        res.header(header_line(name, value));
    }
    res.body_vec(proxied.body);
}

fn location_value(line: &str) -> &str {
    line.split_once(": ").map(|(_, value)| value).unwrap_or(line)
}
