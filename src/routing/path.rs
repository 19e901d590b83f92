//! Request path extraction.

/// Reduce a raw request URI path to the form route templates are written in.
///
/// Strips the application base path, the query string and fragment, and
/// surrounding slashes. The site root becomes `"/"`.
pub fn request_path(uri: &str, base_path: &str) -> String {
    let base = base_path.trim_matches('/');

    let mut path = uri.split(['?', '#']).next().unwrap_or_default();
    if !base.is_empty() {
        let trimmed = path.trim_start_matches('/');
        if let Some(rest) = trimmed.strip_prefix(base) {
            if rest.is_empty() || rest.starts_with('/') {
                path = rest;
            }
        }
    }

    let path = path.trim_matches('/');
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
