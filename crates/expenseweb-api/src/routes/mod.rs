//! Route modules for the API server
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints and HTMX fragments
//! - page.rs: Full page rendering

pub mod expenses;

use std::collections::HashMap;

/// Decode an `application/x-www-form-urlencoded` request body
pub fn parse_form_body(body: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in body.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let decode = |raw: &str| {
            let spaced = raw.replace('+', " ");
            urlencoding::decode(&spaced)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| raw.to_string())
        };
        params.insert(decode(key), decode(value));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_form_body() {
        let params = parse_form_body("amount=12.5&category=Food&notes=Tom+%26+Jerry%3D1&date=");
        assert_eq!(params["amount"], "12.5");
        assert_eq!(params["category"], "Food");
        assert_eq!(params["notes"], "Tom & Jerry=1");
        assert_eq!(params["date"], "");
    }

    #[test]
    fn test_parse_form_body_edge_cases() {
        assert!(parse_form_body("").is_empty());
        let params = parse_form_body("flag&plus=a%2Bb");
        assert_eq!(params["flag"], "");
        assert_eq!(params["plus"], "a+b");
    }
}
