// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Session cookie handling.
//!
//! Callback registrations are scoped to a session id carried in a cookie.
//! Visitors without a valid cookie get a fresh id on the next page view.

use axum::http::{header, HeaderMap};

/// Length of generated session ids.
const SESSION_ID_LEN: usize = 32;

/// Reads the session id from the `Cookie` headers.
///
/// Ids with characters outside `[A-Za-z0-9_-]` are ignored.
pub fn session_id(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| is_valid_id(value))
}

/// Generates a new session id.
pub fn new_session_id() -> String {
    nanoid::nanoid!(SESSION_ID_LEN)
}

/// Formats the `Set-Cookie` value for a session id.
pub fn session_cookie(cookie_name: &str, id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", cookie_name, id)
}

fn is_valid_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 128
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_reads_named_cookie() {
        let headers = headers("theme=dark; actionkit_session=abc_123; other=1");
        assert_eq!(session_id(&headers, "actionkit_session").as_deref(), Some("abc_123"));
        assert_eq!(session_id(&headers, "missing"), None);
    }

    #[test]
    fn test_rejects_odd_ids() {
        let headers = headers("actionkit_session=../etc");
        assert_eq!(session_id(&headers, "actionkit_session"), None);
    }

    #[test]
    fn test_new_ids_are_valid() {
        let id = new_session_id();
        assert_eq!(id.len(), SESSION_ID_LEN);
        assert!(is_valid_id(&id));
        assert_eq!(
            session_cookie("sid", "x1"),
            "sid=x1; Path=/; HttpOnly; SameSite=Lax"
        );
    }
}
