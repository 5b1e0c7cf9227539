//! Session token transport.
//!
//! API clients send the token as `Authorization: Bearer <token>`; browsers carry it in the
//! `access_token` cookie set at login. The header wins when both are present.

use vax_core::constants::SESSION_COOKIE;

/// Extracts the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively. Returns `None` for other schemes or an empty token.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Finds the session cookie in a `Cookie` header value.
pub fn cookie_token(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// Resolves the session token from the optional `Authorization` and `Cookie` header values.
pub fn session_token<'a>(authorization: Option<&'a str>, cookie: Option<&'a str>) -> Option<&'a str> {
    authorization
        .and_then(bearer_token)
        .or_else(|| cookie.and_then(cookie_token))
}

/// `Set-Cookie` value that stores `token` for `max_age_secs` seconds.
pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
