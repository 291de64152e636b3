//! Session cookie helpers.
//!
//! The session rides in a single `sid` cookie: HttpOnly, SameSite=Lax,
//! path `/`, Secure only when the site is served over HTTPS so local
//! development over plain HTTP keeps working.

pub const SESSION_COOKIE_NAME: &str = "sid";
pub const SESSION_COOKIE_PATH: &str = "/";

pub fn build_session_cookie(token: &str, max_age_seconds: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE_NAME, token, SESSION_COOKIE_PATH, max_age_seconds
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn build_clear_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}=; Path={}; Max-Age=0; HttpOnly; SameSite=Lax",
        SESSION_COOKIE_NAME, SESSION_COOKIE_PATH
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn extract_cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key.trim() == name {
            Some(value.trim().to_string())
        } else {
            None
        }
    })
}
