//! Return-URL handling for post-login redirects.
//!
//! Only same-origin relative paths are followed. Anything that a browser
//! could resolve to another host falls back to the landing page.

/// Whether `candidate` is a local path safe to redirect to.
///
/// Accepted values start with exactly one `/` and are not followed by
/// another `/` or a `\`. Control characters are rejected outright.
///
/// # Examples
/// ```
/// use orderdesk::inbound::http::redirect::is_local_path;
///
/// assert!(is_local_path("/orders?page=2"));
/// assert!(!is_local_path("//evil.example"));
/// assert!(!is_local_path("https://evil.example"));
/// ```
pub fn is_local_path(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    if chars.next() != Some('/') {
        return false;
    }
    if matches!(chars.next(), Some('/' | '\\')) {
        return false;
    }
    !candidate.chars().any(char::is_control)
}

/// Pick the redirect target after a successful login.
pub fn post_login_target<'a>(return_url: Option<&'a str>, landing_path: &'a str) -> &'a str {
    match return_url {
        Some(url) if is_local_path(url) => url,
        _ => landing_path,
    }
}

/// Build `login_path?returnUrl=<encoded original>`.
pub fn login_redirect(login_path: &str, original: &str) -> String {
    if !is_local_path(original) {
        return login_path.to_owned();
    }
    let encoded: String = url::form_urlencoded::byte_serialize(original.as_bytes()).collect();
    format!("{login_path}?returnUrl={encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/", true)]
    #[case("/orders/42", true)]
    #[case("/orders?status=open", true)]
    #[case("", false)]
    #[case("orders", false)]
    #[case("//evil.example/path", false)]
    #[case("/\\evil.example", false)]
    #[case("https://evil.example", false)]
    #[case("javascript:alert(1)", false)]
    #[case("/orders\r\nSet-Cookie: x=1", false)]
    fn local_path_rules(#[case] candidate: &str, #[case] expected: bool) {
        assert_eq!(is_local_path(candidate), expected);
    }

    #[rstest]
    #[case(Some("/orders/7"), "/orders/7")]
    #[case(Some("https://evil.example"), "/")]
    #[case(None, "/")]
    fn post_login_target_prefers_local_return_url(
        #[case] return_url: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(post_login_target(return_url, "/"), expected);
    }

    #[rstest]
    fn login_redirect_encodes_original_path() {
        assert_eq!(
            login_redirect("/login", "/orders?page=2"),
            "/login?returnUrl=%2Forders%3Fpage%3D2"
        );
    }
}
