//! Canonical form for user names, emails, and login identifiers.
//!
//! The credential store compares these values byte-for-byte, so every value
//! must pass through [`normalize`] before it is stored or looked up.

/// Trim surrounding whitespace and lowercase the remainder.
///
/// The result is idempotent: `normalize(&normalize(s)) == normalize(s)`.
///
/// # Examples
/// ```
/// use orderdesk::domain::normalize;
///
/// assert_eq!(normalize("  Foo@Bar.com "), "foo@bar.com");
/// ```
#[must_use]
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
