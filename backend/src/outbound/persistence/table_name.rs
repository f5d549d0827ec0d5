//! Validated SQL identifier for the configurable users table.
//!
//! Table names cannot be bound as query parameters, so the name is checked
//! once at construction and then interpolated (quoted) into statements.

use std::fmt;

/// Longest accepted name; leaves room for `_user_name_key` index suffixes
/// within PostgreSQL's 63-byte identifier limit.
pub const TABLE_NAME_MAX: usize = 48;

/// Reasons a configured table name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableNameError {
    #[error("table name must not be empty")]
    Empty,
    #[error("table name must be at most {TABLE_NAME_MAX} characters")]
    TooLong,
    #[error("table name must start with a letter or underscore and contain only ASCII letters, digits, or underscores")]
    InvalidCharacters,
}

/// SQL-safe table identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    /// Validate a raw identifier.
    ///
    /// # Examples
    /// ```
    /// use orderdesk::outbound::persistence::TableName;
    ///
    /// assert!(TableName::new("users").is_ok());
    /// assert!(TableName::new("users; DROP TABLE x").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, TableNameError> {
        let raw = raw.into();
        let mut chars = raw.chars();
        let Some(first) = chars.next() else {
            return Err(TableNameError::Empty);
        };
        if raw.len() > TABLE_NAME_MAX {
            return Err(TableNameError::TooLong);
        }
        let valid_first = first.is_ascii_alphabetic() || first == '_';
        if !valid_first || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(TableNameError::InvalidCharacters);
        }
        Ok(Self(raw))
    }

    /// Identifier quoted for interpolation into SQL.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }

    /// Quoted name of the unique index covering `column`.
    pub fn unique_index(&self, column: &str) -> String {
        format!("\"{}_{column}_key\"", self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self("users".to_owned())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("users")]
    #[case("_shadow_users")]
    #[case("Users2")]
    fn accepts_plain_identifiers(#[case] raw: &str) {
        let name = TableName::new(raw).expect("valid identifier");
        assert_eq!(name.quoted(), format!("\"{raw}\""));
    }

    #[rstest]
    #[case("", TableNameError::Empty)]
    #[case("1users", TableNameError::InvalidCharacters)]
    #[case("users;drop", TableNameError::InvalidCharacters)]
    #[case("app.users", TableNameError::InvalidCharacters)]
    #[case("us\"ers", TableNameError::InvalidCharacters)]
    fn rejects_unsafe_identifiers(#[case] raw: &str, #[case] expected: TableNameError) {
        assert_eq!(TableName::new(raw), Err(expected));
    }

    #[rstest]
    fn rejects_overlong_identifiers() {
        let raw = "u".repeat(TABLE_NAME_MAX + 1);
        assert_eq!(TableName::new(raw), Err(TableNameError::TooLong));
    }

    #[rstest]
    fn index_names_derive_from_table() {
        let name = TableName::new("accounts").expect("valid");
        assert_eq!(name.unique_index("email"), "\"accounts_email_key\"");
    }
}
