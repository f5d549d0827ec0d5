//! Regression coverage for user value types.

use super::*;
use rstest::rstest;

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
#[case("not-a-uuid", UserValidationError::InvalidId)]
fn user_id_rejects_invalid_values(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(raw), Err(expected));
}

#[rstest]
fn user_id_round_trips_through_string() {
    let id = UserId::random();
    let parsed = UserId::new(id.to_string()).expect("generated id parses");
    assert_eq!(parsed, id);
}

#[rstest]
#[case("Alice", "alice")]
#[case("  Bob_Smith ", "bob_smith")]
#[case("j.doe-99", "j.doe-99")]
fn user_name_is_normalized(#[case] raw: &str, #[case] expected: &str) {
    let name = UserName::new(raw).expect("valid user name");
    assert_eq!(name.as_str(), expected);
}

#[rstest]
#[case("   ", UserValidationError::EmptyUserName)]
#[case("ab", UserValidationError::UserNameTooShort { min: USER_NAME_MIN })]
#[case(&"x".repeat(USER_NAME_MAX + 1), UserValidationError::UserNameTooLong { max: USER_NAME_MAX })]
#[case("alice@example", UserValidationError::UserNameInvalidCharacters)]
#[case("has space", UserValidationError::UserNameInvalidCharacters)]
fn user_name_rejects_invalid_values(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserName::new(raw), Err(expected));
}

#[rstest]
#[case("A@x.com", "a@x.com")]
#[case("  Foo@Bar.com ", "foo@bar.com")]
#[case("first.last+tag@sub.example.org", "first.last+tag@sub.example.org")]
fn email_is_normalized(#[case] raw: &str, #[case] expected: &str) {
    let email = EmailAddress::new(raw).expect("valid email");
    assert_eq!(email.as_str(), expected);
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("no-at-sign", UserValidationError::InvalidEmail)]
#[case("a@b", UserValidationError::InvalidEmail)]
#[case("a@@b.com", UserValidationError::InvalidEmail)]
#[case("a b@c.com", UserValidationError::InvalidEmail)]
fn email_rejects_invalid_values(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(EmailAddress::new(raw), Err(expected));
}

#[rstest]
fn email_rejects_overlong_values() {
    let raw = format!("{}@example.com", "a".repeat(EMAIL_MAX));
    assert_eq!(
        EmailAddress::new(raw),
        Err(UserValidationError::EmailTooLong { max: EMAIL_MAX })
    );
}

#[rstest]
fn password_hash_debug_is_redacted() {
    let hash = PasswordHash::new("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA").expect("hash");
    assert_eq!(format!("{hash:?}"), "PasswordHash(<redacted>)");
}

#[rstest]
fn password_hash_rejects_blank_values() {
    assert_eq!(
        PasswordHash::new("  "),
        Err(UserValidationError::EmptyPasswordHash)
    );
}

#[rstest]
fn user_from_new_keeps_registration_fields() {
    let created_at = Utc::now();
    let new_user = NewUser {
        user_name: UserName::new("alice").expect("user name"),
        email: EmailAddress::new("a@x.com").expect("email"),
        password_hash: PasswordHash::new("hash").expect("hash"),
        created_at,
    };
    let id = UserId::random();

    let user = User::from_new(id, new_user);

    assert_eq!(user.id(), &id);
    assert_eq!(user.user_name().as_str(), "alice");
    assert_eq!(user.email().as_str(), "a@x.com");
    assert_eq!(user.password_hash().as_str(), "hash");
    assert_eq!(user.created_at(), created_at);
}
