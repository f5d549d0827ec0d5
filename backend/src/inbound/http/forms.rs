//! Wire shapes for the combined login/register page.
//!
//! Each endpoint parses only its own half of the page: fields belonging to
//! the other form are ignored by the deserializer, so they can neither
//! validate nor fail.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    FieldError, FormErrors, FormMode, LoginSubmission, Password, SignupSubmission,
};

use super::redirect::is_local_path;

/// `POST /login` form body.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginForm {
    #[serde(rename = "loginIdentifier", default)]
    #[schema(example = "alice@example.com")]
    pub identifier: String,
    #[serde(rename = "loginPassword", default)]
    #[schema(value_type = String, format = Password)]
    pub password: Password,
    #[serde(rename = "returnUrl", default)]
    #[schema(example = "/orders")]
    pub return_url: Option<String>,
    /// Anti-forgery token from the rendered page.
    #[serde(rename = "csrfToken", default)]
    pub csrf_token: String,
}

impl LoginForm {
    /// Split into the domain submission and the requested return URL.
    pub fn into_parts(self) -> (LoginSubmission, Option<String>) {
        let Self {
            identifier,
            password,
            return_url,
            ..
        } = self;
        (
            LoginSubmission {
                identifier,
                password,
            },
            return_url,
        )
    }
}

/// `POST /register` form body.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SignupForm {
    #[serde(rename = "signupUserName", default)]
    #[schema(example = "alice")]
    pub user_name: String,
    #[serde(rename = "signupEmail", default)]
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[serde(rename = "signupPassword", default)]
    #[schema(value_type = String, format = Password)]
    pub password: Password,
    #[serde(rename = "csrfToken", default)]
    pub csrf_token: String,
}

/// `POST /logout` form body.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LogoutForm {
    #[serde(rename = "csrfToken", default)]
    pub csrf_token: String,
}

impl From<SignupForm> for SignupSubmission {
    fn from(form: SignupForm) -> Self {
        Self {
            user_name: form.user_name,
            email: form.email,
            password: form.password,
        }
    }
}

/// Query string accepted by `GET /login`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReturnQuery {
    /// Local path to continue to after a successful login.
    #[serde(rename = "returnUrl")]
    pub return_url: Option<String>,
}

/// Non-secret values echoed back into the form.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormValues {
    pub login_identifier: String,
    pub signup_user_name: String,
    pub signup_email: String,
}

/// JSON rendering of the combined page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub mode: FormMode,
    #[schema(value_type = Vec<FieldError>)]
    pub errors: FormErrors,
    /// One-shot message, such as the registration confirmation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    pub values: FormValues,
    /// Token the next post of this form must echo as `csrfToken`.
    pub csrf_token: String,
}

impl FormView {
    /// Empty form in `mode`, bound to the session's anti-forgery token.
    pub fn blank(mode: FormMode, csrf_token: String) -> Self {
        Self {
            mode,
            errors: FormErrors::new(),
            notice: None,
            return_url: None,
            values: FormValues::default(),
            csrf_token,
        }
    }

    pub fn with_errors(mut self, errors: FormErrors) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.notice = notice;
        self
    }

    /// Keep `return_url` only when it is safe to follow later.
    pub fn with_return_url(mut self, return_url: Option<String>) -> Self {
        self.return_url = return_url.filter(|url| is_local_path(url));
        self
    }

    pub fn with_values(mut self, values: FormValues) -> Self {
        self.values = values;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldErrorCode;
    use actix_web::http::header::ContentType;
    use actix_web::{FromRequest, test::{self}, web};
    use rstest::rstest;
    use serde::de::DeserializeOwned;
    use serde_json::json;

    async fn parse<T: DeserializeOwned + 'static>(body: &'static str) -> T {
        let (req, mut payload) = test::TestRequest::post()
            .insert_header(ContentType::form_url_encoded())
            .set_payload(body)
            .to_http_parts();
        web::Form::<T>::from_request(&req, &mut payload)
            .await
            .expect("parse form")
            .into_inner()
    }

    #[rstest]
    #[actix_web::test]
    async fn login_form_ignores_signup_fields() {
        let form: LoginForm =
            parse("loginIdentifier=alice&loginPassword=pw&signupEmail=&signupUserName=x").await;
        let (submission, return_url) = form.into_parts();

        assert_eq!(submission.identifier, "alice");
        assert_eq!(submission.password.expose(), "pw");
        assert!(return_url.is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn token_is_read_alongside_each_form() {
        let login: LoginForm = parse("loginIdentifier=alice&csrfToken=abc").await;
        let signup: SignupForm = parse("signupEmail=a%40x.com&csrfToken=def").await;
        let logout: LogoutForm = parse("csrfToken=ghi").await;

        assert_eq!(login.csrf_token, "abc");
        assert_eq!(signup.csrf_token, "def");
        assert_eq!(signup.email, "a@x.com");
        assert_eq!(logout.csrf_token, "ghi");
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_fields_default_to_empty() {
        let form: SignupForm = parse("loginIdentifier=alice").await;
        let submission = SignupSubmission::from(form);
        assert_eq!(submission, SignupSubmission::default());
    }

    #[rstest]
    fn view_serializes_without_passwords_or_unsafe_urls() {
        let mut errors = FormErrors::new();
        errors.push_field("signupEmail", FieldErrorCode::InvalidFormat, "bad email");
        let view = FormView::blank(FormMode::Register, "t0ken".to_owned())
            .with_errors(errors)
            .with_return_url(Some("//evil.example".to_owned()))
            .with_values(FormValues {
                signup_email: "nope".to_owned(),
                ..FormValues::default()
            });

        let json = serde_json::to_value(&view).expect("serialize view");

        assert_eq!(
            json,
            json!({
                "mode": "register",
                "errors": [
                    { "field": "signupEmail", "code": "invalid_format", "message": "bad email" }
                ],
                "values": {
                    "loginIdentifier": "",
                    "signupUserName": "",
                    "signupEmail": "nope"
                },
                "csrfToken": "t0ken"
            })
        );
    }
}
