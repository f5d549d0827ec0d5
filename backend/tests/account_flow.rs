//! End-to-end account flows through the assembled application.

mod support;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test;
use futures_util::future::join;
use orderdesk::domain::{
    DUPLICATE_REGISTRATION_MESSAGE, INVALID_CREDENTIALS_MESSAGE, TRACE_ID_HEADER,
};
use orderdesk::server::build_app;
use rstest::rstest;
use serde_json::Value;

use support::{harness, location, session_cookie};

/// Session cookie and anti-forgery token handed out with a page.
struct PageSession {
    cookie: Cookie<'static>,
    token: String,
}

/// GET `$uri` (optionally with a cookie) and keep what the next post needs.
macro_rules! open_page {
    ($app:expr, $uri:expr) => {
        open_page!($app, $uri, test::TestRequest::get().uri($uri))
    };
    ($app:expr, $uri:expr, cookie = $cookie:expr) => {
        open_page!($app, $uri, test::TestRequest::get().uri($uri).cookie($cookie))
    };
    ($app:expr, $uri:expr, $request:expr) => {{
        let res = test::call_service(&$app, $request.to_request()).await;
        let cookie = session_cookie(&res).expect("page sets session cookie");
        let body: Value = test::read_body_json(res).await;
        let token = body["csrfToken"]
            .as_str()
            .expect("page carries token")
            .to_owned();
        (PageSession { cookie, token }, body)
    }};
}

fn register_request(
    page: &PageSession,
    user_name: &str,
    email: &str,
    password: &str,
) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/register")
        .cookie(page.cookie.clone())
        .set_form([
            ("signupUserName", user_name),
            ("signupEmail", email),
            ("signupPassword", password),
            ("csrfToken", page.token.as_str()),
        ])
}

fn login_request(page: &PageSession, identifier: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/login")
        .cookie(page.cookie.clone())
        .set_form([
            ("loginIdentifier", identifier),
            ("loginPassword", password),
            // Leftovers from the other half of the page are ignored.
            ("signupUserName", ""),
            ("signupEmail", ""),
            ("signupPassword", ""),
            ("csrfToken", page.token.as_str()),
        ])
}

fn first_error_message(body: &Value) -> Option<&str> {
    body["errors"][0]["message"].as_str()
}

#[rstest]
#[case("ALICE")]
#[case("A@X.COM")]
#[actix_web::test]
async fn registered_user_logs_in_by_either_identifier(#[case] identifier: &str) {
    let harness = harness();
    let app = test::init_service(build_app(harness.deps)).await;
    let (register_page, _) = open_page!(app, "/register");

    let registered = test::call_service(
        &app,
        register_request(&register_page, "Alice", "A@x.com", "p@ss1").to_request(),
    )
    .await;
    assert_eq!(registered.status(), StatusCode::FOUND);
    assert_eq!(location(&registered).as_deref(), Some("/login"));
    let notice_cookie = session_cookie(&registered).expect("notice cookie");

    let (login_page, page) = open_page!(app, "/login", cookie = notice_cookie);
    assert_eq!(page["notice"], "Registration successful. Please login.");
    assert_eq!(login_page.token, register_page.token);

    let logged_in = test::call_service(
        &app,
        login_request(&login_page, identifier, "p@ss1").to_request(),
    )
    .await;
    assert_eq!(logged_in.status(), StatusCode::FOUND);
    assert_eq!(location(&logged_in).as_deref(), Some("/"));
    let cookie = session_cookie(&logged_in).expect("session cookie");

    let landing = test::call_service(
        &app,
        test::TestRequest::get().uri("/").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(landing.status(), StatusCode::OK);
    let claims: Value = test::read_body_json(landing).await;
    assert_eq!(claims["userName"], "alice");
    assert_eq!(claims["email"], "a@x.com");
    assert_eq!(harness.store.len(), 1);
}

#[rstest]
#[case("alice", "wrong-pw")]
#[case("nobody", "p@ss1")]
#[actix_web::test]
async fn failed_logins_share_one_message(#[case] identifier: &str, #[case] password: &str) {
    let harness = harness();
    let app = test::init_service(build_app(harness.deps)).await;
    let (page, _) = open_page!(app, "/register");
    test::call_service(
        &app,
        register_request(&page, "alice", "a@x.com", "p@ss1").to_request(),
    )
    .await;

    let res = test::call_service(
        &app,
        login_request(&page, identifier, password).to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res).unwrap_or_else(|| page.cookie.clone());
    let body: Value = test::read_body_json(res).await;
    assert_eq!(first_error_message(&body), Some(INVALID_CREDENTIALS_MESSAGE));
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["csrfToken"].as_str(), Some(page.token.as_str()));
    let landing = test::call_service(
        &app,
        test::TestRequest::get().uri("/").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(landing.status(), StatusCode::FOUND);
}

#[rstest]
#[actix_web::test]
async fn case_variant_duplicate_is_rejected() {
    let harness = harness();
    let app = test::init_service(build_app(harness.deps)).await;
    let (page, _) = open_page!(app, "/register");
    test::call_service(
        &app,
        register_request(&page, "alice", "a@x.com", "p@ss1").to_request(),
    )
    .await;

    let res = test::call_service(
        &app,
        register_request(&page, "ALICE", "other@x.com", "p@ss1").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(first_error_message(&body), Some(DUPLICATE_REGISTRATION_MESSAGE));
    assert_eq!(body["values"]["signupUserName"], "ALICE");
    assert_eq!(harness.store.len(), 1);
}

#[rstest]
#[actix_web::test]
async fn concurrent_registrations_store_one_user() {
    let harness = harness();
    let app = test::init_service(build_app(harness.deps)).await;
    let (page, _) = open_page!(app, "/register");

    let (first, second) = join(
        test::call_service(
            &app,
            register_request(&page, "alice", "a@x.com", "p@ss1").to_request(),
        ),
        test::call_service(
            &app,
            register_request(&page, "Alice", "A@x.com", "p@ss1").to_request(),
        ),
    )
    .await;

    let statuses = [first.status(), second.status()];
    assert!(statuses.contains(&StatusCode::FOUND));
    assert!(statuses.contains(&StatusCode::OK));
    assert_eq!(harness.store.len(), 1);
    let loser = if first.status() == StatusCode::OK {
        first
    } else {
        second
    };
    let body: Value = test::read_body_json(loser).await;
    assert_eq!(first_error_message(&body), Some(DUPLICATE_REGISTRATION_MESSAGE));
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(1));
}

#[rstest]
#[actix_web::test]
async fn logout_ends_the_session() {
    let harness = harness();
    let app = test::init_service(build_app(harness.deps)).await;
    let (page, _) = open_page!(app, "/register");
    test::call_service(
        &app,
        register_request(&page, "alice", "a@x.com", "p@ss1").to_request(),
    )
    .await;
    let logged_in = test::call_service(
        &app,
        login_request(&page, "alice", "p@ss1").to_request(),
    )
    .await;
    let cookie = session_cookie(&logged_in).expect("session cookie");
    let (landing_page, _) = open_page!(app, "/", cookie = cookie);

    let logged_out = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/logout")
            .cookie(landing_page.cookie)
            .set_form([("csrfToken", landing_page.token.as_str())])
            .to_request(),
    )
    .await;
    assert_eq!(logged_out.status(), StatusCode::FOUND);
    assert_eq!(location(&logged_out).as_deref(), Some("/login"));
    let cleared = session_cookie(&logged_out).expect("removal cookie");
    assert_eq!(cleared.value(), "");

    let landing = test::call_service(
        &app,
        test::TestRequest::get().uri("/").cookie(cleared).to_request(),
    )
    .await;
    assert_eq!(landing.status(), StatusCode::FOUND);
    assert_eq!(location(&landing).as_deref(), Some("/login?returnUrl=%2F"));
}

#[rstest]
#[case("/login")]
#[case("/register")]
#[actix_web::test]
async fn cross_site_posts_are_refused(#[case] path: &str) {
    let harness = harness();
    let app = test::init_service(build_app(harness.deps)).await;
    let (page, _) = open_page!(app, "/login");
    let forged = PageSession {
        cookie: page.cookie.clone(),
        token: "0".repeat(page.token.len()),
    };

    let request = if path == "/login" {
        login_request(&forged, "alice", "p@ss1")
    } else {
        register_request(&forged, "mallory", "m@x.com", "p@ss1")
    };
    let res = test::call_service(&app, request.to_request()).await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(harness.store.len(), 0);
}

#[rstest]
#[case("/login")]
#[case("/health/live")]
#[actix_web::test]
async fn responses_carry_a_trace_id(#[case] path: &str) {
    let harness = harness();
    let app = test::init_service(build_app(harness.deps)).await;

    let res = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;

    assert!(res.headers().contains_key(TRACE_ID_HEADER));
}
