//! Liveness and readiness probes.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};

/// Probe flags flipped by the server lifecycle.
///
/// Starts live but not ready; the server marks it ready once the credential
/// store is reachable.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness so orchestrators stop routing during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

fn probe(ok: bool) -> HttpResponse {
    let mut response = if ok {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

/// Readiness probe.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Ready to handle traffic"),
        (status = 503, description = "Not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    probe(state.is_ready())
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Alive"),
        (status = 503, description = "Shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    probe(state.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;

    #[rstest]
    #[actix_web::test]
    async fn readiness_follows_state() {
        let state = web::Data::new(HealthState::new());
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(ready)
                .service(live),
        )
        .await;

        let before =
            test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request())
                .await;
        state.mark_ready();
        let after =
            test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request())
                .await;

        assert_eq!(before.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(after.status(), StatusCode::OK);
        assert_eq!(
            after.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn liveness_fails_once_draining() {
        let state = web::Data::new(HealthState::new());
        let app = test::init_service(App::new().app_data(state.clone()).service(live)).await;

        state.mark_unhealthy();
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/health/live").to_request())
                .await;

        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
