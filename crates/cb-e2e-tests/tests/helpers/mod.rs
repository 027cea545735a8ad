//! Shared test harness for E2E conversation tests.
//!
//! Wires the HTTP router, the dialogue engine and an in-memory calendar
//! together so each test drives real code paths across every crate.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use http_body_util::BodyExt;
use tower::ServiceExt;

use cb_api::routes::build_router;
use cb_api::state::AppState;
use cb_dialogue::{DialogueEngine, FallbackResponder, MockCalendar, StaticFallback};

pub const TZ: Tz = chrono_tz::Asia::Kolkata;

/// End-to-end harness: router + shared state + the calendar behind them.
pub struct TestHarness {
    pub state: AppState,
    pub router: Router,
    pub calendar: MockCalendar,
}

impl TestHarness {
    /// Empty calendar, canned fallback replies.
    pub fn new() -> Self {
        Self::with_fallback(Arc::new(StaticFallback))
    }

    /// Empty calendar with the given fallback responder.
    pub fn with_fallback(fallback: Arc<dyn FallbackResponder>) -> Self {
        let calendar = MockCalendar::new();
        let engine = DialogueEngine::new(Arc::new(calendar.clone()), fallback, TZ);
        let state = AppState::new(engine);
        let router = build_router(state.clone());
        Self {
            state,
            router,
            calendar,
        }
    }

    /// POST /api/v1/chat. Returns (HTTP status, response JSON).
    pub async fn chat(&self, session_id: &str, message: &str) -> (StatusCode, serde_json::Value) {
        let body = serde_json::json!({
            "message": message,
            "session_id": session_id,
        });
        self.request(
            Request::post("/api/v1/chat")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
    }

    /// Chat and return just the reply text, asserting 200.
    pub async fn say(&self, session_id: &str, message: &str) -> String {
        let (status, json) = self.chat(session_id, message).await;
        assert_eq!(status, StatusCode::OK, "chat failed: {json}");
        json["response"].as_str().unwrap().to_string()
    }

    /// GET /api/v1/conversations/{id}.
    pub async fn conversation(&self, session_id: &str) -> (StatusCode, serde_json::Value) {
        self.request(
            Request::get(format!("/api/v1/conversations/{session_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// DELETE /api/v1/conversations/{id}.
    pub async fn clear(&self, session_id: &str) -> (StatusCode, serde_json::Value) {
        self.request(
            Request::delete(format!("/api/v1/conversations/{session_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// GET /api/v1/sessions.
    pub async fn sessions(&self) -> serde_json::Value {
        let (status, json) = self
            .request(Request::get("/api/v1/sessions").body(Body::empty()).unwrap())
            .await;
        assert_eq!(status, StatusCode::OK);
        json
    }

    async fn request(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }
}

/// Today's date in the harness zone.
pub fn today() -> NaiveDate {
    Utc::now().with_timezone(&TZ).date_naive()
}

pub fn tomorrow() -> NaiveDate {
    today() + Duration::days(1)
}

/// Nearest upcoming Friday, strictly after today.
pub fn next_friday() -> NaiveDate {
    let current = i64::from(today().weekday().num_days_from_monday());
    let ahead = (4 - current).rem_euclid(7);
    today() + Duration::days(if ahead == 0 { 7 } else { ahead })
}

pub fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_hms_opt(hour, minute, 0).unwrap()
}

/// "Thursday, October 22, 2026".
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %d, %Y").to_string()
}

/// "Thursday, October 22".
pub fn short_date(date: NaiveDate) -> String {
    date.format("%A, %B %d").to_string()
}
