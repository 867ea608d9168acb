use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::{
    body::MessageBody,
    dev::ServiceResponse,
    http::{header, StatusCode},
    middleware::from_fn,
    test, web, App,
};
use async_trait::async_trait;
use serde_json::{json, Value};

use yuz_analiz::{
    config::{
        config::Limits,
        database::{connect, run_migrations},
    },
    middleware::{
        rate_limit::rate_limit,
        security_headers::{security_headers, SECURITY_HEADERS},
    },
    models::user::User,
    routes,
    service::{
        openai_client::{ModelRequest, VisionModel},
        sms_service::SmsSender,
    },
    ApiError, AppState,
};

const BOUNDARY: &str = "----yuz-analiz-test-boundary";
const PHONE: &str = "0555 111 22 33";
const NORMALIZED: &str = "905551112233";

#[derive(Default)]
struct RecordingSms {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSms {
    fn last_code(&self) -> String {
        self.sent.lock().unwrap().last().unwrap().1.clone()
    }
}

#[async_trait]
impl SmsSender for RecordingSms {
    async fn send_code(&self, phone: &str, code: &str) -> color_eyre::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((phone.to_string(), code.to_string()));
        Ok(())
    }
}

struct StubModel {
    configured: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl VisionModel for StubModel {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn respond(&self, request: &ModelRequest) -> Result<Value, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = if request.schema.is_some() {
            r#"{"overallImpression":"calm","mood":"warm","styleTags":["soft light"],"disclaimer":"for fun"}"#
                .to_string()
        } else {
            "Intro line\n# Overall Impression\nBright.\n# Eyes\nOpen.\n## Nose\nStraight.\n# Styling Suggestions\nMore light.\n# Limits and Disclaimer\nFor fun only."
                .to_string()
        };
        Ok(json!({ "output": [{ "content": [{ "type": "output_text", "text": text }] }] }))
    }
}

struct Harness {
    state: web::Data<AppState>,
    sms: Arc<RecordingSms>,
    model: Arc<StubModel>,
}

async fn harness_with(limits: Limits, configured: bool) -> Harness {
    let pool = connect("sqlite::memory:", 1).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let sms = Arc::new(RecordingSms::default());
    let model = Arc::new(StubModel {
        configured,
        calls: AtomicUsize::new(0),
    });
    let state = web::Data::new(AppState::new(
        pool,
        limits,
        "test-secret",
        sms.clone(),
        model.clone(),
    ));

    Harness { state, sms, model }
}

async fn harness() -> Harness {
    harness_with(Limits::default(), true).await
}

macro_rules! app {
    ($harness:expr) => {
        test::init_service(
            App::new()
                .app_data($harness.state.clone())
                .wrap(from_fn(rate_limit))
                .wrap(security_headers())
                .configure(routes),
        )
        .await
    };
}

async fn json_body<B: MessageBody>(response: ServiceResponse<B>) -> Value
where
    B::Error: std::fmt::Debug,
{
    let bytes = test::read_body(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

fn multipart(fields: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, content_type, data) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match content_type {
            Some(content_type) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"face.png\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn analyze_request(uri: &str, token: &str, body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

fn photo_form() -> Vec<u8> {
    multipart(&[("photo", Some("image/png"), &b"\x89PNG fake image"[..])])
}

macro_rules! login {
    ($app:expr, $harness:expr) => {{
        let send = test::TestRequest::post()
            .uri("/send-otp")
            .set_json(json!({ "phone": PHONE }))
            .to_request();
        assert_eq!(test::call_service(&$app, send).await.status(), StatusCode::OK);

        let verify = test::TestRequest::post()
            .uri("/verify-otp")
            .set_json(json!({ "phone": PHONE, "code": $harness.sms.last_code() }))
            .to_request();
        let response = test::call_service(&$app, verify).await;
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }};
}

#[actix_web::test]
async fn send_otp_requires_a_phone() {
    let harness = harness().await;
    let app = app!(harness);

    for body in [json!({}), json!({ "phone": "" }), json!({ "phone": "---" })] {
        let request = test::TestRequest::post()
            .uri("/send-otp")
            .set_json(body)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }
}

#[actix_web::test]
async fn responses_carry_security_headers() {
    let harness = harness().await;
    let app = app!(harness);

    let ok = test::TestRequest::post()
        .uri("/send-otp")
        .set_json(json!({ "phone": "05551112233" }))
        .to_request();
    let unauthorized = test::TestRequest::get().uri("/profil").to_request();

    for request in [ok, unauthorized] {
        let response = test::call_service(&app, request).await;
        for (name, value) in SECURITY_HEADERS {
            assert_eq!(response.headers().get(name).unwrap(), value);
        }
    }
}

#[actix_web::test]
async fn send_otp_normalizes_and_throttles() {
    let harness = harness().await;
    let app = app!(harness);

    let request = test::TestRequest::post()
        .uri("/send-otp")
        .set_json(json!({ "phone": PHONE }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["ok"], true);
    assert_eq!(harness.sms.sent.lock().unwrap()[0].0, NORMALIZED);

    let again = test::TestRequest::post()
        .uri("/send-otp")
        .set_json(json!({ "phone": "+90 555 111 22 33" }))
        .to_request();
    let response = test::call_service(&app, again).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
}

#[actix_web::test]
async fn verify_otp_rejects_wrong_and_reused_codes() {
    let harness = harness().await;
    let app = app!(harness);

    let missing = test::TestRequest::post()
        .uri("/verify-otp")
        .set_json(json!({ "phone": PHONE }))
        .to_request();
    assert_eq!(
        test::call_service(&app, missing).await.status(),
        StatusCode::BAD_REQUEST
    );

    let send = test::TestRequest::post()
        .uri("/send-otp")
        .set_json(json!({ "phone": PHONE }))
        .to_request();
    test::call_service(&app, send).await;
    let code = harness.sms.last_code();
    let wrong = if code == "111111" { "222222" } else { "111111" };

    let request = test::TestRequest::post()
        .uri("/verify-otp")
        .set_json(json!({ "phone": PHONE, "code": wrong }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Wrong code");

    let request = test::TestRequest::post()
        .uri("/verify-otp")
        .set_json(json!({ "phone": NORMALIZED, "code": code }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["token"].as_str().unwrap().split('.').count() == 3);

    let reused = test::TestRequest::post()
        .uri("/verify-otp")
        .set_json(json!({ "phone": PHONE, "code": code }))
        .to_request();
    let response = test::call_service(&app, reused).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Code not found");
}

#[actix_web::test]
async fn profile_requires_a_valid_token() {
    let harness = harness().await;
    let app = app!(harness);

    let anonymous = test::TestRequest::get().uri("/profil").to_request();
    assert_eq!(
        test::call_service(&app, anonymous).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let forged = test::TestRequest::get()
        .uri("/profil")
        .insert_header((header::AUTHORIZATION, "Bearer not.a.token"))
        .to_request();
    assert_eq!(
        test::call_service(&app, forged).await.status(),
        StatusCode::FORBIDDEN
    );

    let token = login!(app, harness);
    let request = test::TestRequest::get()
        .uri("/profil")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["user"]["phone"], NORMALIZED);
    assert_eq!(body["user"]["username"], NORMALIZED);
    assert!(body["user"].get("password").is_none());
    assert!(body["message"].as_str().unwrap().contains(NORMALIZED));
}

#[actix_web::test]
async fn profile_of_a_missing_user_is_not_found() {
    let harness = harness().await;
    let app = app!(harness);

    let ghost = User {
        id: 4_242,
        username: None,
        phone: "905550000000".into(),
        password: None,
    };
    let token = harness.state.tokens.issue(&ghost).unwrap();

    let request = test::TestRequest::get()
        .uri("/profil")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    assert_eq!(
        test::call_service(&app, request).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn analyze_defaults_to_the_structured_reply() {
    let harness = harness().await;
    let app = app!(harness);
    let token = login!(app, harness);

    let request = analyze_request("/analyze", &token, photo_form()).to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(
        body,
        json!({
            "overallImpression": "calm",
            "mood": "warm",
            "styleTags": ["soft light"],
            "disclaimer": "for fun"
        })
    );
}

#[actix_web::test]
async fn analyze_prose_mode_from_query_field_or_header() {
    let harness = harness().await;
    let app = app!(harness);
    let token = login!(app, harness);

    let by_query = analyze_request("/analyze?mode=prose", &token, photo_form()).to_request();
    let by_field = analyze_request(
        "/analyze",
        &token,
        multipart(&[
            ("mode", None, &b"prose"[..]),
            ("photo", Some("image/png"), &b"\x89PNG fake image"[..]),
        ]),
    )
    .to_request();
    let by_header = analyze_request("/analyze", &token, photo_form())
        .insert_header(("x-analyze-mode", "prose"))
        .to_request();

    for request in [by_query, by_field, by_header] {
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["format"], "markdown");
        assert!(body["text"].as_str().unwrap().starts_with("Intro line"));

        let slides = body["slides"].as_array().unwrap();
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].as_array().unwrap().len(), 4);
        assert_eq!(slides[0][0]["title"], "Analysis");
        assert_eq!(slides[0][3]["title"], "Nose");
        assert_eq!(slides[1][1]["body"], "For fun only.");
    }
}

#[actix_web::test]
async fn analyze_enforces_auth_file_and_quota() {
    let harness = harness().await;
    let app = app!(harness);

    let anonymous = test::TestRequest::post()
        .uri("/analyze")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(photo_form())
        .to_request();
    assert_eq!(
        test::call_service(&app, anonymous).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let token = login!(app, harness);

    let no_file = analyze_request("/analyze", &token, multipart(&[("mode", None, &b"json"[..])]))
        .to_request();
    let response = test::call_service(&app, no_file).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Photo required");

    for _ in 0..3 {
        let request = analyze_request("/analyze", &token, photo_form()).to_request();
        assert_eq!(
            test::call_service(&app, request).await.status(),
            StatusCode::OK
        );
    }

    let over = analyze_request("/analyze", &token, photo_form()).to_request();
    let response = test::call_service(&app, over).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(harness.model.calls.load(Ordering::SeqCst), 3);
}

#[actix_web::test]
async fn analyze_without_credential_is_a_server_fault() {
    let harness = harness_with(Limits::default(), false).await;
    let app = app!(harness);
    let token = login!(app, harness);

    let request = analyze_request("/analyze", &token, photo_form()).to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(harness.model.calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn oversized_photos_are_refused() {
    let limits = Limits {
        max_upload_bytes: 8,
        ..Limits::default()
    };
    let harness = harness_with(limits, true).await;
    let app = app!(harness);
    let token = login!(app, harness);

    let request = analyze_request(
        "/analyze",
        &token,
        multipart(&[("photo", Some("image/png"), &[0u8; 64][..])]),
    )
    .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(harness.model.calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn global_rate_limit_applies_to_every_route() {
    let limits = Limits {
        requests_per_window: 2,
        ..Limits::default()
    };
    let harness = harness_with(limits, true).await;
    let app = app!(harness);

    for _ in 0..2 {
        let request = test::TestRequest::get().uri("/profil").to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key("ratelimit-remaining"));
    }

    let request = test::TestRequest::post()
        .uri("/send-otp")
        .set_json(json!({ "phone": PHONE }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
    assert!(harness.sms.sent.lock().unwrap().is_empty());
}
