//! HTTP-level tests for the tour API: authentication, validation, filtering,
//! uploads and the not-found paths, driven through the router with `oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio_test::assert_ok;
use tower::ServiceExt;

use travel_showcase::config::AppConfig;
use travel_showcase::controller::TourController;
use travel_showcase::http::{create_router, AppState, JwtAuth};
use travel_showcase::repository::InMemoryTourRepository;
use travel_showcase::uploads::ImageStore;

const TEST_JWT_SECRET: &[u8] = b"test-secret-for-http-tests";
const BOUNDARY: &str = "tour-form-boundary";

struct TestApp {
    router: Router,
    token: String,
    uploads: TempDir,
}

fn build_test_app() -> TestApp {
    build_test_app_with(AppConfig::default())
}

fn build_test_app_with(mut config: AppConfig) -> TestApp {
    let uploads = TempDir::new().unwrap();
    config.uploads.dir = uploads.path().display().to_string();

    let auth = JwtAuth::from_secret(TEST_JWT_SECRET);
    let token = auth
        .issue("test-admin", chrono::Duration::minutes(10))
        .unwrap();

    let controller = TourController::new(
        Arc::new(InMemoryTourRepository::new()),
        ImageStore::new(uploads.path(), &config.uploads.public_prefix),
    );
    let router = create_router(AppState::new(controller, auth), &config);

    TestApp {
        router,
        token,
        uploads,
    }
}

struct Image<'a> {
    file_name: &'a str,
    content_type: &'a str,
    data: &'a [u8],
}

fn multipart_body(fields: &[(&str, &str)], image: Option<Image<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some(image) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, image.file_name, image.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(image.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn form_request(method: &str, uri: &str, token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return (status, Value::Null);
    }
    let json = serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        panic!(
            "{} body is not JSON ({}): {}",
            status,
            e,
            String::from_utf8_lossy(&bytes)
        )
    });
    (status, json)
}

async fn create(app: &TestApp, fields: &[(&str, &str)]) -> u64 {
    let request = form_request(
        "POST",
        "/tours",
        Some(&app.token),
        multipart_body(fields, None),
    );
    let (status, json) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::CREATED, "{}", json);
    json["id"].as_u64().unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = build_test_app();

    let (status, json) = send(&app.router, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn mutating_routes_require_a_valid_token() {
    let app = build_test_app();
    let body = || multipart_body(&[("title", "Altai"), ("price", "100"), ("status", "active")], None);
    let foreign = JwtAuth::from_secret(b"someone-else")
        .issue("intruder", chrono::Duration::minutes(10))
        .unwrap();

    let requests = vec![
        form_request("POST", "/tours", None, body()),
        form_request("POST", "/tours", Some(&foreign), body()),
        form_request("PUT", "/tours/1", None, body()),
        form_request("DELETE", "/tours/1", Some("garbage"), Vec::new()),
    ];
    for request in requests {
        let (status, json) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "UNAUTHORIZED");
        assert!(json["message"].is_string());
    }

    let (_, tours) = send(&app.router, get("/tours")).await;
    assert_eq!(tours, serde_json::json!([]));
}

#[tokio::test]
async fn create_rejects_missing_and_invalid_fields() {
    let app = build_test_app();
    let cases: Vec<(Vec<(&str, &str)>, &str)> = vec![
        (vec![("price", "100"), ("status", "active")], "title"),
        (vec![("title", "Altai"), ("status", "active")], "price"),
        (vec![("title", "Altai"), ("price", "100")], "status"),
        (vec![("title", "Altai"), ("price", "cheap"), ("status", "active")], "price"),
        (vec![("title", "Altai"), ("price", "100"), ("status", "archived")], "status"),
        (
            vec![("title", "Altai"), ("price", "100"), ("status", "active"), ("date_start", "01.05.2024")],
            "date_start",
        ),
        (
            vec![("title", "Altai"), ("price", "100"), ("status", "active"), ("programs", "{not json")],
            "programs",
        ),
    ];

    for (fields, offending) in cases {
        let request = form_request("POST", "/tours", Some(&app.token), multipart_body(&fields, None));
        let (status, json) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{:?}", fields);
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "Validation failed");
        assert!(
            json["details"].as_str().unwrap().contains(offending),
            "{} missing from {}",
            offending,
            json
        );
    }
}

#[tokio::test]
async fn created_tours_get_increasing_ids() {
    let app = build_test_app();

    let first = create(&app, &[("title", "Altai"), ("price", "100"), ("status", "active")]).await;
    let second = create(&app, &[("title", "Baikal"), ("price", "200"), ("status", "active")]).await;

    assert!(second > first);

    let (status, json) = send(&app.router, get(&format!("/tours/{}", second))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Baikal");
    assert_eq!(json["price"], 200.0);
}

#[tokio::test]
async fn create_with_programs_and_dates() {
    let app = build_test_app();
    let id = create(
        &app,
        &[
            ("title", "Kamchatka"),
            ("price", "2500.5"),
            ("status", "active"),
            ("location", "Kamchatka"),
            ("date_start", "2024-05-01"),
            ("date_end", "2024-05-10"),
            ("programs", r#"[{"day": 1, "title": "Arrival"}, {"title": "Volcano"}]"#),
        ],
    )
    .await;

    let (_, json) = send(&app.router, get(&format!("/tours/{}", id))).await;

    assert_eq!(json["date_start"], "2024-05-01");
    assert_eq!(json["date_end"], "2024-05-10");
    assert_eq!(json["programs"][0]["day"], 1);
    assert_eq!(json["programs"][1]["title"], "Volcano");
}

#[tokio::test]
async fn uploaded_image_is_stored_and_served() {
    let app = build_test_app();
    let picture = b"\x89PNG fake image bytes";
    let request = form_request(
        "POST",
        "/tours",
        Some(&app.token),
        multipart_body(
            &[("title", "Altai"), ("price", "100"), ("status", "active")],
            Some(Image {
                file_name: "altai.png",
                content_type: "image/png",
                data: picture,
            }),
        ),
    );

    let (status, created) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, tour) = send(&app.router, get(&format!("/tours/{}", created["id"]))).await;
    let url = tour["image_url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/tours/"), "{}", url);
    assert!(url.ends_with(".png"));

    let relative = url.trim_start_matches("/uploads/");
    assert_ok!(std::fs::metadata(app.uploads.path().join(relative)));

    let response = app.router.clone().oneshot(get(&url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let served = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&served[..], &picture[..]);
}

#[tokio::test]
async fn unsupported_image_type_is_rejected() {
    let app = build_test_app();
    let request = form_request(
        "POST",
        "/tours",
        Some(&app.token),
        multipart_body(
            &[("title", "Altai"), ("price", "100"), ("status", "active")],
            Some(Image {
                file_name: "notes.exe",
                content_type: "application/octet-stream",
                data: b"MZ",
            }),
        ),
    );

    let (status, json) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn list_applies_every_filter() {
    let app = build_test_app();
    create(&app, &[("title", "Altai Trek"), ("price", "150"), ("status", "active"), ("location", "Altai")]).await;
    create(&app, &[("title", "Altai Budget"), ("price", "50"), ("status", "active"), ("location", "Altai")]).await;
    create(&app, &[("title", "Altai Winter"), ("price", "300"), ("status", "inactive"), ("location", "Altai")]).await;
    create(&app, &[("title", "Baikal Ice"), ("price", "200"), ("status", "active"), ("location", "Baikal")]).await;

    let (status, all) = send(&app.router, get("/tours")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 4);

    let (_, filtered) = send(
        &app.router,
        get("/tours?status=active&search=altai&location=Altai&minPrice=100&maxPrice=250"),
    )
    .await;
    let titles: Vec<&str> = filtered
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Altai Trek"]);

    let (_, none) = send(&app.router, get("/tours?status=completed")).await;
    assert_eq!(none, serde_json::json!([]));
}

#[tokio::test]
async fn list_rejects_malformed_filters() {
    let app = build_test_app();

    for uri in ["/tours?minPrice=cheap", "/tours?status=archived"] {
        let (status, json) = send(&app.router, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = build_test_app();

    let (status, json) = send(&app.router, get("/tours/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["message"], "Tour not found");

    let update = form_request(
        "PUT",
        "/tours/99",
        Some(&app.token),
        multipart_body(&[("title", "Ghost")], None),
    );
    let (status, _) = send(&app.router, update).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let delete = form_request("DELETE", "/tours/99", Some(&app.token), Vec::new());
    let (status, _) = send(&app.router, delete).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_then_delete() {
    let app = build_test_app();
    let id = create(&app, &[("title", "Altai"), ("price", "100"), ("status", "active")]).await;
    let uri = format!("/tours/{}", id);

    let update = form_request(
        "PUT",
        &uri,
        Some(&app.token),
        multipart_body(&[("title", "Altai Deluxe"), ("price", "180")], None),
    );
    let (status, json) = send(&app.router, update).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].is_string());

    let (_, tour) = send(&app.router, get(&uri)).await;
    assert_eq!(tour["title"], "Altai Deluxe");
    assert_eq!(tour["price"], 180.0);
    assert_eq!(tour["status"], "active");

    let delete = form_request("DELETE", &uri, Some(&app.token), Vec::new());
    let (status, json) = send(&app.router, delete).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].is_string());

    let (status, _) = send(&app.router, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_ids_get_json_errors() {
    let app = build_test_app();
    let requests = vec![
        get("/tours/abc"),
        get("/tours/-1"),
        form_request("DELETE", "/tours/abc", Some(&app.token), Vec::new()),
        form_request(
            "PUT",
            "/tours/abc",
            Some(&app.token),
            multipart_body(&[("title", "Ghost")], None),
        ),
    ];

    for request in requests {
        let uri = request.uri().to_string();
        let (status, json) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert!(json["message"].is_string());
        assert!(json["details"].as_str().unwrap().contains("abc") || uri.ends_with("-1"));
    }
}

#[tokio::test]
async fn malformed_id_still_needs_a_token() {
    let app = build_test_app();

    let request = form_request("DELETE", "/tours/abc", None, Vec::new());
    let (status, json) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let mut config = AppConfig::default();
    config.server.max_upload_mb = 1;
    let app = build_test_app_with(config);
    let picture = vec![0u8; 2 * 1024 * 1024];

    let request = form_request(
        "POST",
        "/tours",
        Some(&app.token),
        multipart_body(
            &[("title", "Altai"), ("price", "100"), ("status", "active")],
            Some(Image {
                file_name: "huge.jpg",
                content_type: "image/jpeg",
                data: &picture,
            }),
        ),
    );
    let (status, json) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["code"], "PAYLOAD_TOO_LARGE");
    assert!(json["message"].is_string());

    let (_, tours) = send(&app.router, get("/tours")).await;
    assert_eq!(tours, serde_json::json!([]));
}
