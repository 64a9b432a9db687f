//! Fill service request handling and remote/local equivalence

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use common::{
    loopback_state, sample_png, spawn_asset_host, spawn_fill_service, two_page_template,
};
use export::{ErrorBody, FillRequest, HttpFetcher, RemoteFillClient, DEFAULT_TIMEOUT};
use fill_server::{router, AppState, ServerConfig};
use filler::{AssetBundle, DocumentFiller, Mapping, MappingField, Record, StaticAssets};
use pdf_core::inspect::{drawn_items, DrawnItem};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::{Cursor, Read};
use std::sync::Arc;
use tower::ServiceExt;

fn strict_state() -> Arc<AppState> {
    Arc::new(AppState::new(ServerConfig::default()).unwrap())
}

async fn post_json(body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    router(strict_state()).oneshot(request).await.unwrap()
}

async fn error_of(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let error: ErrorBody = serde_json::from_slice(&body).unwrap();
    (status, error.error)
}

fn mapping() -> Mapping {
    Mapping::new(
        vec![
            MappingField::text("full_name", 50.0, 100.0),
            MappingField::text("course", 20.0, 40.0).on_page(1),
            MappingField::image("signature_url", 40.0, 600.0),
        ],
        600.0,
        800.0,
    )
}

fn texts(pdf: &[u8]) -> Vec<String> {
    drawn_items(pdf)
        .unwrap()
        .into_iter()
        .filter_map(|item| match item {
            DrawnItem::Text { text, .. } => Some(text),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_rejects_non_json_body() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("hello"))
        .unwrap();
    let response = router(strict_state()).oneshot(request).await.unwrap();

    assert_eq!(
        error_of(response).await,
        (StatusCode::BAD_REQUEST, "Expected JSON body".to_string())
    );
}

#[tokio::test]
async fn test_rejects_malformed_json() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/pdf-export")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router(strict_state()).oneshot(request).await.unwrap();

    let (status, error) = error_of(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error.starts_with("Invalid JSON body"));
}

#[tokio::test]
async fn test_validation_order() {
    // template checks come before the submission check
    let response = post_json(json!({ "mode": "single", "submissions": [] })).await;
    assert_eq!(
        error_of(response).await,
        (StatusCode::BAD_REQUEST, "templateUrl is required".to_string())
    );

    let response = post_json(json!({
        "submissions": [],
        "templateUrl": "http://localhost:5173/template.pdf"
    }))
    .await;
    let (status, error) = error_of(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error.contains("public URL"));

    let response = post_json(json!({
        "submissions": [],
        "templateUrl": "https://cdn.example.invalid/template.pdf"
    }))
    .await;
    assert_eq!(
        error_of(response).await,
        (StatusCode::BAD_REQUEST, "No submission provided".to_string())
    );

    let response = post_json(json!({
        "mode": "bulk",
        "templateUrl": "https://cdn.example.invalid/template.pdf"
    }))
    .await;
    assert_eq!(
        error_of(response).await,
        (StatusCode::BAD_REQUEST, "No submission provided".to_string())
    );
}

#[tokio::test]
async fn test_preflight() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/")
        .header(header::ORIGIN, "https://forms.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,apikey,content-type")
        .body(Body::empty())
        .unwrap();
    let response = router(strict_state()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    for name in ["authorization", "x-client-info", "apikey", "content-type"] {
        assert!(allowed.contains(name), "{name} missing from {allowed}");
    }
}

#[tokio::test]
async fn test_errors_carry_cors_headers() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::ORIGIN, "https://forms.example.com")
        .body(Body::empty())
        .unwrap();
    let response = router(strict_state()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = router(strict_state()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_single_fill_over_http() {
    let base = spawn_asset_host(two_page_template()).await;
    let endpoint = spawn_fill_service(loopback_state()).await;

    let request = FillRequest::single(
        Record::new().with("full_name", "Jane Doe").with("course", 7),
        mapping(),
        &format!("{base}/template.pdf"),
    );
    let response = reqwest::Client::new()
        .post(&endpoint)
        .json(&request)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"Jane_Doe.pdf\""
    );

    let pdf = response.bytes().await.unwrap();
    let items = drawn_items(&pdf).unwrap();
    assert!(items[0].approx_eq(
        &DrawnItem::Text {
            page: 1,
            x: 51.0,
            y: 681.0,
            font_size: 12.0,
            text: "Jane Doe".to_string(),
        },
        1e-3
    ));
    assert_eq!(texts(&pdf), vec!["Jane Doe", "7"]);
}

#[tokio::test]
async fn test_bulk_archive_completeness() {
    let base = spawn_asset_host(two_page_template()).await;
    let endpoint = spawn_fill_service(loopback_state()).await;

    let records = vec![
        Record::new().with("full_name", "Jane Doe"),
        Record::new().with("full_name", "Jane Doe"),
        Record::new().with("full_name", "Ada/Lovelace"),
        Record::new(),
    ];
    let request = FillRequest::bulk(records.clone(), mapping(), &format!("{base}/template.pdf"));
    let response = reqwest::Client::new()
        .post(&endpoint)
        .json(&request)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/zip");
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"submissions.zip\""
    );

    let bytes = response.bytes().await.unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    assert_eq!(archive.len(), records.len());

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut pdf = Vec::new();
        file.read_to_end(&mut pdf).unwrap();
        entries.push((file.name().to_string(), texts(&pdf)));
    }
    entries.sort();

    assert_eq!(
        entries,
        vec![
            ("Ada_Lovelace.pdf".to_string(), vec!["Ada/Lovelace".to_string()]),
            ("Jane_Doe.pdf".to_string(), vec!["Jane Doe".to_string()]),
            ("Jane_Doe_2.pdf".to_string(), vec!["Jane Doe".to_string()]),
            ("submission.pdf".to_string(), Vec::<String>::new()),
        ]
    );
}

#[tokio::test]
async fn test_remote_and_local_fills_match() {
    let template = two_page_template();
    let base = spawn_asset_host(template.clone()).await;
    let endpoint = spawn_fill_service(loopback_state()).await;

    let signature = format!("{base}/signature.png");
    let record = Record::new()
        .with("full_name", "Zoë Ng")
        .with("course", 3.5)
        .with("signature_url", signature.as_str());

    let client = HttpFetcher::new(DEFAULT_TIMEOUT).unwrap().client().clone();
    let remote = RemoteFillClient::new(client, reqwest::Url::parse(&endpoint).unwrap())
        .invoke(&FillRequest::single(
            record.clone(),
            mapping(),
            &format!("{base}/template.pdf"),
        ))
        .await
        .unwrap();

    let assets = StaticAssets::new().with(&signature, sample_png());
    let bundle = AssetBundle::collect(&mapping(), &record, &assets).await;
    let local = DocumentFiller::new()
        .fill(&template, &record, &mapping(), &bundle)
        .unwrap();

    let remote_items = drawn_items(&remote).unwrap();
    let local_items = drawn_items(&local).unwrap();

    assert_eq!(remote_items.len(), 3);
    assert_eq!(remote_items.len(), local_items.len());
    for (r, l) in remote_items.iter().zip(&local_items) {
        assert!(r.approx_eq(l, 1e-3), "{r:?} != {l:?}");
    }
    assert!(remote_items
        .iter()
        .any(|item| matches!(item, DrawnItem::Text { page: 2, .. })));
    assert!(remote_items
        .iter()
        .any(|item| matches!(item, DrawnItem::Image { page: 1, .. })));
}

#[tokio::test]
async fn test_template_fetch_failure_is_internal_error() {
    let base = spawn_asset_host(two_page_template()).await;
    let endpoint = spawn_fill_service(loopback_state()).await;

    let request = FillRequest::single(
        Record::new().with("full_name", "Jane Doe"),
        mapping(),
        &format!("{base}/missing.pdf"),
    );
    let response = reqwest::Client::new()
        .post(&endpoint)
        .json(&request)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorBody = response.json().await.unwrap();
    assert!(error.error.contains("404"), "{}", error.error);
}
