//! Shared fixtures for server tests

#![allow(dead_code)]

use axum::http::header;
use axum::routing::get;
use axum::Router;
use fill_server::{router, AppState, ServerConfig};
use lopdf::{dictionary, Document, Object, Stream};
use std::net::SocketAddr;
use std::sync::Arc;

/// A template with `page_count` blank pages of `width` x `height` points
pub fn blank_template(page_count: usize, width: i64, height: i64) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();
    for _ in 0..page_count {
        let contents_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Resources" => dictionary! {},
            "Contents" => contents_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => page_count as i64,
            "Kids" => kids,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// A two-page template: US Letter, then a smaller second page
pub fn two_page_template() -> Vec<u8> {
    let mut doc = Document::load_mem(&blank_template(2, 612, 792)).unwrap();
    let second = doc.get_pages()[&2];
    doc.get_object_mut(second)
        .unwrap()
        .as_dict_mut()
        .unwrap()
        .set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(300),
                Object::Integer(400),
            ]),
        );
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// A small opaque PNG
pub fn sample_png() -> Vec<u8> {
    use image::{ImageBuffer, Rgb};

    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(8, 4, Rgb([20, 40, 200]));
    let mut buffer = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    buffer
}

/// Serve `router` on an ephemeral loopback port
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Host `/template.pdf` and `/signature.png` on loopback; returns the base URL
pub async fn spawn_asset_host(template: Vec<u8>) -> String {
    let png = sample_png();
    let router = Router::new()
        .route(
            "/template.pdf",
            get(move || async move { ([(header::CONTENT_TYPE, "application/pdf")], template) }),
        )
        .route(
            "/signature.png",
            get(move || async move { ([(header::CONTENT_TYPE, "image/png")], png) }),
        );
    let addr = spawn(router).await;
    format!("http://{addr}")
}

/// A fill service state that accepts loopback templates
pub fn loopback_state() -> Arc<AppState> {
    let config = ServerConfig {
        allow_loopback_templates: true,
        ..ServerConfig::default()
    };
    Arc::new(AppState::new(config).unwrap())
}

/// Run the fill service in-process; returns its endpoint URL
pub async fn spawn_fill_service(state: Arc<AppState>) -> String {
    let addr = spawn(router(state)).await;
    format!("http://{addr}/pdf-export")
}
