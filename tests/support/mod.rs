//! Shared helpers for integration tests: socket guard and a fake Imgur API.

#![allow(dead_code)]

pub mod socket_guard;

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Client id the fake API expects.
pub const TEST_CLIENT_ID: &str = "0123456789abcde";

/// API root served by `server`, shaped like the real `/3` prefix.
pub fn api_base(server: &MockServer) -> String {
    format!("{}/3", server.uri())
}

/// Image entry as returned by `GET /album/{id}/images`.
pub fn image_json(
    server: &MockServer,
    id: &str,
    title: Option<&str>,
    description: Option<&str>,
    mime: &str,
    ext: &str,
) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": description,
        "type": mime,
        "link": format!("{}/media/{id}.{ext}", server.uri()),
    })
}

/// Mounts album metadata and its image list under the authorised client id.
pub async fn mount_album(
    server: &MockServer,
    id: &str,
    title: Option<&str>,
    description: Option<&str>,
    images: Vec<Value>,
) {
    let album = json!({
        "data": {
            "id": id,
            "title": title,
            "description": description,
            "images_count": images.len(),
            "link": format!("https://imgur.com/a/{id}"),
        },
        "success": true,
        "status": 200,
    });
    Mock::given(method("GET"))
        .and(path(format!("/3/album/{id}")))
        .and(header("authorization", format!("Client-ID {TEST_CLIENT_ID}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(album))
        .mount(server)
        .await;

    let list = json!({ "data": images, "success": true, "status": 200 });
    Mock::given(method("GET"))
        .and(path(format!("/3/album/{id}/images")))
        .and(header("authorization", format!("Client-ID {TEST_CLIENT_ID}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(list))
        .mount(server)
        .await;
}

/// Serves `body` at `/media/{file}`.
pub async fn mount_media(server: &MockServer, file: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/media/{file}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// Album that the API reports as missing.
pub async fn mount_missing_album(server: &MockServer, id: &str) {
    let body = json!({
        "data": { "error": "Unable to find an album with the id", "method": "GET" },
        "success": false,
        "status": 404,
    });
    Mock::given(method("GET"))
        .and(path(format!("/3/album/{id}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(body))
        .mount(server)
        .await;
}
