//! Shared helpers for classcast-axum integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::{SinkExt, StreamExt};
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use classcast_axum::bootstrap::{CorsConfig, ServerConfig, bootstrap, spawn_server};
use classcast_axum::routes::create_router_with_state;
use classcast_axum::state::AppState;
use classcast_core::RelaySettings;

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Loopback settings on an ephemeral port.
pub fn test_config() -> ServerConfig {
    ServerConfig::from_settings(RelaySettings {
        port: 0,
        bind_address: "127.0.0.1".to_string(),
        ..Default::default()
    })
}

/// Router plus the state behind it, for oneshot tests.
pub fn test_app() -> (Router, AppState) {
    let state: AppState = std::sync::Arc::new(bootstrap(&test_config()).unwrap());
    let app = create_router_with_state(state.clone(), &CorsConfig::AllowAll);
    (app, state)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Start a relay on 127.0.0.1 with an ephemeral port.
pub async fn spawn_relay() -> (SocketAddr, AppState) {
    let (addr, state, _handle) = spawn_server(test_config()).await.unwrap();
    (addr, state)
}

pub async fn ws_connect(addr: SocketAddr) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    ws
}

pub async fn ws_send(ws: &mut WsClient, frame: Value) {
    ws.send(Message::Text(frame.to_string().into())).await.unwrap();
}

/// Next JSON text frame, skipping control frames.
pub async fn ws_recv(ws: &mut WsClient) -> Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str::<Value>(text.as_str()).unwrap();
                }
                Some(Ok(_)) => continue,
                other => panic!("socket ended: {other:?}"),
            }
        }
    })
    .await
    .expect("timed out waiting for a frame")
}

/// Next frame of the given `type`, skipping others.
pub async fn ws_recv_type(ws: &mut WsClient, kind: &str) -> Value {
    loop {
        let frame = ws_recv(ws).await;
        if frame["type"] == kind {
            return frame;
        }
    }
}

/// Connect and join a class, returning the `joined` frame.
pub async fn ws_join(addr: SocketAddr, class_id: u64, user_id: u64, role: &str) -> (WsClient, Value) {
    let mut ws = ws_connect(addr).await;
    ws_send(
        &mut ws,
        serde_json::json!({
            "type": "join-class",
            "classId": class_id,
            "userId": user_id,
            "role": role,
        }),
    )
    .await;
    let joined = ws_recv_type(&mut ws, "joined").await;
    (ws, joined)
}
