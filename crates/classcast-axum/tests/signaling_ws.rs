//! Live WebSocket tests against a relay bound to an ephemeral port.

mod common;

use futures_util::SinkExt;
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;

use common::{spawn_relay, ws_connect, ws_join, ws_recv, ws_recv_type, ws_send};

#[tokio::test]
async fn join_reports_room_and_ice_servers() {
    let (addr, state) = spawn_relay().await;

    let (_teacher, joined) = ws_join(addr, 1, 10, "teacher").await;
    assert_eq!(joined["classId"], 1);
    assert_eq!(joined["participants"].as_array().unwrap().len(), 1);
    assert_eq!(joined["stream"], json!({ "active": false }));
    assert!(!joined["iceServers"].as_array().unwrap().is_empty());

    let (mut student, joined) = ws_join(addr, 1, 20, "student").await;
    assert_eq!(joined["participants"].as_array().unwrap().len(), 2);

    let summary = state.registry.room_summary(classcast_core::ClassId(1)).await.unwrap();
    assert_eq!(summary.member_count, 2);

    ws_send(&mut student, json!({ "type": "ping" })).await;
    assert_eq!(ws_recv(&mut student).await, json!({ "type": "pong" }));
}

#[tokio::test]
async fn members_see_each_other_arrive_and_leave() {
    let (addr, _) = spawn_relay().await;

    let (mut teacher, _) = ws_join(addr, 2, 10, "teacher").await;
    let (student, _) = ws_join(addr, 2, 20, "student").await;

    let arrived = ws_recv_type(&mut teacher, "user-joined").await;
    assert_eq!(arrived["userId"], 20);
    assert_eq!(arrived["role"], "student");

    drop(student);

    let left = ws_recv_type(&mut teacher, "user-left").await;
    assert_eq!(left["userId"], 20);
}

#[tokio::test]
async fn signals_route_to_the_target_user() {
    let (addr, _) = spawn_relay().await;

    let (mut teacher, _) = ws_join(addr, 3, 10, "teacher").await;
    let (mut student, _) = ws_join(addr, 3, 20, "student").await;

    ws_send(
        &mut student,
        json!({ "type": "offer", "target": 10, "sdp": { "type": "offer", "sdp": "v=0" } }),
    )
    .await;
    let offer = ws_recv_type(&mut teacher, "offer").await;
    assert_eq!(offer["from"], 20);
    assert_eq!(offer["sdp"]["sdp"], "v=0");

    ws_send(
        &mut teacher,
        json!({ "type": "ice-candidate", "target": 99, "candidate": {} }),
    )
    .await;
    let error = ws_recv_type(&mut teacher, "error").await;
    assert_eq!(error["code"], "TARGET_NOT_FOUND");
}

#[tokio::test]
async fn bad_frames_get_errors_and_socket_stays_open() {
    let (addr, _) = spawn_relay().await;
    let mut ws = ws_connect(addr).await;

    ws_send(&mut ws, json!({ "type": "offer", "target": 1, "sdp": {} })).await;
    assert_eq!(ws_recv(&mut ws).await["code"], "NOT_JOINED");

    ws.send(Message::Text("{not json".into())).await.unwrap();
    assert_eq!(ws_recv(&mut ws).await["code"], "BAD_MESSAGE");

    ws_send(&mut ws, json!({ "type": "teleport" })).await;
    assert_eq!(ws_recv(&mut ws).await["code"], "BAD_MESSAGE");

    ws.send(Message::Binary(vec![1_u8, 2, 3].into())).await.unwrap();
    assert_eq!(ws_recv(&mut ws).await["code"], "BAD_MESSAGE");

    let oversized = json!({ "type": "ping", "pad": "x".repeat(70_000) });
    ws_send(&mut ws, oversized).await;
    assert_eq!(ws_recv(&mut ws).await["code"], "MESSAGE_TOO_LARGE");

    ws_send(&mut ws, json!({ "type": "ping" })).await;
    assert_eq!(ws_recv(&mut ws).await["type"], "pong");
}

#[tokio::test]
async fn only_teachers_change_slides() {
    let (addr, _) = spawn_relay().await;

    let (mut teacher, _) = ws_join(addr, 4, 10, "teacher").await;
    let (mut student, _) = ws_join(addr, 4, 20, "student").await;

    ws_send(&mut student, json!({ "type": "slide-change", "slide": { "slideId": 1 } })).await;
    assert_eq!(ws_recv_type(&mut student, "error").await["code"], "FORBIDDEN");

    ws_send(&mut teacher, json!({ "type": "slide-change", "slide": { "slideId": 2 } })).await;
    let change = ws_recv_type(&mut student, "slide-change").await;
    assert_eq!(change["from"], 10);
    assert_eq!(change["slide"]["slideId"], 2);
}

#[tokio::test]
async fn network_report_returns_profile_and_tells_room() {
    let (addr, state) = spawn_relay().await;

    let (mut teacher, _) = ws_join(addr, 5, 10, "teacher").await;
    let (mut student, _) = ws_join(addr, 5, 20, "student").await;

    ws_send(
        &mut student,
        json!({
            "type": "network-report",
            "metrics": { "latencyMs": 400, "bandwidthKbps": 100, "packetLossPercent": 5, "jitterMs": 40 }
        }),
    )
    .await;

    let reply = ws_recv_type(&mut student, "quality-profile").await;
    let profile = reply["assessment"]["profile"].clone();
    assert_eq!(reply["profile"]["name"], profile);

    let update = ws_recv_type(&mut teacher, "bandwidth-update").await;
    assert_eq!(update["userId"], 20);
    assert_eq!(update["profile"], profile);

    let tracked = state.signaling.user_quality(classcast_core::UserId(20)).await;
    assert_eq!(tracked.map(|q| q.samples), Some(1));

    ws_send(
        &mut student,
        json!({ "type": "network-report", "metrics": { "latencyMs": -5, "bandwidthKbps": 100 } }),
    )
    .await;
    assert_eq!(ws_recv_type(&mut student, "error").await["code"], "INVALID_METRICS");
}

#[tokio::test]
async fn newest_connection_replaces_older_one() {
    let (addr, state) = spawn_relay().await;

    let (mut first, _) = ws_join(addr, 6, 10, "teacher").await;
    let (_second, joined) = ws_join(addr, 6, 10, "teacher").await;
    assert_eq!(joined["participants"].as_array().unwrap().len(), 1);

    assert_eq!(ws_recv(&mut first).await["type"], "replaced");

    ws_send(&mut first, json!({ "type": "audio-control", "data": {} })).await;
    assert_eq!(ws_recv(&mut first).await["code"], "NOT_JOINED");

    let summary = state.registry.room_summary(classcast_core::ClassId(6)).await.unwrap();
    assert_eq!(summary.member_count, 1);
}

#[tokio::test]
async fn rest_stream_operations_reach_sockets() {
    let (addr, state) = spawn_relay().await;

    let (mut student, _) = ws_join(addr, 7, 20, "student").await;

    state
        .registry
        .start_stream(classcast_core::ClassId(7), classcast_core::UserId(10), classcast_core::Role::Teacher)
        .await
        .unwrap();
    let started = ws_recv_type(&mut student, "stream-started").await;
    assert_eq!(started["streamId"], "stream_7_10");

    state
        .signaling
        .ingest_backend_event("bandwidth-update", json!({ "classId": 7, "level": "poor" }))
        .await
        .unwrap();
    let notification = ws_recv_type(&mut student, "notification").await;
    assert_eq!(notification["event"], "bandwidth-update");
    assert_eq!(notification["data"]["level"], "poor");
}
