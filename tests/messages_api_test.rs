mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

use gigwork_backend::AppState;

async fn send(app: &axum::Router, from: Uuid, to: Uuid, content: &str) -> StatusCode {
    let req = Request::builder()
        .method("POST")
        .uri("/api/messages")
        .header(header::AUTHORIZATION, common::bearer_for(from))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "receiver_id": to, "content": content }).to_string(),
        ))
        .unwrap();
    app.clone().oneshot(req).await.unwrap().status()
}

async fn get_json(app: &axum::Router, user: Uuid, uri: &str) -> JsonValue {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, common::bearer_for(user))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn chat_flow_with_read_receipts_and_notification() {
    let pool = common::setup().await;
    let state = AppState::new(pool.clone());
    let app = common::api_router(state.clone());

    let asha = common::seed_profile(&state, "asha").await;
    let ravi = common::seed_profile(&state, "ravi").await;

    assert_eq!(send(&app, asha, ravi, "Are you free Saturday?").await, StatusCode::CREATED);
    assert_eq!(send(&app, asha, ravi, "It pays 600").await, StatusCode::CREATED);

    // Self-addressed messages are invalid.
    assert_eq!(send(&app, asha, asha, "echo").await, StatusCode::BAD_REQUEST);

    // Ravi sees one conversation, unread, with the latest content on top.
    let overview = get_json(&app, ravi, "/api/messages").await;
    let conversations = overview.as_array().unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0]["partner_id"], JsonValue::String(asha.to_string()));
    assert_eq!(conversations[0]["last_content"], "It pays 600");
    assert_eq!(conversations[0]["unread"], true);

    let unread = get_json(&app, ravi, "/api/messages/unread").await;
    assert_eq!(unread["unread_count"], 2);

    // The message notification routes into the chat with the sender.
    let poll = get_json(&app, ravi, "/api/notifications/poll").await;
    let message_notif = poll["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["event_type"] == "message")
        .expect("message notification present");
    assert_eq!(
        message_notif["target_route"],
        format!("/chat/{}", asha)
    );

    // Acknowledging the notification drops it from the unread count.
    let unread_before = poll["unread"].as_i64().unwrap();
    let notif_id = message_notif["id"].as_str().unwrap().to_string();
    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/notifications/{}/read", notif_id))
        .header(header::AUTHORIZATION, common::bearer_for(ravi))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let poll_after = get_json(&app, ravi, "/api/notifications/poll").await;
    assert_eq!(poll_after["unread"].as_i64().unwrap(), unread_before - 1);

    // Opening the thread marks Asha's messages read.
    let thread = get_json(&app, ravi, &format!("/api/messages/with/{}", asha)).await;
    assert_eq!(thread.as_array().unwrap().len(), 2);

    let unread = get_json(&app, ravi, "/api/messages/unread").await;
    assert_eq!(unread["unread_count"], 0);

    // The sender's own unread count was never affected.
    let unread = get_json(&app, asha, "/api/messages/unread").await;
    assert_eq!(unread["unread_count"], 0);
}
