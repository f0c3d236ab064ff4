//! A wiremock-backed stand-in for the Telegram Bot API.

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const BOT_TOKEN: &str = "123456:test-token";

pub fn method_path(method_name: &str) -> String {
    format!("/bot{BOT_TOKEN}/{method_name}")
}

/// Accepts the `getMe` token check.
pub async fn mount_get_me(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(method_path("getMe")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {
                "id": 123456,
                "is_bot": true,
                "first_name": "Alerts",
                "username": "alerts_bot",
                "can_join_groups": true,
                "can_read_all_group_messages": false,
                "supports_inline_queries": false,
                "can_connect_to_business": false,
                "has_main_web_app": false
            }
        })))
        .mount(server)
        .await;
}

/// Accepts every `sendMessage` call.
pub async fn mount_send_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(method_path("sendMessage")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {
                "message_id": 1,
                "date": 0,
                "chat": { "id": 42, "type": "private" },
                "text": "ok"
            }
        })))
        .mount(server)
        .await;
}

/// Rejects `sendMessage` for one chat, as Telegram does for a blocked bot.
/// Takes precedence over `mount_send_ok`.
pub async fn mount_send_forbidden(server: &MockServer, chat_id: i64) {
    Mock::given(method("POST"))
        .and(path(method_path("sendMessage")))
        .and(body_partial_json(json!({ "chat_id": chat_id })))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "ok": false,
            "error_code": 403,
            "description": "Forbidden: bot was blocked by the user"
        })))
        .with_priority(1)
        .mount(server)
        .await;
}

/// Bodies of every `sendMessage` request the server received.
pub async fn sent_messages(server: &MockServer) -> Vec<Value> {
    let requests: Vec<Request> = server.received_requests().await.unwrap_or_default();
    requests
        .iter()
        .filter(|r| r.url.path() == method_path("sendMessage"))
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}
