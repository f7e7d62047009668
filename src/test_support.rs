//! Local stand-ins for the live feed and the prediction API.

use axum::{routing::post, Json, Router};
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::Config;

pub fn soccer_scoreboard() -> Value {
    json!({
        "events": [
            {"id": "100", "status": {"type": {"state": "post"}}},
            {
                "id": "401",
                "status": {"type": {"state": "in"}, "displayClock": "67'"},
                "competitions": [{"competitors": [
                    {"team": {"name": "Alpha"}, "score": "2", "statistics": [{"shotsOnTarget": 5}]},
                    {"team": {"name": "Beta"}, "score": "1"}
                ]}]
            }
        ]
    })
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn feed_config(base_url: &str) -> Config {
    Config {
        feed_base_url: base_url.to_string(),
        feed_timeout: Duration::from_secs(5),
        ..Config::default()
    }
}

pub fn llm_config(base_url: &str) -> Config {
    Config {
        openai_api_key: Some("sk-test".to_string()),
        openai_base_url: base_url.to_string(),
        ..Config::default()
    }
}

/// Chat-completions endpoint that always answers with `reply`.
pub fn completion_router(reply: &'static str) -> Router {
    Router::new().route(
        "/chat/completions",
        post(move |Json(body): Json<Value>| async move {
            assert_eq!(body["messages"][0]["role"], "system");
            assert_eq!(body["max_tokens"], 200);
            Json(json!({"choices": [{"message": {"role": "assistant", "content": reply}}]}))
        }),
    )
}
