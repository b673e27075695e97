//! Chat-platform push.
//!
//! Speaks the official-account customer-message API: exchange the app
//! credentials for an access token, then post a text message to the
//! recipient's platform id. Both calls answer `{"errcode": 0}` on success;
//! anything else is a delivery failure.

use std::time::Duration;

use reqwest::Client;
use roster_core::notify::NotificationChannel;
use serde::Deserialize;
use serde_json::json;

use crate::{DEFAULT_SEND_TIMEOUT_SECS, Error, Result};

/// Application credentials for the chat platform.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
  #[serde(default = "default_api_base")]
  pub api_base:     String,
  pub app_id:       String,
  pub app_secret:   String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_api_base() -> String { "https://api.weixin.qq.com".to_string() }

fn default_timeout_secs() -> u64 { DEFAULT_SEND_TIMEOUT_SECS }

#[derive(Debug, Deserialize)]
struct TokenResponse {
  access_token: Option<String>,
  #[serde(default)]
  errcode:      i64,
  #[serde(default)]
  errmsg:       String,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
  #[serde(default)]
  errcode: i64,
  #[serde(default)]
  errmsg:  String,
}

/// Pushes each reminder as a text message to a chat-platform user.
///
/// A fresh access token is fetched per message.
pub struct ChatChannel {
  client: Client,
  config: ChatConfig,
}

impl ChatChannel {
  pub fn new(config: ChatConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
  }

  async fn access_token(&self) -> Result<String> {
    let resp: TokenResponse = self
      .client
      .get(self.url("/cgi-bin/token"))
      .query(&[
        ("grant_type", "client_credential"),
        ("appid", self.config.app_id.as_str()),
        ("secret", self.config.app_secret.as_str()),
      ])
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    match resp.access_token {
      Some(token) if resp.errcode == 0 => Ok(token),
      _ => Err(Error::ChatApi {
        code:    resp.errcode,
        message: resp.errmsg,
      }),
    }
  }
}

impl NotificationChannel for ChatChannel {
  type Error = Error;

  fn name(&self) -> &'static str { "chat" }

  async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
    let token = self.access_token().await?;
    let payload = json!({
      "touser":  recipient,
      "msgtype": "text",
      "text":    { "content": format!("{subject}\n{body}") },
    });

    let status: ApiStatus = self
      .client
      .post(self.url("/cgi-bin/message/custom/send"))
      .query(&[("access_token", token.as_str())])
      .json(&payload)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    if status.errcode != 0 {
      return Err(Error::ChatApi {
        code:    status.errcode,
        message: status.errmsg,
      });
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
  };

  use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
  };
  use serde_json::Value;
  use tokio::net::TcpListener;

  use super::*;

  #[derive(Clone, Default)]
  struct Stub {
    send_errcode:  i64,
    token_errcode: i64,
    received:      Arc<Mutex<Vec<(String, Value)>>>,
  }

  async fn token(
    State(stub): State<Stub>,
    Query(q): Query<HashMap<String, String>>,
  ) -> Json<Value> {
    if stub.token_errcode != 0 {
      return Json(json!({ "errcode": stub.token_errcode, "errmsg": "invalid appsecret" }));
    }
    assert_eq!(q.get("appid").map(String::as_str), Some("app"));
    assert_eq!(q.get("secret").map(String::as_str), Some("shh"));
    Json(json!({ "access_token": "tok-1", "expires_in": 7200 }))
  }

  async fn custom_send(
    State(stub): State<Stub>,
    Query(q): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
  ) -> Json<Value> {
    let token = q.get("access_token").cloned().unwrap_or_default();
    stub.received.lock().unwrap().push((token, body));
    Json(json!({ "errcode": stub.send_errcode, "errmsg": "stub" }))
  }

  async fn serve(stub: Stub) -> String {
    let app = Router::new()
      .route("/cgi-bin/token", get(token))
      .route("/cgi-bin/message/custom/send", post(custom_send))
      .with_state(stub);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}/")
  }

  fn channel(api_base: String) -> ChatChannel {
    ChatChannel::new(ChatConfig {
      api_base,
      app_id:       "app".into(),
      app_secret:   "shh".into(),
      timeout_secs: 5,
    })
    .unwrap()
  }

  #[tokio::test]
  async fn fetches_token_then_posts_text_message() {
    let stub = Stub::default();
    let base = serve(stub.clone()).await;

    channel(base)
      .send("oAlice", "Renewal reminder: Alice", "Due on 2024-06-15.")
      .await
      .unwrap();

    let received = stub.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    let (token, body) = &received[0];
    assert_eq!(token, "tok-1");
    assert_eq!(body["touser"], "oAlice");
    assert_eq!(body["msgtype"], "text");
    assert_eq!(
      body["text"]["content"],
      "Renewal reminder: Alice\nDue on 2024-06-15."
    );
  }

  #[tokio::test]
  async fn nonzero_errcode_on_send_is_an_error() {
    let stub = Stub { send_errcode: 45015, ..Stub::default() };
    let base = serve(stub).await;

    let err = channel(base).send("oAlice", "s", "b").await.unwrap_err();
    assert!(matches!(err, Error::ChatApi { code: 45015, .. }), "{err}");
  }

  #[tokio::test]
  async fn token_failure_stops_before_sending() {
    let stub = Stub { token_errcode: 40125, ..Stub::default() };
    let base = serve(stub.clone()).await;

    let err = channel(base).send("oAlice", "s", "b").await.unwrap_err();
    assert!(matches!(err, Error::ChatApi { code: 40125, .. }), "{err}");
    assert!(stub.received.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn unreachable_platform_is_an_http_error() {
    let err = channel("http://127.0.0.1:9/".into())
      .send("oAlice", "s", "b")
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Http(_)), "{err}");
  }
}
