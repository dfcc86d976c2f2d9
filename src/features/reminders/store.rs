//! # Reminder Store
//!
//! Remote CRUD over reminders (`/api/reminders`), plus an in-memory store
//! used for dry runs and tests.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Check the HTTP status before decoding, so non-JSON error pages keep their status
//! - 1.1.0: Skip malformed records instead of failing the whole list
//! - 1.0.0: Initial release with list/create/delete over HTTP

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use super::model::{NewReminder, Reminder};

/// Longest slice of a non-JSON error body kept in the error message
const MAX_ERROR_SNIPPET: usize = 200;

#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// All reminders belonging to `user_id`, in server order
    async fn list(&self, user_id: i64) -> Result<Vec<Reminder>>;

    async fn create(&self, reminder: &NewReminder) -> Result<Reminder>;

    async fn delete(&self, id: i64) -> Result<()>;
}

/// Reminder store backed by the medication HTTP API
pub struct HttpReminderStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReminderStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(HttpReminderStore {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }
}

#[async_trait]
impl ReminderStore for HttpReminderStore {
    async fn list(&self, user_id: i64) -> Result<Vec<Reminder>> {
        let url = format!("{}?user_id={}", self.endpoint("reminders"), user_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("GET {url} body could not be read"))?;

        if !status.is_success() {
            return Err(server_error(status, &text));
        }

        let body: Value = serde_json::from_str(&text)
            .with_context(|| format!("GET {url} returned a non-JSON body"))?;
        parse_reminder_list(body)
    }

    async fn create(&self, reminder: &NewReminder) -> Result<Reminder> {
        let url = self.endpoint("reminders");
        let response = self
            .client
            .post(&url)
            .json(reminder)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("POST {url} body could not be read"))?;

        if !status.is_success() {
            return Err(server_error(status, &text));
        }

        let body: Value = serde_json::from_str(&text)
            .with_context(|| format!("POST {url} returned a non-JSON body"))?;
        if let Some(msg) = error_message(&body) {
            return Err(anyhow!("Server error ({}): {}", status, msg));
        }

        serde_json::from_value(body).context("Server returned an unreadable reminder")
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let url = self.endpoint(&format!("reminders/{id}"));
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .with_context(|| format!("DELETE {url} failed"))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        Err(server_error(status, &text))
    }
}

/// Decode a `GET /api/reminders` body, dropping records that do not parse
pub fn parse_reminder_list(body: Value) -> Result<Vec<Reminder>> {
    let items = match body {
        Value::Array(items) => items,
        other => {
            return Err(match error_message(&other) {
                Some(msg) => anyhow!("Server error: {}", msg),
                None => anyhow!("Expected a list of reminders"),
            })
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Reminder>(item) {
            Ok(reminder) => Some(reminder),
            Err(e) => {
                debug!("Skipping malformed reminder: {e}");
                None
            }
        })
        .collect())
}

/// The `error` field of a `{error}` response body, if any
pub fn error_message(body: &Value) -> Option<&str> {
    body.get("error").and_then(Value::as_str)
}

/// Error for a non-2xx reply. The body is read best-effort: a JSON `{error}`
/// wins, then a short plain-text body, then the bare status line.
fn server_error(status: reqwest::StatusCode, body: &str) -> anyhow::Error {
    let json = serde_json::from_str::<Value>(body).unwrap_or(Value::Null);
    if let Some(msg) = error_message(&json) {
        return anyhow!("Server error ({}): {}", status, msg);
    }

    let text = body.trim();
    if text.is_empty() || json != Value::Null {
        anyhow!("Server error: {}", status)
    } else {
        let snippet: String = text.chars().take(MAX_ERROR_SNIPPET).collect();
        anyhow!("Server error ({}): {}", status, snippet)
    }
}

/// In-process reminder store keyed by reminder id
#[derive(Default)]
pub struct InMemoryReminderStore {
    reminders: DashMap<i64, (i64, Reminder)>,
    next_id: AtomicI64,
    offline: AtomicBool,
}

impl InMemoryReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a reminder with a caller-chosen id for `user_id`
    pub fn insert(&self, user_id: i64, reminder: Reminder) {
        self.next_id.fetch_max(reminder.id, Ordering::SeqCst);
        self.reminders.insert(reminder.id, (user_id, reminder));
    }

    /// Simulate a network outage: every call fails while set
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(anyhow!("Reminder store unreachable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ReminderStore for InMemoryReminderStore {
    async fn list(&self, user_id: i64) -> Result<Vec<Reminder>> {
        self.check_online()?;
        let mut reminders: Vec<Reminder> = self
            .reminders
            .iter()
            .filter(|entry| entry.value().0 == user_id)
            .map(|entry| entry.value().1.clone())
            .collect();
        reminders.sort_by_key(|r| r.id);
        Ok(reminders)
    }

    async fn create(&self, reminder: &NewReminder) -> Result<Reminder> {
        self.check_online()?;
        reminder.validate()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = Reminder {
            id,
            medication_name: reminder.medication_name.clone(),
            date: reminder.date.clone().filter(|d| !d.is_empty()),
            time: Some(reminder.time.clone()),
            frequency: reminder.frequency,
            notes: reminder.notes.clone(),
        };
        self.reminders.insert(id, (reminder.user_id, created.clone()));
        Ok(created)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.check_online()?;
        self.reminders
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| anyhow!("Reminder #{} not found", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reminders::model::Frequency;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve a single canned HTTP reply on a local port. Resolves the request
    /// line (`GET /api/... HTTP/1.1`) once the client has sent it.
    async fn serve_once(
        status: &str,
        body: &str,
    ) -> (HttpReminderStore, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let reply = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let (request_tx, request_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            // Read headers, then whatever body Content-Length announces
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            let header_end = loop {
                let n = socket.read(&mut buf).await.unwrap();
                assert!(n > 0, "client closed before sending headers");
                request.extend_from_slice(&buf[..n]);
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8_lossy(&request[..header_end]).to_string();
            let content_length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while request.len() < header_end + content_length {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let request_line = head.lines().next().unwrap_or_default().to_string();
            let _ = request_tx.send(request_line);
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        let base_url = format!("http://{addr}");
        let store = HttpReminderStore::new(&base_url, Duration::from_secs(5)).unwrap();
        (store, request_rx)
    }

    fn new_reminder(user_id: i64, name: &str, time: &str) -> NewReminder {
        NewReminder {
            user_id,
            medication_name: name.to_string(),
            date: None,
            time: time.to_string(),
            frequency: Frequency::Daily,
            notes: String::new(),
        }
    }

    #[test]
    fn test_parse_list_skips_malformed() {
        let reminders = parse_reminder_list(json!([
            {"id": 1, "medicationName": "Metformin", "time": "08:00"},
            {"medicationName": "no id"},
            "not an object",
            {"id": 2, "medicationName": "Aspirin", "date": "2024-05-01", "time": "21:00"}
        ]))
        .unwrap();

        let ids: Vec<i64> = reminders.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_parse_list_surfaces_error_body() {
        let err = parse_reminder_list(json!({"error": "user not found"})).unwrap_err();
        assert!(err.to_string().contains("user not found"));

        assert!(parse_reminder_list(json!({"reminders": []})).is_err());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let store =
            HttpReminderStore::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            store.endpoint("reminders/4"),
            "http://localhost:5000/api/reminders/4"
        );
    }

    #[tokio::test]
    async fn test_in_memory_crud() {
        let store = InMemoryReminderStore::new();

        let a = store.create(&new_reminder(1, "Metformin", "08:00")).await.unwrap();
        let b = store.create(&new_reminder(1, "Aspirin", "21:00")).await.unwrap();
        store.create(&new_reminder(2, "Insulin", "07:30")).await.unwrap();

        assert_eq!((a.id, b.id), (1, 2));

        let listed = store.list(1).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].medication_name, "Metformin");

        store.delete(a.id).await.unwrap();
        let listed = store.list(1).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, b.id);

        assert!(store.delete(a.id).await.is_err());
    }

    #[tokio::test]
    async fn test_in_memory_rejects_invalid_create() {
        let store = InMemoryReminderStore::new();
        assert!(store.create(&new_reminder(1, "", "08:00")).await.is_err());
        assert!(store.create(&new_reminder(1, "Aspirin", "8am")).await.is_err());
        assert!(store.list(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_store_fails_every_call() {
        let store = InMemoryReminderStore::new();
        store.set_offline(true);

        assert!(store.list(1).await.is_err());
        assert!(store.create(&new_reminder(1, "Aspirin", "08:00")).await.is_err());

        store.set_offline(false);
        assert!(store.list(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_http_list_success() {
        let (store, request) = serve_once(
            "200 OK",
            r#"[{"id": 3, "medicationName": "Metformin", "time": "08:00"}, {"bogus": true}]"#,
        )
        .await;

        let reminders = store.list(42).await.unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].medication_name, "Metformin");
        assert_eq!(
            request.await.unwrap(),
            "GET /api/reminders?user_id=42 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_http_list_plain_text_error_keeps_status() {
        let (store, _request) = serve_once("503 Service Unavailable", "down").await;

        let err = store.list(1).await.unwrap_err().to_string();
        assert!(err.contains("503"), "{err}");
        assert!(err.contains("down"), "{err}");
    }

    #[tokio::test]
    async fn test_http_list_json_error_on_failure_status() {
        let (store, _request) =
            serve_once("500 Internal Server Error", r#"{"error": "database offline"}"#).await;

        let err = store.list(1).await.unwrap_err().to_string();
        assert_eq!(err, "Server error (500 Internal Server Error): database offline");
    }

    #[tokio::test]
    async fn test_http_create_html_error_keeps_status() {
        let (store, request) = serve_once("500 Internal Server Error", "<html>boom</html>").await;

        let err = store
            .create(&new_reminder(1, "Aspirin", "21:00"))
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("500"), "{err}");
        assert_eq!(request.await.unwrap(), "POST /api/reminders HTTP/1.1");
    }

    #[tokio::test]
    async fn test_http_create_error_body_with_ok_status() {
        let (store, _request) = serve_once("200 OK", r#"{"error": "duplicate"}"#).await;

        let err = store
            .create(&new_reminder(1, "Aspirin", "21:00"))
            .await
            .unwrap_err()
            .to_string();
        assert_eq!(err, "Server error (200 OK): duplicate");
    }

    #[tokio::test]
    async fn test_http_create_returns_server_record() {
        let (store, _request) = serve_once(
            "201 Created",
            r#"{"id": 9, "medicationName": "Aspirin", "time": "21:00", "frequency": "daily"}"#,
        )
        .await;

        let created = store
            .create(&new_reminder(1, "Aspirin", "21:00"))
            .await
            .unwrap();
        assert_eq!(created.id, 9);
        assert_eq!(created.time.as_deref(), Some("21:00"));
    }

    #[tokio::test]
    async fn test_http_delete_not_found() {
        let (store, request) = serve_once("404 Not Found", "").await;

        let err = store.delete(12).await.unwrap_err().to_string();
        assert_eq!(err, "Server error: 404 Not Found");
        assert_eq!(request.await.unwrap(), "DELETE /api/reminders/12 HTTP/1.1");
    }
}
