use std::sync::{Arc, Mutex};

use axum::{
  body::Body,
  http::{Method, Request, StatusCode, header},
};
use outreach_core::transport::{Envelope, MailTransport};
use outreach_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use super::*;

// ─── Fixtures ─────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Rejected(String);

/// Records delivered envelopes; rejects anything addressed to `bounce.example`.
#[derive(Clone, Default)]
struct RecordingMailer {
  sent: Arc<Mutex<Vec<Envelope>>>,
}

impl MailTransport for RecordingMailer {
  type Error = Rejected;

  async fn send(&self, envelope: &Envelope) -> Result<(), Rejected> {
    if envelope.to.ends_with("@bounce.example") {
      return Err(Rejected("550 mailbox unavailable".into()));
    }
    self.sent.lock().unwrap().push(envelope.clone());
    Ok(())
  }
}

type State = AppState<SqliteStore, RecordingMailer>;

async fn make_state() -> State {
  let upload_dir = std::env::temp_dir().join(format!("outreach-api-{}", Uuid::new_v4()));
  let config = ServerConfig {
    host:               "127.0.0.1".into(),
    port:               0,
    database_path:      ":memory:".into(),
    upload_dir:         upload_dir.clone(),
    jwt_secret:         "router-test-secret".into(),
    jwt_expiry_seconds: 3600,
    max_upload_bytes:   1024 * 1024,
    smtp:               None,
  };
  AppState {
    store:   Arc::new(SqliteStore::open_in_memory().await.unwrap()),
    mailer:  Arc::new(RecordingMailer::default()),
    resumes: Arc::new(ResumeStorage::new(upload_dir).unwrap()),
    tokens:  Arc::new(TokenService::new(&config.jwt_secret, config.jwt_expiry_seconds)),
    config:  Arc::new(config),
  }
}

async fn send(state: &State, req: Request<Body>) -> (StatusCode, Value) {
  let resp = router(state.clone()).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, body)
}

async fn call(
  state: &State,
  method: Method,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut req = Request::builder().method(method).uri(uri);
  if let Some(t) = token {
    req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
  }
  let req = match body {
    Some(v) => req
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(v.to_string()))
      .unwrap(),
    None => req.body(Body::empty()).unwrap(),
  };
  send(state, req).await
}

async fn signup(state: &State, name: &str, email: &str) -> String {
  let (status, body) = call(
    state,
    Method::POST,
    "/api/auth/signup",
    None,
    Some(json!({ "full_name": name, "email": email, "password": "correct-horse" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["token"].as_str().unwrap().to_owned()
}

async fn create_contact(state: &State, token: &str, name: &str, email: &str, company: &str) -> i64 {
  let (status, body) = call(
    state,
    Method::POST,
    "/api/contacts",
    Some(token),
    Some(json!({ "name": name, "email": email, "company": company })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["contact_id"].as_i64().unwrap()
}

async fn upload(state: &State, token: &str, file_name: &str, content: &[u8]) -> (StatusCode, Value) {
  let mut body = Vec::new();
  body.extend_from_slice(
    format!(
      "--XBOUNDARY\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
       Content-Type: application/octet-stream\r\n\r\n"
    )
    .as_bytes(),
  );
  body.extend_from_slice(content);
  body.extend_from_slice(b"\r\n--XBOUNDARY--\r\n");

  let req = Request::builder()
    .method(Method::POST)
    .uri("/api/resume")
    .header(header::AUTHORIZATION, format!("Bearer {token}"))
    .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
    .body(Body::from(body))
    .unwrap();
  send(state, req).await
}

async fn stored_resume_path(state: &State, email: &str) -> Option<String> {
  state
    .store
    .find_user_by_email(email)
    .await
    .unwrap()
    .unwrap()
    .resume_path
}

// ─── Auth ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn signup_then_login() {
  let state = make_state().await;
  let (status, body) = call(
    &state,
    Method::POST,
    "/api/auth/signup",
    None,
    Some(json!({ "full_name": "Jordan Lee", "email": "jordan@example.com", "password": "secret1" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["full_name"], "Jordan Lee");
  assert_eq!(body["has_resume"], false);
  assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

  let (status, body) = call(
    &state,
    Method::POST,
    "/api/auth/login",
    None,
    Some(json!({ "email": "JORDAN@example.com", "password": "secret1" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["email"], "jordan@example.com");

  let (status, body) = call(
    &state,
    Method::POST,
    "/api/auth/login",
    None,
    Some(json!({ "email": "jordan@example.com", "password": "wrong-one" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn login_with_unknown_email_matches_wrong_password() {
  let state = make_state().await;
  signup(&state, "Jordan Lee", "jordan@example.com").await;

  let (status, body) = call(
    &state,
    Method::POST,
    "/api/auth/login",
    None,
    Some(json!({ "email": "nobody@example.com", "password": "correct-horse" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn signup_rejects_duplicates_and_bad_input() {
  let state = make_state().await;
  signup(&state, "Jordan Lee", "jordan@example.com").await;

  let (status, body) = call(
    &state,
    Method::POST,
    "/api/auth/signup",
    None,
    Some(json!({ "full_name": "Other", "email": "jordan@example.com", "password": "secret1" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Email is already registered");

  let (status, _) = call(
    &state,
    Method::POST,
    "/api/auth/signup",
    None,
    Some(json!({ "full_name": "Sam", "email": "sam@example.com", "password": "123" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
  let state = make_state().await;

  let (status, body) = call(&state, Method::GET, "/api/contacts", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(body["error"].is_string());

  let (status, _) = call(&state, Method::GET, "/api/contacts", Some("not.a.jwt"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ─── Contacts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn contact_crud_is_scoped_to_owner() {
  let state = make_state().await;
  let alice = signup(&state, "Alice Doe", "alice@example.com").await;
  let bob = signup(&state, "Bob Roe", "bob@example.com").await;

  let id = create_contact(&state, &alice, "Priya", "priya@acme.example", "Acme").await;
  let uri = format!("/api/contacts/{id}");

  let (status, body) = call(&state, Method::GET, &uri, Some(&alice), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["email_status"], "PENDING");

  let update = json!({ "name": "Priya S", "email": "priya@acme.example", "company": "Acme Corp" });
  let (status, body) = call(&state, Method::PUT, &uri, Some(&alice), Some(update.clone())).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["name"], "Priya S");
  assert_eq!(body["email_status"], "PENDING");

  for method in [Method::GET, Method::DELETE] {
    let (status, _) = call(&state, method, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
  let (status, _) = call(&state, Method::PUT, &uri, Some(&bob), Some(update)).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = call(&state, Method::GET, &format!("{uri}/logs"), Some(&bob), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (_, page) = call(&state, Method::GET, "/api/contacts", Some(&bob), None).await;
  assert_eq!(page["total_elements"], 0);

  let (status, body) = call(&state, Method::DELETE, &uri, Some(&alice), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  assert!(body.is_null());
  let (status, _) = call(&state, Method::GET, &uri, Some(&alice), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_contact_fields_are_rejected() {
  let state = make_state().await;
  let token = signup(&state, "Alice Doe", "alice@example.com").await;

  let (status, body) = call(
    &state,
    Method::POST,
    "/api/contacts",
    Some(&token),
    Some(json!({ "name": "X", "email": "not-an-email", "company": "Acme" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn list_filters_and_pages() {
  let state = make_state().await;
  let token = signup(&state, "Alice Doe", "alice@example.com").await;
  create_contact(&state, &token, "A", "a@acme.example", "ACME Labs").await;
  create_contact(&state, &token, "B", "b@globex.example", "Globex").await;
  create_contact(&state, &token, "C", "c@acme.example", "Acme").await;

  let (_, page) =
    call(&state, Method::GET, "/api/contacts?company=acme", Some(&token), None).await;
  assert_eq!(page["total_elements"], 2);
  // Newest first.
  assert_eq!(page["content"][0]["name"], "C");

  let (_, page) =
    call(&state, Method::GET, "/api/contacts?status=bogus", Some(&token), None).await;
  assert_eq!(page["total_elements"], 3);

  let (_, page) =
    call(&state, Method::GET, "/api/contacts?status=sent", Some(&token), None).await;
  assert_eq!(page["total_elements"], 0);

  let (_, page) =
    call(&state, Method::GET, "/api/contacts?page=1&size=2", Some(&token), None).await;
  assert_eq!(page["content"].as_array().unwrap().len(), 1);
  assert_eq!(page["total_pages"], 2);
  assert_eq!(page["last"], true);
}

// ─── Resume ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn resume_upload_replaces_previous_file() {
  let state = make_state().await;
  let token = signup(&state, "Alice Doe", "alice@example.com").await;

  let (_, info) = call(&state, Method::GET, "/api/resume", Some(&token), None).await;
  assert_eq!(info, json!({ "has_resume": false, "file_name": null }));

  let (status, body) = upload(&state, &token, "malware.exe", b"MZ").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Only PDF, DOC, and DOCX files are allowed");

  let (status, body) = upload(&state, &token, "cv_v1.pdf", b"%PDF-1").await;
  assert_eq!(status, StatusCode::OK, "{body}");
  let first = stored_resume_path(&state, "alice@example.com").await.unwrap();

  let (status, _) = upload(&state, &token, "cv_v2.docx", b"PK-2").await;
  assert_eq!(status, StatusCode::OK);
  let second = stored_resume_path(&state, "alice@example.com").await.unwrap();

  assert_ne!(first, second);
  assert!(!std::path::Path::new(&first).exists());
  assert!(std::path::Path::new(&second).exists());

  let (_, info) = call(&state, Method::GET, "/api/resume", Some(&token), None).await;
  assert_eq!(info, json!({ "has_resume": true, "file_name": "cv_v2.docx" }));
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn dispatch_without_resume_is_rejected_before_any_send() {
  let state = make_state().await;
  let token = signup(&state, "Alice Doe", "alice@example.com").await;
  let id = create_contact(&state, &token, "Priya", "priya@acme.example", "Acme").await;

  let (status, body) = call(
    &state,
    Method::POST,
    "/api/emails/send",
    Some(&token),
    Some(json!({ "contact_ids": [id], "subject": "Hello", "body": "Hi" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Please upload your resume before sending emails");

  assert!(state.mailer.sent.lock().unwrap().is_empty());
  let (_, logs) = call(&state, Method::GET, &format!("/api/contacts/{id}/logs"), Some(&token), None).await;
  assert_eq!(logs, json!([]));
}

#[tokio::test]
async fn dispatch_rejects_invalid_requests() {
  let state = make_state().await;
  let token = signup(&state, "Alice Doe", "alice@example.com").await;

  let (status, body) = call(
    &state,
    Method::POST,
    "/api/emails/send",
    Some(&token),
    Some(json!({ "contact_ids": [], "subject": "Hello", "body": "Hi" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "At least one HR ID is required");
}

#[tokio::test]
async fn dispatch_reports_each_contact() {
  let state = make_state().await;
  let alice = signup(&state, "Alice Doe", "alice@example.com").await;
  let bob = signup(&state, "Bob Roe", "bob@example.com").await;
  upload(&state, &alice, "Alice_Resume.pdf", b"%PDF-alice").await;

  let good = create_contact(&state, &alice, "Priya", "priya@acme.example", "Acme").await;
  let bounce = create_contact(&state, &alice, "Sam", "sam@bounce.example", "Initech").await;
  let foreign = create_contact(&state, &bob, "Lee", "lee@globex.example", "Globex").await;

  let (status, result) = call(
    &state,
    Method::POST,
    "/api/emails/send",
    Some(&alice),
    Some(json!({
      "contact_ids": [good, bounce, foreign, 9999],
      "subject": "Application",
      "body": "Please find my resume attached."
    })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{result}");
  assert_eq!(result["total_requested"], 4);
  assert_eq!(result["success_count"], 1);
  assert_eq!(result["failure_count"], 3);
  assert_eq!(
    result["errors"],
    json!([
      "Failed to send to sam@bounce.example: 550 mailbox unavailable",
      format!("HR contact ID {foreign} not found"),
      "HR contact ID 9999 not found",
    ])
  );

  {
    let sent = state.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, "alice@example.com");
    assert_eq!(sent[0].to, "priya@acme.example");
    assert_eq!(sent[0].attachment.file_name, "Alice_Resume.pdf");
    assert_eq!(sent[0].attachment.content_type, "application/pdf");
  }

  let (_, stats) = call(&state, Method::GET, "/api/contacts/stats", Some(&alice), None).await;
  assert_eq!(stats, json!({ "total": 2, "sent": 1, "pending": 0, "failed": 1 }));

  let (_, logs) =
    call(&state, Method::GET, &format!("/api/contacts/{bounce}/logs"), Some(&alice), None).await;
  assert_eq!(logs.as_array().unwrap().len(), 1);
  assert_eq!(logs[0]["status"], "FAILED");
  assert_eq!(logs[0]["error_message"], "550 mailbox unavailable");

  let (_, theirs) = call(&state, Method::GET, &format!("/api/contacts/{foreign}"), Some(&bob), None).await;
  assert_eq!(theirs["email_status"], "PENDING");
}

// ─── Extractor rejections ─────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_input_gets_json_errors() {
  let state = make_state().await;
  let token = signup(&state, "Alice Doe", "alice@example.com").await;

  let req = Request::builder()
    .method(Method::POST)
    .uri("/api/contacts")
    .header(header::AUTHORIZATION, format!("Bearer {token}"))
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{\"name\": "))
    .unwrap();
  let (status, body) = send(&state, req).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string(), "{body}");

  let (status, body) =
    call(&state, Method::GET, "/api/contacts?start_date=yesterday", Some(&token), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string(), "{body}");

  let (status, body) = call(&state, Method::GET, "/api/contacts/abc", Some(&token), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string(), "{body}");

  let (status, body) = call(
    &state,
    Method::POST,
    "/api/emails/send",
    Some(&token),
    Some(json!({ "contact_ids": "one", "subject": "Hi", "body": "Hi" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string(), "{body}");

  let req = Request::builder()
    .method(Method::POST)
    .uri("/api/resume")
    .header(header::AUTHORIZATION, format!("Bearer {token}"))
    .body(Body::empty())
    .unwrap();
  let (status, body) = send(&state, req).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string(), "{body}");
}
