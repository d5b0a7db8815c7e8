//! API integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;

use circulation_server::{
    api, config::AppConfig, repository::Repository, services::Services, AppState,
};

struct TestApp {
    router: Router,
    _dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = AppConfig::default();
        config.storage.notes_file = dir
            .path()
            .join("notes.json")
            .to_string_lossy()
            .into_owned();

        let repository = Repository::new(&config.storage.notes_file);
        let services = Services::new(repository, &config.library);
        let state = AppState {
            config: Arc::new(config),
            services: Arc::new(services),
        };

        Self {
            router: api::create_router(state),
            _dir: dir,
        }
    }

    async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(format!("/api/v1{}", uri));
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response is not JSON")
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }
}

fn record(borrower: &str, books: &[&str]) -> Value {
    json!({
        "borrower": borrower,
        "books": books,
        "borrowed_date": "2026-10-01",
        "return_date": "2026-10-15"
    })
}

fn book_available(books: &Value, id: &str) -> bool {
    books
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["id"] == id)
        .map(|b| b["is_available"].as_bool().unwrap())
        .unwrap()
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = TestApp::new();

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_seeded_catalog_and_roster() {
    let app = TestApp::new();

    let (status, books) = app.get("/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books.as_array().unwrap().len(), 5);
    assert_eq!(books[0]["id"], "TB-1482");

    let (_, borrowers) = app.get("/borrowers").await;
    assert_eq!(borrowers.as_array().unwrap().len(), 3);
    assert_eq!(borrowers[0]["serial"], "STU-001");
    assert_eq!(borrowers[0]["has_active_loan"], false);
}

#[tokio::test]
async fn test_create_book() {
    let app = TestApp::new();

    let (status, book) = app
        .post(
            "/books",
            json!({"name": "Le Morte d'Arthur", "author": "Thomas Malory", "year": 1485}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["id"], "LM-0001");
    assert_eq!(book["is_available"], true);

    let (status, book) = app
        .post("/books", json!({"name": "Decameron", "author": "Boccaccio", "year": "1353"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["id"], "DE-0002");
    assert_eq!(book["year"], 1353);

    let (status, error) = app
        .post("/books", json!({"name": "Bad", "author": "X", "year": "soon"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], 2);

    let (status, _) = app
        .post("/books", json!({"name": "utopia", "author": "X", "year": 1}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = TestApp::new();
    let (status, error) = app.post("/borrowers", json!({"nom": "Dana"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "BadValue");
}

#[tokio::test]
async fn test_record_lifecycle() {
    let app = TestApp::new();

    let (status, created) = app.post("/records", record("Alice Johnson", &["The Prince"])).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["borrower"]["serial"], "STU-001");
    assert_eq!(created["status"], "borrowed");
    let id = created["id"].as_u64().unwrap();

    let (_, books) = app.get("/books").await;
    assert!(!book_available(&books, "TP-1532"));

    // On loan: cannot delete the book or the borrower, cannot lend it again
    let (status, _) = app.delete("/books/TP-1532").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.delete("/borrowers/STU-001").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.post("/records", record("Bob Smith", &["TP-1532"])).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.delete(&format!("/records/{}", id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, books) = app.get("/books").await;
    assert!(book_available(&books, "TP-1532"));
    let (status, _) = app.get(&format!("/records/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_borrower_confirmation() {
    let app = TestApp::new();

    let (status, error) = app.post("/records", record("Dana White", &["UT-1516"])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], 4);
    assert_eq!(error["error"], "NoSuchBorrower");

    let (_, borrowers) = app.get("/borrowers").await;
    assert_eq!(borrowers.as_array().unwrap().len(), 3);

    let mut confirmed = record("Dana White", &["UT-1516"]);
    confirmed["create_borrower"] = json!(true);
    let (status, created) = app.post("/records", confirmed).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["borrower"]["serial"], "STU-004");
}

#[tokio::test]
async fn test_invalid_dates() {
    let app = TestApp::new();
    let mut body = record("STU-001", &["UT-1516"]);
    body["return_date"] = json!("2026-09-01");

    let (status, error) = app.post("/records", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], 2);
}

#[tokio::test]
async fn test_edit_session() {
    let app = TestApp::new();
    let (_, first) = app.post("/records", record("STU-001", &["UT-1516", "TB-1482"])).await;
    let (_, second) = app.post("/records", record("STU-002", &["TP-1532"])).await;
    let first_id = first["id"].as_u64().unwrap();
    let second_id = second["id"].as_u64().unwrap();

    let (status, session) = app.post(&format!("/records/{}/edit", first_id), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["token"]["record_id"], first_id);
    assert_eq!(session["record"]["id"], first_id);

    let (_, edit) = app.get("/records/edit").await;
    assert_eq!(edit["record_id"], first_id);

    let (status, _) = app.post(&format!("/records/{}/edit", second_id), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.delete(&format!("/records/{}", second_id)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let mut returned = record("STU-001", &["UT-1516", "TB-1482"]);
    returned["status"] = json!("returned");
    let (status, updated) = app
        .put("/records/edit", json!({"token": session["token"], "record": returned}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "returned");

    let (_, books) = app.get("/books").await;
    assert!(book_available(&books, "UT-1516"));
    assert!(book_available(&books, "TB-1482"));
    assert!(!book_available(&books, "TP-1532"));

    let (_, edit) = app.get("/records/edit").await;
    assert!(edit["record_id"].is_null());

    // A second commit with the same token is refused
    let (status, _) = app
        .put(
            "/records/edit",
            json!({"token": session["token"], "record": record("STU-001", &["UT-1516"])}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancel_edit_releases_slot() {
    let app = TestApp::new();
    let (_, created) = app.post("/records", record("STU-001", &["UT-1516"])).await;
    let id = created["id"].as_u64().unwrap();

    app.post(&format!("/records/{}/edit", id), json!({})).await;
    let (status, cancelled) = app.delete("/records/edit").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["record_id"], id);

    let (status, deleted) = app.delete("/records").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted"], 1);
}

#[tokio::test]
async fn test_sweep_search_and_stats() {
    let app = TestApp::new();
    app.post("/records", record("STU-003", &["UT-1516"])).await;
    let mut later = record("STU-001", &["TB-1482"]);
    later["return_date"] = json!("2026-12-01");
    app.post("/records", later).await;

    let (status, sweep) = app.post("/records/sweep?today=2026-10-18", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sweep["updated"], 1);

    let (_, overdue) = app.get("/records?q=OVERDUE").await;
    assert_eq!(overdue.as_array().unwrap().len(), 1);
    assert_eq!(overdue[0]["borrower"]["serial"], "STU-003");

    let (_, sorted) = app.get("/records?sort=borrower_serial&order=asc").await;
    assert_eq!(sorted[0]["borrower"]["serial"], "STU-001");

    let (_, stats) = app.get("/stats").await;
    assert_eq!(stats["total_records"], 2);
    assert_eq!(stats["total_overdue"], 1);
    assert_eq!(stats["books_on_loan"], 2);
    assert_eq!(stats["available_books"], 3);

    // Overdue borrower cannot borrow more
    let (status, _) = app.post("/records", record("Charlie Brown", &["TP-1532"])).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_notes_crud() {
    let app = TestApp::new();

    let (_, next) = app.get("/notes/next-id").await;
    assert_eq!(next["nextId"], 1);

    let (status, note) = app
        .post("/notes", json!({"title": "Inventory", "content": "Count <shelves>"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(note["id"], 1);
    assert_eq!(note["content"], "Count &lt;shelves&gt;");

    let (status, reminder) = app
        .post("/notes", json!({"content": "Order books", "reminder": "2099-01-01T09:00"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reminder["title"], "Untitled1");

    let (_, listing) = app.get("/notes").await;
    assert_eq!(listing["notes"].as_array().unwrap().len(), 1);
    assert_eq!(listing["reminders"].as_array().unwrap().len(), 1);

    let (status, updated) = app.put("/notes/1", json!({"title": "Stocktake", "id": 7})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["title"], "Stocktake");

    let (status, bulk) = app
        .put(
            "/notes",
            json!([
                {"id": 1, "done": true},
                {"id": 2, "done": true},
                {"id": 99, "done": true}
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bulk.as_array().unwrap().len(), 2);

    let (status, _) = app.delete("/notes/1").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.delete("/notes/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.put("/notes/1", json!({"title": "gone"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, next) = app.get("/notes/next-id").await;
    assert_eq!(next["nextId"], 3);
}

#[tokio::test]
async fn test_note_validation() {
    let app = TestApp::new();

    let (status, _) = app.post("/notes", json!({"title": "x", "content": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/notes", json!({"title": "x".repeat(101), "content": "body"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/notes", json!({"content": "late", "reminder": "2000-01-01T00:00"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_note_update_validation() {
    let app = TestApp::new();
    let (status, _) = app
        .post("/notes", json!({"title": "Inventory", "content": "Count shelves"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let rejected = [
        json!({"content": ""}),
        json!({"title": "y".repeat(300)}),
        json!({"reminder": "not a date"}),
        json!({"reminder": "2000-01-01T00:00"}),
    ];
    for patch in rejected {
        let (status, body) = app.put("/notes/1", patch.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", patch);
        assert_eq!(body["code"], 2);
    }

    let (status, body) = app
        .put("/notes", json!([{"id": 1, "content": "   "}]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);

    let (_, note) = app.get("/notes/1").await;
    assert_eq!(note["content"], "Count shelves");
    let (_, listing) = app.get("/notes").await;
    assert!(listing["reminders"].as_array().unwrap().is_empty());

    let (status, body) = app.put("/notes/1", json!(["not", "an", "object"])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);
}

#[tokio::test]
async fn test_malformed_path_and_query_get_error_body() {
    let app = TestApp::new();

    for uri in [
        "/records/abc",
        "/records?sort=shoe_size",
        "/records?order=sideways",
        "/records/sweep?today=yesterday",
        "/notes/abc",
    ] {
        let (status, body) = if uri.starts_with("/records/sweep") {
            app.request(Method::POST, uri, None).await
        } else {
            app.get(uri).await
        };
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["code"], 2, "{}", uri);
        assert_eq!(body["error"], "BadValue", "{}", uri);
        assert!(body["message"].as_str().is_some(), "{}", uri);
    }

    let (status, body) = app.request(Method::POST, "/records/abc/edit", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);
}
