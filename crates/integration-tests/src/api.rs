//! A mock of the Campus API.
//!
//! Tokens are plain strings. Logging in issues `T0`, and the n-th refresh issues `T{n}`.
//! Protected routes answer `401` unless the bearer token is currently accepted.
//! Registering `latecomer` answers `401`, and uploading `blank.png` as a photo answers
//! with a bare message instead of the profile.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// The password every mock user logs in with.
pub const PASSWORD: &str = "correct horse";

/// Builder for a mock API server.
pub struct MockApi {
    accepted: Vec<String>,
    refresh_delay: Duration,
    refresh_failure: Option<StatusCode>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    /// A server that accepts no token until one is issued.
    pub fn new() -> Self {
        Self {
            accepted: Vec::new(),
            refresh_delay: Duration::ZERO,
            refresh_failure: None,
        }
    }

    /// Accepts `token` on protected routes from the start.
    pub fn accepting(mut self, token: impl Into<String>) -> Self {
        self.accepted.push(token.into());
        self
    }

    /// Delays every refresh response, keeping the refresh in flight.
    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    /// Answers every refresh with `status`.
    pub fn with_failing_refresh(mut self, status: StatusCode) -> Self {
        self.refresh_failure = Some(status);
        self
    }

    /// Binds to a random local port and starts serving.
    pub async fn spawn(self) -> anyhow::Result<MockServer> {
        let state = Arc::new(ApiState {
            accepted: Mutex::new(self.accepted.into_iter().collect()),
            refresh_delay: self.refresh_delay,
            refresh_failure: self.refresh_failure,
            refresh_calls: AtomicUsize::new(0),
            refresh_bodies: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            forms: Mutex::new(Vec::new()),
            bodies: Mutex::new(Vec::new()),
            submitted: AtomicBool::new(false),
        });

        let protected = Router::new()
            .route("/courses", get(courses))
            .route("/courses/create", post(create_course))
            .route("/courses/edit", put(edit_course))
            .route("/courses/add-user", put(add_user))
            .route("/courses/code/{code}", get(course_by_code))
            .route("/courses/teachers/{code}", get(course_instructors))
            .route("/courses/students/{code}", get(course_students))
            .route("/courses/{code}/tasks", get(tasks))
            .route("/courses/{code}/tasks/create", post(create_task))
            .route(
                "/courses/{code}/tasks/{id}",
                get(task).put(edit_task).delete(no_content),
            )
            .route("/courses/{code}/tasks/{id}/submit", post(submit_task))
            .route(
                "/courses/{code}/tasks/{id}/submission",
                get(submission).delete(delete_submission),
            )
            .route("/courses/{code}/tasks/{id}/submissions", get(submissions))
            .route("/courses/{code}/tasks/{id}/review", put(review))
            .route("/users/me", get(me))
            .route("/users/search", get(search_users))
            .route("/users/upload-photo", put(upload_photo))
            .route("/users/{user_name}", get(user))
            .route("/always-unauthorized", get(unauthorized))
            .route("/status/{status}", get(status))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

        let public = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/auth/refresh-token", post(refresh));

        let app = Router::new()
            .nest("/api", protected.merge(public))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(MockServer { address, state })
    }
}

/// A request as seen by the mock API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: String,
    /// Path below `/api`.
    pub path: String,
    /// The `Authorization` header, if sent.
    pub authorization: Option<String>,
}

/// A multipart form received by the mock API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedForm {
    /// Path below `/api`.
    pub path: String,
    /// Field names and values. File parts read `<file name: N bytes>`.
    pub fields: Vec<(String, String)>,
}

/// A running mock API.
pub struct MockServer {
    address: SocketAddr,
    state: Arc<ApiState>,
}

impl MockServer {
    /// The base URL to configure the client with.
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.address)
    }

    /// How many refresh calls arrived.
    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    /// The JSON bodies of every refresh call.
    pub fn refresh_bodies(&self) -> Vec<Value> {
        self.state.refresh_bodies.lock().unwrap().clone()
    }

    /// Every request that arrived, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// The requests that arrived for `path`.
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests().into_iter().filter(|request| request.path == path).collect()
    }

    /// The `Authorization` headers sent to `path`, in arrival order.
    pub fn authorizations_to(&self, path: &str) -> Vec<Option<String>> {
        self.requests_to(path)
            .into_iter()
            .map(|request| request.authorization)
            .collect()
    }

    /// Every multipart form received, oldest first.
    pub fn forms(&self) -> Vec<RecordedForm> {
        self.state.forms.lock().unwrap().clone()
    }

    /// The JSON bodies received by `path`.
    pub fn json_bodies(&self, path: &str) -> Vec<Value> {
        self.state
            .bodies
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// Stops accepting `token`, as if it expired.
    pub fn revoke(&self, token: &str) {
        self.state.accepted.lock().unwrap().remove(token);
    }
}

struct ApiState {
    accepted: Mutex<HashSet<String>>,
    refresh_delay: Duration,
    refresh_failure: Option<StatusCode>,
    refresh_calls: AtomicUsize,
    refresh_bodies: Mutex<Vec<Value>>,
    requests: Mutex<Vec<RecordedRequest>>,
    forms: Mutex<Vec<RecordedForm>>,
    bodies: Mutex<Vec<(String, Value)>>,
    submitted: AtomicBool,
}

impl ApiState {
    fn accept(&self, token: &str) {
        self.accepted.lock().unwrap().insert(token.to_string());
    }

    fn record_form(&self, path: String, fields: Vec<(String, String)>) {
        self.forms.lock().unwrap().push(RecordedForm { path, fields });
    }

    fn record_body(&self, path: &str, body: Value) {
        self.bodies.lock().unwrap().push((path.to_string(), body));
    }
}

type AppState = State<Arc<ApiState>>;

async fn record(State(state): AppState, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let path = request.uri().path();

    state.requests.lock().unwrap().push(RecordedRequest {
        method: request.method().to_string(),
        path: path.strip_prefix("/api").unwrap_or(path).to_string(),
        authorization,
    });

    next.run(request).await
}

async fn require_token(State(state): AppState, headers: HeaderMap, request: Request, next: Next) -> Response {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let accepted = token.is_some_and(|token| state.accepted.lock().unwrap().contains(token));

    if !accepted {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" }))).into_response();
    }

    next.run(request).await
}

fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn user_json(user_name: &str) -> Value {
    json!({
        "userName": user_name,
        "userRoles": ["student"],
        "email": format!("{user_name}@campus.test"),
        "firstName": "Ann",
        "lastName": "Lee",
        "photoUrl": null
    })
}

fn course_json(code: &str) -> Value {
    json!({
        "id": 1,
        "title": "Linear Algebra",
        "description": "Vectors and matrices",
        "coverBanner": null,
        "code": code,
        "category": "Mathematics",
        "credits": 5,
        "startDate": "2025-09-01",
        "endDate": "2025-12-20",
        "courseSchedule": [{ "day": "Monday", "time": "10:00", "location": "Room 101" }],
        "instructors": [],
        "enrolledStudents": 12,
        "status": 0
    })
}

fn task_json(id: i64) -> Value {
    json!({
        "id": id,
        "title": "Homework 1",
        "description": "Exercises 1-10",
        "materialType": 1,
        "dueDate": "2025-10-01T21:00:00Z",
        "maxPoints": 10,
        "materialsFiles": [{ "name": "sheet.pdf", "filePath": "/files/tasks/17/sheet.pdf" }]
    })
}

async fn read_form(mut multipart: Multipart) -> Vec<(String, String)> {
    let mut fields = Vec::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();

        let value = match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let bytes = field.bytes().await.unwrap_or_default();
                format!("<{file_name}: {} bytes>", bytes.len())
            }
            None => field.text().await.unwrap_or_default(),
        };

        fields.push((name, value));
    }

    fields
}

async fn login(State(state): AppState, Json(body): Json<Value>) -> Response {
    let user_name = body["userName"].as_str().unwrap_or_default();

    if body["password"].as_str() != Some(PASSWORD) {
        return message(StatusCode::UNAUTHORIZED, "Invalid username or password");
    }

    state.accept("T0");

    Json(json!({ "token": "T0", "user": user_json(user_name) })).into_response()
}

async fn register(State(state): AppState, Json(body): Json<Value>) -> Response {
    let user_name = body["userName"].as_str().unwrap_or_default();

    if user_name == "taken" {
        return message(StatusCode::BAD_REQUEST, "User name is already taken");
    }

    if user_name == "latecomer" {
        return message(StatusCode::UNAUTHORIZED, "Registration is closed");
    }

    state.accept("T0");

    (
        StatusCode::CREATED,
        Json(json!({ "token": "T0", "user": user_json(user_name) })),
    )
        .into_response()
}

async fn refresh(State(state): AppState, Json(body): Json<Value>) -> Response {
    let call = state.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
    state.refresh_bodies.lock().unwrap().push(body);

    if !state.refresh_delay.is_zero() {
        tokio::time::sleep(state.refresh_delay).await;
    }

    if let Some(status) = state.refresh_failure {
        return message(status, "Refresh token expired");
    }

    let token = format!("T{call}");
    state.accept(&token);

    Json(json!({ "token": token, "user": user_json("ann") })).into_response()
}

#[derive(Deserialize)]
struct StatusQuery {
    message: Option<String>,
}

async fn status(Path(status): Path<u16>, Query(query): Query<StatusQuery>) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    match query.message {
        Some(text) => message(status, &text),
        None => status.into_response(),
    }
}

async fn unauthorized() -> Response {
    message(StatusCode::UNAUTHORIZED, "Unauthorized")
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn courses() -> Json<Value> {
    Json(json!([course_json("MATH101")]))
}

async fn create_course(State(state): AppState, multipart: Multipart) -> StatusCode {
    state.record_form("/courses/create".to_string(), read_form(multipart).await);
    StatusCode::CREATED
}

async fn edit_course(State(state): AppState, multipart: Multipart) -> StatusCode {
    state.record_form("/courses/edit".to_string(), read_form(multipart).await);
    StatusCode::NO_CONTENT
}

async fn add_user(State(state): AppState, Json(body): Json<Value>) -> Response {
    let known = body["userEmail"]
        .as_str()
        .is_some_and(|email| email.ends_with("@campus.test"));

    state.record_body("/courses/add-user", body);

    if known {
        StatusCode::NO_CONTENT.into_response()
    } else {
        message(StatusCode::NOT_FOUND, "User with this email was not found")
    }
}

async fn course_by_code(Path(code): Path<String>) -> Response {
    if code == "MATH101" {
        Json(course_json(&code)).into_response()
    } else {
        message(StatusCode::NOT_FOUND, "Course not found")
    }
}

async fn course_instructors(Path(_code): Path<String>) -> Json<Value> {
    Json(json!([{
        "userName": "prof",
        "firstName": "Grace",
        "lastName": "Hopper",
        "email": "prof@campus.test",
        "owner": true,
        "canCreateAssignments": true,
        "canModifyAssignments": true,
        "canGradeStudents": true,
        "canManageUsers": false
    }]))
}

async fn course_students(Path(_code): Path<String>) -> Json<Value> {
    Json(json!([user_json("ann"), user_json("bob")]))
}

async fn tasks(Path(_code): Path<String>) -> Json<Value> {
    Json(json!([task_json(17)]))
}

async fn create_task(State(state): AppState, Path(code): Path<String>, multipart: Multipart) -> StatusCode {
    state.record_form(format!("/courses/{code}/tasks/create"), read_form(multipart).await);
    StatusCode::CREATED
}

async fn task(Path((_code, id)): Path<(String, i64)>) -> Json<Value> {
    Json(task_json(id))
}

async fn edit_task(
    State(state): AppState,
    Path((code, id)): Path<(String, i64)>,
    multipart: Multipart,
) -> StatusCode {
    state.record_form(format!("/courses/{code}/tasks/{id}"), read_form(multipart).await);
    StatusCode::NO_CONTENT
}

async fn submit_task(
    State(state): AppState,
    Path((code, id)): Path<(String, i64)>,
    multipart: Multipart,
) -> StatusCode {
    state.record_form(format!("/courses/{code}/tasks/{id}/submit"), read_form(multipart).await);
    state.submitted.store(true, Ordering::SeqCst);

    StatusCode::CREATED
}

async fn submission(State(state): AppState) -> Response {
    if !state.submitted.load(Ordering::SeqCst) {
        return StatusCode::NO_CONTENT.into_response();
    }

    Json(json!({
        "id": 4,
        "points": null,
        "submissionFiles": [{ "name": "answers.pdf", "filePath": "/files/submissions/4/answers.pdf" }]
    }))
    .into_response()
}

async fn delete_submission(State(state): AppState) -> StatusCode {
    state.submitted.store(false, Ordering::SeqCst);
    StatusCode::NO_CONTENT
}

async fn submissions() -> Json<Value> {
    Json(json!([
        { "id": 4, "points": 9, "submissionFiles": [], "user": user_json("ann") },
        { "id": "5", "points": null, "submissionFiles": [], "user": user_json("bob") }
    ]))
}

async fn review(
    State(state): AppState,
    Path((code, id)): Path<(String, i64)>,
    Json(body): Json<Value>,
) -> StatusCode {
    state.record_body(&format!("/courses/{code}/tasks/{id}/review"), body);
    StatusCode::NO_CONTENT
}

async fn me() -> Json<Value> {
    Json(user_json("ann"))
}

#[derive(Deserialize)]
struct SearchQuery {
    query: String,
}

async fn search_users(Query(SearchQuery { query }): Query<SearchQuery>) -> Json<Value> {
    let users: Vec<Value> = ["ann", "bob", "annika"]
        .into_iter()
        .filter(|name| name.contains(query.as_str()))
        .map(user_json)
        .collect();

    Json(Value::Array(users))
}

async fn upload_photo(State(state): AppState, multipart: Multipart) -> Json<Value> {
    let fields = read_form(multipart).await;
    let blank = fields.iter().any(|(_, value)| value.starts_with("<blank.png:"));
    state.record_form("/users/upload-photo".to_string(), fields);

    if blank {
        return Json(json!({ "message": "Photo saved" }));
    }

    let mut user = user_json("ann");
    user["photoUrl"] = json!("/files/photos/ann.png");

    Json(user)
}

async fn user(Path(user_name): Path<String>) -> Response {
    if user_name == "ghost" {
        return message(StatusCode::NOT_FOUND, "User not found");
    }

    Json(user_json(&user_name)).into_response()
}
