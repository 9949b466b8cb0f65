// tests/common/mod.rs
// In-process fake of the multi-tenant project service

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use tenant_probe::config::HarnessConfig;
use tenant_probe::suites::Suite;

/// Deliberate misbehavior to inject into the fake
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    /// Listings return every tenant's records
    pub leaky_listings: bool,
    /// Registration succeeds but omits `access_token`
    pub tokenless_registration: bool,
    /// Health endpoint stalls this long before answering
    pub slow_health: Option<Duration>,
    /// Get-by-id and update ignore the owner
    pub leaky_get: bool,
    /// Requests without a token are served as an anonymous tenant
    pub open_endpoints: bool,
}

#[derive(Debug, Clone)]
struct User {
    id: String,
    username: String,
    email: String,
    password: String,
}

#[derive(Debug, Clone)]
struct Record {
    id: String,
    owner: String,
    folder_id: Option<String>,
    body: Value,
}

#[derive(Debug, Default)]
struct Store {
    users: Vec<User>,
    tokens: HashMap<String, String>,
    folders: Vec<Record>,
    projects: Vec<Record>,
    plays: u64,
    next_id: u64,
}

impl Store {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn issue_token(&mut self, user_id: &str) -> String {
        let token = format!("tok-{}", uuid::Uuid::new_v4().simple());
        self.tokens.insert(token.clone(), user_id.to_string());
        token
    }
}

#[derive(Clone)]
struct App {
    store: Arc<Mutex<Store>>,
    faults: Faults,
}

/// Handle on a running fake
pub struct FakeService {
    pub base_url: String,
    store: Arc<Mutex<Store>>,
}

impl FakeService {
    pub async fn spawn(faults: Faults) -> Self {
        let store = Arc::new(Mutex::new(Store::default()));
        let app = App {
            store: store.clone(),
            faults,
        };

        let router = Router::new()
            .route("/api/", get(info))
            .route("/api/health", get(health))
            .route("/api/auth/register", post(register))
            .route("/api/auth/login", post(login))
            .route("/api/auth/me", get(me))
            .route("/api/folders", get(list_folders).post(create_folder))
            .route("/api/folders/{id}", put(update_folder).delete(delete_folder))
            .route("/api/projects", get(list_projects).post(create_project))
            .route(
                "/api/projects/{id}",
                get(get_project).put(update_project).delete(delete_project),
            )
            .route("/api/projects/{id}/play", post(play_project))
            .route("/api/jmon/compile", post(compile))
            .route("/api/analytics/stats", get(stats))
            .route("/api/analytics/activity", get(activity))
            .with_state(app);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            store,
        }
    }

    /// Harness configuration pointed at this fake
    pub fn config(&self, suite: Suite) -> HarnessConfig {
        HarnessConfig {
            base_url: self.base_url.clone(),
            timeout_secs: 5,
            suite,
            ..Default::default()
        }
    }

    pub fn user_count(&self) -> usize {
        self.store.lock().unwrap().users.len()
    }

    /// (folders, projects) currently stored
    pub fn resource_counts(&self) -> (usize, usize) {
        let store = self.store.lock().unwrap();
        (store.folders.len(), store.projects.len())
    }
}

/// A base URL nothing listens on
pub async fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

/// Owner id an anonymous caller gets when endpoints are left open
const ANONYMOUS: &str = "anonymous";

fn authenticate(app: &App, store: &Store, headers: &HeaderMap) -> Result<String, Response> {
    let Some(header) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        if app.faults.open_endpoints {
            return Ok(ANONYMOUS.to_string());
        }
        return Err(detail(StatusCode::UNAUTHORIZED, "Not authenticated"));
    };
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Not authenticated"))?;
    store
        .tokens
        .get(token)
        .cloned()
        .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
}

fn session(app: &App, store: &mut Store, user: &User) -> Value {
    let user_json = json!({ "id": user.id, "username": user.username, "email": user.email });
    if app.faults.tokenless_registration {
        return json!({ "user": user_json });
    }
    let token = store.issue_token(&user.id);
    json!({ "access_token": token, "token_type": "bearer", "user": user_json })
}

fn field(body: &Value, name: &str) -> Option<String> {
    body.get(name).and_then(Value::as_str).map(String::from)
}

fn visible<'a>(app: &App, records: &'a [Record], owner: &str) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| app.faults.leaky_listings || r.owner == owner)
        .collect()
}

fn render(record: &Record) -> Value {
    let mut body = record.body.clone();
    if let Value::Object(map) = &mut body {
        map.insert("id".into(), json!(record.id));
        map.insert("folder_id".into(), json!(record.folder_id));
    }
    body
}

async fn info() -> Response {
    Json(json!({ "message": "Project service API", "version": "1.0.0" })).into_response()
}

async fn health(State(app): State<App>) -> Response {
    if let Some(delay) = app.faults.slow_health {
        tokio::time::sleep(delay).await;
    }
    Json(json!({ "status": "healthy" })).into_response()
}

async fn register(State(app): State<App>, Json(body): Json<Value>) -> Response {
    let mut store = app.store.lock().unwrap();
    let (Some(username), Some(password)) = (field(&body, "username"), field(&body, "password"))
    else {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "username and password required");
    };
    if store.users.iter().any(|u| u.username == username) {
        return detail(StatusCode::BAD_REQUEST, "Username already registered");
    }

    let user = User {
        id: store.next_id("user"),
        username,
        email: field(&body, "email").unwrap_or_default(),
        password,
    };
    store.users.push(user.clone());
    Json(session(&app, &mut store, &user)).into_response()
}

async fn login(State(app): State<App>, Json(body): Json<Value>) -> Response {
    let mut store = app.store.lock().unwrap();
    let user = store
        .users
        .iter()
        .find(|u| Some(&u.username) == field(&body, "username").as_ref())
        .filter(|u| Some(&u.password) == field(&body, "password").as_ref())
        .cloned();
    match user {
        Some(user) => Json(session(&app, &mut store, &user)).into_response(),
        None => detail(StatusCode::UNAUTHORIZED, "Incorrect username or password"),
    }
}

async fn me(State(app): State<App>, headers: HeaderMap) -> Response {
    let store = app.store.lock().unwrap();
    let user_id = match authenticate(&app, &store, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match store.users.iter().find(|u| u.id == user_id) {
        Some(user) => Json(json!({ "id": user.id, "username": user.username, "email": user.email }))
            .into_response(),
        None => detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"),
    }
}

async fn list_folders(State(app): State<App>, headers: HeaderMap) -> Response {
    let store = app.store.lock().unwrap();
    let owner = match authenticate(&app, &store, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let folders: Vec<Value> = visible(&app, &store.folders, &owner).into_iter().map(render).collect();
    Json(folders).into_response()
}

async fn create_folder(State(app): State<App>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut store = app.store.lock().unwrap();
    let owner = match authenticate(&app, &store, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let record = Record {
        id: store.next_id("folder"),
        owner,
        folder_id: None,
        body,
    };
    let rendered = render(&record);
    store.folders.push(record);
    Json(rendered).into_response()
}

async fn update_folder(
    State(app): State<App>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut store = app.store.lock().unwrap();
    let owner = match authenticate(&app, &store, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let leaky = app.faults.leaky_get;
    match store.folders.iter_mut().find(|f| f.id == id && (leaky || f.owner == owner)) {
        Some(folder) => {
            folder.body = body;
            Json(render(folder)).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Folder not found"),
    }
}

async fn delete_folder(State(app): State<App>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let mut store = app.store.lock().unwrap();
    let owner = match authenticate(&app, &store, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let before = store.folders.len();
    store.folders.retain(|f| !(f.id == id && f.owner == owner));
    if store.folders.len() == before {
        return detail(StatusCode::NOT_FOUND, "Folder not found");
    }
    // Projects in a deleted folder move to the root
    for project in store.projects.iter_mut().filter(|p| p.folder_id.as_deref() == Some(id.as_str())) {
        project.folder_id = None;
    }
    Json(json!({ "message": "Folder deleted" })).into_response()
}

async fn list_projects(
    State(app): State<App>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let store = app.store.lock().unwrap();
    let owner = match authenticate(&app, &store, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let projects: Vec<Value> = visible(&app, &store.projects, &owner)
        .into_iter()
        .filter(|p| match query.get("folder_id") {
            Some(folder) if folder.is_empty() => p.folder_id.is_none(),
            Some(folder) => p.folder_id.as_deref() == Some(folder.as_str()),
            None => true,
        })
        .map(render)
        .collect();
    Json(projects).into_response()
}

async fn create_project(State(app): State<App>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut store = app.store.lock().unwrap();
    let owner = match authenticate(&app, &store, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let folder_id = field(&body, "folder_id");
    if let Some(folder) = &folder_id {
        if !store.folders.iter().any(|f| &f.id == folder && f.owner == owner) {
            return detail(StatusCode::NOT_FOUND, "Folder not found");
        }
    }
    let record = Record {
        id: store.next_id("project"),
        owner,
        folder_id,
        body,
    };
    let rendered = render(&record);
    store.projects.push(record);
    Json(rendered).into_response()
}

async fn get_project(State(app): State<App>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let store = app.store.lock().unwrap();
    let owner = match authenticate(&app, &store, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let leaky = app.faults.leaky_get;
    match store.projects.iter().find(|p| p.id == id && (leaky || p.owner == owner)) {
        Some(project) => Json(render(project)).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Project not found"),
    }
}

async fn update_project(
    State(app): State<App>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Response {
    let mut store = app.store.lock().unwrap();
    let owner = match authenticate(&app, &store, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match store.projects.iter_mut().find(|p| p.id == id && p.owner == owner) {
        Some(project) => {
            if let (Value::Object(body), Value::Object(patch)) = (&mut project.body, patch) {
                body.extend(patch);
            }
            Json(render(project)).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Project not found"),
    }
}

async fn delete_project(State(app): State<App>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let mut store = app.store.lock().unwrap();
    let owner = match authenticate(&app, &store, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let before = store.projects.len();
    store.projects.retain(|p| !(p.id == id && p.owner == owner));
    if store.projects.len() == before {
        return detail(StatusCode::NOT_FOUND, "Project not found");
    }
    Json(json!({ "message": "Project deleted" })).into_response()
}

async fn play_project(State(app): State<App>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let mut store = app.store.lock().unwrap();
    let owner = match authenticate(&app, &store, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    if !store.projects.iter().any(|p| p.id == id && p.owner == owner) {
        return detail(StatusCode::NOT_FOUND, "Project not found");
    }
    store.plays += 1;
    Json(json!({ "message": "Play tracked" })).into_response()
}

async fn compile(State(app): State<App>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let store = app.store.lock().unwrap();
    if let Err(response) = authenticate(&app, &store, &headers) {
        return response;
    }
    if field(&body, "code").is_none() {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "code required");
    }
    Json(json!({ "success": true, "jmon_object": { "tracks": [], "tempo": 120 } })).into_response()
}

async fn stats(State(app): State<App>, headers: HeaderMap) -> Response {
    let store = app.store.lock().unwrap();
    let owner = match authenticate(&app, &store, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let total_projects = store.projects.iter().filter(|p| p.owner == owner).count();
    let total_folders = store.folders.iter().filter(|f| f.owner == owner).count();
    Json(json!({
        "total_projects": total_projects,
        "total_folders": total_folders,
        "total_plays": store.plays
    }))
    .into_response()
}

async fn activity(
    State(app): State<App>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let store = app.store.lock().unwrap();
    if let Err(response) = authenticate(&app, &store, &headers) {
        return response;
    }
    let days: u32 = query.get("days").and_then(|d| d.parse().ok()).unwrap_or(30);
    Json(json!([{ "event": "project_play", "days": days }])).into_response()
}
