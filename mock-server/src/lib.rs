use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Token every request must present as `Authorization: Bearer <TOKEN>`.
pub const TOKEN: &str = "test-token";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub sport: String,
    #[serde(skip)]
    pub secret: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "publicId")]
    pub public_id: Uuid,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Goal {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub sport: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Photo {
    pub profile_id: i64,
    pub part_name: String,
    pub content_type: Option<String>,
    pub size: usize,
}

/// A request as the server saw it.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: String,
    pub uri: String,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub struct Store {
    pub events: HashMap<i64, Event>,
    pub profiles: HashMap<i64, Profile>,
    pub followers: HashMap<i64, Vec<i64>>,
    pub goals: HashMap<i64, Vec<Goal>>,
    pub photos: Vec<Photo>,
    pub password_resets: u32,
    pub unavailable_hits: u32,
    pub requests: Vec<Recorded>,
    next_goal_id: i64,
}

#[derive(Clone, Default)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
    /// Added before every response.
    pub latency: Duration,
}

impl AppState {
    /// State with a small fixed data set.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        store.events.insert(
            42,
            Event {
                id: 42,
                name: "Tempo Tuesday".to_string(),
                sport: "CYCLING".to_string(),
                secret: None,
            },
        );
        store.events.insert(
            7,
            Event {
                id: 7,
                name: "Invite Only".to_string(),
                sport: "RUNNING".to_string(),
                secret: Some("s3cret".to_string()),
            },
        );
        store.profiles.insert(
            1,
            Profile {
                id: 1,
                first_name: "Ada".to_string(),
                public_id: Uuid::nil(),
            },
        );
        store.followers.insert(1, (100..105).collect());
        Self {
            store: Arc::new(RwLock::new(store)),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

pub fn app() -> Router {
    app_with_state(AppState::seeded())
}

pub fn app_with_state(state: AppState) -> Router {
    let api = Router::new()
        .route("/events/{id}", get(get_event).delete(delete_event))
        .route("/clubs/club/{id}/roster", get(club_roster))
        .route("/profiles/{profile_id}", get(get_profile))
        .route("/profiles/{profile_id}/followers", get(followers))
        .route("/profiles/{profile_id}/goals", get(list_goals).post(create_goal))
        .route("/profiles/{profile_id}/photo", post(upload_photo))
        .route("/users/password-reset/", post(reset_password))
        .route("/support_portal/jwt", post(support_jwt))
        .route("/notifications", get(notifications))
        .route("/server", get(unavailable))
        .route("/game_info", get(empty_ok))
        .route_layer(middleware::from_fn(require_bearer));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, AppState::seeded()).await
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn record(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let recorded = Recorded {
        method: request.method().to_string(),
        uri: request.uri().to_string(),
        headers: request
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect(),
    };
    tracing::info!(method = %recorded.method, uri = %recorded.uri, "request");
    state.store.write().await.requests.push(recorded);
    if !state.latency.is_zero() {
        tokio::time::sleep(state.latency).await;
    }
    next.run(request).await
}

async fn require_bearer(request: Request, next: Next) -> Response {
    let expected = format!("Bearer {TOKEN}");
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "missing or invalid token").into_response();
    }
    next.run(request).await
}

#[derive(Deserialize)]
struct EventQuery {
    #[serde(rename = "eventSecret")]
    event_secret: Option<String>,
    #[serde(default)]
    skip_cache: bool,
}

async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<EventQuery>,
) -> Result<Json<Event>, StatusCode> {
    let store = state.store.read().await;
    let event = store.events.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    if event.secret.is_some() && event.secret != query.event_secret {
        return Err(StatusCode::FORBIDDEN);
    }
    tracing::debug!(id, skip_cache = query.skip_cache, "event lookup");
    Ok(Json(event.clone()))
}

async fn delete_event(State(state): State<AppState>, Path(id): Path<i64>) -> StatusCode {
    match state.store.write().await.events.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

/// Echoes the query back so callers can see order and repetition.
async fn club_roster(
    Path(id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<serde_json::Value> {
    let status: Vec<&str> = pairs
        .iter()
        .filter(|(k, _)| k == "status")
        .map(|(_, v)| v.as_str())
        .collect();
    let field = |name: &str| pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone());
    Json(serde_json::json!({
        "clubId": id,
        "status": status,
        "limit": field("limit"),
        "start": field("start"),
    }))
}

async fn get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<i64>,
) -> Result<Json<Profile>, StatusCode> {
    let store = state.store.read().await;
    store.profiles.get(&profile_id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

#[derive(Deserialize)]
struct PageQuery {
    start: usize,
    limit: usize,
}

async fn followers(
    State(state): State<AppState>,
    Path(profile_id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> Json<Vec<serde_json::Value>> {
    let store = state.store.read().await;
    let all = store.followers.get(&profile_id).map(Vec::as_slice).unwrap_or_default();
    Json(
        all.iter()
            .skip(page.start)
            .take(page.limit)
            .map(|id| {
                serde_json::json!({ "followerProfileId": id, "followeeProfileId": profile_id })
            })
            .collect(),
    )
}

async fn list_goals(State(state): State<AppState>, Path(profile_id): Path<i64>) -> Json<Vec<Goal>> {
    let store = state.store.read().await;
    Json(store.goals.get(&profile_id).cloned().unwrap_or_default())
}

async fn create_goal(
    State(state): State<AppState>,
    Path(profile_id): Path<i64>,
    Json(mut goal): Json<Goal>,
) -> Json<Goal> {
    let mut store = state.store.write().await;
    store.next_goal_id += 1;
    goal.id = store.next_goal_id;
    store.goals.entry(profile_id).or_default().push(goal.clone());
    Json(goal)
}

async fn upload_photo(
    State(state): State<AppState>,
    Path(profile_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<StatusCode, (StatusCode, String)> {
    let bad_request =
        |e: axum::extract::multipart::MultipartError| (StatusCode::BAD_REQUEST, e.to_string());
    let mut received = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let part_name = field.name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(bad_request)?;
        received.push(Photo {
            profile_id,
            part_name,
            content_type,
            size: data.len(),
        });
    }
    if received.len() != 1 || received[0].part_name != "profileImage" {
        return Err((StatusCode::BAD_REQUEST, "expected a single profileImage part".to_string()));
    }
    state.store.write().await.photos.extend(received);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct PasswordReset {
    #[serde(rename = "password-new")]
    new: String,
    #[serde(rename = "password-confirm")]
    confirm: String,
}

async fn reset_password(
    State(state): State<AppState>,
    Form(reset): Form<PasswordReset>,
) -> StatusCode {
    if reset.new.is_empty() || reset.new != reset.confirm {
        return StatusCode::BAD_REQUEST;
    }
    state.store.write().await.password_resets += 1;
    StatusCode::OK
}

async fn support_jwt() -> Response {
    Response::builder()
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("eyJhbGciOiJIUzI1NiJ9.e30.c2lnbmF0dXJl"))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

async fn notifications() -> Json<serde_json::Value> {
    Json(serde_json::json!([
        { "id": 1, "type": "RIDE_ON", "read": false },
        { "id": 2, "type": "FOLLOW", "read": true },
    ]))
}

async fn unavailable(State(state): State<AppState>) -> (StatusCode, &'static str) {
    state.store.write().await.unavailable_hits += 1;
    (StatusCode::SERVICE_UNAVAILABLE, "maintenance")
}

/// Success with no body at all, where callers expect an object.
async fn empty_ok() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_secret_is_never_serialized() {
        let event = Event {
            id: 1,
            name: "Hidden".to_string(),
            sport: "CYCLING".to_string(),
            secret: Some("x".to_string()),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["id"], 1);
        assert!(json.get("secret").is_none());
    }

    #[test]
    fn goal_id_defaults_when_absent() {
        let goal: Goal = serde_json::from_str(r#"{"name":"100km","sport":"CYCLING"}"#).unwrap();
        assert_eq!(goal.id, 0);
    }

    #[test]
    fn seeded_state_has_fixtures() {
        let state = AppState::seeded();
        let store = state.store.try_read().unwrap();
        assert!(store.events.contains_key(&42));
        assert_eq!(store.followers[&1].len(), 5);
        assert!(store.requests.is_empty());
    }
}
