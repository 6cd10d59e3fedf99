//! Settings API handlers

use crate::error::ApiError;
use crate::extractors::Actor;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use dbsettings_core::SettingsMap;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct SettingResponse {
    category: String,
    key: String,
    value: Value,
}

pub async fn list(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(category): Path<String>,
) -> Result<Json<SettingsMap>, ApiError> {
    let mut store = state.open_store(actor).await?;
    let settings = store.get_all(&category, SettingsMap::new()).await?;
    Ok(Json(settings))
}

pub async fn update_many(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(category): Path<String>,
    Json(values): Json<SettingsMap>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.open_store(actor).await?;
    store.set_many(&category, values).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_all(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(category): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.open_store(actor).await?;
    store.remove_all(&category).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((category, key)): Path<(String, String)>,
) -> Result<Json<SettingResponse>, ApiError> {
    let mut store = state.open_store(actor).await?;
    match store.get(&category, &key, None).await? {
        Some(value) => Ok(Json(SettingResponse {
            category,
            key,
            value,
        })),
        None => Err(ApiError::NotFound(format!("{}.{}", category, key))),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((category, key)): Path<(String, String)>,
    Json(value): Json<Value>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.open_store(actor).await?;
    store.set(&category, &key, value).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((category, key)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.open_store(actor).await?;
    store.remove(&category, &key).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::forms::FormRegistry;
    use crate::storage::MemoryBackend;
    use crate::{build_router, AppState};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use dbsettings_core::SettingsBackend;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    pub(crate) fn app_with(backend: Arc<MemoryBackend>, forms: FormRegistry) -> Router {
        build_router(AppState {
            backend,
            forms: Arc::new(forms),
            preload: Arc::new(vec!["mail".to_string()]),
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header("X-User-Id", "admin");
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let app = app_with(Arc::new(MemoryBackend::new()), FormRegistry::new());
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_set_get_remove_single() {
        let backend = Arc::new(MemoryBackend::new());
        let app = app_with(backend.clone(), FormRegistry::new());

        let (status, _) = send(&app, "GET", "/api/v1/settings/mail/host", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            "PUT",
            "/api/v1/settings/mail/host",
            Some(json!("smtp.example.com")),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let rows = backend.fetch(&["mail".to_string()]).await.unwrap();
        assert_eq!(rows[0].value.as_deref(), Some("\"smtp.example.com\""));
        assert_eq!(rows[0].created_by.as_deref(), Some("admin"));

        let (status, body) = send(&app, "GET", "/api/v1/settings/mail/host", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["value"], "smtp.example.com");

        let (status, _) = send(&app, "DELETE", "/api/v1/settings/mail/host", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_category_endpoints() {
        let backend = Arc::new(MemoryBackend::new());
        let app = app_with(backend.clone(), FormRegistry::new());

        let (_, body) = send(&app, "GET", "/api/v1/settings/mail", None).await;
        assert_eq!(body, json!({}));

        let (status, _) = send(
            &app,
            "PUT",
            "/api/v1/settings/mail",
            Some(json!({"host": "h", "port": 25})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(&app, "GET", "/api/v1/settings/mail", None).await;
        assert_eq!(body, json!({"host": "h", "port": 25}));

        let (status, _) = send(&app, "DELETE", "/api/v1/settings/mail", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = send(&app, "GET", "/api/v1/settings/mail", None).await;
        assert_eq!(body, json!({}));
    }
}
