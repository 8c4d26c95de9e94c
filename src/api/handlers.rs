//! Route handlers
//!
//! Each handler takes the caller from [`CallerId`], delegates to the
//! controller, and wraps the outcome in [`ApiResponse`].

use super::response::{ApiError, ApiResponse, CallerId};
use super::AppState;
use crate::catalog::{all_methods, MethodSpec, ServiceType};
use crate::device::{Device, Platform};
use crate::error::ErrorCode;
use crate::session::{ProgressView, Session, SessionFilter, SessionId, SessionStatus, StartRequest};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub active_drivers: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceBody {
    pub platform: String,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionBody {
    pub device_id: String,
    pub service_type: String,
    pub method: String,
    #[serde(default)]
    pub options: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsQuery {
    pub service_type: Option<String>,
    pub status: Option<String>,
    pub limit: Option<usize>,
}

impl SessionsQuery {
    fn into_filter(self) -> Result<SessionFilter, ApiError> {
        Ok(SessionFilter {
            user_id: None,
            service_type: self
                .service_type
                .as_deref()
                .map(parse_service)
                .transpose()?,
            status: self
                .status
                .as_deref()
                .map(|s| {
                    s.parse::<SessionStatus>()
                        .map_err(|e| ApiError::bad_request(ErrorCode::SESSION_INVALID_REQUEST, e))
                })
                .transpose()?,
            limit: self.limit,
        })
    }
}

fn parse_service(raw: &str) -> Result<ServiceType, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::bad_request(ErrorCode::SERVICE_UNKNOWN, e))
}

pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<Health>> {
    Json(ApiResponse::success(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_drivers: state.controller.engine().registry().active_count(),
    }))
}

pub async fn list_methods() -> Json<ApiResponse<&'static [MethodSpec]>> {
    Json(ApiResponse::success(all_methods()))
}

pub async fn service_methods(Path(service): Path<String>) -> ApiResult<Vec<&'static MethodSpec>> {
    let service = parse_service(&service)?;
    Ok(Json(ApiResponse::success(service.methods().collect())))
}

pub async fn register_device(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(body): Json<RegisterDeviceBody>,
) -> Created<Device> {
    let platform: Platform = body
        .platform
        .parse()
        .map_err(|e| ApiError::bad_request(ErrorCode::SESSION_INVALID_REQUEST, e))?;
    let device = state
        .controller
        .register_device(&user_id, platform, body.model)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(device))))
}

pub async fn list_devices(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
) -> ApiResult<Vec<Device>> {
    let devices = state.controller.list_devices(&user_id).await?;
    Ok(Json(ApiResponse::success(devices)))
}

pub async fn start_session(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(body): Json<StartSessionBody>,
) -> Created<Session> {
    let request = StartRequest {
        user_id,
        device_id: body.device_id,
        service_type: parse_service(&body.service_type)?,
        method: body.method,
        options: body.options,
    };
    let session = state.controller.start(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(session))))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Query(query): Query<SessionsQuery>,
) -> ApiResult<Vec<Session>> {
    let sessions = state
        .controller
        .list_sessions(&user_id, query.into_filter()?)
        .await?;
    Ok(Json(ApiResponse::success(sessions)))
}

pub async fn get_progress(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Path(id): Path<String>,
) -> ApiResult<ProgressView> {
    let view = state
        .controller
        .get_progress(&SessionId::from_string(id), &user_id)
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

pub async fn pause_session(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Path(id): Path<String>,
) -> ApiResult<Session> {
    let session = state
        .controller
        .pause(&SessionId::from_string(id), &user_id)
        .await?;
    Ok(Json(ApiResponse::success(session)))
}

pub async fn resume_session(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Path(id): Path<String>,
) -> ApiResult<Session> {
    let session = state
        .controller
        .resume(&SessionId::from_string(id), &user_id)
        .await?;
    Ok(Json(ApiResponse::success(session)))
}

pub async fn cancel_session(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Path(id): Path<String>,
) -> ApiResult<Session> {
    let session = state
        .controller
        .cancel(&SessionId::from_string(id), &user_id)
        .await?;
    Ok(Json(ApiResponse::success(session)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_query_parsing() {
        let filter = SessionsQuery {
            service_type: Some("frp_bypass".into()),
            status: Some("paused".into()),
            limit: Some(3),
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.service_type, Some(ServiceType::FrpBypass));
        assert_eq!(filter.status, Some(SessionStatus::Paused));
        assert_eq!(filter.limit, Some(3));

        let err = SessionsQuery {
            service_type: Some("jailbreak".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, ErrorCode::SERVICE_UNKNOWN);
    }
}
