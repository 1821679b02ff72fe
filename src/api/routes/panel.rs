//! Panel Routes
//!
//! - GET /api/v1/state - Current panel state
//! - POST /api/v1/led - Set the LED, same values as the WebSocket `LED` command

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{LedRequest, LedResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::bridge::StateSnapshot;

/// GET /api/v1/state
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateSnapshot> {
    Json(state.portal.snapshot().await)
}

/// POST /api/v1/led
pub async fn set_led(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LedRequest>,
) -> ApiResult<Json<LedResponse>> {
    let brightness = state.led.apply(&request.value).await?;
    Ok(Json(LedResponse { brightness }))
}
