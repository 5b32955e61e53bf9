use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use validator::Validate;

use crate::dto::gateway_dto::{
    ExplainRequest, ExplainResponse, GatewayErrorBody, McqRequest, McqResponse,
};
use crate::services::ai_service::FALLBACK_EXPLANATION;
use crate::AppState;

#[axum::debug_handler]
pub async fn generate_mcq(
    State(state): State<AppState>,
    payload: Result<Json<McqRequest>, JsonRejection>,
) -> crate::error::Result<Response> {
    let Json(req) = payload?;
    if req.validate().is_err() {
        return Err(crate::error::Error::BadRequest("Missing disease name".to_string()));
    }

    match state.ai_service.generate_mcq(&req.disease).await {
        Ok(mcq) => Ok(Json(McqResponse { mcq }).into_response()),
        Err(e) => {
            tracing::error!(error = ?e, disease = %req.disease, "MCQ generation failed");
            let body = GatewayErrorBody {
                error: "Failed to generate MCQ".to_string(),
                details: Some(e.to_string()),
                explanation: None,
            };
            Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response())
        }
    }
}

#[axum::debug_handler]
pub async fn explain(
    State(state): State<AppState>,
    payload: Result<Json<ExplainRequest>, JsonRejection>,
) -> crate::error::Result<Response> {
    let Json(req) = payload?;
    if req.validate().is_err() {
        return Err(crate::error::Error::BadRequest("Missing required data".to_string()));
    }

    match state.ai_service.explain(&req.disease, &req.mcq).await {
        Ok(explanation) => Ok(Json(ExplainResponse { explanation }).into_response()),
        Err(e) => {
            tracing::error!(error = ?e, disease = %req.disease, "Explanation failed");
            let body = GatewayErrorBody {
                error: "Failed to generate explanation".to_string(),
                details: None,
                explanation: Some(FALLBACK_EXPLANATION.to_string()),
            };
            Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response())
        }
    }
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(GatewayErrorBody {
            error: "Method not allowed".to_string(),
            details: None,
            explanation: None,
        }),
    )
}
