use crate::dtos::{
    CreateSimulationRequest, SimulationListParams, SimulationListResponse, SimulationResponse,
    UpdateProgressRequest, UpdateSimulationRequest,
};
use crate::services::SimulationFilter;
use crate::utils::ValidatedJson;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

pub async fn create_simulation(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateSimulationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.service.create(req).await?;
    Ok((StatusCode::CREATED, Json(SimulationResponse::from(record))))
}

pub async fn list_simulations(
    State(state): State<AppState>,
    Query(params): Query<SimulationListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let page_size = params
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let filter = SimulationFilter {
        learner_id: params.learner_id,
        skip: (page - 1) * page_size,
        limit: page_size as i64,
    };

    let (records, total) = state.service.list(&filter).await?;
    let total_pages = total.div_ceil(page_size);

    Ok(Json(SimulationListResponse {
        simulations: records.into_iter().map(SimulationResponse::from).collect(),
        total,
        page,
        page_size,
        total_pages,
    }))
}

pub async fn get_simulation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.service.get(&id).await?;
    Ok(Json(SimulationResponse::from(record)))
}

pub async fn update_simulation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateSimulationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.service.update(&id, req).await?;
    Ok(Json(SimulationResponse::from(record)))
}

pub async fn update_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateProgressRequest>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.service.update_progress(&id, req.into()).await?;
    Ok(Json(SimulationResponse::from(record)))
}

pub async fn delete_simulation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
