// src/handlers/reviews.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::review::{Review, SubmitReviewPayload, UpdateReviewPayload},
};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListQuery {
    // Filtro opcional: só avaliações de um voluntário
    pub volunteer: Option<Uuid>,
}

// POST /api/reviews: organização avalia um voluntário por uma oferta
#[utoipa::path(
    post,
    path = "/api/reviews",
    tag = "Reviews",
    request_body = SubmitReviewPayload,
    responses(
        (status = 201, description = "Avaliação criada", body = Review),
        (status = 400, description = "Nota fora do intervalo, voluntário ambíguo, trabalho não concluído ou avaliação duplicada"),
        (status = 403, description = "Oferta de outra organização ou papel sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_review(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<SubmitReviewPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let review = app_state.review_service.submit_review(&user, &payload).await?;

    Ok((StatusCode::CREATED, Json(review)))
}

// GET /api/reviews?volunteer={id}
#[utoipa::path(
    get,
    path = "/api/reviews",
    tag = "Reviews",
    params(ReviewListQuery),
    responses(
        (status = 200, description = "Avaliações, mais recentes primeiro", body = [Review])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_reviews(
    State(app_state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = app_state.review_service.list_reviews(query.volunteer).await?;
    Ok(Json(reviews))
}

// PUT /api/reviews/{review_id}: só a organização autora
#[utoipa::path(
    put,
    path = "/api/reviews/{review_id}",
    tag = "Reviews",
    request_body = UpdateReviewPayload,
    responses(
        (status = 200, description = "Avaliação atualizada", body = Review),
        (status = 403, description = "Avaliação de outra organização"),
        (status = 404, description = "Avaliação não encontrada")
    ),
    params(
        ("review_id" = Uuid, Path, description = "ID da avaliação")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_review(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(review_id): Path<Uuid>,
    Json(payload): Json<UpdateReviewPayload>,
) -> Result<Json<Review>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let review = app_state
        .review_service
        .update_review(&user, review_id, &payload)
        .await?;
    Ok(Json(review))
}

// DELETE /api/reviews/{review_id}: só a organização autora
#[utoipa::path(
    delete,
    path = "/api/reviews/{review_id}",
    tag = "Reviews",
    responses(
        (status = 204, description = "Avaliação removida"),
        (status = 403, description = "Avaliação de outra organização"),
        (status = 404, description = "Avaliação não encontrada")
    ),
    params(
        ("review_id" = Uuid, Path, description = "ID da avaliação")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_review(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(review_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.review_service.delete_review(&user, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
