// src/handlers/offers.rs
//
// As ações de ciclo de vida da inscrição: candidatar, confirmar, aprovar,
// aprovar a oferta inteira (caminho legado) e retirar. Mais o certificado
// recortado para uma oferta.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        assignment::{ApplyOutcome, Assignment, VolunteerActionPayload, WithdrawOutcome},
        catalog::Offer,
    },
};

// POST /api/offers/{offer_id}/apply: candidatura do voluntário
#[utoipa::path(
    post,
    path = "/api/offers/{offer_id}/apply",
    tag = "Assignments",
    responses(
        (status = 200, description = "Inscrição criada (ou já existente)", body = ApplyOutcome),
        (status = 400, description = "Oferta encerrada"),
        (status = 403, description = "Apenas voluntários podem se candidatar")
    ),
    params(
        ("offer_id" = Uuid, Path, description = "ID da oferta")
    ),
    security(("api_jwt" = []))
)]
pub async fn apply(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(offer_id): Path<Uuid>,
) -> Result<Json<ApplyOutcome>, AppError> {
    let outcome = app_state.assignment_service.apply(&user, offer_id).await?;
    Ok(Json(outcome))
}

// POST /api/offers/{offer_id}/confirm: organização aceita a candidatura
#[utoipa::path(
    post,
    path = "/api/offers/{offer_id}/confirm",
    tag = "Assignments",
    request_body = VolunteerActionPayload,
    responses(
        (status = 200, description = "Candidatura confirmada", body = Assignment),
        (status = 404, description = "Candidatura não encontrada")
    ),
    params(
        ("offer_id" = Uuid, Path, description = "ID da oferta")
    ),
    security(("api_jwt" = []))
)]
pub async fn confirm(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(offer_id): Path<Uuid>,
    Json(payload): Json<VolunteerActionPayload>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = app_state
        .assignment_service
        .confirm(&user, offer_id, payload.volunteer_id)
        .await?;
    Ok(Json(assignment))
}

// POST /api/offers/{offer_id}/approve: organização atesta o trabalho
#[utoipa::path(
    post,
    path = "/api/offers/{offer_id}/approve",
    tag = "Assignments",
    request_body = VolunteerActionPayload,
    responses(
        (status = 200, description = "Trabalho marcado como concluído", body = Assignment),
        (status = 404, description = "Candidatura não encontrada")
    ),
    params(
        ("offer_id" = Uuid, Path, description = "ID da oferta")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(offer_id): Path<Uuid>,
    Json(payload): Json<VolunteerActionPayload>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = app_state
        .assignment_service
        .approve(&user, offer_id, payload.volunteer_id)
        .await?;
    Ok(Json(assignment))
}

// POST /api/offers/{offer_id}/approve-whole: caminho legado, sem
// voluntário específico: liga a flag global de conclusão da oferta
#[utoipa::path(
    post,
    path = "/api/offers/{offer_id}/approve-whole",
    tag = "Assignments",
    responses(
        (status = 200, description = "Oferta marcada como concluída", body = Offer),
        (status = 400, description = "Oferta sem voluntário diretamente atribuído")
    ),
    params(
        ("offer_id" = Uuid, Path, description = "ID da oferta")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_whole(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(offer_id): Path<Uuid>,
) -> Result<Json<Offer>, AppError> {
    let offer = app_state.assignment_service.approve_whole(&user, offer_id).await?;
    Ok(Json(offer))
}

// POST /api/offers/{offer_id}/withdraw: retirada do próprio voluntário
#[utoipa::path(
    post,
    path = "/api/offers/{offer_id}/withdraw",
    tag = "Assignments",
    responses(
        (status = 200, description = "Inscrição removida (ou já ausente)", body = WithdrawOutcome)
    ),
    params(
        ("offer_id" = Uuid, Path, description = "ID da oferta")
    ),
    security(("api_jwt" = []))
)]
pub async fn withdraw(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(offer_id): Path<Uuid>,
) -> Result<Json<WithdrawOutcome>, AppError> {
    let outcome = app_state.assignment_service.withdraw(&user, offer_id).await?;
    Ok(Json(outcome))
}

// GET /api/offers/{offer_id}/certificate: certificado recortado para
// uma oferta, para o voluntário autenticado
#[utoipa::path(
    get,
    path = "/api/offers/{offer_id}/certificate",
    tag = "Certificates",
    responses(
        (status = 200, description = "PDF do certificado", content_type = "application/pdf"),
        (status = 403, description = "O voluntário não concluiu esta oferta")
    ),
    params(
        ("offer_id" = Uuid, Path, description = "ID da oferta")
    ),
    security(("api_jwt" = []))
)]
pub async fn offer_certificate(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(offer_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let eligible = app_state
        .certificate_service
        .is_eligible_for_offer_certificate(user.id, offer_id)
        .await?;

    if !eligible {
        return Err(AppError::Forbidden(
            "Você não concluiu esta oferta.".to_string(),
        ));
    }

    let offer = app_state
        .catalog_repo
        .find_offer(&app_state.db_pool, offer_id)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Oferta".to_string()))?;

    let pdf_bytes = app_state
        .certificate_service
        .render_offer_certificate(&user, &offer.title)?;

    // Configura os Headers para o navegador baixar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"certificado_{}.pdf\"", offer_id),
        ),
    ];

    Ok((StatusCode::OK, headers, pdf_bytes).into_response())
}
