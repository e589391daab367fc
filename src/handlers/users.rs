// src/handlers/users.rs

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
    models::auth::{Role, User},
};

// GET /api/users/volunteers: listagem para organizações/coordenadores
#[utoipa::path(
    get,
    path = "/api/users/volunteers",
    tag = "Users",
    responses(
        (status = 200, description = "Todos os voluntários", body = [User]),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_volunteers(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<User>>, AppError> {
    if !user.role.manages_offers() {
        return Err(AppError::Forbidden(
            "Apenas organizações e coordenadores podem listar voluntários.".to_string(),
        ));
    }

    let volunteers = app_state.user_repo.list_volunteers().await?;
    Ok(Json(volunteers))
}

// Monta a resposta de download do certificado geral de um voluntário.
// A checagem de "tem trabalho concluído?" é daqui, da ação humana; a
// query em si devolve lista vazia sem reclamar.
async fn certificate_response(
    app_state: &AppState,
    volunteer: &User,
) -> Result<Response, AppError> {
    if volunteer.role != Role::Volunteer {
        return Err(AppError::InvalidInput(
            "Certificados só existem para voluntários.".to_string(),
        ));
    }

    let items = app_state
        .certificate_service
        .list_completed_work(volunteer.id)
        .await?;

    if items.is_empty() {
        return Err(AppError::ResourceNotFound(
            "Trabalho concluído".to_string(),
        ));
    }

    let pdf_bytes = app_state
        .certificate_service
        .render_certificate(volunteer, &items)?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"certificado_{}.pdf\"", volunteer.username),
        ),
    ];

    Ok((StatusCode::OK, headers, pdf_bytes).into_response())
}

// GET /api/users/me/certificate: certificado do próprio usuário
#[utoipa::path(
    get,
    path = "/api/users/me/certificate",
    tag = "Certificates",
    responses(
        (status = 200, description = "PDF do certificado", content_type = "application/pdf"),
        (status = 404, description = "Nenhum trabalho concluído")
    ),
    security(("api_jwt" = []))
)]
pub async fn my_certificate(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Response, AppError> {
    certificate_response(&app_state, &user).await
}

// GET /api/users/{user_id}/certificate: certificado de um voluntário,
// acessível ao próprio ou a organizações/coordenadores
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/certificate",
    tag = "Certificates",
    responses(
        (status = 200, description = "PDF do certificado", content_type = "application/pdf"),
        (status = 403, description = "Sem permissão para este certificado"),
        (status = 404, description = "Nenhum trabalho concluído")
    ),
    params(
        ("user_id" = Uuid, Path, description = "ID do voluntário")
    ),
    security(("api_jwt" = []))
)]
pub async fn volunteer_certificate(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> Result<Response, AppError> {
    if user.id != user_id && !user.role.manages_offers() {
        return Err(AppError::Forbidden(
            "Você não pode acessar o certificado de outro voluntário.".to_string(),
        ));
    }

    let target = app_state
        .user_repo
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    certificate_response(&app_state, &target).await
}
