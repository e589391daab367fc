// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::{Role, User},
        catalog::{
            CreateOfferPayload, CreateOrganizationPayload, CreateProjectPayload, Offer,
            OfferDetail, Organization, Project, UpdateOfferPayload,
        },
    },
    services::assignment_service::ensure_offer_manager,
};

// Resolve a organização dona de um recurso novo: admins usam a própria,
// coordenadores precisam dizer qual.
fn owning_organization(user: &User, requested: Option<Uuid>) -> Result<Uuid, AppError> {
    match user.role {
        Role::OrganizationAdmin => user.organization_id.ok_or_else(|| {
            AppError::Forbidden("Sua conta não está vinculada a uma organização.".to_string())
        }),
        Role::Coordinator => requested.ok_or_else(|| {
            AppError::InvalidInput("Informe a organização dona do recurso.".to_string())
        }),
        Role::Volunteer => Err(AppError::Forbidden(
            "Apenas organizações e coordenadores podem criar este recurso.".to_string(),
        )),
    }
}

// O voluntário único legado da oferta precisa ser um voluntário de verdade
fn ensure_assignable_volunteer(target: &User) -> Result<(), AppError> {
    if target.role != Role::Volunteer {
        return Err(AppError::InvalidInput(
            "O usuário atribuído à oferta não é um voluntário.".to_string(),
        ));
    }
    Ok(())
}

async fn check_legacy_volunteer(
    app_state: &AppState,
    legacy_volunteer_id: Option<Uuid>,
) -> Result<(), AppError> {
    if let Some(volunteer_id) = legacy_volunteer_id {
        let target = app_state
            .user_repo
            .find_by_id(volunteer_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        ensure_assignable_volunteer(&target)?;
    }
    Ok(())
}

// POST /api/organizations
#[utoipa::path(
    post,
    path = "/api/organizations",
    tag = "Catalog",
    request_body = CreateOrganizationPayload,
    responses(
        (status = 201, description = "Organização criada", body = Organization)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_organization(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateOrganizationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    if user.role == Role::Volunteer {
        return Err(AppError::Forbidden(
            "Apenas organizações e coordenadores podem cadastrar organizações.".to_string(),
        ));
    }

    let org = app_state
        .catalog_repo
        .create_organization(&payload.name, &payload.phone, payload.tax_id.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(org)))
}

// GET /api/organizations: só as verificadas
#[utoipa::path(
    get,
    path = "/api/organizations",
    tag = "Catalog",
    responses(
        (status = 200, description = "Organizações verificadas", body = [Organization])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_organizations(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Organization>>, AppError> {
    let orgs = app_state.catalog_repo.list_verified_organizations().await?;
    Ok(Json(orgs))
}

// POST /api/projects
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Catalog",
    request_body = CreateProjectPayload,
    responses(
        (status = 201, description = "Projeto criado", body = Project)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let organization_id = owning_organization(&user, payload.organization_id)?;

    let project = app_state
        .catalog_repo
        .create_project(organization_id, &payload.name, &payload.description)
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

// POST /api/offers
#[utoipa::path(
    post,
    path = "/api/offers",
    tag = "Catalog",
    request_body = CreateOfferPayload,
    responses(
        (status = 201, description = "Oferta criada", body = Offer),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_offer(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateOfferPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let organization_id = owning_organization(&user, payload.organization_id)?;

    // A oferta nasce sob um projeto da mesma organização
    let project = app_state
        .catalog_repo
        .find_project(payload.project_id)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Projeto".to_string()))?;

    if project.organization_id != organization_id {
        return Err(AppError::Forbidden(
            "Este projeto pertence a outra organização.".to_string(),
        ));
    }

    check_legacy_volunteer(&app_state, payload.legacy_volunteer_id).await?;

    let offer = app_state
        .catalog_repo
        .create_offer(
            organization_id,
            payload.project_id,
            &payload.title,
            &payload.location,
            payload.topic.as_deref(),
            payload.duration.as_deref(),
            payload.requirements.as_deref(),
            payload.date,
            payload.legacy_volunteer_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(offer)))
}

// PUT /api/offers/{offer_id}: a organização edita a oferta, inclusive a
// atribuição direta de um voluntário único (caminho legado)
#[utoipa::path(
    put,
    path = "/api/offers/{offer_id}",
    tag = "Catalog",
    request_body = UpdateOfferPayload,
    responses(
        (status = 200, description = "Oferta atualizada", body = Offer),
        (status = 400, description = "Usuário atribuído não é voluntário"),
        (status = 403, description = "Oferta de outra organização"),
        (status = 404, description = "Oferta não encontrada")
    ),
    params(
        ("offer_id" = Uuid, Path, description = "ID da oferta")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_offer(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(offer_id): Path<Uuid>,
    Json(payload): Json<UpdateOfferPayload>,
) -> Result<Json<Offer>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let offer = app_state
        .catalog_repo
        .find_offer(&app_state.db_pool, offer_id)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Oferta".to_string()))?;

    ensure_offer_manager(&user, &offer)?;
    check_legacy_volunteer(&app_state, payload.legacy_volunteer_id).await?;

    let updated = app_state
        .catalog_repo
        .update_offer(
            offer_id,
            &payload.title,
            &payload.location,
            payload.topic.as_deref(),
            payload.duration.as_deref(),
            payload.requirements.as_deref(),
            payload.date,
            payload.legacy_volunteer_id,
        )
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Oferta".to_string()))?;

    Ok(Json(updated))
}

// GET /api/offers/{offer_id}: detalhe com participantes
#[utoipa::path(
    get,
    path = "/api/offers/{offer_id}",
    tag = "Catalog",
    responses(
        (status = 200, description = "Detalhe da oferta", body = OfferDetail),
        (status = 404, description = "Oferta não encontrada")
    ),
    params(
        ("offer_id" = Uuid, Path, description = "ID da oferta")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_offer(
    State(app_state): State<AppState>,
    Path(offer_id): Path<Uuid>,
) -> Result<Json<OfferDetail>, AppError> {
    let offer = app_state
        .catalog_repo
        .find_offer(&app_state.db_pool, offer_id)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Oferta".to_string()))?;

    let project = app_state
        .catalog_repo
        .find_project(offer.project_id)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Projeto".to_string()))?;

    let organization = app_state
        .catalog_repo
        .find_organization(offer.organization_id)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Organização".to_string()))?;

    let participants = app_state.catalog_repo.list_participants(offer_id).await?;
    let participant_count = participants.len();

    Ok(Json(OfferDetail {
        offer,
        project_name: project.name,
        organization_name: organization.name,
        participants,
        participant_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: Role, organization_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            username: "teste".into(),
            email: "teste@exemplo.org".into(),
            password_hash: String::new(),
            role,
            organization_id,
            age: Some(25),
            phone: "123456789".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn atribuicao_direta_aceita_voluntario() {
        assert!(ensure_assignable_volunteer(&user(Role::Volunteer, None)).is_ok());
    }

    #[test]
    fn atribuicao_direta_rejeita_quem_nao_e_voluntario() {
        let result = ensure_assignable_volunteer(&user(Role::Coordinator, None));
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        let org = Uuid::new_v4();
        let result = ensure_assignable_volunteer(&user(Role::OrganizationAdmin, Some(org)));
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn admin_usa_a_propria_organizacao() {
        let org = Uuid::new_v4();
        let admin = user(Role::OrganizationAdmin, Some(org));
        assert_eq!(owning_organization(&admin, None).unwrap(), org);
    }

    #[test]
    fn coordenador_precisa_indicar_a_organizacao() {
        let coordinator = user(Role::Coordinator, None);
        assert!(matches!(
            owning_organization(&coordinator, None),
            Err(AppError::InvalidInput(_))
        ));

        let org = Uuid::new_v4();
        assert_eq!(owning_organization(&coordinator, Some(org)).unwrap(), org);
    }
}
