// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::users::list_volunteers,
        handlers::users::my_certificate,
        handlers::users::volunteer_certificate,

        // --- Catalog ---
        handlers::catalog::create_organization,
        handlers::catalog::list_organizations,
        handlers::catalog::create_project,
        handlers::catalog::create_offer,
        handlers::catalog::get_offer,
        handlers::catalog::update_offer,

        // --- Assignments ---
        handlers::offers::apply,
        handlers::offers::confirm,
        handlers::offers::approve,
        handlers::offers::approve_whole,
        handlers::offers::withdraw,
        handlers::offers::offer_certificate,

        // --- Reviews ---
        handlers::reviews::submit_review,
        handlers::reviews::list_reviews,
        handlers::reviews::update_review,
        handlers::reviews::delete_review,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::UserProfile,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Catalog ---
            models::catalog::Organization,
            models::catalog::Project,
            models::catalog::Offer,
            models::catalog::Participant,
            models::catalog::OfferDetail,
            models::catalog::CreateOrganizationPayload,
            models::catalog::CreateProjectPayload,
            models::catalog::CreateOfferPayload,
            models::catalog::UpdateOfferPayload,

            // --- Assignments ---
            models::assignment::Assignment,
            models::assignment::ApplyOutcome,
            models::assignment::WithdrawOutcome,
            models::assignment::CompletedWork,
            models::assignment::VolunteerActionPayload,

            // --- Reviews ---
            models::review::Review,
            models::review::SubmitReviewPayload,
            models::review::UpdateReviewPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Catalog", description = "Organizações, Projetos e Ofertas"),
        (name = "Assignments", description = "Ciclo de vida das inscrições"),
        (name = "Reviews", description = "Avaliações de voluntários"),
        (name = "Certificates", description = "Certificados em PDF")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
