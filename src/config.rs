// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{AssignmentRepository, CatalogRepository, ReviewRepository, UserRepository},
    services::{
        assignment_service::AssignmentService, auth::AuthService,
        certificate_service::CertificateService, review_service::ReviewService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub user_repo: UserRepository,
    pub catalog_repo: CatalogRepository,
    pub auth_service: AuthService,
    pub assignment_service: AssignmentService,
    pub review_service: ReviewService,
    pub certificate_service: CertificateService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let assignment_repo = AssignmentRepository::new(db_pool.clone());
        let review_repo = ReviewRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            catalog_repo.clone(),
            jwt_secret,
            db_pool.clone(),
        );
        let assignment_service = AssignmentService::new(
            db_pool.clone(),
            assignment_repo.clone(),
            catalog_repo.clone(),
        );
        let review_service = ReviewService::new(
            db_pool.clone(),
            review_repo,
            assignment_repo.clone(),
            catalog_repo.clone(),
        );
        let certificate_service = CertificateService::new(
            db_pool.clone(),
            assignment_repo,
            catalog_repo.clone(),
        );

        Ok(Self {
            db_pool,
            user_repo,
            catalog_repo,
            auth_service,
            assignment_service,
            review_service,
            certificate_service,
        })
    }
}
