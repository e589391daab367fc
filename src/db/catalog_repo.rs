// src/db/catalog_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{Offer, Organization, Participant, Project},
};

const OFFER_COLUMNS: &str = "id, organization_id, project_id, title, location, topic, \
     duration, requirements, date, submitted_at, legacy_volunteer_id, completed";

// Repositório do catálogo descritivo: organizações, projetos e ofertas.
// A máquina de estados das inscrições mora no AssignmentRepository; aqui
// só entram os dados estáticos e a flag global legada da oferta.
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  ORGANIZATIONS
    // =========================================================================

    // Invariante derivada: verified = (tax_id presente). A regra mora aqui,
    // na escrita, para nenhum caminho conseguir gravar um estado inconsistente.
    pub async fn create_organization(
        &self,
        name: &str,
        phone: &str,
        tax_id: Option<&str>,
    ) -> Result<Organization, AppError> {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (name, phone, tax_id, verified)
            VALUES ($1, $2, $3, $3 IS NOT NULL)
            RETURNING id, name, phone, tax_id, verified, created_at
            "#,
        )
        .bind(name)
        .bind(phone)
        .bind(tax_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "organizations_tax_id_key".to_string(),
                    );
                }
            }
            e.into()
        })?;

        Ok(org)
    }

    pub async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        let maybe_org = sqlx::query_as::<_, Organization>(
            "SELECT id, name, phone, tax_id, verified, created_at FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_org)
    }

    // Só organizações verificadas aparecem na listagem pública
    pub async fn list_verified_organizations(&self) -> Result<Vec<Organization>, AppError> {
        let orgs = sqlx::query_as::<_, Organization>(
            "SELECT id, name, phone, tax_id, verified, created_at \
             FROM organizations WHERE verified = TRUE ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(orgs)
    }

    // =========================================================================
    //  PROJECTS
    // =========================================================================

    pub async fn create_project(
        &self,
        organization_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Project, AppError> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (organization_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, organization_id, name, description
            "#,
        )
        .bind(organization_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    pub async fn find_project(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let maybe_project = sqlx::query_as::<_, Project>(
            "SELECT id, organization_id, name, description FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_project)
    }

    // =========================================================================
    //  OFFERS
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn create_offer(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
        title: &str,
        location: &str,
        topic: Option<&str>,
        duration: Option<&str>,
        requirements: Option<&str>,
        date: Option<NaiveDate>,
        legacy_volunteer_id: Option<Uuid>,
    ) -> Result<Offer, AppError> {
        let offer = sqlx::query_as::<_, Offer>(&format!(
            r#"
            INSERT INTO offers (
                organization_id, project_id, title, location,
                topic, duration, requirements, date, legacy_volunteer_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {OFFER_COLUMNS}
            "#
        ))
        .bind(organization_id)
        .bind(project_id)
        .bind(title)
        .bind(location)
        .bind(topic)
        .bind(duration)
        .bind(requirements)
        .bind(date)
        .bind(legacy_volunteer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(offer)
    }

    // Substitui os campos editáveis da oferta, inclusive o voluntário
    // único legado. Retorna None se a oferta não existe.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_offer(
        &self,
        id: Uuid,
        title: &str,
        location: &str,
        topic: Option<&str>,
        duration: Option<&str>,
        requirements: Option<&str>,
        date: Option<NaiveDate>,
        legacy_volunteer_id: Option<Uuid>,
    ) -> Result<Option<Offer>, AppError> {
        let offer = sqlx::query_as::<_, Offer>(&format!(
            r#"
            UPDATE offers
            SET title = $1, location = $2, topic = $3, duration = $4,
                requirements = $5, date = $6, legacy_volunteer_id = $7
            WHERE id = $8
            RETURNING {OFFER_COLUMNS}
            "#
        ))
        .bind(title)
        .bind(location)
        .bind(topic)
        .bind(duration)
        .bind(requirements)
        .bind(date)
        .bind(legacy_volunteer_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(offer)
    }

    // Versão genérica sobre o executor: o resolver de avaliações relê a
    // oferta dentro da MESMA transação que insere a avaliação.
    pub async fn find_offer<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Offer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe_offer = sqlx::query_as::<_, Offer>(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(maybe_offer)
    }

    pub async fn list_participants(&self, offer_id: Uuid) -> Result<Vec<Participant>, AppError> {
        let participants = sqlx::query_as::<_, Participant>(
            r#"
            SELECT a.volunteer_id, u.username, a.confirmed, a.completed
            FROM assignments a
            JOIN users u ON u.id = a.volunteer_id
            WHERE a.offer_id = $1
            ORDER BY u.username
            "#,
        )
        .bind(offer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(participants)
    }

    // Liga/desliga a flag global legada da oferta
    pub async fn set_offer_completed<'e, E>(
        &self,
        executor: E,
        offer_id: Uuid,
        completed: bool,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE offers SET completed = $1 WHERE id = $2")
            .bind(completed)
            .bind(offer_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
