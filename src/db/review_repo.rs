// src/db/review_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::review::Review};

const REVIEW_COLUMNS: &str =
    "id, organization_id, volunteer_id, offer_id, rating, comment, created_at";

#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

// Dois submits simultâneos podem passar juntos pela checagem de
// duplicidade; o índice único da tripla barra o segundo INSERT, e o
// erro precisa virar o mesmo 400 de "já avaliou", não um 500.
fn map_insert_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation()
            && db_err.constraint() == Some("uq_reviews_offer_org_volunteer")
        {
            return AppError::InvalidInput(
                "Esta organização já avaliou este voluntário nesta oferta.".to_string(),
            );
        }
    }
    e.into()
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // A checagem de duplicidade roda dentro da transação do submit,
    // junto com o INSERT, para não perder update entre checar e gravar.
    pub async fn find_for_triple<'e, E>(
        &self,
        executor: E,
        offer_id: Uuid,
        organization_id: Uuid,
        volunteer_id: Uuid,
    ) -> Result<Option<Review>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews \
             WHERE offer_id = $1 AND organization_id = $2 AND volunteer_id = $3"
        ))
        .bind(offer_id)
        .bind(organization_id)
        .bind(volunteer_id)
        .fetch_optional(executor)
        .await?;
        Ok(maybe)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        volunteer_id: Uuid,
        offer_id: Uuid,
        rating: i16,
        comment: &str,
    ) -> Result<Review, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let review = sqlx::query_as::<_, Review>(&format!(
            r#"
            INSERT INTO reviews (organization_id, volunteer_id, offer_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(organization_id)
        .bind(volunteer_id)
        .bind(offer_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(executor)
        .await
        .map_err(map_insert_error)?;
        Ok(review)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, AppError> {
        let maybe = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe)
    }

    // Listagem com filtro opcional por voluntário, mais recentes primeiro
    pub async fn list(&self, volunteer_id: Option<Uuid>) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews \
             WHERE ($1::uuid IS NULL OR volunteer_id = $1) \
             ORDER BY created_at DESC"
        ))
        .bind(volunteer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    pub async fn update(
        &self,
        id: Uuid,
        rating: i16,
        comment: &str,
    ) -> Result<Review, AppError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "UPDATE reviews SET rating = $1, comment = $2 WHERE id = $3 \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(rating)
        .bind(comment)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(review)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;

    #[derive(Debug, thiserror::Error)]
    #[error("duplicate key value violates unique constraint")]
    struct DuplicateTriple;

    impl DatabaseError for DuplicateTriple {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some("23505".into())
        }

        fn constraint(&self) -> Option<&str> {
            Some("uq_reviews_offer_org_volunteer")
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    // Corrida de dois submits: o índice único vira o erro de "já avaliou"
    #[test]
    fn violacao_da_tripla_vira_erro_de_duplicidade() {
        let e = sqlx::Error::Database(Box::new(DuplicateTriple));
        let mapped = map_insert_error(e);
        assert!(matches!(mapped, AppError::InvalidInput(msg) if msg.contains("já avaliou")));
    }

    #[test]
    fn outros_erros_de_banco_passam_direto() {
        let mapped = map_insert_error(sqlx::Error::RowNotFound);
        assert!(matches!(mapped, AppError::DatabaseError(_)));
    }
}
