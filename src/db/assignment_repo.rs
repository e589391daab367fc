// src/db/assignment_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::assignment::{Assignment, CompletedWork},
};

const ASSIGNMENT_COLUMNS: &str = "id, offer_id, volunteer_id, confirmed, completed";

// O ledger de inscrições: uma linha por par (oferta, voluntário).
#[derive(Clone)]
pub struct AssignmentRepository {
    pool: PgPool,
}

// Decide o resultado do INSERT condicional: linha retornada = candidatura
// nova; conflito = o par já existia e o registro atual vale como resposta.
pub(crate) fn reconcile_apply(
    inserted: Option<Assignment>,
    existing: Option<Assignment>,
) -> Result<(Assignment, bool), AppError> {
    if let Some(assignment) = inserted {
        return Ok((assignment, true));
    }
    existing
        .map(|assignment| (assignment, false))
        .ok_or_else(|| AppError::ResourceNotFound("Inscrição".to_string()))
}

impl AssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Cria a inscrição se não existir, num único INSERT condicional.
    // ON CONFLICT na constraint de unicidade serializa candidaturas
    // concorrentes do mesmo par sem read-then-write.
    // Retorna (inscrição, criada_agora?).
    pub async fn apply(
        &self,
        offer_id: Uuid,
        volunteer_id: Uuid,
    ) -> Result<(Assignment, bool), AppError> {
        let inserted = sqlx::query_as::<_, Assignment>(&format!(
            r#"
            INSERT INTO assignments (offer_id, volunteer_id)
            VALUES ($1, $2)
            ON CONFLICT ON CONSTRAINT uq_assignments_offer_volunteer DO NOTHING
            RETURNING {ASSIGNMENT_COLUMNS}
            "#
        ))
        .bind(offer_id)
        .bind(volunteer_id)
        .fetch_optional(&self.pool)
        .await?;

        let existing = match &inserted {
            Some(_) => None,
            None => self.find(&self.pool, offer_id, volunteer_id).await?,
        };

        reconcile_apply(inserted, existing)
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        offer_id: Uuid,
        volunteer_id: Uuid,
    ) -> Result<Option<Assignment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe = sqlx::query_as::<_, Assignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments \
             WHERE offer_id = $1 AND volunteer_id = $2"
        ))
        .bind(offer_id)
        .bind(volunteer_id)
        .fetch_optional(executor)
        .await?;
        Ok(maybe)
    }

    pub async fn list_for_offer<'e, E>(
        &self,
        executor: E,
        offer_id: Uuid,
    ) -> Result<Vec<Assignment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignments = sqlx::query_as::<_, Assignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE offer_id = $1"
        ))
        .bind(offer_id)
        .fetch_all(executor)
        .await?;
        Ok(assignments)
    }

    // UPDATE idempotente de uma flag do par. Retorna None se o par não
    // existe (o chamador decide se isso é NotFound).
    pub async fn set_confirmed(
        &self,
        offer_id: Uuid,
        volunteer_id: Uuid,
    ) -> Result<Option<Assignment>, AppError> {
        self.set_flag(offer_id, volunteer_id, "confirmed").await
    }

    pub async fn set_completed(
        &self,
        offer_id: Uuid,
        volunteer_id: Uuid,
    ) -> Result<Option<Assignment>, AppError> {
        self.set_flag(offer_id, volunteer_id, "completed").await
    }

    async fn set_flag(
        &self,
        offer_id: Uuid,
        volunteer_id: Uuid,
        column: &str,
    ) -> Result<Option<Assignment>, AppError> {
        // `column` vem só dos dois chamadores acima, nunca de entrada externa
        let updated = sqlx::query_as::<_, Assignment>(&format!(
            "UPDATE assignments SET {column} = TRUE \
             WHERE offer_id = $1 AND volunteer_id = $2 \
             RETURNING {ASSIGNMENT_COLUMNS}"
        ))
        .bind(offer_id)
        .bind(volunteer_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    // Remove a inscrição do par, se existir. Idempotente por natureza.
    pub async fn delete<'e, E>(
        &self,
        executor: E,
        offer_id: Uuid,
        volunteer_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "DELETE FROM assignments WHERE offer_id = $1 AND volunteer_id = $2",
        )
        .bind(offer_id)
        .bind(volunteer_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_for_offer<'e, E>(
        &self,
        executor: E,
        offer_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM assignments WHERE offer_id = $1")
                .bind(offer_id)
                .fetch_one(executor)
                .await?;
        Ok(count.0)
    }

    // Trabalhos concluídos de um voluntário, na ordem de publicação da
    // oferta (a ordem de inserção das inscrições não é cronológica).
    pub async fn list_completed_work(
        &self,
        volunteer_id: Uuid,
    ) -> Result<Vec<CompletedWork>, AppError> {
        let items = sqlx::query_as::<_, CompletedWork>(
            r#"
            SELECT o.title AS offer_title, p.name AS project_name
            FROM assignments a
            JOIN offers o ON o.id = a.offer_id
            JOIN projects p ON p.id = o.project_id
            WHERE a.volunteer_id = $1 AND a.completed = TRUE
            ORDER BY o.submitted_at
            "#,
        )
        .bind(volunteer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(confirmed: bool, completed: bool) -> Assignment {
        Assignment {
            id: Uuid::new_v4(),
            offer_id: Uuid::new_v4(),
            volunteer_id: Uuid::new_v4(),
            confirmed,
            completed,
        }
    }

    #[test]
    fn insert_que_retornou_linha_e_candidatura_nova() {
        let fresh = assignment(false, false);
        let (result, created) = reconcile_apply(Some(fresh.clone()), None).unwrap();
        assert!(created);
        assert_eq!(result.id, fresh.id);
    }

    // Re-candidatura: o conflito devolve o registro existente, com as
    // flags que ele já tinha, sem virar erro
    #[test]
    fn conflito_devolve_o_registro_existente() {
        let existing = assignment(true, true);
        let (result, created) = reconcile_apply(None, Some(existing.clone())).unwrap();
        assert!(!created);
        assert_eq!(result.id, existing.id);
        assert!(result.confirmed);
        assert!(result.completed);
    }

    // Conflito sem registro: o par sumiu entre o INSERT e a releitura
    #[test]
    fn conflito_sem_registro_e_not_found() {
        let result = reconcile_apply(None, None);
        assert!(matches!(result, Err(AppError::ResourceNotFound(_))));
    }
}
