// src/services/review_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AssignmentRepository, CatalogRepository, ReviewRepository},
    models::{
        assignment::Assignment,
        auth::{Role, User},
        catalog::Offer,
        review::{Review, SubmitReviewPayload, UpdateReviewPayload},
    },
};

// O resolver de avaliações: valida permissão e nota, resolve qual
// voluntário está sendo avaliado e aplica os portões de conclusão e
// duplicidade antes de gravar.
#[derive(Clone)]
pub struct ReviewService {
    pool: PgPool,
    repo: ReviewRepository,
    assignment_repo: AssignmentRepository,
    catalog_repo: CatalogRepository,
}

// Tabela de decisão da resolução do voluntário, em ordem de prioridade:
// 1. intenção explícita do chamador (precisa ser participante de fato);
// 2. campo legado de voluntário único da oferta;
// 3. inscrição única do ledger; zero falha por "sem participantes",
//    mais de uma exige explicitação para não avaliar a pessoa errada.
pub(crate) fn resolve_volunteer(
    offer: &Offer,
    assignments: &[Assignment],
    explicit: Option<Uuid>,
) -> Result<Uuid, AppError> {
    if let Some(candidate) = explicit {
        let participates = assignments.iter().any(|a| a.volunteer_id == candidate)
            || offer.legacy_volunteer_id == Some(candidate);
        if !participates {
            return Err(AppError::InvalidInput(
                "O voluntário indicado não participa desta oferta.".to_string(),
            ));
        }
        return Ok(candidate);
    }

    if let Some(legacy) = offer.legacy_volunteer_id {
        return Ok(legacy);
    }

    match assignments {
        [] => Err(AppError::InvalidInput(
            "A oferta não tem participantes para avaliar.".to_string(),
        )),
        [only] => Ok(only.volunteer_id),
        _ => Err(AppError::InvalidInput(
            "A oferta tem vários participantes; informe o voluntário explicitamente.".to_string(),
        )),
    }
}

// Portão de conclusão: basta UM dos dois sinais, o fato por inscrição
// ou a flag global legada da oferta. A flag ligada libera a avaliação
// mesmo de uma inscrição ainda não aprovada.
pub(crate) fn completion_satisfied(
    offer: &Offer,
    assignments: &[Assignment],
    volunteer_id: Uuid,
) -> bool {
    let assignment_done = assignments
        .iter()
        .any(|a| a.volunteer_id == volunteer_id && a.completed);
    assignment_done || offer.completed
}

impl ReviewService {
    pub fn new(
        pool: PgPool,
        repo: ReviewRepository,
        assignment_repo: AssignmentRepository,
        catalog_repo: CatalogRepository,
    ) -> Self {
        Self { pool, repo, assignment_repo, catalog_repo }
    }

    fn authoring_org(acting: &User) -> Result<Uuid, AppError> {
        if acting.role != Role::OrganizationAdmin {
            return Err(AppError::Forbidden(
                "Apenas organizações podem avaliar voluntários.".to_string(),
            ));
        }
        acting.organization_id.ok_or_else(|| {
            AppError::Forbidden("Sua conta não está vinculada a uma organização.".to_string())
        })
    }

    // Contrato do submit, na ordem: permissão -> nota -> posse da oferta ->
    // resolução -> conclusão -> duplicidade -> INSERT. As releituras e o
    // INSERT compartilham uma transação para a checagem não envelhecer
    // entre verificar e gravar.
    pub async fn submit_review(
        &self,
        acting: &User,
        payload: &SubmitReviewPayload,
    ) -> Result<Review, AppError> {
        let organization_id = Self::authoring_org(acting)?;

        let mut tx = self.pool.begin().await?;

        let offer = self
            .catalog_repo
            .find_offer(&mut *tx, payload.offer_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Oferta".to_string()))?;

        if offer.organization_id != organization_id {
            return Err(AppError::Forbidden(
                "Esta oferta não pertence à sua organização.".to_string(),
            ));
        }

        let assignments = self
            .assignment_repo
            .list_for_offer(&mut *tx, offer.id)
            .await?;

        let volunteer_id = resolve_volunteer(&offer, &assignments, payload.volunteer_id)?;

        if !completion_satisfied(&offer, &assignments, volunteer_id) {
            return Err(AppError::InvalidInput(
                "O voluntário ainda não concluiu o trabalho desta oferta.".to_string(),
            ));
        }

        let duplicate = self
            .repo
            .find_for_triple(&mut *tx, offer.id, organization_id, volunteer_id)
            .await?;
        if duplicate.is_some() {
            return Err(AppError::InvalidInput(
                "Esta organização já avaliou este voluntário nesta oferta.".to_string(),
            ));
        }

        let review = self
            .repo
            .insert(
                &mut *tx,
                organization_id,
                volunteer_id,
                offer.id,
                payload.rating,
                &payload.comment,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Avaliação {} criada: organização {} -> voluntário {}",
            review.id,
            organization_id,
            volunteer_id
        );

        Ok(review)
    }

    pub async fn list_reviews(&self, volunteer_id: Option<Uuid>) -> Result<Vec<Review>, AppError> {
        self.repo.list(volunteer_id).await
    }

    // Só a organização autora edita ou remove a própria avaliação
    async fn owned_review(&self, acting: &User, review_id: Uuid) -> Result<Review, AppError> {
        let organization_id = Self::authoring_org(acting)?;

        let review = self
            .repo
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Avaliação".to_string()))?;

        if review.organization_id != organization_id {
            return Err(AppError::Forbidden(
                "Esta avaliação pertence a outra organização.".to_string(),
            ));
        }

        Ok(review)
    }

    pub async fn update_review(
        &self,
        acting: &User,
        review_id: Uuid,
        payload: &UpdateReviewPayload,
    ) -> Result<Review, AppError> {
        let review = self.owned_review(acting, review_id).await?;
        self.repo.update(review.id, payload.rating, &payload.comment).await
    }

    pub async fn delete_review(&self, acting: &User, review_id: Uuid) -> Result<(), AppError> {
        let review = self.owned_review(acting, review_id).await?;
        self.repo.delete(review.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn offer(legacy: Option<Uuid>, completed: bool) -> Offer {
        Offer {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            title: "Mutirão de limpeza".into(),
            location: "Praia do Norte".into(),
            topic: None,
            duration: None,
            requirements: None,
            date: None,
            submitted_at: Utc::now(),
            legacy_volunteer_id: legacy,
            completed,
        }
    }

    fn assignment(offer: &Offer, volunteer_id: Uuid, completed: bool) -> Assignment {
        Assignment {
            id: Uuid::new_v4(),
            offer_id: offer.id,
            volunteer_id,
            confirmed: false,
            completed,
        }
    }

    #[test]
    fn explicito_vence_quando_e_participante() {
        let o = offer(None, false);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ledger = vec![assignment(&o, a, true), assignment(&o, b, false)];

        assert_eq!(resolve_volunteer(&o, &ledger, Some(a)).unwrap(), a);
    }

    #[test]
    fn explicito_fora_da_oferta_falha() {
        let o = offer(None, false);
        let ledger = vec![assignment(&o, Uuid::new_v4(), true)];

        let result = resolve_volunteer(&o, &ledger, Some(Uuid::new_v4()));
        assert!(matches!(result, Err(AppError::InvalidInput(msg)) if msg.contains("não participa")));
    }

    #[test]
    fn explicito_aceita_o_voluntario_legado() {
        let legacy = Uuid::new_v4();
        let o = offer(Some(legacy), false);

        assert_eq!(resolve_volunteer(&o, &[], Some(legacy)).unwrap(), legacy);
    }

    #[test]
    fn campo_legado_resolve_sem_explicito() {
        let legacy = Uuid::new_v4();
        let o = offer(Some(legacy), false);
        // Mesmo com inscrição de outra pessoa, o campo legado tem prioridade
        let ledger = vec![assignment(&o, Uuid::new_v4(), true)];

        assert_eq!(resolve_volunteer(&o, &ledger, None).unwrap(), legacy);
    }

    #[test]
    fn inscricao_unica_resolve_sozinha() {
        let o = offer(None, false);
        let only = Uuid::new_v4();
        let ledger = vec![assignment(&o, only, true)];

        assert_eq!(resolve_volunteer(&o, &ledger, None).unwrap(), only);
    }

    #[test]
    fn sem_participantes_falha() {
        let o = offer(None, false);
        let result = resolve_volunteer(&o, &[], None);
        assert!(matches!(result, Err(AppError::InvalidInput(msg)) if msg.contains("não tem participantes")));
    }

    #[test]
    fn varios_participantes_exigem_explicito() {
        let o = offer(None, false);
        let ledger = vec![
            assignment(&o, Uuid::new_v4(), true),
            assignment(&o, Uuid::new_v4(), false),
        ];

        let result = resolve_volunteer(&o, &ledger, None);
        assert!(matches!(result, Err(AppError::InvalidInput(msg)) if msg.contains("vários participantes")));
    }

    #[test]
    fn conclusao_por_inscricao_vale() {
        let o = offer(None, false);
        let v = Uuid::new_v4();
        let ledger = vec![assignment(&o, v, true)];

        assert!(completion_satisfied(&o, &ledger, v));
    }

    #[test]
    fn conclusao_cai_na_flag_global_quando_nao_ha_fato_especifico() {
        let legacy = Uuid::new_v4();
        let o = offer(Some(legacy), true);

        assert!(completion_satisfied(&o, &[], legacy));
    }

    #[test]
    fn sem_conclusao_nenhuma_o_portao_fecha() {
        let o = offer(None, false);
        let v = Uuid::new_v4();
        let ledger = vec![assignment(&o, v, false)];

        assert!(!completion_satisfied(&o, &ledger, v));
    }

    // Cenário completo: A concluiu, B não. Explicitar A passa pelos dois
    // portões; explicitar B tropeça na conclusão; sem explícito é ambíguo.
    #[test]
    fn cenario_dois_participantes() {
        let o = offer(None, false);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ledger = vec![assignment(&o, a, true), assignment(&o, b, false)];

        let resolved_a = resolve_volunteer(&o, &ledger, Some(a)).unwrap();
        assert!(completion_satisfied(&o, &ledger, resolved_a));

        let resolved_b = resolve_volunteer(&o, &ledger, Some(b)).unwrap();
        assert!(!completion_satisfied(&o, &ledger, resolved_b));

        assert!(resolve_volunteer(&o, &ledger, None).is_err());
    }
}
