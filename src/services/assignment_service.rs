// src/services/assignment_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AssignmentRepository, CatalogRepository},
    models::{
        assignment::{ApplyOutcome, Assignment, WithdrawOutcome},
        auth::{Role, User},
        catalog::Offer,
    },
};

// A máquina de estados do ledger, por par (oferta, voluntário):
// Ausente -> Inscrito -> Confirmado -> Concluído; a retirada apaga o
// registro a partir de qualquer estado. `confirmed` e `completed` são
// flags independentes, sem ordem imposta entre elas.
#[derive(Clone)]
pub struct AssignmentService {
    pool: PgPool,
    repo: AssignmentRepository,
    catalog_repo: CatalogRepository,
}

// Regra de permissão compartilhada pelas ações da organização:
// admins só operam ofertas da própria organização; coordenadores
// operam qualquer uma.
pub(crate) fn ensure_offer_manager(acting: &User, offer: &Offer) -> Result<(), AppError> {
    if !acting.role.manages_offers() {
        return Err(AppError::Forbidden(
            "Apenas organizações e coordenadores podem executar esta ação.".to_string(),
        ));
    }

    if acting.role == Role::OrganizationAdmin
        && acting.organization_id != Some(offer.organization_id)
    {
        return Err(AppError::Forbidden(
            "Esta oferta não pertence à sua organização.".to_string(),
        ));
    }

    Ok(())
}

// Portão do apply: só voluntário, e só em oferta ainda aberta
pub(crate) fn ensure_can_apply(caller: &User, offer: &Offer) -> Result<(), AppError> {
    if caller.role != Role::Volunteer {
        return Err(AppError::Forbidden(
            "Apenas voluntários podem se candidatar.".to_string(),
        ));
    }
    if offer.completed {
        return Err(AppError::InvalidInput("Esta oferta já foi encerrada.".to_string()));
    }
    Ok(())
}

// A flag global legada só volta para FALSE quando a retirada de fato
// removeu algo e não sobrou nenhuma inscrição na oferta
pub(crate) fn should_reset_global_flag(removed: bool, remaining: i64) -> bool {
    removed && remaining == 0
}

impl AssignmentService {
    pub fn new(
        pool: PgPool,
        repo: AssignmentRepository,
        catalog_repo: CatalogRepository,
    ) -> Self {
        Self { pool, repo, catalog_repo }
    }

    async fn load_offer(&self, offer_id: Uuid) -> Result<Offer, AppError> {
        self.catalog_repo
            .find_offer(&self.pool, offer_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Oferta".to_string()))
    }

    // Candidatura do voluntário. Re-candidatura não é erro: devolve o
    // registro existente com already_applied = true.
    pub async fn apply(&self, caller: &User, offer_id: Uuid) -> Result<ApplyOutcome, AppError> {
        let offer = self.load_offer(offer_id).await?;
        ensure_can_apply(caller, &offer)?;

        let (assignment, created) = self.repo.apply(offer_id, caller.id).await?;

        if !created {
            tracing::info!("Voluntário {} já estava inscrito na oferta {}", caller.id, offer_id);
        }

        Ok(ApplyOutcome { assignment, already_applied: !created })
    }

    // Organização aceita a candidatura. Idempotente se já confirmada.
    pub async fn confirm(
        &self,
        acting: &User,
        offer_id: Uuid,
        volunteer_id: Uuid,
    ) -> Result<Assignment, AppError> {
        let offer = self.load_offer(offer_id).await?;
        ensure_offer_manager(acting, &offer)?;

        self.repo
            .set_confirmed(offer_id, volunteer_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Candidatura".to_string()))
    }

    // Organização atesta que o trabalho foi feito. Pode acontecer sem
    // confirmação prévia ("esquecemos de confirmar, mas o trabalho saiu"):
    // comportamento aceito, não "consertar" para uma ordem estrita.
    pub async fn approve(
        &self,
        acting: &User,
        offer_id: Uuid,
        volunteer_id: Uuid,
    ) -> Result<Assignment, AppError> {
        let offer = self.load_offer(offer_id).await?;
        ensure_offer_manager(acting, &offer)?;

        self.repo
            .set_completed(offer_id, volunteer_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Candidatura".to_string()))
    }

    // Caminho legado sem voluntário específico: exige o campo de
    // voluntário único e liga a flag global da oferta.
    pub async fn approve_whole(&self, acting: &User, offer_id: Uuid) -> Result<Offer, AppError> {
        let offer = self.load_offer(offer_id).await?;
        ensure_offer_manager(acting, &offer)?;

        if offer.legacy_volunteer_id.is_none() {
            return Err(AppError::InvalidInput(
                "A oferta não tem voluntário diretamente atribuído.".to_string(),
            ));
        }

        self.catalog_repo
            .set_offer_completed(&self.pool, offer_id, true)
            .await?;

        self.load_offer(offer_id).await
    }

    // Retirada do próprio voluntário. Remoção idempotente; quando o último
    // par some, a flag global volta para FALSE na MESMA transação para o
    // sinal legado não divergir do ledger.
    pub async fn withdraw(
        &self,
        caller: &User,
        offer_id: Uuid,
    ) -> Result<WithdrawOutcome, AppError> {
        // Garante que a oferta existe antes de mexer no ledger
        self.load_offer(offer_id).await?;

        let mut tx = self.pool.begin().await?;

        let removed = self.repo.delete(&mut *tx, offer_id, caller.id).await?;

        if removed {
            let remaining = self.repo.count_for_offer(&mut *tx, offer_id).await?;
            if should_reset_global_flag(removed, remaining) {
                self.catalog_repo
                    .set_offer_completed(&mut *tx, offer_id, false)
                    .await?;
            }
        }

        tx.commit().await?;

        Ok(WithdrawOutcome { removed })
    }
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
            age: None,
            phone: "123456789".into(),
            created_at: Utc::now(),
        }
    }

    fn offer(organization_id: Uuid) -> Offer {
        Offer {
            id: Uuid::new_v4(),
            organization_id,
            project_id: Uuid::new_v4(),
            title: "Plantio de mudas".into(),
            location: "Parque Central".into(),
            topic: None,
            duration: None,
            requirements: None,
            date: None,
            submitted_at: Utc::now(),
            legacy_volunteer_id: None,
            completed: false,
        }
    }

    #[test]
    fn voluntario_nao_opera_ofertas() {
        let org_id = Uuid::new_v4();
        let result = ensure_offer_manager(&user(Role::Volunteer, None), &offer(org_id));
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn admin_so_opera_oferta_da_propria_organizacao() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        let admin = user(Role::OrganizationAdmin, Some(own));

        assert!(ensure_offer_manager(&admin, &offer(own)).is_ok());
        assert!(matches!(
            ensure_offer_manager(&admin, &offer(other)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn coordenador_opera_qualquer_oferta() {
        let coordinator = user(Role::Coordinator, None);
        assert!(ensure_offer_manager(&coordinator, &offer(Uuid::new_v4())).is_ok());
    }

    #[test]
    fn voluntario_se_candidata_em_oferta_aberta() {
        let volunteer = user(Role::Volunteer, None);
        assert!(ensure_can_apply(&volunteer, &offer(Uuid::new_v4())).is_ok());
    }

    #[test]
    fn oferta_encerrada_nao_aceita_candidatura() {
        let volunteer = user(Role::Volunteer, None);
        let mut o = offer(Uuid::new_v4());
        o.completed = true;

        let result = ensure_can_apply(&volunteer, &o);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn organizacao_nao_se_candidata() {
        let org = Uuid::new_v4();
        let admin = user(Role::OrganizationAdmin, Some(org));

        let result = ensure_can_apply(&admin, &offer(org));
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    // A flag global só reseta quando a retirada removeu a última inscrição
    #[test]
    fn retirada_da_ultima_inscricao_reseta_a_flag() {
        assert!(should_reset_global_flag(true, 0));
    }

    #[test]
    fn retirada_com_inscricoes_restantes_mantem_a_flag() {
        assert!(!should_reset_global_flag(true, 2));
        assert!(!should_reset_global_flag(false, 0));
    }
}
