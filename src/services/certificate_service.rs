// src/services/certificate_service.rs

use genpdf::{elements, style, Element};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AssignmentRepository, CatalogRepository},
    models::{
        assignment::{Assignment, CompletedWork},
        auth::User,
        catalog::Offer,
    },
};

// Seleciona os fatos que alimentam o emissor de certificados e faz a
// renderização em si. O núcleo só responde pela seleção correta da lista;
// qualquer falha do renderizador é infraestrutura opaca, nunca domínio.
#[derive(Clone)]
pub struct CertificateService {
    pool: sqlx::PgPool,
    assignment_repo: AssignmentRepository,
    catalog_repo: CatalogRepository,
}

// Elegibilidade do certificado por oferta: inscrição aprovada OU o
// caminho legado (voluntário único da oferta + flag global ligada).
pub(crate) fn offer_certificate_eligible(
    offer: &Offer,
    assignment: Option<&Assignment>,
    volunteer_id: Uuid,
) -> bool {
    let specific = assignment.is_some_and(|a| a.completed);
    let legacy = offer.legacy_volunteer_id == Some(volunteer_id) && offer.completed;
    specific || legacy
}

impl CertificateService {
    pub fn new(
        pool: sqlx::PgPool,
        assignment_repo: AssignmentRepository,
        catalog_repo: CatalogRepository,
    ) -> Self {
        Self { pool, assignment_repo, catalog_repo }
    }

    // Lista (título da oferta, nome do projeto) dos trabalhos concluídos,
    // na ordem de publicação. Lista vazia não é erro aqui: quem decide
    // devolver 404 é a ação voltada ao usuário.
    pub async fn list_completed_work(
        &self,
        volunteer_id: Uuid,
    ) -> Result<Vec<CompletedWork>, AppError> {
        self.assignment_repo.list_completed_work(volunteer_id).await
    }

    pub async fn is_eligible_for_offer_certificate(
        &self,
        volunteer_id: Uuid,
        offer_id: Uuid,
    ) -> Result<bool, AppError> {
        let offer = self
            .catalog_repo
            .find_offer(&self.pool, offer_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Oferta".to_string()))?;

        let assignment = self
            .assignment_repo
            .find(&self.pool, offer_id, volunteer_id)
            .await?;

        Ok(offer_certificate_eligible(&offer, assignment.as_ref(), volunteer_id))
    }

    // Certificado geral: cabeçalho + voluntário + uma linha por trabalho
    pub fn render_certificate(
        &self,
        volunteer: &User,
        items: &[CompletedWork],
    ) -> Result<Vec<u8>, AppError> {
        let mut doc = self.new_document("Certificado de Voluntariado")?;

        doc.push(
            elements::Paragraph::new("Certificado de Conclusão de Trabalhos Voluntários")
                .styled(style::Style::new().bold().with_font_size(20)),
        );
        doc.push(elements::Break::new(1.5));

        doc.push(elements::Paragraph::new(format!("Voluntário(a): {}", volunteer.username)));
        doc.push(elements::Paragraph::new(format!("E-mail: {}", volunteer.email)));
        doc.push(elements::Break::new(1.0));

        doc.push(
            elements::Paragraph::new("Trabalhos concluídos:")
                .styled(style::Style::new().bold().with_font_size(14)),
        );

        for item in items {
            doc.push(elements::Paragraph::new(format!(
                "- {} ({})",
                item.offer_title, item.project_name
            )));
        }

        Self::render_to_buffer(doc)
    }

    // Certificado de uma oferta específica
    pub fn render_offer_certificate(
        &self,
        volunteer: &User,
        offer_title: &str,
    ) -> Result<Vec<u8>, AppError> {
        let mut doc = self.new_document("Certificado")?;

        doc.push(
            elements::Paragraph::new("Certificado")
                .styled(style::Style::new().bold().with_font_size(20)),
        );
        doc.push(elements::Break::new(1.5));

        doc.push(elements::Paragraph::new(format!("Voluntário(a): {}", volunteer.username)));
        doc.push(elements::Paragraph::new(format!("Concluiu a oferta: {}", offer_title)));

        Self::render_to_buffer(doc)
    }

    fn new_document(&self, title: &str) -> Result<genpdf::Document, AppError> {
        // Carrega a fonte da pasta 'fonts/'
        let font_family = genpdf::fonts::from_files("./fonts", "Roboto", None)
            .map_err(|e| AppError::CertificateError(format!("fonte não encontrada: {}", e)))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(title);
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(15);
        doc.set_page_decorator(decorator);
        Ok(doc)
    }

    fn render_to_buffer(doc: genpdf::Document) -> Result<Vec<u8>, AppError> {
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::CertificateError(e.to_string()))?;
        Ok(buffer)
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
            title: "Aulas de reforço".into(),
            location: "Centro Comunitário".into(),
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
            confirmed: true,
            completed,
        }
    }

    #[test]
    fn inscricao_concluida_da_direito_ao_certificado() {
        let v = Uuid::new_v4();
        let o = offer(None, false);
        let a = assignment(&o, v, true);
        assert!(offer_certificate_eligible(&o, Some(&a), v));
    }

    // Aprovar sem confirmar é válido: as duas flags são independentes
    #[test]
    fn aprovacao_vale_mesmo_sem_confirmacao() {
        let v = Uuid::new_v4();
        let o = offer(None, false);
        let mut a = assignment(&o, v, true);
        a.confirmed = false;
        assert!(offer_certificate_eligible(&o, Some(&a), v));
    }

    #[test]
    fn inscricao_pendente_nao_da_direito() {
        let v = Uuid::new_v4();
        let o = offer(None, false);
        let a = assignment(&o, v, false);
        assert!(!offer_certificate_eligible(&o, Some(&a), v));
    }

    #[test]
    fn caminho_legado_exige_campo_e_flag_juntos() {
        let v = Uuid::new_v4();

        // Campo legado + flag global ligada: elegível mesmo sem inscrição
        assert!(offer_certificate_eligible(&offer(Some(v), true), None, v));

        // Só o campo, sem a flag: não
        assert!(!offer_certificate_eligible(&offer(Some(v), false), None, v));

        // Flag ligada mas o campo aponta outra pessoa: não
        assert!(!offer_certificate_eligible(&offer(Some(Uuid::new_v4()), true), None, v));
    }
}
