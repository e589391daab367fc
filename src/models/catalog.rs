// src/models/catalog.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    #[schema(example = "Fundação Mãos à Obra")]
    pub name: String,
    pub phone: String,
    pub tax_id: Option<String>,
    // Derivado: TRUE sempre que tax_id está presente. O repositório mantém
    // a regra nas escritas; nunca é setado diretamente pela API.
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub organization_id: Uuid,
    #[schema(example = "Horta Comunitária")]
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub project_id: Uuid,
    #[schema(example = "Plantio de mudas no sábado")]
    pub title: String,
    pub location: String,
    #[schema(example = "meio ambiente")]
    pub topic: Option<String>,
    #[schema(example = "3 horas")]
    pub duration: Option<String>,
    pub requirements: Option<String>,
    pub date: Option<NaiveDate>,
    pub submitted_at: DateTime<Utc>,
    // Campo legado de voluntário único, anterior ao ledger de inscrições
    pub legacy_volunteer_id: Option<Uuid>,
    // Flag global de conclusão (legada). Conta como sinal de conclusão
    // ao lado do fato por inscrição: qualquer um dos dois basta.
    pub completed: bool,
}

// Participante de uma oferta, visto pelo detalhe
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub volunteer_id: Uuid,
    pub username: String,
    pub confirmed: bool,
    pub completed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferDetail {
    #[serde(flatten)]
    pub offer: Offer,
    pub project_name: String,
    pub organization_name: String,
    pub participants: Vec<Participant>,
    pub participant_count: usize,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationPayload {
    #[validate(length(min = 1, max = 100, message = "required"))]
    pub name: String,

    #[validate(length(equal = 9, message = "O telefone deve ter exatamente 9 dígitos."))]
    pub phone: String,

    // Presença do registro fiscal => organização verificada
    #[validate(length(equal = 10, message = "O identificador fiscal deve ter 10 dígitos."))]
    pub tax_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    #[validate(length(min = 1, max = 100, message = "required"))]
    pub name: String,

    #[serde(default)]
    pub description: String,

    // Coordenadores informam a organização dona; admins usam a própria
    pub organization_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferPayload {
    pub project_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "required"))]
    pub title: String,

    #[validate(length(min = 1, max = 100, message = "required"))]
    pub location: String,

    pub topic: Option<String>,
    pub duration: Option<String>,
    pub requirements: Option<String>,
    pub date: Option<NaiveDate>,
    pub organization_id: Option<Uuid>,

    // Atribuição direta de um voluntário único (caminho legado)
    pub legacy_volunteer_id: Option<Uuid>,
}

// Atualização da oferta no estilo PUT: os campos descritivos são
// substituídos por inteiro; omitir um opcional limpa o valor.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOfferPayload {
    #[validate(length(min = 1, max = 100, message = "required"))]
    pub title: String,

    #[validate(length(min = 1, max = 100, message = "required"))]
    pub location: String,

    pub topic: Option<String>,
    pub duration: Option<String>,
    pub requirements: Option<String>,
    pub date: Option<NaiveDate>,
    pub legacy_volunteer_id: Option<Uuid>,
}
