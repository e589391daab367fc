// src/models/assignment.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;

// Uma linha do ledger: a relação de UM voluntário com UMA oferta.
// `confirmed` e `completed` são independentes de propósito: a organização
// pode marcar o trabalho como feito sem nunca ter confirmado a inscrição.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub volunteer_id: Uuid,
    pub confirmed: bool,
    pub completed: bool,
}

// Resultado do apply: re-candidatura não é erro, só sinaliza "já inscrito"
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutcome {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub already_applied: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawOutcome {
    pub removed: bool,
}

// Item do certificado: um trabalho concluído
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletedWork {
    pub offer_title: String,
    pub project_name: String,
}

// Payload das ações da organização que miram um voluntário específico
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerActionPayload {
    pub volunteer_id: Uuid,
}
