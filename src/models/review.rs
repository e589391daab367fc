// src/models/review.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;
use utoipa::ToSchema;

// Avaliação de um voluntário por uma organização, no contexto de uma oferta.
// A referência à oferta é fraca: se a oferta some, a avaliação fica.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub volunteer_id: Uuid,
    pub offer_id: Option<Uuid>,
    #[schema(example = 5)]
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewPayload {
    pub offer_id: Uuid,

    // Limites inclusivos: 1 e 5 valem, 0 e 6 não.
    #[validate(range(min = 1, max = 5, message = "A nota deve estar entre 1 e 5."))]
    #[schema(example = 4)]
    pub rating: i16,

    #[serde(default)]
    pub comment: String,

    // Quando a oferta tem vários participantes, o chamador precisa
    // dizer qual voluntário está avaliando.
    pub volunteer_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewPayload {
    #[validate(range(min = 1, max = 5, message = "A nota deve estar entre 1 e 5."))]
    pub rating: i16,

    #[serde(default)]
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(rating: i16) -> SubmitReviewPayload {
        SubmitReviewPayload {
            offer_id: Uuid::new_v4(),
            rating,
            comment: String::new(),
            volunteer_id: None,
        }
    }

    #[test]
    fn nota_aceita_limites_inclusivos() {
        assert!(payload(1).validate().is_ok());
        assert!(payload(5).validate().is_ok());
    }

    #[test]
    fn nota_rejeita_fora_do_intervalo() {
        assert!(payload(0).validate().is_err());
        assert!(payload(6).validate().is_err());
    }
}
