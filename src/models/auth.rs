// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use utoipa::ToSchema;

// --- Enums ---

// Papel do usuário no sistema. Só voluntários podem segurar inscrições;
// admins de organização e coordenadores operam as ofertas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Volunteer,
    Coordinator,
    OrganizationAdmin,
}

impl Role {
    // Quem pode operar ofertas (confirmar/aprovar inscrições)
    pub fn manages_offers(&self) -> bool {
        matches!(self, Role::Coordinator | Role::OrganizationAdmin)
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub role: Role,
    pub organization_id: Option<Uuid>,
    // Idade em anos. Usada para distinguir voluntários menores de idade.
    pub age: Option<i16>,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_minor(&self) -> bool {
        self.age.map(|a| a < 18).unwrap_or(false)
    }
}

// Perfil devolvido por /me, com o nome da organização resolvido
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub organization_name: Option<String>,
    pub is_minor: bool,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 3, message = "O nome de usuário deve ter no mínimo 3 caracteres."))]
    #[schema(example = "maria.santos")]
    pub username: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "maria@exemplo.org")]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    pub role: Role,

    #[validate(length(equal = 9, message = "O telefone deve ter exatamente 9 dígitos."))]
    #[schema(example = "123456789")]
    pub phone: String,

    // Obrigatória para voluntários (checado no service, pois depende do papel)
    #[validate(range(min = 0, max = 120, message = "A idade deve estar entre 0 e 120."))]
    pub age: Option<i16>,

    // Vínculo opcional com organização, só para coordenador/admin
    pub organization_id: Option<Uuid>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token e o perfil criado
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(age: Option<i16>) -> RegisterUserPayload {
        RegisterUserPayload {
            username: "joao".into(),
            email: "joao@exemplo.org".into(),
            password: "segredo1".into(),
            role: Role::Volunteer,
            phone: "123456789".into(),
            age,
            organization_id: None,
        }
    }

    #[test]
    fn registro_aceita_idade_nos_limites() {
        assert!(payload(Some(0)).validate().is_ok());
        assert!(payload(Some(120)).validate().is_ok());
    }

    #[test]
    fn registro_rejeita_idade_fora_do_intervalo() {
        assert!(payload(Some(121)).validate().is_err());
        assert!(payload(Some(-1)).validate().is_err());
    }

    #[test]
    fn registro_rejeita_telefone_curto() {
        let mut p = payload(Some(20));
        p.phone = "12345".into();
        assert!(p.validate().is_err());
    }
}
