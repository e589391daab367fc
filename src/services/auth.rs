// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, UserRepository},
    models::auth::{Claims, RegisterUserPayload, Role, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    catalog_repo: CatalogRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        catalog_repo: CatalogRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, catalog_repo, jwt_secret, pool }
    }

    pub async fn register_user(
        &self,
        payload: &RegisterUserPayload,
    ) -> Result<(String, User), AppError> {
        // Regras que dependem do papel (o validator não enxerga isso):
        // voluntário precisa de idade; vínculo com organização é só para
        // contas de coordenador/organização.
        if payload.role == Role::Volunteer && payload.age.is_none() {
            return Err(AppError::InvalidInput(
                "A idade é obrigatória para voluntários.".to_string(),
            ));
        }

        let organization_id = match (payload.role, payload.organization_id) {
            (Role::Volunteer, _) => None,
            (_, Some(org_id)) => {
                self.catalog_repo
                    .find_organization(org_id)
                    .await?
                    .ok_or_else(|| AppError::ResourceNotFound("Organização".to_string()))?;
                Some(org_id)
            }
            (_, None) => None,
        };

        // Hashing fora da transação, em thread separado (bcrypt é pesado)
        let password_clone = payload.password.clone();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut tx = self.pool.begin().await?;

        let new_user = self
            .user_repo
            .create_user(
                &mut *tx,
                &payload.username,
                &payload.email,
                &hashed_password,
                payload.role,
                organization_id,
                payload.age,
                &payload.phone,
            )
            .await?;

        tx.commit().await?;

        let token = self.create_token(new_user.id)?;
        Ok((token, new_user))
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(user.id)?;
        Ok((token, user))
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
