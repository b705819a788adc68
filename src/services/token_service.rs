use sea_orm::*;
use chrono::{Duration, Utc};
use rand::Rng;
use uuid::Uuid;
use crate::models::{download_token, user_purchase};

// Fenêtre de validité d'un token de téléchargement
pub const TOKEN_TTL_SECONDS: i64 = 3600;

pub struct TokenService;

impl TokenService {
    /// Émet un token de téléchargement à usage unique pour (email, produit).
    /// Expire 1 heure après l'émission.
    pub async fn issue(
        db: &DatabaseConnection,
        user_email: &str,
        product_id: Uuid,
    ) -> Result<download_token::Model, DbErr> {
        let now = Utc::now().naive_utc();

        let new_token = download_token::ActiveModel {
            id: Set(Uuid::new_v4()),
            token: Set(Self::generate_token_value()),
            user_email: Set(user_email.to_string()),
            product_id: Set(product_id),
            expires_at: Set(now + Duration::seconds(TOKEN_TTL_SECONDS)),
            used: Set(false),
            created_at: Set(Some(now)),
        };

        new_token.insert(db).await
    }

    /// Réémet un token pour un téléchargement répété, uniquement si l'email
    /// a un achat vérifié pour ce produit (même règle de scoping qu'à la
    /// première émission). Retourne None si aucun achat ne couvre la paire.
    pub async fn reissue_for_purchase(
        db: &DatabaseConnection,
        user_email: &str,
        product_id: Uuid,
    ) -> Result<Option<download_token::Model>, DbErr> {
        // 1. Prouver l'achat avant d'émettre quoi que ce soit
        let purchase = user_purchase::Entity::find()
            .filter(user_purchase::Column::UserEmail.eq(user_email))
            .filter(user_purchase::Column::ProductId.eq(product_id))
            .filter(user_purchase::Column::IsVerified.eq(true))
            .one(db)
            .await?;

        if purchase.is_none() {
            return Ok(None);
        }

        // 2. Nouveau token, jamais de revalidation d'un token consommé
        let token = Self::issue(db, user_email, product_id).await?;
        Ok(Some(token))
    }

    /// 32 bytes aléatoires encodés hex: 256 bits d'entropie, les collisions
    /// sont cryptographiquement négligeables
    fn generate_token_value() -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill(&mut bytes);
        hex::encode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_value_format() {
        let token = TokenService::generate_token_value();

        assert_eq!(token.len(), 64); // 32 bytes en hex
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_token_values_do_not_repeat() {
        let first = TokenService::generate_token_value();
        let second = TokenService::generate_token_value();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_reissue_requires_verified_purchase() {
        // Aucun achat vérifié pour la paire → pas d'émission
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_purchase::Model>::new()])
            .into_connection();

        let result = TokenService::reissue_for_purchase(
            &db,
            "alice@example.com",
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_reissue_with_verified_purchase() {
        let product_id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        let purchase = user_purchase::Model {
            id: Uuid::new_v4(),
            user_email: "alice@example.com".to_string(),
            product_id,
            order_id: Some(Uuid::new_v4()),
            download_count: 1,
            is_verified: true,
            purchase_date: now,
            created_at: Some(now),
            updated_at: Some(now),
        };

        let issued = download_token::Model {
            id: Uuid::new_v4(),
            token: "a".repeat(64),
            user_email: "alice@example.com".to_string(),
            product_id,
            expires_at: now + Duration::seconds(TOKEN_TTL_SECONDS),
            used: false,
            created_at: Some(now),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![purchase]])
            .append_query_results([vec![issued.clone()]])
            .into_connection();

        let result = TokenService::reissue_for_purchase(&db, "alice@example.com", product_id)
            .await
            .unwrap();

        assert_eq!(result, Some(issued));
    }
}
