// ============================================================================
// SERVICE : TÉLÉCHARGEMENT SÉCURISÉ
// ============================================================================
//
// Description:
//   Consomme un token de téléchargement (au plus une fois) et produit une
//   URL signée à durée limitée vers l'archive du produit.
//
// Workflow:
//   1. UPDATE conditionnel used = true (token + email + non consommé +
//      non expiré) - c'est le check-and-set atomique
//   2. rows_affected = 0 → refus générique InvalidOrExpiredToken
//   3. Incrémenter user_purchases.download_count (+1 par succès)
//   4. Résoudre l'asset du produit et signer l'URL (validité 1 heure)
//
// Points d'attention:
//   - le refus ne distingue JAMAIS mauvais token / expiré / consommé /
//     mauvais email: une seule réponse générique, pas d'oracle
//   - si la signature d'URL échoue APRÈS l'étape 1, le token reste
//     consommé: limitation assumée, le client repasse par la
//     récupération d'achat pour un token neuf
//
// ============================================================================

use sea_orm::*;
use sea_orm::sea_query::Expr;
use chrono::Utc;
use crate::models::{download_token, product, user_purchase};
use crate::services::storage_service::AssetStore;

// Validité de l'URL signée renvoyée au client
pub const URL_TTL_SECONDS: i64 = 3600;

#[derive(Debug)]
pub enum DownloadError {
    InvalidOrExpiredToken,
    DownloadUnavailable,
    Database(DbErr),
}

#[derive(Debug)]
pub struct DownloadGrant {
    pub download_url: String,
    pub product_name: String,
    pub expires_in: i64,
}

pub struct DownloadService;

impl DownloadService {
    /// Consomme le token et renvoie l'URL signée de l'archive.
    /// Au plus une redemption réussie par token, même en concurrence.
    pub async fn redeem(
        db: &DatabaseConnection,
        storage: &dyn AssetStore,
        token: &str,
        user_email: &str,
    ) -> Result<DownloadGrant, DownloadError> {
        let now = Utc::now().naive_utc();

        // 1. Check-and-set atomique: la ligne n'est affectée que si le token
        //    correspond exactement à la paire (token, email), n'a pas servi
        //    et n'a pas expiré. Deux redemptions concurrentes → une seule
        //    ligne affectée au total.
        let update = download_token::Entity::update_many()
            .set(download_token::ActiveModel {
                used: Set(true),
                ..Default::default()
            })
            .filter(download_token::Column::Token.eq(token))
            .filter(download_token::Column::UserEmail.eq(user_email))
            .filter(download_token::Column::Used.eq(false))
            .filter(download_token::Column::ExpiresAt.gt(now))
            .exec(db)
            .await
            .map_err(DownloadError::Database)?;

        if update.rows_affected == 0 {
            // 2. Réponse unique quel que soit le contrôle qui a échoué
            return Err(DownloadError::InvalidOrExpiredToken);
        }

        // Relire la ligne consommée pour connaître le produit
        let token_row = download_token::Entity::find()
            .filter(download_token::Column::Token.eq(token))
            .filter(download_token::Column::UserEmail.eq(user_email))
            .one(db)
            .await
            .map_err(DownloadError::Database)?
            .ok_or(DownloadError::InvalidOrExpiredToken)?;

        // 3. +1 téléchargement sur la preuve d'achat. Non fatal: compteur
        //    de suivi, pas une condition de livraison
        let count_update = user_purchase::Entity::update_many()
            .col_expr(
                user_purchase::Column::DownloadCount,
                Expr::col(user_purchase::Column::DownloadCount).add(1),
            )
            .col_expr(user_purchase::Column::UpdatedAt, Expr::value(now))
            .filter(user_purchase::Column::ProductId.eq(token_row.product_id))
            .filter(user_purchase::Column::UserEmail.eq(user_email))
            .exec(db)
            .await;

        if let Err(e) = count_update {
            eprintln!(
                "⚠️  Failed to increment download count for {}: {}",
                user_email, e
            );
        }

        // 4. Résoudre l'asset et signer l'URL
        let product_row = product::Entity::find_by_id(token_row.product_id)
            .one(db)
            .await
            .map_err(DownloadError::Database)?
            .ok_or(DownloadError::DownloadUnavailable)?;

        let object = product_row
            .download_url
            .clone()
            .unwrap_or_else(|| format!("{}.zip", product_row.title));

        let download_url = storage
            .create_signed_url(&object, URL_TTL_SECONDS)
            .await
            .map_err(|e| {
                eprintln!("⚠️  Failed to sign download URL for {}: {}", object, e);
                DownloadError::DownloadUnavailable
            })?;

        Ok(DownloadGrant {
            download_url,
            product_name: product_row.title,
            expires_in: URL_TTL_SECONDS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    struct FakeStore {
        fail: bool,
    }

    #[async_trait]
    impl AssetStore for FakeStore {
        async fn create_signed_url(&self, object: &str, expires_in: i64) -> Result<String, String> {
            if self.fail {
                return Err("storage unreachable".to_string());
            }
            Ok(format!("https://cdn.test/{}?ttl={}", object, expires_in))
        }
    }

    fn token_row(product_id: Uuid, used: bool) -> download_token::Model {
        let now = Utc::now().naive_utc();
        download_token::Model {
            id: Uuid::new_v4(),
            token: "a".repeat(64),
            user_email: "alice@example.com".to_string(),
            product_id,
            expires_at: now + Duration::hours(1),
            used,
            created_at: Some(now),
        }
    }

    fn product_row(id: Uuid) -> product::Model {
        let now = Utc::now().naive_utc();
        product::Model {
            id,
            title: "React Dashboard".to_string(),
            description: "Tableau de bord".to_string(),
            category: "react-apps".to_string(),
            price: Decimal::new(2999, 0),
            original_price: None,
            download_url: Some("react-dashboard.zip".to_string()),
            image_url: None,
            features: None,
            technologies: None,
            status: "active".to_string(),
            downloads: Some(0),
            rating: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    #[tokio::test]
    async fn test_redeem_success() {
        let product_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // 1. check-and-set: le token est consommé
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            // relecture de la ligne consommée
            .append_query_results([vec![token_row(product_id, true)]])
            // 3. incrément du compteur
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            // 4. produit
            .append_query_results([vec![product_row(product_id)]])
            .into_connection();

        let grant = DownloadService::redeem(
            &db,
            &FakeStore { fail: false },
            &"a".repeat(64),
            "alice@example.com",
        )
        .await
        .unwrap();

        assert_eq!(grant.product_name, "React Dashboard");
        assert_eq!(grant.expires_in, URL_TTL_SECONDS);
        assert!(grant.download_url.contains("react-dashboard.zip"));
    }

    #[tokio::test]
    async fn test_redeem_rejected_when_no_row_matches() {
        // Token inconnu, consommé, expiré ou mauvais email: le store ne
        // touche aucune ligne et la réponse est la même dans les 4 cas
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let result = DownloadService::redeem(
            &db,
            &FakeStore { fail: false },
            &"a".repeat(64),
            "mallory@example.com",
        )
        .await;

        assert!(matches!(result, Err(DownloadError::InvalidOrExpiredToken)));
    }

    #[tokio::test]
    async fn test_storage_failure_is_download_unavailable() {
        let product_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![token_row(product_id, true)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![product_row(product_id)]])
            .into_connection();

        // Le token est déjà consommé à ce stade: limitation assumée
        let result = DownloadService::redeem(
            &db,
            &FakeStore { fail: true },
            &"a".repeat(64),
            "alice@example.com",
        )
        .await;

        assert!(matches!(result, Err(DownloadError::DownloadUnavailable)));
    }
}
