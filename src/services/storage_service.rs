use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Header, EncodingKey};
use serde::{Deserialize, Serialize};
use std::env;

// Bucket où vivent les archives des produits
const STORAGE_BUCKET: &str = "source-codes";

/// Seule capacité consommée du stockage d'assets: produire une URL de
/// retrait signée, valide N secondes. Le trait permet de brancher un
/// stockage factice dans les tests.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn create_signed_url(&self, object: &str, expires_in: i64) -> Result<String, String>;
}

/// Claims embarqués dans l'URL signée: l'objet autorisé et l'expiration.
/// L'URL prouve l'autorisation toute seule, sans état de session.
#[derive(Debug, Serialize, Deserialize)]
struct SignedUrlClaims {
    url: String,
    exp: i64,
}

/// Stockage réel: signe un JWT HS256 sur {objet, exp} et le colle en query
/// string sur l'URL publique du bucket.
#[derive(Clone)]
pub struct SignedStorage {
    base_url: String,
    signing_secret: String,
}

impl SignedStorage {
    pub fn new(base_url: String, signing_secret: String) -> Self {
        Self { base_url, signing_secret }
    }

    pub fn from_env() -> Self {
        let base_url = env::var("STORAGE_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080/storage".to_string());
        let signing_secret = env::var("STORAGE_SIGNING_SECRET").unwrap_or_else(|_| {
            eprintln!("⚠️  WARNING: STORAGE_SIGNING_SECRET not found in .env, using default (INSECURE)");
            "default-insecure-storage-key".to_string()
        });

        Self::new(base_url, signing_secret)
    }
}

#[async_trait]
impl AssetStore for SignedStorage {
    async fn create_signed_url(&self, object: &str, expires_in: i64) -> Result<String, String> {
        let object_path = format!("{}/{}", STORAGE_BUCKET, object);

        let claims = SignedUrlClaims {
            url: object_path.clone(),
            exp: Utc::now().timestamp() + expires_in,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.signing_secret.as_ref()),
        )
        .map_err(|e| format!("Failed to sign URL: {}", e))?;

        Ok(format!(
            "{}/object/sign/{}?token={}",
            self.base_url.trim_end_matches('/'),
            object_path,
            token
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};

    fn decode_claims(url: &str, secret: &str) -> Result<SignedUrlClaims, String> {
        let token = url.split("?token=").nth(1).expect("URL must carry a token");
        decode::<SignedUrlClaims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| e.to_string())
    }

    #[tokio::test]
    async fn test_signed_url_carries_object_and_expiry() {
        let storage = SignedStorage::new(
            "https://cdn.example.com/storage".to_string(),
            "test-signing-secret".to_string(),
        );

        let before = Utc::now().timestamp();
        let url = storage
            .create_signed_url("react-dashboard.zip", 3600)
            .await
            .unwrap();

        assert!(url.starts_with(
            "https://cdn.example.com/storage/object/sign/source-codes/react-dashboard.zip?token="
        ));

        let claims = decode_claims(&url, "test-signing-secret").unwrap();
        assert_eq!(claims.url, "source-codes/react-dashboard.zip");
        assert!(claims.exp >= before + 3600);
    }

    #[tokio::test]
    async fn test_signed_url_rejected_with_wrong_secret() {
        let storage = SignedStorage::new(
            "https://cdn.example.com/storage".to_string(),
            "test-signing-secret".to_string(),
        );

        let url = storage.create_signed_url("app.zip", 60).await.unwrap();

        assert!(decode_claims(&url, "another-secret").is_err());
    }
}
