use actix_web::{post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

use crate::models::dto::ReissueTokenRequest;
use crate::services::download_service::{DownloadService, DownloadError};
use crate::services::storage_service::SignedStorage;
use crate::services::token_service::{TokenService, TOKEN_TTL_SECONDS};

// DTO de redemption d'un token de téléchargement
#[derive(Deserialize)]
pub struct SecureDownloadRequest {
    pub token: Option<String>,
    pub user_email: Option<String>,
}

/// POST /api/downloads/secure - Échanger un token contre une URL signée (PUBLIC)
/// Le token est consommé définitivement, même si la livraison échoue ensuite.
#[post("/secure")]
pub async fn secure_download(
    body: web::Json<SecureDownloadRequest>,
    db: web::Data<DatabaseConnection>,
    storage: web::Data<SignedStorage>,
) -> HttpResponse {
    // 1. Token et email obligatoires
    let (token, user_email) = match (&body.token, &body.user_email) {
        (Some(t), Some(e)) if !t.is_empty() && !e.is_empty() => (t, e),
        _ => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Token and email are required"
            }));
        }
    };

    // 2. Redemption au plus une fois
    match DownloadService::redeem(db.get_ref(), storage.get_ref(), token, user_email).await {
        Ok(grant) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "download_url": grant.download_url,
            "product_name": grant.product_name,
            "expires_in": grant.expires_in
        })),
        // Même réponse pour token inconnu / consommé / expiré / mauvais email
        Err(DownloadError::InvalidOrExpiredToken) => {
            HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid or expired download token"
            }))
        }
        Err(DownloadError::DownloadUnavailable) => {
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to generate download link"
            }))
        }
        Err(DownloadError::Database(e)) => {
            eprintln!("⚠️  Secure download failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

/// POST /api/downloads/token - Réémettre un token pour un achat vérifié (PUBLIC)
/// Parcours de récupération: téléchargement répété ou token expiré/brûlé.
#[post("/token")]
pub async fn reissue_token(
    body: web::Json<ReissueTokenRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    match TokenService::reissue_for_purchase(db.get_ref(), &body.user_email, body.product_id).await
    {
        Ok(Some(token)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "download_token": token.token,
            "expires_in": TOKEN_TTL_SECONDS
        })),
        Ok(None) => HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "No verified purchase found for this product"
        })),
        Err(e) => {
            eprintln!("⚠️  Token reissue failed for {}: {}", body.user_email, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to generate download token"
            }))
        }
    }
}

pub fn download_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/downloads")
            .service(secure_download)
            .service(reissue_token)
    );
}
