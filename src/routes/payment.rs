use actix_web::{post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::env;
use uuid::Uuid;

use crate::services::order_service::{OrderService, PaymentError};
use crate::utils::signature;

// DTO du callback Razorpay relayé par le frontend après paiement
#[derive(Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub order_id: Option<String>,
}

/// Récupère le secret partagé Razorpay depuis les variables d'environnement
fn get_razorpay_secret() -> String {
    env::var("RAZORPAY_SECRET").unwrap_or_else(|_| {
        eprintln!("⚠️  WARNING: RAZORPAY_SECRET not found in .env, using default (INSECURE)");
        "default-insecure-razorpay-secret".to_string()
    })
}

/// POST /api/payments/verify - Vérifier un paiement Razorpay (PUBLIC)
/// Rejouable sans risque: un callback dupliqué renvoie succès sans
/// recréer d'achat ni réémettre de token.
#[post("/verify")]
pub async fn verify_payment(
    body: web::Json<VerifyPaymentRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Les quatre paramètres sont obligatoires
    let (rzp_order_id, rzp_payment_id, rzp_signature, order_id_raw) = match (
        &body.razorpay_order_id,
        &body.razorpay_payment_id,
        &body.razorpay_signature,
        &body.order_id,
    ) {
        (Some(a), Some(b), Some(c), Some(d))
            if !a.is_empty() && !b.is_empty() && !c.is_empty() && !d.is_empty() =>
        {
            (a, b, c, d)
        }
        _ => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Missing required payment parameters"
            }));
        }
    };

    // 2. Vérifier la signature HMAC avant de toucher à quoi que ce soit.
    //    Signature invalide = rejet sec, aucune confiance partielle
    let secret = get_razorpay_secret();
    if !signature::verify_gateway_signature(&secret, rzp_order_id, rzp_payment_id, rzp_signature) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid payment signature"
        }));
    }

    // 3. L'order_id interne est un UUID opaque
    let order_id = match Uuid::parse_str(order_id_raw) {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Order not found"
            }));
        }
    };

    // 4. Compléter la commande (idempotent)
    match OrderService::complete_order(db.get_ref(), order_id, rzp_order_id, rzp_payment_id).await {
        Ok(outcome) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Payment verified successfully",
            "download_token": outcome.download_token
        })),
        Err(PaymentError::OrderNotFound) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Order not found"
        })),
        Err(PaymentError::UpdateFailed) => {
            eprintln!("⚠️  Order {} completion kept losing the conditional update", order_id);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to update order"
            }))
        }
        Err(PaymentError::Database(e)) => {
            eprintln!("⚠️  Payment verification failed for order {}: {}", order_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to update order"
            }))
        }
    }
}

pub fn payment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .service(verify_payment)
    );
}
