//pour les requêtes validées et les réponses structurées
use serde::{Deserialize, Serialize};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

// Création de commande au checkout (le montant est calculé côté serveur)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub product_id: Uuid,
    #[validate(email)]
    pub customer_email: String,
    #[validate(length(min = 1, max = 120))]
    pub customer_name: String,
}

// Recherche des achats vérifiés d'un email (page Downloads)
#[derive(Debug, Deserialize, Validate)]
pub struct PurchaseLookupRequest {
    #[validate(email)]
    pub user_email: String,
}

// Réémission d'un token pour un achat déjà vérifié
#[derive(Debug, Deserialize, Validate)]
pub struct ReissueTokenRequest {
    #[validate(email)]
    pub user_email: String,
    pub product_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub amount: Decimal,
    pub customer_email: String,
    pub payment_status: String,
}

// 1 achat vérifié + les infos produit affichables
#[derive(Debug, Serialize)]
pub struct PurchaseWithProduct {
    pub product_id: Uuid,
    pub product_title: String,
    pub order_id: Option<Uuid>,
    pub download_count: i32,
    pub purchase_date: chrono::NaiveDateTime,
}
