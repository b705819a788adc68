use actix_web::{post, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, ColumnTrait, QueryOrder};
use validator::Validate;

use crate::models::dto::{PurchaseLookupRequest, PurchaseWithProduct};
use crate::models::{product, user_purchase};

/// POST /api/purchases/lookup - Retrouver les achats vérifiés d'un email (PUBLIC)
/// Alimente la page Downloads: la liste ne contient que des achats déjà
/// vérifiés par un paiement, jamais de lien direct vers les fichiers.
#[post("/lookup")]
pub async fn lookup_purchases(
    body: web::Json<PurchaseLookupRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    // 1. Achats vérifiés + produit associé en une seule requête
    let purchases = user_purchase::Entity::find()
        .filter(user_purchase::Column::UserEmail.eq(&body.user_email))
        .filter(user_purchase::Column::IsVerified.eq(true))
        .order_by_desc(user_purchase::Column::PurchaseDate)
        .find_also_related(product::Entity)
        .all(db.get_ref())
        .await;

    match purchases {
        Ok(purchases) => {
            // 2. Construire la réponse affichable
            let response: Vec<PurchaseWithProduct> = purchases
                .into_iter()
                .map(|(p, prod)| PurchaseWithProduct {
                    product_id: p.product_id,
                    product_title: prod.map(|pr| pr.title).unwrap_or_default(),
                    order_id: p.order_id,
                    download_count: p.download_count,
                    purchase_date: p.purchase_date,
                })
                .collect();

            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "purchases": response
            }))
        }
        Err(e) => {
            eprintln!("⚠️  Purchase lookup failed for {}: {}", body.user_email, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to load purchases"
            }))
        }
    }
}

pub fn purchase_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/purchases")
            .service(lookup_purchases)
    );
}
