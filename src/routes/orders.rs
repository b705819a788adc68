use actix_web::{post, get, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, ColumnTrait, QueryOrder, Set, ActiveModelTrait};
use rust_decimal::Decimal;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::middleware::AdminUser;
use crate::models::dto::{CreateOrderRequest, OrderResponse};
use crate::models::{order, product};

/// POST /api/orders - Créer une commande au checkout (PUBLIC)
/// La commande naît 'pending' AVANT la redirection vers Razorpay; le montant
/// est recalculé depuis le prix catalogue, jamais accepté du client.
#[post("")]
pub async fn create_order(
    body: web::Json<CreateOrderRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    // 1. Le produit doit exister et être en vente
    let product_row = match product::Entity::find_by_id(body.product_id)
        .filter(product::Column::Status.eq("active"))
        .one(db.get_ref())
        .await
    {
        Ok(Some(p)) => p,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Product not found"
            }));
        }
        Err(e) => {
            eprintln!("⚠️  Product lookup failed: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    // 2. Montant TTC figé à la création: prix catalogue + 18% GST,
    //    arrondi à la roupie (les montants doivent coller à ceux du gateway)
    let amount = (product_row.price * Decimal::new(118, 2)).round_dp(0);

    // 3. Créer la commande en 'pending'
    let now = Utc::now().naive_utc();
    let new_order = order::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_row.id),
        amount: Set(amount),
        customer_email: Set(body.customer_email.clone()),
        customer_name: Set(body.customer_name.clone()),
        payment_status: Set("pending".to_string()),
        razorpay_order_id: Set(None),
        razorpay_payment_id: Set(None),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
    };

    match new_order.insert(db.get_ref()).await {
        Ok(order_row) => HttpResponse::Created().json(OrderResponse {
            id: order_row.id,
            product_id: order_row.product_id,
            amount: order_row.amount,
            customer_email: order_row.customer_email,
            payment_status: order_row.payment_status,
        }),
        Err(e) => {
            eprintln!("⚠️  Failed to create order: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create order"
            }))
        }
    }
}

/// GET /api/orders - Lister les commandes (PROTÉGÉE, back office)
#[get("")]
pub async fn list_orders(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let orders = order::Entity::find()
        .order_by_desc(order::Column::CreatedAt)
        .all(db.get_ref())
        .await;

    match orders {
        Ok(orders) => HttpResponse::Ok().json(orders),
        Err(e) => {
            eprintln!("⚠️  Failed to fetch orders: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch orders"
            }))
        }
    }
}

pub fn order_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .service(create_order)
            .service(list_orders)
    );
}
