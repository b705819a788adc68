pub mod health;
pub mod auth;
pub mod products;
pub mod orders;
pub mod payment;
pub mod download;
pub mod purchases;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(products::product_routes)
            .configure(orders::order_routes)
            .configure(payment::payment_routes)
            .configure(download::download_routes)
            .configure(purchases::purchase_routes)
    );
}
