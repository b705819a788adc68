use actix_web::{post, get, put, delete, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, ColumnTrait, QueryOrder, Set, ActiveModelTrait};
use rust_decimal::Decimal;
use serde::Deserialize;
use chrono::Utc;
use uuid::Uuid;

use crate::middleware::AdminUser;
use crate::models::product::{Entity as Products, Column as ProductColumn, ActiveModel as ProductActiveModel};

// DTO pour créer un produit (back office)
#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub download_url: Option<String>,
    pub image_url: Option<String>,
    pub features: Option<serde_json::Value>,
    pub technologies: Option<serde_json::Value>,
    pub status: Option<String>, // défaut: 'active'
}

// DTO pour modifier un produit (tous les champs optionnels)
#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub download_url: Option<String>,
    pub image_url: Option<String>,
    pub features: Option<serde_json::Value>,
    pub technologies: Option<serde_json::Value>,
    pub status: Option<String>,
}

/// GET /api/products - Catalogue public (produits actifs uniquement)
#[get("")]
pub async fn list_products(db: web::Data<DatabaseConnection>) -> HttpResponse {
    let products = Products::find()
        .filter(ProductColumn::Status.eq("active"))
        .order_by_desc(ProductColumn::CreatedAt)
        .all(db.get_ref())
        .await;

    match products {
        Ok(products) => HttpResponse::Ok().json(products),
        Err(e) => {
            eprintln!("⚠️  Failed to fetch products: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch products"
            }))
        }
    }
}

/// GET /api/products/{id} - Fiche produit (PUBLIC)
#[get("/{id}")]
pub async fn get_product(
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let product_id = path.into_inner();

    match Products::find_by_id(product_id)
        .filter(ProductColumn::Status.eq("active"))
        .one(db.get_ref())
        .await
    {
        Ok(Some(product_row)) => HttpResponse::Ok().json(product_row),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Product not found"
        })),
        Err(e) => {
            eprintln!("⚠️  Failed to fetch product {}: {}", product_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch product"
            }))
        }
    }
}

/// POST /api/products - Créer un produit (PROTÉGÉE, back office)
#[post("")]
pub async fn create_product(
    _admin: AdminUser,
    body: web::Json<CreateProductRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Valider le prix
    let price = match Decimal::from_f64_retain(body.price) {
        Some(p) if p > Decimal::ZERO => p,
        _ => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Price must be greater than 0"
            }));
        }
    };

    let original_price = body.original_price.and_then(Decimal::from_f64_retain);

    // 2. Créer le produit
    let now = Utc::now().naive_utc();
    let new_product = ProductActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(body.title.clone()),
        description: Set(body.description.clone()),
        category: Set(body.category.clone()),
        price: Set(price),
        original_price: Set(original_price),
        download_url: Set(body.download_url.clone()),
        image_url: Set(body.image_url.clone()),
        features: Set(body.features.clone()),
        technologies: Set(body.technologies.clone()),
        status: Set(body.status.clone().unwrap_or_else(|| "active".to_string())),
        downloads: Set(Some(0)),
        rating: Set(None),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
    };

    match new_product.insert(db.get_ref()).await {
        Ok(product_row) => HttpResponse::Created().json(product_row),
        Err(e) => {
            eprintln!("⚠️  Failed to create product: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create product"
            }))
        }
    }
}

/// PUT /api/products/{id} - Modifier un produit (PROTÉGÉE, back office)
#[put("/{id}")]
pub async fn update_product(
    _admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let product_id = path.into_inner();

    // 1. Récupérer le produit
    let product_row = match Products::find_by_id(product_id).one(db.get_ref()).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Product not found"
            }));
        }
        Err(e) => {
            eprintln!("⚠️  Failed to fetch product {}: {}", product_id, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch product"
            }));
        }
    };

    // 2. Appliquer les champs fournis
    let mut active_model: ProductActiveModel = product_row.into();

    if let Some(title) = &body.title {
        active_model.title = Set(title.clone());
    }
    if let Some(description) = &body.description {
        active_model.description = Set(description.clone());
    }
    if let Some(category) = &body.category {
        active_model.category = Set(category.clone());
    }
    if let Some(price) = body.price {
        match Decimal::from_f64_retain(price) {
            Some(p) if p > Decimal::ZERO => active_model.price = Set(p),
            _ => {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "Price must be greater than 0"
                }));
            }
        }
    }
    if let Some(original_price) = body.original_price {
        active_model.original_price = Set(Decimal::from_f64_retain(original_price));
    }
    if let Some(download_url) = &body.download_url {
        active_model.download_url = Set(Some(download_url.clone()));
    }
    if let Some(image_url) = &body.image_url {
        active_model.image_url = Set(Some(image_url.clone()));
    }
    if let Some(features) = &body.features {
        active_model.features = Set(Some(features.clone()));
    }
    if let Some(technologies) = &body.technologies {
        active_model.technologies = Set(Some(technologies.clone()));
    }
    if let Some(status) = &body.status {
        active_model.status = Set(status.clone());
    }
    active_model.updated_at = Set(Some(Utc::now().naive_utc()));

    match active_model.update(db.get_ref()).await {
        Ok(product_row) => HttpResponse::Ok().json(product_row),
        Err(e) => {
            eprintln!("⚠️  Failed to update product {}: {}", product_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to update product"
            }))
        }
    }
}

/// DELETE /api/products/{id} - Retirer un produit de la vente (PROTÉGÉE)
/// Archive le produit au lieu de supprimer la ligne: les achats existants
/// doivent pouvoir continuer à résoudre leur asset.
#[delete("/{id}")]
pub async fn archive_product(
    _admin: AdminUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let product_id = path.into_inner();

    let product_row = match Products::find_by_id(product_id).one(db.get_ref()).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Product not found"
            }));
        }
        Err(e) => {
            eprintln!("⚠️  Failed to fetch product {}: {}", product_id, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch product"
            }));
        }
    };

    let mut active_model: ProductActiveModel = product_row.into();
    active_model.status = Set("archived".to_string());
    active_model.updated_at = Set(Some(Utc::now().naive_utc()));

    match active_model.update(db.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Product archived successfully"
        })),
        Err(e) => {
            eprintln!("⚠️  Failed to archive product {}: {}", product_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to archive product"
            }))
        }
    }
}

pub fn product_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .service(list_products)
            .service(create_product)
            .service(get_product)
            .service(update_product)
            .service(archive_product)
    );
}
