use actix_web::{post, get, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, ColumnTrait, Set, ActiveModelTrait};
use serde::{Deserialize, Serialize};
use chrono::Utc;

use crate::models::admin_user::{Entity as AdminUsers, Column as AdminColumn, ActiveModel as AdminActiveModel};
use crate::utils::{password, jwt};
use crate::middleware::AdminUser;

// DTO pour la connexion admin
#[derive(Deserialize)]
pub struct AdminLoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

// Réponse après login
#[derive(Serialize)]
pub struct AdminAuthResponse {
    pub success: bool,
    pub token: String,
    pub user: AdminInfo,
}

#[derive(Serialize)]
pub struct AdminInfo {
    pub email: String,
    pub role: String,
    pub name: String,
}

/// POST /api/auth/admin - Connexion au back office (PUBLIC)
#[post("/admin")]
pub async fn admin_login(
    body: web::Json<AdminLoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Champs requis
    let (email, plain_password) = match (&body.email, &body.password) {
        (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => (e.trim(), p),
        _ => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Email and password are required"
            }));
        }
    };

    // 2. Trouver le compte admin
    let admin = match AdminUsers::find()
        .filter(AdminColumn::Email.eq(email))
        .one(db.get_ref())
        .await
    {
        Ok(Some(admin)) => admin,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid credentials"
            }));
        }
        Err(e) => {
            eprintln!("⚠️  Admin lookup failed: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    // 3. Vérifier le mot de passe. Les comptes importés de l'ancien back
    //    office peuvent encore être en clair: une seule comparaison legacy,
    //    suivie d'un upgrade immédiat vers un vrai hash
    let stored_is_hashed = password::is_password_hashed(&admin.password_hash);

    let is_valid = if stored_is_hashed {
        match password::verify_password(plain_password, &admin.password_hash) {
            Ok(valid) => valid,
            Err(e) => {
                eprintln!("⚠️  Password verification error for {}: {}", admin.email, e);
                false
            }
        }
    } else {
        plain_password == &admin.password_hash
    };

    if !is_valid {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid credentials"
        }));
    }

    let role = admin.role.clone().unwrap_or_else(|| jwt::ADMIN_ROLE.to_string());
    let name = admin.name.clone();
    let admin_email = admin.email.clone();
    let now = Utc::now().naive_utc();

    // 4. Mettre à jour last_login, et remplacer le mot de passe en clair
    //    par son hash au premier login réussi
    let mut active_model: AdminActiveModel = admin.into();
    active_model.last_login = Set(Some(now));

    if !stored_is_hashed {
        match password::hash_password(plain_password) {
            Ok(new_hash) => {
                active_model.password_hash = Set(new_hash);
                active_model.updated_at = Set(Some(now));
            }
            Err(e) => {
                eprintln!("⚠️  Failed to hash legacy password for {}: {}", admin_email, e);
            }
        }
    }

    if let Err(e) = active_model.update(db.get_ref()).await {
        // Non fatal: la session peut quand même être ouverte
        eprintln!("⚠️  Failed to update admin record for {}: {}", admin_email, e);
    }

    // 5. Générer le JWT de session (24 heures, claims email + role)
    let token = match jwt::generate_token(&admin_email, &role) {
        Ok(token) => token,
        Err(e) => {
            eprintln!("⚠️  Failed to generate session token: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    // 6. Retourner la réponse
    HttpResponse::Ok().json(AdminAuthResponse {
        success: true,
        token,
        user: AdminInfo {
            email: admin_email,
            role,
            name,
        },
    })
}

/// GET /api/auth/me - Vérifier la session admin (PROTÉGÉE)
#[get("/me")]
pub async fn me(admin: AdminUser) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "email": admin.email,
        "role": admin.role
    }))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(admin_login)
            .service(me)
    );
}
