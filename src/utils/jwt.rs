use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Deserialize, Serialize};
use chrono::{Utc, Duration};
use std::env;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,     // email de l'admin
    pub role: String,
    pub exp: i64,        // expiration timestamp
}

/// Récupère la clé secrète JWT depuis les variables d'environnement
fn get_jwt_secret() -> String {
    env::var("JWT_SECRET").unwrap_or_else(|_| {
        eprintln!("⚠️  WARNING: JWT_SECRET not found in .env, using default (INSECURE)");
        "default-insecure-key-change-this".to_string()
    })
}

/// Génère un JWT de session admin (expire après 24 heures)
pub fn generate_token(email: &str, role: &str) -> Result<String, String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or("Failed to calculate expiration")?
        .timestamp();

    let claims = Claims {
        sub: email.to_string(),
        role: role.to_string(),
        exp: expiration,
    };

    let secret = get_jwt_secret();

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
        .map_err(|e| format!("Failed to generate token: {}", e))
}

/// Vérifie la signature ET l'expiration, puis décode les claims.
/// Le contrôle du rôle se fait chez l'appelant (middleware).
pub fn verify_token(token: &str) -> Result<Claims, String> {
    let secret = get_jwt_secret();

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
        .map(|data| data.claims)
        .map_err(|e| format!("Invalid token: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_verify_token() {
        let email = "admin@example.com";

        let token = generate_token(email, ADMIN_ROLE).unwrap();
        let claims = verify_token(&token).unwrap();

        assert_eq!(claims.sub, email);
        assert_eq!(claims.role, ADMIN_ROLE);
    }

    #[test]
    fn test_invalid_token() {
        let result = verify_token("invalid.token.here");
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token() {
        // Token signé avec la bonne clé mais expiré depuis 2 heures
        let claims = Claims {
            sub: "admin@example.com".to_string(),
            role: ADMIN_ROLE.to_string(),
            exp: (Utc::now() - Duration::hours(2)).timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(get_jwt_secret().as_ref()),
        )
        .unwrap();

        assert!(verify_token(&token).is_err());
    }

    #[test]
    fn test_role_preserved() {
        let token = generate_token("someone@example.com", "viewer").unwrap();
        let claims = verify_token(&token).unwrap();

        // La signature est valide mais le rôle n'est pas admin:
        // c'est au middleware de refuser
        assert_eq!(claims.role, "viewer");
        assert_ne!(claims.role, ADMIN_ROLE);
    }
}
