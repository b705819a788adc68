use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Vérifie la signature d'un callback Razorpay.
/// Razorpay signe la concaténation "order_id|payment_id" en HMAC-SHA256
/// avec le secret partagé, et transmet la signature encodée en hex.
/// La comparaison passe par Mac::verify_slice (temps constant).
pub fn verify_gateway_signature(
    secret: &str,
    gateway_order_id: &str,
    gateway_payment_id: &str,
    supplied_signature: &str,
) -> bool {
    let payload = format!("{}|{}", gateway_order_id, gateway_payment_id);

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());

    // Une signature non-hex est invalide, sans dire pourquoi
    let supplied = match hex::decode(supplied_signature) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    mac.verify_slice(&supplied).is_ok()
}
