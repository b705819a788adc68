// ============================================================================
// SERVICE : COMPLETION DE COMMANDE
// ============================================================================
//
// Description:
//   Orchestration post-vérification de signature. Les callbacks Razorpay
//   peuvent être livrés plusieurs fois: chaque étape doit être rejouable
//   sans dupliquer d'effets.
//
// Workflow:
//   1. Relire la commande (404 si absente)
//   2. Déjà 'completed' → replay idempotent, succès sans effets
//   3. UPDATE conditionnel pending → completed (rows_affected = 0 → relire)
//   4. Insérer la ligne user_purchases
//   5. Émettre le token de téléchargement
//
// Points d'attention:
//   - une fois le paiement marqué 'completed', les échecs des étapes 4/5
//     ne le remettent JAMAIS en cause: le paiement fait foi, le reste se
//     réconcilie à la main (logs ⚠️)
//   - un replay renvoie succès mais ne réémet pas de token
//
// ============================================================================

use sea_orm::*;
use chrono::Utc;
use uuid::Uuid;
use crate::models::{order, user_purchase};
use crate::services::token_service::TokenService;

const COMPLETED: &str = "completed";
const PENDING: &str = "pending";

// Relectures max quand un écrivain concurrent gagne l'UPDATE conditionnel
const MAX_COMPLETION_ATTEMPTS: u32 = 3;

#[derive(Debug)]
pub enum PaymentError {
    OrderNotFound,
    UpdateFailed,
    Database(DbErr),
}

#[derive(Debug)]
pub struct CompletionOutcome {
    pub download_token: Option<String>,
    pub replayed: bool,
}

pub struct OrderService;

impl OrderService {
    /// Passe une commande à 'completed' après vérification de la signature,
    /// crée la preuve d'achat et émet le token de téléchargement.
    pub async fn complete_order(
        db: &DatabaseConnection,
        order_id: Uuid,
        razorpay_order_id: &str,
        razorpay_payment_id: &str,
    ) -> Result<CompletionOutcome, PaymentError> {
        for _attempt in 0..MAX_COMPLETION_ATTEMPTS {
            // 1. Relire la commande
            let order_row = order::Entity::find_by_id(order_id)
                .one(db)
                .await
                .map_err(PaymentError::Database)?
                .ok_or(PaymentError::OrderNotFound)?;

            // 2. Replay idempotent: le callback a déjà été traité
            if order_row.payment_status == COMPLETED {
                return Ok(CompletionOutcome {
                    download_token: None,
                    replayed: true,
                });
            }

            // 3. Transition conditionnelle pending → completed.
            //    Le filtre sur payment_status fait office de check-and-set:
            //    un seul callback concurrent peut affecter la ligne.
            let now = Utc::now().naive_utc();
            let update = order::Entity::update_many()
                .set(order::ActiveModel {
                    payment_status: Set(COMPLETED.to_string()),
                    razorpay_order_id: Set(Some(razorpay_order_id.to_string())),
                    razorpay_payment_id: Set(Some(razorpay_payment_id.to_string())),
                    updated_at: Set(Some(now)),
                    ..Default::default()
                })
                .filter(order::Column::Id.eq(order_id))
                .filter(order::Column::PaymentStatus.eq(PENDING))
                .exec(db)
                .await
                .map_err(PaymentError::Database)?;

            if update.rows_affected == 0 {
                // Un écrivain concurrent est passé avant nous: on relit
                // plutôt que de supposer quoi que ce soit
                continue;
            }

            // 4. Créer la preuve d'achat. Non fatal: le paiement est validé,
            //    l'échec part en réconciliation manuelle
            let purchase = user_purchase::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_email: Set(order_row.customer_email.clone()),
                product_id: Set(order_row.product_id),
                order_id: Set(Some(order_row.id)),
                download_count: Set(0),
                is_verified: Set(true),
                purchase_date: Set(now),
                created_at: Set(Some(now)),
                updated_at: Set(Some(now)),
            };

            if let Err(e) = purchase.insert(db).await {
                eprintln!(
                    "⚠️  Failed to create purchase record for order {}: {}",
                    order_row.id, e
                );
            }

            // 5. Émettre le token de téléchargement. Non fatal aussi: le
            //    client repassera par la récupération d'achat
            let download_token =
                match TokenService::issue(db, &order_row.customer_email, order_row.product_id)
                    .await
                {
                    Ok(t) => Some(t.token),
                    Err(e) => {
                        eprintln!(
                            "⚠️  Failed to issue download token for order {}: {}",
                            order_row.id, e
                        );
                        None
                    }
                };

            return Ok(CompletionOutcome {
                download_token,
                replayed: false,
            });
        }

        Err(PaymentError::UpdateFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::download_token;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn pending_order(id: Uuid, product_id: Uuid) -> order::Model {
        let now = Utc::now().naive_utc();
        order::Model {
            id,
            product_id,
            amount: Decimal::new(2999, 0),
            customer_email: "alice@example.com".to_string(),
            customer_name: "Alice".to_string(),
            payment_status: PENDING.to_string(),
            razorpay_order_id: None,
            razorpay_payment_id: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    fn completed_order(id: Uuid, product_id: Uuid) -> order::Model {
        order::Model {
            payment_status: COMPLETED.to_string(),
            razorpay_order_id: Some("order_rzp1".to_string()),
            razorpay_payment_id: Some("pay_rzp1".to_string()),
            ..pending_order(id, product_id)
        }
    }

    fn issued_token(product_id: Uuid) -> download_token::Model {
        let now = Utc::now().naive_utc();
        download_token::Model {
            id: Uuid::new_v4(),
            token: "f".repeat(64),
            user_email: "alice@example.com".to_string(),
            product_id,
            expires_at: now + Duration::hours(1),
            used: false,
            created_at: Some(now),
        }
    }

    fn purchase_row(order_id: Uuid, product_id: Uuid) -> user_purchase::Model {
        let now = Utc::now().naive_utc();
        user_purchase::Model {
            id: Uuid::new_v4(),
            user_email: "alice@example.com".to_string(),
            product_id,
            order_id: Some(order_id),
            download_count: 0,
            is_verified: true,
            purchase_date: now,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    #[tokio::test]
    async fn test_order_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<order::Model>::new()])
            .into_connection();

        let result =
            OrderService::complete_order(&db, Uuid::new_v4(), "order_rzp1", "pay_rzp1").await;

        assert!(matches!(result, Err(PaymentError::OrderNotFound)));
    }

    #[tokio::test]
    async fn test_completes_pending_order_and_issues_token() {
        let order_id = Uuid::new_v4();
        let product_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // 1. lecture: commande pending
            .append_query_results([vec![pending_order(order_id, product_id)]])
            // 3. UPDATE conditionnel: une ligne affectée
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            // 4. INSERT user_purchases (RETURNING)
            .append_query_results([vec![purchase_row(order_id, product_id)]])
            // 5. INSERT download_tokens (RETURNING)
            .append_query_results([vec![issued_token(product_id)]])
            .into_connection();

        let outcome = OrderService::complete_order(&db, order_id, "order_rzp1", "pay_rzp1")
            .await
            .unwrap();

        assert!(!outcome.replayed);
        assert_eq!(outcome.download_token, Some("f".repeat(64)));
    }

    #[tokio::test]
    async fn test_replay_is_a_no_op_success() {
        let order_id = Uuid::new_v4();
        let product_id = Uuid::new_v4();

        // Une seule lecture: aucune écriture ne doit suivre
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![completed_order(order_id, product_id)]])
            .into_connection();

        let outcome = OrderService::complete_order(&db, order_id, "order_rzp1", "pay_rzp1")
            .await
            .unwrap();

        assert!(outcome.replayed);
        assert!(outcome.download_token.is_none());
    }

    #[tokio::test]
    async fn test_lost_race_reloads_and_reports_replay() {
        let order_id = Uuid::new_v4();
        let product_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // 1ère lecture: encore pending
            .append_query_results([vec![pending_order(order_id, product_id)]])
            // UPDATE conditionnel perdu: l'autre callback est passé avant
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            // relecture: la commande est maintenant completed
            .append_query_results([vec![completed_order(order_id, product_id)]])
            .into_connection();

        let outcome = OrderService::complete_order(&db, order_id, "order_rzp1", "pay_rzp1")
            .await
            .unwrap();

        assert!(outcome.replayed);
        assert!(outcome.download_token.is_none());
    }

    #[tokio::test]
    async fn test_token_failure_does_not_roll_back_payment() {
        let order_id = Uuid::new_v4();
        let product_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending_order(order_id, product_id)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![purchase_row(order_id, product_id)]])
            // l'INSERT du token échoue: plus de résultats → erreur mock
            .into_connection();

        let outcome = OrderService::complete_order(&db, order_id, "order_rzp1", "pay_rzp1")
            .await
            .unwrap();

        // Le paiement reste acquis, seul le token manque
        assert!(!outcome.replayed);
        assert!(outcome.download_token.is_none());
    }
}
