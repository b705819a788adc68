// ============================================================================
// MODÈLE : ORDERS
// ============================================================================
//
// Description:
//   Modèle de la table orders. Une ligne = une tentative d'achat,
//   créée AVANT la redirection vers Razorpay, jamais supprimée
//   (enregistrement financier).
//
// Colonnes de la table orders:
//   - id (UUID, PRIMARY KEY) - identifiant opaque envoyé au frontend
//   - product_id (UUID, FK vers products)
//   - amount (NUMERIC, NOT NULL) - montant TTC figé à la création
//   - customer_email (VARCHAR, NOT NULL)
//   - customer_name (VARCHAR, NOT NULL)
//   - payment_status (VARCHAR) - 'pending', 'completed', 'failed'
//   - razorpay_order_id (VARCHAR, NULL) - renseigné au callback
//   - razorpay_payment_id (VARCHAR, NULL) - renseigné au callback
//   - created_at / updated_at (TIMESTAMP)
//
// Workflow:
//   1. Checkout: POST /api/orders crée la ligne avec payment_status = 'pending'
//   2. Le client paie via le widget Razorpay
//   3. Razorpay renvoie order_id + payment_id + signature
//   4. POST /api/payments/verify vérifie la signature HMAC
//   5. OrderService passe payment_status à 'completed' (une seule fois)
//
// Points d'attention:
//   - payment_status ne va que vers 'completed' ou 'failed', jamais en arrière
//   - les ids Razorpay sont immuables une fois écrits
//   - amount est calculé côté serveur depuis le prix catalogue, jamais
//     accepté du client
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub product_id: Uuid,

    pub amount: Decimal,

    pub customer_email: String,

    pub customer_name: String,

    pub payment_status: String,

    pub razorpay_order_id: Option<String>,

    pub razorpay_payment_id: Option<String>,

    pub created_at: Option<DateTime>,

    pub updated_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,

    #[sea_orm(has_many = "super::user_purchase::Entity")]
    UserPurchase,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::user_purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserPurchase.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
