// ============================================================================
// MODÈLE : DOWNLOAD TOKENS
// ============================================================================
//
// Description:
//   Modèle de la table download_tokens. Capability à usage unique donnant
//   droit à UN téléchargement d'UN produit pour UN email.
//
// Colonnes de la table download_tokens:
//   - id (UUID, PRIMARY KEY)
//   - token (VARCHAR, UNIQUE, NOT NULL) - 32 bytes aléatoires encodés hex
//   - user_email (VARCHAR, NOT NULL)
//   - product_id (UUID, NOT NULL, FK vers products)
//   - expires_at (TIMESTAMP, NOT NULL) - created_at + 1 heure
//   - used (BOOLEAN, DEFAULT FALSE, NOT NULL)
//   - created_at (TIMESTAMP, DEFAULT CURRENT_TIMESTAMP)
//
// Workflow:
//   1. Paiement vérifié → TokenService insère un token (used = false)
//   2. Le client appelle POST /api/downloads/secure avec token + email
//   3. DownloadService passe used à true par UPDATE conditionnel
//      (token + email + used = false + expires_at > now)
//   4. rows_affected = 0 → refus générique, on ne dit pas pourquoi
//
// Points d'attention:
//   - un token ne peut être consommé qu'une fois (used = true, jamais remis
//     à false), même si deux redemptions arrivent en concurrence
//   - un token n'est valide que pour SA paire (user_email, product_id)
//   - expiré = mort, on réémet un nouveau token via le parcours de
//     récupération d'achat, on ne revalide jamais un token consommé
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "download_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub token: String,

    pub user_email: String,

    pub product_id: Uuid,

    pub expires_at: DateTime,

    pub used: bool,

    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
