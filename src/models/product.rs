use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    #[serde(skip_serializing)] // Clé de l'objet dans le bucket, jamais exposée en JSON
    pub download_url: Option<String>,
    pub image_url: Option<String>,
    pub features: Option<Json>,     // Liste de strings
    pub technologies: Option<Json>, // Liste de strings
    pub status: String,             // 'active', 'draft', 'archived'
    pub downloads: Option<i32>,
    pub rating: Option<Decimal>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order::Entity")]
    Order,

    #[sea_orm(has_many = "super::user_purchase::Entity")]
    UserPurchase,

    #[sea_orm(has_many = "super::download_token::Entity")]
    DownloadToken,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::user_purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserPurchase.def()
    }
}

impl Related<super::download_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DownloadToken.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
