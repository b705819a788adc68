// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - product : Catalogue des produits numériques
//   - order : Commandes (une ligne par tentative d'achat)
//   - user_purchase : Achats vérifiés (preuve d'entitlement durable)
//   - download_token : Tokens de téléchargement à usage unique (expire 1h)
//   - admin_user : Comptes admin du back office
//   - dto : Data Transfer Objects pour les requêtes/réponses API
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Les clés primaires sont des UUID v4 générés côté serveur
//   - Les relations entre tables sont définies dans chaque modèle
//
// ============================================================================

pub mod health;
pub mod product;
pub mod order;
pub mod user_purchase;
pub mod download_token;
pub mod admin_user;
pub mod dto;
