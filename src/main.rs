mod models;
mod routes;
mod db;
mod services;
mod utils;
mod middleware;
use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use services::storage_service::SignedStorage;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    println!("🔌 Connecting to database...");
    let db = db::establish_connection()
        .await
        .expect("Failed to connect to database");
    println!("✅ Database connected!");

    let storage = SignedStorage::from_env();

    println!("🚀 Starting server on http://127.0.0.1:8080");

    // `web::Data` is Arc-backed, so clone the shared handle per worker instead
    // of the connection itself (sea-orm's `DatabaseConnection` is not `Clone`
    // when the dev-only `mock` feature is unified into the test build).
    let db = web::Data::new(db);

    HttpServer::new(move || {
        // L'API est consommée directement depuis le navigateur (checkout,
        // page downloads): CORS ouvert comme les edge functions d'origine
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .app_data(db.clone())
            .app_data(web::Data::new(storage.clone()))
            .configure(routes::configure_routes)
    })
        .bind(("127.0.0.1", 8080))?
        .run()
        .await
}
