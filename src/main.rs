use clinirisk_backend::api::{AuthApi, BiopsyApi, HealthApi, PatientsApi, PredictApi};
use clinirisk_backend::app_data::AppData;
use clinirisk_backend::config::{database, logging, ApplicationSettings};
use poem::{listener::TcpListener, Route, Server};
use poem_openapi::OpenApiService;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    logging::init_logging().expect("Failed to initialize logging");

    let settings = ApplicationSettings::from_env().expect("Failed to load settings");
    let bind_addr = settings.bind_addr.clone();

    // Connect to database and run migrations
    let db = database::connect(&settings.database_url)
        .await
        .expect("Failed to connect to database");
    database::migrate(&db)
        .await
        .expect("Failed to run migrations");

    // Create the shared application context (stores, services, classifier)
    let app_data = Arc::new(AppData::init(settings, db).expect("Failed to initialize AppData"));

    // Seed default staff accounts where the environment configures them
    app_data
        .seed_staff_accounts()
        .await
        .expect("Failed to seed staff accounts");

    // Create OpenAPI service with all API groups
    let api_service = OpenApiService::new(
        (
            HealthApi::new(app_data.risk_model.clone()),
            AuthApi::new(app_data.clone()),
            PatientsApi::new(app_data.clone()),
            BiopsyApi::new(app_data.clone()),
            PredictApi::new(app_data.clone()),
        ),
        "Clinirisk Backend",
        "0.1.0",
    )
    .server(format!("http://{}/api", bind_addr));

    // Generate Swagger UI from OpenAPI service
    let ui = api_service.swagger_ui();

    // Compose routes: nest API service under /api and Swagger UI under /swagger
    let app = Route::new().nest("/api", api_service).nest("/swagger", ui);

    tracing::info!("Starting server on http://{}", bind_addr);
    tracing::info!("Swagger UI available at http://{}/swagger", bind_addr);

    Server::new(TcpListener::bind(bind_addr)).run(app).await
}
