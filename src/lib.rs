use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod analytics;
pub mod auth;
pub mod catalog;
pub mod fonts;
pub mod order;
pub mod pdf;
pub mod seal;
pub mod state;
pub mod storage;
pub mod transport;
pub mod vision;

pub use crate::state::AppState;

pub const APP_NAME: &str = "ReplenMobile API";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }

    pub fn service_unavailable(message: &str) -> Self {
        Self::new("ServiceUnavailable", message)
    }

    pub fn bad_gateway(message: &str) -> Self {
        Self::new("BadGateway", message)
    }
}

#[utoipa::path(
    tag = "Health",
    get,
    path = "/",
    responses((status = 200, description = "Liveness check"))
)]
pub async fn root() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "app": APP_NAME,
        "version": APP_VERSION,
    }))
}

#[utoipa::path(
    tag = "Health",
    get,
    path = "/health",
    responses((status = 200, description = "Per-provider configuration status"))
)]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    let providers = &state.providers;
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "services": {
            "vision": providers.vision,
            "catalog": providers.catalog,
            "fax": providers.fax,
            "email_smtp": providers.smtp,
            "email_resend": providers.resend,
            "storage": providers.storage,
            "analytics": providers.analytics,
        },
        "note": "LINE sending is handled by the mobile app via deep link",
    }))
}

pub async fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    #[derive(OpenApi)]
    #[openapi(
        paths(
            crate::root,
            crate::health,
            crate::vision::handlers::parse_invoice,
            crate::catalog::handlers::lookup_barcode,
            crate::order::handlers::send_order,
            crate::order::handlers::send_order_multi,
            crate::order::handlers::preview_order,
            crate::seal::handlers::create_hanko,
            crate::analytics::handlers::summary,
            crate::analytics::handlers::top_suppliers,
            crate::analytics::handlers::frequent_products,
            crate::analytics::handlers::monthly_trend,
        ),
        components(
            schemas(
                order::models::OrderItem,
                order::models::ContactMethod,
                order::models::SendOrderRequest,
                order::models::LegacyOrderRequest,
                order::models::DeliveryResult,
                vision::handlers::InvoiceParseRequest,
                vision::handlers::InvoiceParseResponse,
                vision::client::ParsedInvoiceItem,
                catalog::client::ProductLookup,
                seal::handlers::HankoRequest,
                seal::handlers::HankoResponse,
                analytics::models::AnalyticsSummary,
                analytics::models::TopSupplier,
                analytics::models::TopSuppliersResponse,
                analytics::models::FrequentProduct,
                analytics::models::FrequentProductsResponse,
                analytics::models::MonthlySpending,
                analytics::models::MonthlyTrendResponse,
                ErrorResponse,
            )
        ),
        tags(
            (name = "Health", description = "Liveness and provider status."),
            (name = "Invoice", description = "AI invoice extraction."),
            (name = "Catalog", description = "Barcode product lookup."),
            (name = "Orders", description = "Order rendering and delivery."),
            (name = "Hanko", description = "Seal image generation."),
            (name = "Analytics", description = "Spending summaries.")
        )
    )]
    struct ApiDoc;

    let app_state = web::Data::new(AppState::from_env());

    let prometheus = PrometheusMetricsBuilder::new("replen_server")
        .endpoint("/metrics")
        .build()
        .expect("Failed to create Prometheus metrics middleware");

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8000);

    log::info!("Starting server at http://0.0.0.0:{port}");

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        // Mobile clients call from app webviews on changing origins.
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .route("/", web::get().to(root))
            .route("/health", web::get().to(health))
            .service(
                web::scope("/api")
                    .service(
                        web::resource("/parse-invoice")
                            .route(web::post().to(vision::handlers::parse_invoice)),
                    )
                    .service(
                        web::resource("/lookup/{barcode}")
                            .route(web::get().to(catalog::handlers::lookup_barcode)),
                    )
                    .service(
                        web::resource("/send-order")
                            .route(web::post().to(order::handlers::send_order)),
                    )
                    .service(
                        web::resource("/send-order-multi")
                            .route(web::post().to(order::handlers::send_order_multi)),
                    )
                    .service(
                        web::resource("/order-preview")
                            .route(web::post().to(order::handlers::preview_order)),
                    )
                    .service(
                        web::resource("/hanko").route(web::post().to(seal::handlers::create_hanko)),
                    )
                    .service(
                        web::scope("/analytics")
                            .service(
                                web::resource("/summary")
                                    .route(web::get().to(analytics::handlers::summary)),
                            )
                            .service(
                                web::resource("/top-suppliers")
                                    .route(web::get().to(analytics::handlers::top_suppliers)),
                            )
                            .service(
                                web::resource("/frequent-products")
                                    .route(web::get().to(analytics::handlers::frequent_products)),
                            )
                            .service(
                                web::resource("/monthly-trend")
                                    .route(web::get().to(analytics::handlers::monthly_trend)),
                            ),
                    ),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
