//! Application state.
//!
//! Every provider client is built once here from the environment and injected
//! into the handlers; the request path holds no process-wide mutable state.

use std::sync::Arc;
use std::time::Duration;

use crate::analytics::AnalyticsStore;
use crate::catalog::CatalogClient;
use crate::fonts::FontStore;
use crate::order::OrderDispatcher;
use crate::pdf::{OrderPdfRenderer, SealStamper};
use crate::storage::{ObjectStorage, SupabaseConfig, SupabaseStorage};
use crate::transport::{EmailTransport, FaxTransport};
use crate::vision::VisionClient;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Which providers had credentials at startup; surfaced by `/health`.
#[derive(Debug, Clone, Copy)]
pub struct ProviderStatus {
    pub vision: bool,
    pub catalog: bool,
    pub fax: bool,
    pub smtp: bool,
    pub resend: bool,
    pub storage: bool,
    pub analytics: bool,
}

pub struct AppState {
    pub http_client: reqwest::Client,
    pub fonts: Arc<FontStore>,
    pub storage: Option<Arc<dyn ObjectStorage>>,
    pub dispatcher: OrderDispatcher,
    pub vision: VisionClient,
    pub catalog: CatalogClient,
    pub analytics: AnalyticsStore,
    pub providers: ProviderStatus,
}

impl AppState {
    pub fn from_env() -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("replen-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create reqwest client");

        let fonts = Arc::new(FontStore::load());

        let storage_config = SupabaseConfig::from_env();
        let storage: Option<Arc<dyn ObjectStorage>> = storage_config.clone().map(|config| {
            Arc::new(SupabaseStorage::new(config, http_client.clone())) as Arc<dyn ObjectStorage>
        });

        let renderer = OrderPdfRenderer::new(fonts.clone());
        let stamper = SealStamper::new(storage_config.as_ref(), http_client.clone());
        let fax = FaxTransport::from_env(http_client.clone());
        let email = EmailTransport::from_env(http_client.clone());

        let vision = VisionClient::from_env(http_client.clone());
        let catalog = CatalogClient::from_env(http_client.clone());
        let analytics = AnalyticsStore::from_env();

        let providers = ProviderStatus {
            vision: vision.is_configured(),
            catalog: catalog.is_configured(),
            fax: fax.is_configured(),
            smtp: email.has_smtp(),
            resend: email.has_resend(),
            storage: storage.is_some(),
            analytics: analytics.is_configured(),
        };

        let dispatcher = OrderDispatcher::new(renderer, stamper, fax, email);

        Self {
            http_client,
            fonts,
            storage,
            dispatcher,
            vision,
            catalog,
            analytics,
            providers,
        }
    }
}
