// Service graph over in-memory storage, mounted the same way main.rs mounts it.

use std::sync::Arc;

use actix_web::web;

use tradeflow::config::CompanyConfig;
use tradeflow::middleware::{json_error_handler, query_error_handler, MetricsCollector};
use tradeflow::modules::assistant::{self, AssistantService, ChatProvider};
use tradeflow::modules::documents::{DocumentCatalog, DocumentType, PdfRenderer};
use tradeflow::modules::email::{self, EmailService};
use tradeflow::modules::health;
use tradeflow::modules::parties::{self, PartyKind, PartyService};
use tradeflow::modules::supplier_lpos::{self, SupplierLpoService};

use super::memory::{MemoryEmailLogs, MemoryLpos, MemoryParties, NoQuotes};

pub struct TestApp {
    pub customers: Arc<PartyService>,
    pub suppliers: Arc<PartyService>,
    pub supplier_lpos: Arc<SupplierLpoService>,
    pub catalog: Arc<DocumentCatalog>,
    pub email: Arc<EmailService>,
    pub email_logs: Arc<MemoryEmailLogs>,
    pub assistant: Arc<AssistantService>,
    pub metrics: MetricsCollector,
}

impl TestApp {
    /// No SMTP transport and no chat provider: email is simulated, the assistant uses rules
    pub fn new() -> Self {
        Self::with_chat(None)
    }

    pub fn with_chat(chat: Option<Arc<dyn ChatProvider>>) -> Self {
        let customers = Arc::new(MemoryParties::new(PartyKind::Customer));
        let suppliers = Arc::new(MemoryParties::new(PartyKind::Supplier));
        let supplier_lpos = Arc::new(SupplierLpoService::new(
            Arc::new(MemoryLpos::default()),
            suppliers.clone(),
            Arc::new(NoQuotes),
        ));

        let company = CompanyConfig {
            name: "Gulf Trading W.L.L.".to_string(),
            address: "Building 12, Road 4\nManama".to_string(),
            phone: "+973 1700 0000".to_string(),
            email: "sales@gulftrading.test".to_string(),
            tax_number: None,
        };
        let catalog = Arc::new(
            DocumentCatalog::new(PdfRenderer::new(company))
                .register(DocumentType::SupplierLpo, supplier_lpos.clone()),
        );

        let email_logs = Arc::new(MemoryEmailLogs::default());
        let email = Arc::new(EmailService::new(
            None,
            email_logs.clone(),
            catalog.clone(),
            true,
        ));

        Self {
            customers: Arc::new(PartyService::new(customers)),
            suppliers: Arc::new(PartyService::new(suppliers)),
            supplier_lpos,
            catalog,
            email,
            email_logs,
            assistant: Arc::new(AssistantService::new(chat)),
            metrics: MetricsCollector::new(),
        }
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::Data::new(self.metrics.clone()))
            .app_data(web::Data::new(self.supplier_lpos.clone()))
            .app_data(web::Data::new(self.catalog.clone()))
            .app_data(web::Data::new(self.email.clone()))
            .app_data(web::Data::new(self.assistant.clone()));

        cfg.configure(health::configure).service(
            web::scope("/api")
                .configure(parties::controllers::configure(
                    self.customers.clone(),
                    self.suppliers.clone(),
                ))
                .configure(supplier_lpos::controllers::configure)
                .configure(email::controllers::configure)
                .configure(assistant::controllers::configure),
        );
    }
}
