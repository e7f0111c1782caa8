//! Service graph shared by every worker.

use std::sync::Arc;

use actix_web::web;
use sqlx::MySqlPool;

use crate::config::{CompanyConfig, Config};
use crate::core::Result;
use crate::modules::assistant::{self, AssistantService, ChatProvider, OpenAiProvider};
use crate::modules::documents::{DocumentCatalog, DocumentType, PdfRenderer};
use crate::modules::email::{
    self, EmailLogRepository, EmailService, Mailer, MySqlEmailLogRepository, SmtpMailer,
};
use crate::modules::enquiries::{self, EnquiryRepository, EnquiryService, MySqlEnquiryRepository};
use crate::modules::inventory::{
    self, InventoryRepository, InventoryService, MySqlInventoryRepository,
};
use crate::modules::material_receipts::{
    self, MaterialReceiptRepository, MaterialReceiptService, MySqlMaterialReceiptRepository,
};
use crate::modules::parties::{
    self, MySqlPartyRepository, PartyKind, PartyRepository, PartyService,
};
use crate::modules::purchase_invoices::{
    self, MySqlPurchaseInvoiceRepository, PurchaseInvoiceRepository, PurchaseInvoiceService,
};
use crate::modules::quotations::{
    self, MySqlQuotationRepository, QuotationRepository, QuotationService,
};
use crate::modules::receipt_returns::{
    self, MySqlReceiptReturnRepository, ReceiptReturnRepository, ReceiptReturnService,
};
use crate::modules::sales_orders::{
    self, MySqlSalesOrderRepository, SalesOrderRepository, SalesOrderService,
};
use crate::modules::stock_issues::{
    self, MySqlStockIssueRepository, StockIssueRepository, StockIssueService,
};
use crate::modules::supplier_lpos::{
    self, MySqlSupplierLpoRepository, SupplierLpoRepository, SupplierLpoService,
};
use crate::modules::supplier_quotes::{
    self, MySqlSupplierQuoteRepository, SupplierQuoteRepository, SupplierQuoteService,
};

/// Storage behind every service
#[derive(Clone)]
pub struct Repositories {
    pub customers: Arc<dyn PartyRepository>,
    pub suppliers: Arc<dyn PartyRepository>,
    pub inventory: Arc<dyn InventoryRepository>,
    pub enquiries: Arc<dyn EnquiryRepository>,
    pub supplier_quotes: Arc<dyn SupplierQuoteRepository>,
    pub quotations: Arc<dyn QuotationRepository>,
    pub sales_orders: Arc<dyn SalesOrderRepository>,
    pub supplier_lpos: Arc<dyn SupplierLpoRepository>,
    pub material_receipts: Arc<dyn MaterialReceiptRepository>,
    pub receipt_returns: Arc<dyn ReceiptReturnRepository>,
    pub stock_issues: Arc<dyn StockIssueRepository>,
    pub purchase_invoices: Arc<dyn PurchaseInvoiceRepository>,
    pub email_logs: Arc<dyn EmailLogRepository>,
}

impl Repositories {
    pub fn mysql(pool: &MySqlPool) -> Self {
        Self {
            customers: Arc::new(MySqlPartyRepository::new(pool.clone(), PartyKind::Customer)),
            suppliers: Arc::new(MySqlPartyRepository::new(pool.clone(), PartyKind::Supplier)),
            inventory: Arc::new(MySqlInventoryRepository::new(pool.clone())),
            enquiries: Arc::new(MySqlEnquiryRepository::new(pool.clone())),
            supplier_quotes: Arc::new(MySqlSupplierQuoteRepository::new(pool.clone())),
            quotations: Arc::new(MySqlQuotationRepository::new(pool.clone())),
            sales_orders: Arc::new(MySqlSalesOrderRepository::new(pool.clone())),
            supplier_lpos: Arc::new(MySqlSupplierLpoRepository::new(pool.clone())),
            material_receipts: Arc::new(MySqlMaterialReceiptRepository::new(pool.clone())),
            receipt_returns: Arc::new(MySqlReceiptReturnRepository::new(pool.clone())),
            stock_issues: Arc::new(MySqlStockIssueRepository::new(pool.clone())),
            purchase_invoices: Arc::new(MySqlPurchaseInvoiceRepository::new(pool.clone())),
            email_logs: Arc::new(MySqlEmailLogRepository::new(pool.clone())),
        }
    }
}

/// Outbound providers; `None` means the simulated or rule-based fallback
#[derive(Clone, Default)]
pub struct Integrations {
    pub company: CompanyConfig,
    pub mailer: Option<Arc<dyn Mailer>>,
    pub email_fallback_on_error: bool,
    pub chat: Option<Arc<dyn ChatProvider>>,
}

impl Integrations {
    pub fn from_config(config: &Config) -> Result<Self> {
        let mailer: Option<Arc<dyn Mailer>> = if config.smtp.is_configured() {
            Some(Arc::new(SmtpMailer::new(&config.smtp)?))
        } else {
            tracing::warn!("SMTP_HOST not set, outgoing email will be simulated");
            None
        };

        let chat: Option<Arc<dyn ChatProvider>> = if config.ai.is_configured() {
            Some(Arc::new(OpenAiProvider::new(&config.ai)?))
        } else {
            tracing::warn!("OPENAI_API_KEY not set, assistant answers from rules");
            None
        };

        Ok(Self {
            company: config.company.clone(),
            mailer,
            email_fallback_on_error: config.smtp.fallback_on_error,
            chat,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub customers: Arc<PartyService>,
    pub suppliers: Arc<PartyService>,
    pub inventory: Arc<InventoryService>,
    pub enquiries: Arc<EnquiryService>,
    pub supplier_quotes: Arc<SupplierQuoteService>,
    pub quotations: Arc<QuotationService>,
    pub sales_orders: Arc<SalesOrderService>,
    pub supplier_lpos: Arc<SupplierLpoService>,
    pub material_receipts: Arc<MaterialReceiptService>,
    pub receipt_returns: Arc<ReceiptReturnService>,
    pub stock_issues: Arc<StockIssueService>,
    pub purchase_invoices: Arc<PurchaseInvoiceService>,
    pub catalog: Arc<DocumentCatalog>,
    pub email: Arc<EmailService>,
    pub assistant: Arc<AssistantService>,
}

impl AppState {
    pub fn build(repos: Repositories, integrations: Integrations) -> Self {
        let enquiries = Arc::new(EnquiryService::new(
            repos.enquiries.clone(),
            repos.customers.clone(),
        ));
        let sales_orders = Arc::new(SalesOrderService::new(
            repos.sales_orders.clone(),
            repos.customers.clone(),
        ));
        let quotations = Arc::new(QuotationService::new(
            repos.quotations.clone(),
            repos.customers.clone(),
            enquiries.clone(),
            sales_orders.clone(),
        ));
        let supplier_lpos = Arc::new(SupplierLpoService::new(
            repos.supplier_lpos.clone(),
            repos.suppliers.clone(),
            repos.supplier_quotes.clone(),
        ));

        let catalog = Arc::new(
            DocumentCatalog::new(PdfRenderer::new(integrations.company))
                .register(DocumentType::Quotation, quotations.clone())
                .register(DocumentType::SalesOrder, sales_orders.clone())
                .register(DocumentType::SupplierLpo, supplier_lpos.clone()),
        );

        Self {
            customers: Arc::new(PartyService::new(repos.customers.clone())),
            suppliers: Arc::new(PartyService::new(repos.suppliers.clone())),
            inventory: Arc::new(InventoryService::new(repos.inventory.clone())),
            supplier_quotes: Arc::new(SupplierQuoteService::new(
                repos.supplier_quotes.clone(),
                repos.suppliers.clone(),
                repos.enquiries.clone(),
            )),
            material_receipts: Arc::new(MaterialReceiptService::new(
                repos.material_receipts.clone(),
                repos.suppliers.clone(),
                repos.supplier_lpos.clone(),
                repos.inventory.clone(),
            )),
            receipt_returns: Arc::new(ReceiptReturnService::new(
                repos.receipt_returns.clone(),
                repos.material_receipts.clone(),
            )),
            stock_issues: Arc::new(StockIssueService::new(
                repos.stock_issues.clone(),
                repos.inventory.clone(),
                repos.sales_orders.clone(),
            )),
            purchase_invoices: Arc::new(PurchaseInvoiceService::new(
                repos.purchase_invoices.clone(),
                repos.suppliers.clone(),
                repos.supplier_lpos.clone(),
                repos.material_receipts.clone(),
            )),
            email: Arc::new(EmailService::new(
                integrations.mailer,
                repos.email_logs.clone(),
                catalog.clone(),
                integrations.email_fallback_on_error,
            )),
            assistant: Arc::new(AssistantService::new(integrations.chat)),
            enquiries,
            sales_orders,
            quotations,
            supplier_lpos,
            catalog,
        }
    }

    /// Mount the `/api` scope with every service as app data
    pub fn configure_api(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.inventory.clone()))
            .app_data(web::Data::new(self.enquiries.clone()))
            .app_data(web::Data::new(self.supplier_quotes.clone()))
            .app_data(web::Data::new(self.quotations.clone()))
            .app_data(web::Data::new(self.sales_orders.clone()))
            .app_data(web::Data::new(self.supplier_lpos.clone()))
            .app_data(web::Data::new(self.material_receipts.clone()))
            .app_data(web::Data::new(self.receipt_returns.clone()))
            .app_data(web::Data::new(self.stock_issues.clone()))
            .app_data(web::Data::new(self.purchase_invoices.clone()))
            .app_data(web::Data::new(self.catalog.clone()))
            .app_data(web::Data::new(self.email.clone()))
            .app_data(web::Data::new(self.assistant.clone()));

        cfg.service(
            web::scope("/api")
                .configure(parties::controllers::configure(
                    self.customers.clone(),
                    self.suppliers.clone(),
                ))
                .configure(inventory::controllers::configure)
                .configure(enquiries::controllers::configure)
                .configure(supplier_quotes::controllers::configure)
                .configure(quotations::controllers::configure)
                .configure(sales_orders::controllers::configure)
                .configure(supplier_lpos::controllers::configure)
                .configure(material_receipts::controllers::configure)
                .configure(receipt_returns::controllers::configure)
                .configure(stock_issues::controllers::configure)
                .configure(purchase_invoices::controllers::configure)
                .configure(email::controllers::configure)
                .configure(assistant::controllers::configure),
        );
    }
}
