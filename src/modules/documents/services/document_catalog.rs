use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{AppError, Result};
use crate::modules::documents::models::{DocumentType, PrintableDocument};
use crate::modules::documents::services::PdfRenderer;

/// A service that can describe one of its records for printing
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn printable(&self, id: &str) -> Result<PrintableDocument>;
}

/// Rendered PDF ready to download or attach
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub number: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Looks up printable documents by type and renders them
pub struct DocumentCatalog {
    renderer: PdfRenderer,
    sources: HashMap<DocumentType, Arc<dyn DocumentSource>>,
}

impl DocumentCatalog {
    pub fn new(renderer: PdfRenderer) -> Self {
        Self {
            renderer,
            sources: HashMap::new(),
        }
    }

    pub fn register(mut self, document_type: DocumentType, source: Arc<dyn DocumentSource>) -> Self {
        self.sources.insert(document_type, source);
        self
    }

    pub fn renderer(&self) -> &PdfRenderer {
        &self.renderer
    }

    pub fn render_printable(&self, document: &PrintableDocument) -> Result<RenderedDocument> {
        Ok(RenderedDocument {
            number: document.number.clone(),
            file_name: document.file_name(),
            bytes: self.renderer.render(document)?,
        })
    }

    pub async fn render(&self, document_type: DocumentType, id: &str) -> Result<RenderedDocument> {
        let source = self.sources.get(&document_type).ok_or_else(|| {
            AppError::validation(format!("Document type '{}' cannot be printed", document_type))
        })?;
        let document = source.printable(id).await?;
        self.render_printable(&document)
    }
}
