pub mod document_catalog;
pub mod pdf_renderer;

pub use document_catalog::{DocumentCatalog, DocumentSource, RenderedDocument};
pub use pdf_renderer::PdfRenderer;
