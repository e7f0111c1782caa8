pub mod controllers;
pub mod models;
pub mod services;

pub use models::{DocumentType, PrintableDocument, PrintableLine};
pub use services::{DocumentCatalog, DocumentSource, PdfRenderer, RenderedDocument};
