pub mod printable;

pub use printable::{DocumentType, PrintableDocument, PrintableLine};
