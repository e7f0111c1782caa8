pub mod amounts;
pub mod currency;
pub mod error;
pub mod line_items;
pub mod numbering;
pub mod pagination;
pub mod status;
pub mod traits;
pub mod validation;

pub use amounts::{DocumentTotals, LineAmounts};
pub use currency::Currency;
pub use error::{AppError, FieldError, Result};
pub use line_items::{LineItemInput, LineTable, PricedLine};
pub use numbering::DocumentSeries;
pub use pagination::ListQuery;
pub use status::StatusFlow;
