//! Data loading and the in-memory tabular representation.

mod loader;
mod table;

pub use loader::{Loader, LoaderConfig};
pub use table::{ColumnType, Dataset, SourceMetadata};
