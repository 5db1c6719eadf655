//! Supplier data as served by the backend, and the per-municipality index
//! built from it once at startup.

pub mod index;
pub mod materials;
pub mod model;
pub mod states;

pub use index::*;
pub use materials::*;
pub use model::*;
pub use states::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The supplier list did not match the expected shape.
    Decode(String),
    /// A supplier references a state abbreviation outside the IBGE table.
    UnknownState { supplier_id: u64, abbr: String },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Decode(msg) => write!(f, "invalid supplier list: {msg}"),
            CatalogError::UnknownState { supplier_id, abbr } => {
                write!(f, "supplier {supplier_id} has unknown state {abbr:?}")
            }
        }
    }
}

impl std::error::Error for CatalogError {}
