//! Service layer for the disease registry.
//! - Separates business logic from data access.
//! - Keeps the search index consistent with the database.
//! - Reuses validation and entity definitions in `models` crate.

pub mod errors;
pub mod pagination;
pub mod disease;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
