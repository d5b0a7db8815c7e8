//! Lending domain: catalog, roster, records and their lifecycle
//!
//! Everything in here is synchronous and in-memory. The service layer wraps
//! a `LibraryStore` in a lock and adds logging.

pub mod ids;
pub mod query;
pub mod store;

pub use store::LibraryStore;
