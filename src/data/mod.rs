//! Entity storage
//!
//! SQLite-backed records, the store contract the league logic reads and
//! writes through, and validation of new records.

pub mod database;
pub mod store;
pub mod validation;

pub use database::Database;
pub use store::EntityStore;
pub use validation::Vocabulary;
