/// Database model definitions.
pub mod models;
/// Registry persistence backends.
pub mod registry_store;
/// Storage abstraction layer for database operations.
pub mod storage;
