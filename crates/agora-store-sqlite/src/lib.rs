//! SQLite backend for the Agora forum store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Raw driver errors are
//! classified into the `agora_core` taxonomy at this crate's boundary;
//! callers never see SQLite result codes.

mod encode;
mod error;
mod schema;
mod store;

pub use store::SqliteStore;

#[cfg(test)]
mod tests;
