//! Credential hashing and session management for the Agora forum core.
//!
//! Two pieces with a deliberate boundary between them: [`credentials`] only
//! ever sees plaintext and PHC hash strings (no I/O), while the
//! [`SessionManager`] owns session rows in the store and consumes the
//! credential functions without depending on their internals.

pub mod credentials;
pub mod session;

pub use session::SessionManager;
