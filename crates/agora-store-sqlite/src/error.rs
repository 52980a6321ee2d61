//! Classification of raw SQLite errors into the domain taxonomy.
//!
//! This is the only place in the workspace that inspects SQLite result
//! codes. Each write path passes the domain message that a constraint hit
//! means for *its* statement; anything unrecognised is surfaced as
//! `Error::Storage` unchanged.

use agora_core::Error;
use rusqlite::ffi;

/// Domain meanings for the constraint violations a statement can produce.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Constraints {
  /// Message for a UNIQUE / PRIMARY KEY hit (becomes `Error::Conflict`).
  pub unique:      Option<&'static str>,
  /// Message for a FOREIGN KEY miss (becomes `Error::Validation`).
  pub foreign_key: Option<&'static str>,
}

pub(crate) fn classify(err: tokio_rusqlite::Error, on: Constraints) -> Error {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, _)) = &err {
    match code.extended_code {
      ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
        if let Some(msg) = on.unique {
          return Error::conflict(msg);
        }
      }
      ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
        if let Some(msg) = on.foreign_key {
          return Error::validation(msg);
        }
      }
      _ => {}
    }
  }
  Error::storage(err)
}

/// Shorthand for read paths, where no constraint can fire.
pub(crate) fn storage(err: tokio_rusqlite::Error) -> Error {
  Error::storage(err)
}
