//! # Repository Module
//!
//! Database repository implementations for the bazaar schema.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Engine operation                                                      │
//! │       │                                                                 │
//! │       │  db.orders().get_by_id(order_id)                               │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── insert(&self, conn, order)                                        │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── transition(&self, conn, ...)  ← gated on expected status          │
//! │  └── write_settlement(&self, ...)  ← gated on settlement_status        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Conditional Write Discipline:                                          │
//! │  • Every mutation includes the expected current state in its WHERE     │
//! │  • rows_affected() == 0 means a concurrent writer won; callers get     │
//! │    a StaleWrite error instead of a silent lost update                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`listing::ListingRepository`] - Listing CRUD and the inventory ledger
//! - [`order::OrderRepository`] - Order lifecycle and settlement writes
//! - [`agreement::AgreementRepository`] - Append-only consent records

pub mod agreement;
pub mod listing;
pub mod order;

use serde::de::DeserializeOwned;

use crate::error::{DbError, DbResult};

/// Decodes a stored enum label via the domain type's `parse`.
///
/// A label nothing recognizes means the row was edited out of band; that is
/// surfaced, never coerced to a default.
pub(crate) fn decode_enum<T>(
    column: &'static str,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> DbResult<T> {
    parse(raw).ok_or_else(|| DbError::decode(column, format!("unrecognized value '{raw}'")))
}

/// Decodes a JSON TEXT column into a value.
pub(crate) fn decode_json<T: DeserializeOwned>(column: &'static str, raw: &str) -> DbResult<T> {
    serde_json::from_str(raw).map_err(|e| DbError::decode(column, e.to_string()))
}

/// Decodes a nullable JSON TEXT column.
pub(crate) fn decode_json_opt<T: DeserializeOwned>(
    column: &'static str,
    raw: Option<String>,
) -> DbResult<Option<T>> {
    match raw {
        Some(text) => Ok(Some(decode_json(column, &text)?)),
        None => Ok(None),
    }
}

/// Encodes a value into a JSON string for storage.
pub(crate) fn encode_json<T: serde::Serialize>(
    column: &'static str,
    value: &T,
) -> DbResult<String> {
    serde_json::to_string(value).map_err(|e| DbError::decode(column, e.to_string()))
}
