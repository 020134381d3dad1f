//! Facades over the two external stores.
//!
//! Both follow the same two-phase lifecycle: `create` builds an unconnected
//! facade synchronously and `connect` resolves the connection once. Until the
//! connection is up, and forever after a failed attempt, data operations run
//! in degraded mode: counts read as 0, lookups read as `None`, writes and
//! deletes are dropped. No error ever reaches the caller.

mod document_store;
pub use document_store::*;

mod key_value_store;
pub use key_value_store::*;

use shared::Error;

/// Connection failures always surface as `Error::Connection`.
fn as_connection_error(error: Error) -> Error {
    match error {
        Error::Connection(_) => error,
        other => Error::Connection(other.to_string()),
    }
}
