// ============================================================================
// txscope Library
// ============================================================================
//
// Context-scoped transaction management for code that issues database
// operations through a shared connection pool. A single `wrap` call begins
// a transaction, publishes it into a derived `Context` so any code running
// underneath can pick it up without threading a handle through every
// signature, and commits or rolls back based on the outcome of the wrapped
// closure. The transaction is never left open, including when the wrapped
// future panics.
//
// ============================================================================

pub mod context;
pub mod core;
pub mod executor;
pub mod transaction;

// Re-export main types for convenience
pub use crate::context::Context;
pub use crate::core::{Result, Row, TxError, Value};
pub use crate::executor::{Executor, Pool, Transaction};
pub use crate::transaction::{Extractor, TxManager};
