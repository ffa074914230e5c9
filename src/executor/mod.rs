use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::core::{Result, Row, Value};

/// Capability to run statements, regardless of whether the backing
/// resource is a pool connection or an open transaction.
///
/// Both [`Pool`] and [`Transaction`] satisfy this shape, which is what
/// lets downstream code stay oblivious to whether it runs transactional.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Execute a statement that returns no rows. Yields the number of
    /// affected rows.
    async fn exec(&self, ctx: &Context, sql: &str, params: &[Value]) -> Result<u64>;

    /// Execute a statement and fetch all resulting rows.
    async fn query(&self, ctx: &Context, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Execute a statement expected to yield a single row.
    ///
    /// Implementations return [`TxError::NoRows`] when nothing matched.
    ///
    /// [`TxError::NoRows`]: crate::core::TxError::NoRows
    async fn query_row(&self, ctx: &Context, sql: &str, params: &[Value]) -> Result<Row>;
}

/// Capability to open transactions, on top of running plain statements.
///
/// The transaction manager borrows a pool; it never owns or closes it.
#[async_trait]
pub trait Pool: Executor {
    /// Begin a new transaction.
    async fn begin(&self, ctx: &Context) -> Result<Arc<dyn Transaction>>;
}

/// An open transaction: an [`Executor`] plus terminal actions.
///
/// `commit` and `rollback` move the transaction to a terminal state.
/// Calling either after the transaction is already terminal must yield
/// [`TxError::TxClosed`] and leave state untouched; the manager relies
/// on that to make its unconditional rollback safety net idempotent.
///
/// Handles are shared as `Arc<dyn Transaction>`, so implementations use
/// interior mutability for their pending state.
///
/// [`TxError::TxClosed`]: crate::core::TxError::TxClosed
#[async_trait]
pub trait Transaction: Executor {
    async fn commit(&self, ctx: &Context) -> Result<()>;
    async fn rollback(&self, ctx: &Context) -> Result<()>;
}
