// ============================================================================
// Transaction Manager
// ============================================================================

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::context::Context;
use crate::core::{Result, TxError};
use crate::executor::{Executor, Pool, Transaction};

/// Private context binding for the active transaction. The type itself is
/// the lookup key, so no code outside this module can read or shadow it.
struct ActiveTx(Arc<dyn Transaction>);

/// Resolves the correct executor for a context: the transaction bound by
/// an enclosing [`TxManager::wrap`] call if there is one, otherwise the
/// raw pool. Resolution never fails; running outside a transaction is a
/// valid, common case.
pub trait Extractor: Send + Sync {
    fn extract_executor(&self, ctx: &Context) -> Arc<dyn Executor>;
}

/// Scopes a database transaction around an arbitrary unit of work.
///
/// The manager holds only the pool reference; all per-call state lives in
/// the transaction handle and the derived [`Context`], so concurrent
/// `wrap` calls are fully independent and need no locking here.
///
/// # Examples
///
/// ```ignore
/// let manager = Arc::new(TxManager::init(Some(pool))?);
/// let repo = manager.extractor();
///
/// manager
///     .wrap(&ctx, |ctx| async move {
///         let db = repo.extract_executor(&ctx);
///         db.exec(&ctx, "insert accounts", &["alice".into()]).await?;
///         db.exec(&ctx, "insert audit", &["created alice".into()]).await?;
///         Ok(())
///     })
///     .await?;
/// ```
///
/// Nesting caveat: if the work closure calls `wrap` again with the context
/// it was given, the inner call begins a new, independent transaction
/// against the pool and shadows the binding for its own subtree. Callers
/// that need single-transaction semantics across the whole call tree must
/// not nest `wrap`.
pub struct TxManager {
    pool: Arc<dyn Pool>,
}

impl TxManager {
    /// Create a manager over `pool`.
    ///
    /// Fails with [`TxError::PoolRequired`] when no pool is supplied; the
    /// manager is never usable without one.
    pub fn init<P>(pool: Option<Arc<P>>) -> Result<TxManager>
    where
        P: Pool + 'static,
    {
        match pool {
            Some(pool) => Ok(TxManager { pool }),
            None => Err(TxError::PoolRequired),
        }
    }

    /// Run `work` inside a single database transaction.
    ///
    /// Begins a transaction against the pool, binds it into a context
    /// derived from `ctx`, and invokes `work` with that context. When
    /// `work` returns `Ok` the transaction is committed; when it returns
    /// an error the transaction is rolled back and the error comes back
    /// wrapped as [`TxError::Work`]. A rollback attempt runs on every
    /// exit path, so the transaction is never left open; a panic of the
    /// work future is resumed after the rollback.
    ///
    /// Rollback errors never become the call's result. After a successful
    /// commit the safety-net rollback reports [`TxError::TxClosed`],
    /// which is expected and suppressed; anything else is logged through
    /// the diagnostic side channel only.
    ///
    /// Nothing is retried internally. A caller that wants a retry calls
    /// `wrap` again.
    pub async fn wrap<F, Fut>(&self, ctx: &Context, work: F) -> Result<()>
    where
        F: FnOnce(Context) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let tx = self
            .pool
            .begin(ctx)
            .await
            .map_err(|e| TxError::Begin(Box::new(e)))?;

        let scoped = ctx.bind(ActiveTx(Arc::clone(&tx)));

        // Both constructing and polling the work future run behind a panic
        // boundary so the rollback safety net fires on every exit path
        // before control leaves wrap.
        let outcome = match std::panic::catch_unwind(AssertUnwindSafe(move || work(scoped))) {
            Ok(fut) => AssertUnwindSafe(fut).catch_unwind().await,
            Err(payload) => Err(payload),
        };

        match outcome {
            Err(payload) => {
                finish_rollback(ctx, tx.as_ref()).await;
                std::panic::resume_unwind(payload);
            }
            Ok(Err(err)) => {
                finish_rollback(ctx, tx.as_ref()).await;
                Err(TxError::Work(Box::new(err)))
            }
            Ok(Ok(())) => {
                let committed = tx.commit(ctx).await;
                // After a successful commit this sees TxClosed and stays
                // silent; after a failed commit it is the real rollback.
                finish_rollback(ctx, tx.as_ref()).await;
                committed.map_err(|e| TxError::Commit(Box::new(e)))
            }
        }
    }

    /// The capability downstream code uses to resolve its executor.
    /// Idempotent and infallible; the manager is its own extractor.
    pub fn extractor(self: &Arc<Self>) -> Arc<dyn Extractor> {
        Arc::clone(self) as Arc<dyn Extractor>
    }
}

impl Extractor for TxManager {
    fn extract_executor(&self, ctx: &Context) -> Arc<dyn Executor> {
        match ctx.lookup::<ActiveTx>() {
            Some(active) => Arc::clone(&active.0) as Arc<dyn Executor>,
            None => Arc::clone(&self.pool) as Arc<dyn Executor>,
        }
    }
}

/// Best-effort terminal rollback. Outcomes surface only through the
/// diagnostic side channel; the call's real result is already determined
/// by begin/commit/work at this point.
async fn finish_rollback(ctx: &Context, tx: &dyn Transaction) {
    match tx.rollback(ctx).await {
        Ok(()) => tracing::info!("transaction rolled back"),
        Err(err) if err.is_closed() => {
            tracing::debug!("rollback skipped: transaction already closed")
        }
        Err(err) => tracing::error!(error = %err, "failed to roll back transaction"),
    }
}
