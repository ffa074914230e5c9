use thiserror::Error;

#[derive(Error, Debug)]
pub enum TxError {
    #[error("a connection pool is required to create a transaction manager")]
    PoolRequired,

    #[error("cannot start transaction: {0}")]
    Begin(#[source] Box<TxError>),

    #[error("error when executing transaction closure: {0}")]
    Work(#[source] Box<TxError>),

    #[error("error when committing transaction: {0}")]
    Commit(#[source] Box<TxError>),

    #[error("transaction is already closed")]
    TxClosed,

    #[error("execution error: {0}")]
    Execution(String),

    #[error("query returned no rows")]
    NoRows,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TxError>;

impl TxError {
    /// True when the error is the recognizable "transaction already closed"
    /// result a handle yields once it has reached a terminal state.
    pub fn is_closed(&self) -> bool {
        matches!(self, TxError::TxClosed)
    }

    /// The underlying cause for the classified `Begin`/`Work`/`Commit`
    /// wrappers, if any.
    pub fn cause(&self) -> Option<&TxError> {
        match self {
            TxError::Begin(e) | TxError::Work(e) | TxError::Commit(e) => Some(e),
            _ => None,
        }
    }
}
