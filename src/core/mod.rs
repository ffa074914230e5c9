pub mod error;
pub mod value;

pub use error::{Result, TxError};
pub use value::{Row, Value};
