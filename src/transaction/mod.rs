pub mod manager;

pub use manager::{Extractor, TxManager};
