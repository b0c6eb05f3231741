//! PredictionStore / OrderStore: `rusqlite` + `tokio::sync::Mutex<Connection>`
//! wrappers.

pub mod order_store;
pub mod prediction_store;

pub use order_store::OrderStore;
pub use prediction_store::PredictionStore;
