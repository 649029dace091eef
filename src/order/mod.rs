//! Order delivery: request models, body formatting, the channel router, and
//! the unified response/error contract.

pub mod dispatcher;
pub mod error;
pub mod format;
pub mod handlers;
pub mod models;

pub use dispatcher::OrderDispatcher;
pub use error::OrderError;
pub use models::{ContactMethod, DeliveryResult, OrderItem, SendOrderRequest};
