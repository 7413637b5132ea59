//! Command Handlers module
//!
//! Handlers that orchestrate state-changing operations: order intake and
//! lifecycle transitions. Reads go straight through the API routes.

mod commands;
mod create_order_handler;
mod order_status_handler;

pub use commands::*;
pub use create_order_handler::CreateOrderHandler;
pub use order_status_handler::OrderStatusHandler;
