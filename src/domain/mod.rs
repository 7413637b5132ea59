//! Domain module
//!
//! Core domain types and business rules: the order lifecycle, profiles
//! and roles, and notifications.

pub mod context;
pub mod error;
pub mod notification;
pub mod order;
pub mod profile;

pub use context::OperationContext;
pub use error::DomainError;
pub use notification::{Notification, NotificationKind};
pub use order::{Order, OrderStatus, Priority};
pub use profile::{Profile, Role};
