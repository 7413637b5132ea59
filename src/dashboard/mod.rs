//! Dashboard aggregation module
//!
//! Turns raw row snapshots into summary counters and a bounded activity
//! feed. The aggregation itself is pure: the `queries` submodule fetches,
//! the rest only reads and projects.

pub mod feed;
pub mod queries;
pub mod stats;
pub mod timeago;

pub use feed::{
    build_admin_feed, build_reception_feed, ActivityItem, ActivityKind, FeedSources,
    ReceptionFeedSources, ADMIN_FEED_LIMIT, RECEPTION_FEED_LIMIT,
};
pub use queries::{DashboardQueries, DashboardQueryError};
pub use stats::{OrderStats, StaffStats};
pub use timeago::relative_time;
