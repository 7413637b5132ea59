//! Activity feed builder
//!
//! Merges heterogeneous source collections (orders, registrations, logins,
//! deliveries, inquiries) into one bounded feed of display-ready items.
//!
//! Feed order is construction order: orders first, then registrations,
//! then logins, then deliveries, truncated at the end. Sources are not
//! interleaved chronologically.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Notification, Order, OrderStatus, Priority, Profile, Role};

use super::timeago::relative_time;

/// Feed length cap for the administrator dashboard
pub const ADMIN_FEED_LIMIT: usize = 15;

/// Feed length cap for the reception dashboard
pub const RECEPTION_FEED_LIMIT: usize = 8;

/// At most this many login events enter the feed, regardless of the
/// overall feed cap
const LOGIN_EVENT_LIMIT: usize = 10;

const UNKNOWN_CLIENT: &str = "unknown client";
const UNKNOWN_TECHNICIAN: &str = "the workshop";

// =========================================================================
// Feed item
// =========================================================================

/// Category tag of a feed item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    // Administrator feed
    Order,
    Payment,
    User,
    Login,
    Delivery,
    // Reception feed
    NewOrder,
    OrderCompleted,
    PaymentReceived,
    ClientRegistered,
    ClientInquiry,
    DeliveryReady,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Order => "order",
            ActivityKind::Payment => "payment",
            ActivityKind::User => "user",
            ActivityKind::Login => "login",
            ActivityKind::Delivery => "delivery",
            ActivityKind::NewOrder => "new_order",
            ActivityKind::OrderCompleted => "order_completed",
            ActivityKind::PaymentReceived => "payment_received",
            ActivityKind::ClientRegistered => "client_registered",
            ActivityKind::ClientInquiry => "client_inquiry",
            ActivityKind::DeliveryReady => "delivery_ready",
        }
    }
}

/// One display-ready entry in an activity feed.
///
/// `id` is synthesized from the source kind and source row id, so ids stay
/// unique even when rows from different tables share an identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityItem {
    pub id: String,
    pub kind: ActivityKind,
    pub message: String,
    pub time_ago: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
}

// =========================================================================
// Administrator feed
// =========================================================================

/// Source collections for the administrator feed. Each defaults to empty;
/// a failed upstream fetch degrades to a partial feed, never an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedSources<'a> {
    /// Recent orders, newest first as fetched
    pub recent_orders: &'a [Order],
    /// Recently registered profiles (only clients produce items)
    pub new_registrations: &'a [Profile],
    /// Recent sign-ins, newest first; only profiles with a login stamp
    pub recent_logins: &'a [Profile],
    /// Orders recently moved to delivered
    pub delivered_orders: &'a [Order],
}

/// Build the administrator activity feed, capped at [`ADMIN_FEED_LIMIT`].
///
/// A single order can fan out to several items: its "new" or "completed"
/// entry plus a payment entry when it carries a non-zero total and has
/// moved past intake. That fan-out is intentional.
pub fn build_admin_feed(sources: &FeedSources<'_>, now: DateTime<Utc>) -> Vec<ActivityItem> {
    let mut items = Vec::new();

    for order in sources.recent_orders {
        let client = client_label(order);

        if order.status == OrderStatus::Received {
            items.push(ActivityItem {
                id: format!("order-new-{}", order.id),
                kind: ActivityKind::Order,
                message: format!("New order {} from {}", order.order_number, client),
                time_ago: relative_time(order.created_at, now),
                priority: Some(order.priority),
                order_id: Some(order.id),
                client_id: Some(order.client_id),
            });
        }

        if order.status == OrderStatus::Completed {
            items.push(ActivityItem {
                id: format!("order-done-{}", order.id),
                kind: ActivityKind::Order,
                message: format!(
                    "Order {} for {} is ready for pickup",
                    order.order_number, client
                ),
                time_ago: relative_time(order.updated_at, now),
                priority: Some(order.priority),
                order_id: Some(order.id),
                client_id: Some(order.client_id),
            });
        }

        // Payment entries are independent of the status entries above
        if order.has_payment() && order.status != OrderStatus::Received {
            if let Some(total) = order.total {
                items.push(ActivityItem {
                    id: format!("payment-{}", order.id),
                    kind: ActivityKind::Payment,
                    message: format!(
                        "Payment of ${} recorded for order {}",
                        total, order.order_number
                    ),
                    time_ago: relative_time(order.updated_at, now),
                    priority: None,
                    order_id: Some(order.id),
                    client_id: Some(order.client_id),
                });
            }
        }
    }

    for profile in sources.new_registrations {
        if profile.role != Role::Client {
            continue;
        }
        items.push(ActivityItem {
            id: format!("client-{}", profile.id),
            kind: ActivityKind::User,
            message: format!("New client {} registered", profile.display_name),
            time_ago: relative_time(profile.created_at, now),
            priority: None,
            order_id: None,
            client_id: Some(profile.id),
        });
    }

    for profile in sources.recent_logins.iter().take(LOGIN_EVENT_LIMIT) {
        let stamp = profile.last_login_at.unwrap_or(profile.created_at);
        items.push(ActivityItem {
            id: format!("login-{}", profile.id),
            kind: ActivityKind::Login,
            message: format!("{} ({}) signed in", profile.display_name, profile.role),
            time_ago: relative_time(stamp, now),
            priority: None,
            order_id: None,
            client_id: None,
        });
    }

    for order in sources.delivered_orders {
        items.push(ActivityItem {
            id: format!("delivery-{}", order.id),
            kind: ActivityKind::Delivery,
            message: format!(
                "Order {} delivered by {}",
                order.order_number,
                technician_label(order)
            ),
            time_ago: relative_time(order.updated_at, now),
            priority: None,
            order_id: Some(order.id),
            client_id: Some(order.client_id),
        });
    }

    items.truncate(ADMIN_FEED_LIMIT);
    items
}

// =========================================================================
// Reception feed
// =========================================================================

/// Source collections for the reception feed
#[derive(Debug, Clone, Copy, Default)]
pub struct ReceptionFeedSources<'a> {
    pub recent_orders: &'a [Order],
    pub new_registrations: &'a [Profile],
    /// Unread client-inquiry notifications
    pub inquiries: &'a [Notification],
    pub delivered_orders: &'a [Order],
}

/// Build the reception activity feed, capped at [`RECEPTION_FEED_LIMIT`].
///
/// Same construction-order discipline as the administrator feed, with
/// reception-facing category tags and client inquiries mixed in.
pub fn build_reception_feed(
    sources: &ReceptionFeedSources<'_>,
    now: DateTime<Utc>,
) -> Vec<ActivityItem> {
    let mut items = Vec::new();

    for order in sources.recent_orders {
        let client = client_label(order);

        if order.status == OrderStatus::Received {
            items.push(ActivityItem {
                id: format!("new-order-{}", order.id),
                kind: ActivityKind::NewOrder,
                message: format!("Order {} checked in for {}", order.order_number, client),
                time_ago: relative_time(order.created_at, now),
                priority: Some(order.priority),
                order_id: Some(order.id),
                client_id: Some(order.client_id),
            });
        }

        if order.status == OrderStatus::Completed {
            items.push(ActivityItem {
                id: format!("completed-{}", order.id),
                kind: ActivityKind::OrderCompleted,
                message: format!(
                    "Order {} is ready, call {}",
                    order.order_number, client
                ),
                time_ago: relative_time(order.updated_at, now),
                priority: Some(order.priority),
                order_id: Some(order.id),
                client_id: Some(order.client_id),
            });
        }

        if order.has_payment() && order.status != OrderStatus::Received {
            if let Some(total) = order.total {
                items.push(ActivityItem {
                    id: format!("payment-received-{}", order.id),
                    kind: ActivityKind::PaymentReceived,
                    message: format!("${} received for order {}", total, order.order_number),
                    time_ago: relative_time(order.updated_at, now),
                    priority: None,
                    order_id: Some(order.id),
                    client_id: Some(order.client_id),
                });
            }
        }
    }

    for profile in sources.new_registrations {
        if profile.role != Role::Client {
            continue;
        }
        items.push(ActivityItem {
            id: format!("registered-{}", profile.id),
            kind: ActivityKind::ClientRegistered,
            message: format!("New client {} registered", profile.display_name),
            time_ago: relative_time(profile.created_at, now),
            priority: None,
            order_id: None,
            client_id: Some(profile.id),
        });
    }

    for inquiry in sources.inquiries {
        items.push(ActivityItem {
            id: format!("inquiry-{}", inquiry.id),
            kind: ActivityKind::ClientInquiry,
            message: inquiry.message.clone(),
            time_ago: relative_time(inquiry.created_at, now),
            priority: Some(inquiry.priority),
            order_id: inquiry.order_id,
            client_id: inquiry.client_id,
        });
    }

    for order in sources.delivered_orders {
        items.push(ActivityItem {
            id: format!("delivery-ready-{}", order.id),
            kind: ActivityKind::DeliveryReady,
            message: format!(
                "Order {} handed over to {}",
                order.order_number, client_label(order)
            ),
            time_ago: relative_time(order.updated_at, now),
            priority: None,
            order_id: Some(order.id),
            client_id: Some(order.client_id),
        });
    }

    items.truncate(RECEPTION_FEED_LIMIT);
    items
}

fn client_label(order: &Order) -> &str {
    order.client_name.as_deref().unwrap_or(UNKNOWN_CLIENT)
}

fn technician_label(order: &Order) -> &str {
    order
        .technician_name
        .as_deref()
        .unwrap_or(UNKNOWN_TECHNICIAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        "2026-08-29T12:00:00Z".parse().unwrap()
    }

    fn order(status: OrderStatus, number: &str, total: Option<rust_decimal::Decimal>) -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: number.to_string(),
            status,
            priority: Priority::Normal,
            issue: "no power".to_string(),
            total,
            client_id: Uuid::new_v4(),
            technician_id: None,
            client_name: Some("Maria".to_string()),
            technician_name: None,
            created_at: now() - Duration::minutes(5),
            updated_at: now() - Duration::minutes(2),
        }
    }

    fn profile(role: Role, name: &str) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            display_name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role,
            is_active: true,
            created_at: now() - Duration::hours(1),
            last_login_at: Some(now() - Duration::minutes(10)),
        }
    }

    #[test]
    fn test_received_order_with_zero_amount_yields_one_item() {
        let orders = vec![order(OrderStatus::Received, "ORD-1", Some(dec!(0)))];
        let sources = FeedSources {
            recent_orders: &orders,
            ..Default::default()
        };

        let feed = build_admin_feed(&sources, now());
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].kind, ActivityKind::Order);
        assert!(feed[0].message.contains("ORD-1"));
        assert!(feed[0].message.contains("Maria"));
    }

    #[test]
    fn test_completed_order_with_amount_yields_two_items() {
        let orders = vec![order(OrderStatus::Completed, "ORD-2", Some(dec!(150)))];
        let sources = FeedSources {
            recent_orders: &orders,
            ..Default::default()
        };

        let feed = build_admin_feed(&sources, now());
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].kind, ActivityKind::Order);
        assert_eq!(feed[1].kind, ActivityKind::Payment);
        assert!(feed[1].message.contains("150"));
    }

    #[test]
    fn test_empty_sources_yield_empty_feed() {
        let feed = build_admin_feed(&FeedSources::default(), now());
        assert!(feed.is_empty());
    }

    #[test]
    fn test_missing_client_name_falls_back() {
        let mut o = order(OrderStatus::Received, "ORD-3", None);
        o.client_name = None;
        let orders = vec![o];
        let sources = FeedSources {
            recent_orders: &orders,
            ..Default::default()
        };

        let feed = build_admin_feed(&sources, now());
        assert!(feed[0].message.contains("unknown client"));
    }

    #[test]
    fn test_missing_technician_name_falls_back() {
        let delivered = vec![order(OrderStatus::Delivered, "ORD-4", None)];
        let sources = FeedSources {
            delivered_orders: &delivered,
            ..Default::default()
        };

        let feed = build_admin_feed(&sources, now());
        assert!(feed[0].message.contains("the workshop"));
    }

    #[test]
    fn test_non_client_registrations_are_skipped() {
        let registrations = vec![
            profile(Role::Client, "Ana"),
            profile(Role::Technician, "Bruno"),
            profile(Role::Admin, "Carla"),
        ];
        let sources = FeedSources {
            new_registrations: &registrations,
            ..Default::default()
        };

        let feed = build_admin_feed(&sources, now());
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].kind, ActivityKind::User);
        assert!(feed[0].message.contains("Ana"));
    }

    #[test]
    fn test_login_events_capped_at_ten() {
        let logins: Vec<Profile> = (0..20)
            .map(|i| profile(Role::Technician, &format!("Tech{}", i)))
            .collect();
        let sources = FeedSources {
            recent_logins: &logins,
            ..Default::default()
        };

        let feed = build_admin_feed(&sources, now());
        assert_eq!(feed.len(), 10);
        assert!(feed.iter().all(|item| item.kind == ActivityKind::Login));
        // First ten in supplied order
        assert!(feed[0].message.contains("Tech0"));
        assert!(feed[9].message.contains("Tech9"));
    }

    #[test]
    fn test_feed_truncates_to_cap_in_construction_order() {
        // 10 received orders (10 items) + 5 client registrations + 10 logins
        // + 3 deliveries = 28 candidates; only the first 15 survive.
        let orders: Vec<Order> = (0..10)
            .map(|i| order(OrderStatus::Received, &format!("ORD-{}", i), None))
            .collect();
        let registrations: Vec<Profile> = (0..5)
            .map(|i| profile(Role::Client, &format!("Client{}", i)))
            .collect();
        let logins: Vec<Profile> = (0..10)
            .map(|i| profile(Role::Technician, &format!("Tech{}", i)))
            .collect();
        let delivered: Vec<Order> = (0..3)
            .map(|i| order(OrderStatus::Delivered, &format!("ORD-D{}", i), None))
            .collect();

        let sources = FeedSources {
            recent_orders: &orders,
            new_registrations: &registrations,
            recent_logins: &logins,
            delivered_orders: &delivered,
        };

        let feed = build_admin_feed(&sources, now());
        assert_eq!(feed.len(), ADMIN_FEED_LIMIT);
        // Orders' items first, then registrations; logins and deliveries
        // fall off the end.
        assert!(feed[..10].iter().all(|i| i.kind == ActivityKind::Order));
        assert!(feed[10..].iter().all(|i| i.kind == ActivityKind::User));
    }

    #[test]
    fn test_item_ids_unique_across_source_kinds() {
        let shared_id = Uuid::new_v4();
        let mut o = order(OrderStatus::Completed, "ORD-9", Some(dec!(80)));
        o.id = shared_id;
        let mut login = profile(Role::Client, "Maria");
        login.id = shared_id;
        let mut registration = profile(Role::Client, "Maria");
        registration.id = shared_id;
        let mut delivered = order(OrderStatus::Delivered, "ORD-9", None);
        delivered.id = shared_id;

        let orders = vec![o];
        let registrations = vec![registration];
        let logins = vec![login];
        let deliveries = vec![delivered];
        let sources = FeedSources {
            recent_orders: &orders,
            new_registrations: &registrations,
            recent_logins: &logins,
            delivered_orders: &deliveries,
        };

        let feed = build_admin_feed(&sources, now());
        let ids: HashSet<&str> = feed.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), feed.len());
    }

    #[test]
    fn test_builder_is_deterministic() {
        let orders = vec![
            order(OrderStatus::Received, "ORD-1", None),
            order(OrderStatus::Completed, "ORD-2", Some(dec!(150))),
        ];
        let registrations = vec![profile(Role::Client, "Ana")];
        let sources = FeedSources {
            recent_orders: &orders,
            new_registrations: &registrations,
            ..Default::default()
        };

        let first = build_admin_feed(&sources, now());
        let second = build_admin_feed(&sources, now());
        assert_eq!(first, second);
    }

    #[test]
    fn test_in_progress_order_with_amount_yields_payment_only() {
        // Not newly received, not completed: only the payment entry remains
        let orders = vec![order(OrderStatus::InProgress, "ORD-5", Some(dec!(60)))];
        let sources = FeedSources {
            recent_orders: &orders,
            ..Default::default()
        };

        let feed = build_admin_feed(&sources, now());
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].kind, ActivityKind::Payment);
    }

    #[test]
    fn test_reception_feed_cap_and_kinds() {
        let orders: Vec<Order> = (0..6)
            .map(|i| order(OrderStatus::Received, &format!("ORD-{}", i), None))
            .collect();
        let registrations = vec![profile(Role::Client, "Ana"), profile(Role::Client, "Bea")];
        let inquiries = vec![Notification {
            id: Uuid::new_v4(),
            kind: crate::domain::NotificationKind::ClientInquiry,
            message: "Maria asked about ORD-1".to_string(),
            priority: Priority::Normal,
            is_read: false,
            order_id: None,
            client_id: None,
            created_at: now() - Duration::minutes(15),
        }];

        let sources = ReceptionFeedSources {
            recent_orders: &orders,
            new_registrations: &registrations,
            inquiries: &inquiries,
            delivered_orders: &[],
        };

        let feed = build_reception_feed(&sources, now());
        assert_eq!(feed.len(), RECEPTION_FEED_LIMIT);
        assert!(feed[..6].iter().all(|i| i.kind == ActivityKind::NewOrder));
        assert_eq!(feed[6].kind, ActivityKind::ClientRegistered);
        assert_eq!(feed[7].kind, ActivityKind::ClientRegistered);
    }

    #[test]
    fn test_reception_ids_do_not_collide_with_shared_row_ids() {
        let shared_id = Uuid::new_v4();
        let mut o = order(OrderStatus::Completed, "ORD-7", Some(dec!(20)));
        o.id = shared_id;
        let mut delivered = order(OrderStatus::Delivered, "ORD-7", None);
        delivered.id = shared_id;

        let orders = vec![o];
        let deliveries = vec![delivered];
        let sources = ReceptionFeedSources {
            recent_orders: &orders,
            delivered_orders: &deliveries,
            ..Default::default()
        };

        let feed = build_reception_feed(&sources, now());
        let ids: HashSet<&str> = feed.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), feed.len());
    }
}
