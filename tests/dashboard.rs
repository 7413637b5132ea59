//! Dashboard aggregation integration tests
//!
//! Exercises the full pure pipeline the dashboard endpoints run after
//! fetching: counters, relative-time formatting, and feed construction.

use chrono::{DateTime, Duration, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use fixflow::dashboard::{
    build_admin_feed, build_reception_feed, relative_time, ActivityKind, FeedSources, OrderStats,
    ReceptionFeedSources, StaffStats, ADMIN_FEED_LIMIT,
};
use fixflow::domain::{Notification, NotificationKind};
use fixflow::{Order, OrderStatus, Priority, Profile, Role};

fn base_time() -> DateTime<Utc> {
    "2026-08-29T12:00:00Z".parse().unwrap()
}

fn order(status: OrderStatus, number: &str, minutes_ago: i64) -> Order {
    Order {
        id: Uuid::new_v4(),
        order_number: number.to_string(),
        status,
        priority: Priority::Normal,
        issue: "screen flickers".to_string(),
        total: None,
        client_id: Uuid::new_v4(),
        technician_id: None,
        client_name: Some("Maria Lopez".to_string()),
        technician_name: Some("Jo Chen".to_string()),
        created_at: base_time() - Duration::minutes(minutes_ago),
        updated_at: base_time() - Duration::minutes(minutes_ago),
    }
}

fn client(name: &str, hours_ago: i64) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        display_name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        role: Role::Client,
        is_active: true,
        created_at: base_time() - Duration::hours(hours_ago),
        last_login_at: None,
    }
}

#[test]
fn test_admin_dashboard_pipeline_end_to_end() {
    let mut completed = order(OrderStatus::Completed, "ORD-000100", 90);
    completed.total = Some(dec!(150.00));
    let received = order(OrderStatus::Received, "ORD-000101", 1);
    let in_progress = order(OrderStatus::InProgress, "ORD-000102", 30);
    let delivered = order(OrderStatus::Delivered, "ORD-000103", 1440);

    let all_orders = vec![
        completed.clone(),
        received.clone(),
        in_progress.clone(),
        delivered.clone(),
    ];

    let stats = OrderStats::compute(&all_orders);
    assert_eq!(stats.total, 4);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.delivered, 1);
    assert_eq!(stats.in_progress, 1);
    assert_eq!(stats.pending, 1);
    // Only the completed order carries a total
    assert_eq!(stats.revenue, dec!(150.00));

    let staff = vec![
        client("Maria Lopez", 2),
        Profile {
            role: Role::Technician,
            ..client("Jo Chen", 5)
        },
    ];
    let staff_stats = StaffStats::compute(&staff);
    assert_eq!(staff_stats.total_clients, 1);
    assert_eq!(staff_stats.total_technicians, 1);

    let recent = vec![received.clone(), completed.clone()];
    let delivered_orders = vec![delivered.clone()];
    let registrations = vec![client("Ana Silva", 1)];
    let sources = FeedSources {
        recent_orders: &recent,
        new_registrations: &registrations,
        recent_logins: &[],
        delivered_orders: &delivered_orders,
    };

    let feed = build_admin_feed(&sources, base_time());

    // received -> 1 item, completed with total -> 2 items,
    // registration -> 1, delivery -> 1
    assert_eq!(feed.len(), 5);
    assert_eq!(feed[0].kind, ActivityKind::Order);
    assert_eq!(feed[0].time_ago, "1 minute ago");
    assert_eq!(feed[1].kind, ActivityKind::Order);
    assert_eq!(feed[2].kind, ActivityKind::Payment);
    assert!(feed[2].message.contains("150"));
    assert_eq!(feed[3].kind, ActivityKind::User);
    assert_eq!(feed[4].kind, ActivityKind::Delivery);
    assert_eq!(feed[4].time_ago, "1 day ago");
}

#[test]
fn test_empty_snapshot_produces_zero_dashboard() {
    let stats = OrderStats::compute(&[]);
    assert_eq!(stats, OrderStats::default());

    let staff = StaffStats::compute(&[]);
    assert_eq!(staff.total_clients, 0);
    assert_eq!(staff.total_technicians, 0);

    let feed = build_admin_feed(&FeedSources::default(), base_time());
    assert!(feed.is_empty());

    let reception = build_reception_feed(&ReceptionFeedSources::default(), base_time());
    assert!(reception.is_empty());
}

#[test]
fn test_relative_time_thresholds() {
    let now = base_time();
    assert_eq!(relative_time(now - Duration::seconds(30), now), "less than 1 minute ago");
    assert_eq!(relative_time(now - Duration::seconds(90), now), "2 minutes ago");
    assert_eq!(relative_time(now - Duration::minutes(59), now), "59 minutes ago");
    assert_eq!(relative_time(now - Duration::hours(1), now), "1 hour ago");
    assert_eq!(relative_time(now - Duration::hours(2), now), "2 hours ago");
    assert_eq!(relative_time(now - Duration::days(3), now), "3 days ago");
    // Clock skew saturates instead of going negative
    assert_eq!(relative_time(now + Duration::minutes(5), now), "less than 1 minute ago");
}

#[test]
fn test_admin_feed_never_exceeds_cap() {
    let orders: Vec<Order> = (0..40)
        .map(|i| order(OrderStatus::Received, &format!("ORD-{:06}", i), i))
        .collect();
    let sources = FeedSources {
        recent_orders: &orders,
        ..Default::default()
    };

    let feed = build_admin_feed(&sources, base_time());
    assert_eq!(feed.len(), ADMIN_FEED_LIMIT);
}

#[test]
fn test_reception_feed_includes_inquiries() {
    let inquiry = Notification {
        id: Uuid::new_v4(),
        kind: NotificationKind::ClientInquiry,
        message: "Client asked about turnaround for ORD-000200".to_string(),
        priority: Priority::High,
        is_read: false,
        order_id: None,
        client_id: Some(Uuid::new_v4()),
        created_at: base_time() - Duration::minutes(45),
    };

    let inquiries = vec![inquiry];
    let sources = ReceptionFeedSources {
        inquiries: &inquiries,
        ..Default::default()
    };

    let feed = build_reception_feed(&sources, base_time());
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].kind, ActivityKind::ClientInquiry);
    assert_eq!(feed[0].priority, Some(Priority::High));
    assert_eq!(feed[0].time_ago, "45 minutes ago");
}
