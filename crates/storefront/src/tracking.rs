//! Order tracking views: the timeline, delivery estimate and history summary.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use shopfront_core::{OrderStatus, ShippingMethod};

use crate::api::{Order, TrackingEvent, TrackingInfo};

/// One step of the tracking timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineStep {
    pub status: OrderStatus,
    pub title: &'static str,
    pub description: &'static str,
    /// Reached or passed.
    pub completed: bool,
    /// The order's current step.
    pub current: bool,
    /// Shipment events recorded for this step.
    pub events: Vec<TrackingEvent>,
}

/// The four tracking steps of an order, from placement to delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTimeline {
    pub steps: Vec<TimelineStep>,
}

impl OrderTimeline {
    /// Build the timeline for `status`, attaching each tracking event to its
    /// step.
    ///
    /// Cancelled and unknown statuses have no current step and nothing
    /// completed.
    #[must_use]
    pub fn new(status: &OrderStatus, tracking: &TrackingInfo) -> Self {
        let current = status.timeline_index();
        let steps = OrderStatus::TIMELINE
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let (title, description) = step_text(step);
                TimelineStep {
                    status: step.clone(),
                    title,
                    description,
                    completed: current.is_some_and(|c| index <= c),
                    current: current == Some(index),
                    events: tracking
                        .events
                        .iter()
                        .filter(|e| &e.status == step)
                        .cloned()
                        .collect(),
                }
            })
            .collect();
        Self { steps }
    }

    /// The current step, if the order is on the timeline.
    #[must_use]
    pub fn current(&self) -> Option<&TimelineStep> {
        self.steps.iter().find(|s| s.current)
    }
}

fn step_text(status: &OrderStatus) -> (&'static str, &'static str) {
    match status {
        OrderStatus::Pending => (
            "Order Placed",
            "Your order has been received and is being processed",
        ),
        OrderStatus::Processing => ("Processing", "Your order is being prepared for shipment"),
        OrderStatus::Shipped => ("Shipped", "Your order has been shipped and is on its way"),
        OrderStatus::Delivered => ("Delivered", "Your order has been delivered successfully"),
        OrderStatus::Cancelled | OrderStatus::Other(_) => ("", ""),
    }
}

/// Expected delivery date for an order placed at `created_at`.
#[must_use]
pub fn estimated_delivery(created_at: DateTime<Utc>, method: ShippingMethod) -> DateTime<Utc> {
    created_at + Duration::days(method.delivery_days())
}

/// Figures shown above the order history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderSummary {
    pub total_orders: usize,
    pub total_spent: Decimal,
    pub delivered: usize,
    pub in_progress: usize,
}

impl OrderSummary {
    #[must_use]
    pub fn from_orders(orders: &[Order]) -> Self {
        Self {
            total_orders: orders.len(),
            total_spent: orders.iter().map(|o| o.total).sum(),
            delivered: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Delivered)
                .count(),
            in_progress: orders.iter().filter(|o| o.status.is_in_progress()).count(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use shopfront_core::OrderId;

    use super::*;

    fn order(id: i64, status: OrderStatus, total: i64) -> Order {
        Order {
            id: OrderId::from(id),
            status,
            items: Vec::new(),
            shipping_address: None,
            shipping_method: ShippingMethod::Standard,
            subtotal: Decimal::ZERO,
            shipping: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::new(total, 2),
            created_at: None,
        }
    }

    #[test]
    fn test_timeline_marks_progress() {
        let tracking = TrackingInfo {
            events: vec![TrackingEvent {
                status: OrderStatus::Pending,
                timestamp: Utc.with_ymd_and_hms(2026, 1, 2, 10, 0, 0).unwrap(),
                description: "Order received".to_string(),
            }],
        };
        let timeline = OrderTimeline::new(&OrderStatus::Shipped, &tracking);

        let completed: Vec<bool> = timeline.steps.iter().map(|s| s.completed).collect();
        assert_eq!(completed, vec![true, true, true, false]);
        assert_eq!(timeline.current().unwrap().title, "Shipped");
        assert_eq!(timeline.steps[0].title, "Order Placed");
        assert_eq!(timeline.steps[0].events.len(), 1);
        assert!(timeline.steps[1].events.is_empty());
    }

    #[test]
    fn test_cancelled_timeline_has_no_current_step() {
        let timeline = OrderTimeline::new(&OrderStatus::Cancelled, &TrackingInfo::default());
        assert_eq!(timeline.steps.len(), 4);
        assert!(timeline.current().is_none());
        assert!(timeline.steps.iter().all(|s| !s.completed));
    }

    #[test]
    fn test_estimated_delivery() {
        let placed = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            estimated_delivery(placed, ShippingMethod::Standard),
            Utc.with_ymd_and_hms(2026, 3, 8, 12, 0, 0).unwrap()
        );
        assert_eq!(
            estimated_delivery(placed, ShippingMethod::Express),
            Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_order_summary() {
        let orders = vec![
            order(1, OrderStatus::Delivered, 5400),
            order(2, OrderStatus::Pending, 2759),
            order(3, OrderStatus::Shipped, 1000),
            order(4, OrderStatus::Cancelled, 999),
        ];
        let summary = OrderSummary::from_orders(&orders);

        assert_eq!(summary.total_orders, 4);
        assert_eq!(summary.total_spent, Decimal::new(10158, 2));
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.in_progress, 2);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(OrderSummary::from_orders(&[]), OrderSummary::default());
    }
}
