//! Terminal output.
//!
//! All printing lives here; command modules only fetch and decide.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use shopfront_core::{Price, Totals};
use shopfront_storefront::AppError;
use shopfront_storefront::api::{Category, DashboardStats, Order, Product};
use shopfront_storefront::cart::CartStore;
use shopfront_storefront::notify::{Notification, NotificationLevel};
use shopfront_storefront::tracking::{OrderSummary, OrderTimeline};

fn money(amount: Decimal) -> String {
    Price::usd(amount).display()
}

fn date(at: DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}

pub fn notification(notification: &Notification) {
    match notification.level {
        NotificationLevel::Success => println!("✓ {notification}"),
        NotificationLevel::Info => println!("{notification}"),
        NotificationLevel::Error => eprintln!("✗ {notification}"),
    }
}

pub fn warning(message: &str) {
    eprintln!("! {message}");
}

pub fn error(error: &AppError) {
    eprintln!("✗ {}", error.user_message());
}

pub fn message(message: &str) {
    println!("{message}");
}

// =============================================================================
// Catalog
// =============================================================================

pub fn products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found");
        return;
    }
    for product in products {
        let stock = if product.in_stock() {
            format!("{} in stock", product.stock)
        } else {
            "out of stock".to_string()
        };
        println!(
            "{:>8}  {:<40}  {:>10}  {:<16}  {stock}",
            product.id,
            product.name,
            money(product.price),
            product.category,
        );
    }
}

pub fn product(product: &Product) {
    println!("{} ({})", product.name, product.id);
    println!("  Price:    {}", money(product.price));
    println!("  Category: {}", product.category);
    if product.in_stock() {
        println!("  Stock:    {}", product.stock);
    } else {
        println!("  Stock:    out of stock");
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
}

pub fn categories(categories: &[Category]) {
    for category in categories {
        match &category.description {
            Some(description) => println!("{:>6}  {}  - {description}", category.id, category.name),
            None => println!("{:>6}  {}", category.id, category.name),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

pub fn cart(store: &CartStore) {
    let cart = store.cart();
    let owner = if store.is_authenticated() {
        "Your cart"
    } else {
        "Guest cart"
    };

    if cart.is_empty() {
        println!("{owner} is empty");
        return;
    }

    println!("{owner}");
    for line in cart.lines() {
        println!(
            "  {:<40}  {:<30}  {:>3} × {:>10}  = {:>10}",
            line.id,
            line.name,
            line.quantity,
            money(line.unit_price),
            money(line.line_total()),
        );
    }
    totals(store.totals());
}

pub fn totals(totals: &Totals) {
    println!();
    println!("  Items:     {}", totals.item_count);
    println!("  Subtotal:  {}", money(totals.subtotal));
    if totals.has_free_shipping() {
        println!("  Shipping:  FREE");
    } else {
        println!("  Shipping:  {}", money(totals.shipping_cost));
    }
    println!("  Tax:       {}", money(totals.tax));
    println!("  Total:     {}", money(totals.grand_total));

    if !totals.has_free_shipping() && totals.item_count > 0 {
        println!(
            "  Add {} more for free shipping",
            money(totals.remaining_for_free_shipping())
        );
    }
}

// =============================================================================
// Orders
// =============================================================================

pub fn orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders yet");
        return;
    }

    let summary = OrderSummary::from_orders(orders);
    println!(
        "{} orders, {} spent, {} delivered, {} in progress",
        summary.total_orders,
        money(summary.total_spent),
        summary.delivered,
        summary.in_progress,
    );
    println!();

    for order in orders {
        let placed = order.created_at.map_or_else(|| "-".to_string(), date);
        println!(
            "#{:<8}  {:<20}  {:<10}  {:>3} items  {:>10}",
            order.id,
            placed,
            order.status.label(),
            order.items.iter().map(|i| u64::from(i.quantity)).sum::<u64>(),
            money(order.total),
        );
    }
}

pub fn order(order: &Order) {
    println!(
        "Order #{}  [{}]  {}%",
        order.id,
        order.status.label(),
        order.status.progress_percent()
    );
    if let Some(at) = order.created_at {
        println!("  Placed:    {}", date(at));
    }
    if let Some(address) = &order.shipping_address {
        println!(
            "  Ship to:   {}, {}, {}, {} {}, {}",
            address.full_name(),
            address.address,
            address.city,
            address.state,
            address.zip_code,
            address.country
        );
    }
    println!();
    for item in &order.items {
        println!(
            "  {:<30}  {:>3} × {:>10}",
            item.name,
            item.quantity,
            money(item.price)
        );
    }
    println!();
    println!("  Subtotal:  {}", money(order.subtotal));
    println!("  Shipping:  {}", money(order.shipping));
    println!("  Tax:       {}", money(order.tax));
    println!("  Total:     {}", money(order.total));
}

pub fn timeline(timeline: &OrderTimeline, estimated: Option<DateTime<Utc>>) {
    for step in &timeline.steps {
        let marker = if step.current {
            "●"
        } else if step.completed {
            "✓"
        } else {
            "○"
        };
        println!("  {marker} {:<14} {}", step.title, step.description);
        for event in &step.events {
            println!(
                "      {}  {}",
                event.timestamp.format("%Y-%m-%d %H:%M"),
                event.description
            );
        }
    }
    if let Some(at) = estimated {
        println!();
        println!("  Estimated delivery: {}", date(at));
    }
}

// =============================================================================
// Admin
// =============================================================================

pub fn stats(stats: &DashboardStats) {
    println!("Orders:    {}", stats.total_orders);
    println!("Customers: {}", stats.total_users);
    println!("Products:  {}", stats.total_products);
    println!("Revenue:   {}", money(stats.total_revenue));
}
