//! Derived cart totals.
//!
//! Totals are recomputed from the lines on every call. Nothing is cached or
//! updated incrementally, and arithmetic is exact decimal arithmetic, so the
//! same lines always produce the same numbers.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::cart::CartLine;

/// Subtotal at or above which shipping is free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(5000, 0, 0, false, 2);

/// Shipping charged below the free-shipping threshold.
pub const FLAT_SHIPPING_FEE: Decimal = Decimal::from_parts(599, 0, 0, false, 2);

/// Sales tax applied to the subtotal.
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Subtotal, shipping, tax and grand total for a set of cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// `Σ(unit_price × quantity)`.
    pub subtotal: Decimal,
    /// `Σ(quantity)`.
    pub item_count: u64,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
    pub grand_total: Decimal,
}

impl Totals {
    /// Compute totals from scratch.
    ///
    /// An empty cart still goes through the threshold rule: a zero subtotal
    /// is below the threshold, so it reports the flat shipping fee.
    #[must_use]
    pub fn compute(lines: &[CartLine]) -> Self {
        let subtotal: Decimal = lines.iter().map(CartLine::line_total).sum();
        let item_count = lines.iter().map(|line| u64::from(line.quantity)).sum();

        let shipping_cost = if subtotal >= FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            FLAT_SHIPPING_FEE
        };
        let tax = subtotal * TAX_RATE;

        Self {
            subtotal,
            item_count,
            shipping_cost,
            tax,
            grand_total: subtotal + shipping_cost + tax,
        }
    }

    /// Whether the subtotal earns free shipping.
    #[must_use]
    pub fn has_free_shipping(&self) -> bool {
        self.subtotal >= FREE_SHIPPING_THRESHOLD
    }

    /// How much more the shopper needs to spend for free shipping.
    #[must_use]
    pub fn remaining_for_free_shipping(&self) -> Decimal {
        (FREE_SHIPPING_THRESHOLD - self.subtotal).max(Decimal::ZERO)
    }
}

impl Default for Totals {
    fn default() -> Self {
        Self::compute(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LineId, ProductId};

    fn line(product: &str, cents: i64, quantity: u32) -> CartLine {
        CartLine {
            id: LineId::new(product),
            product_id: ProductId::new(product),
            name: product.to_string(),
            unit_price: Decimal::new(cents, 2),
            image: None,
            quantity,
        }
    }

    #[test]
    fn test_empty_cart_still_charges_shipping() {
        let totals = Totals::compute(&[]);
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.item_count, 0);
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.shipping_cost, Decimal::new(599, 2));
        assert_eq!(totals.grand_total, Decimal::new(599, 2));
        assert_eq!(Totals::default(), totals);
    }

    #[test]
    fn test_threshold_boundary() {
        let below = Totals::compute(&[line("p1", 4999, 1)]);
        assert_eq!(below.shipping_cost, Decimal::new(599, 2));
        assert!(!below.has_free_shipping());

        let at = Totals::compute(&[line("p1", 5000, 1)]);
        assert_eq!(at.shipping_cost, Decimal::ZERO);
        assert!(at.has_free_shipping());
    }

    #[test]
    fn test_scenario_totals() {
        let two = Totals::compute(&[line("p1", 1000, 2)]);
        assert_eq!(two.subtotal, Decimal::new(2000, 2));
        assert_eq!(two.tax, Decimal::new(160, 2));
        assert_eq!(two.shipping_cost, Decimal::new(599, 2));
        assert_eq!(two.grand_total, Decimal::new(2759, 2));

        let five = Totals::compute(&[line("p1", 1000, 5)]);
        assert_eq!(five.subtotal, Decimal::new(5000, 2));
        assert_eq!(five.shipping_cost, Decimal::ZERO);
        assert_eq!(five.tax, Decimal::new(400, 2));
        assert_eq!(five.grand_total, Decimal::new(5400, 2));
    }

    #[test]
    fn test_subtotal_is_exact_across_recomputation() {
        // 0.10 and 0.20 drift in binary floating point; decimals must not.
        let lines = vec![line("a", 10, 3), line("b", 20, 7), line("c", 1999, 11)];
        let expected = Decimal::new(10 * 3 + 20 * 7 + 1999 * 11, 2);
        for _ in 0..1_000 {
            assert_eq!(Totals::compute(&lines).subtotal, expected);
        }
        assert_eq!(Totals::compute(&lines).item_count, 21);
    }

    #[test]
    fn test_remaining_for_free_shipping() {
        let totals = Totals::compute(&[line("p1", 1250, 2)]);
        assert_eq!(totals.remaining_for_free_shipping(), Decimal::new(2500, 2));

        let totals = Totals::compute(&[line("p1", 6000, 1)]);
        assert_eq!(totals.remaining_for_free_shipping(), Decimal::ZERO);
    }
}
