//! Cart lines and the cart collection.
//!
//! A [`Cart`] never stores a line with a zero quantity and never holds two
//! lines for the same product. Every constructor and transformation keeps both
//! rules, including deserialization, so a cart read back from storage or from
//! the API is always in normal form.
//!
//! Transformations return a new cart instead of mutating in place. Callers
//! decide when to commit the result, which makes "leave the cart untouched on
//! failure" the default.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::totals::Totals;
use crate::types::{LineId, ProductId};

/// One product-and-quantity entry within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Server-assigned for signed-in carts, locally generated for guest carts.
    pub id: LineId,
    pub product_id: ProductId,
    pub name: String,
    /// Price of a single unit.
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub quantity: u32,
}

impl CartLine {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Product details needed to start a new guest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub image: Option<String>,
}

/// Ordered collection of cart lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from raw lines, folding duplicates and dropping empty lines.
    ///
    /// Duplicate products keep the first line's id and position; their
    /// quantities are summed.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut normalized: Vec<CartLine> = Vec::new();
        for line in lines {
            if line.quantity == 0 {
                continue;
            }
            match normalized
                .iter_mut()
                .find(|existing| existing.product_id == line.product_id)
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => normalized.push(line),
            }
        }
        Self { lines: normalized }
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines (not units).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.lines.len()
    }

    /// Find a line by its id.
    #[must_use]
    pub fn line(&self, id: &LineId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == id)
    }

    /// Find the line holding a product.
    #[must_use]
    pub fn line_for_product(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| &line.product_id == product_id)
    }

    /// Quantity of a product in the cart, `0` when absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.line_for_product(product_id)
            .map_or(0, |line| line.quantity)
    }

    /// Derived totals for the current lines.
    #[must_use]
    pub fn totals(&self) -> Totals {
        Totals::compute(&self.lines)
    }

    /// Add `quantity` units of a product, guest style.
    ///
    /// An existing line for the product is incremented. Otherwise a new line
    /// is appended with an id from `new_id`. A zero quantity returns the cart
    /// unchanged.
    #[must_use]
    pub fn with_added(
        &self,
        product: &NewLine,
        quantity: u32,
        new_id: impl FnOnce() -> LineId,
    ) -> Self {
        let mut next = self.clone();
        if quantity == 0 {
            return next;
        }

        match next
            .lines
            .iter_mut()
            .find(|line| line.product_id == product.product_id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => next.lines.push(CartLine {
                id: new_id(),
                product_id: product.product_id.clone(),
                name: product.name.clone(),
                unit_price: product.unit_price,
                image: product.image.clone(),
                quantity,
            }),
        }
        next
    }

    /// Set the quantity of the line with `id`.
    ///
    /// A zero quantity removes the line. Unknown ids leave the cart unchanged.
    #[must_use]
    pub fn with_quantity(&self, id: &LineId, quantity: u32) -> Self {
        if quantity == 0 {
            return self.without_line(id);
        }

        let mut next = self.clone();
        if let Some(line) = next.lines.iter_mut().find(|line| &line.id == id) {
            line.quantity = quantity;
        }
        next
    }

    /// Remove the line with `id`. Unknown ids leave the cart unchanged.
    #[must_use]
    pub fn without_line(&self, id: &LineId) -> Self {
        Self {
            lines: self
                .lines
                .iter()
                .filter(|line| &line.id != id)
                .cloned()
                .collect(),
        }
    }
}

impl From<Vec<CartLine>> for Cart {
    fn from(lines: Vec<CartLine>) -> Self {
        Self::from_lines(lines)
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(id: &str, cents: i64) -> NewLine {
        NewLine {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            unit_price: Decimal::new(cents, 2),
            image: None,
        }
    }

    fn line(id: &str, product_id: &str, quantity: u32) -> CartLine {
        CartLine {
            id: LineId::new(id),
            product_id: ProductId::new(product_id),
            name: product_id.to_string(),
            unit_price: Decimal::new(100, 2),
            image: None,
            quantity,
        }
    }

    #[test]
    fn test_added_appends_new_product() {
        let cart = Cart::new().with_added(&product("p1", 1000), 2, || LineId::new("l1"));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].id, LineId::new("l1"));
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_added_merges_same_product_and_keeps_id() {
        let cart = Cart::new()
            .with_added(&product("p1", 1000), 2, || LineId::new("l1"))
            .with_added(&product("p1", 1000), 3, || LineId::new("l2"));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].id, LineId::new("l1"));
        assert_eq!(cart.quantity_of(&ProductId::new("p1")), 5);
    }

    #[test]
    fn test_added_zero_is_noop() {
        let cart = Cart::new().with_added(&product("p1", 1000), 0, || LineId::new("l1"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_added_saturates() {
        let cart = Cart::new()
            .with_added(&product("p1", 1), u32::MAX, || LineId::new("l1"))
            .with_added(&product("p1", 1), 10, || LineId::new("l2"));
        assert_eq!(cart.quantity_of(&ProductId::new("p1")), u32::MAX);
    }

    #[test]
    fn test_with_quantity_zero_equals_without_line() {
        let cart = Cart::from_lines([line("a", "p1", 1), line("b", "p2", 4)]);
        let id = LineId::new("b");
        assert_eq!(cart.with_quantity(&id, 0), cart.without_line(&id));
    }

    #[test]
    fn test_with_quantity_unknown_id_is_noop() {
        let cart = Cart::from_lines([line("a", "p1", 1)]);
        assert_eq!(cart.with_quantity(&LineId::new("zzz"), 9), cart);
        assert_eq!(cart.without_line(&LineId::new("zzz")), cart);
    }

    #[test]
    fn test_quantity_of_absent_product_is_zero() {
        assert_eq!(Cart::new().quantity_of(&ProductId::new("p1")), 0);
    }

    #[test]
    fn test_from_lines_normalizes() {
        let cart = Cart::from_lines([
            line("a", "p1", 1),
            line("b", "p2", 0),
            line("c", "p1", 2),
        ]);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].id, LineId::new("a"));
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_deserialize_normalizes_wire_lines() {
        let json = r#"[
            {"id": 1712000000000, "productId": "p1", "name": "Mug", "price": 10.5, "quantity": 1},
            {"id": "x", "productId": "p1", "name": "Mug", "price": "10.50", "quantity": 2},
            {"id": 3, "productId": 9, "name": "Cap", "price": 4, "quantity": 0}
        ]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].id.as_str(), "1712000000000");
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.lines()[0].unit_price, Decimal::new(1050, 2));
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let cart = Cart::from_lines([line("a", "p1", 2)]);
        let value = serde_json::to_value(&cart).unwrap();
        assert_eq!(value[0]["productId"], "p1");
        assert_eq!(value[0]["price"], "1.00");
        assert!(value[0].get("image").is_none());
    }
}
