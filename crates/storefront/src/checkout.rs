//! Checkout: form validation and order placement.
//!
//! An order is built from the store's current cart and totals, submitted
//! through an [`OrderService`], and the cart is cleared once the order
//! exists. Only the last four card digits ever leave the process.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use shopfront_core::{Email, OrderId, PaymentMethod, ShippingMethod};

use crate::api::types::require;
use crate::api::{
    ApiError, FieldErrors, OrderLineRequest, OrderRequest, OrderTotals, PaymentInfo,
    ShippingAddress,
};
use crate::cart::CartStore;
use crate::error::add_breadcrumb;
use crate::notify::Notification;

/// Places orders.
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderId, ApiError>;
}

/// Errors from [`place_order`].
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// One or more form fields failed validation.
    #[error("{0}")]
    Invalid(FieldErrors),

    #[error("Your cart is empty")]
    EmptyCart,

    /// The API refused the order.
    #[error("Failed to place order: {0}")]
    Order(#[source] ApiError),
}

/// Everything the shopper enters at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,

    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub card_name: String,

    pub shipping_method: ShippingMethod,
    pub payment_method: PaymentMethod,
    pub special_instructions: String,
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: "United States".to_string(),
            card_number: String::new(),
            expiry_date: String::new(),
            cvv: String::new(),
            card_name: String::new(),
            shipping_method: ShippingMethod::default(),
            payment_method: PaymentMethod::default(),
            special_instructions: String::new(),
        }
    }
}

impl CheckoutForm {
    /// Check every required field and the email format.
    ///
    /// # Errors
    ///
    /// Returns field → message pairs for each failing field.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        require(&mut errors, "first_name", "First name", &self.first_name);
        require(&mut errors, "last_name", "Last name", &self.last_name);
        require(&mut errors, "email", "Email", &self.email);
        require(&mut errors, "phone", "Phone", &self.phone);
        require(&mut errors, "address", "Address", &self.address);
        require(&mut errors, "city", "City", &self.city);
        require(&mut errors, "state", "State", &self.state);
        require(&mut errors, "zip_code", "ZIP code", &self.zip_code);

        require(&mut errors, "card_number", "Card number", &self.card_number);
        require(&mut errors, "expiry_date", "Expiry date", &self.expiry_date);
        require(&mut errors, "cvv", "CVV", &self.cvv);
        require(&mut errors, "card_name", "Cardholder name", &self.card_name);

        if !self.email.trim().is_empty() && Email::parse(self.email.trim()).is_err() {
            errors.insert("email", "Email is invalid");
        }

        errors.into_result()
    }

    /// Last four digits of the card number.
    #[must_use]
    pub fn card_last4(&self) -> String {
        let digits: Vec<char> = self
            .card_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        digits
            .iter()
            .skip(digits.len().saturating_sub(4))
            .collect()
    }

    fn shipping_address(&self) -> ShippingAddress {
        let phone = self.phone.trim();
        ShippingAddress {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
            country: self.country.trim().to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
        }
    }
}

/// Build the order body for the store's current cart.
#[must_use]
pub fn build_order(store: &CartStore, form: &CheckoutForm) -> OrderRequest {
    let totals = store.totals();
    OrderRequest {
        items: store
            .cart()
            .lines()
            .iter()
            .map(|line| OrderLineRequest {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                price: line.unit_price,
            })
            .collect(),
        shipping_address: form.shipping_address(),
        payment_info: PaymentInfo {
            method: form.payment_method,
            card_last4: form.card_last4(),
        },
        totals: OrderTotals {
            subtotal: totals.subtotal,
            shipping: totals.shipping_cost,
            tax: totals.tax,
            total: totals.grand_total,
        },
        shipping_method: form.shipping_method,
        special_instructions: form.special_instructions.trim().to_string(),
    }
}

/// Validate the form, place the order and clear the cart.
///
/// Outcomes are reported through the store's notification sink. A failure to
/// clear the cart after the order exists does not fail the checkout.
///
/// # Errors
///
/// Returns `CheckoutError::Invalid` for form errors, `EmptyCart` when there is
/// nothing to order, or `Order` if the API rejects the order.
#[instrument(skip_all, fields(lines = store.cart().len()))]
pub async fn place_order(
    store: &mut CartStore,
    orders: &dyn OrderService,
    form: &CheckoutForm,
) -> Result<OrderId, CheckoutError> {
    form.validate().map_err(CheckoutError::Invalid)?;

    if store.cart().is_empty() {
        store.notify(Notification::error(CheckoutError::EmptyCart.to_string()));
        return Err(CheckoutError::EmptyCart);
    }

    let request = build_order(store, form);
    let order_id = match orders.create_order(&request).await {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "Failed to place order");
            store.notify(Notification::error(failure_message(&e)));
            return Err(CheckoutError::Order(e));
        }
    };

    add_breadcrumb("checkout", "Placed order", Some(&[("order_id", order_id.as_str())]));
    info!(order_id = %order_id, total = %request.totals.total, "Order placed");

    if let Err(e) = store.clear().await {
        warn!(error = %e, order_id = %order_id, "Order placed but cart was not cleared");
    }

    store.notify(Notification::success("Order placed successfully!"));
    Ok(order_id)
}

/// The server's message when it sent one, a generic one otherwise.
fn failure_message(error: &ApiError) -> String {
    match error {
        ApiError::Api { message, .. } | ApiError::BadRequest(message)
            if !message.trim().is_empty() =>
        {
            message.clone()
        }
        _ => "Failed to place order".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rust_decimal::Decimal;
    use shopfront_core::{Cart, LineId, NewLine, ProductId};

    use super::*;
    use crate::cart::RemoteCartService;
    use crate::identity::AuthSignal;
    use crate::notify::CollectingSink;
    use crate::storage::MemoryStore;

    struct NoRemote;

    #[async_trait]
    impl RemoteCartService for NoRemote {
        async fn fetch_cart(&self) -> Result<Cart, ApiError> {
            Ok(Cart::new())
        }
        async fn add_item(&self, _: &ProductId, _: u32) -> Result<(), ApiError> {
            Ok(())
        }
        async fn update_item(&self, _: &LineId, _: u32) -> Result<(), ApiError> {
            Ok(())
        }
        async fn remove_item(&self, _: &LineId) -> Result<(), ApiError> {
            Ok(())
        }
        async fn clear_cart(&self) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeOrders {
        placed: Mutex<Vec<OrderRequest>>,
        reject: Option<(u16, String)>,
    }

    #[async_trait]
    impl OrderService for FakeOrders {
        async fn create_order(&self, order: &OrderRequest) -> Result<OrderId, ApiError> {
            if let Some((status, message)) = &self.reject {
                return Err(ApiError::Api {
                    status: *status,
                    message: message.clone(),
                });
            }
            let mut placed = self.placed.lock().unwrap();
            placed.push(order.clone());
            Ok(OrderId::from(i64::try_from(placed.len()).unwrap()))
        }
    }

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Analytical Way".to_string(),
            city: "London".to_string(),
            state: "LDN".to_string(),
            zip_code: "N1".to_string(),
            card_number: "4242 4242 4242 4242".to_string(),
            expiry_date: "12/30".to_string(),
            cvv: "123".to_string(),
            card_name: "A Lovelace".to_string(),
            ..CheckoutForm::default()
        }
    }

    async fn guest_store(sink: Arc<CollectingSink>) -> CartStore {
        CartStore::open(
            Arc::new(NoRemote),
            Arc::new(MemoryStore::new()),
            sink,
            AuthSignal::fixed(false),
        )
        .await
        .0
    }

    fn mug() -> NewLine {
        NewLine {
            product_id: ProductId::new("p1"),
            name: "Mug".to_string(),
            unit_price: Decimal::new(1000, 2),
            image: None,
        }
    }

    #[test]
    fn test_default_form_country() {
        assert_eq!(CheckoutForm::default().country, "United States");
    }

    #[test]
    fn test_empty_form_reports_every_required_field() {
        let errors = CheckoutForm::default().validate().unwrap_err();
        assert_eq!(errors.len(), 12);
        assert_eq!(errors.get("first_name"), Some("First name is required"));
        assert_eq!(errors.get("zip_code"), Some("ZIP code is required"));
        assert_eq!(errors.get("card_name"), Some("Cardholder name is required"));
        assert_eq!(errors.get("email"), Some("Email is required"));
    }

    #[test]
    fn test_malformed_email_is_invalid() {
        for email in ["ada", "ada@", "@example.com", "ada@example", "a da@example.com"] {
            let form = CheckoutForm {
                email: email.to_string(),
                ..valid_form()
            };
            let errors = form.validate().unwrap_err();
            assert_eq!(errors.get("email"), Some("Email is invalid"), "{email}");
            assert_eq!(errors.len(), 1);
        }
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn test_card_last4() {
        assert_eq!(valid_form().card_last4(), "4242");
        let form = CheckoutForm {
            card_number: "12".to_string(),
            ..valid_form()
        };
        assert_eq!(form.card_last4(), "12");
    }

    #[test]
    fn test_form_reads_from_yaml() {
        let yaml = r"
first_name: Ada
last_name: Lovelace
email: ada@example.com
shipping_method: express
payment_method: paypal
";
        let form: CheckoutForm = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(form.first_name, "Ada");
        assert_eq!(form.shipping_method, ShippingMethod::Express);
        assert_eq!(form.payment_method, PaymentMethod::Paypal);
        assert_eq!(form.country, "United States");
    }

    #[tokio::test]
    async fn test_place_order_submits_cart_and_clears_it() {
        let sink = Arc::new(CollectingSink::new());
        let mut store = guest_store(sink.clone()).await;
        store.add_line(&mug(), 2).await.unwrap();
        sink.drain();

        let orders = FakeOrders::default();
        let id = place_order(&mut store, &orders, &valid_form())
            .await
            .unwrap();

        assert_eq!(id, OrderId::new("1"));
        assert!(store.cart().is_empty());

        let placed = orders.placed.lock().unwrap();
        let request = &placed[0];
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].quantity, 2);
        assert_eq!(request.totals.subtotal, Decimal::new(2000, 2));
        assert_eq!(request.totals.total, Decimal::new(2759, 2));
        assert_eq!(request.payment_info.card_last4, "4242");
        assert_eq!(request.shipping_address.phone.as_deref(), Some("555-0100"));

        assert_eq!(
            sink.messages(),
            vec!["Cart cleared", "Order placed successfully!"]
        );
    }

    #[tokio::test]
    async fn test_place_order_with_empty_cart() {
        let sink = Arc::new(CollectingSink::new());
        let mut store = guest_store(sink.clone()).await;
        let orders = FakeOrders::default();

        let err = place_order(&mut store, &orders, &valid_form())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(sink.messages(), vec!["Your cart is empty"]);
        assert!(orders.placed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_submitted() {
        let sink = Arc::new(CollectingSink::new());
        let mut store = guest_store(sink.clone()).await;
        store.add_line(&mug(), 1).await.unwrap();
        let orders = FakeOrders::default();

        let form = CheckoutForm {
            city: String::new(),
            ..valid_form()
        };
        let err = place_order(&mut store, &orders, &form)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Invalid(ref e) if e.get("city").is_some()));
        assert_eq!(store.cart().len(), 1);
        assert!(orders.placed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_order_keeps_cart_and_shows_server_message() {
        let sink = Arc::new(CollectingSink::new());
        let mut store = guest_store(sink.clone()).await;
        store.add_line(&mug(), 1).await.unwrap();
        sink.drain();

        let orders = FakeOrders {
            reject: Some((422, "Product p1 is out of stock".to_string())),
            ..FakeOrders::default()
        };
        let err = place_order(&mut store, &orders, &valid_form())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Order(_)));
        assert_eq!(store.cart().len(), 1);
        assert_eq!(sink.messages(), vec!["Product p1 is out of stock"]);
    }

    #[tokio::test]
    async fn test_server_error_message_is_shown() {
        let sink = Arc::new(CollectingSink::new());
        let mut store = guest_store(sink.clone()).await;
        store.add_line(&mug(), 1).await.unwrap();
        sink.drain();

        let orders = FakeOrders {
            reject: Some((503, "Payment provider unavailable".to_string())),
            ..FakeOrders::default()
        };
        place_order(&mut store, &orders, &valid_form())
            .await
            .unwrap_err();

        assert_eq!(sink.messages(), vec!["Payment provider unavailable"]);
        assert_eq!(store.cart().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_server_message_falls_back() {
        let sink = Arc::new(CollectingSink::new());
        let mut store = guest_store(sink.clone()).await;
        store.add_line(&mug(), 1).await.unwrap();
        sink.drain();

        let orders = FakeOrders {
            reject: Some((500, "  ".to_string())),
            ..FakeOrders::default()
        };
        place_order(&mut store, &orders, &valid_form())
            .await
            .unwrap_err();

        assert_eq!(sink.messages(), vec!["Failed to place order"]);
    }
}
