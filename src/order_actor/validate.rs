//! Checkout validation. Runs before any stock row is locked.

use super::OrderError;
use crate::model::{CheckoutRequest, OrderCreate, OrderLine};
use rust_decimal::Decimal;

/// Turns a raw checkout request into an [`OrderCreate`].
///
/// Duplicate product ids are merged by summing quantities; the same product listed at two
/// different prices is rejected.
pub fn validate_checkout(request: &CheckoutRequest) -> Result<OrderCreate, OrderError> {
    if request.cart_items.is_empty() {
        return Err(OrderError::ValidationError("cart is empty".into()));
    }
    if request.shipping_price < Decimal::ZERO {
        return Err(OrderError::ValidationError(
            "shipping price must not be negative".into(),
        ));
    }
    if !request.shipping_address.location().is_valid() {
        return Err(OrderError::ValidationError(format!(
            "shipping coordinates out of range: ({}, {})",
            request.shipping_address.lat, request.shipping_address.lng
        )));
    }

    let mut lines: Vec<OrderLine> = Vec::with_capacity(request.cart_items.len());
    for item in &request.cart_items {
        if item.quantity <= 0 {
            return Err(OrderError::ValidationError(format!(
                "quantity for {} must be positive, got {}",
                item.product_id, item.quantity
            )));
        }
        if item.price_at_purchase < Decimal::ZERO {
            return Err(OrderError::ValidationError(format!(
                "price for {} must not be negative",
                item.product_id
            )));
        }
        let quantity = u32::try_from(item.quantity).map_err(|_| {
            OrderError::ValidationError(format!("quantity for {} is too large", item.product_id))
        })?;

        match lines.iter_mut().find(|l| l.product_id == item.product_id) {
            Some(line) if line.price_at_purchase != item.price_at_purchase => {
                return Err(OrderError::ValidationError(format!(
                    "{} listed with conflicting prices",
                    item.product_id
                )));
            }
            Some(line) => {
                line.quantity = line.quantity.checked_add(quantity).ok_or_else(|| {
                    OrderError::ValidationError(format!(
                        "quantity for {} is too large",
                        item.product_id
                    ))
                })?;
            }
            None => lines.push(OrderLine {
                product_id: item.product_id,
                quantity,
                price_at_purchase: item.price_at_purchase,
            }),
        }
    }

    let create = OrderCreate {
        customer: request.customer.clone(),
        lines,
        shipping_address: request.shipping_address.clone(),
        shipping_price: request.shipping_price,
    };
    if create.total().is_none() {
        return Err(OrderError::ValidationError("order total is too large".into()));
    }
    Ok(create)
}
