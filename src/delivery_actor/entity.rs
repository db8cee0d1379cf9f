//! [`ActorEntity`] implementation for [`Delivery`].

use super::actions::DeliveryAction;
use super::error::DeliveryError;
use crate::framework::ActorEntity;
use crate::model::{Delivery, DeliveryCreate, DeliveryId, StatusChange};
use async_trait::async_trait;
use chrono::Utc;
use std::convert::Infallible;

/// `TRK-` followed by 12 upper-case hex characters.
fn tracking_number() -> String {
    let raw = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
    format!("TRK-{}", &raw[..12])
}

#[async_trait]
impl ActorEntity for Delivery {
    type Id = DeliveryId;
    type Create = DeliveryCreate;
    type Update = Infallible;
    type Action = DeliveryAction;
    type ActionResult = StatusChange;
    type Context = ();
    type Error = DeliveryError;

    fn from_create_params(id: DeliveryId, params: DeliveryCreate) -> Result<Self, DeliveryError> {
        let now = Utc::now();
        let solution = params.solution;
        Ok(Delivery {
            id,
            order_id: params.order_id,
            status: crate::model::DeliveryStatus::Pending,
            assigned_partner: solution
                .routes
                .first()
                .and_then(|route| route.assigned_partner.clone()),
            estimated_delivery_date: solution.estimated_delivery_date,
            tracking_number: tracking_number(),
            shipping_cost: solution.total_cost,
            routes: solution.routes,
            created_at: now,
            updated_at: now,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.order_id.to_string())
    }

    async fn on_update(&mut self, update: Infallible, _: &()) -> Result<(), DeliveryError> {
        match update {}
    }

    async fn handle_action(
        &mut self,
        action: DeliveryAction,
        _: &(),
    ) -> Result<StatusChange, DeliveryError> {
        match action {
            DeliveryAction::Advance(next) => {
                let from = self.status;
                if !from.can_move_to(next) {
                    return Err(DeliveryError::InvalidTransition { from, to: next });
                }
                let changed = from != next;
                if changed {
                    self.status = next;
                    self.updated_at = Utc::now();
                }
                Ok(StatusChange {
                    from,
                    to: next,
                    changed,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_number_shape() {
        let number = tracking_number();
        assert_eq!(number.len(), 16);
        assert!(number.starts_with("TRK-"));
        assert!(number[4..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
