//! Courier position updates.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourierId, OrderId, Timestamp, ValidationError};

/// A courier position broadcast on the order's location channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourierLocation {
    pub order_id: OrderId,
    pub courier_id: CourierId,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_kmh: Option<f64>,
    pub recorded_at: Timestamp,
}

impl CourierLocation {
    /// Creates a location stamped with the current time.
    pub fn new(
        order_id: OrderId,
        courier_id: CourierId,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self, ValidationError> {
        let location = Self {
            order_id,
            courier_id,
            latitude,
            longitude,
            heading: None,
            speed_kmh: None,
            recorded_at: Timestamp::now(),
        };
        location.validate()?;
        Ok(location)
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn with_speed(mut self, speed_kmh: f64) -> Self {
        self.speed_kmh = Some(speed_kmh);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::invalid_format(
                "latitude",
                "must be between -90 and 90",
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::invalid_format(
                "longitude",
                "must be between -180 and 180",
            ));
        }
        if matches!(self.speed_kmh, Some(speed) if speed < 0.0) {
            return Err(ValidationError::invalid_format("speed_kmh", "cannot be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_coordinates_off_the_globe() {
        let order = OrderId::from("o1");
        let courier = CourierId::from("c1");
        assert!(CourierLocation::new(order.clone(), courier.clone(), 91.0, 0.0).is_err());
        assert!(CourierLocation::new(order.clone(), courier.clone(), 0.0, -181.0).is_err());
        assert!(CourierLocation::new(order, courier, -23.55, -46.63).is_ok());
    }

    #[test]
    fn serializes_camel_case_without_empty_optionals() {
        let location =
            CourierLocation::new(OrderId::from("o1"), CourierId::from("c1"), 1.0, 2.0).unwrap();
        let json = serde_json::to_value(&location).unwrap();
        assert_eq!(json["orderId"], "o1");
        assert_eq!(json["courierId"], "c1");
        assert!(json.get("heading").is_none());
    }
}
