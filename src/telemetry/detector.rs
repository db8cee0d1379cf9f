//! Anomaly rules applied to each reading.

use super::error::TelemetryError;
use crate::lifecycle::config::TelemetryConfig;
use crate::model::{Alert, AlertKind, TelemetryReading, TrackingEntry};
use crate::routing::haversine_km;

/// Rejects readings that cannot be placed on a map or carry a non-finite temperature.
pub fn validate_reading(reading: &TelemetryReading) -> Result<(), TelemetryError> {
    if !reading.location().is_valid() {
        return Err(TelemetryError::InvalidReading(format!(
            "coordinates out of range: ({}, {})",
            reading.lat, reading.lng
        )));
    }
    if let Some(t) = reading.temperature {
        if !t.is_finite() {
            return Err(TelemetryError::InvalidReading(
                "temperature must be a finite number".into(),
            ));
        }
    }
    Ok(())
}

/// Stateless alert evaluation. The previous reading is passed in by the caller.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    deviation_threshold_km: f64,
    min_temperature_c: f64,
    max_temperature_c: f64,
}

impl AnomalyDetector {
    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self {
            deviation_threshold_km: config.deviation_threshold_km,
            min_temperature_c: config.min_temperature_c,
            max_temperature_c: config.max_temperature_c,
        }
    }

    pub fn evaluate(
        &self,
        previous: Option<&TrackingEntry>,
        reading: &TelemetryReading,
    ) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if let Some(previous) = previous {
            let moved = haversine_km(previous.location(), reading.location());
            if moved > self.deviation_threshold_km {
                alerts.push(Alert {
                    kind: AlertKind::RouteDeviation,
                    message: format!(
                        "Moved {moved:.1} km since last reading (threshold {} km)",
                        self.deviation_threshold_km
                    ),
                });
            }
        }

        if let Some(t) = reading.temperature {
            if t < self.min_temperature_c || t > self.max_temperature_c {
                alerts.push(Alert {
                    kind: AlertKind::TemperatureExcursion,
                    message: format!(
                        "Temperature {t} °C outside [{}, {}] °C",
                        self.min_temperature_c, self.max_temperature_c
                    ),
                });
            }
        }

        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeliveryId, TrackingEntryId};
    use chrono::Utc;

    fn reading(lat: f64, lng: f64, temperature: Option<f64>) -> TelemetryReading {
        TelemetryReading {
            lat,
            lng,
            temperature,
            status: None,
            notes: None,
            reported_at: None,
        }
    }

    fn entry(lat: f64, lng: f64) -> TrackingEntry {
        TrackingEntry {
            id: TrackingEntryId(1),
            delivery_id: DeliveryId(1),
            lat,
            lng,
            temperature: None,
            status: None,
            notes: None,
            reported_at: None,
            recorded_at: Utc::now(),
        }
    }

    fn detector() -> AnomalyDetector {
        AnomalyDetector::from_config(&TelemetryConfig::default())
    }

    fn kinds(alerts: &[Alert]) -> Vec<AlertKind> {
        alerts.iter().map(|a| a.kind).collect()
    }

    #[test]
    fn test_temperature_band() {
        let d = detector();
        assert_eq!(
            kinds(&d.evaluate(None, &reading(48.0, 2.0, Some(12.0)))),
            [AlertKind::TemperatureExcursion]
        );
        assert!(d.evaluate(None, &reading(48.0, 2.0, Some(5.0))).is_empty());
        assert!(d.evaluate(None, &reading(48.0, 2.0, Some(8.0))).is_empty());
        assert!(!d.evaluate(None, &reading(48.0, 2.0, Some(1.9))).is_empty());
        assert!(d.evaluate(None, &reading(48.0, 2.0, None)).is_empty());
    }

    #[test]
    fn test_route_deviation() {
        let d = detector();
        let previous = entry(48.8566, 2.3522);
        // ~1 km north
        assert!(d
            .evaluate(Some(&previous), &reading(48.8656, 2.3522, None))
            .is_empty());
        // ~10 km north
        let alerts = d.evaluate(Some(&previous), &reading(48.9466, 2.3522, None));
        assert_eq!(kinds(&alerts), [AlertKind::RouteDeviation]);
        // First reading has nothing to deviate from.
        assert!(d.evaluate(None, &reading(0.0, 0.0, None)).is_empty());
    }

    #[test]
    fn test_validate_reading() {
        assert!(validate_reading(&reading(48.0, 2.0, Some(4.0))).is_ok());
        assert!(validate_reading(&reading(91.0, 2.0, None)).is_err());
        assert!(validate_reading(&reading(48.0, 181.0, None)).is_err());
        assert!(validate_reading(&reading(48.0, 2.0, Some(f64::NAN))).is_err());
    }
}
