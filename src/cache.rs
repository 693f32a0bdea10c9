//! Per-device temperature cache with a global refresh debounce
//!
//! Refresh can be triggered both by the polling loop and by user-initiated
//! device switches within the same second; the debounce keeps that from
//! turning into redundant network sweeps.

use crate::api::ThermostatApi;
use crate::api::types::TemperatureReading;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::logging::get_logger;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Latest known reading per device
pub struct TemperatureCache {
    readings: HashMap<String, TemperatureReading>,

    /// When the last full sweep completed; None before the first sweep
    last_swept: Option<Instant>,

    /// Minimum elapsed time between sweeps
    debounce: Duration,

    logger: crate::logging::StructuredLogger,
}

impl TemperatureCache {
    /// Create an empty cache
    pub fn new(config: &CacheConfig) -> Self {
        let logger = get_logger("cache");
        Self {
            readings: HashMap::new(),
            last_swept: None,
            debounce: Duration::from_millis(config.debounce_ms),
            logger,
        }
    }

    /// Latest reading for a device, if any
    pub fn get(&self, device_id: &str) -> Option<&TemperatureReading> {
        self.readings.get(device_id)
    }

    /// Refresh readings for all given devices unless a sweep finished within
    /// the debounce window
    ///
    /// Returns true when a sweep was performed. Entries are updated eagerly
    /// as each fetch succeeds; the sweep marker is committed only after the
    /// whole batch succeeded, so a failed sweep stays eligible for an
    /// immediate retry while keeping the readings it already obtained.
    pub async fn refresh_all(
        &mut self,
        api: &dyn ThermostatApi,
        device_ids: &[String],
    ) -> Result<bool> {
        if let Some(last) = self.last_swept
            && last.elapsed() < self.debounce
        {
            return Ok(false);
        }

        for id in device_ids {
            let value = api.get_temperature(id).await.inspect_err(|e| {
                self.logger
                    .warn(&format!("Temperature fetch failed for {}: {}", id, e));
            })?;
            self.readings.insert(
                id.clone(),
                TemperatureReading {
                    device_id: id.clone(),
                    value,
                    observed_at: chrono::Utc::now(),
                },
            );
        }

        self.last_swept = Some(Instant::now());
        self.logger
            .debug(&format!("Swept {} device readings", device_ids.len()));
        Ok(true)
    }
}
