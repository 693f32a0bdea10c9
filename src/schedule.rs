//! Schedule operations and the period editing convention
//!
//! Periods are edited as free-form JSON text in the flat form
//! `[[startHour, endHour, targetTemp], ...]`. Parsing happens entirely on
//! the client; malformed text never produces a network request. The server
//! stays authoritative: every mutation returns the canonical device
//! snapshot, which replaces local state.

use crate::api::ThermostatApi;
use crate::api::types::{Device, Period, Session};
use crate::config::ScheduleConfig;
use crate::error::{HestiaError, Result};
use crate::logging::get_logger;

/// Schedule mutation front-end for the selected device
pub struct ScheduleModel {
    /// How far in the future a requested override ends, in seconds
    advance_duration_secs: u64,

    logger: crate::logging::StructuredLogger,
}

impl ScheduleModel {
    /// Create a model with the configured advance duration
    pub fn new(config: &ScheduleConfig) -> Self {
        let logger = get_logger("schedule");
        Self {
            advance_duration_secs: config.advance_duration_secs,
            logger,
        }
    }

    /// Submit a full period list; the response snapshot is canonical
    pub async fn set_program(
        &self,
        api: &dyn ThermostatApi,
        session: &Session,
        device_id: &str,
        periods: &[Period],
    ) -> Result<Device> {
        let device = api.set_periods(session, device_id, periods).await?;
        self.logger.info(&format!(
            "Replaced schedule for {} with {} periods",
            device_id,
            periods.len()
        ));
        Ok(device)
    }

    /// Parse period text and submit it; malformed text fails locally
    pub async fn submit_period_text(
        &self,
        api: &dyn ThermostatApi,
        session: &Session,
        device_id: &str,
        text: &str,
    ) -> Result<Device> {
        let periods = parse_period_triples(text)?;
        self.set_program(api, session, device_id, &periods).await
    }

    /// Submit the logical negation of the device's program flag
    pub async fn toggle_program(
        &self,
        api: &dyn ThermostatApi,
        session: &Session,
        device: &Device,
    ) -> Result<()> {
        api.toggle_program(session, &device.id, !device.program_enabled)
            .await?;
        self.logger.info(&format!(
            "Program for {} set to {}",
            device.id, !device.program_enabled
        ));
        Ok(())
    }

    /// Request a temporary override ending `advance_duration_secs` from now
    ///
    /// Non-actionable while the device already reports an override; the
    /// guard keeps a double-submission from ever reaching the service.
    pub async fn trigger_advance(
        &self,
        api: &dyn ThermostatApi,
        session: &Session,
        device: &Device,
    ) -> Result<Device> {
        if device.advance_active {
            return Err(HestiaError::generic(format!(
                "Advance already active for {}",
                device.id
            )));
        }
        let end_time = chrono::Utc::now().timestamp() + self.advance_duration_secs as i64;
        let device = api.trigger_advance(session, &device.id, end_time).await?;
        self.logger
            .info(&format!("Advance requested for {}", device.id));
        Ok(device)
    }
}

/// Parse `[[start, end, target], ...]` text into structured periods
pub fn parse_period_triples(text: &str) -> Result<Vec<Period>> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| HestiaError::malformed(format!("not valid JSON: {}", e)))?;

    let rows = value
        .as_array()
        .ok_or_else(|| HestiaError::malformed("expected an array of [start, end, target] triples"))?;

    let mut periods = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let triple = row
            .as_array()
            .filter(|t| t.len() == 3)
            .ok_or_else(|| HestiaError::malformed(format!("entry {} is not a triple", i)))?;

        let start = parse_hour(&triple[0])
            .ok_or_else(|| HestiaError::malformed(format!("entry {} has an invalid start hour", i)))?;
        let end = parse_hour(&triple[1])
            .ok_or_else(|| HestiaError::malformed(format!("entry {} has an invalid end hour", i)))?;
        let target = triple[2]
            .as_f64()
            .ok_or_else(|| HestiaError::malformed(format!("entry {} has a non-numeric target", i)))?;

        periods.push(Period { start, end, target });
    }
    Ok(periods)
}

/// Render structured periods back to the flat editing form
pub fn format_period_triples(periods: &[Period]) -> String {
    let rows: Vec<serde_json::Value> = periods
        .iter()
        .map(|p| {
            serde_json::json!([
                p.start,
                p.end,
                // Whole-degree targets render without a trailing ".0"
                if p.target.fract() == 0.0 {
                    serde_json::Value::from(p.target as i64)
                } else {
                    serde_json::Value::from(p.target)
                }
            ])
        })
        .collect();
    serde_json::Value::Array(rows).to_string()
}

/// An hour field must be an integer in 0..24
fn parse_hour(value: &serde_json::Value) -> Option<u8> {
    let n = value.as_i64()?;
    if (0..24).contains(&n) { Some(n as u8) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_triples() {
        let periods = parse_period_triples("[[6,9,21],[17,22,20.5]]").unwrap();
        assert_eq!(
            periods,
            vec![
                Period {
                    start: 6,
                    end: 9,
                    target: 21.0
                },
                Period {
                    start: 17,
                    end: 22,
                    target: 20.5
                },
            ]
        );
    }

    #[test]
    fn parse_empty_list() {
        assert_eq!(parse_period_triples("[]").unwrap(), Vec::new());
    }

    #[test]
    fn parse_rejects_non_json() {
        assert!(matches!(
            parse_period_triples("not json"),
            Err(HestiaError::MalformedInput { .. })
        ));
    }

    #[test]
    fn parse_rejects_wrong_shapes() {
        // Not an array
        assert!(parse_period_triples("{\"periods\": []}").is_err());
        // Wrong arity
        assert!(parse_period_triples("[[6,9]]").is_err());
        assert!(parse_period_triples("[[6,9,21,5]]").is_err());
        // Non-numeric members
        assert!(parse_period_triples("[[\"6\",9,21]]").is_err());
        // Fractional hour
        assert!(parse_period_triples("[[6.5,9,21]]").is_err());
        // Out-of-range hour
        assert!(parse_period_triples("[[6,24,21]]").is_err());
        assert!(parse_period_triples("[[-1,9,21]]").is_err());
    }

    #[test]
    fn triples_roundtrip_losslessly() {
        let text = "[[6,9,21],[17,22,20.5]]";
        let periods = parse_period_triples(text).unwrap();
        assert_eq!(format_period_triples(&periods), text);
    }

    #[test]
    fn format_whole_degrees_without_fraction() {
        let periods = vec![Period {
            start: 0,
            end: 23,
            target: 19.0,
        }];
        assert_eq!(format_period_triples(&periods), "[[0,23,19]]");
    }
}
