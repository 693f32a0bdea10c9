use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bearer credential pair returned by the token endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Token type, e.g. "bearer"
    pub token_type: String,

    /// Opaque access token
    pub access_token: String,
}

impl Session {
    /// Value for the `Authorization` header
    pub fn header_value(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

/// A controllable thermostat unit as reported by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Unique device id
    #[serde(rename = "system_id")]
    pub id: String,

    /// Whether the heating program is enabled
    #[serde(rename = "program")]
    pub program_enabled: bool,

    /// Time-of-day periods, in server order; inert while the program is off
    #[serde(default)]
    pub periods: Vec<Period>,

    /// Whether a temporary override is pending or active
    #[serde(rename = "advance", default)]
    pub advance_active: bool,
}

/// A time-of-day window with an associated target temperature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Period {
    /// Start hour, 0..24
    pub start: u8,

    /// End hour, 0..24
    pub end: u8,

    /// Target temperature for the window
    pub target: f64,
}

/// Latest known temperature for one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    /// Device the reading belongs to
    pub device_id: String,

    /// Reported temperature
    pub value: f64,

    /// When the client observed the reading
    pub observed_at: DateTime<Utc>,
}

/// Current target and relay state for the selected device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverrideInfo {
    /// Active target temperature, absent when nothing is scheduled
    #[serde(default)]
    pub current_target: Option<f64>,

    /// Whether the heating relay is currently on
    pub relay_on: bool,
}

/// Body of the temperature endpoint
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TemperatureResponse {
    pub temperature: f64,
}
