//! Scripted stand-in for the remote thermostat service, shared by the
//! integration tests.

use hestia::api::ThermostatApi;
use hestia::api::types::{Device, OverrideInfo, Period, Session};
use hestia::config::Config;
use hestia::error::{HestiaError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const PASSWORD: &str = "hunter2";

#[derive(Default)]
pub struct MockState {
    pub devices: Vec<Device>,
    pub temperatures: HashMap<String, f64>,
    pub target: Option<OverrideInfo>,
    /// Force this status on every authenticated endpoint
    pub fail_authed_with: Option<u16>,
    /// Force this status on the temperature endpoint
    pub fail_temperature_with: Option<u16>,
    /// Force this status on the target endpoint
    pub fail_target_with: Option<u16>,
    pub temperature_calls: u32,
    pub toggle_calls: u32,
    pub period_calls: u32,
    pub advance_calls: u32,
    pub login_calls: u32,
}

#[derive(Clone)]
pub struct MockThermostatApi {
    state: Arc<Mutex<MockState>>,
}

#[allow(dead_code)]
impl MockThermostatApi {
    pub fn new(devices: Vec<Device>, temperatures: &[(&str, f64)]) -> Self {
        let state = MockState {
            devices,
            temperatures: temperatures
                .iter()
                .map(|(id, t)| (id.to_string(), *t))
                .collect(),
            target: Some(OverrideInfo {
                current_target: Some(20.0),
                relay_on: false,
            }),
            ..MockState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn fail_authed(&self, status: u16) {
        self.with(|s| s.fail_authed_with = Some(status));
    }

    pub fn fail_temperature(&self, status: u16) {
        self.with(|s| s.fail_temperature_with = Some(status));
    }

    pub fn temperature_calls(&self) -> u32 {
        self.with(|s| s.temperature_calls)
    }

    pub fn period_calls(&self) -> u32 {
        self.with(|s| s.period_calls)
    }

    pub fn advance_calls(&self) -> u32 {
        self.with(|s| s.advance_calls)
    }

    pub fn clear_advance(&self, id: &str) {
        self.with(|s| {
            if let Some(d) = s.devices.iter_mut().find(|d| d.id == id) {
                d.advance_active = false;
            }
        });
    }

    fn check_session(state: &MockState, session: &Session) -> Result<()> {
        if let Some(status) = state.fail_authed_with {
            return Err(HestiaError::api(status, "rejected"));
        }
        if session.access_token.is_empty() {
            return Err(HestiaError::api(401, "missing token"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ThermostatApi for MockThermostatApi {
    async fn login(&self, _username: &str, password: &str) -> Result<Session> {
        self.with(|s| {
            s.login_calls += 1;
            if password == PASSWORD {
                Ok(Session {
                    token_type: "bearer".to_string(),
                    access_token: "mock-token".to_string(),
                })
            } else {
                Err(HestiaError::auth("Incorrect username or password"))
            }
        })
    }

    async fn list_systems(&self, session: Option<&Session>) -> Result<Vec<Device>> {
        self.with(|s| {
            if let (Some(status), Some(_)) = (s.fail_authed_with, session) {
                return Err(HestiaError::api(status, "rejected"));
            }
            Ok(s.devices.clone())
        })
    }

    async fn toggle_program(
        &self,
        session: &Session,
        device_id: &str,
        program: bool,
    ) -> Result<()> {
        self.with(|s| {
            Self::check_session(s, session)?;
            s.toggle_calls += 1;
            let device = s
                .devices
                .iter_mut()
                .find(|d| d.id == device_id)
                .ok_or_else(|| HestiaError::api(404, "no such system"))?;
            device.program_enabled = program;
            Ok(())
        })
    }

    async fn get_temperature(&self, device_id: &str) -> Result<f64> {
        self.with(|s| {
            s.temperature_calls += 1;
            if let Some(status) = s.fail_temperature_with {
                return Err(HestiaError::api(status, "unavailable"));
            }
            s.temperatures
                .get(device_id)
                .copied()
                .ok_or_else(|| HestiaError::api(404, "no such system"))
        })
    }

    async fn get_target(&self, _device_id: &str) -> Result<OverrideInfo> {
        self.with(|s| {
            if let Some(status) = s.fail_target_with {
                return Err(HestiaError::api(status, "unavailable"));
            }
            s.target
                .ok_or_else(|| HestiaError::api(404, "no such system"))
        })
    }

    async fn set_periods(
        &self,
        session: &Session,
        device_id: &str,
        periods: &[Period],
    ) -> Result<Device> {
        self.with(|s| {
            Self::check_session(s, session)?;
            s.period_calls += 1;
            let device = s
                .devices
                .iter_mut()
                .find(|d| d.id == device_id)
                .ok_or_else(|| HestiaError::api(404, "no such system"))?;
            device.periods = periods.to_vec();
            Ok(device.clone())
        })
    }

    async fn trigger_advance(
        &self,
        session: &Session,
        device_id: &str,
        _end_time: i64,
    ) -> Result<Device> {
        self.with(|s| {
            Self::check_session(s, session)?;
            s.advance_calls += 1;
            let device = s
                .devices
                .iter_mut()
                .find(|d| d.id == device_id)
                .ok_or_else(|| HestiaError::api(404, "no such system"))?;
            device.advance_active = true;
            Ok(device.clone())
        })
    }
}

/// A device snapshot the way the roster endpoint reports one
#[allow(dead_code)]
pub fn device(id: &str) -> Device {
    Device {
        id: id.to_string(),
        program_enabled: false,
        periods: Vec::new(),
        advance_active: false,
    }
}

/// Test configuration with the session store under `dir`
#[allow(dead_code)]
pub fn test_config(dir: &tempfile::TempDir) -> Config {
    let mut config = Config::default();
    config.session.store_path = dir
        .path()
        .join("session.json")
        .to_string_lossy()
        .to_string();
    // Tests drive cycles back to back; keep sweeps eligible
    config.cache.debounce_ms = 0;
    config
}
