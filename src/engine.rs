//! Core synchronization engine for Hestia
//!
//! This module contains the engine that coordinates the session, roster,
//! temperature cache, and schedule model: it runs the polling loop, executes
//! refresh cycles, applies user commands, and publishes derived display
//! state to the UI boundary through a watch channel.

use crate::api::ThermostatApi;
use crate::api::types::OverrideInfo;
use crate::cache::TemperatureCache;
use crate::config::Config;
use crate::error::{HestiaError, Result};
use crate::logging::get_logger;
use crate::poller::PollingScheduler;
use crate::roster::DeviceRoster;
use crate::schedule::{ScheduleModel, format_period_triples};
use crate::session::SessionManager;
use tokio::sync::{mpsc, watch};
use tokio::time::Duration;

/// Commands accepted by the engine from external components (console, etc.)
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Log in; a missing username falls back to the configured default
    Login {
        username: Option<String>,
        password: String,
    },
    /// Clear the session and selection
    Logout,
    /// Select a device by id
    Select(String),
    /// Toggle the selected device's program flag
    ToggleProgram,
    /// Parse and submit period text for the selected device
    SubmitPeriods(String),
    /// Request a temporary override for the selected device
    TriggerAdvance,
    /// Stop the engine loop
    Shutdown,
}

/// Derived state published to the UI boundary
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    /// Whether a session is live
    pub logged_in: bool,

    /// Id and latest cached temperature for every known device, roster order
    pub readout: Vec<DeviceReadout>,

    /// View of the selected device, when one is selected
    pub selected: Option<SelectedView>,

    /// True while the live-data endpoints are failing
    pub controls_disabled: bool,
}

/// One row of the all-devices readout
#[derive(Debug, Clone)]
pub struct DeviceReadout {
    pub id: String,
    pub temperature: Option<f64>,
}

/// Everything the UI needs to render the selected device
#[derive(Debug, Clone)]
pub struct SelectedView {
    pub id: String,
    pub program_enabled: bool,
    /// Period list in the flat editing form; empty while the program is off
    pub periods_text: String,
    pub temperature: Option<f64>,
    pub current_target: Option<f64>,
    pub relay_on: bool,
    pub advance_active: bool,
}

/// Main synchronization engine
pub struct SyncEngine {
    /// Configuration
    config: Config,

    /// Remote service client
    api: Box<dyn ThermostatApi>,

    /// Session manager
    sessions: SessionManager,

    /// Device roster and selection
    roster: DeviceRoster,

    /// Temperature cache
    cache: TemperatureCache,

    /// Schedule operations
    schedule: ScheduleModel,

    /// Latest override info for the selected device
    last_target: Option<OverrideInfo>,

    /// Whether the live-data endpoints are currently failing
    controls_disabled: bool,

    /// Monotonic id of the most recent refresh cycle
    cycle_seq: u64,

    /// Display state publication
    display: watch::Sender<DisplayState>,

    /// Command receiver for external control
    commands_rx: mpsc::UnboundedReceiver<EngineCommand>,

    /// Logger with context
    logger: crate::logging::StructuredLogger,
}

impl SyncEngine {
    /// Create a new engine instance with an injected API client
    pub fn new(
        config: Config,
        api: Box<dyn ThermostatApi>,
        commands_rx: mpsc::UnboundedReceiver<EngineCommand>,
    ) -> Self {
        let logger = get_logger("engine");
        let sessions = SessionManager::new(&config.session);
        let cache = TemperatureCache::new(&config.cache);
        let schedule = ScheduleModel::new(&config.schedule);
        let (display, _) = watch::channel(DisplayState::default());

        let engine = Self {
            config,
            api,
            sessions,
            roster: DeviceRoster::new(),
            cache,
            schedule,
            last_target: None,
            controls_disabled: false,
            cycle_seq: 0,
            display,
            commands_rx,
            logger,
        };
        engine.publish();
        engine
    }

    /// Create an engine backed by the HTTP client from configuration
    pub fn from_config(
        config: Config,
        commands_rx: mpsc::UnboundedReceiver<EngineCommand>,
    ) -> Result<Self> {
        let api = crate::api::HttpThermostatApi::new(&config.server)?;
        Ok(Self::new(config, Box::new(api), commands_rx))
    }

    /// Subscribe to published display state
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.display.subscribe()
    }

    /// Run the engine main loop
    pub async fn run(&mut self) -> Result<()> {
        self.logger.info("Starting sync engine main loop");

        self.bootstrap().await;

        let mut poller =
            PollingScheduler::new(Duration::from_millis(self.config.poll_interval_ms));

        loop {
            tokio::select! {
                _ = poller.tick() => {
                    if self.roster.selected_id().is_some()
                        && let Err(e) = self.refresh_cycle().await
                    {
                        self.logger.error(&format!("Refresh cycle failed: {}", e));
                        // Continue polling even on errors
                    }
                }
                cmd = self.commands_rx.recv() => {
                    match cmd {
                        Some(EngineCommand::Shutdown) | None => {
                            self.logger.info("Shutdown requested");
                            break;
                        }
                        Some(cmd) => self.handle_command(cmd, &mut poller).await,
                    }
                }
            }
        }

        self.logger.info("Sync engine stopped");
        Ok(())
    }

    /// Initial roster fetch and temperature sweep before the first tick
    pub async fn bootstrap(&mut self) {
        if let Err(e) = self.refresh_roster().await {
            self.logger
                .warn(&format!("Initial roster fetch failed: {}", e));
        } else {
            let ids = self.roster.ids();
            if let Err(e) = self.cache.refresh_all(self.api.as_ref(), &ids).await {
                self.logger
                    .warn(&format!("Initial temperature sweep failed: {}", e));
            }
        }
        self.publish();
    }

    /// Apply one user command, resetting the poll timer where the command
    /// already triggered an out-of-band refresh
    async fn handle_command(&mut self, cmd: EngineCommand, poller: &mut PollingScheduler) {
        match cmd {
            EngineCommand::Login { username, password } => {
                if let Err(e) = self.login(username.as_deref(), &password).await {
                    self.logger.warn(&format!("Login failed: {}", e));
                }
            }
            EngineCommand::Logout => self.logout(),
            EngineCommand::Select(id) => match self.select_device(&id).await {
                Ok(()) => poller.reset(),
                Err(e) => self.logger.warn(&format!("Select failed: {}", e)),
            },
            EngineCommand::ToggleProgram => match self.toggle_program().await {
                Ok(()) => poller.reset(),
                Err(e) => self.logger.warn(&format!("Toggle failed: {}", e)),
            },
            EngineCommand::SubmitPeriods(text) => match self.submit_periods(&text).await {
                Ok(()) => poller.reset(),
                Err(e) => self.logger.warn(&format!("Period submission failed: {}", e)),
            },
            EngineCommand::TriggerAdvance => {
                if let Err(e) = self.trigger_advance().await {
                    self.logger.warn(&format!("Advance failed: {}", e));
                }
            }
            EngineCommand::Shutdown => {}
        }
    }

    /// Submit credentials and refresh the roster under the new session
    pub async fn login(&mut self, username: Option<&str>, password: &str) -> Result<()> {
        let username = username
            .unwrap_or(&self.config.session.username)
            .to_string();
        let result = self
            .sessions
            .login(self.api.as_ref(), &username, password)
            .await;
        if let Err(e) = result {
            self.publish();
            return Err(e);
        }

        if let Err(e) = self.refresh_roster().await {
            self.logger
                .warn(&format!("Roster fetch after login failed: {}", e));
        }
        self.publish();
        Ok(())
    }

    /// Clear session and selection together
    pub fn logout(&mut self) {
        self.sessions.logout();
        self.roster.clear_selection();
        self.last_target = None;
        self.publish();
    }

    /// Select a device and run an immediate refresh cycle
    pub async fn select_device(&mut self, id: &str) -> Result<()> {
        self.sessions.require()?;
        self.roster.select(id)?;
        self.last_target = None;
        self.publish();
        self.refresh_cycle().await
    }

    /// Toggle the selected device's program and re-sync
    pub async fn toggle_program(&mut self) -> Result<()> {
        let device = self
            .roster
            .selected()
            .cloned()
            .ok_or_else(|| HestiaError::generic("No device selected"))?;
        let session = self.sessions.require()?.clone();

        if let Err(e) = self
            .schedule
            .toggle_program(self.api.as_ref(), &session, &device)
            .await
        {
            self.apply_auth_policy(&e);
            return Err(e);
        }

        self.refresh_roster().await?;
        self.refresh_cycle().await
    }

    /// Parse and submit period text for the selected device, then re-sync
    ///
    /// Malformed text fails before any network call and leaves every entity
    /// untouched; the previously submitted schedule stays displayed.
    pub async fn submit_periods(&mut self, text: &str) -> Result<()> {
        let device_id = self
            .roster
            .selected_id()
            .map(String::from)
            .ok_or_else(|| HestiaError::generic("No device selected"))?;
        let session = self.sessions.require()?.clone();

        match self
            .schedule
            .submit_period_text(self.api.as_ref(), &session, &device_id, text)
            .await
        {
            Ok(snapshot) => {
                self.roster.install_device(snapshot);
                if let Err(e) = self.refresh_roster().await {
                    self.logger
                        .warn(&format!("Roster fetch after period submit failed: {}", e));
                    return Err(e);
                }
                self.refresh_cycle().await
            }
            Err(e) => {
                self.apply_auth_policy(&e);
                Err(e)
            }
        }
    }

    /// Request a temporary override for the selected device
    ///
    /// A no-op while the device already reports an override; the control is
    /// non-actionable until a later sync shows the override cleared.
    pub async fn trigger_advance(&mut self) -> Result<()> {
        let device = self
            .roster
            .selected()
            .cloned()
            .ok_or_else(|| HestiaError::generic("No device selected"))?;
        if device.advance_active {
            self.logger
                .debug(&format!("Advance already active for {}, ignoring", device.id));
            return Ok(());
        }
        let session = self.sessions.require()?.clone();

        match self
            .schedule
            .trigger_advance(self.api.as_ref(), &session, &device)
            .await
        {
            Ok(snapshot) => {
                self.roster.install_device(snapshot);
                self.publish();
                Ok(())
            }
            Err(e) => {
                self.apply_auth_policy(&e);
                Err(e)
            }
        }
    }

    /// One refresh cycle for the selected device: roster, then temperatures
    /// for all known devices (debounced), then override info, then publish
    ///
    /// The install step is guarded by the cycle id and selected-device
    /// check, so a completion that outlived a selection change is inert.
    pub async fn refresh_cycle(&mut self) -> Result<()> {
        let Some(selected_id) = self.roster.selected_id().map(String::from) else {
            return Ok(());
        };

        self.cycle_seq += 1;
        let seq = self.cycle_seq;
        self.logger
            .debug(&format!("Refresh cycle {} for {}", seq, selected_id));

        if let Err(e) = self.refresh_roster().await {
            self.set_controls_disabled(true);
            return Err(e);
        }

        let ids = self.roster.ids();
        if let Err(e) = self.cache.refresh_all(self.api.as_ref(), &ids).await {
            // Unauthenticated endpoint: surface as disabled controls, leave
            // the session alone
            self.set_controls_disabled(true);
            return Err(e);
        }

        let target = match self.api.get_target(&selected_id).await {
            Ok(info) => info,
            Err(e) => {
                self.set_controls_disabled(true);
                return Err(e);
            }
        };

        if seq == self.cycle_seq && self.roster.selected_id() == Some(selected_id.as_str()) {
            self.last_target = Some(target);
            self.controls_disabled = false;
            self.publish();
        }
        Ok(())
    }

    /// Fetch the roster, attaching the session when present, and install it
    async fn refresh_roster(&mut self) -> Result<()> {
        let had_session = self.sessions.current().is_some();
        match self.api.list_systems(self.sessions.current()).await {
            Ok(devices) => {
                self.roster.install(devices);
                Ok(())
            }
            Err(e) => {
                if had_session {
                    self.apply_auth_policy(&e);
                }
                Err(e)
            }
        }
    }

    /// Apply the coarse invalidation policy to a failed authenticated call
    fn apply_auth_policy(&mut self, err: &HestiaError) {
        if self.sessions.handle_failure(err) {
            // Session and selection are cleared together
            self.roster.clear_selection();
            self.last_target = None;
            self.publish();
        }
    }

    fn set_controls_disabled(&mut self, disabled: bool) {
        if self.controls_disabled != disabled {
            self.controls_disabled = disabled;
            self.publish();
        }
    }

    /// Build and publish the current display state
    fn publish(&self) {
        let readout = self
            .roster
            .devices()
            .iter()
            .map(|d| DeviceReadout {
                id: d.id.clone(),
                temperature: self.cache.get(&d.id).map(|r| r.value),
            })
            .collect();

        let selected = self.roster.selected().map(|d| SelectedView {
            id: d.id.clone(),
            program_enabled: d.program_enabled,
            periods_text: if d.program_enabled {
                format_period_triples(&d.periods)
            } else {
                String::new()
            },
            temperature: self.cache.get(&d.id).map(|r| r.value),
            current_target: self.last_target.and_then(|t| t.current_target),
            relay_on: self.last_target.map(|t| t.relay_on).unwrap_or(false),
            advance_active: d.advance_active,
        });

        self.display.send_replace(DisplayState {
            logged_in: self.sessions.current().is_some(),
            readout,
            selected,
            controls_disabled: self.controls_disabled,
        });
    }

    /// The live session state, for callers composing their own requests
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// The current roster snapshot
    pub fn roster(&self) -> &DeviceRoster {
        &self.roster
    }
}
