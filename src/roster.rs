//! Sorted collection of known devices and the current selection
//!
//! The roster is replaced wholesale on every successful fetch; the previous
//! snapshot is discarded, never merged. The selection pointer only ever
//! refers to an id present in the current snapshot.

use crate::api::types::Device;
use crate::error::{HestiaError, Result};
use crate::logging::get_logger;

/// Known devices, ascending by id, plus the selected device
pub struct DeviceRoster {
    devices: Vec<Device>,
    selected: Option<String>,
    logger: crate::logging::StructuredLogger,
}

impl DeviceRoster {
    /// Create an empty roster
    pub fn new() -> Self {
        let logger = get_logger("roster");
        Self {
            devices: Vec::new(),
            selected: None,
            logger,
        }
    }

    /// Replace the roster with a fresh snapshot, sorted ascending by id
    ///
    /// A selection whose id vanished from the new snapshot is dropped.
    pub fn install(&mut self, mut devices: Vec<Device>) {
        devices.sort_by(|a, b| a.id.cmp(&b.id));
        self.devices = devices;

        if let Some(ref id) = self.selected
            && !self.devices.iter().any(|d| d.id == *id)
        {
            self.logger
                .warn(&format!("Selected device {} left the roster", id));
            self.selected = None;
        }
    }

    /// Replace a single device with the canonical snapshot from an update
    /// response
    ///
    /// Ids never change in an update response, so the sort order is
    /// untouched. A snapshot for a device no longer in the roster is
    /// dropped.
    pub fn install_device(&mut self, device: Device) {
        if let Some(slot) = self.devices.iter_mut().find(|d| d.id == device.id) {
            *slot = device;
        } else {
            self.logger.warn(&format!(
                "Dropping update for {}: not in the current roster",
                device.id
            ));
        }
    }

    /// Select a device by id
    pub fn select(&mut self, id: &str) -> Result<&Device> {
        let device = self
            .devices
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| HestiaError::not_found(id))?;
        self.selected = Some(device.id.clone());
        Ok(device)
    }

    /// Drop the selection, e.g. on logout
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The selected device, resolved against the current snapshot
    pub fn selected(&self) -> Option<&Device> {
        let id = self.selected.as_ref()?;
        self.devices.iter().find(|d| d.id == *id)
    }

    /// Id of the selected device, if any
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// All devices in the current snapshot
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Ids of all devices in roster order
    pub fn ids(&self) -> Vec<String> {
        self.devices.iter().map(|d| d.id.clone()).collect()
    }
}

impl Default for DeviceRoster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str) -> Device {
        Device {
            id: id.to_string(),
            program_enabled: false,
            periods: Vec::new(),
            advance_active: false,
        }
    }

    #[test]
    fn install_sorts_by_id() {
        let mut roster = DeviceRoster::new();
        roster.install(vec![device("living"), device("attic"), device("hall")]);
        let ids = roster.ids();
        assert_eq!(ids, vec!["attic", "hall", "living"]);
    }

    #[test]
    fn select_unknown_id_fails() {
        let mut roster = DeviceRoster::new();
        roster.install(vec![device("attic")]);
        assert!(matches!(
            roster.select("cellar"),
            Err(HestiaError::NotFound { .. })
        ));
        assert!(roster.selected().is_none());
    }

    #[test]
    fn selection_dropped_when_device_vanishes() {
        let mut roster = DeviceRoster::new();
        roster.install(vec![device("attic"), device("hall")]);
        roster.select("hall").unwrap();
        assert_eq!(roster.selected_id(), Some("hall"));

        roster.install(vec![device("attic")]);
        assert!(roster.selected().is_none());
        assert!(roster.selected_id().is_none());
    }

    #[test]
    fn install_device_replaces_in_place() {
        let mut roster = DeviceRoster::new();
        roster.install(vec![device("attic"), device("hall")]);

        let mut updated = device("attic");
        updated.advance_active = true;
        roster.install_device(updated);
        assert!(roster.devices()[0].advance_active);

        // Unknown ids are dropped, not appended
        roster.install_device(device("cellar"));
        assert_eq!(roster.ids(), vec!["attic", "hall"]);
    }

    #[test]
    fn selection_survives_reinstall_with_same_id() {
        let mut roster = DeviceRoster::new();
        roster.install(vec![device("attic"), device("hall")]);
        roster.select("hall").unwrap();

        let mut updated = device("hall");
        updated.program_enabled = true;
        roster.install(vec![device("attic"), updated]);
        assert!(roster.selected().map(|d| d.program_enabled).unwrap_or(false));
    }
}
