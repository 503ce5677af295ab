//! User selection of discovered cameras.

use std::sync::Arc;

use viewfinder_common::error::{ViewfinderError, ViewfinderResult};
use viewfinder_platform_core::{CameraDevice, ConfigurationLock};

/// Outcome of a successful toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Selected,
    Deselected,
}

/// The set of cameras the user currently wants previews for.
///
/// Membership is keyed by device unique id and kept in insertion order.
/// Only the owner of the published device list mutates this set; discovery
/// uses [`SelectionSet::reset`] and [`SelectionSet::clear`] as its entry
/// points.
#[derive(Default)]
pub struct SelectionSet {
    selected: Vec<Arc<dyn CameraDevice>>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership for a device.
    ///
    /// The device must pass a configuration-lock probe before the change is
    /// accepted; a probe failure reports a configuration error and leaves
    /// the set unchanged.
    pub fn toggle(&mut self, device: &Arc<dyn CameraDevice>) -> ViewfinderResult<SelectionChange> {
        ConfigurationLock::acquire(device.as_ref()).map_err(|e| {
            ViewfinderError::configuration(format!(
                "cannot select {}: {e}",
                device.display_name()
            ))
        })?;

        let id = device.unique_id();
        match self.selected.iter().position(|d| d.unique_id() == id) {
            Some(index) => {
                self.selected.remove(index);
                Ok(SelectionChange::Deselected)
            }
            None => {
                self.selected.push(device.clone());
                Ok(SelectionChange::Selected)
            }
        }
    }

    pub fn contains(&self, unique_id: &str) -> bool {
        self.selected.iter().any(|d| d.unique_id() == unique_id)
    }

    /// Selected devices in insertion order.
    pub fn devices(&self) -> &[Arc<dyn CameraDevice>] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Replace the selection with a single default device.
    pub fn reset(&mut self, device: Arc<dyn CameraDevice>) {
        self.selected.clear();
        self.selected.push(device);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}
