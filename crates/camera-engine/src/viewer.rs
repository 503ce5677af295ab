//! Preview viewer bookkeeping.
//!
//! One viewer per selected camera: it owns the camera's capture session and
//! rolling log, standing in for the preview window. The registry is an arena
//! keyed by device unique id with at most one live session per device.
//! Closed viewers stay tracked until every surface is closed, at which point
//! the whole set is cleared; owning-screen teardown closes everything at
//! once.

use viewfinder_common::clock::{Delay, RetryPolicy};
use viewfinder_platform_core::{CameraDevice, CapturePlatform};

use crate::selection::SelectionSet;
use crate::session::CameraSession;

/// A preview surface and the session feeding it.
pub struct Viewer {
    device_id: String,
    title: String,
    session: CameraSession,
    open: bool,
}

impl Viewer {
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Window title, the device's display name.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn session(&self) -> &CameraSession {
        &self.session
    }
}

/// Bookkeeping for every preview viewer on the screen.
pub struct ViewerRegistry {
    viewers: Vec<Viewer>,
    policy: RetryPolicy,
}

impl ViewerRegistry {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            viewers: Vec::new(),
            policy,
        }
    }

    /// Open one viewer per selected camera that does not already have an
    /// open one.
    ///
    /// Start failures stay local to their viewer (error banner plus log);
    /// the surface still opens so the user sees what went wrong. Returns the
    /// number of viewers opened.
    pub async fn open_for_selection(
        &mut self,
        selection: &SelectionSet,
        platform: &dyn CapturePlatform,
        delay: &dyn Delay,
    ) -> usize {
        let mut opened = 0;
        for device in selection.devices() {
            let id = device.unique_id();
            if self.is_open(id) {
                continue;
            }
            // A stale closed surface for this device is superseded.
            self.viewers.retain(|v| v.open || v.device_id != id);

            let mut session = CameraSession::new(device.clone(), self.policy.clone());
            if let Err(e) = session.start(platform, delay).await {
                tracing::warn!(
                    device = device.display_name(),
                    error = %e,
                    "Viewer opened with a failed session"
                );
            }
            self.viewers.push(Viewer {
                device_id: device.unique_id().to_string(),
                title: device.display_name().to_string(),
                session,
                open: true,
            });
            opened += 1;
        }
        opened
    }

    pub fn get(&self, device_id: &str) -> Option<&Viewer> {
        self.viewers.iter().find(|v| v.device_id == device_id)
    }

    pub fn is_open(&self, device_id: &str) -> bool {
        self.viewers
            .iter()
            .any(|v| v.device_id == device_id && v.open)
    }

    /// All tracked viewers, open or closed.
    pub fn viewers(&self) -> &[Viewer] {
        &self.viewers
    }

    pub fn open_count(&self) -> usize {
        self.viewers.iter().filter(|v| v.open).count()
    }

    pub fn len(&self) -> usize {
        self.viewers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewers.is_empty()
    }

    /// Handle a surface's close notification.
    ///
    /// Stops the viewer's session and marks the surface closed; once every
    /// tracked surface is closed the whole set is cleared. Returns false if
    /// no open viewer matches.
    pub fn close(&mut self, device_id: &str) -> bool {
        let Some(viewer) = self
            .viewers
            .iter_mut()
            .find(|v| v.device_id == device_id && v.open)
        else {
            return false;
        };
        viewer.session.stop();
        viewer.open = false;

        if self.viewers.iter().all(|v| !v.open) {
            self.viewers.clear();
        }
        true
    }

    /// Owning-screen teardown: stop every outstanding session and drop all
    /// tracked surfaces.
    pub fn close_all(&mut self) {
        for viewer in &mut self.viewers {
            viewer.session.stop();
        }
        self.viewers.clear();
    }
}
