//! Camera discovery coordination.
//!
//! One discovery pass runs authorization, enumeration, health filtering, and
//! classification, then publishes the surviving device list wholesale and
//! auto-selects the first entry. Failures wipe the published state and leave
//! a banner; the coordinator always returns to idle, and the caller retries
//! by invoking [`DiscoveryCoordinator::discover`] again.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use viewfinder_common::clock::Delay;
use viewfinder_common::error::{ViewfinderError, ViewfinderResult};
use viewfinder_platform_core::{
    AuthorizationStatus, CameraDevice, CapturePlatform, DeviceKind, MediaKind,
};

use crate::classify::{advisory_warning, classify, DeviceCategory};
use crate::health::{check_health, HealthVerdict};
use crate::selection::SelectionSet;

/// Device-type filters used when asking the platform for cameras.
pub const DEFAULT_DEVICE_FILTERS: &[DeviceKind] = &[
    DeviceKind::BuiltIn,
    DeviceKind::External,
    DeviceKind::Continuity,
];

/// Settle wait before enumeration, giving just-granted authorization and
/// hot-plugged devices a moment to register.
pub const DISCOVERY_SETTLE: Duration = Duration::from_millis(200);

/// Where a discovery run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    Idle,
    Authorizing,
    Discovering,
}

/// A usable camera surviving health checks, annotated for display.
#[derive(Clone)]
pub struct DiscoveredCamera {
    pub device: Arc<dyn CameraDevice>,
    pub category: DeviceCategory,
    pub advisory: Option<&'static str>,
}

impl DiscoveredCamera {
    pub fn summary(&self) -> DeviceSummary {
        DeviceSummary {
            unique_id: self.device.unique_id().to_string(),
            name: self.device.display_name().to_string(),
            category: self.category,
            advisory: self.advisory.map(str::to_string),
        }
    }
}

/// Serializable projection of a discovered camera.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceSummary {
    pub unique_id: String,
    pub name: String,
    pub category: DeviceCategory,
    pub advisory: Option<String>,
}

/// Coordinates discovery passes and owns the published device list.
pub struct DiscoveryCoordinator {
    state: DiscoveryState,
    available: Vec<DiscoveredCamera>,
    banner: Option<String>,
}

impl DiscoveryCoordinator {
    pub fn new() -> Self {
        Self {
            state: DiscoveryState::Idle,
            available: Vec::new(),
            banner: None,
        }
    }

    pub fn state(&self) -> DiscoveryState {
        self.state
    }

    /// The currently published device list.
    pub fn available(&self) -> &[DiscoveredCamera] {
        &self.available
    }

    /// The error banner from the last failed run, if any.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Run one discovery pass.
    ///
    /// No-op while a pass is already in flight. On success publishes the
    /// surviving devices, resets the selection to the first entry, and
    /// clears the banner; returns the published count. Every failure clears
    /// the published list and the selection.
    pub async fn discover(
        &mut self,
        platform: &dyn CapturePlatform,
        selection: &mut SelectionSet,
        delay: &dyn Delay,
    ) -> ViewfinderResult<usize> {
        if self.state != DiscoveryState::Idle {
            tracing::debug!(state = ?self.state, "Discovery already in flight; ignoring");
            return Ok(self.available.len());
        }

        match platform.authorization_status() {
            AuthorizationStatus::Authorized => {}
            AuthorizationStatus::NotDetermined => {
                self.state = DiscoveryState::Authorizing;
                tracing::info!("Requesting camera access");
                if !platform.request_access().await {
                    return Err(self.fail(selection, ViewfinderError::NotAuthorized));
                }
            }
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                return Err(self.fail(selection, ViewfinderError::NotAuthorized));
            }
        }

        self.state = DiscoveryState::Discovering;
        delay.sleep(DISCOVERY_SETTLE).await;

        let devices = match platform.enumerate_devices(MediaKind::Video, DEFAULT_DEVICE_FILTERS) {
            Ok(devices) => devices,
            Err(e) => return Err(self.fail(selection, e)),
        };
        if devices.is_empty() {
            return Err(self.fail(selection, ViewfinderError::NoCamerasAvailable));
        }

        let mut usable = Vec::new();
        for device in devices {
            match check_health(device.as_ref()) {
                HealthVerdict::Healthy => {
                    let category = classify(device.display_name(), device.unique_id());
                    usable.push(DiscoveredCamera {
                        advisory: advisory_warning(category),
                        category,
                        device,
                    });
                }
                HealthVerdict::Unhealthy { reason } => {
                    tracing::debug!(
                        device = device.display_name(),
                        reason = %reason,
                        "Dropping unhealthy device"
                    );
                }
            }
        }
        if usable.is_empty() {
            return Err(self.fail(selection, ViewfinderError::NoCamerasAvailable));
        }

        tracing::info!(count = usable.len(), "Discovery published device list");
        selection.reset(usable[0].device.clone());
        self.available = usable;
        self.banner = None;
        self.state = DiscoveryState::Idle;
        Ok(self.available.len())
    }

    fn fail(&mut self, selection: &mut SelectionSet, error: ViewfinderError) -> ViewfinderError {
        tracing::warn!(error = %error, "Discovery failed");
        self.available.clear();
        selection.clear();
        self.banner = Some(error.to_string());
        self.state = DiscoveryState::Idle;
        error
    }
}

impl Default for DiscoveryCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewfinder_common::clock::RecordedDelay;
    use viewfinder_platform_core::fake::{FakeDevice, FakePlatform};

    async fn run(
        coordinator: &mut DiscoveryCoordinator,
        platform: &FakePlatform,
        selection: &mut SelectionSet,
    ) -> ViewfinderResult<usize> {
        coordinator
            .discover(platform, selection, &RecordedDelay::new())
            .await
    }

    #[tokio::test]
    async fn denied_authorization_is_terminal_for_the_run() {
        let platform = FakePlatform::with_status(AuthorizationStatus::Denied, false);
        platform.push_device(FakeDevice::new("cam", "Cam"));
        let mut coordinator = DiscoveryCoordinator::new();
        let mut selection = SelectionSet::new();

        let err = run(&mut coordinator, &platform, &mut selection)
            .await
            .unwrap_err();
        assert!(matches!(err, ViewfinderError::NotAuthorized));
        assert!(coordinator.available().is_empty());
        assert!(selection.is_empty());
        assert!(coordinator.banner().is_some());
        assert_eq!(coordinator.state(), DiscoveryState::Idle);
    }

    #[tokio::test]
    async fn undetermined_authorization_is_requested_and_granted() {
        let platform = FakePlatform::with_status(AuthorizationStatus::NotDetermined, true);
        platform.push_device(FakeDevice::new("cam", "FaceTime HD Camera"));
        let mut coordinator = DiscoveryCoordinator::new();
        let mut selection = SelectionSet::new();

        let published = run(&mut coordinator, &platform, &mut selection)
            .await
            .expect("discovery");
        assert_eq!(published, 1);
        assert_eq!(platform.authorization_status(), AuthorizationStatus::Authorized);
    }

    #[tokio::test]
    async fn refused_request_fails_not_authorized() {
        let platform = FakePlatform::with_status(AuthorizationStatus::NotDetermined, false);
        platform.push_device(FakeDevice::new("cam", "Cam"));
        let mut coordinator = DiscoveryCoordinator::new();
        let mut selection = SelectionSet::new();

        let err = run(&mut coordinator, &platform, &mut selection)
            .await
            .unwrap_err();
        assert!(matches!(err, ViewfinderError::NotAuthorized));
    }

    #[tokio::test]
    async fn zero_enumerated_devices_is_an_error_not_an_empty_list() {
        let platform = FakePlatform::authorized();
        let mut coordinator = DiscoveryCoordinator::new();
        let mut selection = SelectionSet::new();

        let err = run(&mut coordinator, &platform, &mut selection)
            .await
            .unwrap_err();
        assert!(matches!(err, ViewfinderError::NoCamerasAvailable));
        assert!(coordinator.available().is_empty());
    }

    #[tokio::test]
    async fn all_unhealthy_devices_is_no_cameras_available() {
        let platform = FakePlatform::authorized();
        platform.push_device(FakeDevice::new("a", "Cam A").disconnected());
        platform.push_device(FakeDevice::new("b", "Cam B").busy());
        let mut coordinator = DiscoveryCoordinator::new();
        let mut selection = SelectionSet::new();

        let err = run(&mut coordinator, &platform, &mut selection)
            .await
            .unwrap_err();
        assert!(matches!(err, ViewfinderError::NoCamerasAvailable));
    }

    #[tokio::test]
    async fn unhealthy_devices_are_dropped_silently() {
        let platform = FakePlatform::authorized();
        platform.push_device(FakeDevice::new("bad", "Broken Cam").disconnected());
        platform.push_device(FakeDevice::new("good", "FaceTime HD Camera"));
        let mut coordinator = DiscoveryCoordinator::new();
        let mut selection = SelectionSet::new();

        let published = run(&mut coordinator, &platform, &mut selection)
            .await
            .expect("discovery");
        assert_eq!(published, 1);
        assert_eq!(coordinator.available()[0].device.unique_id(), "good");
    }

    #[tokio::test]
    async fn success_publishes_all_and_selects_exactly_the_first() {
        let platform = FakePlatform::demo();
        let mut coordinator = DiscoveryCoordinator::new();
        let mut selection = SelectionSet::new();

        let published = run(&mut coordinator, &platform, &mut selection)
            .await
            .expect("discovery");
        assert_eq!(published, 3);
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(coordinator.available()[0].device.unique_id()));
        assert!(coordinator.banner().is_none());
    }

    #[tokio::test]
    async fn devices_are_annotated_with_category_and_advisory() {
        let platform = FakePlatform::demo();
        let mut coordinator = DiscoveryCoordinator::new();
        let mut selection = SelectionSet::new();

        run(&mut coordinator, &platform, &mut selection)
            .await
            .expect("discovery");

        let obs = coordinator
            .available()
            .iter()
            .find(|c| c.device.display_name().contains("OBS"))
            .expect("OBS device");
        assert_eq!(obs.category, DeviceCategory::Streaming);
        assert!(obs.advisory.is_some());

        let facetime = coordinator
            .available()
            .iter()
            .find(|c| c.device.display_name().contains("FaceTime"))
            .expect("FaceTime device");
        assert_eq!(facetime.category, DeviceCategory::Physical);
        assert!(facetime.advisory.is_none());
    }

    #[tokio::test]
    async fn failure_wipes_previously_published_state() {
        let platform = FakePlatform::authorized();
        let cam = platform.push_device(FakeDevice::new("cam", "FaceTime HD Camera"));
        let mut coordinator = DiscoveryCoordinator::new();
        let mut selection = SelectionSet::new();

        run(&mut coordinator, &platform, &mut selection)
            .await
            .expect("first discovery");
        assert_eq!(coordinator.available().len(), 1);

        cam.set_connected(false);
        let err = run(&mut coordinator, &platform, &mut selection)
            .await
            .unwrap_err();
        assert!(matches!(err, ViewfinderError::NoCamerasAvailable));
        assert!(coordinator.available().is_empty());
        assert!(selection.is_empty());
    }

    #[tokio::test]
    async fn enumeration_waits_out_the_settle_delay() {
        let platform = FakePlatform::demo();
        let delay = RecordedDelay::new();
        let mut coordinator = DiscoveryCoordinator::new();
        let mut selection = SelectionSet::new();

        coordinator
            .discover(&platform, &mut selection, &delay)
            .await
            .expect("discovery");
        assert_eq!(delay.slept(), vec![DISCOVERY_SETTLE]);
    }
}
