//! Pre-flight device health checks.

use viewfinder_platform_core::{CameraDevice, ConfigurationLock};

use crate::classify::{classify, DeviceCategory};

/// Verdict on whether a device is currently usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthVerdict {
    Healthy,
    Unhealthy { reason: String },
}

impl HealthVerdict {
    fn unhealthy(reason: impl Into<String>) -> Self {
        Self::Unhealthy {
            reason: reason.into(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthVerdict::Healthy)
    }

    /// The failure reason, if unhealthy.
    pub fn reason(&self) -> Option<&str> {
        match self {
            HealthVerdict::Healthy => None,
            HealthVerdict::Unhealthy { reason } => Some(reason),
        }
    }
}

/// Decide whether a device is currently usable.
///
/// The configuration-lock probe is non-destructive: the lock is released
/// immediately on success, and a probe failure means "in use", not fatal.
/// Non-physical devices must also prove they can deliver video, since
/// virtual drivers often enumerate without a backing source.
pub fn check_health(device: &dyn CameraDevice) -> HealthVerdict {
    if !device.is_connected() {
        return HealthVerdict::unhealthy("not connected");
    }
    if device.is_suspended() {
        return HealthVerdict::unhealthy("suspended");
    }
    if ConfigurationLock::acquire(device).is_err() {
        return HealthVerdict::unhealthy("in use by another application");
    }

    let category = classify(device.display_name(), device.unique_id());
    if category != DeviceCategory::Physical {
        if !device.has_video() {
            return HealthVerdict::unhealthy("no video capability");
        }
        if device.formats().is_empty() {
            return HealthVerdict::unhealthy("no supported formats");
        }
    }

    HealthVerdict::Healthy
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewfinder_platform_core::fake::FakeDevice;

    #[test]
    fn disconnected_wins_over_every_other_condition() {
        let device = FakeDevice::new("cam", "OBS Virtual Camera")
            .disconnected()
            .suspended()
            .busy()
            .without_formats();
        assert_eq!(check_health(&device).reason(), Some("not connected"));
    }

    #[test]
    fn suspended_devices_are_unhealthy() {
        let device = FakeDevice::new("cam", "FaceTime HD Camera").suspended();
        assert_eq!(check_health(&device).reason(), Some("suspended"));
    }

    #[test]
    fn busy_devices_report_in_use() {
        let device = FakeDevice::new("cam", "FaceTime HD Camera").busy();
        assert_eq!(
            check_health(&device).reason(),
            Some("in use by another application")
        );
    }

    #[test]
    fn virtual_device_without_formats_is_unhealthy() {
        let device = FakeDevice::new("cam", "Acme Virtual Camera").without_formats();
        assert_eq!(check_health(&device).reason(), Some("no supported formats"));
    }

    #[test]
    fn virtual_device_without_video_is_unhealthy() {
        let device = FakeDevice::new("cam", "Acme Virtual Camera").without_video();
        assert_eq!(check_health(&device).reason(), Some("no video capability"));
    }

    #[test]
    fn physical_device_is_exempt_from_capability_checks() {
        let device = FakeDevice::new("cam", "FaceTime HD Camera")
            .without_video()
            .without_formats();
        assert!(check_health(&device).is_healthy());
    }

    #[test]
    fn probe_lock_is_released_after_a_healthy_check() {
        let device = FakeDevice::new("cam", "FaceTime HD Camera");
        assert!(check_health(&device).is_healthy());
        // The probe must not leave the configuration lock held.
        assert!(device.try_lock_configuration().is_ok());
        device.unlock_configuration();
    }
}
