//! macOS platform scaffolding.
//!
//! This crate provides compile-safe placeholders for the AVFoundation capture
//! integration so the camera engine and CLI can depend on stable interfaces
//! before the concrete binding lands.

use std::sync::Arc;

use viewfinder_common::error::{ViewfinderError, ViewfinderResult};
use viewfinder_platform_core::{
    AuthorizationStatus, CameraDevice, CapturePlatform, CaptureSession, DeviceKind, MediaKind,
};

/// Placeholder for AVFoundation availability details.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvFoundationSupport {
    pub available: bool,
}

/// Probe whether the AVFoundation capture stack is available.
///
/// TODO(platform/macos): implement runtime capability detection.
pub fn probe_avfoundation_support() -> AvFoundationSupport {
    AvFoundationSupport { available: false }
}

/// The AVFoundation-backed capture platform.
///
/// TODO(platform/macos): wire up AVCaptureDevice discovery sessions and
/// AVCaptureSession construction.
pub struct AvFoundationPlatform;

impl AvFoundationPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AvFoundationPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CapturePlatform for AvFoundationPlatform {
    fn authorization_status(&self) -> AuthorizationStatus {
        AuthorizationStatus::NotDetermined
    }

    async fn request_access(&self) -> bool {
        tracing::warn!("AVFoundation authorization request is not implemented yet");
        false
    }

    fn enumerate_devices(
        &self,
        _kind: MediaKind,
        _filters: &[DeviceKind],
    ) -> ViewfinderResult<Vec<Arc<dyn CameraDevice>>> {
        Err(ViewfinderError::platform(
            "macOS device enumeration is not implemented yet",
        ))
    }

    fn make_session(&self) -> ViewfinderResult<Box<dyn CaptureSession>> {
        Err(ViewfinderError::platform(
            "macOS capture sessions are not implemented yet",
        ))
    }
}

/// A system capability the preview tool may need.
#[derive(Debug, Clone)]
pub struct Capability {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub required: bool,
    pub fix_instructions: Option<String>,
}

/// Check all capabilities and report status.
pub fn check_capabilities() -> Vec<Capability> {
    let avf = probe_avfoundation_support();

    vec![
        Capability {
            name: "AVFoundation".to_string(),
            description: "AVFoundation capture stack for device discovery and sessions"
                .to_string(),
            available: avf.available,
            required: true,
            fix_instructions: if avf.available {
                None
            } else {
                Some("Run on macOS 12 or later with AVFoundation available".to_string())
            },
        },
        Capability {
            name: "Camera Access".to_string(),
            description: "User consent for camera capture".to_string(),
            available: false,
            required: true,
            fix_instructions: Some(
                "Grant camera access under System Settings > Privacy & Security > Camera"
                    .to_string(),
            ),
        },
    ]
}

/// Print a user-friendly capability report.
pub fn print_capability_report(capabilities: &[Capability]) {
    println!("Viewfinder System Capabilities:");
    println!("{}", "-".repeat(60));

    for cap in capabilities {
        let status = if cap.available {
            "[OK]"
        } else if cap.required {
            "[MISSING - REQUIRED]"
        } else {
            "[MISSING - OPTIONAL]"
        };

        println!("  {} {}: {}", status, cap.name, cap.description);

        if let Some(ref fix) = cap.fix_instructions {
            println!("    Fix: {fix}");
        }
    }
}
