//! Viewfinder platform capture contracts.
//!
//! This crate contains the device, authorization, and capture-session
//! interfaces consumed by the camera engine without coupling to a concrete
//! OS capture framework. Device handles are externally shared with any other
//! process using the camera, so every configuration change goes through the
//! [`ConfigurationLock`] acquire/release bracket.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use viewfinder_common::error::ViewfinderResult;

pub mod fake;

/// Camera authorization state reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    NotDetermined,
    Authorized,
    Denied,
    Restricted,
}

/// Media kind requested during device enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
}

/// Device-type filter passed to enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    BuiltIn,
    External,
    Continuity,
    DeskView,
}

/// Capture quality preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapturePreset {
    High,
    Medium,
    Low,
}

impl CapturePreset {
    /// Richest-first order used when configuring a session.
    pub const PREFERENCE: [CapturePreset; 3] =
        [CapturePreset::High, CapturePreset::Medium, CapturePreset::Low];
}

/// One supported resolution/frame-rate combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceFormat {
    /// Frame width in pixels.
    pub width: u32,
    pub height: u32,

    /// Maximum frame rate in Hz.
    pub max_frame_rate: u32,

    /// FourCC-style pixel format tag (for example "420v").
    pub pixel_format: String,
}

/// A video-capture device handle owned by the platform.
///
/// Viewfinder holds non-owning references; the flags and format list reflect
/// the platform's current view of the device and can change between calls.
pub trait CameraDevice: Send + Sync {
    /// Opaque unique identifier, stable for the device's lifetime.
    fn unique_id(&self) -> &str;

    /// Human-readable display name.
    fn display_name(&self) -> &str;

    /// Whether the device is currently connected.
    fn is_connected(&self) -> bool;

    /// Whether the platform reports the device as suspended.
    fn is_suspended(&self) -> bool;

    /// Whether the device can deliver video at all.
    fn has_video(&self) -> bool;

    /// Supported formats, possibly empty for misbehaving virtual devices.
    fn formats(&self) -> Vec<DeviceFormat>;

    /// Acquire the platform configuration lock. Fails if another process
    /// (or another lock holder in this one) already holds it.
    fn try_lock_configuration(&self) -> ViewfinderResult<()>;

    /// Release the platform configuration lock.
    fn unlock_configuration(&self);
}

/// RAII bracket around a device's configuration lock.
///
/// Acquire failure means "device busy", never a fatal condition. The lock is
/// released when the guard drops.
pub struct ConfigurationLock<'a> {
    device: &'a dyn CameraDevice,
}

impl<'a> ConfigurationLock<'a> {
    pub fn acquire(device: &'a dyn CameraDevice) -> ViewfinderResult<Self> {
        device.try_lock_configuration()?;
        Ok(Self { device })
    }
}

impl std::fmt::Debug for ConfigurationLock<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationLock").finish_non_exhaustive()
    }
}

impl Drop for ConfigurationLock<'_> {
    fn drop(&mut self) {
        self.device.unlock_configuration();
    }
}

/// A platform capture-session object bound to one device input.
pub trait CaptureSession: Send {
    /// Attach the device as the session's input. May be refused.
    fn add_device_input(&mut self, device: &dyn CameraDevice) -> ViewfinderResult<()>;

    /// Whether the session can run at the given preset.
    fn supports_preset(&self, preset: CapturePreset) -> bool;

    /// Select a preset. Callers check [`CaptureSession::supports_preset`] first.
    fn set_preset(&mut self, preset: CapturePreset);

    /// Bind the session's output to a preview surface.
    fn bind_preview(&mut self, surface: &str);

    /// Start capturing. Retried by the session lifecycle on failure.
    fn start(&mut self) -> ViewfinderResult<()>;

    /// Stop capturing. Infallible in the platform's own type signature.
    fn stop(&mut self);

    /// Whether the session reports itself as running.
    fn is_running(&self) -> bool;
}

/// The capture platform: authorization, enumeration, session construction.
#[async_trait::async_trait]
pub trait CapturePlatform: Send + Sync {
    /// Current authorization status for camera access.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Request camera access; resolves with the user's decision.
    async fn request_access(&self) -> bool;

    /// Enumerate devices of the given media kind matching the filters.
    fn enumerate_devices(
        &self,
        kind: MediaKind,
        filters: &[DeviceKind],
    ) -> ViewfinderResult<Vec<Arc<dyn CameraDevice>>>;

    /// Construct a new capture session.
    fn make_session(&self) -> ViewfinderResult<Box<dyn CaptureSession>>;
}
