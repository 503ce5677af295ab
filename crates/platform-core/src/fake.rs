//! In-memory capture platform.
//!
//! A scriptable stand-in for the real platform used by unit tests and the
//! CLI simulator: devices carry toggleable connection/suspension/busy flags,
//! and sessions follow a [`SessionPlan`] that can reject inputs or fail a
//! number of start attempts. Shared [`SessionCounters`] expose how often the
//! platform was actually called.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use viewfinder_common::error::{ViewfinderError, ViewfinderResult};

use crate::{
    AuthorizationStatus, CameraDevice, CapturePlatform, CapturePreset, CaptureSession,
    DeviceFormat, DeviceKind, MediaKind,
};

/// An in-memory camera device.
pub struct FakeDevice {
    id: String,
    name: String,
    connected: AtomicBool,
    suspended: AtomicBool,
    video: bool,
    formats: Vec<DeviceFormat>,
    lock: AtomicBool,
    busy: AtomicBool,
}

impl FakeDevice {
    /// A connected, unsuspended video device with two common formats.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            connected: AtomicBool::new(true),
            suspended: AtomicBool::new(false),
            video: true,
            formats: vec![
                DeviceFormat {
                    width: 1920,
                    height: 1080,
                    max_frame_rate: 30,
                    pixel_format: "420v".to_string(),
                },
                DeviceFormat {
                    width: 1280,
                    height: 720,
                    max_frame_rate: 60,
                    pixel_format: "420v".to_string(),
                },
            ],
            lock: AtomicBool::new(false),
            busy: AtomicBool::new(false),
        }
    }

    pub fn disconnected(self) -> Self {
        self.connected.store(false, Ordering::SeqCst);
        self
    }

    pub fn suspended(self) -> Self {
        self.suspended.store(true, Ordering::SeqCst);
        self
    }

    pub fn without_video(mut self) -> Self {
        self.video = false;
        self
    }

    pub fn without_formats(mut self) -> Self {
        self.formats.clear();
        self
    }

    /// Simulate the configuration lock being held by another process.
    pub fn busy(self) -> Self {
        self.busy.store(true, Ordering::SeqCst);
        self
    }

    /// Flip the connection flag at runtime (hot-unplug simulation).
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

impl CameraDevice for FakeDevice {
    fn unique_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::SeqCst)
    }

    fn has_video(&self) -> bool {
        self.video
    }

    fn formats(&self) -> Vec<DeviceFormat> {
        self.formats.clone()
    }

    fn try_lock_configuration(&self) -> ViewfinderResult<()> {
        if self.busy.load(Ordering::SeqCst) {
            return Err(ViewfinderError::camera_in_use(&self.name));
        }
        if self.lock.swap(true, Ordering::SeqCst) {
            return Err(ViewfinderError::camera_in_use(&self.name));
        }
        Ok(())
    }

    fn unlock_configuration(&self) {
        self.lock.store(false, Ordering::SeqCst);
    }
}

/// Scripted behavior for sessions created by a [`FakePlatform`].
#[derive(Debug, Clone)]
pub struct SessionPlan {
    /// Refuse [`CaptureSession::add_device_input`].
    pub reject_input: bool,

    /// Fail this many start attempts before succeeding.
    pub fail_start_attempts: u32,

    /// Presets the session reports as supported.
    pub supported_presets: Vec<CapturePreset>,

    /// Refuse session construction entirely.
    pub refuse_sessions: bool,
}

impl Default for SessionPlan {
    fn default() -> Self {
        Self {
            reject_input: false,
            fail_start_attempts: 0,
            supported_presets: CapturePreset::PREFERENCE.to_vec(),
            refuse_sessions: false,
        }
    }
}

impl SessionPlan {
    /// A plan whose sessions never start successfully.
    pub fn never_starts() -> Self {
        Self {
            fail_start_attempts: u32::MAX,
            ..Self::default()
        }
    }
}

/// Shared call counters across every session a platform hands out.
#[derive(Debug, Default)]
pub struct SessionCounters {
    sessions_created: AtomicU32,
    start_calls: AtomicU32,
    stop_calls: AtomicU32,
}

impl SessionCounters {
    pub fn sessions_created(&self) -> u32 {
        self.sessions_created.load(Ordering::SeqCst)
    }

    pub fn start_calls(&self) -> u32 {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> u32 {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

/// An in-memory capture session following a [`SessionPlan`].
pub struct FakeSession {
    counters: Arc<SessionCounters>,
    supported_presets: Vec<CapturePreset>,
    reject_input: bool,
    failures_left: u32,
    has_input: bool,
    preset: Option<CapturePreset>,
    preview: Option<String>,
    running: bool,
}

impl FakeSession {
    fn from_plan(plan: &SessionPlan, counters: Arc<SessionCounters>) -> Self {
        Self {
            counters,
            supported_presets: plan.supported_presets.clone(),
            reject_input: plan.reject_input,
            failures_left: plan.fail_start_attempts,
            has_input: false,
            preset: None,
            preview: None,
            running: false,
        }
    }

    /// The preset selected via [`CaptureSession::set_preset`], if any.
    pub fn preset(&self) -> Option<CapturePreset> {
        self.preset
    }

    /// The bound preview surface, if any.
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }
}

impl CaptureSession for FakeSession {
    fn add_device_input(&mut self, device: &dyn CameraDevice) -> ViewfinderResult<()> {
        if self.reject_input {
            return Err(ViewfinderError::configuration(format!(
                "session refused input from {}",
                device.display_name()
            )));
        }
        self.has_input = true;
        Ok(())
    }

    fn supports_preset(&self, preset: CapturePreset) -> bool {
        self.supported_presets.contains(&preset)
    }

    fn set_preset(&mut self, preset: CapturePreset) {
        self.preset = Some(preset);
    }

    fn bind_preview(&mut self, surface: &str) {
        self.preview = Some(surface.to_string());
    }

    fn start(&mut self) -> ViewfinderResult<()> {
        self.counters.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.failures_left > 0 {
            self.failures_left = self.failures_left.saturating_sub(1);
            return Err(ViewfinderError::session_start("simulated start failure"));
        }
        if !self.has_input {
            return Err(ViewfinderError::session_start("no device input attached"));
        }
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.counters.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// An in-memory capture platform.
pub struct FakePlatform {
    authorization: Mutex<AuthorizationStatus>,
    grant_on_request: bool,
    devices: Mutex<Vec<Arc<FakeDevice>>>,
    plan: Mutex<SessionPlan>,
    counters: Arc<SessionCounters>,
}

impl FakePlatform {
    /// A platform that is already authorized and has no devices.
    pub fn authorized() -> Self {
        Self::with_status(AuthorizationStatus::Authorized, true)
    }

    /// A platform in the given authorization state; `grant_on_request`
    /// scripts the outcome of an access request.
    pub fn with_status(status: AuthorizationStatus, grant_on_request: bool) -> Self {
        Self {
            authorization: Mutex::new(status),
            grant_on_request,
            devices: Mutex::new(Vec::new()),
            plan: Mutex::new(SessionPlan::default()),
            counters: Arc::new(SessionCounters::default()),
        }
    }

    /// The three-camera rig behind the CLI `--simulate` flag.
    pub fn demo() -> Self {
        let platform = Self::authorized();
        platform.push_device(FakeDevice::new("built-in-0", "FaceTime HD Camera"));
        platform.push_device(FakeDevice::new("usb-brio-1", "Logitech BRIO"));
        platform.push_device(FakeDevice::new("obs-virtual-0", "OBS Virtual Camera"));
        platform
    }

    /// Register a device; returns the shared handle for later flag flips.
    pub fn push_device(&self, device: FakeDevice) -> Arc<FakeDevice> {
        let device = Arc::new(device);
        lock_ignoring_poison(&self.devices).push(device.clone());
        device
    }

    /// Script the behavior of sessions created from now on.
    pub fn set_session_plan(&self, plan: SessionPlan) {
        *lock_ignoring_poison(&self.plan) = plan;
    }

    /// The shared call counters.
    pub fn counters(&self) -> Arc<SessionCounters> {
        self.counters.clone()
    }
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait::async_trait]
impl CapturePlatform for FakePlatform {
    fn authorization_status(&self) -> AuthorizationStatus {
        *lock_ignoring_poison(&self.authorization)
    }

    async fn request_access(&self) -> bool {
        let mut status = lock_ignoring_poison(&self.authorization);
        if self.grant_on_request {
            *status = AuthorizationStatus::Authorized;
            true
        } else {
            *status = AuthorizationStatus::Denied;
            false
        }
    }

    fn enumerate_devices(
        &self,
        kind: MediaKind,
        _filters: &[DeviceKind],
    ) -> ViewfinderResult<Vec<Arc<dyn CameraDevice>>> {
        if kind != MediaKind::Video {
            return Ok(Vec::new());
        }
        Ok(lock_ignoring_poison(&self.devices)
            .iter()
            .map(|d| d.clone() as Arc<dyn CameraDevice>)
            .collect())
    }

    fn make_session(&self) -> ViewfinderResult<Box<dyn CaptureSession>> {
        let plan = lock_ignoring_poison(&self.plan);
        if plan.refuse_sessions {
            return Err(ViewfinderError::platform("session construction refused"));
        }
        self.counters.sessions_created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession::from_plan(&plan, self.counters.clone())))
    }
}
