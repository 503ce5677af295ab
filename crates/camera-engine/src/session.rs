//! Per-camera preview session lifecycle.
//!
//! Each selected camera gets exactly one live [`CameraSession`] at a time.
//! The start sequence is `Created -> Configuring -> Starting -> {Running |
//! Failed}`; start attempts retry a bounded number of times with a fixed
//! backoff, never in parallel. There is no automatic recovery from `Failed`:
//! closing and reopening the viewer constructs a fresh session with the
//! retry count back at zero.

use std::sync::Arc;

use viewfinder_common::clock::{Delay, RetryPolicy, SessionClock};
use viewfinder_common::error::{ViewfinderError, ViewfinderResult};
use viewfinder_platform_core::{CameraDevice, CapturePlatform, CapturePreset, CaptureSession};

use crate::classify::{classify, DeviceCategory};
use crate::log::LogBuffer;

/// Lifecycle state of a camera preview session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraSessionState {
    /// Session created but not started.
    Created,
    /// Building the platform session and attaching the device input.
    Configuring,
    /// Issuing start attempts (including retries).
    Starting,
    /// Preview is live.
    Running,
    /// Start gave up; the error banner blanks the preview.
    Failed,
    /// Torn down by its viewer.
    Stopped,
}

/// One camera's capture session, log, and retry bookkeeping.
pub struct CameraSession {
    device: Arc<dyn CameraDevice>,
    category: DeviceCategory,
    policy: RetryPolicy,
    state: CameraSessionState,
    inner: Option<Box<dyn CaptureSession>>,
    preset: Option<CapturePreset>,
    clock: SessionClock,
    log: LogBuffer,
    error: Option<String>,
    attempt_count: u32,
}

impl CameraSession {
    /// Create a session for one device. The retry count starts at zero.
    pub fn new(device: Arc<dyn CameraDevice>, policy: RetryPolicy) -> Self {
        let category = classify(device.display_name(), device.unique_id());
        Self {
            device,
            category,
            policy,
            state: CameraSessionState::Created,
            inner: None,
            preset: None,
            clock: SessionClock::start(),
            log: LogBuffer::with_default_capacity(),
            error: None,
            attempt_count: 0,
        }
    }

    pub fn state(&self) -> CameraSessionState {
        self.state
    }

    pub fn device(&self) -> &Arc<dyn CameraDevice> {
        &self.device
    }

    pub fn category(&self) -> DeviceCategory {
        self.category
    }

    /// The quality preset selected during configuration, if any.
    pub fn preset(&self) -> Option<CapturePreset> {
        self.preset
    }

    /// The session's rolling log.
    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    /// The error banner that blanks the preview, if set.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.state == CameraSessionState::Running
    }

    /// Wall-clock time the session was created.
    pub fn created_at(&self) -> &str {
        self.clock.epoch_wall()
    }

    fn log_line(&mut self, message: impl AsRef<str>) {
        let line = format!("[{:5.1}s] {}", self.clock.elapsed_secs(), message.as_ref());
        self.log.push(line);
    }

    /// Build and start the platform session.
    ///
    /// Configuration failures are terminal immediately (no retry); start
    /// failures retry up to the policy's bound with a fixed backoff, then
    /// land in `Failed` with a message specialized by camera category.
    pub async fn start(
        &mut self,
        platform: &dyn CapturePlatform,
        delay: &dyn Delay,
    ) -> ViewfinderResult<()> {
        if self.state != CameraSessionState::Created {
            return Err(ViewfinderError::session_start(format!(
                "session for {} was already started",
                self.device.display_name()
            )));
        }

        if let Err(e) = self.configure(platform) {
            self.fail(e.to_string());
            return Err(e);
        }

        self.state = CameraSessionState::Starting;
        delay.sleep(self.policy.settle).await;

        loop {
            let session = self
                .inner
                .as_mut()
                .ok_or_else(|| ViewfinderError::session_start("capture session missing"))?;
            match session.start() {
                Ok(()) => {
                    self.state = CameraSessionState::Running;
                    self.log_line(format!(
                        "Preview running on {}",
                        self.device.display_name()
                    ));
                    tracing::info!(
                        device = self.device.display_name(),
                        "Capture session started"
                    );
                    return Ok(());
                }
                Err(e) => {
                    let attempt = self.attempt_count + 1;
                    self.log_line(format!("Start attempt {attempt} failed: {e}"));
                    tracing::warn!(
                        device = self.device.display_name(),
                        attempt,
                        error = %e,
                        "Capture session start failed"
                    );

                    if self.attempt_count < self.policy.max_retries {
                        self.attempt_count += 1;
                        delay.sleep(self.policy.backoff).await;
                        continue;
                    }

                    let message = start_failure_message(self.category, self.device.display_name());
                    self.fail(message.clone());
                    return Err(ViewfinderError::session_start(message));
                }
            }
        }
    }

    fn configure(&mut self, platform: &dyn CapturePlatform) -> ViewfinderResult<()> {
        self.state = CameraSessionState::Configuring;

        if !self.device.is_connected() {
            return Err(ViewfinderError::configuration(format!(
                "{} is no longer connected",
                self.device.display_name()
            )));
        }

        let mut session = platform.make_session()?;
        session
            .add_device_input(self.device.as_ref())
            .map_err(|e| {
                ViewfinderError::configuration(format!(
                    "cannot add input for {}: {e}",
                    self.device.display_name()
                ))
            })?;

        match CapturePreset::PREFERENCE
            .into_iter()
            .find(|p| session.supports_preset(*p))
        {
            Some(preset) => {
                session.set_preset(preset);
                self.preset = Some(preset);
                tracing::debug!(
                    device = self.device.display_name(),
                    ?preset,
                    "Selected quality preset"
                );
            }
            None => tracing::debug!(
                device = self.device.display_name(),
                "No quality preset supported; keeping session default"
            ),
        }

        session.bind_preview(self.device.unique_id());
        self.inner = Some(session);
        Ok(())
    }

    fn fail(&mut self, message: String) {
        self.state = CameraSessionState::Failed;
        self.log_line(&message);
        self.error = Some(message);
    }

    /// Tear the session down.
    ///
    /// The platform stop call is issued only if the session reports itself
    /// running; the session handle is released unconditionally either way.
    /// Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(mut session) = self.inner.take() {
            if session.is_running() {
                session.stop();
                tracing::info!(
                    device = self.device.display_name(),
                    "Capture session stopped"
                );
            }
        }
        self.state = CameraSessionState::Stopped;
    }
}

/// Terminal failure message specialized by camera category.
fn start_failure_message(category: DeviceCategory, name: &str) -> String {
    match category {
        DeviceCategory::Virtual => format!(
            "{name} never delivered video; virtual cameras need their source application running"
        ),
        DeviceCategory::Streaming => format!(
            "{name} never delivered video; start the streaming application and enable its camera output"
        ),
        DeviceCategory::ScreenCapture => format!(
            "{name} never delivered video; screen-capture sources need an active capture permission"
        ),
        DeviceCategory::Physical | DeviceCategory::Unknown => format!(
            "Could not start {name} after repeated attempts; it may be in use by another application"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewfinder_common::clock::RecordedDelay;
    use viewfinder_platform_core::fake::{FakeDevice, FakePlatform, SessionPlan};

    fn rig(name: &str) -> (FakePlatform, Arc<dyn CameraDevice>) {
        let platform = FakePlatform::authorized();
        let device = platform.push_device(FakeDevice::new("cam-0", name));
        (platform, device as Arc<dyn CameraDevice>)
    }

    #[tokio::test]
    async fn clean_start_runs_on_the_first_attempt() {
        let (platform, device) = rig("FaceTime HD Camera");
        let delay = RecordedDelay::new();
        let mut session = CameraSession::new(device, RetryPolicy::default());

        session.start(&platform, &delay).await.expect("start");
        assert!(session.is_running());
        assert_eq!(platform.counters().start_calls(), 1);
        // Only the settle wait, no backoff.
        assert_eq!(delay.slept(), vec![RetryPolicy::default().settle]);
        assert_eq!(session.log().len(), 1);
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn richest_supported_preset_is_selected() {
        let (platform, device) = rig("FaceTime HD Camera");
        platform.set_session_plan(SessionPlan {
            supported_presets: vec![CapturePreset::Medium, CapturePreset::Low],
            ..SessionPlan::default()
        });
        let mut session = CameraSession::new(device, RetryPolicy::immediate(3));

        session
            .start(&platform, &RecordedDelay::new())
            .await
            .expect("start");
        assert_eq!(session.preset(), Some(CapturePreset::Medium));
    }

    #[tokio::test]
    async fn no_supported_preset_keeps_the_session_default() {
        let (platform, device) = rig("FaceTime HD Camera");
        platform.set_session_plan(SessionPlan {
            supported_presets: Vec::new(),
            ..SessionPlan::default()
        });
        let mut session = CameraSession::new(device, RetryPolicy::immediate(3));

        session
            .start(&platform, &RecordedDelay::new())
            .await
            .expect("start");
        assert_eq!(session.preset(), None);
    }

    #[tokio::test]
    async fn disconnected_device_fails_fast_without_retries() {
        let (platform, device) = rig("FaceTime HD Camera");
        let delay = RecordedDelay::new();
        let mut session = CameraSession::new(device.clone(), RetryPolicy::default());

        let fake = platform.push_device(FakeDevice::new("gone", "Unplugged Cam").disconnected());
        let mut session_gone =
            CameraSession::new(fake as Arc<dyn CameraDevice>, RetryPolicy::default());
        let err = session_gone.start(&platform, &delay).await.unwrap_err();

        assert!(matches!(err, ViewfinderError::ConfigurationFailed { .. }));
        assert!(err.to_string().contains("no longer connected"));
        assert_eq!(session_gone.state(), CameraSessionState::Failed);
        assert!(session_gone.error().is_some());
        // Never reached the start loop: no platform start calls, no waits.
        assert_eq!(platform.counters().start_calls(), 0);
        assert!(delay.slept().is_empty());

        // The healthy sibling still starts.
        session.start(&platform, &delay).await.expect("start");
    }

    #[tokio::test]
    async fn rejected_input_is_a_configuration_failure() {
        let (platform, device) = rig("FaceTime HD Camera");
        platform.set_session_plan(SessionPlan {
            reject_input: true,
            ..SessionPlan::default()
        });
        let mut session = CameraSession::new(device, RetryPolicy::immediate(3));

        let err = session
            .start(&platform, &RecordedDelay::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cannot add input"));
        assert_eq!(session.state(), CameraSessionState::Failed);
        assert_eq!(platform.counters().start_calls(), 0);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let (platform, device) = rig("FaceTime HD Camera");
        platform.set_session_plan(SessionPlan {
            fail_start_attempts: 2,
            ..SessionPlan::default()
        });
        let mut session = CameraSession::new(device, RetryPolicy::immediate(3));

        session
            .start(&platform, &RecordedDelay::new())
            .await
            .expect("start");
        assert!(session.is_running());
        assert_eq!(platform.counters().start_calls(), 3);
        // Two attempt lines plus the running line.
        assert_eq!(session.log().len(), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_fail_after_exactly_the_bound() {
        let (platform, device) = rig("FaceTime HD Camera");
        platform.set_session_plan(SessionPlan::never_starts());
        let delay = RecordedDelay::new();
        let policy = RetryPolicy::default();
        let mut session = CameraSession::new(device, policy.clone());

        let err = session.start(&platform, &delay).await.unwrap_err();
        assert!(matches!(err, ViewfinderError::SessionStart { .. }));
        assert_eq!(session.state(), CameraSessionState::Failed);

        // One initial attempt plus max_retries retries, never more.
        assert_eq!(platform.counters().start_calls(), 1 + policy.max_retries);
        // One settle wait, then one backoff per retry.
        assert_eq!(
            delay.slept(),
            vec![policy.settle, policy.backoff, policy.backoff, policy.backoff]
        );

        // One log line per attempt plus the terminal message.
        let lines: Vec<_> = session.log().lines().collect();
        assert_eq!(lines.len(), 5);
        for (i, line) in lines.iter().take(4).enumerate() {
            assert!(line.contains(&format!("Start attempt {} failed", i + 1)));
        }
        assert!(lines[4].contains("after repeated attempts"));
        assert_eq!(session.error(), Some(lines[4].split("] ").nth(1).unwrap()));
    }

    #[tokio::test]
    async fn terminal_message_is_specialized_by_category() {
        let platform = FakePlatform::authorized();
        platform.set_session_plan(SessionPlan::never_starts());
        let obs = platform.push_device(FakeDevice::new("obs-0", "OBS Virtual Camera"));
        let mut session =
            CameraSession::new(obs as Arc<dyn CameraDevice>, RetryPolicy::immediate(3));

        let err = session
            .start(&platform, &RecordedDelay::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("streaming application"));
    }

    #[tokio::test]
    async fn stop_issues_exactly_one_platform_stop() {
        let (platform, device) = rig("FaceTime HD Camera");
        let mut session = CameraSession::new(device, RetryPolicy::immediate(3));
        session
            .start(&platform, &RecordedDelay::new())
            .await
            .expect("start");

        session.stop();
        assert_eq!(session.state(), CameraSessionState::Stopped);
        assert_eq!(platform.counters().stop_calls(), 1);

        session.stop();
        assert_eq!(platform.counters().stop_calls(), 1);
    }

    #[tokio::test]
    async fn stopping_a_failed_session_skips_the_platform_stop() {
        let (platform, device) = rig("FaceTime HD Camera");
        platform.set_session_plan(SessionPlan::never_starts());
        let mut session = CameraSession::new(device, RetryPolicy::immediate(3));
        let _ = session.start(&platform, &RecordedDelay::new()).await;

        session.stop();
        assert_eq!(session.state(), CameraSessionState::Stopped);
        assert_eq!(platform.counters().stop_calls(), 0);
    }

    #[tokio::test]
    async fn a_session_cannot_be_started_twice() {
        let (platform, device) = rig("FaceTime HD Camera");
        let mut session = CameraSession::new(device, RetryPolicy::immediate(3));
        session
            .start(&platform, &RecordedDelay::new())
            .await
            .expect("start");

        let err = session
            .start(&platform, &RecordedDelay::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already started"));
        assert!(session.is_running());
    }
}
