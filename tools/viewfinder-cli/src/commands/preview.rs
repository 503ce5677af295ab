//! Open preview sessions for selected cameras.

use viewfinder_camera_engine::{DiscoveryCoordinator, SelectionSet, ViewerRegistry};
use viewfinder_common::clock::TokioDelay;
use viewfinder_common::config::AppConfig;
use viewfinder_platform_core::{CameraDevice, CapturePlatform};

pub async fn run(
    platform: &dyn CapturePlatform,
    config: &AppConfig,
    devices: Vec<String>,
    all: bool,
) -> anyhow::Result<()> {
    let delay = TokioDelay;
    let mut coordinator = DiscoveryCoordinator::new();
    let mut selection = SelectionSet::new();

    coordinator
        .discover(platform, &mut selection, &delay)
        .await?;

    // The first camera is selected by default; layer explicit choices on top.
    for id in &devices {
        let Some(camera) = coordinator
            .available()
            .iter()
            .find(|c| c.device.unique_id() == id.as_str())
        else {
            anyhow::bail!("unknown device id: {id}");
        };
        if !selection.contains(id) {
            selection.toggle(&camera.device)?;
        }
    }
    if all {
        for camera in coordinator.available() {
            if !selection.contains(camera.device.unique_id()) {
                selection.toggle(&camera.device)?;
            }
        }
    }

    println!("Opening previews for {} camera(s)", selection.len());
    let mut registry = ViewerRegistry::new(config.capture.retry_policy());
    registry
        .open_for_selection(&selection, platform, &delay)
        .await;

    for viewer in registry.viewers() {
        println!();
        println!("== {} ==", viewer.title());
        if let Some(error) = viewer.session().error() {
            println!("   error: {error}");
        } else if let Some(advisory) = coordinator
            .available()
            .iter()
            .find(|c| c.device.unique_id() == viewer.device_id())
            .and_then(|c| c.advisory)
        {
            println!("   note: {advisory}");
        }
        for line in viewer.session().log().lines() {
            println!("   {line}");
        }
    }

    println!();
    println!("Press Ctrl+C to close all previews...");
    tokio::signal::ctrl_c().await?;

    println!();
    registry.close_all();
    println!("All previews closed.");
    Ok(())
}
