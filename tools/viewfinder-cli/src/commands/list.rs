//! List discoverable cameras.

use viewfinder_camera_engine::{DiscoveryCoordinator, SelectionSet};
use viewfinder_common::clock::TokioDelay;
use viewfinder_platform_core::{CameraDevice, CapturePlatform};

pub async fn run(platform: &dyn CapturePlatform, json: bool) -> anyhow::Result<()> {
    let mut coordinator = DiscoveryCoordinator::new();
    let mut selection = SelectionSet::new();

    if let Err(e) = coordinator
        .discover(platform, &mut selection, &TokioDelay)
        .await
    {
        println!("Discovery failed: {e}");
        return Ok(());
    }

    if json {
        let summaries: Vec<_> = coordinator
            .available()
            .iter()
            .map(|c| c.summary())
            .collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("Discovered cameras:");
    for camera in coordinator.available() {
        let selected = if selection.contains(camera.device.unique_id()) {
            "*"
        } else {
            " "
        };
        println!(
            "  [{selected}] {}  ({}, {})",
            camera.device.display_name(),
            camera.category.label(),
            camera.device.unique_id()
        );
        if let Some(advisory) = camera.advisory {
            println!("      note: {advisory}");
        }
    }
    println!();
    println!("* = selected by default");
    Ok(())
}
