//! Capture platform selection.

use anyhow::Result;
use viewfinder_platform_core::fake::FakePlatform;
use viewfinder_platform_core::CapturePlatform;

/// Pick the capture platform for this invocation.
pub fn select_platform(simulate: bool) -> Result<Box<dyn CapturePlatform>> {
    if simulate {
        tracing::info!("Using the in-memory simulator platform");
        return Ok(Box::new(FakePlatform::demo()));
    }

    #[cfg(target_os = "macos")]
    {
        Ok(Box::new(
            viewfinder_platform_macos::AvFoundationPlatform::new(),
        ))
    }
    #[cfg(not(target_os = "macos"))]
    {
        anyhow::bail!("only macOS capture is supported; pass --simulate elsewhere")
    }
}
