//! Check authorization and system capabilities.

use viewfinder_platform_core::{AuthorizationStatus, CapturePlatform};

pub fn run(platform: &dyn CapturePlatform) -> anyhow::Result<()> {
    println!("Viewfinder System Check");
    println!("{}", "=".repeat(50));

    match platform.authorization_status() {
        AuthorizationStatus::Authorized => println!("[OK] Camera access: authorized"),
        AuthorizationStatus::NotDetermined => {
            println!("[WARN] Camera access: not determined (requested on first discovery)")
        }
        AuthorizationStatus::Denied => println!("[MISSING] Camera access: denied"),
        AuthorizationStatus::Restricted => println!("[MISSING] Camera access: restricted"),
    }

    let capabilities = viewfinder_platform_macos::check_capabilities();
    println!();
    viewfinder_platform_macos::print_capability_report(&capabilities);

    let all_required_ok = capabilities
        .iter()
        .filter(|c| c.required)
        .all(|c| c.available);

    println!();
    if all_required_ok {
        println!("All required capabilities are available. Viewfinder is ready.");
    } else {
        println!("Some required capabilities are missing. See above for fixes.");
    }

    Ok(())
}
