//! Camera category classification.
//!
//! Categories are derived from a device's display name and unique identifier
//! by ordered keyword matching. Screen-capture terms outrank streaming terms,
//! which outrank virtual-camera terms, so hybrid products (a streaming suite
//! that also ships a virtual camera, say) land in the most specific bucket.

use serde::{Deserialize, Serialize};

/// Coarse camera category derived from name/identifier heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCategory {
    Physical,
    Virtual,
    Streaming,
    ScreenCapture,
    Unknown,
}

impl DeviceCategory {
    /// Short lowercase label for display.
    pub fn label(&self) -> &'static str {
        match self {
            DeviceCategory::Physical => "physical",
            DeviceCategory::Virtual => "virtual",
            DeviceCategory::Streaming => "streaming",
            DeviceCategory::ScreenCapture => "screen-capture",
            DeviceCategory::Unknown => "unknown",
        }
    }
}

/// Ordered classification table; the first row with a matching keyword wins.
const CLASSIFICATION_TABLE: &[(DeviceCategory, &[&str])] = &[
    (
        DeviceCategory::ScreenCapture,
        &["screen", "display capture", "desktop"],
    ),
    (
        DeviceCategory::Streaming,
        &["obs", "streamlabs", "xsplit", "wirecast", "prism live", "mmhmm"],
    ),
    (
        DeviceCategory::Virtual,
        &["virtual", "snap camera", "manycam", "camtwist", "camo", "epoccam", "ndi"],
    ),
    (
        DeviceCategory::Physical,
        &[
            "facetime",
            "built-in",
            "builtin",
            "usb",
            "webcam",
            "logitech",
            "razer",
            "elgato",
            "iphone",
            "continuity",
            "studio display",
        ],
    ),
];

/// Classify a device from its display name and unique identifier.
///
/// Pure and deterministic: case-insensitive substring matching against the
/// ordered table; no match yields [`DeviceCategory::Unknown`].
pub fn classify(name: &str, unique_id: &str) -> DeviceCategory {
    let name = name.to_lowercase();
    let id = unique_id.to_lowercase();

    for (category, keywords) in CLASSIFICATION_TABLE {
        if keywords.iter().any(|kw| name.contains(kw) || id.contains(kw)) {
            return *category;
        }
    }
    DeviceCategory::Unknown
}

/// Fixed caution message for non-physical categories, None for physical.
pub fn advisory_warning(category: DeviceCategory) -> Option<&'static str> {
    match category {
        DeviceCategory::Physical => None,
        DeviceCategory::Virtual => Some(
            "Virtual camera: frames come from software, not a sensor; the feed stays blank until its source application provides video",
        ),
        DeviceCategory::Streaming => Some(
            "Streaming-software camera: start the host application and enable its camera output, or the preview may stay blank",
        ),
        DeviceCategory::ScreenCapture => Some(
            "Screen-capture source: previewing it can feed the preview window back into itself",
        ),
        DeviceCategory::Unknown => Some("Unrecognized camera type: preview behavior may vary"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn screen_capture_outranks_virtual() {
        // Contains both a screen-capture and a virtual keyword.
        assert_eq!(
            classify("Screen Share Virtual Device", "vendor-0001"),
            DeviceCategory::ScreenCapture
        );
    }

    #[test]
    fn streaming_outranks_virtual() {
        assert_eq!(
            classify("OBS Virtual Camera", "obs-virtual-0"),
            DeviceCategory::Streaming
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("FACETIME HD CAMERA", ""), DeviceCategory::Physical);
        assert_eq!(classify("facetime hd camera", ""), DeviceCategory::Physical);
    }

    #[test]
    fn identifier_is_consulted_when_name_is_opaque() {
        assert_eq!(
            classify("Camera", "com.obsproject.virtual-cam"),
            DeviceCategory::Streaming
        );
    }

    #[test]
    fn unmatched_devices_are_unknown() {
        assert_eq!(classify("Acme Imager 3000", "0x12345"), DeviceCategory::Unknown);
    }

    #[test]
    fn physical_gets_no_advisory_and_others_are_distinct() {
        assert!(advisory_warning(DeviceCategory::Physical).is_none());

        let warnings = [
            DeviceCategory::Virtual,
            DeviceCategory::Streaming,
            DeviceCategory::ScreenCapture,
            DeviceCategory::Unknown,
        ]
        .map(|c| advisory_warning(c).expect("non-physical categories warn"));

        for (i, a) in warnings.iter().enumerate() {
            for b in warnings.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    proptest! {
        // Screen-capture terms sit first in the table, so any name carrying
        // one classifies as screen-capture no matter what else it contains.
        #[test]
        fn screen_terms_always_win(prefix in "[A-Za-z0-9 ]{0,16}") {
            let name = format!("{prefix} Screen Mirror");
            prop_assert_eq!(classify(&name, ""), DeviceCategory::ScreenCapture);
        }

        #[test]
        fn casing_never_changes_the_verdict(name in "[A-Za-z ]{1,24}") {
            prop_assert_eq!(
                classify(&name.to_uppercase(), ""),
                classify(&name.to_lowercase(), "")
            );
        }
    }
}
