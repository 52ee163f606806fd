//! Emulated Android device profiles
//!
//! A profile is picked at random for every login attempt when anti-detection
//! is enabled. The user agent is derived from the same profile so the two
//! never disagree.

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub app_version: String,
    pub android_version: u32,
    pub android_release: String,
    pub dpi: String,
    pub resolution: String,
    pub manufacturer: String,
    pub device: String,
    pub model: String,
    pub cpu: String,
    pub version_code: String,
}

const APP_VERSION: &str = "269.0.0.18.75";
const VERSION_CODE: &str = "314665256";

/// (android_version, release, dpi, resolution, manufacturer, device, model, cpu)
const PROFILES: &[(u32, &str, &str, &str, &str, &str, &str, &str)] = &[
    (31, "12.0", "480dpi", "1080x2400", "Samsung", "SM-G991B", "Galaxy S21", "exynos2100"),
    (33, "13.0", "420dpi", "1080x2340", "Google", "Pixel 7", "Pixel 7", "tensor"),
    (32, "12.1", "440dpi", "1440x3200", "Samsung", "SM-S908B", "Galaxy S22 Ultra", "exynos2200"),
];

impl DeviceProfile {
    /// Every known profile
    pub fn all() -> Vec<Self> {
        PROFILES
            .iter()
            .map(
                |&(android_version, release, dpi, resolution, manufacturer, device, model, cpu)| Self {
                    app_version: APP_VERSION.to_string(),
                    android_version,
                    android_release: release.to_string(),
                    dpi: dpi.to_string(),
                    resolution: resolution.to_string(),
                    manufacturer: manufacturer.to_string(),
                    device: device.to_string(),
                    model: model.to_string(),
                    cpu: cpu.to_string(),
                    version_code: VERSION_CODE.to_string(),
                },
            )
            .collect()
    }

    pub fn random() -> Self {
        let profiles = Self::all();
        profiles
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(Self::default_profile)
    }

    /// Profile used when anti-detection is off
    pub fn default_profile() -> Self {
        Self {
            app_version: APP_VERSION.to_string(),
            android_version: 31,
            android_release: "12.0".to_string(),
            dpi: "480dpi".to_string(),
            resolution: "1080x2400".to_string(),
            manufacturer: "Samsung".to_string(),
            device: "SM-G991B".to_string(),
            model: "Galaxy S21".to_string(),
            cpu: "exynos2100".to_string(),
            version_code: VERSION_CODE.to_string(),
        }
    }

    /// Mobile app user agent matching this device
    pub fn user_agent(&self) -> String {
        format!(
            "Instagram {} Android ({}/{}; {}; {}; {}; {}; {}; {}; en_US; {})",
            self.app_version,
            self.android_version,
            self.android_release,
            self.dpi,
            self.resolution,
            self.manufacturer,
            self.device,
            self.device,
            self.cpu,
            self.version_code
        )
    }
}
