//! Client fingerprint variation
//!
//! Each session gets a realistic desktop user agent and viewport so that
//! consecutive sessions do not share an identical fingerprint.

use rand::seq::IndexedRandom;

/// Realistic desktop user agents
pub const USER_AGENTS: &[&str] = &[
    // Chrome on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    // Chrome on Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    // Firefox on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    // Safari on Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Realistic viewport sizes
pub const VIEWPORTS: &[Viewport] = &[
    Viewport { width: 1920, height: 1080 },
    Viewport { width: 1536, height: 864 },
    Viewport { width: 1440, height: 900 },
    Viewport { width: 1366, height: 768 },
    Viewport { width: 2560, height: 1440 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Browser-like context for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub viewport: Viewport,
    /// `None` lets the client send its default user agent
    pub user_agent: Option<String>,
    pub locale: String,
    pub timezone_id: String,
}

impl Fingerprint {
    /// Randomized viewport and user agent
    pub fn random() -> Self {
        let mut rng = rand::rng();
        Self {
            viewport: *VIEWPORTS.choose(&mut rng).unwrap_or(&VIEWPORTS[0]),
            user_agent: USER_AGENTS.choose(&mut rng).map(|ua| ua.to_string()),
            ..Self::fixed()
        }
    }

    /// Deterministic fingerprint used when anti-detection is off
    pub fn fixed() -> Self {
        Self {
            viewport: Viewport {
                width: 1920,
                height: 1080,
            },
            user_agent: None,
            locale: "en-US".to_string(),
            timezone_id: "America/New_York".to_string(),
        }
    }

    /// `en-US` → `en-US,en;q=0.9`
    pub fn accept_language(&self) -> String {
        match self.locale.split('-').next() {
            Some(lang) if lang != self.locale => format!("{},{};q=0.9", self.locale, lang),
            _ => self.locale.clone(),
        }
    }
}
