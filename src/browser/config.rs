use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Where the browser process is launched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchEnvironment {
    /// A developer machine with Chrome or Chromium on PATH
    #[default]
    Local,
    /// A constrained container or function runtime, usually with a bundled
    /// (often ARM) Chromium build at a fixed path
    Serverless,
}

/// Configuration for the headless browser used by the live section search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Launch profile (default: local)
    pub environment: LaunchEnvironment,

    /// Explicit Chrome/Chromium executable; auto-detected when unset
    pub executable: Option<PathBuf>,

    /// Timeout for navigation and for each wait-for-selector, in seconds (default: 30)
    pub timeout_secs: u64,

    /// Interval between element presence checks in milliseconds (default: 250)
    pub poll_interval_ms: u64,

    /// User agent string to use
    pub user_agent: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            environment: LaunchEnvironment::Local,
            executable: None,
            timeout_secs: 30,
            poll_interval_ms: 250,
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl BrowserConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Create a config for serverless runtimes
    pub fn serverless(executable: impl Into<PathBuf>) -> Self {
        Self {
            environment: LaunchEnvironment::Serverless,
            executable: Some(executable.into()),
            timeout_secs: 20,
            ..Default::default()
        }
    }

    /// Extra Chrome arguments for the launch environment
    pub fn launch_args(&self) -> Vec<&'static str> {
        let mut args = vec![
            "--no-sandbox",
            "--disable-gpu",
            "--disable-dev-shm-usage",
            "--disable-software-rasterizer",
        ];

        if self.environment == LaunchEnvironment::Serverless {
            args.extend([
                "--single-process",
                "--no-zygote",
                "--disable-setuid-sandbox",
                "--disable-extensions",
                "--no-first-run",
                "--mute-audio",
            ]);
        }

        args
    }
}
