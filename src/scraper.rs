use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::ScraperConfig;
use crate::{AppError, Result};

/// Tries made to find a consent button before giving up on it.
const CONSENT_ATTEMPTS: u32 = 3;
const CONSENT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Produces the fully rendered HTML of a page.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String>;
}

/// Renders pages in headless Chrome.
///
/// Each call launches a fresh browser; the whole render, launch included, is
/// bounded by `render_timeout_secs`.
pub struct ChromeRenderer {
    config: ScraperConfig,
}

impl ChromeRenderer {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    fn launch_options(config: &ScraperConfig) -> Result<LaunchOptions<'static>> {
        let mut launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false) // Often needed in containerized environments
            .window_size(Some((1920, 1080)))
            .idle_browser_timeout(Duration::from_secs(config.render_timeout_secs))
            .args(vec![
                OsStr::new("--disable-blink-features=AutomationControlled"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-extensions"),
            ])
            .build()
            .map_err(|e| AppError::Render(format!("Failed to create launch options: {}", e)))?;

        if let Some(chrome_path) = &config.chrome_path {
            launch_options.path = Some(PathBuf::from(chrome_path));
        }

        Ok(launch_options)
    }

    fn render_blocking(config: &ScraperConfig, url: &str) -> Result<String> {
        let start_time = Instant::now();

        let browser = Browser::new(Self::launch_options(config)?)
            .map_err(|e| AppError::Render(format!("Failed to launch browser: {}", e)))?;
        let tab = browser
            .new_tab()
            .map_err(|e| AppError::Render(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_secs(config.render_timeout_secs));

        tab.set_user_agent(&config.user_agent, None, None)
            .map_err(|e| AppError::Render(format!("Failed to set user agent: {}", e)))?;

        info!(url, "Navigating");
        tab.navigate_to(url)
            .map_err(|e| AppError::Render(format!("Navigation failed: {}", e)))?
            .wait_until_navigated()
            .map_err(|e| AppError::Render(format!("Page load failed: {}", e)))?;

        if let Some(label) = Self::dismiss_consent(&tab, &config.consent_labels) {
            info!(label = %label, "Handled cookie consent");
        }

        // Listings are filled in by scripts after the load event
        std::thread::sleep(Duration::from_millis(config.settle_delay_ms));

        let html = tab
            .get_content()
            .map_err(|e| AppError::Render(format!("Failed to get page content: {}", e)))?;

        let _ = tab.close(true);
        debug!(
            bytes = html.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Page rendered"
        );
        Ok(html)
    }

    /// Clicks the first button whose text contains one of `labels`.
    /// Returns the label that matched.
    fn dismiss_consent(tab: &Tab, labels: &[String]) -> Option<String> {
        if labels.is_empty() {
            return None;
        }
        let script = Self::consent_script(labels);

        for attempt in 1..=CONSENT_ATTEMPTS {
            match tab.evaluate(&script, false) {
                Ok(result) => {
                    if let Some(label) = result.value.as_ref().and_then(|v| v.as_str()) {
                        return Some(label.to_string());
                    }
                }
                Err(e) => debug!(error = %e, attempt, "Consent check failed"),
            }
            std::thread::sleep(CONSENT_RETRY_DELAY);
        }

        debug!("No consent banner found");
        None
    }

    fn consent_script(labels: &[String]) -> String {
        let labels = serde_json::to_string(labels).unwrap_or_else(|_| "[]".to_string());
        format!(
            r#"
            (function(labels) {{
                const buttons = Array.from(document.querySelectorAll('button'));
                for (const label of labels) {{
                    const wanted = label.toLowerCase();
                    const button = buttons.find(b => (b.innerText || '').toLowerCase().includes(wanted));
                    if (button) {{
                        button.click();
                        return label;
                    }}
                }}
                return null;
            }})({})
            "#,
            labels
        )
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        let config = self.config.clone();
        let seconds = config.render_timeout_secs;
        let owned_url = url.to_string();

        let task = tokio::task::spawn_blocking(move || Self::render_blocking(&config, &owned_url));

        match tokio::time::timeout(Duration::from_secs(seconds), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(AppError::Render(format!("Render task failed: {}", join_error))),
            Err(_) => Err(AppError::RenderTimeout { seconds }),
        }
    }
}
