// Integration tests for permit-watcher
// These tests drive full checks against scripted pages and a mock webhook

pub mod extraction_tests;
pub mod monitor_tests;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use permit_watcher::{
    AppConfig, AppError,
    config::{DiscordConfig, LoggingConfig, MonitorConfig, NotificationsConfig, ScraperConfig, StorageConfig},
    models::AmbiguityPolicy,
    scraper::PageRenderer,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LISTING: &str = "Samuel Merritt University Fall 2025 Parking";
pub const TARGET_URL: &str = "https://space.example.com/site/reserve/4fac9ba1";
pub const WEBHOOK_PATH: &str = "/api/webhooks/123/token";

/// Test configuration for integration tests
pub fn get_test_config(data_dir: &Path, webhook_url: Option<String>) -> AppConfig {
    AppConfig {
        monitor: MonitorConfig {
            url: TARGET_URL.to_string(),
            listing_name: LISTING.to_string(),
            default_price: "$67.45".to_string(),
            error_threshold: 3,
            ambiguous_status: AmbiguityPolicy::SoldOut,
        },
        scraper: ScraperConfig {
            render_timeout_secs: 5,
            settle_delay_ms: 0,
            user_agent: "PermitWatcher-Test/1.0".to_string(),
            chrome_path: None,
            consent_labels: vec!["Allow all cookies".to_string()],
        },
        notifications: NotificationsConfig {
            discord: DiscordConfig {
                webhook_url,
                username: "Parking Monitor Test".to_string(),
                avatar_url: None,
                footer_text: "Parking Permit Monitor".to_string(),
            },
        },
        storage: StorageConfig {
            data_dir: data_dir.to_path_buf(),
            state_file: "last_state.json".to_string(),
            history_file: "check_history.json".to_string(),
            history_text_file: "check_history.txt".to_string(),
            history_cap: 1000,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            to_file: false,
            file_prefix: "permit-watcher.log".to_string(),
        },
    }
}

/// Renders a fixed sequence of pages; `Err` entries become render failures.
pub struct ScriptedRenderer {
    pages: Mutex<VecDeque<Result<String, String>>>,
    calls: AtomicUsize,
}

impl ScriptedRenderer {
    pub fn new(pages: Vec<Result<String, String>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageRenderer for ScriptedRenderer {
    async fn render(&self, _url: &str) -> permit_watcher::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.pages.lock().unwrap().pop_front();
        match next {
            Some(Ok(page)) => Ok(page),
            Some(Err(message)) => Err(AppError::Render(message)),
            None => Err(AppError::Render("no page scripted".to_string())),
        }
    }
}

/// Reservation page shaped like the real one: several product cards, a
/// cookie banner and script content that mentions the listing.
pub fn reservation_page(listing_status: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Reserve Parking</title>
  <script>window.__products = ["{LISTING}"];</script>
</head>
<body>
  <div class="cookie-banner">
    <p>We use cookies.</p>
    <button>Use necessary cookies only</button>
    <button>Allow all cookies</button>
  </div>
  <main>
    <div class="product-list">
      <div class="product-card">
        <div class="product-name">Evening Permit</div>
        <div class="product-price">$45.00</div>
        <button class="btn">Add to Cart</button>
      </div>
      <div class="product-card">
        <div class="product-name">{LISTING}</div>
        <div class="product-price">$67.45</div>
        <div class="product-action">{listing_status}</div>
      </div>
    </div>
  </main>
</body>
</html>"#
    )
}

pub async fn discord_mock_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    server
}

pub fn webhook_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), WEBHOOK_PATH)
}

/// Bodies of every webhook call, parsed as JSON.
pub async fn webhook_payloads(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}
