use super::*;
use permit_watcher::check_logger::CheckLogger;
use permit_watcher::models::ListingStatus;
use permit_watcher::plugins::notifiers::DiscordNotifier;
use permit_watcher::state_store::StateStore;
use permit_watcher::{CheckFailure, CheckOutcome, ParkingMonitor};
use std::sync::Arc;
use tempfile::TempDir;

fn build_monitor(config: &AppConfig, renderer: Arc<ScriptedRenderer>) -> ParkingMonitor {
    let notifier = Arc::new(DiscordNotifier::new(config.notifications.discord.clone()).unwrap());
    ParkingMonitor::new(config, renderer, notifier)
}

#[tokio::test]
async fn test_sold_out_then_available_sends_one_alert() -> anyhow::Result<()> {
    let server = discord_mock_server().await;
    let dir = TempDir::new()?;
    let config = get_test_config(dir.path(), Some(webhook_url(&server)));

    let renderer = Arc::new(ScriptedRenderer::new(vec![
        Ok(reservation_page("Sold Out")),
        Ok(reservation_page("Sold Out")),
        Ok(reservation_page("<button>Add to Cart</button>")),
        Ok(reservation_page("<button>Add to Cart</button>")),
    ]));
    let monitor = build_monitor(&config, renderer.clone());

    let mut sent = Vec::new();
    for _ in 0..4 {
        match monitor.run_check().await? {
            CheckOutcome::Checked { notification_sent, .. } => sent.push(notification_sent),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    assert_eq!(sent, vec![false, false, true, false]);
    assert_eq!(renderer.calls(), 4);

    let payloads = webhook_payloads(&server).await;
    assert_eq!(payloads.len(), 1);
    let embed = &payloads[0]["embeds"][0];
    assert_eq!(embed["title"], "🚗 PARKING AVAILABLE!");
    assert_eq!(embed["description"], LISTING);
    assert_eq!(embed["url"], TARGET_URL);
    assert_eq!(embed["fields"][0]["name"], "Price");
    assert_eq!(embed["fields"][0]["value"], "$67.45");
    assert_eq!(payloads[0]["username"], "Parking Monitor Test");

    let history = CheckLogger::from_config(&config.storage).recent(10)?;
    assert_eq!(history.len(), 4);
    assert_eq!(history.iter().filter(|e| e.notification_sent).count(), 1);

    let text_log = std::fs::read_to_string(config.storage.history_text_path())?;
    assert!(text_log.contains("📨 NOTIFIED"));
    assert!(text_log.contains("🎉 PARKING AVAILABLE at "));

    Ok(())
}

#[tokio::test]
async fn test_failure_streak_escalates_once_and_recovers() -> anyhow::Result<()> {
    let server = discord_mock_server().await;
    let dir = TempDir::new()?;
    let config = get_test_config(dir.path(), Some(webhook_url(&server)));

    let renderer = Arc::new(ScriptedRenderer::new(vec![
        Ok(reservation_page("Sold Out")),
        Err("navigation timeout".to_string()),
        Err("navigation timeout".to_string()),
        Ok("<html><body>Maintenance</body></html>".to_string()),
        Err("navigation timeout".to_string()),
        Ok(reservation_page("Sold Out")),
    ]));
    let monitor = build_monitor(&config, renderer);

    let mut outcomes = Vec::new();
    for _ in 0..6 {
        outcomes.push(monitor.run_check().await?);
    }

    assert_eq!(
        outcomes[3],
        CheckOutcome::Failed {
            kind: CheckFailure::ListingNotFound,
            error_count: 3,
            escalated: true,
        }
    );
    assert_eq!(
        outcomes[4],
        CheckOutcome::Failed {
            kind: CheckFailure::RenderFailure,
            error_count: 4,
            escalated: false,
        }
    );
    assert!(matches!(outcomes[5], CheckOutcome::Checked { notification_sent: false, .. }));

    let payloads = webhook_payloads(&server).await;
    assert_eq!(payloads.len(), 1);
    let embed = &payloads[0]["embeds"][0];
    assert_eq!(embed["title"], "⚠️ Monitoring Error");
    assert_eq!(embed["fields"][0]["value"], "3");
    assert_eq!(embed["fields"][1]["value"], LISTING);

    let state = StateStore::new(config.storage.state_path()).load()?;
    assert_eq!(state.error_count, 0);
    assert_eq!(state.status(), ListingStatus::SoldOut);
    assert!(state.last_error.is_some());

    // Only successful checks reach the history
    assert_eq!(CheckLogger::from_config(&config.storage).recent(10)?.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_missing_webhook_still_updates_state() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let config = get_test_config(dir.path(), None);

    let renderer = Arc::new(ScriptedRenderer::new(vec![
        Ok(reservation_page("Sold Out")),
        Ok(reservation_page("<button>Add to Cart</button>")),
    ]));
    let monitor = build_monitor(&config, renderer);

    monitor.run_check().await?;
    let outcome = monitor.run_check().await?;

    match outcome {
        CheckOutcome::Checked { detection, notification_sent, .. } => {
            assert!(detection.should_notify);
            assert!(!notification_sent);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(monitor.store().load()?.status(), ListingStatus::Available);

    Ok(())
}

#[tokio::test]
async fn test_rejected_webhook_does_not_block_state() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new()?;
    let config = get_test_config(dir.path(), Some(server.uri()));
    let renderer = Arc::new(ScriptedRenderer::new(vec![
        Ok(reservation_page("Sold Out")),
        Ok(reservation_page("<button>Add to Cart</button>")),
        Ok(reservation_page("<button>Add to Cart</button>")),
    ]));
    let monitor = build_monitor(&config, renderer);

    for _ in 0..3 {
        monitor.run_check().await?;
    }

    // No retry on the following run: the transition has already been recorded
    let state = monitor.store().load()?;
    assert_eq!(state.status(), ListingStatus::Available);
    assert_eq!(state.error_count, 0);

    Ok(())
}
