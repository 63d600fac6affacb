use std::{str::FromStr, sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use pacer_core::{
    controller::StaggerController, error::StaggerError, tracker::KeyedRequestTracker,
};
use pacer_events::{Environment, PageTypeEntry, PageTypeMap, parse_event};
use pacer_model::{OperationKind, PolicyPreset, RequestContext};
use pacer_observe::{
    LoggerConfig, LoggerLevel, init_local_offset, init_logger, sync_local_offset_periodically,
};
use pacer_prometheus::PrometheusMetrics;

fn main() -> anyhow::Result<()> {
    init_local_offset();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run())
}

async fn run() -> anyhow::Result<()> {
    // 1) logger
    let cfg = LoggerConfig {
        level: LoggerLevel::new("info")?,
        ..Default::default()
    };
    init_logger(&cfg)?;
    info!("logger initialized");

    // 2) timezone sync in the background
    let shutdown = CancellationToken::new();
    let tz_sync = tokio::spawn(sync_local_offset_periodically(
        Duration::from_secs(3_600),
        shutdown.clone(),
    ));

    // 3) page type table for the active environment
    let environment = Environment::Dev;
    let pages = PageTypeMap::new(
        "https://www-dev.shop.example/",
        [
            "https://www.shop.example/",
            "https://www-qat.shop.example/",
            "https://www-dev.shop.example/",
        ],
    )
    .load([
        PageTypeEntry {
            page_type: "autoship".to_string(),
            url: "/app/autoship".to_string(),
        },
        PageTypeEntry {
            page_type: "account".to_string(),
            url: "https://www.shop.example/app/account".to_string(),
        },
    ]);
    info!(environment = %environment, mappings = pages.len(), "page type table ready");

    // 4) incoming event → request context
    let event = serde_json::json!({
        "event": "Autoship Frequency Changed",
        "properties": {
            "page_type": "autoship",
            "eventCategory": "autoship",
            "eventAction": "frequency-change",
            "eventLabel": "every-4-weeks",
            "userId": "customer-42"
        }
    });
    let parsed = parse_event(&event)?;
    let kind = OperationKind::from_str(&parsed.action)?;
    let subject = parsed
        .extra
        .get("userId")
        .and_then(|v| v.as_str())
        .unwrap_or("anonymous")
        .to_string();
    let ctx = RequestContext::new(subject, kind).with_page_tag(parsed.page_type.clone());
    let target = pages
        .url_for(&parsed.page_type)
        .unwrap_or_else(|| pages.base_url());
    info!(key = %ctx.stagger_key(), target, event_type = %parsed.event_type, "event mapped to operation");

    // 5) controller with prometheus metrics
    let metrics = PrometheusMetrics::new()?;
    let controller = StaggerController::new(Arc::new(KeyedRequestTracker::new()))
        .with_metrics(Arc::new(metrics.clone()));

    // 6) caller-driven retry loop: staggering is automatic, re-invoking is ours
    let policy = PolicyPreset::SingleCall.policy();
    let mut ctx = ctx;
    let outcome = loop {
        let attempt = ctx.attempt;
        let result = controller
            .execute(&ctx, &policy, || simulate_dispatch(target, attempt))
            .await;

        match result {
            Ok(body) => break Ok(body),
            Err(err @ StaggerError::Transient { .. }) => {
                warn!(%err, "attempt failed, re-invoking");
                ctx = ctx.next_attempt();
            }
            Err(err) => break Err(err),
        }
    };

    match outcome {
        Ok(body) => info!(%body, "operation completed"),
        Err(err) => warn!(%err, "operation abandoned"),
    }

    shutdown.cancel();
    tz_sync.await?;
    Ok(())
}

/// Stand-in for the browser-automation dispatch, flaky on early attempts.
async fn simulate_dispatch(target: &str, attempt: u32) -> Result<String, String> {
    tokio::time::sleep(Duration::from_millis(25)).await;
    if attempt < 2 {
        Err(format!("navigation to {target} timed out"))
    } else {
        Ok(format!("dispatched to {target}"))
    }
}
