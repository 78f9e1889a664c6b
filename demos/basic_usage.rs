// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic slru-cache usage example.
//!
//! Demonstrates:
//! 1. Building an engine (Redis when `REDIS_URL` is set, in-memory otherwise)
//! 2. Admitting entries into the cold segment
//! 3. Promoting a frequently-read entry into hot
//! 4. Cold eviction and hot demotion
//! 5. Printing the status snapshot and metrics
//! 6. Clearing the cache
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_usage
//! REDIS_URL=redis://localhost:6379 cargo run --example basic_usage
//! ```

use std::sync::Arc;
use serde_json::{json, Value};
use slru_cache::{InMemoryHashStore, SetOutcome, SlruConfig, SlruEngine};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().expect("failed to install metrics recorder");

    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║           slru-cache: Basic Usage Example                     ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Build the engine
    // ─────────────────────────────────────────────────────────────────────────
    let engine: SlruEngine<Value> = match std::env::var("REDIS_URL") {
        Ok(url) => {
            println!("📦 Connecting to Redis at {}...", url);
            let config = SlruConfig {
                redis_url: Some(url),
                redis_prefix: Some("slru-demo:".into()),
                clear_scope: slru_cache::ClearScope::Segments,
                ..Default::default()
            };
            SlruEngine::connect(config).await?
        }
        Err(_) => {
            println!("📦 REDIS_URL not set, using the in-memory store");
            SlruEngine::new(Arc::new(InMemoryHashStore::new()), SlruConfig::default())?
        }
    };
    let config = engine.config();
    println!(
        "   cold={} (cap {}), hot={} (cap {}), threshold={}",
        config.cold.name, config.cold.capacity, config.hot.name, config.hot.capacity,
        config.promotion_threshold,
    );

    // ─────────────────────────────────────────────────────────────────────────
    // 2. Admit entries
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📝 Admitting 3 entries...");
    for (i, name) in ["alice", "bob", "carol"].iter().enumerate() {
        let key = format!("user:{}", name);
        let outcome = engine.set(&key, json!({"name": name, "id": i})).await?;
        println!("   └─ {} → {:?}", key, outcome);
    }
    let again = engine.set("user:alice", json!({"name": "impostor"})).await?;
    assert_eq!(again, SetOutcome::AlreadyPresent);
    println!("   └─ user:alice again → {:?} (value kept)", again);

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Promotion
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🔥 Reading user:alice twice...");
    for _ in 0..2 {
        let value = engine.get("user:alice").await?;
        println!("   └─ {}", value.map(|v| v.to_string()).unwrap_or_else(|| "(miss)".into()));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Eviction and demotion
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🧹 Admitting more entries to force cold eviction...");
    for name in ["dave", "erin", "frank"] {
        engine.set(&format!("user:{}", name), json!({"name": name})).await?;
    }
    println!("\n🔁 Promoting two more keys to force a hot demotion...");
    for key in ["user:erin", "user:frank"] {
        engine.get(key).await?;
        engine.get(key).await?;
    }
    println!("   └─ user:bob → {:?}", engine.get("user:bob").await?);

    // ─────────────────────────────────────────────────────────────────────────
    // 5. Status and metrics
    // ─────────────────────────────────────────────────────────────────────────
    let status = engine.status().await?;
    println!("\n📊 Status:");
    println!("{}", serde_json::to_string_pretty(&status)?);

    println!("\n📈 Raw Metrics:");
    dump_metrics(&snapshotter);

    // ─────────────────────────────────────────────────────────────────────────
    // 6. Clear
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🛑 Clearing ({:?})...", engine.config().clear_scope);
    engine.clear().await?;
    println!("   ✅ Empty: {}", engine.status().await?.is_empty());

    Ok(())
}

fn dump_metrics(snapshotter: &Snapshotter) {
    let snapshot = snapshotter.snapshot();

    let mut counters: Vec<_> = vec![];
    let mut gauges: Vec<_> = vec![];

    for (composite_key, _, _, value) in snapshot.into_vec() {
        let (_, key) = composite_key.into_parts();
        let name = key.name().to_string();
        let labels: Vec<_> = key.labels().map(|l| format!("{}={}", l.key(), l.value())).collect();
        let label_str = if labels.is_empty() { String::new() } else { format!("{{{}}}", labels.join(",")) };

        match value {
            DebugValue::Counter(v) => counters.push((name, label_str, v)),
            DebugValue::Gauge(v) => gauges.push((name, label_str, v.into_inner())),
            DebugValue::Histogram(_) => {}
        }
    }

    counters.sort();
    gauges.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));

    if !counters.is_empty() {
        println!("   ┌─ Counters (cumulative)");
        for (name, labels, value) in &counters {
            println!("   │  └─ {}{} = {}", name, labels, value);
        }
    }
    if !gauges.is_empty() {
        println!("   └─ Gauges (current)");
        for (name, labels, value) in &gauges {
            println!("      └─ {}{} = {}", name, labels, value);
        }
    }
}
