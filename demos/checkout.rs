//! Checkout Button
//!
//! This example drives both presentation variants of the purchase flow.
//!
//! Key concepts:
//! - One controller, configured per variant (plain vs. notification)
//! - Renderers follow snapshots instead of blocking dialogs
//! - Explicit dismissal cancels the auto-dismiss timer
//! - Failures are displayed and the trigger stays usable for a retry
//!
//! Run with: RUST_LOG=purchase_flow=debug cargo run --example checkout

use purchase_flow::builder::PurchaseFlowBuilder;
use purchase_flow::effects::{from_env, ProcessingError};
use purchase_flow::{FlowConfig, FlowLabels, FlowSnapshot, PurchaseFlow, SubmitOutcome};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// Stand-in for a storefront; the first order is declined.
#[derive(Clone)]
struct Storefront {
    declined_once: Arc<AtomicBool>,
}

fn render(snapshot: &FlowSnapshot, labels: &FlowLabels) {
    let trigger = if snapshot.trigger_disabled {
        format!("[{}] (disabled)", snapshot.trigger_label)
    } else {
        format!("[{}]", snapshot.trigger_label)
    };
    println!("  {:<24} state={}", trigger, snapshot.state);

    if snapshot.notification_visible {
        println!("  toast: {} {}", labels.success_title, labels.success_body);
    }
    if let Some(message) = &snapshot.error_message {
        println!("  error: {}", message);
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Checkout Button Example ===\n");

    // Variant 1: notification with early dismissal
    println!("Variant 1: Buy Now with cart notification");
    let labels = FlowLabels {
        busy: "Adding...".to_string(),
        success_body: "Vapor75 Keyboard has been added to your cart.".to_string(),
        ..FlowLabels::default()
    };
    let flow = PurchaseFlow::new(FlowConfig {
        labels: labels.clone(),
        auto_dismiss_ms: 2000,
        ..FlowConfig::notification()
    })
    .expect("valid configuration");

    let mut updates = flow.subscribe();
    let renderer_labels = labels.clone();
    let renderer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            render(&snapshot, &renderer_labels);
        }
    });

    flow.submit().await;
    tokio::time::sleep(Duration::from_millis(500)).await;
    println!("  (user closes the notification)");
    flow.dismiss_notification();
    println!();

    // Variant 1 again, letting the notification expire
    println!("Variant 1: notification auto-dismisses");
    flow.submit().await;
    tokio::time::sleep(Duration::from_millis(2100)).await;
    println!();

    // Variant 2: plain button with a declined first order
    println!("Variant 2: plain button, first order declined");
    let store = Storefront {
        declined_once: Arc::new(AtomicBool::new(false)),
    };
    let plain = PurchaseFlowBuilder::new()
        .env(store)
        .processing_delay(Duration::from_millis(600))
        .labels(FlowLabels {
            busy: "Loading...".to_string(),
            ..FlowLabels::default()
        })
        .action(from_env(|store: &Storefront| {
            if store.declined_once.swap(true, Ordering::SeqCst) {
                Ok(())
            } else {
                Err(ProcessingError::new(""))
            }
        }))
        .build()
        .expect("valid configuration");

    for attempt in 1..=2 {
        let outcome = plain.submit().await;
        render(&plain.snapshot(), &plain.config().labels);
        match outcome {
            SubmitOutcome::Succeeded => println!("  ✓ attempt {} succeeded", attempt),
            SubmitOutcome::Failed { message } => {
                println!("  ✗ attempt {} failed: {}", attempt, message)
            }
            SubmitOutcome::Ignored => println!("  - attempt {} ignored", attempt),
        }
    }

    println!("\nTransition history (plain button):");
    for transition in plain.history().transitions() {
        println!(
            "  {} -> {} ({:?}, attempt {})",
            transition.from, transition.to, transition.trigger, transition.attempt
        );
    }

    drop(flow);
    let _ = renderer.await;

    println!("\n=== Example Complete ===");
}
