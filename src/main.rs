//! Demo: one lunch rush against the in-memory store.
//!
//! Places a few orders, completes one group, discards one history batch and
//! prints the kitchen view as JSON after each step.

use kitchen_board::clock::SystemClock;
use kitchen_board::config::KitchenConfig;
use kitchen_board::lifecycle::tracing::setup_tracing;
use kitchen_board::lifecycle::KitchenSystem;
use kitchen_board::model::{OrderCreate, OrderLine};
use kitchen_board::store::StoreActor;
use kitchen_board::view::KitchenView;
use std::sync::Arc;
use tracing::{info, Instrument};

fn print_view(label: &str, view: &KitchenView) -> Result<(), String> {
    let json = serde_json::to_string_pretty(view).map_err(|e| e.to_string())?;
    println!("--- {label} ---\n{json}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = KitchenConfig::from_env().map_err(|e| e.to_string())?;
    info!(?config, "Starting kitchen board demo");

    let (store_actor, store) = StoreActor::new(config.channel_buffer, Arc::new(SystemClock));
    let store_handle = tokio::spawn(store_actor.run());

    let span = tracing::info_span!("lunch_rush");
    async {
        for order in [
            OrderCreate::for_table(
                "5",
                vec![OrderLine::new("curry", 750, 2), OrderLine::new("coffee", 400, 1)],
            ),
            OrderCreate::for_table("3", vec![OrderLine::new("pancake", 900, 1)]),
            OrderCreate::takeout(vec![OrderLine::new("omelette rice", 850, 1)]),
        ] {
            store.place_order(order).await.map_err(|e| e.to_string())?;
        }
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    let system = KitchenSystem::start(Arc::new(store.clone()), config)
        .await
        .map_err(|e| e.to_string())?;
    let mut views = system.view.watch();
    let view = system.view.refresh().await.map_err(|e| e.to_string())?;
    print_view("after placing orders", &view)?;

    let curry = view
        .group("5", "curry")
        .map(|g| g.ids.clone())
        .unwrap_or_default();
    let outcome = system
        .mutator
        .complete_group(&curry)
        .await
        .map_err(|e| e.to_string())?;
    info!(applied = outcome.applied().len(), "Curry for table 5 is ready");

    let view = views
        .wait_for(|v| v.group("5", "curry").is_none())
        .await
        .map_err(|e| e.to_string())?
        .clone();
    print_view("after completing table 5 curry", &view)?;

    if let Some(batch) = view.history.batches.first() {
        system
            .mutator
            .delete_group(&batch.ids)
            .await
            .map_err(|e| e.to_string())?;
    }
    let view = views
        .wait_for(|v| v.history.total == 0)
        .await
        .map_err(|e| e.to_string())?
        .clone();
    print_view("after clearing history", &view)?;

    system.shutdown().await.map_err(|e| e.to_string())?;
    drop(store);
    store_handle.await.map_err(|e| e.to_string())?;

    info!("Demo finished");
    Ok(())
}
