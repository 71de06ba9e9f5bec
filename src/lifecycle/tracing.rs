//! # Logging
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered
//! by `RUST_LOG`.
//!
//! ```bash
//! # Lifecycle, applied batches, stale-id warnings
//! RUST_LOG=info cargo run
//!
//! # Plus snapshot sizes, rebuilds and page switches
//! RUST_LOG=debug cargo run
//!
//! # Plus every urgency tick
//! RUST_LOG=trace cargo run
//! ```
//!
//! With `RUST_LOG=info` a demo run reads roughly:
//!
//! ```text
//! INFO Order store started
//! INFO Placed units=3 size=3
//! INFO Kitchen system started config=KitchenConfig { .. }
//! INFO Kitchen engine started orders=3 page=Recent(4)
//! INFO Batch committed applied=2 skipped=0 size=3
//! INFO complete_group: Batch applied operation="complete_group" requested=2 applied=2
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
