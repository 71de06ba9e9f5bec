use super::engine::{Engine, EngineSettings};
use super::error::SystemError;
use crate::aggregate::HistoryPage;
use crate::clock::{Clock, SystemClock};
use crate::config::KitchenConfig;
use crate::mutator::BatchMutator;
use crate::store::OrderStore;
use crate::stream::OrderStream;
use crate::urgency::UrgencyClock;
use crate::view::ViewClient;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

/// The running kitchen engine and the handles presentation uses.
///
/// # Example
///
/// ```ignore
/// let system = KitchenSystem::start(Arc::new(store), KitchenConfig::from_env()?).await?;
///
/// let view = system.view.current();
/// if let Some(group) = view.group("5", "curry") {
///     system.mutator.complete_group(&group.ids).await?;
/// }
///
/// system.shutdown().await?;
/// ```
pub struct KitchenSystem {
    /// Read side: the composed view and history paging.
    pub view: ViewClient,

    /// Write side: group completion and deletion.
    pub mutator: BatchMutator,

    handle: JoinHandle<()>,
}

impl KitchenSystem {
    /// Starts the system on the wall clock.
    pub async fn start(
        store: Arc<dyn OrderStore>,
        config: KitchenConfig,
    ) -> Result<Self, SystemError> {
        Self::start_with_clock(store, config, Arc::new(SystemClock)).await
    }

    /// Starts the system with an injected time source.
    ///
    /// Subscribes to `store`, builds the first view from its current snapshot
    /// and spawns the dispatch loop. Fails without spawning anything if the
    /// configuration is invalid or the subscription is refused.
    #[instrument(skip(store, config, clock))]
    pub async fn start_with_clock(
        store: Arc<dyn OrderStore>,
        config: KitchenConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SystemError> {
        config.validate()?;
        let settings = EngineSettings {
            offset: config.display_offset()?,
            urgency_threshold: config.urgency_threshold,
            history_page: HistoryPage::Recent(config.history_page_size),
        };

        let stream = OrderStream::attach(store.as_ref()).await?;
        let mutator = BatchMutator::new(store, stream.reader());
        let ticker = UrgencyClock::new(config.tick_period, clock);

        let (sender, receiver) = mpsc::channel(config.channel_buffer);
        let (engine, views) = Engine::new(stream, ticker, receiver, settings);
        let handle = tokio::spawn(engine.run());

        info!(?config, "Kitchen system started");
        Ok(Self {
            view: ViewClient::new(sender, views, config.history_page_size),
            mutator,
            handle,
        })
    }

    /// Stops the dispatch loop and waits for it.
    ///
    /// Dropping the view client closes the request channel, which ends the
    /// loop. Clones of the view client handed out earlier keep it alive.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down kitchen system...");
        drop(self.view);
        drop(self.mutator);

        if let Err(e) = self.handle.await {
            error!("Dispatch task failed: {:?}", e);
            return Err(SystemError::TaskFailed(e.to_string()));
        }

        info!("Kitchen system shutdown complete.");
        Ok(())
    }
}
