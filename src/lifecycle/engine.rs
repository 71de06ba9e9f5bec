//! The dispatch loop.
//!
//! One task owns every derived view and handles three event sources in turn:
//! snapshot changes, urgency ticks and view requests. Handlers are synchronous,
//! so a rebuild always runs to completion before the next event is looked at.

use crate::aggregate::{
    aggregate_cooking, aggregate_history, summarize_sales, CookingView, HistoryPage, HistoryView,
    SalesSummary,
};
use crate::model::Snapshot;
use crate::stream::OrderStream;
use crate::urgency::{assess, UrgencyBoard, UrgencyClock};
use crate::view::{compose, KitchenView, ViewRequest};
use chrono::{DateTime, FixedOffset, Utc};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace};

/// Settings the loop needs from [`KitchenConfig`](crate::config::KitchenConfig).
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub offset: FixedOffset,
    pub urgency_threshold: Duration,
    pub history_page: HistoryPage,
}

pub struct Engine {
    stream: OrderStream,
    ticker: UrgencyClock,
    requests: mpsc::Receiver<ViewRequest>,
    views: watch::Sender<KitchenView>,
    settings: EngineSettings,
    cooking: CookingView,
    history: HistoryView,
    sales: SalesSummary,
    board: UrgencyBoard,
}

impl Engine {
    /// Builds the initial view from the stream's seed snapshot.
    pub fn new(
        stream: OrderStream,
        ticker: UrgencyClock,
        requests: mpsc::Receiver<ViewRequest>,
        settings: EngineSettings,
    ) -> (Self, watch::Receiver<KitchenView>) {
        let now = ticker.now();
        let (views, receiver) = watch::channel(KitchenView::empty(now));
        let mut engine = Self {
            stream,
            ticker,
            requests,
            views,
            settings,
            cooking: CookingView::default(),
            history: HistoryView::default(),
            sales: SalesSummary::default(),
            board: UrgencyBoard {
                assessed_at: now,
                tables: Vec::new(),
            },
        };
        let seed = engine.stream.latest();
        engine.rebuild(&seed, now);
        (engine, receiver)
    }

    /// Runs until every view client is dropped or the subscription ends.
    pub async fn run(mut self) {
        info!(
            orders = self.sales.order_count,
            page = ?self.settings.history_page,
            "Kitchen engine started"
        );

        loop {
            tokio::select! {
                snapshot = self.stream.next(), if self.stream.is_open() => match snapshot {
                    Some(snapshot) => {
                        let now = self.ticker.now();
                        self.rebuild(&snapshot, now);
                    }
                    None => {
                        info!("Order subscription ended");
                        break;
                    }
                },
                Some(now) = self.ticker.tick(), if self.ticker.is_running() => {
                    trace!(%now, "Reassessing urgency");
                    self.reassess(now);
                }
                request = self.requests.recv() => match request {
                    Some(request) => self.handle(request),
                    None => {
                        info!("View clients dropped");
                        break;
                    }
                },
            }
        }

        self.ticker.stop();
        self.stream.close();
        info!(orders = self.sales.order_count, "Kitchen engine shutdown");
    }

    fn handle(&mut self, request: ViewRequest) {
        match request {
            ViewRequest::Refresh { respond_to } => {
                let now = self.ticker.now();
                self.reassess(now);
                let _ = respond_to.send(self.views.borrow().clone());
            }
            ViewRequest::SetHistoryPage { page, respond_to } => {
                debug!(?page, "History page changed");
                self.settings.history_page = page;
                self.publish();
                let _ = respond_to.send(self.views.borrow().clone());
            }
        }
    }

    fn rebuild(&mut self, snapshot: &Snapshot, now: DateTime<Utc>) {
        self.cooking = aggregate_cooking(snapshot);
        self.history = aggregate_history(snapshot, self.settings.offset);
        self.sales = summarize_sales(snapshot);
        debug!(
            size = snapshot.len(),
            active_tables = self.cooking.tables().len(),
            history_batches = self.history.len(),
            "Views rebuilt"
        );
        self.reassess(now);
    }

    fn reassess(&mut self, now: DateTime<Utc>) {
        self.board = assess(&self.cooking, now, self.settings.urgency_threshold);
        self.publish();
    }

    fn publish(&self) {
        let view = compose(
            &self.cooking,
            &self.board,
            &self.history,
            self.settings.history_page,
            self.sales,
        );
        self.views.send_replace(view);
    }
}
