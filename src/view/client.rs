//! Presentation-side handle on the composed view.

use super::KitchenView;
use crate::aggregate::HistoryPage;
use crate::lifecycle::SystemError;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, instrument};

/// Type alias for the one-shot reply channel used by view requests.
pub type Response<T> = oneshot::Sender<T>;

/// Requests handled by the dispatch loop.
#[derive(Debug)]
pub enum ViewRequest {
    /// Reassess urgency at the clock's current time and recompose.
    Refresh { respond_to: Response<KitchenView> },
    /// Switch the history page and recompose.
    SetHistoryPage {
        page: HistoryPage,
        respond_to: Response<KitchenView>,
    },
}

/// Client for the kitchen view. Cheap to clone.
///
/// The dispatch loop keeps running while any clone is alive.
#[derive(Clone)]
pub struct ViewClient {
    sender: mpsc::Sender<ViewRequest>,
    views: watch::Receiver<KitchenView>,
    page_size: usize,
}

impl ViewClient {
    pub fn new(
        sender: mpsc::Sender<ViewRequest>,
        views: watch::Receiver<KitchenView>,
        page_size: usize,
    ) -> Self {
        Self {
            sender,
            views,
            page_size,
        }
    }

    /// The most recently composed view.
    pub fn current(&self) -> KitchenView {
        self.views.borrow().clone()
    }

    /// A receiver that changes on every recomposition.
    pub fn watch(&self) -> watch::Receiver<KitchenView> {
        self.views.clone()
    }

    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<KitchenView, SystemError> {
        self.request(|respond_to| ViewRequest::Refresh { respond_to })
            .await
    }

    /// Shows only the newest history batches.
    #[instrument(skip(self))]
    pub async fn show_recent_history(&self) -> Result<KitchenView, SystemError> {
        let page = HistoryPage::Recent(self.page_size);
        self.request(|respond_to| ViewRequest::SetHistoryPage { page, respond_to })
            .await
    }

    #[instrument(skip(self))]
    pub async fn show_all_history(&self) -> Result<KitchenView, SystemError> {
        self.request(|respond_to| ViewRequest::SetHistoryPage {
            page: HistoryPage::All,
            respond_to,
        })
        .await
    }

    async fn request(
        &self,
        build: impl FnOnce(Response<KitchenView>) -> ViewRequest,
    ) -> Result<KitchenView, SystemError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| SystemError::ViewClosed)?;
        response.await.map_err(|_| SystemError::ViewClosed)
    }
}
