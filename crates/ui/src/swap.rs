use log::debug;

use crate::chart::{ChartBackend, ChartLocator, ChartRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapState {
    Idle,
    PendingSwap,
    Rendered,
    Error,
}

/// Re-renders the forecast chart whenever its container is swapped
pub struct SwapController {
    container_id: String,
    state: SwapState,
}

impl SwapController {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            state: SwapState::Idle,
        }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn state(&self) -> SwapState {
        self.state
    }

    /// Full page load: draw once if the container already carries a chart.
    pub fn on_page_load<B: ChartBackend>(
        &mut self,
        locator: &dyn ChartLocator,
        charts: &mut ChartRenderer<B>,
    ) -> SwapState {
        if locator.locate(&self.container_id).is_some() {
            self.attempt(locator, charts);
        }
        self.state
    }

    /// Returns `false` when the swapped element is not ours and nothing happened.
    pub fn on_fragment_replaced<B: ChartBackend>(
        &mut self,
        target_id: &str,
        locator: &dyn ChartLocator,
        charts: &mut ChartRenderer<B>,
    ) -> bool {
        if target_id != self.container_id {
            return false;
        }
        self.state = SwapState::PendingSwap;
        // whatever was drawn in the old content is gone with it
        charts.release_container(&self.container_id);
        self.attempt(locator, charts);
        true
    }

    fn attempt<B: ChartBackend>(&mut self, locator: &dyn ChartLocator, charts: &mut ChartRenderer<B>) {
        self.state = match locator.locate(&self.container_id) {
            None => {
                debug!("#{} holds no chart", self.container_id);
                SwapState::Idle
            }
            Some(target) => match charts.render(&target) {
                Ok(()) => SwapState::Rendered,
                Err(_) => SwapState::Error,
            },
        };
    }
}
