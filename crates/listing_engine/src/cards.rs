use std::time::Duration;

use listing_logging::listing_debug;

use crate::{wait_for_selector, CollectSettings, Surface, WaitError};

/// Blocks until the listing shows at least one card.
#[derive(Debug, Clone)]
pub struct CardWaiter {
    timeout: Duration,
    poll: Duration,
}

impl CardWaiter {
    pub fn new(timeout: Duration, poll: Duration) -> Self {
        Self { timeout, poll }
    }

    pub fn from_settings(settings: &CollectSettings) -> Self {
        Self::new(settings.wait_timeout, settings.wait_poll)
    }

    pub fn await_cards(&self, surface: &mut dyn Surface, selector: &str) -> Result<(), WaitError> {
        listing_debug!("waiting up to {:?} for cards `{}`", self.timeout, selector);
        wait_for_selector(surface, selector, self.timeout, self.poll)?;
        listing_debug!("cards `{}` present", selector);
        Ok(())
    }
}
