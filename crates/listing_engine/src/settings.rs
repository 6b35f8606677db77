use std::time::Duration;

/// Timing knobs of the collection pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectSettings {
    /// Upper bound for element waits: cards on a listing page and the
    /// document root of a detail page.
    pub wait_timeout: Duration,
    pub wait_poll: Duration,
    /// Maximum scroll-and-measure rounds per listing page.
    pub scroll_rounds: u32,
    pub scroll_delay: Duration,
    /// How long to watch for a URL change after a pagination action.
    pub settle_timeout: Duration,
    pub settle_grace: Duration,
    pub settle_poll: Duration,
}

impl Default for CollectSettings {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(15),
            wait_poll: Duration::from_millis(100),
            scroll_rounds: 8,
            scroll_delay: Duration::from_secs(1),
            settle_timeout: Duration::from_secs(10),
            settle_grace: Duration::from_millis(300),
            settle_poll: Duration::from_millis(200),
        }
    }
}
