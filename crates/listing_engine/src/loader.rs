use std::thread;
use std::time::Duration;

use listing_logging::listing_debug;

use crate::{scripts, CollectSettings, Surface};

/// Forces lazy-loaded listing content to render by scrolling to the bottom
/// until the document stops growing.
///
/// This is a heuristic. A page that keeps loading after the last round, or
/// that loads nothing on scroll, ends up only partially rendered and the
/// shortfall shows up downstream as missing cards.
#[derive(Debug, Clone)]
pub struct PageLoader {
    max_rounds: u32,
    delay: Duration,
}

impl PageLoader {
    pub fn new(max_rounds: u32, delay: Duration) -> Self {
        Self { max_rounds, delay }
    }

    pub fn from_settings(settings: &CollectSettings) -> Self {
        Self::new(settings.scroll_rounds, settings.scroll_delay)
    }

    /// Scrolls, waits and measures up to `max_rounds` times. Stops once two
    /// consecutive measurements agree. Never fails.
    pub fn load_all(&self, surface: &mut dyn Surface) {
        listing_debug!(
            "lazy-load scroll: rounds={} delay={:?}",
            self.max_rounds,
            self.delay
        );
        let mut last_height = 0.0;
        for round in 1..=self.max_rounds {
            if let Err(err) = surface.run_script(scripts::SCROLL_TO_BOTTOM, &[]) {
                listing_debug!("scroll failed in round {}: {}", round, err);
                return;
            }
            thread::sleep(self.delay);
            let height = match surface.run_script(scripts::DOCUMENT_HEIGHT, &[]) {
                Ok(value) => value.as_f64(),
                Err(err) => {
                    listing_debug!("height measurement failed in round {}: {}", round, err);
                    return;
                }
            };
            let Some(height) = height else {
                listing_debug!("height measurement returned no number in round {}", round);
                return;
            };
            if height == last_height {
                listing_debug!("document height settled at {} after {} rounds", height, round);
                return;
            }
            last_height = height;
        }
    }
}
