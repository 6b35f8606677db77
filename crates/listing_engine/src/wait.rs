use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::{Scope, Surface, SurfaceError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
    #[error("timed out after {timeout:?} waiting for {what}")]
    Timeout {
        what: String,
        timeout: Duration,
        last_error: Option<SurfaceError>,
    },
}

/// Polls `predicate` until it returns `Ok(true)` or `timeout` elapses.
///
/// The predicate is checked once before the first sleep. Errors returned by
/// the predicate count as "not yet"; the last one is kept in the timeout
/// error.
pub fn wait_until<S, F>(
    surface: &mut S,
    what: &str,
    timeout: Duration,
    poll: Duration,
    mut predicate: F,
) -> Result<(), WaitError>
where
    S: Surface + ?Sized,
    F: FnMut(&mut S) -> Result<bool, SurfaceError>,
{
    let start = Instant::now();
    let mut last_error = None;
    loop {
        match predicate(surface) {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(err) => last_error = Some(err),
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(WaitError::Timeout {
                what: what.to_string(),
                timeout,
                last_error,
            });
        }
        thread::sleep(poll.min(timeout - elapsed));
    }
}

/// Waits until at least one element matches `selector` in the focused
/// document.
pub fn wait_for_selector<S>(
    surface: &mut S,
    selector: &str,
    timeout: Duration,
    poll: Duration,
) -> Result<(), WaitError>
where
    S: Surface + ?Sized,
{
    wait_until(surface, selector, timeout, poll, |surface| {
        Ok(surface.find_one(Scope::Document, selector)?.is_some())
    })
}
