//! Application service: bounded status polling.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use crate::application::ports::Sleeper;
use crate::domain::poll::{PollOutcome, PollPolicy};

/// Call `fetch` until `done` holds or `policy.max_attempts` checks were made.
///
/// Sleeps `policy.interval` between checks, never after the last one.
/// Exhausting the attempts is not an error: the last observation comes back
/// as [`PollOutcome::Exhausted`] and the caller decides what it means.
///
/// # Errors
///
/// Returns the first error `fetch` returns; nothing is retried.
pub fn poll_until<T, E>(
    sleeper: &impl Sleeper,
    policy: PollPolicy,
    mut fetch: impl FnMut() -> Result<T, E>,
    done: impl Fn(&T) -> bool,
) -> Result<PollOutcome<T>, E> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let observed = fetch()?;
        if done(&observed) {
            tracing::debug!(attempt, "poll condition met");
            return Ok(PollOutcome::Done(observed));
        }
        if attempt == max_attempts {
            tracing::debug!(attempt, "poll attempts exhausted");
            return Ok(PollOutcome::Exhausted(observed));
        }
        attempt += 1;
        sleeper.sleep(policy.interval);
    }
}
