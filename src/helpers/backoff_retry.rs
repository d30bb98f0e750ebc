use std::fmt::Display;
use std::time::Duration;

use backoff::{retry_notify, Error, ExponentialBackoff};

/// Retry `fn_to_try` with exponential backoff until it succeeds, fails
/// permanently or `max_elapsed` has passed
pub fn backoff_retry<F, T, E>(fn_to_try: F, max_elapsed: Duration) -> Result<T, Error<E>>
where
    F: FnMut() -> Result<T, Error<E>>,
    E: Display,
{
    let notify = |err, dur: Duration| {
        log::error!(
            "Temporary error after {:.1}s: {}",
            dur.as_secs_f32(),
            err
        );
    };
    let policy = ExponentialBackoff {
        max_elapsed_time: Some(max_elapsed),
        ..ExponentialBackoff::default()
    };

    retry_notify(policy, fn_to_try, notify)
}
