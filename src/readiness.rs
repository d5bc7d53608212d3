use std::thread::sleep;
use std::time::{Duration, Instant};

/// Poll `probe` until it yields a value or `timeout` elapses.
///
/// Host elements (the video element, the progress bar) may not exist yet when
/// the engine is wired up; callers probe for them on a bounded interval
/// instead of failing outright. A timeout is an ordinary error, never a
/// panic, so the caller can retry later.
pub fn await_ready<T>(
    mut probe: impl FnMut() -> Option<T>,
    timeout: Duration,
    poll: Duration,
) -> anyhow::Result<T> {
    let start = Instant::now();
    loop {
        if let Some(value) = probe() {
            return Ok(value);
        }
        if start.elapsed() >= timeout {
            anyhow::bail!("timed out waiting for host element");
        }
        sleep(poll);
    }
}

#[cfg(test)]
mod tests {
    use super::await_ready;
    use std::time::Duration;

    #[test]
    fn returns_value_once_probe_succeeds() {
        let mut calls = 0;
        let value = await_ready(
            || {
                calls += 1;
                (calls >= 3).then_some(calls)
            },
            Duration::from_secs(1),
            Duration::from_millis(1),
        )
        .expect("probe should succeed");
        assert_eq!(value, 3);
    }

    #[test]
    fn times_out_when_probe_never_succeeds() {
        let result = await_ready(
            || None::<()>,
            Duration::from_millis(5),
            Duration::from_millis(1),
        );
        assert!(result.is_err());
    }

    #[test]
    fn immediate_success_skips_polling() {
        let value = await_ready(
            || Some(7),
            Duration::from_millis(0),
            Duration::from_millis(50),
        )
        .expect("immediate probe");
        assert_eq!(value, 7);
    }
}
