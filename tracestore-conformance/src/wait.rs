use std::time::Duration;

const MAX_ITERATIONS: u32 = 100;
const SLEEP: Duration = Duration::from_secs(1);

/// Poll `predicate` up to 100 times, sleeping a second between attempts,
/// to tolerate backends with asynchronous indexers. The predicate runs
/// once after each sleep, then one final time after the loop — so a
/// predicate that only becomes true exactly at the last iteration is
/// still observed.
pub async fn wait_for<F, Fut>(mut predicate: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..MAX_ITERATIONS {
        tokio::time::sleep(SLEEP).await;
        if predicate().await {
            return true;
        }
    }
    predicate().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn returns_true_as_soon_as_predicate_passes() {
        let attempts = AtomicU32::new(0);
        let ok = wait_for(|| async {
            attempts.fetch_add(1, Ordering::SeqCst) >= 2
        })
        .await;
        assert!(ok);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn final_check_runs_once_more_after_the_loop() {
        let attempts = AtomicU32::new(0);
        let ok = wait_for(|| async {
            attempts.fetch_add(1, Ordering::SeqCst) >= MAX_ITERATIONS
        })
        .await;
        assert!(ok);
        assert_eq!(attempts.load(Ordering::SeqCst), MAX_ITERATIONS + 1);
    }
}
