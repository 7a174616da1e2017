//! Debouncer: coalesces bursts of calls into a single execution.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Default quiet period between a burst of calls and its execution.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(1);

/// Timing policy of a [`Debouncer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    pub cooldown: Duration,
    /// Run the first call of a burst right away, then at most once more when
    /// the cooldown ends. Otherwise only the trailing run happens.
    /// A trailing run starts a fresh cooldown in this mode.
    pub immediate: bool,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            immediate: false,
        }
    }
}

type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct State {
    timer: Option<JoinHandle<()>>,
    /// Bumped by every cancel so that a stale timer does not clear a newer one.
    generation: usize,
    run_at_end: bool,
    shut_down: bool,
}

/// A cancellable delayed task with a shutdown barrier.
///
/// Calls made while the cooldown timer is running are folded into the
/// timer's trailing run. Must be used from within a tokio runtime.
pub struct Debouncer {
    config: DebounceConfig,
    callback: Callback,
    state: Arc<Mutex<State>>,
}

impl Debouncer {
    pub fn new(config: DebounceConfig, callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            config,
            callback: Arc::new(callback),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Request an execution.
    pub fn call(&self) {
        let mut state = self.lock();
        if state.shut_down {
            return;
        }
        if state.timer.is_some() {
            state.run_at_end = true;
            return;
        }

        let run_now = self.config.immediate;
        state.run_at_end = !run_now;
        state.timer = Some(self.start_timer(state.generation));
        drop(state);

        if run_now {
            (self.callback)();
        }
    }

    /// Drop the pending execution, if any.
    pub fn cancel(&self) {
        let mut state = self.lock();
        Self::clear(&mut state);
    }

    /// Cancel the pending execution and ignore every later call.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        Self::clear(&mut state);
        state.shut_down = true;
    }

    /// Whether an execution is scheduled or the cooldown is running.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.lock().timer.is_some()
    }

    fn clear(state: &mut State) {
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation = state.generation.wrapping_add(1);
        state.run_at_end = false;
    }

    fn start_timer(&self, generation: usize) -> JoinHandle<()> {
        let cooldown = self.config.cooldown;
        let state = Arc::clone(&self.state);
        let immediate = self.config.immediate;
        let callback = Arc::clone(&self.callback);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(cooldown).await;
                let run = {
                    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                    if state.generation != generation || state.shut_down {
                        return;
                    }
                    let run = std::mem::take(&mut state.run_at_end);
                    if !(run && immediate) {
                        state.timer = None;
                    }
                    run
                };
                if !run {
                    return;
                }
                callback();
                if !immediate {
                    return;
                }
            }
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use tokio::time::sleep;

    fn counting(config: DebounceConfig) -> (Debouncer, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let debouncer = Debouncer::new(config, move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (debouncer, count)
    }

    fn immediate() -> DebounceConfig {
        DebounceConfig {
            immediate: true,
            ..DebounceConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn should_coalesce_burst_into_single_trailing_run() {
        let (debouncer, count) = counting(DebounceConfig::default());
        for _ in 0..5 {
            debouncer.call();
            sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn should_run_again_for_a_later_burst() {
        let (debouncer, count) = counting(DebounceConfig::default());
        debouncer.call();
        sleep(Duration::from_secs(2)).await;
        debouncer.call();
        sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn should_run_immediately_then_once_at_end_of_cooldown() {
        let (debouncer, count) = counting(immediate());
        debouncer.call();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        for _ in 0..4 {
            debouncer.call();
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn should_start_new_cooldown_after_immediate_trailing_run() {
        let (debouncer, count) = counting(immediate());
        debouncer.call();
        sleep(Duration::from_millis(500)).await;
        debouncer.call();

        // trailing run at 1s
        sleep(Duration::from_millis(600)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(debouncer.is_pending());

        // still inside the cooldown opened by the trailing run
        debouncer.call();
        assert_eq!(count.load(Ordering::SeqCst), 2);

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_run_trailing_when_immediate_call_was_alone() {
        let (debouncer, count) = counting(immediate());
        debouncer.call();
        sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn should_drop_pending_run_on_cancel() {
        let (debouncer, count) = counting(DebounceConfig::default());
        debouncer.call();
        debouncer.cancel();
        sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        debouncer.call();
        sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn should_ignore_calls_after_shutdown() {
        let (debouncer, count) = counting(DebounceConfig::default());
        debouncer.call();
        debouncer.shutdown();
        debouncer.call();
        sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!debouncer.is_pending());
    }
}
