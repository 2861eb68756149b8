//! Periodic polling of a remote resource keyed by a dependency value.
//!
//! A [`Poller`] owns one driver task. The driver fetches immediately on
//! start and whenever the key changes, refetches on a fixed interval, and
//! publishes the latest outcome through a [`watch`] channel. Fetches run as
//! separate tasks and report back over a channel; every fetch is tagged with
//! the key generation and a sequence number so that a response belonging to
//! a superseded key, or one overtaken by a newer response, is discarded.
//!
//! Errors never leave the poller. A failed fetch is logged and turns the
//! state into [`PollState::Failed`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, warn};

use crate::Result;

/// Display state of a polled resource.
#[derive(Debug)]
pub enum PollState<T> {
    /// No value for the current key yet.
    Loading,
    /// Latest successful snapshot.
    Ready(Arc<T>),
    /// The most recent fetch failed.
    Failed,
}

// Manual impl: a derive would require `T: Clone`.
impl<T> Clone for PollState<T> {
    fn clone(&self) -> Self {
        match self {
            PollState::Loading => PollState::Loading,
            PollState::Ready(value) => PollState::Ready(Arc::clone(value)),
            PollState::Failed => PollState::Failed,
        }
    }
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        PollState::Loading
    }
}

impl<T> PollState<T> {
    /// Returns the snapshot if the state is `Ready`.
    pub fn ready(&self) -> Option<&Arc<T>> {
        match self {
            PollState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PollState::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PollState::Failed)
    }
}

enum Control<K, T> {
    Refresh,
    SetActive(bool),
    Publish(K, T),
}

struct Completion<T> {
    generation: u64,
    seq: u64,
    result: Result<T>,
}

enum Wake<K, T> {
    Key(bool),
    Tick,
    Control(Control<K, T>),
    Done(Completion<T>),
}

/// Handle to a running poll loop.
///
/// Dropping the handle stops the timer. Requests already in flight are
/// left to finish and their results are ignored.
pub struct Poller<K, T> {
    key_tx: watch::Sender<K>,
    state_rx: watch::Receiver<PollState<T>>,
    control_tx: mpsc::UnboundedSender<Control<K, T>>,
    driver: JoinHandle<()>,
}

impl<K, T> Poller<K, T>
where
    K: Clone + PartialEq + Send + Sync + 'static,
    T: PartialEq + Send + Sync + 'static,
{
    /// Starts polling `fetch(key)` every `period`.
    ///
    /// An inactive poller defers every fetch until [`Poller::set_active`]
    /// turns it on. Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(
        label: &'static str,
        key: K,
        period: Duration,
        active: bool,
        fetch: F,
    ) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (key_tx, key_rx) = watch::channel(key);
        let (state_tx, state_rx) = watch::channel(PollState::Loading);
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        let driver = Driver {
            label,
            period,
            active,
            fetch,
            key_rx,
            state_tx,
            control_rx,
            generation: 0,
            next_seq: 0,
            applied_seq: None,
            pending: false,
        };
        let driver = tokio::spawn(driver.run());

        Self {
            key_tx,
            state_rx,
            control_tx,
            driver,
        }
    }

    /// Returns the current display state.
    pub fn state(&self) -> PollState<T> {
        self.state_rx.borrow().clone()
    }

    /// Returns a receiver notified whenever the display state changes.
    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.state_rx.clone()
    }

    /// Returns the current dependency key.
    pub fn key(&self) -> K {
        self.key_tx.borrow().clone()
    }

    /// Replaces the dependency key.
    ///
    /// Returns `false` if `key` equals the current one, in which case
    /// nothing happens. Otherwise the state goes back to `Loading`, the
    /// timer restarts and a fetch for the new key begins.
    pub fn set_key(&self, key: K) -> bool {
        self.key_tx.send_if_modified(|current| {
            if *current == key {
                false
            } else {
                *current = key;
                true
            }
        })
    }

    /// Fetches now, keeping the current snapshot on display meanwhile.
    pub fn refresh(&self) {
        let _ = self.control_tx.send(Control::Refresh);
    }

    /// Suspends or resumes fetching.
    ///
    /// While inactive, due fetches are remembered rather than issued;
    /// resuming issues one fetch if any came due.
    pub fn set_active(&self, active: bool) {
        let _ = self.control_tx.send(Control::SetActive(active));
    }

    /// Shows a snapshot obtained elsewhere, such as a pushed update.
    ///
    /// The value is ignored unless `key` is still the current key by the
    /// time the driver handles it. Fetches already in flight are treated as
    /// overtaken by it. The timer is left alone.
    pub fn publish(&self, key: K, value: T) {
        let _ = self.control_tx.send(Control::Publish(key, value));
    }
}

impl<K, T> Drop for Poller<K, T> {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

struct Driver<K, T, F> {
    label: &'static str,
    period: Duration,
    active: bool,
    fetch: F,
    key_rx: watch::Receiver<K>,
    state_tx: watch::Sender<PollState<T>>,
    control_rx: mpsc::UnboundedReceiver<Control<K, T>>,
    generation: u64,
    next_seq: u64,
    applied_seq: Option<u64>,
    /// A fetch came due while inactive.
    pending: bool,
}

impl<K, T, F, Fut> Driver<K, T, F>
where
    K: Clone + PartialEq + Send + Sync + 'static,
    T: PartialEq + Send + Sync + 'static,
    F: Fn(K) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    async fn run(mut self) {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion<T>>();
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.due(&done_tx);

        loop {
            let wake = tokio::select! {
                changed = self.key_rx.changed() => Wake::Key(changed.is_ok()),
                _ = ticker.tick() => Wake::Tick,
                Some(control) = self.control_rx.recv() => Wake::Control(control),
                Some(done) = done_rx.recv() => Wake::Done(done),
            };

            match wake {
                // The handle dropped its key sender.
                Wake::Key(false) => break,
                Wake::Key(true) => {
                    self.key_rx.borrow_and_update();
                    self.generation += 1;
                    self.applied_seq = None;
                    self.state_tx.send_replace(PollState::Loading);
                    ticker.reset();
                    debug!(panel = self.label, generation = self.generation, "key changed");
                    self.due(&done_tx);
                }
                Wake::Tick => self.due(&done_tx),
                Wake::Control(Control::Refresh) => {
                    self.launch(&done_tx);
                    ticker.reset();
                }
                Wake::Control(Control::SetActive(active)) => {
                    self.active = active;
                    if active && self.pending {
                        self.launch(&done_tx);
                        ticker.reset();
                    }
                }
                Wake::Control(Control::Publish(key, value)) => {
                    if *self.key_rx.borrow() != key {
                        debug!(panel = self.label, "discarding pushed value for a previous key");
                        continue;
                    }
                    self.applied_seq = Some(self.next_seq);
                    self.show(value);
                }
                Wake::Done(done) => self.complete(done),
            }
        }
    }

    /// Issues a fetch now, or remembers it if inactive.
    fn due(&mut self, done_tx: &mpsc::UnboundedSender<Completion<T>>) {
        if self.active {
            self.launch(done_tx);
        } else {
            self.pending = true;
        }
    }

    fn launch(&mut self, done_tx: &mpsc::UnboundedSender<Completion<T>>) {
        self.pending = false;
        let seq = self.next_seq;
        self.next_seq += 1;
        let generation = self.generation;
        let request = (self.fetch)(self.key_rx.borrow().clone());
        let done_tx = done_tx.clone();
        tokio::spawn(async move {
            let result = request.await;
            let _ = done_tx.send(Completion {
                generation,
                seq,
                result,
            });
        });
    }

    fn complete(&mut self, done: Completion<T>) {
        if done.generation != self.generation {
            debug!(panel = self.label, "discarding response for a previous key");
            return;
        }
        if self.applied_seq.is_some_and(|applied| done.seq < applied) {
            debug!(panel = self.label, seq = done.seq, "discarding overtaken response");
            return;
        }
        self.applied_seq = Some(done.seq);

        match done.result {
            Ok(value) => self.show(value),
            Err(e) => {
                warn!(panel = self.label, error = %e, "fetch failed");
                self.state_tx.send_if_modified(|state| {
                    if state.is_failed() {
                        false
                    } else {
                        *state = PollState::Failed;
                        true
                    }
                });
            }
        }
    }

    /// Replaces the snapshot unless it equals the one on display.
    fn show(&self, value: T) {
        self.state_tx.send_if_modified(|state| match state {
            PollState::Ready(current) if **current == value => false,
            _ => {
                *state = PollState::Ready(Arc::new(value));
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::MarketdashError;

    const PERIOD: Duration = Duration::from_secs(60);

    async fn next_state<T>(rx: &mut watch::Receiver<PollState<T>>) -> PollState<T> {
        rx.changed().await.unwrap();
        rx.borrow_and_update().clone()
    }

    fn ready_value<T: Copy>(state: &PollState<T>) -> Option<T> {
        state.ready().map(|v| **v)
    }

    fn counting() -> Arc<AtomicU32> {
        Arc::new(AtomicU32::new(0))
    }

    #[tokio::test(start_paused = true)]
    async fn starts_loading_then_ready() {
        let poller = Poller::spawn("test", 4u32, PERIOD, true, |k| async move {
            Ok::<_, MarketdashError>(k * 10)
        });
        let mut rx = poller.subscribe();
        assert!(poller.state().is_loading());
        assert_eq!(ready_value(&next_state(&mut rx).await), Some(40));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_turns_into_failed_state() {
        let poller = Poller::spawn("test", (), PERIOD, true, |_| async {
            Err::<u32, _>(MarketdashError::Io("connection refused".to_string()))
        });
        let mut rx = poller.subscribe();
        assert!(next_state(&mut rx).await.is_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn interval_refetch_skips_loading() {
        let calls = counting();
        let c = Arc::clone(&calls);
        let poller = Poller::spawn("test", (), PERIOD, true, move |_| {
            let n = c.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok::<_, MarketdashError>(n) }
        });
        let mut rx = poller.subscribe();
        assert_eq!(ready_value(&next_state(&mut rx).await), Some(1));
        // The next observed state is the refetched value, never Loading.
        assert_eq!(ready_value(&next_state(&mut rx).await), Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn identical_snapshot_keeps_arc_and_stays_quiet() {
        let calls = counting();
        let c = Arc::clone(&calls);
        let poller = Poller::spawn("test", (), PERIOD, true, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, MarketdashError>(String::from("same")) }
        });
        let mut rx = poller.subscribe();
        let first = next_state(&mut rx).await;
        let first = Arc::clone(first.ready().unwrap());

        poller.refresh();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!rx.has_changed().unwrap());
        let held = poller.state();
        assert!(Arc::ptr_eq(&first, held.ready().unwrap()));
    }

    #[tokio::test(start_paused = true)]
    async fn response_for_previous_key_is_discarded() {
        let poller = Poller::spawn("test", 1u32, PERIOD, true, |k| async move {
            if k == 1 {
                tokio::time::sleep(Duration::from_secs(10)).await;
            }
            Ok::<_, MarketdashError>(k)
        });
        // Let the fetch for key 1 start before switching.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(poller.set_key(2));

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(ready_value(&poller.state()), Some(2));
        assert_eq!(poller.key(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn overtaken_response_is_discarded() {
        let calls = counting();
        let c = Arc::clone(&calls);
        let poller = Poller::spawn("test", (), PERIOD, true, move |_| {
            let n = c.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n == 2 {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                }
                Ok::<_, MarketdashError>(n)
            }
        });
        let mut rx = poller.subscribe();
        assert_eq!(ready_value(&next_state(&mut rx).await), Some(1));

        poller.refresh();
        poller.refresh();
        tokio::time::sleep(Duration::from_secs(20)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(ready_value(&poller.state()), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn pushed_value_overtakes_fetch_in_flight() {
        let poller = Poller::spawn("test", 1u32, PERIOD, true, |_| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, MarketdashError>(10u32)
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        poller.publish(1, 99);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(ready_value(&poller.state()), Some(99));

        // The slow fetch started before the push lands later and is dropped.
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(ready_value(&poller.state()), Some(99));

        // The next timer fetch is applied as usual.
        tokio::time::sleep(PERIOD).await;
        assert_eq!(ready_value(&poller.state()), Some(10));
    }

    #[tokio::test(start_paused = true)]
    async fn pushed_value_for_another_key_is_ignored() {
        let poller = Poller::spawn("test", 1u32, PERIOD, true, |k| async move {
            Ok::<_, MarketdashError>(k)
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        poller.publish(2, 99);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(ready_value(&poller.state()), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_key_is_ignored() {
        let calls = counting();
        let c = Arc::clone(&calls);
        let poller = Poller::spawn("test", 7u32, PERIOD, true, move |k| {
            c.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, MarketdashError>(k) }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!poller.set_key(7));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(ready_value(&poller.state()), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn inactive_poller_defers_until_resumed() {
        let calls = counting();
        let c = Arc::clone(&calls);
        let poller = Poller::spawn("test", (), PERIOD, false, move |_| {
            let n = c.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok::<_, MarketdashError>(n) }
        });

        tokio::time::sleep(PERIOD * 3).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(poller.state().is_loading());

        poller.set_active(true);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(ready_value(&poller.state()), Some(1));

        poller.set_active(false);
        tokio::time::sleep(PERIOD * 3).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Several ticks were missed; resuming issues a single fetch.
        poller.set_active(true);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_poller_stops_the_timer() {
        let calls = counting();
        let c = Arc::clone(&calls);
        let poller = Poller::spawn("test", (), PERIOD, true, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, MarketdashError>(()) }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(poller);
        tokio::time::sleep(PERIOD * 5).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
