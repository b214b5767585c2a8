//! Value-collecting rendezvous barrier with one-shot release.
//!
//! [`RendezvousBarrier`] releases once `target_count` arrivals have been
//! signaled. Each arrival may carry a value; at release the collected values
//! are frozen into a shared snapshot that every waiter (current or future)
//! observes. A barrier can instead be driven to a failed state with
//! [`RendezvousBarrier::fail`], in which case every waiter receives the
//! stored error.
//!
//! The barrier is one-shot: the Pending state transitions exactly once to
//! Released or Failed and never changes again. Arrivals and failure signals
//! received after the transition are inert no-ops, which tolerates defensive
//! double-signaling from unreliable callers (an expired timer firing after
//! the owning task already completed, a duplicate completion callback).
//!
//! # Waiting
//!
//! Two renderings of the same operation are provided over one state machine:
//!
//! - [`RendezvousBarrier::wait`] returns a [`Wait`] future for async tasks.
//!   The future is cancel-safe: dropping it unregisters its waker and leaves
//!   barrier state untouched.
//! - [`RendezvousBarrier::wait_blocking`] parks the calling thread on a
//!   condvar, for callers not running under an executor.
//!
//! # Example
//!
//! ```
//! use rendezvous_barrier::RendezvousBarrier;
//!
//! let barrier = RendezvousBarrier::<u32>::new(2)?;
//! barrier.arrive_with(1);
//! barrier.arrive_with(2);
//!
//! let snapshot = barrier.wait_blocking().unwrap();
//! assert_eq!(&*snapshot, &[1, 2]);
//! # Ok::<(), rendezvous_barrier::InvalidCountError>(())
//! ```
//!
//! # Ordering
//!
//! `collected` records values in arrival-completion order. Under concurrent
//! arrivals this is the order the critical section was entered, not the order
//! the calls were issued; under sequential use the two coincide.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::{Arc, Condvar, Mutex as StdMutex, MutexGuard};
use std::task::{Context, Poll, Waker};

/// Error returned when constructing a barrier with a target count of zero.
///
/// A barrier with count 0 has ill-defined release semantics, so construction
/// rejects it rather than clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCountError;

impl fmt::Display for InvalidCountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rendezvous barrier requires a target count of at least 1")
    }
}

impl std::error::Error for InvalidCountError {}

/// Slab-like storage for async waiters that reuses freed slots so cancelled
/// waiters in the middle do not grow the entries vector without bound.
#[derive(Debug)]
struct WaiterSlab {
    entries: Vec<Option<Waker>>,
    free_slots: Vec<usize>,
}

impl WaiterSlab {
    const fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_slots: Vec::new(),
        }
    }

    /// Insert a waker, reusing a free slot if available.
    fn insert(&mut self, waker: Waker) -> usize {
        if let Some(index) = self.free_slots.pop() {
            self.entries[index] = Some(waker);
            index
        } else {
            let index = self.entries.len();
            self.entries.push(Some(waker));
            index
        }
    }

    /// Replace the waker stored at `index` with the current one.
    fn update(&mut self, index: usize, waker: &Waker) {
        self.entries[index] = Some(waker.clone());
    }

    /// Remove a waiter by index, returning its slot to the free list.
    fn remove(&mut self, index: usize) {
        if index < self.entries.len() {
            self.entries[index] = None;
            self.free_slots.push(index);
        }
    }

    /// Drain every registered waker for a broadcast wake.
    fn take_wakers(&mut self) -> Vec<Waker> {
        self.free_slots.clear();
        self.entries.drain(..).flatten().collect()
    }

    /// Count active waiters (those with a waker set).
    fn active_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }
}

/// Barrier state machine. Pending transitions exactly once to Released or
/// Failed; the terminal variants are never replaced.
enum State<T, E> {
    /// Still collecting arrivals. `remaining` is always >= 1 here: the
    /// arrival that takes it to 0 installs `Released` in the same critical
    /// section.
    Pending {
        remaining: usize,
        collected: Vec<T>,
        waiters: WaiterSlab,
    },
    /// Released with the frozen snapshot, shared by pointer with all waiters.
    Released(Arc<[T]>),
    /// Failed with the stored error, cloned to each waiter.
    Failed(E),
}

impl<T, E> State<T, E> {
    fn tag(&self) -> &'static str {
        match self {
            Self::Pending { .. } => "pending",
            Self::Released(_) => "released",
            Self::Failed(_) => "failed",
        }
    }
}

struct Shared<T, E> {
    target: usize,
    state: StdMutex<State<T, E>>,
    cvar: Condvar,
}

impl<T, E> Shared<T, E> {
    fn lock_state(&self) -> MutexGuard<'_, State<T, E>> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Record one arrival, releasing the barrier if it is the last one.
    ///
    /// Wakers are collected under the lock and woken after it is released.
    fn signal(&self, value: Option<T>) {
        let wakers = {
            let mut state = self.lock_state();
            let State::Pending {
                remaining,
                collected,
                waiters,
            } = &mut *state
            else {
                tracing::trace!(state = state.tag(), "arrival after terminal state ignored");
                return;
            };

            if let Some(value) = value {
                collected.push(value);
            }
            *remaining -= 1;

            if *remaining > 0 {
                tracing::trace!(remaining = *remaining, "arrival recorded");
                return;
            }

            let snapshot: Arc<[T]> = mem::take(collected).into();
            let wakers = waiters.take_wakers();
            tracing::trace!(
                collected = snapshot.len(),
                waiters = wakers.len(),
                "barrier released"
            );
            *state = State::Released(snapshot);
            self.cvar.notify_all();
            wakers
        };

        for waker in wakers {
            waker.wake();
        }
    }

    /// Transition Pending -> Failed, waking every waiter with the error.
    fn fail(&self, error: E) {
        let wakers = {
            let mut state = self.lock_state();
            let State::Pending { waiters, .. } = &mut *state else {
                tracing::trace!(state = state.tag(), "fail after terminal state ignored");
                return;
            };

            let wakers = waiters.take_wakers();
            tracing::trace!(waiters = wakers.len(), "barrier failed");
            *state = State::Failed(error);
            self.cvar.notify_all();
            wakers
        };

        for waker in wakers {
            waker.wake();
        }
    }
}

impl<T, E: Clone> Shared<T, E> {
    fn outcome_of(state: &State<T, E>) -> Option<Result<Arc<[T]>, E>> {
        match state {
            State::Pending { .. } => None,
            State::Released(snapshot) => Some(Ok(Arc::clone(snapshot))),
            State::Failed(error) => Some(Err(error.clone())),
        }
    }

    fn wait_blocking(&self) -> Result<Arc<[T]>, E> {
        let mut state = self.lock_state();
        loop {
            if let Some(outcome) = Self::outcome_of(&state) {
                return outcome;
            }
            state = match self.cvar.wait(state) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }
}

/// Value-collecting N-way rendezvous barrier.
///
/// Cheaply cloneable: clones share the same rendezvous point. Constructed
/// with the number of arrivals required to release (`Default` uses 1).
///
/// `T` is the type of values arrivals may carry; `E` is the error type
/// delivered by [`fail`](Self::fail). `E` defaults to [`Infallible`], so a
/// barrier that is never failed needs no error annotation.
pub struct RendezvousBarrier<T, E = Infallible> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> RendezvousBarrier<T, E> {
    /// Creates a barrier that releases after `count` arrivals.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCountError`] if `count` is 0.
    pub fn new(count: usize) -> Result<Self, InvalidCountError> {
        if count == 0 {
            return Err(InvalidCountError);
        }
        Ok(Self::with_target(count))
    }

    fn with_target(count: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                target: count,
                state: StdMutex::new(State::Pending {
                    remaining: count,
                    collected: Vec::new(),
                    waiters: WaiterSlab::new(),
                }),
                cvar: Condvar::new(),
            }),
        }
    }

    /// Returns the number of arrivals required to release the barrier.
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.shared.target
    }

    /// Returns the number of arrivals still required, or 0 once terminal.
    #[must_use]
    pub fn remaining(&self) -> usize {
        match &*self.shared.lock_state() {
            State::Pending { remaining, .. } => *remaining,
            State::Released(_) | State::Failed(_) => 0,
        }
    }

    /// Returns true once the barrier has released or failed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(&*self.shared.lock_state(), State::Pending { .. })
    }

    /// Returns the number of registered async waiters.
    ///
    /// Threads parked in [`wait_blocking`](Self::wait_blocking) are not
    /// counted. Always 0 once the barrier is terminal.
    #[must_use]
    pub fn waiter_count(&self) -> usize {
        match &*self.shared.lock_state() {
            State::Pending { waiters, .. } => waiters.active_count(),
            State::Released(_) | State::Failed(_) => 0,
        }
    }

    /// Signals one arrival without a value.
    ///
    /// If this is the `target_count`-th arrival the barrier releases and all
    /// waiters are woken. Inert (and panic-free) once the barrier is
    /// terminal.
    pub fn arrive(&self) {
        self.shared.signal(None);
    }

    /// Signals one arrival carrying `value`.
    ///
    /// The value is appended to the snapshot-in-progress before the arrival
    /// is counted. A value supplied after the barrier is terminal is
    /// dropped; the released snapshot never grows.
    pub fn arrive_with(&self, value: T) {
        self.shared.signal(Some(value));
    }

    /// Drives the barrier to the failed state, waking every waiter with
    /// `error`.
    ///
    /// Idempotent: once the barrier is terminal (released or already
    /// failed), further `fail` calls are inert and the error is dropped.
    pub fn fail(&self, error: E) {
        self.shared.fail(error);
    }

    /// Splits the barrier into its two capability roles: a [`Signaler`] that
    /// can only signal arrivals or failure, and an [`Outcome`] that can only
    /// wait. Both reference this same rendezvous point.
    #[must_use]
    pub fn split(&self) -> (Signaler<T, E>, Outcome<T, E>) {
        (
            Signaler {
                shared: Arc::clone(&self.shared),
            },
            Outcome {
                shared: Arc::clone(&self.shared),
            },
        )
    }
}

impl<T, E: Clone> RendezvousBarrier<T, E> {
    /// Returns a future that resolves when the barrier releases or fails.
    ///
    /// Resolves to the shared snapshot on release and to the stored error on
    /// failure. May be called any number of times, before or after the
    /// transition; a terminal barrier resolves immediately with the cached
    /// outcome. Cancel-safe: dropping the future removes its waker
    /// registration and does not perturb barrier state.
    #[must_use = "futures do nothing unless polled or awaited"]
    pub fn wait(&self) -> Wait<'_, T, E> {
        Wait {
            shared: &self.shared,
            slot: None,
        }
    }

    /// Blocks the calling thread until the barrier releases or fails.
    ///
    /// Same contract as [`wait`](Self::wait), rendered for plain threads.
    pub fn wait_blocking(&self) -> Result<Arc<[T]>, E> {
        self.shared.wait_blocking()
    }

    /// Returns the terminal outcome without waiting, or `None` while the
    /// barrier is still pending.
    #[must_use]
    pub fn try_outcome(&self) -> Option<Result<Arc<[T]>, E>> {
        Shared::outcome_of(&self.shared.lock_state())
    }
}

impl<T, E> Clone for RendezvousBarrier<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> Default for RendezvousBarrier<T, E> {
    /// A barrier that releases after a single arrival.
    fn default() -> Self {
        Self::with_target(1)
    }
}

impl<T, E> fmt::Debug for RendezvousBarrier<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendezvousBarrier")
            .field("target_count", &self.shared.target)
            .field("state", &self.shared.lock_state().tag())
            .finish()
    }
}

/// Signal-only handle to a rendezvous point.
///
/// Obtained from [`RendezvousBarrier::split`]. Clones share the same barrier.
pub struct Signaler<T, E = Infallible> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> Signaler<T, E> {
    /// Signals one arrival without a value. See [`RendezvousBarrier::arrive`].
    pub fn arrive(&self) {
        self.shared.signal(None);
    }

    /// Signals one arrival carrying `value`. See
    /// [`RendezvousBarrier::arrive_with`].
    pub fn arrive_with(&self, value: T) {
        self.shared.signal(Some(value));
    }

    /// Drives the barrier to the failed state. See
    /// [`RendezvousBarrier::fail`].
    pub fn fail(&self, error: E) {
        self.shared.fail(error);
    }
}

impl<T, E> Clone for Signaler<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> fmt::Debug for Signaler<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signaler")
            .field("state", &self.shared.lock_state().tag())
            .finish()
    }
}

/// Wait-only handle to a rendezvous point.
///
/// Obtained from [`RendezvousBarrier::split`]. Clones share the same barrier.
pub struct Outcome<T, E = Infallible> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E: Clone> Outcome<T, E> {
    /// Returns a future that resolves at release or failure. See
    /// [`RendezvousBarrier::wait`].
    #[must_use = "futures do nothing unless polled or awaited"]
    pub fn wait(&self) -> Wait<'_, T, E> {
        Wait {
            shared: &self.shared,
            slot: None,
        }
    }

    /// Blocks the calling thread until release or failure. See
    /// [`RendezvousBarrier::wait_blocking`].
    pub fn wait_blocking(&self) -> Result<Arc<[T]>, E> {
        self.shared.wait_blocking()
    }

    /// Returns the terminal outcome without waiting. See
    /// [`RendezvousBarrier::try_outcome`].
    #[must_use]
    pub fn try_outcome(&self) -> Option<Result<Arc<[T]>, E>> {
        Shared::outcome_of(&self.shared.lock_state())
    }
}

impl<T, E> Outcome<T, E> {
    /// Returns true once the barrier has released or failed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(&*self.shared.lock_state(), State::Pending { .. })
    }
}

impl<T, E> Clone for Outcome<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> fmt::Debug for Outcome<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("state", &self.shared.lock_state().tag())
            .finish()
    }
}

/// Future returned by [`RendezvousBarrier::wait`] and [`Outcome::wait`].
///
/// Resolves to `Ok(snapshot)` on release and `Err(error)` on failure. If
/// dropped before resolving, its waker registration is removed; barrier
/// state is unaffected by how many futures are currently waiting.
pub struct Wait<'a, T, E> {
    shared: &'a Shared<T, E>,
    slot: Option<usize>,
}

impl<T, E: Clone> Future for Wait<'_, T, E> {
    type Output = Result<Arc<[T]>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let mut state = this.shared.lock_state();
        match &mut *state {
            State::Pending { waiters, .. } => {
                match this.slot {
                    Some(index) => waiters.update(index, cx.waker()),
                    None => this.slot = Some(waiters.insert(cx.waker().clone())),
                }
                Poll::Pending
            }
            State::Released(snapshot) => {
                // Slot indices are invalidated by the release broadcast.
                this.slot = None;
                Poll::Ready(Ok(Arc::clone(snapshot)))
            }
            State::Failed(error) => {
                this.slot = None;
                Poll::Ready(Err(error.clone()))
            }
        }
    }
}

impl<T, E> Drop for Wait<'_, T, E> {
    fn drop(&mut self) {
        if let Some(index) = self.slot.take() {
            if let State::Pending { waiters, .. } = &mut *self.shared.lock_state() {
                waiters.remove(index);
            }
        }
    }
}

impl<T, E> fmt::Debug for Wait<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wait")
            .field("registered", &self.slot.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;
    use std::sync::Arc;
    use std::task::Wake;
    use std::thread;
    use std::time::Duration;

    struct NoopWaker;

    impl Wake for NoopWaker {
        fn wake(self: Arc<Self>) {}
        fn wake_by_ref(self: &Arc<Self>) {}
    }

    fn noop_waker() -> Waker {
        Arc::new(NoopWaker).into()
    }

    fn poll_once<F>(fut: &mut F) -> Poll<F::Output>
    where
        F: Future + Unpin,
    {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        Pin::new(fut).poll(&mut cx)
    }

    fn init_test(name: &str) {
        init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn zero_count_rejected() {
        init_test("zero_count_rejected");
        let result = RendezvousBarrier::<i32>::new(0);
        crate::assert_with_log!(
            result.is_err(),
            "count 0 rejected",
            true,
            result.is_err()
        );
        crate::test_complete!("zero_count_rejected");
    }

    #[test]
    fn single_arrival_releases_empty_snapshot() {
        init_test("single_arrival_releases_empty_snapshot");
        let barrier = RendezvousBarrier::<i32>::new(1).expect("count 1 is valid");
        let signaler = barrier.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            signaler.arrive();
        });

        let snapshot = barrier.wait_blocking().expect("barrier released");
        handle.join().expect("thread panicked");

        crate::assert_with_log!(
            snapshot.is_empty(),
            "valueless arrival yields empty snapshot",
            0usize,
            snapshot.len()
        );
        crate::test_complete!("single_arrival_releases_empty_snapshot");
    }

    #[test]
    fn single_arrival_carries_value() {
        init_test("single_arrival_carries_value");
        let barrier = RendezvousBarrier::<i32>::new(1).expect("count 1 is valid");
        barrier.arrive_with(42);

        let snapshot = barrier.wait_blocking().expect("barrier released");
        crate::assert_with_log!(
            &*snapshot == [42],
            "snapshot holds the arrival value",
            &[42][..],
            &*snapshot
        );
        crate::test_complete!("single_arrival_carries_value");
    }

    #[test]
    fn releases_exactly_on_target() {
        init_test("releases_exactly_on_target");
        let barrier = RendezvousBarrier::<i32>::new(3).expect("count 3 is valid");
        let mut fut = barrier.wait();

        barrier.arrive_with(1);
        barrier.arrive_with(2);
        let pending = poll_once(&mut fut).is_pending();
        crate::assert_with_log!(pending, "pending before target", true, pending);
        crate::assert_with_log!(
            barrier.remaining() == 1,
            "one arrival remaining",
            1usize,
            barrier.remaining()
        );

        barrier.arrive();
        let outcome = poll_once(&mut fut);
        let Poll::Ready(Ok(snapshot)) = outcome else {
            unreachable!("barrier must release on the target-count arrival");
        };
        crate::assert_with_log!(
            &*snapshot == [1, 2],
            "snapshot holds both values",
            &[1, 2][..],
            &*snapshot
        );
        crate::test_complete!("releases_exactly_on_target");
    }

    #[test]
    fn extra_arrivals_are_inert() {
        init_test("extra_arrivals_are_inert");
        let barrier = RendezvousBarrier::<&str>::new(1).expect("count 1 is valid");
        barrier.arrive_with("one");
        barrier.arrive_with("second");
        barrier.arrive();

        let first = barrier.wait_blocking().expect("barrier released");
        let second = barrier.wait_blocking().expect("barrier released");
        crate::assert_with_log!(
            &*first == ["one"],
            "snapshot frozen at first release",
            &["one"][..],
            &*first
        );
        crate::assert_with_log!(
            Arc::ptr_eq(&first, &second),
            "repeated waits share one snapshot",
            true,
            Arc::ptr_eq(&first, &second)
        );
        crate::assert_with_log!(
            barrier.remaining() == 0,
            "remaining is 0 once terminal",
            0usize,
            barrier.remaining()
        );
        crate::test_complete!("extra_arrivals_are_inert");
    }

    #[test]
    fn fail_propagates_to_current_and_future_waiters() {
        init_test("fail_propagates_to_current_and_future_waiters");
        let barrier =
            RendezvousBarrier::<i32, &str>::new(2).expect("count 2 is valid");
        let waiter = barrier.clone();

        let handle = thread::spawn(move || waiter.wait_blocking());

        thread::sleep(Duration::from_millis(50));
        barrier.fail("boom");

        let from_thread = handle.join().expect("thread panicked");
        crate::assert_with_log!(
            from_thread == Err("boom"),
            "suspended waiter sees the error",
            Err::<Arc<[i32]>, _>("boom"),
            from_thread
        );

        // Signals after failure are inert; the error is cached for late waiters.
        barrier.arrive_with(1);
        barrier.fail("other");
        let late = barrier.wait_blocking();
        crate::assert_with_log!(
            late == Err("boom"),
            "late waiter sees the original error",
            Err::<Arc<[i32]>, _>("boom"),
            late
        );
        crate::test_complete!("fail_propagates_to_current_and_future_waiters");
    }

    #[test]
    fn fail_after_release_is_inert() {
        init_test("fail_after_release_is_inert");
        let barrier = RendezvousBarrier::<i32, &str>::new(1).expect("count 1 is valid");
        barrier.arrive_with(7);
        barrier.fail("too late");

        let outcome = barrier.try_outcome();
        let Some(Ok(snapshot)) = outcome else {
            unreachable!("release must win over a later fail");
        };
        crate::assert_with_log!(
            &*snapshot == [7],
            "released snapshot survives a late fail",
            &[7][..],
            &*snapshot
        );
        crate::test_complete!("fail_after_release_is_inert");
    }

    #[test]
    fn release_wakes_registered_waiter() {
        init_test("release_wakes_registered_waiter");
        let barrier = RendezvousBarrier::<i32>::new(1).expect("count 1 is valid");
        let signaler = barrier.clone();

        let mut fut = barrier.wait();
        let pending = poll_once(&mut fut).is_pending();
        crate::assert_with_log!(pending, "first poll pending", true, pending);
        crate::assert_with_log!(
            barrier.waiter_count() == 1,
            "one registered waiter",
            1usize,
            barrier.waiter_count()
        );

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            signaler.arrive_with(9);
        });
        handle.join().expect("thread panicked");

        let outcome = poll_once(&mut fut);
        let Poll::Ready(Ok(snapshot)) = outcome else {
            unreachable!("released barrier must resolve the wait");
        };
        crate::assert_with_log!(
            &*snapshot == [9],
            "woken waiter sees the value",
            &[9][..],
            &*snapshot
        );
        crate::test_complete!("release_wakes_registered_waiter");
    }

    #[test]
    fn dropped_wait_unregisters() {
        init_test("dropped_wait_unregisters");
        let barrier = RendezvousBarrier::<i32>::new(1).expect("count 1 is valid");

        let mut fut = barrier.wait();
        let pending = poll_once(&mut fut).is_pending();
        crate::assert_with_log!(pending, "first poll pending", true, pending);
        drop(fut);
        crate::assert_with_log!(
            barrier.waiter_count() == 0,
            "dropped wait leaves no waiter",
            0usize,
            barrier.waiter_count()
        );

        // The barrier itself is untouched by the abandoned waiter.
        barrier.arrive();
        let terminal = barrier.is_terminal();
        crate::assert_with_log!(terminal, "barrier still releases", true, terminal);
        crate::test_complete!("dropped_wait_unregisters");
    }

    #[test]
    fn concurrent_arrivals_all_collected() {
        init_test("concurrent_arrivals_all_collected");
        let barrier = RendezvousBarrier::<i32>::new(2).expect("count 2 is valid");

        let mut handles = Vec::new();
        for value in [1, 2] {
            let signaler = barrier.clone();
            handles.push(thread::spawn(move || signaler.arrive_with(value)));
        }

        let snapshot = barrier.wait_blocking().expect("barrier released");
        for handle in handles {
            handle.join().expect("thread panicked");
        }

        let mut sorted: Vec<i32> = snapshot.to_vec();
        sorted.sort_unstable();
        crate::assert_with_log!(
            sorted == [1, 2],
            "both concurrent values collected",
            &[1, 2][..],
            &sorted[..]
        );
        crate::test_complete!("concurrent_arrivals_all_collected");
    }

    #[test]
    fn split_handles_share_state() {
        init_test("split_handles_share_state");
        let barrier = RendezvousBarrier::<i32>::new(1).expect("count 1 is valid");
        let (signaler, outcome) = barrier.split();

        signaler.arrive_with(5);
        let peeked = outcome.try_outcome();
        let Some(Ok(snapshot)) = peeked else {
            unreachable!("signaler arrival must release the shared barrier");
        };
        crate::assert_with_log!(
            &*snapshot == [5],
            "outcome handle sees the signaled value",
            &[5][..],
            &*snapshot
        );
        crate::test_complete!("split_handles_share_state");
    }

    #[test]
    fn default_is_single_arrival() {
        init_test("default_is_single_arrival");
        let barrier = RendezvousBarrier::<u8>::default();
        crate::assert_with_log!(
            barrier.target_count() == 1,
            "default target is 1",
            1usize,
            barrier.target_count()
        );
        barrier.arrive();
        let terminal = barrier.is_terminal();
        crate::assert_with_log!(terminal, "single arrival releases", true, terminal);
        crate::test_complete!("default_is_single_arrival");
    }
}
