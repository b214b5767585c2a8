//! Value-collecting N-way rendezvous barrier for threads and async tasks.
//!
//! # Overview
//!
//! A [`RendezvousBarrier`] lets a fixed number of independent executing
//! contexts rendezvous at a checkpoint, optionally exchanging values, before
//! any of them proceed. Arrivals count down from the target; the arrival that
//! reaches zero releases every waiter with a frozen snapshot of the collected
//! values. Alternatively the barrier can be failed, delivering one error to
//! every waiter. Both transitions are one-shot and terminal.
//!
//! # Core Guarantees
//!
//! - **One release event**: the barrier transitions exactly once, to
//!   Released or Failed, never both, never twice
//! - **Shared snapshot**: every waiter, current or future, observes the
//!   identical collected-values snapshot (the same allocation)
//! - **Inert extras**: arrivals and failure signals after the transition are
//!   tolerated no-ops, so defensive double-signaling never panics
//! - **Both scheduling models**: waiting is offered as a cancel-safe future
//!   for async tasks and as a condvar park for plain threads
//!
//! # Example
//!
//! ```
//! use std::thread;
//! use rendezvous_barrier::RendezvousBarrier;
//!
//! let barrier = RendezvousBarrier::<u32>::new(2)?;
//! for value in [1, 2] {
//!     let signaler = barrier.clone();
//!     thread::spawn(move || signaler.arrive_with(value));
//! }
//!
//! let mut snapshot = barrier.wait_blocking().unwrap().to_vec();
//! snapshot.sort_unstable();
//! assert_eq!(snapshot, [1, 2]);
//! # Ok::<(), rendezvous_barrier::InvalidCountError>(())
//! ```
//!
//! # Module Structure
//!
//! - [`barrier`]: the rendezvous primitive, its handles, and its errors
//! - [`test_utils`]: tracing-based logging helpers and test macros

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

pub mod barrier;
pub mod test_utils;

pub use barrier::{InvalidCountError, Outcome, RendezvousBarrier, Signaler, Wait};
