//! WaitCoordinator - pull-based waits on pushed events
//!
//! `wait_for` registers a slot, suspends until a dispatch completes it or the
//! deadline passes, and runs the caller's check against the arguments. A
//! rejected event re-arms with a fresh slot against the same absolute deadline.

mod check;
mod waiter;

pub use check::{AsyncCheck, EventCheck, FnCheck, check_async, check_fn};
pub use waiter::WaitCoordinator;
