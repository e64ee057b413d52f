//! Absolute I/O deadlines.

use std::io;
use std::pin::Pin;
use std::task::Context;

use tokio::time::{Instant, Sleep, sleep_until};

use crate::error::deadline_exceeded;

/// An optional point in time after which I/O in one direction fails.
///
/// The timer is polled from the I/O path, so a pending read or write is woken
/// when the deadline passes.
#[derive(Debug, Default)]
pub(crate) struct Deadline {
    timer: Option<Pin<Box<Sleep>>>,
}

impl Deadline {
    /// Set or clear the deadline. Must be called within a Tokio runtime.
    pub(crate) fn set(&mut self, at: Option<Instant>) {
        match (at, self.timer.as_mut()) {
            (None, _) => self.timer = None,
            (Some(at), Some(timer)) => timer.as_mut().reset(at),
            (Some(at), None) => self.timer = Some(Box::pin(sleep_until(at))),
        }
    }

    pub(crate) fn get(&self) -> Option<Instant> {
        self.timer.as_ref().map(|timer| timer.deadline())
    }

    /// Fail with `TimedOut` once the deadline has passed.
    ///
    /// While the deadline is in the future this registers the task for wakeup.
    pub(crate) fn poll_check(&mut self, cx: &mut Context<'_>) -> io::Result<()> {
        let Some(timer) = self.timer.as_mut() else {
            return Ok(());
        };
        // The timer driver works at millisecond granularity; compare the
        // clock first so a deadline that has already passed fails at once.
        if timer.deadline() <= Instant::now() || timer.as_mut().poll(cx).is_ready() {
            tracing::trace!("i/o deadline exceeded");
            return Err(deadline_exceeded());
        }
        Ok(())
    }
}
