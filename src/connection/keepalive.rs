//! Keep-alive ping schedule shared by the read and write paths.
//!
//! The interval timer keeps a single waker, so it is polled with a waker that
//! forwards each tick to the last task seen on each direction. After
//! `tokio::io::split` a reader parked in `poll_read` is still woken when the
//! writer was the last to poll.

use std::sync::Arc;
use std::task::{Context, Waker};
use std::time::Duration;

use futures_util::task::{ArcWake, AtomicWaker};
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Which I/O path is polling the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Read,
    Write,
}

#[derive(Default)]
struct DirectionWakers {
    read: AtomicWaker,
    write: AtomicWaker,
}

impl ArcWake for DirectionWakers {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.read.wake();
        arc_self.write.wake();
    }
}

pub(crate) struct Keepalive {
    interval: Interval,
    wakers: Arc<DirectionWakers>,
    tick_waker: Waker,
    due: bool,
}

impl Keepalive {
    /// First ping is due one `period` from now. Must be called within a Tokio
    /// runtime.
    pub(crate) fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let wakers = Arc::new(DirectionWakers::default());
        let tick_waker = futures_util::task::waker(wakers.clone());
        Self {
            interval,
            wakers,
            tick_waker,
            due: false,
        }
    }

    /// Whether a ping should be sent now.
    ///
    /// Registers the caller for the next tick under `direction`.
    pub(crate) fn poll_due(&mut self, cx: &mut Context<'_>, direction: Direction) -> bool {
        match direction {
            Direction::Read => self.wakers.read.register(cx.waker()),
            Direction::Write => self.wakers.write.register(cx.waker()),
        }

        let mut tick_cx = Context::from_waker(&self.tick_waker);
        while self.interval.poll_tick(&mut tick_cx).is_ready() {
            self.due = true;
        }
        self.due
    }

    /// Mark the due ping as queued.
    pub(crate) fn sent(&mut self) {
        self.due = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingWaker(AtomicUsize);

    impl ArcWake for CountingWaker {
        fn wake_by_ref(arc_self: &Arc<Self>) {
            arc_self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_due_before_period() {
        let mut keepalive = Keepalive::new(Duration::from_secs(5));
        let mut cx = Context::from_waker(Waker::noop());

        assert!(!keepalive.poll_due(&mut cx, Direction::Read));
        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(!keepalive.poll_due(&mut cx, Direction::Read));
    }

    #[tokio::test(start_paused = true)]
    async fn test_due_until_sent() {
        let mut keepalive = Keepalive::new(Duration::from_secs(1));
        let mut cx = Context::from_waker(Waker::noop());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(keepalive.poll_due(&mut cx, Direction::Write));
        assert!(keepalive.poll_due(&mut cx, Direction::Read));

        keepalive.sent();
        assert!(!keepalive.poll_due(&mut cx, Direction::Read));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_wakes_both_directions() {
        let mut keepalive = Keepalive::new(Duration::from_secs(1));
        let reader = Arc::new(CountingWaker::default());
        let writer = Arc::new(CountingWaker::default());
        let reader_waker = futures_util::task::waker(reader.clone());
        let writer_waker = futures_util::task::waker(writer.clone());

        // The writer polls last, as a write half does after the reader parks.
        assert!(!keepalive.poll_due(&mut Context::from_waker(&reader_waker), Direction::Read));
        assert!(!keepalive.poll_due(&mut Context::from_waker(&writer_waker), Direction::Write));

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(reader.0.load(Ordering::SeqCst), 1);
        assert_eq!(writer.0.load(Ordering::SeqCst), 1);
    }
}
