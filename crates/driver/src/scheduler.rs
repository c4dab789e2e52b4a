use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

/// A frame granted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    /// Zero-based index of the grant.
    pub index: u64,
    /// Time since the scheduler handed out its first frame.
    pub elapsed: Duration,
}

/// The host's frame cadence.
///
/// `next_frame` is the driver's only suspension point. Returning `None`
/// means the host is tearing down and no further frames will come.
pub trait FrameScheduler {
    fn next_frame(&mut self) -> impl Future<Output = Option<FrameTick>>;
}

/// Grants a fixed number of frames immediately, with no waiting.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    remaining: u64,
    issued: u64,
}

impl ManualScheduler {
    pub fn new(frames: u64) -> Self {
        Self {
            remaining: frames,
            issued: 0,
        }
    }

    /// Frames handed out so far.
    pub fn issued(&self) -> u64 {
        self.issued
    }
}

impl FrameScheduler for ManualScheduler {
    fn next_frame(&mut self) -> impl Future<Output = Option<FrameTick>> {
        let tick = if self.remaining == 0 {
            None
        } else {
            self.remaining -= 1;
            let tick = FrameTick {
                index: self.issued,
                elapsed: Duration::ZERO,
            };
            self.issued += 1;
            Some(tick)
        };
        std::future::ready(tick)
    }
}

/// Paces frames at a fixed interval, nominally one display refresh.
///
/// A late frame is granted immediately and the cadence restarts from it
/// rather than bursting to catch up. An optional limit stands in for the
/// host shutting down.
#[derive(Debug, Clone)]
pub struct FixedRateScheduler {
    interval: Duration,
    limit: Option<u64>,
    issued: u64,
    started: Option<Instant>,
    next_deadline: Option<Instant>,
}

impl FixedRateScheduler {
    pub const DEFAULT_FPS: u32 = 60;

    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            limit: None,
            issued: 0,
            started: None,
            next_deadline: None,
        }
    }

    /// `fps` of zero is treated as one.
    pub fn with_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs(1) / fps.max(1))
    }

    pub fn with_limit(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for FixedRateScheduler {
    fn default() -> Self {
        Self::with_fps(Self::DEFAULT_FPS)
    }
}

impl FrameScheduler for FixedRateScheduler {
    fn next_frame(&mut self) -> impl Future<Output = Option<FrameTick>> {
        async move {
            if self.limit.is_some_and(|limit| self.issued >= limit) {
                return None;
            }

            if let Some(deadline) = self.next_deadline {
                Delay::until(deadline).await;
            }

            let granted = Instant::now();
            let started = *self.started.get_or_insert(granted);
            let next = self
                .next_deadline
                .map(|d| d + self.interval)
                .filter(|d| *d > granted)
                .unwrap_or(granted + self.interval);
            self.next_deadline = Some(next);

            let tick = FrameTick {
                index: self.issued,
                elapsed: granted - started,
            };
            self.issued += 1;
            Some(tick)
        }
    }
}

/// Resolves once `deadline` has passed.
///
/// Polling before the deadline returns `Pending` right away; a timer thread
/// wakes the most recently registered waker when the deadline is reached.
#[derive(Debug)]
struct Delay {
    deadline: Instant,
    waker: Option<Arc<Mutex<Option<Waker>>>>,
}

impl Delay {
    fn until(deadline: Instant) -> Self {
        Self {
            deadline,
            waker: None,
        }
    }
}

impl Future for Delay {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if Instant::now() >= self.deadline {
            return Poll::Ready(());
        }

        if let Some(slot) = &self.waker {
            if let Ok(mut waker) = slot.lock() {
                *waker = Some(cx.waker().clone());
            }
            return Poll::Pending;
        }

        let slot = Arc::new(Mutex::new(Some(cx.waker().clone())));
        let timer_slot = Arc::clone(&slot);
        let deadline = self.deadline;
        let spawned = std::thread::Builder::new()
            .name("frame-timer".into())
            .spawn(move || {
                let now = Instant::now();
                if deadline > now {
                    std::thread::sleep(deadline - now);
                }
                let waker = timer_slot.lock().ok().and_then(|mut w| w.take());
                if let Some(waker) = waker {
                    waker.wake();
                }
            });
        match spawned {
            Ok(_) => self.waker = Some(slot),
            Err(e) => {
                // no timer: ask to be polled again
                tracing::warn!("frame timer unavailable: {e}");
                cx.waker().wake_by_ref();
            }
        }
        Poll::Pending
    }
}
