//! Cancellable scheduled tasks
//!
//! Every debounce and throttle in the editor goes through the two primitives
//! in this module. They never read a clock: the host passes the current
//! monotonic time (`performance.now()` in the browser) into every call and
//! drives expiry by calling `poll`.

/// Host-supplied monotonic time in milliseconds
pub type Millis = u64;

/// Lifecycle of a scheduled task
#[derive(Debug, Clone, PartialEq, Eq)]
enum TaskState<T> {
    Idle,
    Pending { due: Millis, payload: T },
}

/// A single-slot trailing timer
///
/// Scheduling again before the task fires replaces both the deadline and the
/// payload, so only the most recent call survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask<T> {
    state: TaskState<T>,
}

impl<T> ScheduledTask<T> {
    pub fn new() -> Self {
        Self { state: TaskState::Idle }
    }

    /// Arm the task to fire `delay` ms after `now`, superseding any pending payload
    pub fn schedule(&mut self, now: Millis, delay: Millis, payload: T) {
        self.state = TaskState::Pending {
            due: now.saturating_add(delay),
            payload,
        };
    }

    /// Drop the pending payload, if any
    pub fn cancel(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.state, TaskState::Idle) {
            TaskState::Pending { payload, .. } => Some(payload),
            TaskState::Idle => None,
        }
    }

    /// Take the payload if its deadline has passed
    pub fn poll(&mut self, now: Millis) -> Option<T> {
        if self.due_at().is_some_and(|due| due <= now) {
            self.cancel()
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, TaskState::Pending { .. })
    }

    pub fn due_at(&self) -> Option<Millis> {
        match &self.state {
            TaskState::Pending { due, .. } => Some(*due),
            TaskState::Idle => None,
        }
    }

    pub fn payload(&self) -> Option<&T> {
        match &self.state {
            TaskState::Pending { payload, .. } => Some(payload),
            TaskState::Idle => None,
        }
    }
}

impl<T> Default for ScheduledTask<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Leading-edge throttle with a trailing fire
///
/// The first value in a window passes straight through. Later values inside
/// the window are held (latest wins) and released once the window closes.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval: Millis,
    window_start: Option<Millis>,
    trailing: ScheduledTask<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Millis) -> Self {
        Self {
            interval,
            window_start: None,
            trailing: ScheduledTask::new(),
        }
    }

    /// Offer a value; returns it immediately when the window is open
    pub fn offer(&mut self, now: Millis, value: T) -> Option<T> {
        match self.window_start {
            Some(start) if now < start.saturating_add(self.interval) => {
                let due = start.saturating_add(self.interval);
                self.trailing.schedule(now, due - now, value);
                None
            }
            _ => {
                self.window_start = Some(now);
                self.trailing.cancel();
                Some(value)
            }
        }
    }

    /// Release the held trailing value once the window has closed
    pub fn poll(&mut self, now: Millis) -> Option<T> {
        let value = self.trailing.poll(now)?;
        self.window_start = Some(now);
        Some(value)
    }

    pub fn cancel(&mut self) {
        self.trailing.cancel();
        self.window_start = None;
    }

    pub fn is_pending(&self) -> bool {
        self.trailing.is_pending()
    }

    pub fn due_at(&self) -> Option<Millis> {
        self.trailing.due_at()
    }
}
