use std::time::{Duration, Instant};

/// Default tick interval in milliseconds
pub const DEFAULT_TICK_MS: u64 = 250;

/// Get tick duration
pub fn tick_duration() -> Duration {
    Duration::from_millis(DEFAULT_TICK_MS)
}

/// What a timer does when it fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerKind {
    /// Periodic reload of the task list
    AutoRefresh,
    /// Commit filter edits once typing settles
    FilterDebounce,
    /// Per-task countdown label update
    Countdown(String),
    /// Reload shortly after a countdown reached its deadline
    ExpiryReload,
    /// Hide the current toast
    ToastExpiry,
}

#[derive(Debug, Clone)]
struct Timer {
    kind: TimerKind,
    due: Instant,
    every: Option<Duration>,
}

/// Cancellable timers polled from the UI loop.
///
/// At most one timer exists per [`TimerKind`]; arming a kind again replaces
/// the old timer, which gives debounce semantics for free.
#[derive(Debug, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire once after `delay`
    pub fn set_timeout(&mut self, kind: TimerKind, delay: Duration, now: Instant) {
        self.arm(Timer {
            kind,
            due: now + delay,
            every: None,
        });
    }

    /// Fire every `every`, first after one period
    pub fn set_interval(&mut self, kind: TimerKind, every: Duration, now: Instant) {
        self.arm(Timer {
            kind,
            due: now + every,
            every: Some(every),
        });
    }

    fn arm(&mut self, timer: Timer) {
        self.clear(&timer.kind);
        self.timers.push(timer);
    }

    pub fn clear(&mut self, kind: &TimerKind) {
        self.timers.retain(|t| &t.kind != kind);
    }

    /// Drop every countdown timer (on re-render)
    pub fn clear_countdowns(&mut self) {
        self.timers
            .retain(|t| !matches!(t.kind, TimerKind::Countdown(_)));
    }

    pub fn is_active(&self, kind: &TimerKind) -> bool {
        self.timers.iter().any(|t| &t.kind == kind)
    }

    pub fn countdown_count(&self) -> usize {
        self.timers
            .iter()
            .filter(|t| matches!(t.kind, TimerKind::Countdown(_)))
            .count()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Collect timers due at `now`, in due order. One-shots are removed;
    /// intervals are re-armed for their next period (missed periods are
    /// skipped, not replayed).
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerKind> {
        let mut fired: Vec<(Instant, TimerKind)> = Vec::new();

        self.timers.retain_mut(|timer| {
            if timer.due > now {
                return true;
            }
            fired.push((timer.due, timer.kind.clone()));
            match timer.every {
                Some(every) => {
                    timer.due += every;
                    if timer.due <= now {
                        timer.due = now + every;
                    }
                    true
                }
                None => false,
            }
        });

        fired.sort_by_key(|(due, _)| *due);
        fired.into_iter().map(|(_, kind)| kind).collect()
    }

    /// Cancel everything
    pub fn dispose(&mut self) {
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_duration() {
        let duration = tick_duration();
        assert_eq!(duration, Duration::from_millis(250));
    }

    #[test]
    fn test_timeout_fires_once() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.set_timeout(TimerKind::ExpiryReload, Duration::from_millis(1500), start);

        assert!(scheduler.take_due(start + Duration::from_millis(1499)).is_empty());
        assert_eq!(
            scheduler.take_due(start + Duration::from_millis(1500)),
            vec![TimerKind::ExpiryReload]
        );
        assert!(scheduler.take_due(start + Duration::from_secs(10)).is_empty());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_rearming_replaces_timer() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.set_timeout(TimerKind::FilterDebounce, Duration::from_millis(300), start);
        scheduler.set_timeout(
            TimerKind::FilterDebounce,
            Duration::from_millis(300),
            start + Duration::from_millis(200),
        );

        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.take_due(start + Duration::from_millis(300)).is_empty());
        assert_eq!(
            scheduler.take_due(start + Duration::from_millis(500)),
            vec![TimerKind::FilterDebounce]
        );
    }

    #[test]
    fn test_interval_rearms_and_skips_missed_periods() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.set_interval(TimerKind::AutoRefresh, Duration::from_secs(30), start);

        assert_eq!(
            scheduler.take_due(start + Duration::from_secs(30)),
            vec![TimerKind::AutoRefresh]
        );
        // Long stall: fires once, not three times
        assert_eq!(scheduler.take_due(start + Duration::from_secs(125)).len(), 1);
        assert!(scheduler.take_due(start + Duration::from_secs(150)).is_empty());
        assert_eq!(scheduler.take_due(start + Duration::from_secs(155)).len(), 1);
    }

    #[test]
    fn test_clear_countdowns_and_dispose() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.set_interval(TimerKind::AutoRefresh, Duration::from_secs(30), start);
        scheduler.set_interval(TimerKind::Countdown("a".to_string()), Duration::from_secs(60), start);
        scheduler.set_interval(TimerKind::Countdown("b".to_string()), Duration::from_secs(60), start);
        assert_eq!(scheduler.countdown_count(), 2);

        scheduler.clear_countdowns();
        assert_eq!(scheduler.countdown_count(), 0);
        assert!(scheduler.is_active(&TimerKind::AutoRefresh));

        scheduler.dispose();
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_due_order() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.set_timeout(TimerKind::ToastExpiry, Duration::from_secs(3), start);
        scheduler.set_timeout(TimerKind::FilterDebounce, Duration::from_millis(300), start);

        assert_eq!(
            scheduler.take_due(start + Duration::from_secs(5)),
            vec![TimerKind::FilterDebounce, TimerKind::ToastExpiry]
        );
    }
}
