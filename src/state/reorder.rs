/// Reorder selection mode for the pending strip
///
/// Double-click a thumbnail to enter the mode with it selected, then click
/// another thumbnail to swap the two. Double-click again to leave. The mode
/// reverts on its own after a timeout; it never touches image data itself.

use std::time::{Duration, Instant};

/// What a click on a pending thumbnail did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Single click outside reorder mode
    Ignored,
    Entered(usize),
    Exited,
    Selected(usize),
    Deselected,
    /// Caller must swap these two positions
    Swap(usize, usize),
}

#[derive(Debug, Clone)]
pub struct ReorderMode {
    timeout: Duration,
    double_click: Duration,
    /// When the mode was entered, `None` when inactive
    since: Option<Instant>,
    first: Option<usize>,
    last_click: Option<(usize, Instant)>,
}

impl ReorderMode {
    pub fn new(timeout: Duration, double_click: Duration) -> Self {
        Self {
            timeout,
            double_click,
            since: None,
            first: None,
            last_click: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.since.is_some()
    }

    pub fn selected(&self) -> Option<usize> {
        self.first
    }

    pub fn click(&mut self, index: usize, now: Instant) -> ClickOutcome {
        let double = matches!(
            self.last_click,
            Some((previous, at)) if previous == index && now.duration_since(at) < self.double_click
        );

        if double {
            self.last_click = None;
            if self.is_active() {
                self.exit();
                return ClickOutcome::Exited;
            }
            self.since = Some(now);
            self.first = Some(index);
            return ClickOutcome::Entered(index);
        }

        self.last_click = Some((index, now));
        if !self.is_active() {
            return ClickOutcome::Ignored;
        }

        match self.first {
            None => {
                self.first = Some(index);
                ClickOutcome::Selected(index)
            }
            Some(first) if first == index => {
                self.first = None;
                ClickOutcome::Deselected
            }
            Some(first) => {
                self.exit();
                ClickOutcome::Swap(first, index)
            }
        }
    }

    /// Expire the mode. Returns true if it was active and timed out.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.since {
            Some(since) if now.duration_since(since) >= self.timeout => {
                self.exit();
                true
            }
            _ => false,
        }
    }

    pub fn exit(&mut self) {
        self.since = None;
        self.first = None;
        self.last_click = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode() -> ReorderMode {
        ReorderMode::new(Duration::from_secs(10), Duration::from_millis(300))
    }

    fn ms(t: Instant, millis: u64) -> Instant {
        t + Duration::from_millis(millis)
    }

    #[test]
    fn test_single_click_outside_mode_is_ignored() {
        let mut mode = mode();
        let t = Instant::now();
        assert_eq!(mode.click(3, t), ClickOutcome::Ignored);
        assert_eq!(mode.click(4, ms(t, 100)), ClickOutcome::Ignored);
        assert!(!mode.is_active());
    }

    #[test]
    fn test_double_click_then_pick_swaps() {
        let mut mode = mode();
        let t = Instant::now();
        mode.click(2, t);
        assert_eq!(mode.click(2, ms(t, 150)), ClickOutcome::Entered(2));
        assert_eq!(mode.selected(), Some(2));

        assert_eq!(mode.click(7, ms(t, 1000)), ClickOutcome::Swap(2, 7));
        assert!(!mode.is_active());
    }

    #[test]
    fn test_clicking_selection_deselects_then_double_exits() {
        let mut mode = mode();
        let t = Instant::now();
        mode.click(5, t);
        mode.click(5, ms(t, 100));

        assert_eq!(mode.click(5, ms(t, 800)), ClickOutcome::Deselected);
        assert!(mode.is_active());
        assert_eq!(mode.click(5, ms(t, 900)), ClickOutcome::Exited);
        assert!(!mode.is_active());
    }

    #[test]
    fn test_mode_expires() {
        let mut mode = mode();
        let t = Instant::now();
        mode.click(1, t);
        mode.click(1, ms(t, 50));

        assert!(!mode.tick(ms(t, 9_000)));
        assert!(mode.tick(ms(t, 10_050)));
        assert!(!mode.is_active());
        assert_eq!(mode.selected(), None);
    }
}
