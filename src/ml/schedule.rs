// ============================================================
// Layer 5 — Learning-Rate Schedule
// ============================================================
// Linear warmup followed by linear decay, spanning the whole
// run (epochs × batches per epoch):
//
//   lr(step) = base · step / warmup                 step < warmup
//   lr(step) = base · (total - step) / (total - warmup)   otherwise
//
// The first optimizer step runs at lr 0 and the last at (close
// to) 0, with the peak exactly at the end of warmup. Runs
// shorter than the warmup window never reach the base rate; the
// decay never goes below zero.

/// Warmup window in optimizer steps.
pub const WARMUP_STEPS: usize = 500;

#[derive(Debug, Clone)]
pub struct LinearWithWarmup {
    base_lr:      f64,
    warmup_steps: usize,
    total_steps:  usize,
    current:      usize,
}

impl LinearWithWarmup {
    pub fn new(base_lr: f64, warmup_steps: usize, total_steps: usize) -> Self {
        Self { base_lr, warmup_steps, total_steps, current: 0 }
    }

    /// The rate for the next optimizer step; advances the schedule.
    pub fn next_lr(&mut self) -> f64 {
        let lr = self.lr_at(self.current);
        self.current += 1;
        lr
    }

    fn lr_at(&self, step: usize) -> f64 {
        if step < self.warmup_steps {
            return self.base_lr * step as f64 / self.warmup_steps.max(1) as f64;
        }
        let remaining = self.total_steps.saturating_sub(step);
        let decay_window = self.total_steps.saturating_sub(self.warmup_steps).max(1);
        self.base_lr * remaining as f64 / decay_window as f64
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero_and_ramps_to_base() {
        let mut s = LinearWithWarmup::new(1.0, 10, 110);
        assert_eq!(s.next_lr(), 0.0);

        for _ in 1..10 {
            s.next_lr();
        }
        // Step 10 is the end of warmup: exactly the base rate.
        assert!((s.next_lr() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_decays_linearly_to_zero() {
        let mut s = LinearWithWarmup::new(1.0, 10, 110);
        let rates: Vec<f64> = (0..111).map(|_| s.next_lr()).collect();

        // Halfway through the decay window.
        assert!((rates[60] - 0.5).abs() < 1e-12);
        // Final step and anything past it.
        assert_eq!(rates[110], 0.0);
        assert_eq!(s.next_lr(), 0.0);
    }

    #[test]
    fn test_monotonic_up_then_down() {
        let mut s = LinearWithWarmup::new(5e-5, 10, 100);
        let rates: Vec<f64> = (0..100).map(|_| s.next_lr()).collect();
        for w in rates[..10].windows(2) {
            assert!(w[0] < w[1]);
        }
        for w in rates[10..].windows(2) {
            assert!(w[0] >= w[1]);
        }
    }

    #[test]
    fn test_run_shorter_than_warmup_never_panics() {
        // 1 epoch × 2 batches with the standard 500-step warmup.
        let mut s = LinearWithWarmup::new(1.0, WARMUP_STEPS, 2);
        let first = s.next_lr();
        let second = s.next_lr();
        assert!(first >= 0.0 && second >= 0.0);
        assert!(second <= 1.0);
    }
}
