//! Rapid vertical oscillation detection over a sliding window of raw `y`.
//!
//! # Algorithm
//!
//! The last [`CAPACITY`] samples are kept.  Once at least [`MIN_SAMPLES`]
//! are present and the cooldown has elapsed, every interior sample is
//! compared with its two neighbours:
//!
//! * **peak** — lower `y` than both neighbours (screen `y` grows downward, so
//!   this is the visually highest point), and the neighbours differ by more
//!   than [`AMPLITUDE`];
//! * **valley** — higher `y` than both neighbours, same amplitude rule.
//!
//! Two or more peaks, or two or more valleys, count as an oscillation.
//! Extrema are counted independently: a peak–peak pair with no valley in
//! between still qualifies.

use std::collections::VecDeque;

use tracing::trace;

/// Samples retained; the oldest is evicted first.
pub const CAPACITY:    usize = 30;
/// Samples needed before a scan is attempted.
pub const MIN_SAMPLES: usize = 15;
/// Minimum spacing between two detections.
pub const COOLDOWN_MS: u64   = 200;
/// Neighbour difference an extremum must exceed, in pixels.
pub const AMPLITUDE:   f32   = 50.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Sample {
    y:  f32,
    at: u64,
}

/// Sliding-window oscillation detector.  Pure: it only reports, the caller
/// decides what a detection triggers.
#[derive(Clone, Debug, Default)]
pub struct GestureRecognizer {
    history:      VecDeque<Sample>,
    last_trigger: Option<u64>,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        GestureRecognizer {
            history:      VecDeque::with_capacity(CAPACITY + 1),
            last_trigger: None,
        }
    }

    /// Record `y` observed at `now_ms` and report whether it completes an
    /// oscillation.  A detection clears the history.
    pub fn observe(&mut self, y: f32, now_ms: u64) -> bool {
        self.history.push_back(Sample { y, at: now_ms });
        while self.history.len() > CAPACITY {
            self.history.pop_front();
        }

        if self.history.len() < MIN_SAMPLES {
            return false;
        }
        if let Some(last) = self.last_trigger {
            if now_ms.saturating_sub(last) < COOLDOWN_MS {
                return false;
            }
        }

        let (peaks, valleys) = self.count_extrema();
        if peaks >= 2 || valleys >= 2 {
            trace!(peaks, valleys, span_ms = self.span_ms(), "oscillation detected");
            self.last_trigger = Some(now_ms);
            self.history.clear();
            return true;
        }
        false
    }

    /// Scan indices `2..=len-3` for qualifying peaks and valleys.
    fn count_extrema(&self) -> (usize, usize) {
        let h = &self.history;
        let mut peaks = 0;
        let mut valleys = 0;

        for i in 2..h.len().saturating_sub(2) {
            let (prev, cur, next) = (h[i - 1].y, h[i].y, h[i + 1].y);
            if (prev - next).abs() <= AMPLITUDE {
                continue;
            }
            if cur < prev && cur < next {
                peaks += 1;
            } else if cur > prev && cur > next {
                valleys += 1;
            }
        }
        (peaks, valleys)
    }

    /// Forget all samples and the cooldown.
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_trigger = None;
    }

    /// Time covered by the retained samples.
    pub fn span_ms(&self) -> u64 {
        match (self.history.front(), self.history.back()) {
            (Some(first), Some(last)) => last.at.saturating_sub(first.at),
            _ => 0,
        }
    }

    pub fn len(&self) -> usize { self.history.len() }
    pub fn is_empty(&self) -> bool { self.history.is_empty() }
    pub fn last_trigger(&self) -> Option<u64> { self.last_trigger }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    /// A jagged up/down wave: every `0` is a peak (neighbours 300 and 100)
    /// and every `300` a valley (neighbours 100 and 0).
    const WAVE: [f32; 3] = [300.0, 0.0, 100.0];

    fn feed(r: &mut GestureRecognizer, ys: impl IntoIterator<Item = f32>, start: u64, step: u64) -> Vec<bool> {
        ys.into_iter()
            .enumerate()
            .map(|(i, y)| r.observe(y, start + i as u64 * step))
            .collect()
    }

    fn wave(n: usize) -> impl Iterator<Item = f32> {
        WAVE.iter().copied().cycle().take(n)
    }

    #[test]
    fn fewer_than_min_samples_never_fire() {
        let mut r = GestureRecognizer::new();
        let fired = feed(&mut r, wave(MIN_SAMPLES - 1), 0, 30);
        assert!(fired.iter().all(|f| !f));
        assert_eq!(r.len(), MIN_SAMPLES - 1);
    }

    #[test]
    fn oscillation_fires_once_and_clears() {
        let mut r = GestureRecognizer::new();
        let fired = feed(&mut r, wave(MIN_SAMPLES), 0, 30);
        assert_eq!(fired.iter().filter(|f| **f).count(), 1);
        assert!(fired[MIN_SAMPLES - 1]);
        assert!(r.is_empty());
        assert_eq!(r.last_trigger(), Some((MIN_SAMPLES as u64 - 1) * 30));
    }

    #[test]
    fn cooldown_blocks_repeat_within_200ms() {
        let mut r = GestureRecognizer::new();
        // 10ms spacing: the 15th sample lands at t=140.
        let fired = feed(&mut r, wave(MIN_SAMPLES), 0, 10);
        assert!(fired[MIN_SAMPLES - 1]);

        // A full window again by t=164, only 24ms after the trigger.
        let mut r2 = r.clone();
        let again = feed(&mut r2, wave(MIN_SAMPLES), 150, 1);
        assert!(again.iter().all(|f| !f), "must stay quiet inside the cooldown");

        // Once 200ms have passed the same window fires again.
        let late = r2.observe(0.0, 140 + COOLDOWN_MS);
        assert!(late);
    }

    #[test]
    fn flat_signal_never_fires() {
        let mut r = GestureRecognizer::new();
        let fired = feed(&mut r, std::iter::repeat(250.0).take(100), 0, 16);
        assert!(fired.iter().all(|f| !f));
        assert_eq!(r.len(), CAPACITY);
    }

    #[test]
    fn shallow_wobble_is_ignored() {
        let mut r = GestureRecognizer::new();
        let ys = [200.0, 170.0, 190.0].iter().copied().cycle().take(60);
        let fired = feed(&mut r, ys, 0, 16);
        assert!(fired.iter().all(|f| !f));
    }

    #[test]
    fn symmetric_neighbours_do_not_count() {
        // Neighbours of each extremum are equal, so the amplitude rule fails.
        let mut r = GestureRecognizer::new();
        let ys = [100.0, 100.0, 0.0].iter().copied().cycle().take(60);
        let fired = feed(&mut r, ys, 0, 16);
        assert!(fired.iter().all(|f| !f));
    }

    #[test]
    fn two_peaks_without_valley_still_fire() {
        // Peaks at indices 3 and 8; no sample is higher than both neighbours.
        let ys = [
            300.0, 300.0, 300.0, 100.0, 200.0, 200.0, 200.0, 200.0,
            100.0, 300.0, 300.0, 300.0, 300.0, 300.0, 300.0,
        ];
        let mut r = GestureRecognizer::new();
        let fired = feed(&mut r, ys, 0, 16);
        assert!(fired[14]);
        assert_eq!(fired.iter().filter(|f| **f).count(), 1);
    }

    #[test]
    fn history_is_bounded() {
        let mut r = GestureRecognizer::new();
        for i in 0..500u64 {
            r.observe((i % 7) as f32, i * 10);
            assert!(r.len() <= CAPACITY);
        }
        // Oldest samples were evicted: 30 samples span 29 intervals.
        assert_eq!(r.span_ms(), 290);
    }

    #[test]
    fn reset_forgets_cooldown() {
        let mut r = GestureRecognizer::new();
        feed(&mut r, wave(MIN_SAMPLES), 0, 10);
        assert!(r.last_trigger().is_some());
        r.reset();
        assert_eq!(r.last_trigger(), None);
        let fired = feed(&mut r, wave(MIN_SAMPLES), 150, 1);
        assert!(fired[MIN_SAMPLES - 1]);
    }
}
