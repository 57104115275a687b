//! Progress reporting for the streamed archive GET.

/// Snapshot of transfer progress (bytes received vs. declared length).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressStats {
    pub bytes_done: u64,
    /// Declared length, if the server sent one.
    pub total_bytes: Option<u64>,
}

impl ProgressStats {
    /// Fraction complete in [0.0, 1.0]; None while the total is unknown.
    pub fn fraction(&self) -> Option<f64> {
        let total = self.total_bytes?;
        if total == 0 {
            return Some(1.0);
        }
        Some((self.bytes_done as f64 / total as f64).min(1.0))
    }
}

/// Emits a progress line each time another tenth of the transfer completes.
#[derive(Debug, Default)]
pub(crate) struct DecileReporter {
    last: Option<u8>,
}

impl DecileReporter {
    /// Returns the new decile (0..=10) when it advanced since the last call.
    pub(crate) fn observe(&mut self, stats: ProgressStats) -> Option<u8> {
        let decile = (stats.fraction()? * 10.0).floor() as u8;
        if self.last.is_some_and(|l| decile <= l) {
            return None;
        }
        self.last = Some(decile);
        Some(decile)
    }
}
