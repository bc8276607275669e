use crate::events::EventLog;

pub const HOUR_MS: i64 = 3_600_000;

/// Intrinsic timeline density at scale 1.0. Zooming multiplies this, so
/// the scrollable width grows instead of stretching the paint.
pub const BASE_PX_PER_HOUR: f32 = 200.0;

/// Hour-aligned time range spanned by the log: the first timestamp
/// rounded down, the last rounded up. `None` for an empty log; there
/// is no axis and rendering is a no-op.
pub fn domain(log: &EventLog) -> Option<(i64, i64)> {
    let first = log.first()?.timestamp_ms;
    let last = log.last()?.timestamp_ms;
    // Saturating throughout: a crafted timestamp within an hour of the
    // i64 range must degrade the domain, not panic the viewer.
    let start = first.div_euclid(HOUR_MS).saturating_mul(HOUR_MS);
    let mut end = last
        .saturating_add(HOUR_MS - 1)
        .div_euclid(HOUR_MS)
        .saturating_mul(HOUR_MS);
    if end == start {
        // Both endpoints on the same boundary; widen to one synthetic hour.
        end = start.saturating_add(HOUR_MS);
    }
    Some((start, end))
}

/// Scrollable content width for a domain at the given zoom scale. The
/// span is taken in f64 so that extreme domains stay finite instead of
/// overflowing the subtraction.
pub fn content_width(start: i64, end: i64, scale: f32) -> f32 {
    let hours = (end as f64 - start as f64).max(0.0) / HOUR_MS as f64;
    (hours * BASE_PX_PER_HOUR as f64 * scale as f64) as f32
}

/// Every hour boundary in `[start, end]`, inclusive on both ends.
pub fn hour_marks(start: i64, end: i64) -> impl Iterator<Item = i64> {
    (start..=end).step_by(HOUR_MS as usize)
}

/// Linear wall-clock-to-pixel mapping over a fixed domain and width.
#[derive(Clone, Copy, Debug)]
pub struct TimeAxis {
    start: i64,
    end: i64,
    px_per_ms: f32,
}

impl TimeAxis {
    pub fn new(start: i64, end: i64, width_px: f32) -> Self {
        let end = if end <= start {
            start.saturating_add(HOUR_MS)
        } else {
            end
        };
        Self {
            start,
            end,
            px_per_ms: width_px / (end as f64 - start as f64) as f32,
        }
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn px_per_ms(&self) -> f32 {
        self.px_per_ms
    }

    pub fn x_of(&self, t: i64) -> f32 {
        (t as f64 - self.start as f64) as f32 * self.px_per_ms
    }

    /// Inverse of `x_of`, rounded to the nearest millisecond and clamped
    /// to the domain.
    pub fn time_at(&self, x: f32) -> i64 {
        let offset_ms = (x / self.px_per_ms).round() as i64;
        self.start
            .saturating_add(offset_ms)
            .clamp(self.start, self.end)
    }
}
