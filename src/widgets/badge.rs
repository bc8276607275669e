use eframe::egui::{self, pos2, vec2, Align2, Rect, Response, Sense, Stroke, TextStyle, Ui, Widget};

use crate::events;
use crate::monitor::{LinkStatus, SignalSample};
use crate::themes::{colorhash, BadgeStyle};

/// Display range for the RSSI sparkline bars.
const SPARK_DBM_MIN: i32 = -90;
const SPARK_DBM_MAX: i32 = -30;

/// Seconds-resolution elapsed counter; hours grow past two digits
/// rather than wrapping.
fn fmt_elapsed(ms: i64) -> String {
    let total = (ms / 1000).max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// 0 for a disconnected sample, else the position of `dbm` within the
/// display range.
fn signal_fraction(dbm: i32) -> f32 {
    if dbm == 0 {
        return 0.0;
    }
    let clamped = dbm.clamp(SPARK_DBM_MIN, SPARK_DBM_MAX);
    (clamped - SPARK_DBM_MIN) as f32 / (SPARK_DBM_MAX - SPARK_DBM_MIN) as f32
}

fn paint_sparkline(
    painter: &egui::Painter,
    rect: Rect,
    samples: &[SignalSample],
    style: &BadgeStyle,
) {
    if samples.is_empty() || !rect.is_positive() {
        return;
    }
    let max_bars = (rect.width() / 3.0).floor().max(1.0) as usize;
    let shown = samples.len().min(max_bars);
    let recent = &samples[samples.len() - shown..];
    let bar_w = rect.width() / max_bars as f32;

    // Newest sample hugs the right edge.
    let mut x = rect.right() - shown as f32 * bar_w;
    for sample in recent {
        let frac = signal_fraction(sample.dbm);
        let bar = if frac <= 0.0 {
            // Disconnected: a low stub in the gap color so outages stay
            // visible in the strip.
            Rect::from_min_max(
                pos2(x + 0.5, rect.bottom() - 2.0),
                pos2(x + bar_w - 0.5, rect.bottom()),
            )
        } else {
            let h = (frac * rect.height()).max(2.0);
            Rect::from_min_max(
                pos2(x + 0.5, rect.bottom() - h),
                pos2(x + bar_w - 0.5, rect.bottom()),
            )
        };
        let color = if frac <= 0.0 {
            style.spark_gap
        } else {
            style.spark_bar
        };
        painter.rect_filled(bar, 0.0, color);
        x += bar_w;
    }
}

/// One-line status chip: state dot, SSID, time in the current state,
/// RSSI, and a short sparkline of recent signal samples.
#[must_use = "You should put this widget in a ui with `ui.add(widget);`"]
pub struct ConnectionBadge<'a> {
    status: &'a LinkStatus,
    since_ms: Option<i64>,
    now_ms: i64,
    signals: &'a [SignalSample],
    badge_style: Option<BadgeStyle>,
}

impl<'a> ConnectionBadge<'a> {
    pub fn new(
        status: &'a LinkStatus,
        since_ms: Option<i64>,
        now_ms: i64,
        signals: &'a [SignalSample],
    ) -> Self {
        Self {
            status,
            since_ms,
            now_ms,
            signals,
            badge_style: None,
        }
    }
}

impl Widget for ConnectionBadge<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let ConnectionBadge {
            status,
            since_ms,
            now_ms,
            signals,
            badge_style,
        } = self;

        let style = badge_style.unwrap_or_else(|| BadgeStyle::from(ui.style().as_ref()));

        let height = ui.text_style_height(&TextStyle::Body) + 12.0;
        let (rect, response) =
            ui.allocate_exact_size(vec2(ui.available_width(), height), Sense::hover());
        if !ui.is_rect_visible(rect) {
            return response;
        }

        let painter = ui.painter().with_clip_rect(rect);
        painter.rect_filled(rect, 4.0, ui.visuals().faint_bg_color);
        painter.rect_stroke(rect, 4.0, Stroke::new(1.0, style.outline), egui::StrokeKind::Inside);

        let font_id = TextStyle::Body.resolve(ui.style());
        let small_id = TextStyle::Small.resolve(ui.style());
        let center_y = rect.center().y;
        let mut x = rect.left() + 10.0;

        let dot = if status.connected {
            style.dot_up
        } else {
            style.dot_down
        };
        painter.circle_filled(pos2(x + 4.0, center_y), 4.0, dot);
        x += 16.0;

        let label = if status.connected {
            status.ssid.as_deref().unwrap_or(events::UNKNOWN)
        } else {
            events::NO_SIGNAL
        };
        let label_color = if status.connected {
            colorhash::ssid_accent(label)
        } else {
            style.dot_down
        };
        let used = painter.text(
            pos2(x, center_y),
            Align2::LEFT_CENTER,
            label,
            font_id,
            label_color,
        );
        x = used.right() + 12.0;

        if let Some(since) = since_ms {
            let used = painter.text(
                pos2(x, center_y),
                Align2::LEFT_CENTER,
                fmt_elapsed(now_ms - since),
                small_id.clone(),
                ui.visuals().weak_text_color(),
            );
            x = used.right() + 12.0;
        }
        if let Some(dbm) = status.rssi_dbm {
            painter.text(
                pos2(x, center_y),
                Align2::LEFT_CENTER,
                format!("{dbm} dBm"),
                small_id,
                ui.visuals().weak_text_color(),
            );
        }

        let spark_w = 72.0_f32.min(rect.width() * 0.25);
        let spark = Rect::from_min_max(
            pos2(rect.right() - spark_w - 10.0, rect.top() + 5.0),
            pos2(rect.right() - 10.0, rect.bottom() - 5.0),
        );
        paint_sparkline(&painter, spark, signals, &style);

        response
    }
}

impl crate::themes::Styled for ConnectionBadge<'_> {
    type Style = BadgeStyle;

    fn styled(mut self, style: Self::Style) -> Self {
        self.badge_style = Some(style);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_counts_hours_minutes_seconds() {
        assert_eq!(fmt_elapsed(0), "00:00:00");
        assert_eq!(fmt_elapsed(3_661_000), "01:01:01");
        assert_eq!(fmt_elapsed(100 * 3_600_000), "100:00:00");
    }

    #[test]
    fn elapsed_never_goes_negative() {
        assert_eq!(fmt_elapsed(-5_000), "00:00:00");
    }

    #[test]
    fn signal_fraction_spans_the_display_range() {
        assert_eq!(signal_fraction(0), 0.0);
        assert_eq!(signal_fraction(SPARK_DBM_MIN), 0.0);
        assert_eq!(signal_fraction(SPARK_DBM_MAX), 1.0);
        assert_eq!(signal_fraction(-60), 0.5);
        // clamped outside the range
        assert_eq!(signal_fraction(-20), 1.0);
        assert_eq!(signal_fraction(-110), 0.0);
    }

    #[test]
    fn renders_a_frame_headless() {
        let status = LinkStatus {
            connected: true,
            ssid: Some("HomeNet".to_owned()),
            rssi_dbm: Some(-58),
        };
        let signals = vec![
            SignalSample {
                timestamp_ms: 0,
                dbm: -60,
            },
            SignalSample {
                timestamp_ms: 10_000,
                dbm: 0,
            },
        ];
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.add(ConnectionBadge::new(&status, Some(0), 5_000, &signals));
            });
        });
    }
}
