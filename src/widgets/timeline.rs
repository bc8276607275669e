use chrono::{Local, TimeZone};
use eframe::egui::{
    self, pos2, vec2, Align2, Rect, Response, Sense, Stroke, TextStyle, Ui, Widget,
};

use crate::axis::{self, TimeAxis};
use crate::controller::InteractionController;
use crate::events::{EventLog, LinkEvent};
use crate::themes::{colorhash, TimelineStyle};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Segment {
    start_ms: i64,
    end_ms: i64,
    connected: bool,
}

/// Compact the step function into one drawable span per event: each
/// event's state runs until the next event, the last one until the
/// domain end.
fn segments(events: &[LinkEvent], domain_end: i64) -> Vec<Segment> {
    events
        .iter()
        .enumerate()
        .map(|(i, event)| Segment {
            start_ms: event.timestamp_ms,
            end_ms: events
                .get(i + 1)
                .map_or(domain_end, |next| next.timestamp_ms),
            connected: event.connected,
        })
        .collect()
}

/// Left-to-right greedy thinning: a label is drawn only when it sits at
/// least `min_spacing` to the right of the previously drawn one.
fn thin_labels(xs: &[f32], min_spacing: f32) -> Vec<bool> {
    let mut drawn = Vec::with_capacity(xs.len());
    let mut last_drawn = f32::NEG_INFINITY;
    for &x in xs {
        let draw = x - last_drawn >= min_spacing;
        if draw {
            last_drawn = x;
        }
        drawn.push(draw);
    }
    drawn
}

/// Wall-clock "HH:mm" for the hour ticks and the scrub readout.
fn fmt_clock(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|stamp| stamp.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_owned())
}

/// Scrollable connectivity band: green/red spans per logged state, a
/// marker per transition, hour ticks, and a draggable readout bubble
/// that doubles as the scrub handle.
///
/// Pan, zoom and scrub all go through the [`InteractionController`]
/// passed in; the widget itself keeps no state between frames.
#[must_use = "You should put this widget in a ui with `ui.add(widget);`"]
pub struct Timeline<'a> {
    log: &'a EventLog,
    controller: &'a mut InteractionController,
    height: f32,
    min_width: f32,
    trailing_pad: f32,
    timeline_style: Option<TimelineStyle>,
}

impl<'a> Timeline<'a> {
    pub fn new(log: &'a EventLog, controller: &'a mut InteractionController) -> Self {
        Self {
            log,
            controller,
            height: 160.0,
            min_width: 0.0,
            trailing_pad: 0.0,
            timeline_style: None,
        }
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = height.max(48.0);
        self
    }

    /// Fill at least this much width even when the log spans few hours.
    pub fn min_width(mut self, width: f32) -> Self {
        self.min_width = width;
        self
    }

    /// Extra scrollable room after the last hour, so the newest data can
    /// rest away from the right edge.
    pub fn trailing_pad(mut self, pad: f32) -> Self {
        self.trailing_pad = pad.max(0.0);
        self
    }
}

impl Widget for Timeline<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let Timeline {
            log,
            controller,
            height,
            min_width,
            trailing_pad,
            timeline_style,
        } = self;

        let style = timeline_style.unwrap_or_else(|| TimelineStyle::from(ui.style().as_ref()));

        let domain = axis::domain(log);
        let band_width = domain
            .map(|(start, end)| axis::content_width(start, end, controller.scale()))
            .unwrap_or(0.0);
        let total_width = (band_width + trailing_pad).max(min_width);

        let (rect, response) = ui.allocate_exact_size(vec2(total_width, height), Sense::hover());
        if !ui.is_rect_visible(rect) {
            return response;
        }

        let painter = ui.painter().with_clip_rect(rect);
        painter.rect_filled(rect, 0.0, style.backdrop);

        let Some((start, end)) = domain else {
            // Nothing recorded yet: bare backdrop, no overlays.
            return response;
        };
        let axis = TimeAxis::new(start, end, band_width);

        let bar_height = rect.height() * style.bar_fraction;
        let bar_top = rect.center().y - bar_height * 0.5;
        let bar_bottom = rect.center().y + bar_height * 0.5;

        // The band can be tens of thousands of pixels wide when zoomed
        // in; only touch what can reach the screen.
        let clip = ui.clip_rect();
        let visible_left = clip.left().max(rect.left()) - rect.left();
        let visible_right = clip.right().min(rect.right()) - rect.left();

        for segment in segments(log.events(), axis.end()) {
            let x1 = axis.x_of(segment.start_ms);
            let x2 = axis.x_of(segment.end_ms);
            if x2 < visible_left || x1 > visible_right {
                continue;
            }
            let fill = if segment.connected {
                style.link_up
            } else {
                style.link_down
            };
            painter.rect_filled(
                Rect::from_min_max(
                    pos2(rect.left() + x1, bar_top),
                    pos2(rect.left() + x2, bar_bottom),
                ),
                0.0,
                fill,
            );
        }

        let font_id = TextStyle::Small.resolve(ui.style());
        let marker_xs: Vec<f32> = log
            .events()
            .iter()
            .map(|event| axis.x_of(event.timestamp_ms))
            .collect();
        let widest_label = ui.fonts(|fonts| {
            log.events()
                .iter()
                .map(|event| {
                    fonts
                        .layout_no_wrap(event.label().to_owned(), font_id.clone(), style.ink)
                        .size()
                        .x
                })
                .fold(0.0, f32::max)
        });
        let min_spacing = widest_label * 1.1;
        let drawn = thin_labels(&marker_xs, min_spacing);

        for ((event, &x), &draw) in log.events().iter().zip(&marker_xs).zip(&drawn) {
            if x < visible_left - min_spacing || x > visible_right + min_spacing {
                continue;
            }
            let sx = rect.left() + x;
            painter.line_segment(
                [pos2(sx, bar_top), pos2(sx, bar_bottom)],
                Stroke::new(2.0, style.marker),
            );
            if draw {
                painter.text(
                    pos2(sx, bar_top - 6.0),
                    Align2::CENTER_BOTTOM,
                    event.label(),
                    font_id.clone(),
                    style.ink,
                );
            }
        }

        // A pathological domain holds billions of hour marks; walk only
        // from the last mark left of the visible window and stop past
        // its right edge. The offset is figured in i128, the span can
        // exceed i64.
        let lo = axis.time_at(visible_left - 64.0);
        let whole_hours = (lo as i128 - start as i128) / axis::HOUR_MS as i128;
        let first_mark = (start as i128 + whole_hours * axis::HOUR_MS as i128) as i64;
        let tick_len = 8.0;
        for t in axis::hour_marks(first_mark, end) {
            let x = axis.x_of(t);
            if x > visible_right + 64.0 {
                break;
            }
            if x < visible_left - 64.0 {
                continue;
            }
            let sx = rect.left() + x;
            painter.line_segment(
                [pos2(sx, bar_bottom), pos2(sx, bar_bottom + tick_len)],
                Stroke::new(1.0, style.axis),
            );
            let label_y = bar_bottom + tick_len + 2.0;
            let (anchor, align) = if t == start {
                (pos2(sx + 2.0, label_y), Align2::LEFT_TOP)
            } else if t == end {
                (pos2(sx - 2.0, label_y), Align2::RIGHT_TOP)
            } else {
                (pos2(sx, label_y), Align2::CENTER_TOP)
            };
            painter.text(anchor, align, fmt_clock(t), font_id.clone(), style.ink);
        }

        // Scrub overlay. The readout bubble is itself the drag handle;
        // the hit test uses last frame's position, then the line and
        // bubble are painted at the post-drag position.
        let bubble_pad = vec2(16.0, 10.0);
        let bubble_gap = 6.0;
        let body_font = TextStyle::Body.resolve(ui.style());
        let ink_on_bubble = colorhash::text_color_on(style.bubble_fill);

        let readout_at = |cursor_x: f32| {
            let t = axis.time_at(cursor_x);
            format!("{}\n{}", fmt_clock(t), log.label_at(t))
        };
        let bubble_rect_at = |cursor_x: f32, text_size: egui::Vec2| {
            let size = text_size + bubble_pad;
            let half_w = size.x * 0.5;
            // A bubble wider than the band has nowhere to slide.
            let center_x = if size.x >= rect.width() {
                rect.center().x
            } else {
                (rect.left() + cursor_x).clamp(rect.left() + half_w, rect.right() - half_w)
            };
            Rect::from_min_size(
                pos2(center_x - half_w, rect.bottom() - size.y - bubble_gap),
                size,
            )
        };

        let pre_x = controller.cursor().clamp(0.0, band_width);
        let pre_galley = painter.layout(
            readout_at(pre_x),
            body_font.clone(),
            ink_on_bubble,
            f32::INFINITY,
        );
        let hit_rect = bubble_rect_at(pre_x, pre_galley.size());

        let bubble_resp = ui.interact(hit_rect, response.id.with("scrub_bubble"), Sense::drag());
        if bubble_resp.drag_started() {
            if let Some(pos) = bubble_resp.interact_pointer_pos() {
                controller.begin_drag(pos.x - rect.left());
            }
        }
        if bubble_resp.dragged() {
            if let Some(pos) = bubble_resp.interact_pointer_pos() {
                controller.drag_to(pos.x - rect.left(), band_width);
            }
        }
        if bubble_resp.drag_stopped() {
            controller.end_drag();
        }

        let cursor_x = controller.cursor().clamp(0.0, band_width);
        let galley = painter.layout(readout_at(cursor_x), body_font, ink_on_bubble, f32::INFINITY);
        let bubble_rect = bubble_rect_at(cursor_x, galley.size());

        let line_x = rect.left() + cursor_x;
        painter.line_segment(
            [pos2(line_x, rect.top()), pos2(line_x, rect.bottom())],
            Stroke::new(2.0, style.cursor),
        );

        let outline = if bubble_resp.hovered() || bubble_resp.dragged() {
            Stroke::new(2.0, style.cursor)
        } else {
            colorhash::highlight_stroke(style.bubble_fill)
        };
        painter.rect_filled(bubble_rect, 6.0, style.bubble_fill);
        painter.rect_stroke(bubble_rect, 6.0, outline, egui::StrokeKind::Inside);
        painter.galley(bubble_rect.min + bubble_pad * 0.5, galley, ink_on_bubble);

        let _ = bubble_resp.on_hover_cursor(egui::CursorIcon::Grab);

        response
    }
}

impl crate::themes::Styled for Timeline<'_> {
    type Style = TimelineStyle;

    fn styled(mut self, style: Self::Style) -> Self {
        self.timeline_style = Some(style);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_hour_log() -> EventLog {
        EventLog::from_events(vec![
            LinkEvent::up(0, "Home"),
            LinkEvent::down(3_600_000),
            LinkEvent::up(7_200_000, "Cafe"),
        ])
    }

    #[test]
    fn segments_tile_the_domain_without_gaps() {
        let log = three_hour_log();
        let (start, end) = axis::domain(&log).unwrap();
        let spans = segments(log.events(), end);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].start_ms, start);
        for pair in spans.windows(2) {
            assert_eq!(pair[0].end_ms, pair[1].start_ms);
        }
        assert_eq!(spans[2].end_ms, end);
        assert!(spans[0].connected);
        assert!(!spans[1].connected);
        assert!(spans[2].connected);
        assert!(spans.iter().all(|s| s.end_ms - s.start_ms == 3_600_000));
    }

    #[test]
    fn a_single_event_covers_the_whole_domain() {
        let log = EventLog::from_events(vec![LinkEvent::up(1_800_000, "Home")]);
        let (_, end) = axis::domain(&log).unwrap();
        assert_eq!(
            segments(log.events(), end),
            vec![Segment {
                start_ms: 1_800_000,
                end_ms: end,
                connected: true,
            }]
        );
    }

    #[test]
    fn no_events_means_no_segments() {
        assert!(segments(&[], 3_600_000).is_empty());
    }

    #[test]
    fn label_thinning_is_a_left_to_right_greedy_scan() {
        assert_eq!(
            thin_labels(&[0.0, 10.0, 120.0], 100.0),
            vec![true, false, true]
        );
        // the earlier of a too-close pair wins
        assert_eq!(thin_labels(&[0.0, 50.0], 100.0), vec![true, false]);
        assert_eq!(thin_labels(&[], 100.0), Vec::<bool>::new());
    }

    #[test]
    fn thinning_measures_from_the_last_drawn_label() {
        // 90 is skipped, but 110 clears the spacing against 0, not 90.
        assert_eq!(
            thin_labels(&[0.0, 90.0, 110.0], 100.0),
            vec![true, false, true]
        );
    }

    #[test]
    fn out_of_range_stamps_fall_back_to_a_dummy_clock() {
        assert_eq!(fmt_clock(i64::MAX), "--:--");
    }

    // Shape count of a frame holding nothing but the panel itself.
    fn bare_frame_shapes() -> usize {
        egui::Context::default()
            .run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |_ui| {});
            })
            .shapes
            .len()
    }

    #[test]
    fn a_populated_log_paints_more_than_the_backdrop() {
        let log = three_hour_log();
        let mut controller = InteractionController::new(std::time::Instant::now());
        let ctx = egui::Context::default();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.add(
                    Timeline::new(&log, &mut controller)
                        .min_width(320.0)
                        .trailing_pad(160.0),
                );
            });
        });
        let painted = output.shapes.len();
        let bare = bare_frame_shapes();
        // Segments, markers, ticks, and the scrub overlay all land in
        // the shape list; a lone backdrop rect could not account for
        // them.
        assert!(painted > bare + 1, "painted {painted}, bare frame {bare}");
    }

    #[test]
    fn an_empty_log_renders_only_the_backdrop() {
        let log = EventLog::default();
        let mut controller = InteractionController::new(std::time::Instant::now());
        let ctx = egui::Context::default();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                let response = ui.add(Timeline::new(&log, &mut controller).min_width(320.0));
                assert_eq!(response.rect.width(), 320.0);
            });
        });
        assert_eq!(output.shapes.len(), bare_frame_shapes() + 1);
    }

    #[test]
    fn extreme_timestamps_paint_without_stalling() {
        let log = EventLog::from_events(vec![
            LinkEvent::up(i64::MIN + 1, "Home"),
            LinkEvent::down(i64::MAX - 1),
        ]);
        let mut controller = InteractionController::new(std::time::Instant::now());
        let ctx = egui::Context::default();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.add(Timeline::new(&log, &mut controller).min_width(320.0));
            });
        });
        assert!(!output.shapes.is_empty());
    }
}
