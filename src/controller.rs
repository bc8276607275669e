use std::time::{Duration, Instant};

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 3.0;
/// Multiplicative step applied by the zoom buttons.
pub const ZOOM_STEP: f32 = 1.25;
/// How often the log is re-read while the viewer is visible.
pub const RELOAD_PERIOD: Duration = Duration::from_secs(30);

/// Deferred scroll, applied by the app on the next laid-out frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollRequest {
    /// Jump so the newest data sits at the right edge.
    End,
    /// Put the viewport's left edge at this content offset.
    Offset(f32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Gesture {
    Idle,
    Dragging { anchor_x: f32, anchor_cursor: f32 },
}

/// Single owner of every positional value the timeline view has: zoom
/// scale, scroll offset, and the cursor the scrub line + info bubble
/// project from. The cursor lives in content coordinates (unscrolled
/// pixels from the left edge of the timeline), so the overlays can
/// never drift apart; they all derive from the one value.
pub struct InteractionController {
    scale: f32,
    cursor: f32,
    scroll: f32,
    gesture: Gesture,
    pending_scroll: Option<ScrollRequest>,
    /// Armed when a scroll request is consumed; the next observed offset
    /// recenters even if it did not move.
    resync: bool,
    last_reload: Instant,
}

impl InteractionController {
    pub fn new(now: Instant) -> Self {
        Self {
            scale: 1.0,
            cursor: 0.0,
            scroll: 0.0,
            gesture: Gesture::Idle,
            // First layout lands on the newest data.
            pending_scroll: Some(ScrollRequest::End),
            resync: false,
            last_reload: now,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Cursor position in content coordinates.
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    pub fn begin_drag(&mut self, pointer_x: f32) {
        self.gesture = Gesture::Dragging {
            anchor_x: pointer_x,
            anchor_cursor: self.cursor,
        };
    }

    /// Move the cursor by the pointer delta since the drag anchor,
    /// clamped to `[0, content_width]`. Ignored when no drag is active.
    pub fn drag_to(&mut self, pointer_x: f32, content_width: f32) {
        if let Gesture::Dragging {
            anchor_x,
            anchor_cursor,
        } = self.gesture
        {
            let target = anchor_cursor + (pointer_x - anchor_x);
            self.cursor = target.clamp(0.0, content_width.max(0.0));
        }
    }

    /// A drag-end without a matching begin is a no-op, never an error.
    pub fn end_drag(&mut self) {
        self.gesture = Gesture::Idle;
    }

    pub fn zoom_in(&mut self, viewport_width: f32) {
        self.rescale(ZOOM_STEP, viewport_width);
    }

    pub fn zoom_out(&mut self, viewport_width: f32) {
        self.rescale(1.0 / ZOOM_STEP, viewport_width);
    }

    /// Multiply the scale by `factor`, clamped to `[MIN_SCALE, MAX_SCALE]`.
    /// Content positions scale linearly with the factor, so the cursor is
    /// rescaled in place and a deferred scroll keeps the time under the
    /// viewport center where it was.
    pub fn rescale(&mut self, factor: f32, viewport_width: f32) {
        let next = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        if next == self.scale {
            return;
        }
        let ratio = next / self.scale;
        self.scale = next;
        self.cursor *= ratio;
        if viewport_width > 0.0 {
            let center = self.scroll + viewport_width * 0.5;
            self.pending_scroll = Some(ScrollRequest::Offset(
                center * ratio - viewport_width * 0.5,
            ));
        }
    }

    /// Feed the scroll offset observed this frame. A change recenters the
    /// cursor at the viewport midpoint (keeping the readout synced to
    /// whatever is centered on screen) unless a drag owns the cursor.
    /// A consumed scroll request forces one pass through even when the
    /// applied offset lands where it already was; content narrower than
    /// the viewport clamps every requested jump back to zero.
    pub fn sync_scroll(&mut self, offset: f32, viewport_width: f32, content_width: f32) {
        let forced = self.resync;
        self.resync = false;
        if !forced && (offset - self.scroll).abs() < 0.5 {
            return;
        }
        self.scroll = offset;
        if !self.is_dragging() {
            let center = offset + viewport_width * 0.5;
            self.cursor = center.clamp(0.0, content_width.max(0.0));
        }
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        let request = self.pending_scroll.take();
        if request.is_some() {
            self.resync = true;
        }
        request
    }

    /// Cooperative reload clock; returns true at most once per period.
    pub fn should_reload(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_reload) >= RELOAD_PERIOD {
            self.last_reload = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> InteractionController {
        InteractionController::new(Instant::now())
    }

    #[test]
    fn drag_moves_cursor_by_pointer_delta() {
        let mut ctl = controller();
        ctl.begin_drag(100.0);
        ctl.drag_to(130.0, 400.0);
        assert_eq!(ctl.cursor(), 30.0);
        ctl.drag_to(90.0, 400.0);
        assert_eq!(ctl.cursor(), 0.0);
    }

    #[test]
    fn drag_clamps_to_content_bounds() {
        let mut ctl = controller();
        ctl.begin_drag(0.0);
        ctl.drag_to(1_000.0, 400.0);
        assert_eq!(ctl.cursor(), 400.0);
        ctl.drag_to(-1_000.0, 400.0);
        assert_eq!(ctl.cursor(), 0.0);
    }

    #[test]
    fn drag_without_begin_is_ignored() {
        let mut ctl = controller();
        ctl.drag_to(250.0, 400.0);
        assert_eq!(ctl.cursor(), 0.0);
        ctl.end_drag();
        assert!(!ctl.is_dragging());
    }

    #[test]
    fn repeated_zoom_in_never_exceeds_max_scale() {
        let mut ctl = controller();
        for _ in 0..20 {
            ctl.zoom_in(200.0);
        }
        assert_eq!(ctl.scale(), MAX_SCALE);
    }

    #[test]
    fn repeated_zoom_out_never_drops_below_min_scale() {
        let mut ctl = controller();
        for _ in 0..20 {
            ctl.zoom_out(200.0);
        }
        assert_eq!(ctl.scale(), MIN_SCALE);
    }

    #[test]
    fn rescale_preserves_the_viewport_center() {
        let mut ctl = controller();
        ctl.take_scroll_request();
        ctl.sync_scroll(100.0, 200.0, 400.0);
        ctl.rescale(2.0, 200.0);
        // Old center at 200 content px; doubled content puts it at 400.
        assert_eq!(
            ctl.take_scroll_request(),
            Some(ScrollRequest::Offset(300.0))
        );
    }

    #[test]
    fn rescale_at_the_clamp_is_a_noop() {
        let mut ctl = controller();
        for _ in 0..10 {
            ctl.zoom_in(200.0);
        }
        ctl.take_scroll_request();
        ctl.zoom_in(200.0);
        assert_eq!(ctl.take_scroll_request(), None);
    }

    #[test]
    fn rescale_moves_the_cursor_with_the_content() {
        let mut ctl = controller();
        ctl.begin_drag(0.0);
        ctl.drag_to(120.0, 400.0);
        ctl.end_drag();
        ctl.rescale(2.0, 200.0);
        assert_eq!(ctl.cursor(), 240.0);
    }

    #[test]
    fn scroll_changes_recenter_the_cursor() {
        let mut ctl = controller();
        ctl.sync_scroll(300.0, 200.0, 1_000.0);
        assert_eq!(ctl.cursor(), 400.0);
    }

    #[test]
    fn scroll_recentering_clamps_to_content() {
        let mut ctl = controller();
        ctl.sync_scroll(900.0, 400.0, 1_000.0);
        assert_eq!(ctl.cursor(), 1_000.0);
    }

    #[test]
    fn scroll_does_not_steal_the_cursor_from_a_drag() {
        let mut ctl = controller();
        ctl.begin_drag(0.0);
        ctl.drag_to(50.0, 400.0);
        ctl.sync_scroll(300.0, 200.0, 1_000.0);
        assert_eq!(ctl.cursor(), 50.0);
    }

    #[test]
    fn first_layout_requests_a_scroll_to_the_end() {
        let mut ctl = controller();
        assert_eq!(ctl.take_scroll_request(), Some(ScrollRequest::End));
        assert_eq!(ctl.take_scroll_request(), None);
    }

    #[test]
    fn consumed_request_recenters_even_when_the_offset_is_unmoved() {
        let mut ctl = controller();
        assert_eq!(ctl.take_scroll_request(), Some(ScrollRequest::End));
        // A band narrower than the viewport clamps the requested jump
        // back to the offset already in place; the overlays must still
        // land at the viewport midpoint.
        ctl.sync_scroll(0.0, 900.0, 400.0);
        assert_eq!(ctl.cursor(), 400.0);

        // One-shot: with no request pending, an unmoved offset leaves a
        // scrubbed cursor where the user put it.
        ctl.begin_drag(400.0);
        ctl.drag_to(150.0, 400.0);
        ctl.end_drag();
        ctl.sync_scroll(0.0, 900.0, 400.0);
        assert_eq!(ctl.cursor(), 150.0);
    }

    #[test]
    fn reload_clock_fires_once_per_period() {
        let start = Instant::now();
        let mut ctl = InteractionController::new(start);
        assert!(!ctl.should_reload(start + Duration::from_secs(29)));
        assert!(ctl.should_reload(start + Duration::from_secs(30)));
        assert!(!ctl.should_reload(start + Duration::from_secs(31)));
        assert!(ctl.should_reload(start + Duration::from_secs(61)));
    }
}
