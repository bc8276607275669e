/// Traits for widget-level styles derived from the app theme.

/// Per-widget style override API. Widgets without an override derive
/// their style from the ambient `egui::Style` at render time.
pub trait Styled {
    type Style: Clone;
    fn styled(self, style: Self::Style) -> Self;
}
