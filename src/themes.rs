use egui::style::{Selection, WidgetVisuals, Widgets};
use egui::{Color32, Stroke, Style, Visuals};

mod style;
pub use style::Styled;
pub mod colorhash;

/// The fixed timeline palette. The band keeps these colors in both the
/// light and dark app themes so screenshots stay comparable.
pub fn link_up() -> Color32 {
    Color32::from_hex("#00C853").unwrap()
}

pub fn link_down() -> Color32 {
    Color32::from_hex("#D32F2F").unwrap()
}

pub fn band_backdrop() -> Color32 {
    Color32::from_hex("#222222").unwrap()
}

pub fn axis_gray() -> Color32 {
    Color32::from_hex("#888888").unwrap()
}

/// Semantic style for the `Timeline` widget.
#[derive(Clone, Debug)]
pub struct TimelineStyle {
    pub backdrop: Color32,
    pub link_up: Color32,
    pub link_down: Color32,
    pub axis: Color32,
    pub marker: Color32,
    pub ink: Color32,
    pub cursor: Color32,
    pub bubble_fill: Color32,
    /// Fraction of the band height the segment bars occupy, centered
    /// vertically.
    pub bar_fraction: f32,
}

impl From<&Style> for TimelineStyle {
    fn from(style: &Style) -> Self {
        let backdrop = band_backdrop();
        Self {
            backdrop,
            link_up: link_up(),
            link_down: link_down(),
            axis: axis_gray(),
            marker: blend(axis_gray(), Color32::WHITE, 0.35),
            // The band is always dark, so label ink stays white in both
            // app themes.
            ink: Color32::WHITE,
            cursor: style.visuals.selection.stroke.color,
            bubble_fill: blend(backdrop, Color32::WHITE, 0.12),
            bar_fraction: 1.0 / 3.0,
        }
    }
}

/// Semantic style for the connection badge strip.
#[derive(Clone, Debug)]
pub struct BadgeStyle {
    pub dot_up: Color32,
    pub dot_down: Color32,
    pub spark_bar: Color32,
    pub spark_gap: Color32,
    pub outline: Color32,
}

impl From<&Style> for BadgeStyle {
    fn from(style: &Style) -> Self {
        let panel = style.visuals.panel_fill;
        Self {
            dot_up: link_up(),
            dot_down: link_down(),
            spark_bar: blend(link_up(), panel, 0.25),
            spark_gap: blend(link_down(), panel, 0.55),
            outline: style.visuals.widgets.noninteractive.bg_stroke.color,
        }
    }
}

// Color utilities: simple sRGB linear interpolation for quick palette derivation
pub fn blend(a: Color32, b: Color32, t: f32) -> Color32 {
    let r = (a.r() as f32 * (1.0 - t) + b.r() as f32 * t).round() as u8;
    let g = (a.g() as f32 * (1.0 - t) + b.g() as f32 * t).round() as u8;
    let bch = (a.b() as f32 * (1.0 - t) + b.b() as f32 * t).round() as u8;
    Color32::from_rgb(r, g, bch)
}

/// Build visuals around the overlay palette for a flat, console feel.
pub fn console(
    foreground: Color32,
    background: Color32,
    accent: Color32,
    mut base_visuals: Visuals,
) -> Visuals {
    let border = blend(foreground, background, 0.4);
    let weak_text = blend(foreground, background, 0.55);

    let control_fill = background;
    let control_fill_hover = blend(background, foreground, 0.06);
    let control_fill_active = blend(control_fill_hover, accent, 0.15);
    let selection_fill = blend(background, accent, 0.2);

    base_visuals.window_fill = background;
    base_visuals.panel_fill = background;
    base_visuals.override_text_color = None;
    base_visuals.weak_text_color = Some(weak_text);
    base_visuals.faint_bg_color = blend(background, foreground, 0.04);
    base_visuals.extreme_bg_color = control_fill_hover;
    base_visuals.selection = Selection {
        bg_fill: selection_fill,
        stroke: Stroke::new(1.5, accent),
    };
    base_visuals.window_stroke = Stroke::new(1.0, border);

    let border_stroke = Stroke::new(1.0, border);
    let hover_stroke = Stroke::new(1.4, border);
    let active_stroke = Stroke::new(1.4, accent);

    base_visuals.widgets = Widgets {
        noninteractive: WidgetVisuals {
            bg_fill: background,
            weak_bg_fill: background,
            bg_stroke: border_stroke,
            fg_stroke: Stroke::new(1.0, foreground),
            corner_radius: 0.0.into(),
            expansion: 0.0,
        },
        inactive: WidgetVisuals {
            bg_fill: control_fill,
            weak_bg_fill: control_fill,
            bg_stroke: border_stroke,
            fg_stroke: Stroke::new(1.0, foreground),
            corner_radius: 2.0.into(),
            expansion: 0.0,
        },
        hovered: WidgetVisuals {
            bg_fill: control_fill_hover,
            weak_bg_fill: control_fill_hover,
            bg_stroke: hover_stroke,
            fg_stroke: Stroke::new(1.0, foreground),
            corner_radius: 2.0.into(),
            expansion: 0.0,
        },
        active: WidgetVisuals {
            bg_fill: control_fill_active,
            weak_bg_fill: control_fill_active,
            bg_stroke: active_stroke,
            fg_stroke: Stroke::new(1.0, foreground),
            corner_radius: 2.0.into(),
            expansion: 0.0,
        },
        open: WidgetVisuals {
            bg_fill: control_fill_hover,
            weak_bg_fill: control_fill_hover,
            bg_stroke: active_stroke,
            fg_stroke: Stroke::new(1.0, foreground),
            corner_radius: 2.0.into(),
            expansion: 0.0,
        },
    };

    base_visuals.window_shadow = egui::epaint::Shadow::NONE;

    base_visuals
}

pub fn console_light() -> Style {
    let mut style = Style::default();

    let foreground = Color32::from_hex("#1b1b1b").unwrap();
    let background = Color32::from_hex("#ececec").unwrap();

    style.visuals = console(foreground, background, link_up(), Visuals::light());
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 6.0);
    style.animation_time = 0.12;
    style
}

pub fn console_dark() -> Style {
    let mut style = Style::default();

    let foreground = Color32::from_hex("#e6e6e6").unwrap();
    let background = Color32::from_hex("#2b2b2b").unwrap();

    style.visuals = console(foreground, background, link_up(), Visuals::dark());
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 6.0);
    style.animation_time = 0.12;
    style
}
