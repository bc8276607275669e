use chrono::{Local, TimeZone};
use eframe::egui::{Color32, Response, RichText, TextStyle, Ui};
use egui_extras::{Column, TableBuilder};

use crate::events::EventLog;

/// Wall-clock stamp for table rows and the CLI dump. The fallback keeps
/// the 19-column width so rows stay aligned.
pub fn fmt_stamp(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|stamp| stamp.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "????-??-?? ??:??:??".to_owned())
}

pub fn flag_text(connected: bool) -> &'static str {
    if connected {
        "ON"
    } else {
        "OFF"
    }
}

/// One fixed-width inspector line, as printed by `linkline dump`.
pub fn format_row(stamp: &str, connected: bool, ssid: &str) -> String {
    format!("{:<19} | {:<9} | {}", stamp, flag_text(connected), ssid)
}

pub fn header_row() -> String {
    format!("{:<19} | {:<9} | {}", "Time", "Connected", "SSID")
}

/// Read-only view of the raw event log. Rows come straight from the
/// parsed log; a failed read is shown inline instead of the table.
#[must_use = "Use `LogInspector::show(ui)` to render this widget."]
pub struct LogInspector<'a> {
    log: &'a EventLog,
    error: Option<&'a str>,
}

impl<'a> LogInspector<'a> {
    pub fn new(log: &'a EventLog, error: Option<&'a str>) -> Self {
        Self { log, error }
    }

    pub fn show(self, ui: &mut Ui) {
        if let Some(err) = self.error {
            status_label(
                ui,
                &format!("Error reading CSV: {err}"),
                ui.visuals().error_fg_color,
            );
            return;
        }
        if self.log.is_empty() {
            status_label(ui, "no events recorded yet", ui.visuals().weak_text_color());
            return;
        }

        let row_height = ui.text_style_height(&TextStyle::Monospace) + 4.0;
        TableBuilder::new(ui)
            .striped(true)
            .resizable(false)
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::remainder())
            .header(row_height, |mut header| {
                header.col(|ui| {
                    ui.monospace("Time");
                });
                header.col(|ui| {
                    ui.monospace("Connected");
                });
                header.col(|ui| {
                    ui.monospace("SSID");
                });
            })
            .body(|body| {
                body.rows(row_height, self.log.len(), |mut row| {
                    let event = &self.log.events()[row.index()];
                    row.col(|ui| {
                        ui.monospace(fmt_stamp(event.timestamp_ms));
                    });
                    row.col(|ui| {
                        ui.monospace(flag_text(event.connected));
                    });
                    row.col(|ui| {
                        ui.monospace(event.ssid_field());
                    });
                });
            });
    }
}

fn status_label(ui: &mut Ui, message: &str, color: Color32) -> Response {
    ui.label(RichText::new(message).italics().color(color).small())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LinkEvent;
    use eframe::egui;

    #[test]
    fn rows_are_fixed_width() {
        assert_eq!(
            format_row("2026-08-23 10:00:00", true, "HomeNet"),
            "2026-08-23 10:00:00 | ON        | HomeNet"
        );
        assert_eq!(
            format_row("2026-08-23 10:05:00", false, "-"),
            "2026-08-23 10:05:00 | OFF       | -"
        );
    }

    #[test]
    fn header_lines_up_with_the_rows() {
        let header = header_row();
        let row = format_row("2026-08-23 10:00:00", true, "HomeNet");
        assert_eq!(header.find('|'), row.find('|'));
        assert_eq!(header.rfind('|'), row.rfind('|'));
    }

    #[test]
    fn stamps_are_always_nineteen_columns() {
        assert_eq!(fmt_stamp(0).len(), 19);
        assert_eq!(fmt_stamp(i64::MAX), "????-??-?? ??:??:??");
    }

    #[test]
    fn a_read_error_is_shown_inline() {
        let log = EventLog::default();
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                LogInspector::new(&log, Some("permission denied")).show(ui);
            });
        });
    }

    #[test]
    fn renders_a_table_headless() {
        let log = EventLog::from_events(vec![
            LinkEvent::up(0, "Home"),
            LinkEvent::down(3_600_000),
        ]);
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                LogInspector::new(&log, None).show(ui);
            });
        });
    }
}
