use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Label shown when the link was down at the queried instant, and for
/// instants before anything was recorded.
pub const NO_SIGNAL: &str = "no signal";
/// Label shown when an empty log is queried.
pub const UNKNOWN: &str = "unknown";

/// SSID placeholder written for disconnect transitions.
const PLACEHOLDER: &str = "-";

/// One connectivity-state transition.
///
/// A sorted sequence of these is a step function over time: each event's
/// state holds from its own timestamp until the next event's timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkEvent {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    pub connected: bool,
    /// Meaningful only while connected; `"-"` otherwise.
    pub ssid: String,
}

impl LinkEvent {
    pub fn up(timestamp_ms: i64, ssid: impl Into<String>) -> Self {
        Self {
            timestamp_ms,
            connected: true,
            ssid: ssid.into(),
        }
    }

    pub fn down(timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            connected: false,
            ssid: PLACEHOLDER.to_owned(),
        }
    }

    /// SSID while connected, the "no signal" sentinel otherwise.
    pub fn label(&self) -> &str {
        if self.connected {
            &self.ssid
        } else {
            NO_SIGNAL
        }
    }

    /// The third CSV field exactly as stored; disconnect lines carry the
    /// `-` placeholder.
    pub fn ssid_field(&self) -> &str {
        &self.ssid
    }

    fn to_line(&self) -> String {
        let ssid = if self.connected {
            self.ssid.as_str()
        } else {
            PLACEHOLDER
        };
        format!(
            "{},{},{}",
            self.timestamp_ms,
            if self.connected { 1 } else { 0 },
            ssid
        )
    }
}

/// Parse one log line: `<epoch_millis>,<1|0>,<ssid>`.
///
/// Splits on the first two commas only, so an SSID containing commas
/// survives verbatim. Returns `None` for short lines and unparsable
/// numeric fields; callers skip those rather than failing the load.
pub fn parse_line(line: &str) -> Option<LinkEvent> {
    let mut fields = line.splitn(3, ',');
    let timestamp_ms = fields.next()?.parse::<i64>().ok()?;
    let flag = fields.next()?.parse::<f64>().ok()?;
    let ssid = fields.next()?.to_owned();
    Some(LinkEvent {
        timestamp_ms,
        connected: flag == 1.0,
        ssid,
    })
}

/// The event log, sorted ascending by timestamp.
///
/// Duplicate timestamps are allowed; the sort is stable, so the event
/// written last wins for queries at that exact instant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventLog {
    events: Vec<LinkEvent>,
}

impl EventLog {
    pub fn from_events(mut events: Vec<LinkEvent>) -> Self {
        events.sort_by_key(|event| event.timestamp_ms);
        Self { events }
    }

    /// Read and parse the persisted log. Malformed lines are skipped;
    /// only the I/O failure itself is reported, for the one surface
    /// (the raw-log inspector) that shows it.
    pub fn load(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut events = Vec::new();
        let mut skipped = 0usize;
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            match parse_line(line) {
                Some(event) => events.push(event),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            log::debug!("skipped {skipped} malformed line(s) in {}", path.display());
        }
        Ok(Self::from_events(events))
    }

    /// Best-effort load for surfaces that must always render something:
    /// an unreadable or missing log collapses to an empty one.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(log) => log,
            Err(err) => {
                log::warn!("could not read event log {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn events(&self) -> &[LinkEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn first(&self) -> Option<&LinkEvent> {
        self.events.first()
    }

    pub fn last(&self) -> Option<&LinkEvent> {
        self.events.last()
    }

    /// The last event with `timestamp_ms <= t`: inclusive of equality,
    /// tie-broken by the latest qualifying event. `None` when the log is
    /// empty or `t` precedes the first event.
    pub fn state_at(&self, t: i64) -> Option<&LinkEvent> {
        let idx = self.events.partition_point(|event| event.timestamp_ms <= t);
        idx.checked_sub(1).and_then(|idx| self.events.get(idx))
    }

    /// Display label for the state at `t`: the SSID while connected,
    /// "no signal" while down and for any `t` before the first event.
    /// Only an empty log answers "unknown".
    pub fn label_at(&self, t: i64) -> &str {
        match self.state_at(t) {
            Some(event) => event.label(),
            None if self.events.is_empty() => UNKNOWN,
            None => NO_SIGNAL,
        }
    }
}

/// Append one event to the persisted log, creating the file (and its
/// parent directory) on first use.
pub fn append_event(path: &Path, event: &LinkEvent) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", event.to_line())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line_splits_on_first_two_commas_only() {
        let event = parse_line("1000,1,Cafe, upstairs").unwrap();
        assert_eq!(event.timestamp_ms, 1000);
        assert!(event.connected);
        assert_eq!(event.ssid, "Cafe, upstairs");
    }

    #[test]
    fn parse_line_accepts_float_flags() {
        assert!(parse_line("0,1.0,Home").unwrap().connected);
        assert!(!parse_line("0,0,-").unwrap().connected);
        assert!(!parse_line("0,2,-").unwrap().connected);
    }

    #[test]
    fn parse_line_rejects_malformed_input() {
        assert_eq!(parse_line("abc,1,Home"), None);
        assert_eq!(parse_line("1000,x,Home"), None);
        assert_eq!(parse_line("1000,1"), None);
        assert_eq!(parse_line(""), None);
    }

    #[test]
    fn load_skips_bad_lines_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        std::fs::write(&path, "7200000,1,Cafe\nabc,1,Home\n0,1,Home\n").unwrap();

        let log = EventLog::load(&path).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[0].ssid, "Home");
        assert_eq!(log.events()[1].ssid, "Cafe");
    }

    #[test]
    fn load_missing_file_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        assert!(EventLog::load(&path).is_err());
        assert!(EventLog::load_or_empty(&path).is_empty());
    }

    #[test]
    fn append_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events.csv");

        let written = vec![
            LinkEvent::up(0, "Home"),
            LinkEvent::down(3_600_000),
            LinkEvent::up(7_200_000, "Cafe, upstairs"),
        ];
        for event in &written {
            append_event(&path, event).unwrap();
        }

        let log = EventLog::load(&path).unwrap();
        assert_eq!(log.events(), written.as_slice());
    }

    #[test]
    fn state_at_is_inclusive_of_equality() {
        let log = EventLog::from_events(vec![
            LinkEvent::up(0, "Home"),
            LinkEvent::down(3_600_000),
            LinkEvent::up(7_200_000, "Cafe"),
        ]);
        for event in log.events() {
            assert_eq!(log.state_at(event.timestamp_ms), Some(event));
        }
    }

    #[test]
    fn state_at_ties_break_to_the_latest_event() {
        let log = EventLog::from_events(vec![
            LinkEvent::up(1000, "First"),
            LinkEvent::up(1000, "Second"),
        ]);
        assert_eq!(log.state_at(1000).unwrap().ssid, "Second");
    }

    #[test]
    fn label_at_maps_states_to_sentinels() {
        let log = EventLog::from_events(vec![
            LinkEvent::up(0, "Home"),
            LinkEvent::down(3_600_000),
            LinkEvent::up(7_200_000, "Cafe"),
        ]);
        assert_eq!(log.label_at(-1), NO_SIGNAL);
        assert_eq!(log.label_at(5_000_000), NO_SIGNAL);
        assert_eq!(log.label_at(7_200_000), "Cafe");
        assert_eq!(EventLog::default().label_at(0), UNKNOWN);
    }

    #[test]
    fn queries_before_the_first_event_read_no_signal() {
        let log = EventLog::from_events(vec![
            LinkEvent::up(1_800_000, "Home"),
            LinkEvent::down(5_400_000),
        ]);
        // The hour-aligned band starts at 0:00; scrubbing left of the
        // first event reads as down, not as an unknown state.
        assert_eq!(log.label_at(0), NO_SIGNAL);
        assert_eq!(log.label_at(1_799_999), NO_SIGNAL);
        assert_eq!(log.label_at(1_800_000), "Home");
    }
}
