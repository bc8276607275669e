use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use thiserror::Error;

use crate::events::{self, EventLog, LinkEvent};

/// Cadence of the RSSI ring buffer.
pub const SIGNAL_SAMPLE_PERIOD: Duration = Duration::from_secs(10);
/// Eight hours of samples at the 10 s cadence.
pub const SIGNAL_CAPACITY: usize = 8 * 60 * 60 / 10;

pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// One instantaneous probe reading.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkStatus {
    pub connected: bool,
    pub ssid: Option<String>,
    pub rssi_dbm: Option<i32>,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} exited with {status}")]
    Failed {
        command: &'static str,
        status: std::process::ExitStatus,
    },
}

/// Source of connectivity readings. Implementations are constructed in
/// `main` and handed to the recorder explicitly; nothing in the crate
/// reaches for a shared global sampler.
pub trait LinkProbe: Send {
    fn sample(&mut self) -> Result<LinkStatus, ProbeError>;
}

/// NetworkManager-backed probe. "Connected" means NetworkManager reports
/// `full` connectivity: validated reachability, not mere association.
pub struct NmcliProbe;

impl LinkProbe for NmcliProbe {
    fn sample(&mut self) -> Result<LinkStatus, ProbeError> {
        let wifi = run_nmcli(&["-t", "-f", "ACTIVE,SSID,SIGNAL", "dev", "wifi"])?;
        let connectivity = run_nmcli(&["networking", "connectivity"])?;
        let validated = parse_connectivity(&connectivity);
        Ok(match parse_wifi_list(&wifi) {
            Some((ssid, signal)) if validated => LinkStatus {
                connected: true,
                ssid: Some(ssid),
                rssi_dbm: signal.map(percent_to_dbm),
            },
            // Associated but unvalidated (captive portal, no upstream):
            // down for the log, but the SSID and signal stay visible.
            Some((ssid, signal)) => LinkStatus {
                connected: false,
                ssid: Some(ssid),
                rssi_dbm: signal.map(percent_to_dbm),
            },
            None => LinkStatus::default(),
        })
    }
}

fn run_nmcli(args: &[&str]) -> Result<String, ProbeError> {
    let output = Command::new("nmcli")
        .env("LC_ALL", "C")
        .args(args)
        .output()
        .map_err(|source| ProbeError::Spawn {
            command: "nmcli",
            source,
        })?;
    if !output.status.success() {
        return Err(ProbeError::Failed {
            command: "nmcli",
            status: output.status,
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Pick the active row out of `nmcli -t -f ACTIVE,SSID,SIGNAL dev wifi`
/// output. Terse format escapes `:` inside fields, so the SSID is taken
/// between the fixed `yes:` prefix and the last (unescaped) colon.
fn parse_wifi_list(text: &str) -> Option<(String, Option<u8>)> {
    for line in text.lines() {
        let Some(rest) = line.strip_prefix("yes:") else {
            continue;
        };
        let (ssid_raw, signal) = match rest.rsplit_once(':') {
            Some((ssid, signal)) => (ssid, signal.trim().parse::<u8>().ok()),
            None => (rest, None),
        };
        return Some((unescape_terse(ssid_raw), signal));
    }
    None
}

/// Undo nmcli's terse-mode `\:`/`\\` escaping and strip the surrounding
/// quotes some drivers put around SSIDs.
fn unescape_terse(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out.trim_matches('"').to_owned()
}

fn parse_connectivity(text: &str) -> bool {
    text.trim() == "full"
}

/// nmcli reports signal as a percentage; the usual linear approximation
/// maps it back to dBm.
fn percent_to_dbm(percent: u8) -> i32 {
    i32::from(percent) / 2 - 100
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignalSample {
    pub timestamp_ms: i64,
    /// 0 marks a disconnected sample.
    pub dbm: i32,
}

/// Bounded ring of RSSI samples; oldest evicted first.
#[derive(Clone, Debug, Default)]
pub struct SignalHistory {
    samples: VecDeque<SignalSample>,
}

impl SignalHistory {
    pub fn push(&mut self, sample: SignalSample) {
        if self.samples.len() == SIGNAL_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn snapshot(&self) -> Vec<SignalSample> {
        self.samples.iter().copied().collect()
    }

    pub fn latest(&self) -> Option<SignalSample> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Everything the UI reads from the monitor, behind one lock: the latest
/// status, when the current state began, and the signal ring.
#[derive(Debug, Default)]
pub struct MonitorState {
    pub status: LinkStatus,
    pub since_ms: Option<i64>,
    pub signals: SignalHistory,
}

pub type SharedMonitor = Arc<RwLock<MonitorState>>;

/// Background recorder: polls a probe, keeps `SharedMonitor` fresh, and
/// appends a log line only when the connected flag actually changes.
/// The dedup state is seeded from the log tail so restarts do not write
/// duplicate transitions.
pub struct Recorder {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Recorder {
    pub fn start(
        probe: Box<dyn LinkProbe>,
        log_path: PathBuf,
        shared: SharedMonitor,
        poll: Duration,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let handle = thread::spawn(move || record_loop(probe, &log_path, &shared, poll, &stop_flag));
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Idempotent; joins the worker.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop.store(true, Ordering::Release);
            let _ = handle.join();
        }
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.stop();
    }
}

fn record_loop(
    mut probe: Box<dyn LinkProbe>,
    log_path: &Path,
    shared: &SharedMonitor,
    poll: Duration,
    stop: &AtomicBool,
) {
    let mut last_connected = {
        let tail = EventLog::load_or_empty(log_path);
        let mut state = shared.write();
        state.since_ms = tail.last().map(|event| event.timestamp_ms);
        tail.last().map(|event| event.connected)
    };
    // None until the first ring sample, which fires immediately.
    let mut last_signal_at: Option<Instant> = None;
    let mut failing = false;

    while !stop.load(Ordering::Acquire) {
        match probe.sample() {
            Ok(status) => {
                failing = false;
                let now = now_ms();

                let transition = last_connected != Some(status.connected);
                if transition {
                    let event = if status.connected {
                        let ssid = status
                            .ssid
                            .clone()
                            .unwrap_or_else(|| events::UNKNOWN.to_owned());
                        LinkEvent::up(now, ssid)
                    } else {
                        LinkEvent::down(now)
                    };
                    match events::append_event(log_path, &event) {
                        Ok(()) => {
                            log::info!(
                                "link {} ({})",
                                if status.connected { "up" } else { "down" },
                                event.label()
                            );
                            last_connected = Some(status.connected);
                        }
                        Err(err) => {
                            log::warn!("could not append to {}: {err}", log_path.display());
                        }
                    }
                }

                let mut state = shared.write();
                if transition && last_connected == Some(status.connected) {
                    state.since_ms = Some(now);
                }
                state.status = status.clone();
                if last_signal_at.is_none_or(|at| at.elapsed() >= SIGNAL_SAMPLE_PERIOD) {
                    last_signal_at = Some(Instant::now());
                    let dbm = if status.connected {
                        status.rssi_dbm.unwrap_or(0)
                    } else {
                        0
                    };
                    state.signals.push(SignalSample {
                        timestamp_ms: now,
                        dbm,
                    });
                }
            }
            Err(err) => {
                // Warn once per failure streak, then stay quiet.
                if !failing {
                    log::warn!("link probe failed: {err}");
                    failing = true;
                }
            }
        }

        let mut remaining = poll;
        while !stop.load(Ordering::Acquire) && remaining > Duration::ZERO {
            let slice = remaining.min(Duration::from_millis(50));
            thread::sleep(slice);
            remaining = remaining.saturating_sub(slice);
        }
    }
}
