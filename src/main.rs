use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use linkline::app::LinklineApp;
use linkline::axis::HOUR_MS;
use linkline::events::{self, EventLog, LinkEvent};
use linkline::monitor::{self, LinkProbe, NmcliProbe, Recorder, SharedMonitor};
use linkline::widgets::inspector;

#[derive(Parser)]
#[command(
    name = "linkline",
    version,
    about = "Wi-Fi link timeline: records connectivity transitions and renders a zoomable, scrubbable history."
)]
struct Cli {
    /// Event log to read and append to.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Connectivity probe feeding the recorder.
    #[arg(long, value_enum, default_value_t = ProbeKind::Nmcli)]
    probe: ProbeKind,

    /// Seconds between probe samples.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..))]
    poll_secs: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProbeKind {
    /// NetworkManager via `nmcli`.
    Nmcli,
    /// No live monitoring; view existing data only.
    None,
}

#[derive(Subcommand)]
enum Command {
    /// Open the timeline window (the default).
    View,
    /// Print the formatted log to stdout and exit.
    Dump,
    /// Write a synthetic history for trying out the viewer.
    Seed {
        /// Hours of history to generate.
        #[arg(long, default_value_t = 24)]
        hours: u32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(default_log_path);

    match cli.command.unwrap_or(Command::View) {
        Command::Dump => dump(&log_path)?,
        Command::Seed { hours } => seed(&log_path, hours)?,
        Command::View => {
            log::info!("event log at {}", log_path.display());
            let shared = SharedMonitor::default();
            let _recorder = probe_for(cli.probe).map(|probe| {
                Recorder::start(
                    probe,
                    log_path.clone(),
                    shared.clone(),
                    Duration::from_secs(cli.poll_secs),
                )
            });
            LinklineApp::new(log_path, shared).run("linkline")?;
        }
    }
    Ok(())
}

fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("linkline")
        .join("events.csv")
}

fn probe_for(kind: ProbeKind) -> Option<Box<dyn LinkProbe>> {
    match kind {
        ProbeKind::Nmcli => Some(Box::new(NmcliProbe)),
        ProbeKind::None => None,
    }
}

fn dump(path: &Path) -> std::io::Result<()> {
    let log = EventLog::load(path)?;
    println!("{}", inspector::header_row());
    for event in log.events() {
        println!(
            "{}",
            inspector::format_row(
                &inspector::fmt_stamp(event.timestamp_ms),
                event.connected,
                event.ssid_field(),
            )
        );
    }
    Ok(())
}

/// Write a plausible alternating up/down history ending roughly now.
/// Deterministic apart from the end time, so repeated demos look alike.
fn seed(path: &Path, hours: u32) -> std::io::Result<()> {
    if path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("refusing to seed over {}", path.display()),
        ));
    }

    let now = monitor::now_ms();
    let start = now - i64::from(hours.max(1)) * HOUR_MS;
    let ssids = ["HomeNet", "Cafe Upstairs", "Library"];

    let mut state: u64 = 0x5DEECE66D;
    let mut next = move |limit: i64| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) as i64) % limit
    };

    let mut t = start;
    let mut up = true;
    let mut network = 0usize;
    let mut written = 0usize;
    while t < now {
        let event = if up {
            let event = LinkEvent::up(t, ssids[network % ssids.len()]);
            network += 1;
            event
        } else {
            LinkEvent::down(t)
        };
        events::append_event(path, &event)?;
        written += 1;

        // Connected stretches run much longer than outages.
        t += if up {
            20 * 60_000 + next(70 * 60_000)
        } else {
            2 * 60_000 + next(10 * 60_000)
        };
        up = !up;
    }

    println!("wrote {written} events to {}", path.display());
    Ok(())
}
