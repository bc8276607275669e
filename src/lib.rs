//! Wi-Fi link timeline: records connectivity transitions to an
//! append-only CSV log and renders them as a zoomable, scrubbable
//! history band.

pub mod app;
pub mod axis;
pub mod controller;
pub mod events;
pub mod monitor;
pub mod themes;
pub mod widgets;

pub use app::LinklineApp;
pub use controller::InteractionController;
pub use events::{EventLog, LinkEvent};
pub use monitor::{LinkProbe, LinkStatus, NmcliProbe, Recorder, SharedMonitor};
