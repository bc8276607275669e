pub mod badge;
pub mod inspector;
pub mod timeline;

pub use badge::ConnectionBadge;
pub use inspector::LogInspector;
pub use timeline::Timeline;
