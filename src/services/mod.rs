//! Business logic services

pub mod audit;
pub mod notification;
pub mod sweep;
pub mod sweep_scheduler;

pub use audit::AuditRecorder;
pub use notification::NotificationService;
pub use sweep::{NotificationSweep, ScanResult, SweepReport};
pub use sweep_scheduler::start_sweep_scheduler;
