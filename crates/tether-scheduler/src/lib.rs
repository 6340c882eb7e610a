//! `tether-scheduler` — per-connection heartbeat / snapshot scheduler.
//!
//! # Overview
//!
//! While a session is idle the client sends a payload-less heartbeat; while
//! the session is under control it streams screen snapshots instead, and only
//! when the screen actually changed. Never both at once.
//!
//! A [`Supervisor`] check cycle runs at a fixed cadence, reads the
//! [`ControlFlag`] and reconciles the [`TaskRegistry`] so that exactly one
//! schedule is live afterwards:
//!
//! | Controlled | Cancelled         | Started (first firing immediate) |
//! |------------|-------------------|----------------------------------|
//! | `false`    | snapshot, if live | heartbeat @ `heartbeat_interval` |
//! | `true`     | heartbeat, if live| snapshot @ `snapshot_interval`   |
//!
//! [`ConnectionScheduler`] ties this to a connection's lifetime: it adopts the
//! server-assigned session name, resets on re-identification and tears
//! everything down when the connection closes or a check cycle fails.

pub mod capture;
pub mod connection;
pub mod detector;
pub mod engine;
pub mod error;
pub mod intervals;
pub mod notify;
pub mod registry;
pub mod schedule;
pub mod supervisor;
pub mod task;
pub mod types;

pub use capture::SnapshotSource;
pub use connection::{ChannelConnection, Connection};
pub use detector::ChangeDetector;
pub use engine::ConnectionScheduler;
pub use error::{Result, SchedulerError};
pub use intervals::{ConfigFileIntervals, IntervalSource};
pub use notify::{LogNotifier, Notifier};
pub use registry::TaskRegistry;
pub use schedule::ScheduleHandle;
pub use supervisor::{CheckReport, Supervisor};
pub use task::{HeartbeatTask, PeriodicTask, SharedDetector, SnapshotTask, TaskContext};
pub use types::{Collaborators, ControlFlag, TaskKind};
