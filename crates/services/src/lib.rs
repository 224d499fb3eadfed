//! # services
//!
//! Ranking, caching and orchestration for the maintenance console. Depends
//! only on `domains`; the backend arrives as a `MaintenanceBackend` trait object.

pub mod activity;
pub mod cache;
pub mod chat;
pub mod console;
pub mod fetch;
pub mod notice;
pub mod ranking;
pub mod summary;

pub use activity::{Activity, ActivityTracker};
pub use chat::{ChatMessage, ChatSession, ChatSessions, ChatTurn};
pub use console::{DashboardQuery, DashboardView, MaintenanceService, ServiceSettings};
pub use notice::{Notice, Tone};
pub use summary::SummaryCounts;
