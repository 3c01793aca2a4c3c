//! Configuration, persistence seam, and concurrent service for Conclave.
//!
//! The scheduling engine in `conclave-scheduling` is synchronous and
//! single-owner. This crate wraps it for use from many tasks at once and
//! connects it to the outside world.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `conclave-config.yaml` into
//!   strongly-typed structs.
//! - [`gateway`] -- [`ScheduleGateway`] trait, [`WriteOp`] write-through
//!   operations, stored records, and the in-process [`MemoryGateway`].
//! - [`listener`] -- [`ScheduleListener`] change notifications.
//! - [`conference`] -- [`Conference`], the lock-serialized service.
//! - [`replay`] -- Startup replay of stored state.
//!
//! [`ScheduleGateway`]: gateway::ScheduleGateway
//! [`WriteOp`]: gateway::WriteOp
//! [`MemoryGateway`]: gateway::MemoryGateway
//! [`ScheduleListener`]: listener::ScheduleListener
//! [`Conference`]: conference::Conference

pub mod conference;
pub mod config;
pub mod gateway;
pub mod listener;
pub mod replay;

pub use conference::{Conference, ConferenceError};
pub use config::{ConferenceConfig, ConfigError};
pub use gateway::{
    EventRecord, GatewayError, MemoryGateway, RoomRecord, ScheduleGateway, StoredSchedule, WriteOp,
};
pub use listener::{NoOpListener, ScheduleChange, ScheduleListener};
pub use replay::ReplayReport;
