//! Map/unmap orchestration for grcmap.
//!
//! - [`PendingJoinLedger`]: intents staged against an unsaved or in-edit
//!   parent, committed as concurrent map and unmap halves once it is saved.
//! - [`SharedLedgers`]: ledgers keyed by parent, each behind its own lock.
//! - [`MappingService`]: the system-of-record boundary that actually
//!   creates and removes relationships.
//! - [`Mapper`]: checks every target against the rules, sets externally
//!   managed ones aside, then stages or applies the rest.
//! - [`MapperConfig`]: page size, default mega direction and the config
//!   files the registry and rules load from.

mod config;
mod error;
mod ledger;
mod mapper;
pub mod service;
mod shared;

pub use config::MapperConfig;
pub use error::{MapperError, MapperResult};
pub use ledger::{CommitReport, PendingJoin, PendingJoinLedger};
pub use mapper::{MapMode, Mapper, MappingOutcome};
pub use service::{MappingService, MappingTarget};
pub use shared::{LedgerKey, SharedLedgers};
