//! `fieldlog` - Incident logging for first responders
//!
//! This library keeps notes, EMT incidents and fire incidents in a local
//! key/value store, with autosaved drafts, duplicate-as-new, and filterable
//! incident history.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod draft;
pub mod error;
pub mod filter;
pub mod logbook;
pub mod logging;
pub mod record;
pub mod records;
pub mod server;
pub mod storage;
pub mod transfer;
pub mod view;

pub use config::Config;
pub use draft::Drafts;
pub use error::{Error, Result};
pub use logbook::{Logbook, Status};
pub use logging::init_logging;
pub use record::{EmtIncident, EmtReport, FireIncident, FireReport, Note, Severity};
pub use records::RecordStore;
pub use storage::{Storage, StorageStats};
pub use view::View;
