#![doc(test(attr(deny(warnings))))]

//! Dashboard Forms provides the stepped form controller, draft persistence and
//! submission gateway shared by the admin dashboard's creation and edit flows.

pub mod api;
pub mod cli;
pub mod config;
pub mod drafts;
pub mod errors;
pub mod forms;
pub mod record;
pub mod roles;
pub mod utils;

use std::sync::Once;

pub use errors::FormsError;
pub use record::{Record, Value};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Dashboard forms tracing initialized.");
    });
}
