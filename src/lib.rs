//! Orexin - battery of short cognitive self-tests
//!
//! Five tests run one at a time inside a fixed-rate frame loop: poll input →
//! advance the test's state machine → draw → present → pace. Each test that
//! finishes naturally produces one Session Result, which is stamped and written
//! to the data directory.
//!
//! ## Tests
//!
//! - **Psychomotor vigilance**: reaction time to a randomly delayed stimulus
//! - **Digit span**: forward and backward recall of digit sequences
//! - **Digit symbol substitution**: timed glyph-to-digit coding
//! - **Stanford Sleepiness Scale**: single 1-7 rating
//! - **Subjective feelings**: short free-text entry
//!
//! The graphics host sits behind [`Frontend`]; tests drive every machine with
//! [`HeadlessFrontend`] instead of a terminal.

pub mod battery;
pub mod clock;
pub mod config;
pub mod error;
pub mod frontend;
pub mod random;
pub mod runner;
pub mod scene;
pub mod shell;
pub mod storage;
pub mod tasks;
pub mod types;
pub mod view;

pub use battery::{run_battery, run_test, show_setup_error, RngFactory, TestSummary};
pub use config::BatteryConfig;
pub use error::{DataError, RunError};
pub use frontend::{Frontend, HeadlessFrontend};
pub use runner::{run_assessment, run_screen, Assessment, Render, RunOutcome, Screen};
pub use storage::{DataStore, LayoutPolicy};
pub use types::{InputEvent, Key, RunState, TestKind, Viewport};

/// Crate version, logged at startup
pub const OREXIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name shown in window titles and logs
pub const APP_NAME: &str = "Orexin Data Collection Tool";
