//! Start and stop control for networked eye-tracking units.
//!
//! ## Overview
//!
//! Research-grade eye trackers, such as the Mirametrix units, ship with a small TCP server. The
//! server waits for XML `SET` statements describing which values it should report, and once
//! data sending is enabled it emits one XML record per line at the camera rate (around 60 Hz).
//!
//! This library wraps that exchange in a [`Session`]:
//!
//! - [`Session::start_eyetracking`] connects to the unit and sends the start-configuration
//!   payload.
//! - [`Session::next_record`] and [`Session::record`] hand the streamed records to the caller,
//!   unparsed.
//! - [`Session::stop_eyetracking`] sends the stop payload and closes the connection.
//!
//! Every operation is an `async fn` meant to be awaited in sequence from the caller's own
//! control flow. The library never spawns tasks of its own.

#![warn(
    clippy::nursery,
    clippy::pedantic,
    clippy::expect_used,
    clippy::unwrap_used
)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::future_not_send
)]

pub mod command;
pub mod config;
pub mod log;
pub mod net;
pub mod record;
pub mod session;
pub(crate) mod testing;

mod error;
pub use error::{Error, Result};

pub use command::Command;
pub use config::{Config, Endpoint};
pub use log::RecordLog;
pub use record::Record;
pub use session::Session;
