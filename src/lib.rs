//! Minimal HTTP load generation.
//!
//! A [`Commander`] owns a fixed pool of [`Attacker`]s. Each assault sends
//! them all at one URL for a time span, halts them, and reduces their
//! [`Report`]s into a [`Summary`].
//!
//! ```no_run
//! use volley::Commander;
//!
//! let mut commander = Commander::new(3)?;
//! let summary = commander.assault("http://localhost:8080/", "", "10s")?;
//! println!("{}", summary);
//! # Ok::<(), volley::Error>(())
//! ```

pub mod attacker;
pub mod commander;
pub mod config;
pub mod error;
pub mod report;

pub use attacker::{ AttackOrder, Attacker };
pub use commander::{ Commander, StopHandle };
pub use config::{ AttackConfig, Cli };
pub use error::{ Error, Result };
pub use report::{ Report, Summary };
