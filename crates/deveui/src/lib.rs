//! Concurrent DevEUI batch registration.
//!
//! A batch asks for `n` new device identifiers. Each one is drawn at random,
//! checked for a unique five-digit short code within the run, and registered
//! against a remote API. Conflicts are retried with a fresh identifier; other
//! failures drop the slot. The run is bounded by an aggregate deadline and can
//! be cancelled; in both cases the identifiers already confirmed are returned.
//!
//! ```no_run
//! use deveui::{EngineConfig, HttpRegistrar, RegistrationEngine};
//!
//! # async fn run() -> deveui::Result<()> {
//! let config = EngineConfig::new("localhost:8000/register")?.with_num_workers(4);
//! let engine = RegistrationEngine::new(config, HttpRegistrar::new()?)?;
//! let result = engine.run_batch(100).await;
//! for deveui in &result {
//!     println!("{}\t{deveui}", deveui.short_code());
//! }
//! # Ok(())
//! # }
//! ```

mod allocator;
mod client;
mod engine;
mod error;
mod id;
mod rand;

pub use crate::allocator::*;
pub use crate::client::*;
pub use crate::engine::*;
pub use crate::error::*;
pub use crate::id::*;
pub use crate::rand::*;
