//! Single-attempt registration against the remote DevEUI registration API.
//!
//! ## Structure
//!
//! - [`Endpoint`] - normalized, validated API address.
//! - [`Registrar`] - one attempt, classified as an [`AttemptOutcome`].
//! - [`HttpRegistrar`] - the `reqwest` implementation.

mod endpoint;
mod http;
mod interface;

pub use endpoint::*;
pub use http::*;
pub use interface::*;
