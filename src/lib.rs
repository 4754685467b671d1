//! Remedia: typed client core for the Remedia medication-tracking service.
//!
//! The crate implements the authenticated request pipeline the rest of the
//! application sits on: bearer-credential attachment with a TTL'd token
//! cache, a single coordinated retry on authorization failure, and
//! normalization of the backend's inconsistently-cased JSON payloads into a
//! uniform typed success/error envelope.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use remedia::prelude::*;
//!
//! # async fn example() -> Result<(), remedia::outcome::Cancelled> {
//! let store = Arc::new(FileCredentialStore::new_default());
//! let gateway = EndpointGateway::from_config(&GatewayConfig::from_env(), store);
//!
//! let cancel = CancellationToken::new();
//! let outcome = gateway.list_reminders(&cancel).await?;
//! if let Some(list) = outcome.payload() {
//!     println!("{} reminders", list.reminders.len());
//! } else {
//!     eprintln!("{}", outcome.first_message());
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod normalize;
pub mod outcome;
pub mod pipeline;
pub mod prelude;
pub mod transport;
