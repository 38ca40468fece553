//! Domain core for the vidra media-sharing backend.
//!
//! Four components, leaf-first: the token service owns session credential
//! lifecycle, the engagement ledger owns race-safe edge toggling with
//! consistent derived counters, and the stats aggregator reads those
//! counters into dashboard metrics and the public listing. The auth gate's
//! request half lives in the server crate; its verification half is
//! [`auth::TokenService::verify_access`].
//!
//! Every component takes its store dependencies as explicit repository
//! traits, so the whole core runs unchanged against Postgres or the
//! in-memory backend used by tests.

pub mod api;
pub mod auth;
pub mod domain;
pub mod engagement;
pub mod error;
pub mod stats;
pub mod store;

pub use engagement::EngagementLedger;
pub use error::{Error, Result};
pub use stats::StatsAggregator;
