//! Scholarship eligibility matching and approval prediction.
//!
//! Two independent layers consume the same canonical student profile: a
//! deterministic rule engine that decides eligibility and composes a 0-100
//! compatibility score, and a logistic-regression layer trained on historical
//! decisions that estimates approval probability with an explainable factor
//! breakdown. Everything behind the [`matching::MatchingService`] facade is
//! synchronous and pure except retraining, which runs as a fire-and-forget
//! task coordinated per model scope.

pub mod config;
pub mod error;
pub mod history;
pub mod matching;
pub mod model;
pub mod telemetry;
