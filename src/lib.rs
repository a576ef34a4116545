//! TrendSniper backend library.
//!
//! Free-text page content goes in; a validated, tier-rationed collection of
//! product/ad records comes out, with every sighting folded into a ranked
//! popularity leaderboard. The pipeline is model → extract → normalize →
//! tier cap → aggregate; the HTTP layer in [`api`] is a thin shell over it.

pub mod analyze;
pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod leaderboard;
pub mod models;
pub mod normalize;
pub mod prompt;
pub mod tier;
