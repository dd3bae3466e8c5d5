pub mod config;
pub mod league;
pub mod ledger;
pub mod logging;
pub mod output;
pub mod scoring;
