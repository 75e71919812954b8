pub mod cli;
pub mod config;
pub mod error;
pub mod ledger;
pub mod model;
pub mod render;
pub mod schema;
pub mod scoring;
pub mod store;
pub mod ui;

pub use cli::{Cli, Commands};
pub use error::{LedgerError, Result};
pub use ledger::{Ledger, Removed};
pub use scoring::{planet_score, Quality, ScoreBreakdown};
pub use ui::{Board, BoardApp};
