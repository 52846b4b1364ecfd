pub mod config;
pub mod demo;
pub mod error;
pub mod ev;
pub mod http_client;
pub mod line;
pub mod matcher;
pub mod normalize;
pub mod odds;
pub mod odds_fetch;
pub mod payload;
pub mod pipeline;
pub mod report;
pub mod snapshot;

pub use error::{EvError, Result};
pub use ev::{EvParams, EvResult, LineEv, calculate_ev, calculate_line_ev, calculate_line_ev_with};
pub use line::{Line, LineFields, OverUnder, Platform};
