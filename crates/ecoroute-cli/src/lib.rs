//! ecoroute CLI library.
//!
//! Terminal styling, text/JSON rendering of planned routes and the batch
//! query file format used by `ecoroute-cli batch`.

pub mod batch;
pub mod output;
pub mod terminal;
