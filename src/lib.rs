//! Gift search and recommendation service.
//!
//! Fans product searches out across a structured catalog store and live
//! web-search providers, normalizes everything into a canonical `Product`,
//! filters and dedups the merged set, and layers gift recommendation
//! (category composition, summary translation, voiced summaries) on top.

pub mod api;
pub mod catalog;
pub mod gift;
pub mod logging;
pub mod marketplace;

pub mod util {
    pub mod env;
}
