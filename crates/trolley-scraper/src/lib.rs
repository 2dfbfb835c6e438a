pub mod catalog;
pub mod client;
pub mod error;
pub mod extract;
pub mod locate;
pub mod search;
pub mod store;

pub use client::TrolleyClient;
pub use error::ScraperError;
pub use search::{extract_search_results, search_products};
