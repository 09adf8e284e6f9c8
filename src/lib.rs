pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::yelp::YelpClient;
pub use config::{Cli, Command};
pub use core::collector::GridCollector;
pub use core::locations::LocationCollector;
pub use utils::error::{HarvestError, Result};
