pub mod collector;
pub mod grid;
pub mod locations;
pub mod summary;
