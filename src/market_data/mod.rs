pub mod change;
pub mod client;
pub mod refresher;
pub mod types;
