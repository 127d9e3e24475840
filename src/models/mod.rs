pub mod entry;
pub mod stats;
pub mod user;
