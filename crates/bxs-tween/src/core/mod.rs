pub mod error;
pub mod logger;
pub mod runner;
pub mod time;
