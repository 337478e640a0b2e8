pub mod loader;
pub mod logger;
pub mod runner;

pub use logger::setup_logger;
pub use runner::SessionRunner;
