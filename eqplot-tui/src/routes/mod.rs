pub mod log;
pub mod plot;
