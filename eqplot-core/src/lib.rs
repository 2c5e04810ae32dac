pub mod config;
pub mod dsp;
pub mod filter;
pub mod interaction;
pub mod plot;
pub mod store;

pub use config::PlotConfig;
pub use filter::{BiquadParams, BiquadSubtype, FilterDefinition, FilterSet};
pub use interaction::{PlotEvent, PlotSession, SessionOptions};
pub use store::{FilterStore, MemoryFilterStore, ParamChange, StoreError};
