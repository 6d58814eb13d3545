//! airtrack-core: live aircraft table with CPR position resolution.
//!
//! No async, no I/O in the tracking path. Just algorithms. Feed decoded
//! messages into an [`AircraftStore`]; each aircraft's position is resolved
//! from its latest even/odd CPR fragments.

pub mod aircraft;
pub mod config;
pub mod cpr;
pub mod decode;
pub mod message;
pub mod parity;
pub mod store;
pub mod types;

// Re-export commonly used types at crate root
pub use aircraft::{Aircraft, CprFragment};
pub use config::StoreConfig;
pub use decode::decode_frame;
pub use message::Message;
pub use store::AircraftStore;
pub use types::*;
