//! Cross-module tests.
//!
//! - `integration.rs`: collision scenarios through the registry and through
//!   full simulation frames
//! - `player_states.rs`: the status-effect state machine end to end
//! - `properties.rs`: `proptest` properties of dispatch, ids and storage
//! - `helpers.rs`: a world fixture and small accessors

mod helpers;

pub use helpers::*;
