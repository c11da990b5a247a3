#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shot loadout: the ready rack of upcoming pieces and the sacrifice gauge
//! that arms a large bomb.

mod gauge;
mod rack;

pub use gauge::SacrificeGauge;
pub use rack::{ReadyRack, READY_RACK_CAPACITY};
