//! AI seat fillers.
//!
//! Seat fillers go through exactly the same submission entry point as human
//! players; nothing in here can see another participant's hand or pending
//! selection.

mod heuristic;
mod random;
pub mod registry;
mod trait_def;

#[cfg(test)]
mod tests_fillers;

pub use heuristic::HeuristicFiller;
pub use random::RandomFiller;
pub use trait_def::{AiError, SeatFiller, SeatView};
