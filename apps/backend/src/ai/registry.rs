//! How to register a seat filler
//!
//! 1) Implement `SeatFiller` for your type in its module.
//! 2) Add an `AiFactory` entry to the static list with stable `name` and `version`.
//! 3) Keep ordering stable; avoid side effects in constructors.
//! 4) Determinism: same seed means same behavior.

use crate::ai::{HeuristicFiller, RandomFiller, SeatFiller};

/// Chance used by factory-constructed heuristics; session-owned fillers get
/// the configured chance instead.
const DEFAULT_SPECIAL_CHANCE_PCT: u8 = 10;

/// Factory definition for constructing seat-filler implementations.
pub struct AiFactory {
    pub name: &'static str,
    pub version: &'static str,
    pub make: fn(seed: Option<u64>) -> Box<dyn SeatFiller + Send + Sync>,
}

static AI_FACTORIES: &[AiFactory] = &[
    AiFactory {
        name: RandomFiller::NAME,
        version: RandomFiller::VERSION,
        make: make_random_filler,
    },
    AiFactory {
        name: HeuristicFiller::NAME,
        version: HeuristicFiller::VERSION,
        make: make_heuristic_filler,
    },
];

/// Returns the statically registered seat-filler factories.
pub fn registered_fillers() -> &'static [AiFactory] {
    AI_FACTORIES
}

/// Finds a registered factory by its name.
pub fn by_name(name: &str) -> Option<&'static AiFactory> {
    registered_fillers()
        .iter()
        .find(|factory| factory.name == name)
}

fn make_random_filler(seed: Option<u64>) -> Box<dyn SeatFiller + Send + Sync> {
    Box::new(RandomFiller::new(seed))
}

fn make_heuristic_filler(seed: Option<u64>) -> Box<dyn SeatFiller + Send + Sync> {
    Box::new(HeuristicFiller::new(seed, DEFAULT_SPECIAL_CHANCE_PCT))
}

#[cfg(test)]
mod ai_registry_smoke {
    use super::*;

    #[test]
    fn enumerates_registered_fillers() {
        let fillers = registered_fillers();
        assert!(!fillers.is_empty());
        assert!(fillers.iter().any(|f| f.name == RandomFiller::NAME));
        assert!(fillers.iter().any(|f| f.name == HeuristicFiller::NAME));
    }

    #[test]
    fn lookup_helper_behaves() {
        assert!(by_name(RandomFiller::NAME).is_some());
        assert!(by_name(HeuristicFiller::NAME).is_some());
        assert!(by_name("NotARealFiller").is_none());
    }

    #[test]
    fn constructs_seeded_fillers() {
        let factory = by_name(RandomFiller::NAME).expect("RandomFiller must be registered");
        let a = (factory.make)(Some(123));
        let b = (factory.make)(Some(123));
        let _: &(dyn SeatFiller + Send + Sync) = a.as_ref();
        let _: &(dyn SeatFiller + Send + Sync) = b.as_ref();
    }
}
