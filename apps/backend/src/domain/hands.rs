//! Hand construction and per-game category sampling.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::domain::cards::{Category, QualityTier, RoleCard, SynergyCard};

/// Build a role hand for one category.
///
/// Every `perfect`-quality card in the pool is included; remaining slots up
/// to `hand_size` are filled with randomly chosen `good` cards. Cards rated
/// `not_applicable` for the category never appear. The final hand is
/// shuffled so hand position leaks nothing about quality.
pub fn build_role_hand(
    pool: &[RoleCard],
    category: Category,
    hand_size: usize,
    rng: &mut StdRng,
) -> Vec<RoleCard> {
    let mut hand: Vec<RoleCard> = pool
        .iter()
        .filter(|c| c.quality_for(category) == QualityTier::Perfect)
        .cloned()
        .collect();

    let mut good: Vec<RoleCard> = pool
        .iter()
        .filter(|c| c.quality_for(category) == QualityTier::Good)
        .cloned()
        .collect();
    good.shuffle(rng);

    let fill = hand_size.saturating_sub(hand.len());
    hand.extend(good.into_iter().take(fill));
    hand.shuffle(rng);
    hand
}

/// Draw `size` distinct synergy cards from the deck.
pub fn draw_synergy_hand(deck: &[SynergyCard], size: usize, rng: &mut StdRng) -> Vec<SynergyCard> {
    let mut cards: Vec<SynergyCard> = deck.to_vec();
    cards.shuffle(rng);
    cards.truncate(size);
    cards
}

/// Sample `n` distinct categories for a game, in play order.
pub fn sample_categories(n: usize, rng: &mut StdRng) -> Vec<Category> {
    let mut all = Category::ALL.to_vec();
    all.shuffle(rng);
    all.truncate(n.min(Category::ALL.len()));
    all
}
