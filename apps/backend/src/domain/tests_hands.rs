use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::cards::{Category, QualityTier, RoleCard, SynergyCard, CATEGORY_COUNT};
use crate::domain::hands::{build_role_hand, draw_synergy_hand, sample_categories};

fn card(id: i64, perfect: &[Category], good: &[Category]) -> RoleCard {
    let mut quality = [QualityTier::NotApplicable; CATEGORY_COUNT];
    for &c in perfect {
        quality[c.index()] = QualityTier::Perfect;
    }
    for &c in good {
        quality[c.index()] = QualityTier::Good;
    }
    RoleCard {
        id,
        name: format!("role-{id}"),
        quality,
    }
}

fn pool() -> Vec<RoleCard> {
    vec![
        card(1, &[Category::Design], &[Category::Research]),
        card(2, &[Category::Design], &[Category::Strategy]),
        card(3, &[], &[Category::Design, Category::Operations]),
        card(4, &[], &[Category::Design]),
        card(5, &[], &[Category::Design]),
        card(6, &[Category::Engineering], &[]),
    ]
}

#[test]
fn hand_includes_all_perfect_cards_first() {
    let mut rng = StdRng::seed_from_u64(7);
    let hand = build_role_hand(&pool(), Category::Design, 4, &mut rng);
    assert_eq!(hand.len(), 4);
    assert!(hand.iter().any(|c| c.id == 1));
    assert!(hand.iter().any(|c| c.id == 2));
}

#[test]
fn hand_never_contains_not_applicable_cards() {
    let mut rng = StdRng::seed_from_u64(11);
    for seed in 0..20u64 {
        let mut rng2 = StdRng::seed_from_u64(seed);
        let hand = build_role_hand(&pool(), Category::Design, 4, &mut rng2);
        for c in &hand {
            assert_ne!(c.quality_for(Category::Design), QualityTier::NotApplicable);
        }
    }
    // Card 6 is engineering-only, so it can never show up for Design.
    let hand = build_role_hand(&pool(), Category::Design, 6, &mut rng);
    assert!(hand.iter().all(|c| c.id != 6));
}

#[test]
fn hand_is_capped_at_hand_size_when_enough_good_fill() {
    let mut rng = StdRng::seed_from_u64(3);
    let hand = build_role_hand(&pool(), Category::Design, 3, &mut rng);
    assert_eq!(hand.len(), 3);
}

#[test]
fn all_perfect_cards_survive_even_past_hand_size() {
    // Hand size 1 but two perfect cards: both are still dealt.
    let mut rng = StdRng::seed_from_u64(5);
    let hand = build_role_hand(&pool(), Category::Design, 1, &mut rng);
    assert_eq!(hand.len(), 2);
    let mut ids: Vec<i64> = hand.iter().map(|c| c.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn synergy_hand_draws_distinct_cards() {
    let deck: Vec<SynergyCard> = (1..=6)
        .map(|id| SynergyCard {
            id,
            name: format!("syn-{id}"),
            bonus_pct: 10,
        })
        .collect();
    let mut rng = StdRng::seed_from_u64(13);
    let hand = draw_synergy_hand(&deck, 3, &mut rng);
    assert_eq!(hand.len(), 3);
    let mut ids: Vec<i64> = hand.iter().map(|c| c.id).collect();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[test]
fn sampled_categories_are_distinct_and_sized() {
    let mut rng = StdRng::seed_from_u64(17);
    let cats = sample_categories(5, &mut rng);
    assert_eq!(cats.len(), 5);
    let mut seen = cats.clone();
    seen.sort_by_key(|c| c.index());
    seen.dedup();
    assert_eq!(seen.len(), 5);
}

#[test]
fn sampling_more_than_available_caps_at_category_count() {
    let mut rng = StdRng::seed_from_u64(19);
    let cats = sample_categories(12, &mut rng);
    assert_eq!(cats.len(), CATEGORY_COUNT);
}
