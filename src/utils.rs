//! Sampling helpers shared by the solver, bots and evaluation loop.

use rand::{
    Rng, SeedableRng,
    distr::StandardUniform,
    rngs::StdRng,
    seq::IndexedRandom,
};

use crate::{Error, Result, ports::State, types::PlayerId};

/// Seeded generator when a seed is given, entropy-seeded otherwise.
pub fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Sample an item with probability proportional to its weight.
///
/// Falls back to uniform sampling when the total weight is not positive.
/// Returns `None` for an empty slice.
pub fn weighted_sample<R, T>(rng: &mut R, items: &[(T, f64)]) -> Option<T>
where
    R: Rng,
    T: Clone,
{
    if items.is_empty() {
        return None;
    }

    let total: f64 = items.iter().map(|(_, w)| *w).sum();
    if total <= 0.0 {
        return items.choose(rng).map(|(item, _)| item.clone());
    }

    let mut threshold = rng.sample::<f64, _>(StandardUniform) * total;
    for (item, weight) in items {
        if threshold < *weight {
            return Some(item.clone());
        }
        threshold -= weight;
    }

    // Rounding can leave a sliver of threshold past the last weight
    items.last().map(|(item, _)| item.clone())
}

/// Apply chance outcomes until the state is a decision or terminal node.
///
/// # Errors
///
/// Returns [`Error::NoLegalActions`] if a chance node has no outcomes.
pub fn resolve_chance<R: Rng>(state: &mut Box<dyn State>, rng: &mut R) -> Result<()> {
    while state.current_player() == PlayerId::Chance {
        let mut outcomes = state.chance_outcomes();
        if outcomes.is_empty() {
            outcomes = state
                .legal_actions()
                .into_iter()
                .map(|action| (action, 1.0))
                .collect();
        }
        let action = weighted_sample(rng, &outcomes).ok_or_else(|| Error::NoLegalActions {
            state: state.state_key().into_string(),
        })?;
        state.apply_action(action)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_sample_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let items: Vec<(i64, f64)> = Vec::new();
        assert_eq!(weighted_sample(&mut rng, &items), None);
    }

    #[test]
    fn test_weighted_sample_skips_zero_weights() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = vec![(0_i64, 0.0), (1, 1.0), (2, 0.0)];
        for _ in 0..100 {
            assert_eq!(weighted_sample(&mut rng, &items), Some(1));
        }
    }

    #[test]
    fn test_weighted_sample_zero_total_is_uniform() {
        let mut rng = StdRng::seed_from_u64(3);
        let items = vec![(0_i64, 0.0), (1, 0.0)];
        let sampled = weighted_sample(&mut rng, &items).unwrap();
        assert!(sampled == 0 || sampled == 1);
    }

    #[test]
    fn test_seeded_rngs_agree() {
        let mut a = build_rng(Some(42));
        let mut b = build_rng(Some(42));
        assert_eq!(a.random::<u64>(), b.random::<u64>());
    }
}
