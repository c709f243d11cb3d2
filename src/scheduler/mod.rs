//! Adaptive selection of the next card to show.
//!
//! Each call is a stateless step: the caller supplies the catalog slice, a
//! snapshot of per-card history, the current time and the id of the card it
//! served last. The scheduler filters out inactive cards, prefers cards whose
//! cooldown has expired, and draws one at random with probability
//! proportional to [`weight`].

pub mod weight;

pub use weight::weight;

use rand::Rng;

use crate::models::{Card, ProgressMap, ProgressRecord};

/// Source of uniform random values in `[0, 1)`.
///
/// The scheduler never touches a global RNG directly so that draws can be
/// scripted in tests and reproduced from a seed.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

/// Adapts any [`rand::Rng`] to [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

impl RngSource<rand::rngs::ThreadRng> {
    pub fn thread() -> Self {
        Self(rand::thread_rng())
    }
}

/// A candidate with its precomputed weight.
#[derive(Debug, Clone, Copy)]
pub struct Weighted<'a> {
    pub card: &'a Card,
    pub weight: f64,
}

/// Weighted random draw over `items`, walking them in order.
///
/// Returns the first item whose cumulative weight reaches the drawn value.
/// If floating-point error leaves nothing selected, the last item is
/// returned. `None` only for an empty pool or a non-positive total.
pub fn weighted_choice<'a, 'b>(
    items: &'b [Weighted<'a>],
    rng: &mut impl RandomSource,
) -> Option<&'b Weighted<'a>> {
    let total: f64 = items.iter().map(|item| item.weight).sum();
    if total <= 0.0 {
        return None;
    }

    let roll = rng.next_unit() * total;
    let mut cumulative = 0.0;
    for item in items {
        cumulative += item.weight;
        if cumulative >= roll {
            return Some(item);
        }
    }

    items.last()
}

/// Pick the next card to show, or `None` if no card is active.
///
/// Cards still cooling down are skipped unless every active card is cooling
/// down, in which case the whole active pool is used. If the draw lands on
/// `last_card_id` and there is more than one candidate, exactly one more
/// draw is made over the same pool and its result is used, even if it
/// repeats again.
pub fn select_next<'a>(
    cards: &'a [Card],
    progress: &ProgressMap,
    now: i64,
    last_card_id: Option<&str>,
    rng: &mut impl RandomSource,
) -> Option<&'a Card> {
    let eligible: Vec<&Card> = cards.iter().filter(|card| card.active).collect();
    if eligible.is_empty() {
        tracing::debug!("No active cards to select from");
        return None;
    }

    let ready: Vec<&Card> = eligible
        .iter()
        .copied()
        .filter(|card| ProgressRecord::lookup(progress, &card.id).cooldown_until <= now)
        .collect();

    let cooling_fallback = ready.is_empty();
    let candidates = if cooling_fallback { eligible } else { ready };

    let weighted: Vec<Weighted> = candidates
        .into_iter()
        .map(|card| Weighted {
            card,
            weight: weight::weight(&ProgressRecord::lookup(progress, &card.id), now),
        })
        .collect();

    tracing::debug!(
        candidates = weighted.len(),
        cooling_fallback,
        "Selecting next card"
    );

    let first = weighted_choice(&weighted, rng)?;
    if last_card_id == Some(first.card.id.as_str()) && weighted.len() >= 2 {
        let reroll = weighted_choice(&weighted, rng).unwrap_or(first);
        tracing::debug!(
            repeated = %first.card.id,
            rerolled = %reroll.card.id,
            "Rerolled repeated card"
        );
        return Some(reroll.card);
    }

    Some(first.card)
}
