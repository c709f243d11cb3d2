//! A single training session.
//!
//! The session owns the caller-side state the scheduler deliberately does
//! not keep: the progress snapshot, the last card served and how many cards
//! have been graded. Each grade is applied to the snapshot and written
//! through the [`ProgressStore`].

use crate::models::{Card, Grade, ProgressMap, ProgressRecord};
use crate::scheduler::{self, RandomSource};
use crate::store::ProgressStore;

pub struct TrainingSession<'s> {
    store: &'s ProgressStore,
    cards: Vec<Card>,
    progress: ProgressMap,
    last_card_id: Option<String>,
    served: usize,
    size: usize,
    storage_warning: bool,
}

impl<'s> TrainingSession<'s> {
    /// Start a session over `cards`, seeding history from the store.
    pub async fn start(store: &'s ProgressStore, cards: Vec<Card>, size: usize) -> Self {
        let ids: Vec<&str> = cards.iter().map(|card| card.id.as_str()).collect();
        let progress = store.bulk_get(&ids).await;

        tracing::info!(
            cards = cards.len(),
            seen = progress.len(),
            size,
            "Training session started"
        );

        Self {
            store,
            storage_warning: store.is_unavailable(),
            cards,
            progress,
            last_card_id: None,
            served: 0,
            size,
        }
    }

    pub fn progress(&self) -> &ProgressMap {
        &self.progress
    }

    pub fn last_card_id(&self) -> Option<&str> {
        self.last_card_id.as_deref()
    }

    pub fn served(&self) -> usize {
        self.served
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_complete(&self) -> bool {
        self.served >= self.size
    }

    /// True once progress has stopped persisting.
    pub fn storage_warning(&self) -> bool {
        self.storage_warning
    }

    pub fn next_card(&self, now: i64, rng: &mut impl RandomSource) -> Option<&Card> {
        scheduler::select_next(
            &self.cards,
            &self.progress,
            now,
            self.last_card_id.as_deref(),
            rng,
        )
    }

    /// Apply `grade` to `card_id` at `now` and persist the new record.
    pub async fn grade(&mut self, card_id: &str, grade: Grade, now: i64) -> ProgressRecord {
        let previous = ProgressRecord::lookup(&self.progress, card_id);
        let next = previous.graded(grade, now);

        self.progress.insert(card_id.to_string(), next);
        self.store.put(card_id, next).await;
        if self.store.is_unavailable() {
            self.storage_warning = true;
        }

        self.served += 1;
        self.last_card_id = Some(card_id.to_string());

        tracing::debug!(card = card_id, ?grade, g = next.g, r = next.r, "Graded card");
        next
    }
}
