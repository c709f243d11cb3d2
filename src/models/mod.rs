//! Domain models for wortklar.
//!
//! # Core Concepts
//!
//! - [`Card`]: A read-only flashcard from the catalog. Its `type` selects the
//!   front/reveal payload shape ([`CardContent`]).
//! - [`ProgressRecord`]: Mutable per-card history (recall counts, last seen,
//!   cooldown). Created only when a card is graded; absent records behave as
//!   the zeroed default.
//! - [`Grade`]: The user's self-assessment that turns one record into the next.

mod card;
mod progress;

pub use card::*;
pub use progress::*;
