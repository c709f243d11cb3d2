use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::SeedableRng;
use speculate2::speculate;
use wortklar::models::*;
use wortklar::scheduler::{select_next, weight, RandomSource, RngSource};

const NOW: i64 = 1_700_000_000_000;

/// Replays a fixed sequence of draws, then repeats the last one.
struct Scripted {
    values: VecDeque<f64>,
    last: f64,
    calls: usize,
}

impl Scripted {
    fn new(values: &[f64]) -> Self {
        Self {
            values: values.iter().copied().collect(),
            last: values.last().copied().unwrap_or(0.0),
            calls: 0,
        }
    }
}

impl RandomSource for Scripted {
    fn next_unit(&mut self) -> f64 {
        self.calls += 1;
        match self.values.pop_front() {
            Some(value) => {
                self.last = value;
                value
            }
            None => self.last,
        }
    }
}

fn noun(id: &str) -> Card {
    Card {
        id: id.to_string(),
        level: Difficulty::Easy,
        active: true,
        content: CardContent::Noun {
            front: NounFront {
                lemma: id.to_string(),
            },
            reveal: NounReveal {
                article_nom: Article::Der,
                plural: "X".to_string(),
                examples: vec![Example {
                    de: "Beispiel".to_string(),
                }],
            },
        },
        tags: None,
    }
}

fn verb_prep(id: &str) -> Card {
    Card {
        id: id.to_string(),
        level: Difficulty::Easy,
        active: true,
        content: CardContent::VerbPrep {
            front: VerbPrepFront {
                pattern: format!("{id} ___"),
            },
            reveal: VerbPrepReveal {
                pattern: format!("{id} auf + Akk."),
                examples: vec![],
                notes: None,
            },
        },
        tags: None,
    }
}

fn inactive(mut card: Card) -> Card {
    card.active = false;
    card
}

fn progress(entries: &[(&str, ProgressRecord)]) -> ProgressMap {
    entries
        .iter()
        .map(|(id, record)| (id.to_string(), *record))
        .collect()
}

fn history(g: u32, r: u32, last_seen: i64, cooldown_until: i64) -> ProgressRecord {
    ProgressRecord {
        g,
        r,
        last_seen,
        cooldown_until,
    }
}

speculate! {
    describe "select_next" {
        it "returns None when no card is active" {
            let cards = vec![inactive(noun("noun-1")), inactive(verb_prep("vp-1"))];
            let mut rng = Scripted::new(&[0.5]);

            let result = select_next(&cards, &ProgressMap::new(), NOW, None, &mut rng);

            assert!(result.is_none());
            assert_eq!(rng.calls, 0);
        }

        it "returns None for an empty catalog" {
            let mut rng = Scripted::new(&[0.5]);
            assert!(select_next(&[], &ProgressMap::new(), NOW, None, &mut rng).is_none());
        }

        it "never selects an inactive card" {
            let cards = vec![inactive(noun("off")), noun("on")];
            let mut rng = Scripted::new(&[0.0]);

            let result = select_next(&cards, &ProgressMap::new(), NOW, None, &mut rng);

            assert_eq!(result.map(|c| c.id.as_str()), Some("on"));
        }

        it "falls back to the eligible pool when everything is cooling down" {
            let cards = vec![noun("noun-1")];
            let map = progress(&[("noun-1", history(0, 0, NOW, NOW + 60_000))]);
            let mut rng = Scripted::new(&[0.4]);

            let result = select_next(&cards, &map, NOW, None, &mut rng);

            assert_eq!(result.map(|c| c.id.as_str()), Some("noun-1"));
        }

        it "skips cards that are still cooling down" {
            let cards = vec![noun("cooling"), noun("ready")];
            let map = progress(&[("cooling", history(0, 9, 0, NOW + 1))]);
            let mut rng = Scripted::new(&[0.0]);

            let result = select_next(&cards, &map, NOW, None, &mut rng);

            assert_eq!(result.map(|c| c.id.as_str()), Some("ready"));
        }

        it "treats a cooldown ending exactly now as ready" {
            let cards = vec![noun("a"), noun("b")];
            let map = progress(&[("a", history(0, 0, 0, NOW)), ("b", history(0, 0, 0, NOW + 1))]);
            let mut rng = Scripted::new(&[0.99]);

            let result = select_next(&cards, &map, NOW, None, &mut rng);

            assert_eq!(result.map(|c| c.id.as_str()), Some("a"));
        }

        it "rerolls once when the same card repeats" {
            let cards = vec![noun("a"), verb_prep("b")];
            let mut rng = Scripted::new(&[0.0, 0.9]);

            let result = select_next(&cards, &ProgressMap::new(), NOW, Some("a"), &mut rng);

            assert_eq!(result.map(|c| c.id.as_str()), Some("b"));
            assert_eq!(rng.calls, 2);
        }

        it "keeps the reroll even if it repeats again" {
            let cards = vec![noun("a"), verb_prep("b")];
            let mut rng = Scripted::new(&[0.0, 0.1, 0.9]);

            let result = select_next(&cards, &ProgressMap::new(), NOW, Some("a"), &mut rng);

            assert_eq!(result.map(|c| c.id.as_str()), Some("a"));
            assert_eq!(rng.calls, 2);
        }

        it "does not reroll with a single candidate" {
            let cards = vec![noun("a")];
            let mut rng = Scripted::new(&[0.0, 0.9]);

            let result = select_next(&cards, &ProgressMap::new(), NOW, Some("a"), &mut rng);

            assert_eq!(result.map(|c| c.id.as_str()), Some("a"));
            assert_eq!(rng.calls, 1);
        }

        it "does not reroll a card other than the last one" {
            let cards = vec![noun("a"), noun("b")];
            let mut rng = Scripted::new(&[0.9, 0.0]);

            let result = select_next(&cards, &ProgressMap::new(), NOW, Some("a"), &mut rng);

            assert_eq!(result.map(|c| c.id.as_str()), Some("b"));
            assert_eq!(rng.calls, 1);
        }

        it "prefers higher weight cards when the draw favors them" {
            let cards = vec![noun("light"), noun("heavy")];
            let map = progress(&[
                ("light", history(0, 0, 0, 0)),
                ("heavy", history(0, 5, 0, 0)),
            ]);

            let light = weight(&map["light"], NOW);
            let heavy = weight(&map["heavy"], NOW);
            assert_eq!(light, 2.0);
            assert!((heavy - 14.697).abs() < 0.001);

            let mut rng = Scripted::new(&[0.95]);
            let result = select_next(&cards, &map, NOW, None, &mut rng);

            assert_eq!(result.map(|c| c.id.as_str()), Some("heavy"));
        }

        it "walks the pool in catalog order" {
            let cards = vec![noun("a"), noun("b"), noun("c")];
            // Equal weights of 2.0 each: total 6.0
            let picks: Vec<_> = [0.0, 0.3, 0.34, 0.66, 0.67, 0.999]
                .iter()
                .map(|draw| {
                    let mut rng = Scripted::new(&[*draw]);
                    select_next(&cards, &ProgressMap::new(), NOW, None, &mut rng)
                        .map(|c| c.id.clone())
                        .unwrap()
                })
                .collect();

            assert_eq!(picks, vec!["a", "a", "b", "b", "c", "c"]);
        }

        it "is reproducible with a seeded generator" {
            let cards: Vec<Card> = (0..20).map(|i| noun(&format!("n{i}"))).collect();
            let map = progress(&[("n3", history(0, 4, 0, 0)), ("n7", history(5, 0, 0, 0))]);

            let run = |seed: u64| -> Vec<String> {
                let mut rng = RngSource(StdRng::seed_from_u64(seed));
                (0..10)
                    .map(|_| select_next(&cards, &map, NOW, None, &mut rng).unwrap().id.clone())
                    .collect()
            };

            assert_eq!(run(7), run(7));
        }
    }
}
