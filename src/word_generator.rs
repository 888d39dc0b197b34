use crate::{language::Language, session::TestSequence};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

/// Draw `count` independent uniform samples (with replacement) from `corpus`.
///
/// An empty corpus yields an empty sequence.
pub fn generate<R: Rng + ?Sized>(count: usize, corpus: &Language, rng: &mut R) -> TestSequence {
    let words = (0..count)
        .filter_map(|_| corpus.words.choose(&mut *rng).cloned())
        .collect();
    TestSequence::new(words)
}

/// Owns the corpus and the random source used for every new test
#[derive(Debug, Clone)]
pub struct WordSource {
    corpus: Language,
    count: usize,
    rng: StdRng,
}

impl WordSource {
    pub fn new(corpus: Language, count: usize) -> Self {
        Self::with_rng(corpus, count, StdRng::from_entropy())
    }

    pub fn seeded(corpus: Language, count: usize, seed: u64) -> Self {
        Self::with_rng(corpus, count, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(corpus: Language, count: usize, rng: StdRng) -> Self {
        Self { corpus, count, rng }
    }

    pub fn next_sequence(&mut self) -> TestSequence {
        generate(self.count, &self.corpus, &mut self.rng)
    }

    pub fn corpus(&self) -> &Language {
        &self.corpus
    }

    pub fn count(&self) -> usize {
        self.count
    }
}
