//! Progression generation by walking genre graphs

use std::fmt;
use std::str::FromStr;

use fastrand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{self, GenreRecord, GraphNode, TransitionGraph};
use crate::error::{ChordmapError, Result};
use crate::theory::Key;
use crate::translator::KeyTranslator;

/// How the next chord is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Uniform choice among a node's targets
    Random,
    /// Choice proportional to edge weights
    #[default]
    Weighted,
    /// Tile one of the genre's classic patterns
    Classic,
}

impl GenerationMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Weighted => "weighted",
            Self::Classic => "classic",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GenerationMode {
    type Err = ChordmapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "random" => Ok(Self::Random),
            "weighted" => Ok(Self::Weighted),
            "classic" => Ok(Self::Classic),
            other => Err(ChordmapError::UnknownMode(other.to_string())),
        }
    }
}

/// A generated progression, as numerals and as chords in a key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progression {
    pub genre: &'static str,
    pub mode: GenerationMode,
    pub key: Key,
    pub numerals: Vec<&'static str>,
    pub chords: Vec<String>,
}

/// Pick an item with probability proportional to its weight.
///
/// Walks the items in order subtracting weights from a uniform draw in
/// `[0, total)`; if rounding leaves the draw positive after the last item, the
/// last item is returned.
pub fn weighted_choice<'a, T>(rng: &mut Rng, items: &'a [T], weights: &[f64]) -> Option<&'a T> {
    let total: f64 = weights.iter().sum();
    let mut remaining = rng.f64() * total;

    for (item, weight) in items.iter().zip(weights) {
        remaining -= weight;
        if remaining <= 0.0 {
            return Some(item);
        }
    }

    items.last()
}

/// Repeat a pattern until it covers `length`, then cut to exactly `length`
pub fn tile_pattern<T: Clone>(pattern: &[T], length: usize) -> Vec<T> {
    if pattern.is_empty() {
        return Vec::new();
    }
    pattern.iter().cycle().take(length).cloned().collect()
}

/// Graph-walking progression generator
#[derive(Debug, Clone)]
pub struct ProgressionGenerator {
    rng: Rng,
}

impl Default for ProgressionGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressionGenerator {
    pub fn new() -> Self {
        Self { rng: Rng::new() }
    }

    /// Deterministic generator for reproducible output
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: Rng::with_seed(seed) }
    }

    /// Walk from the first declared node choosing targets uniformly
    pub fn random_walk(&mut self, graph: &TransitionGraph, length: usize) -> Vec<&'static str> {
        Self::walk(&mut self.rng, graph, length, |rng, node| {
            node.targets[rng.usize(..node.targets.len())]
        })
    }

    /// Walk from the first declared node choosing targets by weight
    pub fn weighted_walk(&mut self, graph: &TransitionGraph, length: usize) -> Vec<&'static str> {
        Self::walk(&mut self.rng, graph, length, |rng, node| {
            let weights = node.effective_weights();
            weighted_choice(rng, node.targets, &weights)
                .copied()
                .unwrap_or(node.numeral)
        })
    }

    /// Pick one pattern at random and tile it to `length`
    pub fn classic_pattern(
        &mut self,
        patterns: &[&'static [&'static str]],
        length: usize,
    ) -> Vec<&'static str> {
        if patterns.is_empty() {
            return Vec::new();
        }
        let pattern = patterns[self.rng.usize(..patterns.len())];
        tile_pattern(pattern, length)
    }

    /// Numeral sequence for a genre in the given mode
    pub fn numerals(&mut self, genre: &GenreRecord, mode: GenerationMode, length: usize) -> Vec<&'static str> {
        match mode {
            GenerationMode::Random => self.random_walk(&genre.graph, length),
            GenerationMode::Weighted => self.weighted_walk(&genre.graph, length),
            GenerationMode::Classic => self.classic_pattern(genre.classic_progressions, length),
        }
    }

    /// Generate a progression for a genre and translate it into `key`
    pub fn generate(
        &mut self,
        genre_id: &str,
        mode: GenerationMode,
        length: usize,
        key: &Key,
    ) -> Result<Progression> {
        if length == 0 {
            return Err(ChordmapError::InvalidLength(length));
        }
        let genre = catalog::genre(genre_id)?;
        let numerals = self.numerals(genre, mode, length);
        let chords = KeyTranslator::new(*key).translate(&numerals);

        debug!(genre = genre.id, %mode, length, %key, "Generated progression");

        Ok(Progression {
            genre: genre.id,
            mode,
            key: *key,
            numerals,
            chords,
        })
    }

    fn walk<F>(rng: &mut Rng, graph: &TransitionGraph, length: usize, mut choose: F) -> Vec<&'static str>
    where
        F: FnMut(&mut Rng, &GraphNode) -> &'static str,
    {
        let mut progression = Vec::with_capacity(length);
        let Some(start) = graph.start() else {
            return progression;
        };
        if length == 0 {
            return progression;
        }

        let mut current = start.numeral;
        progression.push(current);

        while progression.len() < length {
            current = match graph.node(current) {
                Some(node) if !node.targets.is_empty() => choose(rng, node),
                _ => start.numeral,
            };
            progression.push(current);
        }

        progression
    }
}
