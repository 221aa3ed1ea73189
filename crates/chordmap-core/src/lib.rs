//! chordmap-core: Genre graphs, key translation and progression generation

pub mod analysis;
pub mod catalog;
mod error;
pub mod generator;
pub mod numeral;
pub mod suggest;
pub mod theory;
pub mod translator;

pub use analysis::{analyze, chord_type_name, find_numeral_for_chord, ProgressionAnalysis};
pub use catalog::{
    chord_formula, chord_formulas, genre, genres, popular_progressions,
    GenreRecord, GraphNode, HarmonicFunction, PopularProgression, TransitionGraph,
};
pub use error::{ChordmapError, Result};
pub use generator::{GenerationMode, Progression, ProgressionGenerator};
pub use numeral::{Accidental, NumeralSuffix, NumeralToken};
pub use suggest::{initial_options, suggest_next, Recommendation, Suggestion, Suggestions};
pub use theory::{
    get_scale, scale, split_chord_name, Chord, ChordQuality, Key, Note, ScaleMode,
    NOTE_FREQUENCIES, NOTE_NAMES,
};
pub use translator::{get_diatonic_chords, translate, DiatonicChords, KeyTranslator};
