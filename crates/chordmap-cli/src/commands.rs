//! Subcommand handlers

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use chordmap_core::{
    analyze, catalog, chord_type_name, genres, get_diatonic_chords, initial_options,
    popular_progressions, split_chord_name, suggest_next, translate, GenerationMode, Key,
    ProgressionGenerator, Suggestion,
};
use chordmap_services::{
    chord_frequencies, render_progression, AudioEngine, AudioOutputService, PlaybackStep,
    DEFAULT_CHORD_DURATION, DEFAULT_OCTAVE, DEFAULT_SAMPLE_RATE,
};
use serde_json::json;
use tracing::info;

use crate::config::{save_config, Config};

fn parse_key(key: &str) -> anyhow::Result<Key> {
    Key::parse(key).with_context(|| format!("invalid key '{key}'"))
}

pub fn list_genres() -> anyhow::Result<()> {
    for genre in genres() {
        println!("{:<10} {:<10} {}", genre.id, genre.name, genre.usage);
    }
    Ok(())
}

pub fn show_genre(id: &str, as_json: bool) -> anyhow::Result<()> {
    let genre = catalog::genre(id)?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(genre)?);
        return Ok(());
    }

    println!("{} ({})", genre.name, genre.id);
    println!("{}", genre.description);
    println!();
    for line in genre.characteristics {
        println!("  - {line}");
    }

    println!();
    println!("Transitions:");
    for node in genre.graph.nodes() {
        let targets: Vec<String> = node
            .targets
            .iter()
            .zip(node.effective_weights())
            .map(|(target, weight)| format!("{target} ({weight:.0})"))
            .collect();
        println!("  {:<8} [{}] -> {}", node.numeral, node.function.name(), targets.join(", "));
    }

    println!();
    println!("Classic progressions:");
    for pattern in genre.classic_progressions {
        println!("  {}", pattern.join(" - "));
    }
    println!();
    println!("Suits: {}", genre.usage);
    Ok(())
}

pub fn show_chords(key: &str) -> anyhow::Result<()> {
    let key = parse_key(key)?;
    println!("Diatonic chords in {key}:");
    for (numeral, chord) in get_diatonic_chords(&key).iter() {
        println!("  {:<5} {:<6} {}", numeral, chord.to_string(), chord.quality.name());
    }
    Ok(())
}

pub fn translate_numerals(key: &str, numerals: &[String]) -> anyhow::Result<()> {
    let key = parse_key(key)?;
    let chords = translate(numerals, &key);
    println!("{}", chords.join(" "));
    Ok(())
}

pub struct GenerateRequest {
    pub genre: String,
    pub mode: String,
    pub bars: usize,
    pub key: String,
    pub seed: Option<u64>,
    pub play: bool,
    pub bpm: f64,
    pub volume: f32,
    pub wav: Option<PathBuf>,
    pub json: bool,
}

pub fn generate(request: &GenerateRequest) -> anyhow::Result<()> {
    let key = parse_key(&request.key)?;
    let mode: GenerationMode = request.mode.parse()?;
    let mut generator = match request.seed {
        Some(seed) => ProgressionGenerator::with_seed(seed),
        None => ProgressionGenerator::new(),
    };

    let progression = generator.generate(&request.genre, mode, request.bars, &key)?;
    let analysis = analyze(progression.numerals.as_slice(), progression.chords.as_slice());
    let genre = catalog::genre(progression.genre)?;

    if request.json {
        let value = json!({
            "genre": progression.genre,
            "mode": progression.mode,
            "key": progression.key.to_string(),
            "numerals": progression.numerals,
            "chords": progression.chords,
            "analysis": analysis,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{} / {} / {}", genre.name, progression.mode, progression.key);
        println!("  {}", progression.numerals.join(" - "));
        println!("  {}", progression.chords.join(" - "));
        println!(
            "  {} unique chords, {} tonic, {} dominant",
            analysis.unique_chords, analysis.tonic_count, analysis.dominant_count
        );
        println!("  Suits: {}", genre.usage);
    }

    if let Some(path) = &request.wav {
        let samples = render_progression(progression.chords.as_slice(), request.bpm, DEFAULT_SAMPLE_RATE)?;
        AudioOutputService::write_wav(path, &samples, DEFAULT_SAMPLE_RATE)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    if request.play {
        play(progression.chords, request.bpm, request.volume)?;
    }
    Ok(())
}

pub fn list_popular(key: Option<&str>) -> anyhow::Result<()> {
    let key = key.map(parse_key).transpose()?;
    for progression in popular_progressions() {
        println!("{} [{}]", progression.name, progression.genre);
        print!("  {}", progression.numerals.join(" - "));
        if let Some(key) = &key {
            print!("  =>  {}", translate(progression.numerals, key).join(" - "));
        }
        println!();
        println!("  {}", progression.description);
        println!("  e.g. {}", progression.songs.join(", "));
    }
    Ok(())
}

fn print_suggestion(suggestion: &Suggestion) {
    let (_, suffix) = split_chord_name(&suggestion.chord);
    let weight = suggestion
        .weight
        .map(|w| format!("{w:.0}"))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {:<8} {:<7} {:>4}  {:<18} {:?}",
        suggestion.numeral,
        suggestion.chord,
        weight,
        chord_type_name(suffix),
        suggestion.recommendation
    );
}

pub fn suggest(genre: &str, key: &str, after: Option<&str>) -> anyhow::Result<()> {
    let genre = catalog::genre(genre)?;
    let key = parse_key(key)?;

    let Some(last) = after else {
        println!("Opening chords for {} in {key}:", genre.name);
        for suggestion in initial_options(genre, &key) {
            print_suggestion(&suggestion);
        }
        return Ok(());
    };

    let suggestions = suggest_next(genre, &key, last);
    println!("After {last}: {}", suggestions.explanation());
    println!("Likely next:");
    for suggestion in &suggestions.primary {
        print_suggestion(suggestion);
    }
    if !suggestions.others.is_empty() {
        println!("Also possible:");
        for suggestion in &suggestions.others {
            print_suggestion(suggestion);
        }
    }
    Ok(())
}

pub fn play(chords: Vec<String>, bpm: f64, volume: f32) -> anyhow::Result<()> {
    if chords.is_empty() {
        bail!("nothing to play");
    }

    let mut engine = AudioEngine::new();
    engine.set_volume(volume);
    engine.start().context("opening audio output")?;

    let handle = engine.play_progression(chords, bpm, |step| match step {
        PlaybackStep::Chord { chord, index } => println!("{:>3}  {chord}", index + 1),
        PlaybackStep::Finished => println!("done"),
    })?;
    handle.wait();

    // let the last release ring out before the stream closes
    std::thread::sleep(Duration::from_millis(150));
    engine.stop()?;
    Ok(())
}

/// Sound one chord, by default for the standard preview length
pub fn preview(chord: &str, duration: Option<f64>, volume: f32) -> anyhow::Result<()> {
    let hold = duration.unwrap_or(DEFAULT_CHORD_DURATION);
    if !hold.is_finite() || hold <= 0.0 {
        bail!("duration must be a positive number of seconds");
    }

    let frequencies: Vec<String> = chord_frequencies(chord, DEFAULT_OCTAVE)
        .iter()
        .map(|f| format!("{f:.2}"))
        .collect();
    if frequencies.is_empty() {
        bail!("cannot play '{chord}': unknown root note");
    }
    println!("{chord}: {} Hz", frequencies.join(", "));

    let mut engine = AudioEngine::new();
    engine.set_volume(volume);
    engine.start().context("opening audio output")?;
    match duration {
        Some(seconds) => engine.play_chord(chord, seconds),
        None => engine.preview_chord(chord),
    }

    let hold = Duration::try_from_secs_f64(hold).context("duration out of range")?;
    std::thread::sleep(hold + Duration::from_millis(150));
    engine.stop()?;
    Ok(())
}

pub fn list_devices() -> anyhow::Result<()> {
    match AudioOutputService::default_device_info() {
        Ok(info) => println!(
            "Default: {} ({} Hz, {} channels)",
            info.name, info.sample_rate, info.channels
        ),
        Err(e) => println!("Default: none ({e})"),
    }
    for name in AudioOutputService::output_device_names()? {
        println!("  {name}");
    }
    Ok(())
}

pub fn update_config(current: &Config, updated: Config) -> anyhow::Result<()> {
    if &updated != current {
        parse_key(&updated.key)?;
        updated.mode.parse::<GenerationMode>()?;
        catalog::genre(&updated.genre)?;
        let path = save_config(&updated)?;
        info!(path = %path.display(), "Saved config");
    }
    print!("{}", toml::to_string_pretty(&updated)?);
    Ok(())
}
