//! chordmap: Genre chord progression explorer

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chordmap")]
#[command(about = "Generate, translate and play genre chord progressions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all genres
    Genres,

    /// Show one genre's graph and classic progressions
    Genre {
        /// Genre id (pop, rock, jazz, blues, country, rnb, edm, classical)
        id: String,

        /// Print the full record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the diatonic chords of a key
    Chords {
        /// Key such as C, F#, Bb, Am or C#m
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Translate roman numerals into chords
    Translate {
        #[arg(short, long)]
        key: Option<String>,

        /// Numerals such as I V vi IV or bVII7
        #[arg(required = true)]
        numerals: Vec<String>,
    },

    /// Generate a progression by walking a genre graph
    Generate {
        #[arg(short, long)]
        genre: Option<String>,

        /// random, weighted or classic
        #[arg(short, long)]
        mode: Option<String>,

        /// Number of chords
        #[arg(short, long)]
        bars: Option<usize>,

        #[arg(short, long)]
        key: Option<String>,

        /// Seed for reproducible output
        #[arg(short, long)]
        seed: Option<u64>,

        /// Play the result on the default output device
        #[arg(short, long)]
        play: bool,

        /// Tempo in BPM for playback and WAV export
        #[arg(long)]
        bpm: Option<f64>,

        /// Render the result to a WAV file
        #[arg(long)]
        wav: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List well-known progressions
    Popular {
        /// Also translate each progression into this key
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Suggest the next chord
    Suggest {
        #[arg(short, long)]
        genre: Option<String>,

        #[arg(short, long)]
        key: Option<String>,

        /// Previous numeral; omit for opening chords
        #[arg(short, long)]
        after: Option<String>,
    },

    /// Play chords in order
    Play {
        #[arg(long)]
        bpm: Option<f64>,

        /// Chord names such as C Am F G7
        #[arg(required = true)]
        chords: Vec<String>,
    },

    /// Sound a single chord
    Preview {
        /// Chord name such as Am7 or F#dim
        chord: String,

        /// Seconds to hold the chord (default 1.0)
        #[arg(short, long)]
        duration: Option<f64>,
    },

    /// List audio output devices
    Devices,

    /// Show or update the saved defaults
    Config {
        #[arg(long)]
        genre: Option<String>,

        #[arg(long)]
        key: Option<String>,

        #[arg(long)]
        mode: Option<String>,

        #[arg(long)]
        bars: Option<usize>,

        #[arg(long)]
        bpm: Option<f64>,

        #[arg(long)]
        volume: Option<f32>,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("chordmap=info".parse()?)
            .add_directive("cpal=warn".parse()?))
        .init();

    let cli = Cli::parse();
    let config = config::load_config();

    match cli.command {
        Commands::Genres => commands::list_genres(),
        Commands::Genre { id, json } => commands::show_genre(&id, json),
        Commands::Chords { key } => commands::show_chords(&key.unwrap_or(config.key)),
        Commands::Translate { key, numerals } => {
            commands::translate_numerals(&key.unwrap_or(config.key), &numerals)
        }
        Commands::Generate { genre, mode, bars, key, seed, play, bpm, wav, json } => {
            let request = commands::GenerateRequest {
                genre: genre.unwrap_or(config.genre),
                mode: mode.unwrap_or(config.mode),
                bars: bars.unwrap_or(config.bars),
                key: key.unwrap_or(config.key),
                seed,
                play,
                bpm: bpm.unwrap_or(config.bpm),
                volume: config.volume,
                wav,
                json,
            };
            commands::generate(&request)
        }
        Commands::Popular { key } => commands::list_popular(key.as_deref()),
        Commands::Suggest { genre, key, after } => commands::suggest(
            &genre.unwrap_or(config.genre),
            &key.unwrap_or(config.key),
            after.as_deref(),
        ),
        Commands::Play { bpm, chords } => {
            commands::play(chords, bpm.unwrap_or(config.bpm), config.volume)
        }
        Commands::Preview { chord, duration } => {
            commands::preview(&chord, duration, config.volume)
        }
        Commands::Devices => commands::list_devices(),
        Commands::Config { genre, key, mode, bars, bpm, volume } => {
            let mut updated = config.clone();
            if let Some(genre) = genre {
                updated.genre = genre;
            }
            if let Some(key) = key {
                updated.key = key;
            }
            if let Some(mode) = mode {
                updated.mode = mode;
            }
            if let Some(bars) = bars {
                updated.bars = bars;
            }
            if let Some(bpm) = bpm {
                updated.bpm = bpm;
            }
            if let Some(volume) = volume {
                updated.volume = volume;
            }
            commands::update_config(&config, updated)
        }
    }
}
