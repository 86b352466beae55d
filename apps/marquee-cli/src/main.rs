use clap::{Parser, Subcommand};
use marquee_assets::{FontFace, MatcapSet, MatcapSlot, MatcapSource, MATCAP_COUNT};
use marquee_scene::{scatter_donuts, Scene, SceneConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const FONT_FILE: &str = "helvetiker_regular.typeface.json";

#[derive(Parser)]
#[command(name = "marquee-cli", about = "CLI tool for marquee scene inspection")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the compiled-in scene defaults
    Info,
    /// Print the deterministic donut placements for a seed
    Scatter {
        /// Placement seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Number of donuts
        #[arg(short, long, default_value = "100")]
        count: usize,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Report which assets resolve from a directory
    Assets {
        /// Directory holding matcaps/ and fonts/
        #[arg(long, default_value = "./assets")]
        dir: PathBuf,
    },
    /// Build a scene and print its mesh statistics
    Stats {
        /// Text to extrude instead of the default
        #[arg(long)]
        text: Option<String>,
        /// Placement seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Number of donuts
        #[arg(short, long, default_value = "100")]
        donuts: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let defaults = SceneConfig::default();
            println!("marquee-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("default text: {:?}", defaults.text);
            println!("default seed: {}", defaults.seed);
            println!("default donuts: {}", defaults.donut_count);
            println!("matcap slots: {MATCAP_COUNT}");
        }
        Commands::Scatter { seed, count, json } => {
            let placements = scatter_donuts(seed, count);
            if json {
                println!("{}", serde_json::to_string_pretty(&placements)?);
            } else {
                println!("Scatter: seed={seed}, count={count}");
                for (i, t) in placements.iter().enumerate() {
                    println!(
                        "{i:3}: pos=({:+.3}, {:+.3}, {:+.3})  scale={:.3}",
                        t.position.x, t.position.y, t.position.z, t.scale.x
                    );
                }
            }
        }
        Commands::Assets { dir } => {
            let matcaps = MatcapSet::load(&dir);
            println!("Assets in {}", dir.display());
            for slot in MatcapSlot::all() {
                match matcaps.source(slot) {
                    MatcapSource::File(path) => println!("{slot}: {}", path.display()),
                    MatcapSource::Procedural => println!("{slot}: procedural fallback"),
                }
            }
            println!(
                "matcaps from disk: {}/{}",
                matcaps.file_count(),
                MATCAP_COUNT
            );

            let font_path = dir.join("fonts").join(FONT_FILE);
            match FontFace::load(&font_path) {
                Ok(face) => println!(
                    "font: {} ({} glyphs) from {}",
                    face.family(),
                    face.glyph_count(),
                    font_path.display()
                ),
                Err(e) => {
                    let face = FontFace::builtin();
                    println!("font: {} unavailable ({e})", font_path.display());
                    println!(
                        "font fallback: {} ({} glyphs)",
                        face.family(),
                        face.glyph_count()
                    );
                }
            }
        }
        Commands::Stats { text, seed, donuts } => {
            let mut config = SceneConfig::default();
            if let Some(text) = text {
                config.text = text;
            }
            config.seed = seed;
            config.donut_count = donuts;

            let scene = Scene::build(&FontFace::builtin(), &config)?;
            let stats = scene.stats();
            println!("Scene for {:?} (seed {seed})", config.text);
            println!("{stats}");
        }
    }

    Ok(())
}
