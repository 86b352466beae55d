use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use marquee_assets::{MatcapSet, MatcapSlot};

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for marquee")]
struct Cli {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Run fmt, clippy, tests, and doc in one go
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Write the built-in matcaps as PNGs into an assets directory
    BakeMatcaps {
        /// Target assets directory; textures land in <dir>/matcaps/
        #[arg(long, default_value = "./assets")]
        dir: PathBuf,
    },
}

const FMT: &[&str] = &["fmt", "--all", "--", "--check"];
const CLIPPY: &[&str] = &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"];
const TEST: &[&str] = &["test", "--workspace"];
const DOC: &[&str] = &["doc", "--workspace", "--no-deps"];
const BUILD: &[&str] = &["build", "--workspace"];

fn main() -> Result<()> {
    match Cli::parse().command {
        Task::Check => {
            for step in [FMT, CLIPPY, TEST, DOC] {
                cargo(step)?;
            }
        }
        Task::Fmt => cargo(FMT)?,
        Task::Clippy => cargo(CLIPPY)?,
        Task::Test => cargo(TEST)?,
        Task::Doc => cargo(DOC)?,
        Task::Build => cargo(BUILD)?,
        Task::BakeMatcaps { dir } => bake_matcaps(&dir)?,
    }
    Ok(())
}

fn cargo(args: &[&str]) -> Result<()> {
    println!("==> cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        bail!("cargo {} failed", args[0]);
    }
    Ok(())
}

/// Bake the eight procedural matcaps to `<dir>/matcaps/1.png .. 8.png` so
/// the apps have real files to load and a starting point for replacements.
fn bake_matcaps(dir: &Path) -> Result<()> {
    let out = dir.join("matcaps");
    fs::create_dir_all(&out).with_context(|| format!("create {}", out.display()))?;
    let set = MatcapSet::procedural();
    for slot in MatcapSlot::all() {
        let tex = set.texture(slot);
        let path = out.join(format!("{}.png", slot.index() + 1));
        image::save_buffer(
            &path,
            tex.pixels(),
            tex.width(),
            tex.height(),
            image::ColorType::Rgba8,
        )
        .with_context(|| format!("write {}", path.display()))?;
        println!("baked {}", path.display());
    }
    Ok(())
}
