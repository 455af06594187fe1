//! Spatial Engine CLI
//!
//! Usage:
//!   spatial-engine [OPTIONS] [FILE]
//!
//! Options:
//!   -s, --scene <FILE>  Scene configuration (TOML); defaults to underground parking
//!   -c, --check         Print the violation report instead of the layout
//!   -r, --raw           Normalize only; skip the post-process pipeline
//!   --list-passes       List available passes and the scene's pipeline
//!   -h, --help          Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;

use spatial_engine::{wire, Engine, IdGenerator, PassRegistry, Scene};

#[derive(Parser)]
#[command(name = "spatial-engine")]
#[command(about = "Validate, complete and score 2-D facility layouts")]
struct Cli {
    /// Layout JSON file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Scene configuration file (TOML format)
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Print violations and score instead of the processed layout
    #[arg(short, long)]
    check: bool,

    /// Skip the post-process pipeline
    #[arg(short, long)]
    raw: bool,

    /// List available passes and the scene's pipeline
    #[arg(long)]
    list_passes: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let scene = match &cli.scene {
        Some(path) => match Scene::from_file(path) {
            Ok(scene) => scene,
            Err(e) => {
                eprintln!("Error loading scene '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Scene::parking(),
    };

    let engine = match Engine::new(scene) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.list_passes {
        print_passes(&engine);
        return;
    }

    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let layout = match wire::decode_layout(&source, engine.scene(), &mut IdGenerator::new()) {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let processed = if cli.raw {
        engine.scene().normalize(&layout)
    } else {
        engine.prepare(&layout)
    };

    if cli.check {
        println!("{}", engine.check(&processed));
        return;
    }

    match serde_json::to_string_pretty(&processed.rounded()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_passes(engine: &Engine) {
    println!("Available passes:");
    for name in PassRegistry::builtin().names() {
        println!("  {}", name);
    }
    println!();
    println!("Pipeline for scene '{}':", engine.scene().id);
    for (index, name) in engine.pipeline().names().iter().enumerate() {
        println!("  {}. {}", index + 1, name);
    }
}

fn print_intro() {
    println!(
        r#"Spatial Engine - constraint checking for 2-D facility layouts

USAGE:
    spatial-engine [OPTIONS] [FILE]
    cat layout.json | spatial-engine

OPTIONS:
    -s, --scene        Scene configuration (TOML file)
    -c, --check        Print violations and score
    -r, --raw          Skip the post-process pipeline
    --list-passes      List passes and the scene pipeline
    -h, --help         Print help

INPUT:
    {{"width": 800, "height": 600, "elements": [
        {{"id": "w1", "t": "wall", "x": 0, "y": 0, "w": 800, "h": 10}}
    ]}}

Set RUST_LOG=debug to trace each pipeline pass."#
    );
}
