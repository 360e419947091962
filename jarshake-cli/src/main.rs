//! Command-line front end for the jarshake classpath tree-shaker.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{debug, info};

use jarshake::{analyze, rewrite, write_archive, ClasspathIndex, RootSignature};

/// Shrink a JVM classpath to the declarations reachable from root signatures.
#[derive(Parser)]
#[command(name = "jarshake", version, about)]
struct Cli {
    /// Classpath archives, ':' (Unix) or ';' (Windows) separated; first archive
    /// containing a class wins
    #[arg(long = "classpath", short = 'c', visible_alias = "cp")]
    classpath: String,

    /// Path to a file with root signatures, one per line
    #[arg(long = "roots")]
    roots: PathBuf,

    /// Output archive path
    #[arg(long = "output", short = 'o')]
    output: PathBuf,

    /// Enable debug logging
    #[arg(long = "verbose", short = 'v')]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })
    .expect("failed to set Ctrl+C handler");

    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_module("jarshake", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let archives: Vec<PathBuf> = std::env::split_paths(&cli.classpath).collect();
    debug!("classpath: {} entries", archives.len());

    let index = ClasspathIndex::new(&archives)
        .with_context(|| format!("failed to index classpath {}", cli.classpath))?;
    println!(
        "Classpath: {} archives, {} classes; first archive wins for duplicates",
        index.archive_count(),
        index.class_count()
    );

    let roots_text = std::fs::read_to_string(&cli.roots)
        .with_context(|| format!("failed to read roots file {}", cli.roots.display()))?;
    let roots = RootSignature::parse_list(&roots_text);
    println!("Roots: {}", roots.len());

    let kept = analyze(&index, &roots);
    info!(
        "reachability fixpoint: {} classes, {} fields, {} methods",
        kept.classes().len(),
        kept.fields.len(),
        kept.methods.len()
    );

    let classes = rewrite(&kept, &index);
    println!(
        "Retained: {} classes, {} fields, {} methods",
        classes.len(),
        kept.fields.len(),
        kept.methods.len()
    );

    write_archive(&cli.output, &classes)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    println!("Wrote {}", cli.output.display());

    Ok(())
}
