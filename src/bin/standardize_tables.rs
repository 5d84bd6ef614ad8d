//! CLI tool for the second pass over existing artifacts
//!
//! Re-parses extracted_*_enhanced.pdf.txt files and appends the
//! standardized markdown tables section. Useful when the parser improves
//! after the expensive OCR pass already ran.

use std::env;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use table_recover::{parse_artifact, standardized_section};

fn main() {
    let args: Vec<String> = env::args().collect();
    let dir = args.get(1).map(PathBuf::from).unwrap_or_else(|| ".".into());

    let artifacts = match collect_artifacts(&dir) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error reading {}: {}", dir.display(), e);
            process::exit(1);
        }
    };

    if artifacts.is_empty() {
        eprintln!("No extracted text files found in {}.", dir.display());
        process::exit(1);
    }

    for path in &artifacts {
        if let Err(e) = standardize_one(path) {
            eprintln!("Failed to append tables to {}: {}", path.display(), e);
        }
    }
}

fn collect_artifacts(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .map(|n| n.to_string_lossy())
                .is_some_and(|name| {
                    name.starts_with("extracted_") && name.ends_with("_enhanced.pdf.txt")
                })
        })
        .collect();
    files.sort();
    Ok(files)
}

fn standardize_one(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Parsing tables from {}...", path.display());

    let content = fs::read_to_string(path)?;
    let tables = parse_artifact(&content);
    if tables.is_empty() {
        println!("  No table rows parsed.");
    }

    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(standardized_section(&tables).as_bytes())?;

    println!(
        "  Integrated {} standardized table(s) into {}",
        tables.len(),
        path.display()
    );
    Ok(())
}
