//! CLI tool for the full table recovery run

use rayon::prelude::*;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use table_recover::{process_document, StrategyRegistry, TesseractOcr};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <pdf_file_or_dir> [output_dir]", args[0]);
        eprintln!();
        eprintln!("Recovers image-based tables from research-paper PDFs.");
        eprintln!("Writes extracted_<name>_enhanced.pdf.txt per input, including");
        eprintln!("the standardized markdown tables section.");
        process::exit(1);
    }

    let input = PathBuf::from(&args[1]);
    let output_dir = args.get(2).map(PathBuf::from).unwrap_or_else(|| ".".into());

    let pdfs: Vec<PathBuf> = if input.is_dir() {
        match collect_pdfs(&input) {
            Ok(pdfs) => pdfs,
            Err(e) => {
                eprintln!("Error reading {}: {}", input.display(), e);
                process::exit(1);
            }
        }
    } else {
        vec![input]
    };

    if pdfs.is_empty() {
        eprintln!("No PDF files found.");
        process::exit(1);
    }

    println!("Found {} PDF(s) to process.", pdfs.len());

    let failures: usize = pdfs
        .par_iter()
        .map(|pdf| match process_one(pdf, &output_dir) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error processing {}: {}", pdf.display(), e);
                1
            }
        })
        .sum();

    if failures > 0 {
        eprintln!("{failures} document(s) failed.");
        process::exit(1);
    }
}

fn collect_pdfs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut pdfs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    pdfs.sort();
    Ok(pdfs)
}

fn process_one(pdf: &Path, output_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let output_path = output_dir.join(format!("extracted_{stem}_enhanced.pdf.txt"));

    println!("Processing {} -> {}", pdf.display(), output_path.display());

    let strategies = StrategyRegistry::new();
    let ocr = TesseractOcr::default();
    let outcome = process_document(pdf, &strategies, &ocr)?;

    for line in &outcome.report.log {
        println!("{line}");
    }

    fs::write(&output_path, &outcome.artifact)?;

    println!("Successfully processed {}", pdf.display());
    println!("  Total Tables: {}", outcome.report.total_tables);
    println!("  Image Tables: {}", outcome.report.image_tables);
    println!("  Standardized Tables: {}", outcome.tables.len());
    Ok(())
}
