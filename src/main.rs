use clap::Parser;
use page_digest::{CleanOutput, Digest, DigestOutput};
use std::path::Path;
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();
    if let Some(path) = args.clean.clone() {
        return clean(&args, &path).await;
    }

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("{}", e);
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    ::log::info!("Starting digest for: {}", config.seed_url);
    println!("Note: fetching requires a WebDriver server (e.g., ChromeDriver).");
    println!("Using WebDriver at {}", config.webdriver_url);

    let start_time = std::time::Instant::now();
    let output = match Digest::from_config(config).generate().await {
        Ok(output) => output,
        Err(e) => {
            // Nothing is written when the run fails
            ::log::error!("Digest failed: {}", e);
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = tokio::fs::write(&output.filename, &output.document).await {
        ::log::error!("Failed to write {}: {}", output.filename, e);
        eprintln!("Error: could not write {}: {e}", output.filename);
        return ExitCode::FAILURE;
    }

    print_summary(&output, start_time.elapsed().as_secs_f64());
    ExitCode::SUCCESS
}

/// Offline mode: re-sanitize a saved document and write the cleaned copy
async fn clean(args: &Args, path: &Path) -> ExitCode {
    let output = match args
        .clean_config()
        .and_then(|config| Digest::from_config(config).clean_file(path))
    {
        Ok(output) => output,
        Err(e) => {
            ::log::error!("Cleaning {} failed: {}", path.display(), e);
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = tokio::fs::write(&output.path, &output.document).await {
        ::log::error!("Failed to write {}: {}", output.path.display(), e);
        eprintln!("Error: could not write {}: {e}", output.path.display());
        return ExitCode::FAILURE;
    }

    print_clean_summary(&output);
    ExitCode::SUCCESS
}

fn print_summary(output: &DigestOutput, seconds: f64) {
    println!(
        "Wrote {} ({} bytes) from {} pages in {:.2} seconds",
        output.filename,
        output.document.len(),
        output.pages.len(),
        seconds
    );
    for page in &output.pages {
        println!("  [{}] {}", page.depth, page.url);
    }
    if !output.failures.is_empty() {
        println!("{} pages could not be fetched:", output.failures.len());
        for failure in &output.failures {
            println!("  {} ({})", failure.url, failure.error);
        }
    }
}

fn print_clean_summary(output: &CleanOutput) {
    println!("Original size: {} characters", output.original_chars);
    println!("Cleaned size: {} characters", output.cleaned_chars);
    println!(
        "Removed: {} characters ({:.1}%)",
        output.removed_chars(),
        output.removed_percent()
    );
    if output.matched.is_empty() {
        println!("No boilerplate detected");
    } else {
        println!("Boilerplate removed:");
        for category in &output.matched {
            println!("  {category}");
        }
    }
    println!("Wrote {}", output.path.display());
}
