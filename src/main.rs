//! AOSP Wordlist - combined wordlist generator for the AOSP keyboard
//!
//! Main entry point for the command-line application.

use clap::Parser;
use std::process;

use aosp_wordlist::cli::Args;
use aosp_wordlist::error::WordlistError;
use aosp_wordlist::pipeline::{Pipeline, PipelineConfig};
use aosp_wordlist::progress::{print_banner, print_error, print_header, print_info};

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Set up logging; RUST_LOG still wins
    let level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // Run the application
    if let Err(e) = run(args) {
        print_error(&format!("{}", e));

        // Print chain of errors
        for cause in e.chain().skip(1) {
            print_error(&format!("  Caused by: {}", cause));
        }

        let code = e
            .downcast_ref::<WordlistError>()
            .map(WordlistError::exit_code)
            .unwrap_or(1);
        process::exit(code);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    // Print banner unless quiet mode
    if !args.quiet {
        print_banner();
    }

    // Validate arguments
    validate_args(&args)?;

    // Create pipeline configuration
    let config = PipelineConfig::from_args(&args)?;

    // Show configuration
    if !args.quiet && args.verbose {
        print_config(&config);
    }

    let mut pipeline = Pipeline::new(config);
    pipeline.run()?;

    Ok(())
}

/// Validate command-line arguments
fn validate_args(args: &Args) -> anyhow::Result<()> {
    if !args.input.is_file() {
        return Err(WordlistError::fatal(&args.input, "input file does not exist").into());
    }

    for list in [&args.profanity, &args.offensive, &args.dictionary].into_iter().flatten() {
        if !list.is_file() {
            return Err(WordlistError::fatal(list, "list file does not exist").into());
        }
    }

    if let Some(ref dir) = args.hunspell_dir {
        if !dir.is_dir() {
            anyhow::bail!("Hunspell directory does not exist: {:?}", dir);
        }
    }

    // Header fields are comma separated, one per line
    for (name, value) in [("language", &args.lang), ("description", &args.description)] {
        if value.trim().is_empty() {
            anyhow::bail!("The {} must not be empty", name);
        }
        if value.contains([',', '\n', '\r']) {
            anyhow::bail!("The {} must not contain commas or line breaks: '{}'", name, value);
        }
    }

    if args.limit == Some(0) {
        anyhow::bail!("--limit must be at least 1");
    }

    if args.floor == 0 || args.bigram_floor == 0 {
        anyhow::bail!("--floor and --bigram-floor must be between 1 and 255");
    }

    Ok(())
}

/// Print configuration summary
fn print_config(config: &PipelineConfig) {
    print_header("Configuration");

    print_info(&format!("Language:     {}", config.lang));
    print_info(&format!("Input:        {:?}", config.input));
    print_info(&format!("Output:       {:?}", config.output));
    print_info(&format!("Format:       {:?}", config.format));
    print_info(&format!(
        "Scale:        {:?} (floor {}, bigram floor {})",
        config.scale, config.floor, config.bigram_floor
    ));

    if let Some(ref path) = config.profanity {
        print_info(&format!("Profanity:    {:?}", path));
    }

    if let Some(ref path) = config.offensive {
        print_info(&format!("Offensive:    {:?}", path));
    }

    if let Some(ref path) = config.dictionary {
        print_info(&format!("Dictionary:   {:?}", path));
    }

    if let Some(limit) = config.limit {
        print_info(&format!("Limit:        {} words, {} bigrams", limit, config.bigram_limit));
    }

    print_info(&format!("Date:         {}", config.date));
    print_info(&format!("Buffer size:  {} MB", config.buffer_size / (1024 * 1024)));
}
