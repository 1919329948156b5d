//! CLI argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// learnsphere - interactive learning apps from videos
#[derive(Parser, Debug)]
#[command(name = "learnsphere")]
#[command(about = "Generate an interactive learning app from a video")]
#[command(long_about = r#"
learnsphere asks a generative model to watch a video and write a spec for a
small learning app, then asks it again to implement that spec as a single,
self-contained HTML document.

EXAMPLES:
  # Generate the app and print the HTML
  learnsphere generate https://youtu.be/abc12345678 > app.html

  # Print the spec and the HTML, separated by a marker line
  learnsphere generate https://youtu.be/abc12345678 --emit both

  # Regenerate the HTML after editing the spec
  learnsphere generate https://youtu.be/abc12345678 --edit-spec better-spec.txt

  # Reuse a spec and document from an earlier run without calling the model
  learnsphere generate https://youtu.be/abc12345678 --seed-spec spec.txt --seed-code app.html

  # Run only the code stage on a spec file
  learnsphere code spec.txt

CONFIGURATION:
  Precedence: CLI flags > LEARNSPHERE_* environment > config file > defaults
  The config file is found by searching upward from the current directory for
  .learnsphere/config.toml; use --config to name one explicitly.
  The API key is read from the environment variable named by
  [llm.gemini] api_key_env (default: API_KEY).
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Model used for both generation stages
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Sampling temperature (0.0 to 2.0, default: 0.75)
    #[arg(long, global = true)]
    pub temperature: Option<f32>,

    /// Per-request timeout in seconds (default: 300, min: 5)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Generation provider (default: gemini)
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a spec and an HTML document from a video URL
    Generate {
        /// URL of the source video
        url: String,

        /// Activation token; a new value forces a fresh run for the same URL
        #[arg(long, default_value_t = 0)]
        reload_token: u64,

        /// Spec from an earlier run (requires --seed-code)
        #[arg(long, requires = "seed_code")]
        seed_spec: Option<PathBuf>,

        /// HTML from an earlier run (requires --seed-spec)
        #[arg(long, requires = "seed_spec")]
        seed_code: Option<PathBuf>,

        /// Replace the spec with this file's contents and regenerate the HTML
        #[arg(long)]
        edit_spec: Option<PathBuf>,

        /// Replace the HTML with this file's contents (no model call)
        #[arg(long)]
        edit_code: Option<PathBuf>,

        /// What to print on stdout
        #[arg(long, value_enum, default_value_t = Emit::Code)]
        emit: Emit,

        /// Print the final state snapshot as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Generate the HTML document for an existing spec
    Code {
        /// File containing the spec text
        spec_file: PathBuf,
    },

    /// Show the effective configuration and the source of each value
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Artifact selection for `generate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Emit {
    Spec,
    Code,
    Both,
    Status,
}
