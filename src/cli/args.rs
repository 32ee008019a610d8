//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Decision-tree troubleshooting walker for linac QA knowledge bases
#[derive(Parser, Debug)]
#[command(name = "diagtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (repeat for more: -d -d -d)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// Knowledge-base file (overrides config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub knowledge_base: Option<PathBuf>,

    /// Print step reports as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List troubleshooting trees
    Trees,

    /// Show a tree's questions and diagnoses
    Show {
        /// Tree name
        tree: String,
    },

    /// Walk a tree interactively
    Walk {
        /// Tree name
        tree: String,
    },

    /// Pick a tree from a free-text question and show its first prompt
    Ask {
        /// Query text, e.g. "output is drifting"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Answer one question and show where it leads
    Step {
        /// Tree name
        tree: String,
        /// Node id the answer belongs to
        node: String,
        /// Option text, exactly as listed
        answer: String,
    },

    /// Look up maintenance advice (no key lists topics)
    Maintenance {
        /// Maintenance topic key
        key: Option<String>,
    },

    /// Validate the knowledge base
    Check,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
