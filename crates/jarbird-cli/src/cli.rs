//! CLI argument definitions for Jarbird.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "jarbird",
    version,
    about = "Publish JVM libraries and build-tool plugins to Maven repositories",
    long_about = "Jarbird reads jarbird.toml, jarbird.properties and pom.yaml, works out what \
                  each publication uploads and where, and shows the jbPublish tasks that do it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the jbPublish task graph
    Tasks {
        /// Print the registered tasks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the POM of a publication
    Pom {
        /// Publication name, optionally with the variant folded in (libJre8)
        #[arg(long = "pub", value_name = "NAME")]
        pub_name: Option<String>,
        /// Publication variant
        #[arg(long)]
        variant: Option<String>,
        /// Print the plugin marker POM
        #[arg(long)]
        marker: bool,
    },

    /// Validate every publication and show where it would be published
    Check,
}

/// Parse command-line arguments.
pub fn parse() -> Cli {
    Cli::parse()
}
