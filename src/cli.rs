use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(about = "Startup companion: AI decision assistant, mentor search and market analysis")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive AI decision assistant
    Chat {
        /// Reply provider (canned, gemini, backend)
        #[arg(short, long)]
        provider: Option<String>,

        /// Gemini model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Ask a single question and print the reply
    Ask {
        /// The question
        text: String,

        /// Reply provider (canned, gemini, backend)
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Find mentors for a startup idea
    Mentors {
        /// Short description of the startup
        #[arg(short, long)]
        idea: String,

        /// Startup field (tech, health, finance, education, ecommerce, other)
        #[arg(short, long, default_value = "other")]
        field: String,

        /// Preferred mentor location
        #[arg(short, long)]
        location: Option<String>,
    },

    /// Analyze the market for a startup idea
    Market {
        /// Short description of the startup
        #[arg(short, long)]
        idea: String,

        /// Startup field (tech, health, finance, education, ecommerce, other)
        #[arg(short, long, default_value = "other")]
        field: String,
    },

    /// List the available founder resources
    Resources,

    /// Manage API keys
    ApiKey {
        /// Provider name (gemini)
        provider: String,

        /// Set API key for provider
        #[arg(short, long)]
        set: Option<String>,

        /// Remove API key for provider
        #[arg(short, long)]
        remove: bool,

        /// Show current API key status
        #[arg(long)]
        status: bool,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Chat {
            provider: None,
            model: None,
        }
    }
}
