use clap::{Parser, ValueEnum};
use last30days_types::Depth;

/// What to print on stdout once the report is ready
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Emit {
    /// Terminal summary
    #[default]
    Compact,
    /// Full report as pretty JSON, raw payloads included
    Json,
    /// Markdown report
    Md,
    /// The bounded context snippet
    Context,
    /// Path of the persisted context snippet
    Path,
}

/// Sources requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourcesArg {
    /// Whatever has credentials
    #[default]
    Auto,
    Reddit,
    #[value(alias = "twitter")]
    X,
    Both,
}

#[derive(Parser, Debug)]
#[command(
    name = "last30days",
    about = "Research what Reddit and X said about a topic in the last 30 days",
    version
)]
pub struct Args {
    /// Topic to research (several words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub topic: Vec<String>,

    /// Length of the trailing window in days (defaults to research.days)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=365))]
    pub days: Option<u32>,

    /// Use embedded fixtures instead of the network
    #[arg(long)]
    pub mock: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Emit::Compact)]
    pub emit: Emit,

    /// Sources to search
    #[arg(long, value_enum, default_value_t = SourcesArg::Auto)]
    pub sources: SourcesArg,

    /// Fewer results, shorter enrichment timeouts
    #[arg(long, conflicts_with = "deep")]
    pub quick: bool,

    /// More results, longer enrichment timeouts
    #[arg(long)]
    pub deep: bool,

    /// Debug logging on stderr
    #[arg(long)]
    pub debug: bool,

    /// Also ask the caller for a generic web search
    #[arg(long)]
    pub include_web: bool,
}

impl Args {
    /// Topic words joined and trimmed; empty when only whitespace was given
    pub fn topic(&self) -> String {
        self.topic
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn depth(&self) -> Depth {
        match (self.quick, self.deep) {
            (true, _) => Depth::Quick,
            (_, true) => Depth::Deep,
            _ => Depth::Default,
        }
    }
}
