use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "campus-assistant", about = "Campus Q&A assistant backed by a local knowledge base")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the starter knowledge base CSV (refuses to overwrite)
    InitSample,
    /// Rebuild the vector index from the knowledge base
    Build,
    /// Show the nearest knowledge rows for a query
    Retrieve {
        query: String,
        #[arg(short, long, default_value = "3")]
        k: usize,
    },
    /// Answer a single question
    Ask {
        query: String,
        /// Print only the answer text instead of the full JSON
        #[arg(long)]
        plain: bool,
    },
    /// Interactive session, one question per line (empty line or `exit` quits)
    Chat,
    /// Show index and answering configuration
    Info,
}
