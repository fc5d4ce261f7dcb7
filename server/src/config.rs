//! Server configuration.

use std::path::PathBuf;

use clap::Parser;

/// Command-line configuration for the lectern server.
#[derive(Debug, Clone, Parser)]
#[command(name = "lectern-server", about = "Grounded question-answering API")]
pub struct ServerConfig {
    /// Address to bind the listener to.
    #[arg(long, default_value = "0.0.0.0:5000")]
    pub address: String,

    /// Directory holding the persisted index unit.
    #[arg(long, default_value = "index_data")]
    pub index_dir: PathBuf,

    /// Override for the OpenAI-compatible API base URL.
    #[arg(long)]
    pub api_base: Option<String>,

    /// Override for the chat model identifier.
    #[arg(long)]
    pub chat_model: Option<String>,

    /// Number of chunks retrieved per query.
    #[arg(long, default_value_t = 5)]
    pub top_k: usize,
}
