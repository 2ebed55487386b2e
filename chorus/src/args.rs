use std::path::PathBuf;

use clap::Parser;

/// Chorus TTS gateway
#[derive(Debug, Parser)]
#[command(name = "chorus", about = "Key-managing proxy gateway for upstream text-to-speech")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "chorus.toml", env = "CHORUS_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "CHORUS_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
