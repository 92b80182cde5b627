use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chatrelay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    /// Directory served under /static
    #[arg(long, default_value = "static")]
    pub static_dir: PathBuf,

    /// Answer with a local echo provider instead of calling the API
    #[arg(long)]
    pub mock_provider: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
