use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "reelgrab")]
#[command(author, version, about = "Resolve public Instagram posts, reels and IGTV links into direct video URLs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve {
        /// Address to bind (overrides BIND_ADDR)
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Resolve a single post URL and print the result as JSON
    Resolve {
        /// Instagram post, reel or IGTV URL
        url: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
