//! ptp-cli
//!
//! Command-line interface for talking to a ptp-router.

use std::net::Ipv4Addr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use ptprouter::client::Client;

/// ptp-router CLI
#[derive(Parser, Debug)]
#[command(name = "ptp-cli")]
#[command(about = "CLI for the peer-to-peer router")]
struct Args {
    /// Router address
    #[arg(short, long, default_value = "127.0.0.1:80")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the router version
    Version,

    /// List the addresses of every connected peer
    Members,

    /// Relay a payload to peers
    Send {
        /// Comma-separated target addresses
        #[arg(long, value_delimiter = ',', required = true)]
        to: Vec<Ipv4Addr>,

        /// The payload to relay
        payload: String,
    },

    /// Stay connected and print relayed payloads
    Listen {
        /// Stop after this many payloads
        #[arg(short, long)]
        count: Option<usize>,
    },
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> ptprouter::Result<()> {
    let mut client = Client::connect(args.server.as_str())?;

    match args.command {
        Commands::Version => {
            println!("{}", client.query_version()?);
        }
        Commands::Members => {
            for member in client.query_members()? {
                println!("{}", member);
            }
        }
        Commands::Send { to, payload } => {
            client.send_to_members(&to, payload.as_bytes())?;
            println!("sent {} bytes to {} address(es)", payload.len(), to.len());
        }
        Commands::Listen { count } => {
            let mut received = 0;
            while count.map_or(true, |limit| received < limit) {
                if let Some(mail) = client.receive_mail(Duration::from_secs(1))? {
                    println!("{}: {}", mail.sender, String::from_utf8_lossy(&mail.payload));
                    received += 1;
                }
            }
        }
    }

    Ok(())
}
