//! `submerge`: a thin CLI exercising the `submerge-base` library end to
//! end, in place of a real client-or-server executable.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "submerge", about = "Inspect submerge-base encoded files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a summary of a `.smrg` file: size, endianness, and header.
    Dump {
        path: std::path::PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Dump { path } => match submerge::inspect(&path) {
            Ok(summary) => {
                println!("path:          {}", summary.path.display());
                println!("size:          {} bytes", summary.size_bytes);
                println!("endian:        {}", summary.endian);
                println!("header version: {}", summary.version);
                println!("label:         {}", summary.header.label);
                println!("record_count:  {}", summary.header.record_count);
            }
            Err(e) => {
                eprintln!("submerge: {e:?}");
                std::process::exit(1);
            }
        },
    }
}
