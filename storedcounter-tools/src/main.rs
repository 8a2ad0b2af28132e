//! A set of tools for storedcounter.

mod error;
pub(crate) use error::{Error, Result};

mod ops;
mod stress;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Next(ops::CounterArgs),
    Get(ops::CounterArgs),
    Set(ops::SetArgs),
    Stress(stress::Args),
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    match args.cmd {
        Commands::Next(args) => println!("{}", ops::next(&args)?),
        Commands::Get(args) => println!("{}", ops::get(&args)?),
        Commands::Set(args) => ops::set(&args)?,
        Commands::Stress(args) => stress::run(args)?,
    }
    Ok(())
}
