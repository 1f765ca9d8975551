//! # bp
//!
//! The BP interpreter binary. It loads a `.bp` source file, parses every
//! line into its AST, and runs the resulting program.

mod cli;

use cli::*;

use std::{
    error::Error,
    io::{self, Write},
    path::PathBuf,
    process,
};

use log::{error, info};

use bp_lang::{interpreter::ProgramRunner, loader};

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into())?;

    let file = match args.file {
        Some(file) => file,
        None => default_file()?,
    };

    let program = match loader::load_program(&file) {
        Ok(program) => program,
        Err(load_error) => {
            error!("{load_error}");
            process::exit(1);
        }
    };

    if args.dump_ast {
        info!("Parsed program:\n{program:#?}");
    }

    if let Err(runtime_error) = ProgramRunner::new(program).run() {
        error!("{runtime_error}");
        process::exit(1);
    }

    Ok(())
}

/// Without a CLI argument, either fall back to the well-known default
/// file name or ask the user.
fn default_file() -> Result<PathBuf, Box<dyn Error>> {
    if cfg!(feature = "run-without-input") {
        return Ok(PathBuf::from("program_code.bp"));
    }

    print!("Name the file that is to be run\n>>> ");
    io::stdout().flush()?;

    let mut name = String::new();
    io::stdin().read_line(&mut name)?;
    Ok(PathBuf::from(name.trim()))
}
