#![allow(clippy::print_stdout, clippy::print_stderr)]
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "schemafix", about = "Validate JSON documents and repair them to fit a schema.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that a schema document is itself well-formed.
    ValidateSchema {
        /// Path to the schema, or `-` for stdin.
        schema: PathBuf,
    },
    /// Validate a document against a schema.
    Validate {
        schema: PathBuf,
        /// Path to the document, or `-` for stdin.
        document: PathBuf,
    },
    /// Print the RFC 6902 patch that makes the document conform.
    Patch {
        schema: PathBuf,
        document: PathBuf,
    },
    /// Apply the corrective patch and print the updated document.
    Update {
        schema: PathBuf,
        document: PathBuf,
    },
}

fn read_input(path: &PathBuf) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read_to_string(path)
    }
}

fn run(command: &Command) -> Result<String, String> {
    let load = |path: &PathBuf| {
        read_input(path).map_err(|error| format!("cannot read {}: {error}", path.display()))
    };
    match command {
        Command::ValidateSchema { schema } => {
            schemafix::ops::validate_schema(&load(schema)?).map_err(|error| error.to_string())?;
            Ok("schema is valid".to_string())
        }
        Command::Validate { schema, document } => {
            schemafix::ops::validate(&load(schema)?, &load(document)?)
                .map_err(|error| error.to_string())?;
            Ok("document is valid".to_string())
        }
        Command::Patch { schema, document } => {
            schemafix::ops::patch(&load(schema)?, &load(document)?)
                .map_err(|error| error.to_string())
        }
        Command::Update { schema, document } => {
            schemafix::ops::update(&load(schema)?, &load(document)?)
                .map_err(|error| error.to_string())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli.command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
