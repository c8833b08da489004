use clap::Parser as ClapParser;
use pseudo_lang::cli::{self, CliError, RunOptions, RunOutcome};
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(ClapParser)]
#[command(name = "pseudo")]
#[command(about = "Pseudo - an interpreter for a small teaching pseudocode language")]
#[command(version)]
struct Cli {
    /// Program file to run (reads from stdin when piped and no file is given)
    file: Option<PathBuf>,

    /// Evaluate source text given directly on the command line
    #[arg(short, long, value_name = "SOURCE")]
    eval: Option<String>,

    /// Only validate syntax, don't execute
    #[arg(long)]
    check: bool,
}

fn main() {
    let cli = Cli::parse();

    let source = match load_source(&cli) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let options = RunOptions {
        source,
        syntax_only: cli.check,
    };

    match cli::execute_run(&options) {
        Ok(RunOutcome::SyntaxValid) => println!("Syntax is valid"),
        Ok(RunOutcome::Completed) => {}
        Err(e) => {
            eprintln!("{}", cli::render_error(&options.source, &e));
            std::process::exit(1);
        }
    }
}

fn load_source(cli: &Cli) -> Result<String, CliError> {
    if let Some(source) = &cli.eval {
        return Ok(source.clone());
    }
    if let Some(path) = &cli.file {
        return std::fs::read_to_string(path).map_err(CliError::Io);
    }
    if !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(CliError::Io)?;
        return Ok(buffer);
    }
    Err(CliError::NoInput)
}
