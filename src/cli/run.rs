//! Parse and execute pseudo-lang programs

use super::CliError;
use crate::{Evaluator, Lexer, Parser};

/// Options for the run command
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// The program source text
    pub source: String,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
}

/// Result of a run operation
#[derive(Debug)]
pub enum RunOutcome {
    /// Syntax validation passed
    SyntaxValid,
    /// The program ran to completion; all output went through `DISPLAY`
    Completed,
}

/// Parse and (unless `syntax_only`) run a program
pub fn execute_run(options: &RunOptions) -> Result<RunOutcome, CliError> {
    let lexer = Lexer::new(&options.source);
    let mut parser = Parser::new(lexer).map_err(CliError::Parse)?;
    let program = parser.parse_program().map_err(CliError::Parse)?;

    if options.syntax_only {
        return Ok(RunOutcome::SyntaxValid);
    }

    let mut evaluator = Evaluator::new(&options.source);
    evaluator.run(&program).map_err(CliError::Runtime)?;
    Ok(RunOutcome::Completed)
}
