use std::io;
use std::process::ExitStatus;

use thiserror::Error;

/// The queue query tool could not be run to completion.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("launching `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` exited with {status}: {stderr}")]
    NonZeroExit {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// The queue query tool produced output that is not valid JSON.
#[derive(Debug, Error)]
#[error("decoding queue snapshot: {source}")]
pub struct ParseError {
    #[from]
    source: serde_json::Error,
}

/// Everything that can end one snapshot query early. Both variants are
/// fatal to the scrape that hit them; there is no recovered path.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
