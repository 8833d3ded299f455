use std::io::Write;
use std::sync::Arc;

use thiserror::Error;

use crate::apis::{PaperSource, SourceError};
use crate::render::render_paper;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{name} search failed")]
    Source {
        name: String,
        #[source]
        error: SourceError,
    },
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Query each source in order and print its papers as soon as they arrive.
///
/// Sources run one after another; the first failure stops the run, so later
/// sources are never queried. Papers already printed stay printed. Returns the
/// number of papers written.
pub async fn run<W: Write>(
    sources: &[Arc<dyn PaperSource>],
    query: &str,
    date: &str,
    out: &mut W,
) -> Result<usize, RunError> {
    let mut printed = 0;
    for source in sources {
        tracing::debug!(source = source.name(), "Searching");
        let papers = source
            .search(query, date)
            .await
            .map_err(|error| RunError::Source {
                name: source.name().to_string(),
                error,
            })?;
        for paper in &papers {
            render_paper(paper, out)?;
        }
        out.flush()?;
        printed += papers.len();
    }
    tracing::info!(printed, sources = sources.len(), "Run complete");
    Ok(printed)
}
