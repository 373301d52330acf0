pub mod analyze;
pub mod compare;
pub mod init;
pub mod plan;
pub mod replay;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use adaptiq_core::model::ScoreHistory;
use adaptiq_core::parser;

/// Load score histories from a file or directory, failing when nothing loads.
pub(crate) fn load_histories(path: &Path) -> Result<Vec<ScoreHistory>> {
    let histories = parser::load_scores(path)?;
    anyhow::ensure!(
        !histories.is_empty(),
        "no score files found under {}",
        path.display()
    );
    Ok(histories)
}
