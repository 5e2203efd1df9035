use std::borrow::Cow;
use std::path::Path;

use tracing::info;
use tracing::warn;

use super::matches_search;
use crate::constants::MSG_VOTERS_FAILED;
use crate::constants::VOTER_CSV_HEADER;
use crate::PemiraApi;
use crate::Result;
use crate::Voter;

/// Registered voters with a search filter
#[derive(Debug, Clone, Default)]
pub struct VoterRoll {
    voters: Vec<Voter>,
    search: String,
}

impl VoterRoll {
    pub fn new(voters: Vec<Voter>) -> Self {
        Self {
            voters,
            search: String::new(),
        }
    }

    /// Fetches the roll; on failure the error carries the message to show.
    pub async fn load(api: &dyn PemiraApi) -> std::result::Result<Self, String> {
        match api.list_voters().await {
            Ok(voters) => Ok(Self::new(voters)),
            Err(e) => {
                warn!("[:VoterRoll:load] {}", e);
                Err(e.user_message(MSG_VOTERS_FAILED))
            }
        }
    }

    pub fn set_search(
        &mut self,
        term: impl Into<String>,
    ) {
        self.search = term.into();
    }

    /// Voters with any field containing the search term
    pub fn filtered(&self) -> Vec<&Voter> {
        self.voters
            .iter()
            .filter(|v| v.fields().iter().any(|f| matches_search(f, &self.search)))
            .collect()
    }

    /// Count shown next to the list, after filtering
    pub fn total(&self) -> usize {
        self.filtered().len()
    }

    /// The filtered list as CSV
    pub fn to_csv(&self) -> String {
        voters_to_csv(self.filtered())
    }

    /// Writes the filtered list to `path`, returning the number of rows.
    pub async fn export(
        &self,
        path: &Path,
    ) -> Result<usize> {
        let rows = self.filtered();
        let count = rows.len();
        tokio::fs::write(path, voters_to_csv(rows)).await?;
        info!("[:VoterRoll:export] {} voters written to {}", count, path.display());
        Ok(count)
    }
}

/// Header line plus one line per voter, joined by `\n`
pub fn voters_to_csv<'a>(voters: impl IntoIterator<Item = &'a Voter>) -> String {
    let mut lines = vec![VOTER_CSV_HEADER.join(",")];
    lines.extend(voters.into_iter().map(|voter| {
        voter
            .fields()
            .iter()
            .map(|f| escape_csv_field(f))
            .collect::<Vec<_>>()
            .join(",")
    }));
    lines.join("\n")
}

/// Quotes fields containing a comma, quote or line break, doubling quotes
pub(crate) fn escape_csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
