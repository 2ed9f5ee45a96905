use crate::issues::Issue;

/// Ordered, append-only record of reconciliation decisions.
///
/// Entries are only added by the reconciler itself; once a log is handed
/// out it can be read or consumed but not edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionLog {
    entries: Vec<Issue>,
}

impl CorrectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, issue: impl Into<Issue>) {
        let issue = issue.into();
        tracing::debug!("{}", issue);
        self.entries.push(issue);
    }

    pub(crate) fn extend(&mut self, other: CorrectionLog) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[Issue] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One line per entry, in order.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(Issue::to_string).collect()
    }

    pub fn into_entries(self) -> Vec<Issue> {
        self.entries
    }
}
