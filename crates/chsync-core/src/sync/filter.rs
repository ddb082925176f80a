use chsync_fs::slugify;

/// Restricts a workflow to a subset of channels.
///
/// An entry matches a channel by exact name or by directory slug. An empty
/// filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelFilter {
    entries: Vec<String>,
}

impl ChannelFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_all(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn matches(&self, name: &str, slug: &str) -> bool {
        self.is_all()
            || self
                .entries
                .iter()
                .any(|entry| entry == name || entry == slug || slugify(entry) == slug)
    }
}
