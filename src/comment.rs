use std::collections::{BTreeMap, BTreeSet};

/// Maximum length of a tag before it gets put onto a line on its own.
const MAX_INLINE_TAG_LEN: usize = 12;

/// Contents of a Ledger comment attached to a transaction, prior to being
/// formatted.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Comment {
    /// Tags that are present or not, e.g: `":TAG:"`.
    pub tags: BTreeSet<String>,
    /// Tags that have a string value, e.g: `"TAG: value"`.
    pub value_tags: BTreeMap<String, String>,
}

impl Comment {
    /// Starts declarative creation of a `Comment`.
    pub fn builder() -> CommentBuilder {
        CommentBuilder {
            comment: Comment::default(),
        }
    }

    /// Formats this `Comment` into lines of text, without the leading `;`.
    pub fn into_lines(self) -> Vec<String> {
        let mut out_lines = Vec::<String>::new();

        let (short_tags, long_tags): (Vec<String>, Vec<String>) = self
            .tags
            .into_iter()
            .map(|tag| sanitize_tag(&tag))
            .filter(|tag| !tag.is_empty())
            .partition(|tag| tag.len() <= MAX_INLINE_TAG_LEN);
        if !short_tags.is_empty() {
            out_lines.push(format!(":{}:", short_tags.join(":")));
        }
        // Put any long tags onto a line of their own.
        out_lines.extend(long_tags.into_iter().map(|tag| format!(":{}:", tag)));

        for (k, v) in self.value_tags.into_iter() {
            out_lines.push(format!("{}: {}", k.trim(), single_line(&v)));
        }

        out_lines
    }
}

/// Tags are delimited by colons and whitespace, so neither may appear within
/// one.
fn sanitize_tag(tag: &str) -> String {
    tag.chars()
        .map(|c| if c == ':' || c.is_whitespace() { '-' } else { c })
        .collect()
}

/// A value tag must fit on the line it starts on.
fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Helper to declaratively define a `Comment`.
#[derive(Clone)]
pub struct CommentBuilder {
    comment: Comment,
}

impl CommentBuilder {
    /// Builds the final `Comment`.
    pub fn build(self) -> Comment {
        self.comment
    }

    pub fn with_tags<'a, I: IntoIterator<Item = &'a String>>(mut self, tags: I) -> Self {
        self.comment.tags.extend(tags.into_iter().cloned());
        self
    }

    pub fn with_value_tags<'a, I>(mut self, value_tags: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        self.comment.value_tags.extend(
            value_tags
                .into_iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        self
    }

    #[cfg(test)]
    pub fn with_tag<K: Into<String>>(mut self, k: K) -> Self {
        self.comment.tags.insert(k.into());
        self
    }

    #[cfg(test)]
    pub fn with_value_tag<K: Into<String>, V: Into<String>>(mut self, k: K, v: V) -> Self {
        self.comment.value_tags.insert(k.into(), v.into());
        self
    }
}
