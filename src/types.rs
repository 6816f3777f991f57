/// One saved link as reported by GoodLinks.
///
/// Produced fresh on every enumeration; `id` is the join key against the
/// persisted sync state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub id: String,
    pub url: String,
    pub title: String,
}

impl LinkRecord {
    pub fn new(id: impl Into<String>, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            title: title.into(),
        }
    }

    /// Title cut to at most `max` characters for log output.
    pub fn short_title(&self, max: usize) -> &str {
        truncate_chars(&self.title, max)
    }
}

/// Cut `s` to at most `max` characters without splitting a UTF-8 sequence.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
        assert_eq!(truncate_chars("short", 60), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("日本語のタイトル", 3), "日本語");
        assert_eq!(truncate_chars("café", 4), "café");
    }

    #[test]
    fn test_short_title() {
        let link = LinkRecord::new("1", "https://example.com", "a".repeat(100));
        assert_eq!(link.short_title(60).len(), 60);
    }
}
