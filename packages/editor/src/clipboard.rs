//! Clipboard payload access

pub const MIME_HTML: &str = "text/html";
pub const MIME_PLAIN: &str = "text/plain";

/// Named clipboard buffers
pub trait ClipboardData {
    /// Available formats, in the order the source offered them
    fn types(&self) -> Vec<String>;

    fn get_data(&self, mime: &str) -> Option<String>;

    fn holds(&self, mime: &str) -> bool {
        self.types().iter().any(|kind| kind.eq_ignore_ascii_case(mime))
    }
}

/// In-memory clipboard payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimePayload {
    entries: Vec<(String, String)>,
}

impl MimePayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(markup: impl Into<String>) -> Self {
        Self::new().with(MIME_HTML, markup)
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new().with(MIME_PLAIN, text)
    }

    /// Add or replace the buffer for `mime`
    pub fn with(mut self, mime: &str, data: impl Into<String>) -> Self {
        self.set(mime, data);
        self
    }

    pub fn set(&mut self, mime: &str, data: impl Into<String>) {
        let mime = mime.to_ascii_lowercase();
        let data = data.into();
        match self.entries.iter_mut().find(|(kind, _)| *kind == mime) {
            Some(entry) => entry.1 = data,
            None => self.entries.push((mime, data)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ClipboardData for MimePayload {
    fn types(&self) -> Vec<String> {
        self.entries.iter().map(|(kind, _)| kind.clone()).collect()
    }

    fn get_data(&self, mime: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(kind, _)| kind.eq_ignore_ascii_case(mime))
            .map(|(_, data)| data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_lookup_ignores_case() {
        let payload = MimePayload::new()
            .with("Text/HTML", "<b>x</b>")
            .with(MIME_PLAIN, "x");

        assert_eq!(payload.types(), vec!["text/html".to_string(), "text/plain".to_string()]);
        assert!(payload.holds(MIME_HTML));
        assert_eq!(payload.get_data("TEXT/PLAIN"), Some("x".to_string()));
        assert_eq!(payload.get_data("text/rtf"), None);
    }

    #[test]
    fn test_set_replaces_existing_buffer() {
        let mut payload = MimePayload::plain("a");
        payload.set(MIME_PLAIN, "b");
        assert_eq!(payload.types().len(), 1);
        assert_eq!(payload.get_data(MIME_PLAIN), Some("b".to_string()));
    }
}
