use url::Url;

/// The addressable location a store persists its token into (the URL fragment).
pub trait Location {
    /// Current fragment without the leading `#`; `None` when absent or empty.
    fn fragment(&self) -> Option<String>;

    /// Replaces the fragment in place, without adding a history entry.
    fn replace_fragment(&mut self, fragment: &str);

    /// The full location, fragment included.
    fn href(&self) -> String;
}

/// In-memory [`Location`] backed by a parsed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLocation {
    url: Url,
    replacements: usize,
}

impl MemoryLocation {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            replacements: 0,
        }
    }

    pub fn parse(href: &str) -> crate::Result<Self> {
        Ok(Self::new(Url::parse(href)?))
    }

    /// Simulates an external fragment change (back/forward, a pasted link).
    ///
    /// The owning store picks it up on its next `handle_navigation` call.
    pub fn navigate(&mut self, fragment: Option<&str>) {
        self.url.set_fragment(fragment);
    }

    /// Number of [`Location::replace_fragment`] calls so far.
    pub fn replacements(&self) -> usize {
        self.replacements
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Location for MemoryLocation {
    fn fragment(&self) -> Option<String> {
        self.url
            .fragment()
            .filter(|f| !f.is_empty())
            .map(str::to_string)
    }

    fn replace_fragment(&mut self, fragment: &str) {
        self.url.set_fragment(Some(fragment));
        self.replacements += 1;
    }

    fn href(&self) -> String {
        self.url.to_string()
    }
}
