use crate::api::{Diagnostic, Location, Severity};

/// Ordered diagnostics of one compilation, with the source they refer to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    source: String,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.entries.extend(diagnostics);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Diagnostic> {
        self.entries.get(index)
    }

    pub fn message(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|d| d.message.as_str())
    }

    /// Line:column range of the `index`th diagnostic, if it has a span.
    pub fn location(&self, index: usize) -> Option<Location> {
        let span = self.entries.get(index)?.span.as_ref()?;
        Some(Location::from_span(&self.source, span))
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = core::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
