use std::fmt::Display;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::{TextRange, TextSize};

/// A recovered syntax error attached to a parse result.
#[salsa::accumulator]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    message: String,
    range: TextRange,
}

impl Diagnostic {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn error(message: impl Into<String>, range: TextRange) -> Self {
        Self { message: message.into(), range }
    }

    /// Returns the same diagnostic moved to `f(range)`.
    pub fn map_range(self, f: impl FnOnce(TextRange) -> TextRange) -> Self {
        Self { message: self.message, range: f(self.range) }
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let message = Level::Error.title(&self.message).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(Level::Error.span(self.range.into()).label("here"))
                .fold(true),
        );
        renderer.render(message)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.range, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_source_snippet() {
        let text = "foo( {\n}\n";
        let diagnostic = Diagnostic::error("expected ')'", TextRange::empty(4.into()));
        let rendered = diagnostic.render(&Renderer::plain(), "test.cfg", text).to_string();

        assert!(rendered.contains("expected ')'"), "{rendered}");
        assert!(rendered.contains("test.cfg"), "{rendered}");
    }

    #[test]
    fn map_range_keeps_message() {
        let diagnostic = Diagnostic::error("expected a value", TextRange::new(2.into(), 5.into()))
            .map_range(|range| range + TextSize::from(10));

        assert_eq!(diagnostic.range(), TextRange::new(12.into(), 15.into()));
        assert_eq!(diagnostic.message(), "expected a value");
        assert_eq!(diagnostic.to_string(), "12..15: expected a value");
    }
}
