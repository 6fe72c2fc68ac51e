use std::{
    fmt::{Debug, Display},
    ops::Range,
    sync::Arc,
};

use crate::input::Input;
use annotate_snippets::*;

pub type Res<T> = Result<T, Message>;

pub type SrcRange = Range<usize>;

/// A substring of a file, with metadata for displaying (filename, indices, ...)
#[derive(Clone)]
pub struct Span {
    input: Arc<Input>,
    span: SrcRange,
}

impl Span {
    /// Span from the byte `first` to the byte `last` (both included).
    pub fn new(input: Arc<Input>, first: usize, last: usize) -> Self {
        Span {
            input,
            span: first..(last + 1),
        }
    }

    /// Smallest span containing both `self` and `other`.
    /// If the two spans are not on the same input, `self` is returned unchanged.
    pub fn merge(&self, other: &Span) -> Span {
        if !Arc::ptr_eq(&self.input, &other.input) {
            return self.clone();
        }
        Span {
            input: self.input.clone(),
            span: self.span.start.min(other.span.start)..self.span.end.max(other.span.end),
        }
    }

    pub fn str(&self) -> &str {
        &self.input.text.as_str()[self.span.clone()]
    }

    /// Span of the first character (typically an opening parenthesis).
    pub fn start(&self) -> Self {
        let first = self.span.start;
        Self {
            input: self.input.clone(),
            span: first..(first + 1),
        }
    }

    /// Span of the last character (typically a closing parenthesis).
    pub fn end(&self) -> Self {
        let last = self.span.end.saturating_sub(1).max(self.span.start);
        Self {
            input: self.input.clone(),
            span: last..(last + 1),
        }
    }

    pub fn annotate(&self, lvl: Level<'static>, message: impl ToString) -> Annot {
        Annot {
            level: lvl,
            span: self.clone(),
            message: message.to_string(),
        }
    }

    pub fn error(&self, message: impl ToString) -> Annot {
        self.annotate(Level::ERROR, message)
    }

    pub fn info(&self, message: impl ToString) -> Annot {
        self.annotate(Level::INFO, message)
    }

    pub fn invalid(&self, msg: impl ToString) -> Message {
        let msg = msg.to_string();
        // short enough to be repeated in the title
        let title = if self.span.len() < 60 {
            format!("{msg}: {}", self.str())
        } else {
            msg.clone()
        };
        Message::error(title).snippet(self.error(msg))
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}..{}]", self.span.start, self.span.end)
    }
}

/// Any syntactic element that may be attached to a location in a source file.
pub trait Spanned: Display {
    fn span(&self) -> Option<&Span>;

    fn span_or_default(&self) -> Span {
        self.span().cloned().unwrap_or_else(|| {
            let text = self.to_string();
            let len = text.len();
            Span {
                input: Arc::new(Input::from_string(text)),
                span: 0..len,
            }
        })
    }

    fn loc(&self) -> Span {
        self.span_or_default()
    }

    fn invalid(&self, msg: impl ToString) -> Message {
        self.span_or_default().invalid(msg)
    }

    fn error(&self, message: impl ToString) -> Annot {
        self.annotate(Level::ERROR, message)
    }

    fn info(&self, message: impl ToString) -> Annot {
        self.annotate(Level::INFO, message)
    }

    fn annotate(&self, lvl: Level<'static>, message: impl ToString) -> Annot {
        self.span_or_default().annotate(lvl, message)
    }
}

impl<T: Spanned> Spanned for &T {
    fn span(&self) -> Option<&Span> {
        (*self).span()
    }
}

pub struct Annot {
    level: Level<'static>,
    span: Span,
    message: String,
}

impl Annot {
    fn build(&self) -> Snippet<'_, Annotation<'_>> {
        let annotation_kind = match self.level {
            Level::ERROR => AnnotationKind::Primary,
            _ => AnnotationKind::Context,
        };
        let annotation = annotation_kind.span(self.span.span.clone()).label(&self.message);
        let snippet = Snippet::source(&self.span.input.text)
            .line_start(1)
            .fold(true)
            .annotation(annotation);
        if let Some(file) = self.span.input.source.as_ref() {
            snippet.path(file.as_str())
        } else {
            snippet
        }
    }
}

/// An error (or warning) message, with annotated snippets of the source files it refers to.
pub struct Message {
    level: Level<'static>,
    title: String,
    snippets: Vec<Annot>,
    /// Additional context, displayed after the snippets.
    context: Vec<String>,
}

impl Message {
    #[cold]
    pub fn new(level: Level<'static>, title: impl ToString) -> Self {
        Self {
            level,
            title: title.to_string(),
            snippets: Vec::new(),
            context: Vec::new(),
        }
    }

    #[cold]
    pub fn error(title: impl ToString) -> Self {
        Self::new(Level::ERROR, title)
    }

    #[cold]
    pub fn snippet(mut self, snippet: Annot) -> Self {
        self.snippets.push(snippet);
        self
    }

    #[cold]
    pub fn title(mut self, s: impl ToString) -> Message {
        self.title = s.to_string();
        self
    }

    #[cold]
    pub fn ctx(mut self, s: impl ToString) -> Message {
        self.context.push(s.to_string());
        self
    }

    pub fn get_title(&self) -> &str {
        &self.title
    }
}

pub trait Ctx<T> {
    fn title(self, error_context: impl Display) -> std::result::Result<T, Message>;
}
impl<T> Ctx<T> for std::result::Result<T, Message> {
    fn title(self, error_context: impl Display) -> Result<T, Message> {
        self.map_err(|e| e.title(error_context))
    }
}
impl<T> Ctx<T> for Option<T> {
    fn title(self, msg: impl Display) -> Result<T, Message> {
        self.ok_or_else(|| Message::error(msg))
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let renderer = Renderer::styled();
        let disp = self
            .level
            .clone()
            .primary_title(&self.title)
            .elements(self.snippets.iter().map(|s| s.build()));
        let disp = renderer.render(&[disp]);
        f.write_str(&disp)?;
        for ctx in &self.context {
            write!(f, "\n  = {ctx}")?;
        }
        Ok(())
    }
}
impl Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl<E> From<E> for Message
where
    E: std::error::Error,
{
    #[cold]
    fn from(error: E) -> Self {
        Message::error(error)
    }
}

pub trait ErrorMessageExt<T> {
    fn with_info(self, annot: impl FnOnce() -> Annot) -> Result<T, Message>;
    fn tag(self, tagged: impl Spanned, tag: impl ToString) -> Result<T, Message>;
}

impl<T> ErrorMessageExt<T> for Result<T, Message> {
    fn with_info(self, annot: impl FnOnce() -> Annot) -> Result<T, Message> {
        self.map_err(|m| m.snippet(annot()))
    }

    fn tag(self, tagged: impl Spanned, tag: impl ToString) -> Result<T, Message> {
        self.with_info(|| tagged.info(tag))
    }
}
