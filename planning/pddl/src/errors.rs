use derive_more::derive::Display;
use pddl_syntax::{Message, Node, Span, Spanned};
use thiserror::Error;

pub type Result<T, E = TranslateError> = std::result::Result<T, E>;

/// PDDL constructs that are valid syntax but have no counterpart in the AST.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum Construct {
    #[display("disjunction")]
    Disjunction,
    #[display("implication")]
    Implication,
    #[display("negation of a compound goal")]
    NegatedCompoundGoal,
    #[display("quantified condition")]
    QuantifiedCondition,
    #[display("function comparison")]
    FunctionComparison,
    #[display("preference")]
    Preference,
    #[display("conditional effect")]
    ConditionalEffect,
    #[display("quantified effect")]
    QuantifiedEffect,
    #[display("numeric effect")]
    NumericEffect,
    #[display("continuous effect")]
    ContinuousEffect,
    #[display("time-qualified duration constraint")]
    TimedDurationConstraint,
    #[display("timed initial literal")]
    TimedInitialLiteral,
    #[display("trajectory constraints")]
    TrajectoryConstraints,
    #[display("derived predicate")]
    DerivedPredicate,
}

/// Failure of the translation of a syntax tree into the AST.
///
/// Each variant holds the source text of the offending node and its location, when known.
#[derive(Error, Debug, Clone)]
pub enum TranslateError {
    #[error("unsupported {construct}: {text}")]
    UnsupportedConstruct {
        construct: Construct,
        text: String,
        span: Option<Span>,
    },
    #[error("malformed duration ({reason}): {text}")]
    MalformedDuration {
        reason: String,
        text: String,
        span: Option<Span>,
    },
    #[error("expected {expected}: {text}")]
    MalformedTerm {
        expected: String,
        text: String,
        span: Option<Span>,
    },
    #[error("missing {section} in: {text}")]
    MissingSection {
        section: String,
        text: String,
        span: Option<Span>,
    },
}

impl TranslateError {
    pub fn unsupported(construct: Construct, node: &Node) -> Self {
        TranslateError::UnsupportedConstruct {
            construct,
            text: node.text().into_owned(),
            span: node.span().cloned(),
        }
    }

    pub fn malformed_duration(reason: impl Into<String>, node: &Node) -> Self {
        TranslateError::MalformedDuration {
            reason: reason.into(),
            text: node.text().into_owned(),
            span: node.span().cloned(),
        }
    }

    pub fn malformed_term(expected: impl Into<String>, node: &Node) -> Self {
        TranslateError::MalformedTerm {
            expected: expected.into(),
            text: node.text().into_owned(),
            span: node.span().cloned(),
        }
    }

    pub fn missing_section(section: impl Into<String>, node: &Node) -> Self {
        TranslateError::MissingSection {
            section: section.into(),
            text: node.text().into_owned(),
            span: node.span().cloned(),
        }
    }

    /// Source text of the node on which the error was detected.
    pub fn text(&self) -> &str {
        match self {
            TranslateError::UnsupportedConstruct { text, .. }
            | TranslateError::MalformedDuration { text, .. }
            | TranslateError::MalformedTerm { text, .. }
            | TranslateError::MissingSection { text, .. } => text,
        }
    }

    pub fn span(&self) -> Option<&Span> {
        match self {
            TranslateError::UnsupportedConstruct { span, .. }
            | TranslateError::MalformedDuration { span, .. }
            | TranslateError::MalformedTerm { span, .. }
            | TranslateError::MissingSection { span, .. } => span.as_ref(),
        }
    }

    /// Short description of the error, used to label the source snippet.
    fn label(&self) -> String {
        match self {
            TranslateError::UnsupportedConstruct { construct, .. } => format!("{construct} is not supported"),
            TranslateError::MalformedDuration { reason, .. } => reason.clone(),
            TranslateError::MalformedTerm { expected, .. } => format!("expected {expected}"),
            TranslateError::MissingSection { section, .. } => format!("missing {section}"),
        }
    }

    /// Error message with an annotated snippet of the source, if the location of the error is known.
    pub fn to_message(&self) -> Message {
        let title = match self {
            TranslateError::UnsupportedConstruct { construct, .. } => format!("Unsupported {construct}"),
            TranslateError::MalformedDuration { .. } => "Malformed duration".to_string(),
            TranslateError::MalformedTerm { .. } => "Malformed element".to_string(),
            TranslateError::MissingSection { section, .. } => format!("Missing {section}"),
        };
        match self.span() {
            Some(span) => Message::error(title).snippet(span.error(self.label())),
            None => Message::error(self.to_string()),
        }
    }
}
