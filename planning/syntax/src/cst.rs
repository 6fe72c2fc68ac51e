//! Concrete syntax tree of PDDL: every node is labelled with the grammar rule that produced it.

use crate::errors::{Span, Spanned};
use derive_more::derive::Display;
use std::borrow::Cow;
use std::fmt::{Debug, Formatter};

/// Grammar rules of PDDL.
///
/// The first group are terminal rules: nodes with one of these rules have no children and
/// hold the matched token. The others are non-terminals whose text is the text of their children.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum Rule {
    /// A literal keyword or punctuation: `(`, `)`, `and`, `not`, `:action`, `-`, ...
    Token,
    Name,
    Variable,
    Number,
    RequireKey,
    BinaryOp,
    BinaryComp,
    DurOp,
    AssignOp,
    TimeSpecifier,
    Interval,
    Optimization,

    Domain,
    DomainName,
    RequireDef,
    TypesDef,
    ConstantsDef,
    TypedNameList,
    SingleTypeNameList,
    TypedVariableList,
    SingleTypeVarList,
    Type,
    FunctionsDef,
    FunctionList,
    FunctionType,
    AtomicFunctionSkeleton,
    FunctionSymbol,
    PredicatesDef,
    AtomicFormulaSkeleton,
    Predicate,
    ConstraintsDef,
    StructureDef,
    ActionDef,
    ActionSymbol,
    ActionDefBody,
    Precondition,
    Effect,
    CEffect,
    CondEffect,
    PEffect,
    GoalDesc,
    AtomicTermFormula,
    Term,
    FunctionTerm,
    FComp,
    FExp,
    FExp2,
    FHead,
    DerivedDef,
    DurativeActionDef,
    DaDefBody,
    DurationConstraint,
    SimpleDurationConstraint,
    DurValue,
    DaGD,
    PrefTimedGD,
    TimedGD,
    DaEffect,
    TimedEffect,
    FAssignDa,
    Problem,
    ProblemDecl,
    ProblemDomain,
    ObjectDecl,
    Init,
    InitEl,
    NameLiteral,
    AtomicNameFormula,
    Goal,
    ProbConstraints,
    MetricSpec,
    /// An uninterpreted list, kept for constructs whose content is never inspected.
    Raw,
}

impl Rule {
    pub fn is_terminal(self) -> bool {
        use Rule::*;
        matches!(
            self,
            Token
                | Name
                | Variable
                | Number
                | RequireKey
                | BinaryOp
                | BinaryComp
                | DurOp
                | AssignOp
                | TimeSpecifier
                | Interval
                | Optimization
        )
    }
}

/// A node of the concrete syntax tree.
#[derive(Clone)]
pub struct Node {
    rule: Rule,
    /// Matched text of terminal nodes.
    token: Option<String>,
    children: Vec<Node>,
    span: Option<Span>,
}

impl Node {
    /// Builds a non-terminal node from its children.
    pub fn new(rule: Rule, children: Vec<Node>) -> Node {
        debug_assert!(!rule.is_terminal(), "terminal rule {rule} used for an inner node");
        Node {
            rule,
            token: None,
            children,
            span: None,
        }
    }

    /// Builds a terminal node.
    pub fn leaf(rule: Rule, text: impl Into<String>) -> Node {
        debug_assert!(rule.is_terminal(), "non-terminal rule {rule} used for a leaf");
        Node {
            rule,
            token: Some(text.into()),
            children: Vec::new(),
            span: None,
        }
    }

    /// Builds a keyword/punctuation terminal.
    pub fn token(text: impl Into<String>) -> Node {
        Node::leaf(Rule::Token, text)
    }

    pub fn with_span(mut self, span: Option<Span>) -> Node {
        self.span = span;
        self
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn is_terminal(&self) -> bool {
        self.rule.is_terminal()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child(&self, i: usize) -> Option<&Node> {
        self.children.get(i)
    }

    /// All direct children with the given rule, in order.
    pub fn children_of(&self, rule: Rule) -> impl Iterator<Item = &Node> + '_ {
        self.children.iter().filter(move |c| c.rule == rule)
    }

    /// First direct child with the given rule.
    pub fn first_of(&self, rule: Rule) -> Option<&Node> {
        self.children.iter().find(|c| c.rule == rule)
    }

    pub fn has(&self, rule: Rule) -> bool {
        self.first_of(rule).is_some()
    }

    /// Returns true if this node is the (case-insensitive) keyword token `keyword`.
    pub fn is_token(&self, keyword: &str) -> bool {
        self.rule == Rule::Token && self.token.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(keyword))
    }

    /// Raw text matched by this node.
    ///
    /// For a node read from a file, this is the exact source text. For a node built programmatically,
    /// the text is rebuilt from the terminals of the subtree.
    pub fn text(&self) -> Cow<'_, str> {
        if let Some(token) = &self.token {
            return Cow::Borrowed(token.as_str());
        }
        if let Some(span) = &self.span {
            return Cow::Borrowed(span.str());
        }
        let mut out = String::new();
        self.rebuild(&mut out);
        Cow::Owned(out)
    }

    fn rebuild(&self, out: &mut String) {
        match &self.token {
            Some(token) => {
                let glued = out.is_empty() || out.ends_with('(') || token == ")";
                if !glued {
                    out.push(' ');
                }
                out.push_str(token);
            }
            None => self.children.iter().for_each(|c| c.rebuild(out)),
        }
    }
}

impl Spanned for Node {
    fn span(&self) -> Option<&Span> {
        self.span.as_ref()
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.token {
            Some(token) => write!(f, "{}({token:?})", self.rule),
            None => {
                write!(f, "{}", self.rule)?;
                f.debug_list().entries(self.children.iter()).finish()
            }
        }
    }
}
