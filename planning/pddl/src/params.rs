use derive_more::derive::Display;

/// A name or variable of a declaration, with an optional type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedArg {
    pub name: String,
    /// `None` for an untyped argument. An `either` type is kept as its text, e.g., `(either truck plane)`.
    pub tpe: Option<String>,
}

impl TypedArg {
    pub fn new(name: impl Into<String>, tpe: Option<String>) -> Self {
        TypedArg { name: name.into(), tpe }
    }

    pub fn typed(name: impl Into<String>, tpe: impl Into<String>) -> Self {
        TypedArg::new(name, Some(tpe.into()))
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        TypedArg::new(name, None)
    }
}

/// Ordered list of declared arguments, e.g., the parameters of an action or the objects of a problem.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypedArgList {
    pub args: Vec<TypedArg>,
}

impl TypedArgList {
    pub fn new(args: Vec<TypedArg>) -> Self {
        TypedArgList { args }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypedArg> {
        self.args.iter()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

impl From<Vec<TypedArg>> for TypedArgList {
    fn from(args: Vec<TypedArg>) -> Self {
        TypedArgList::new(args)
    }
}

impl<'a> IntoIterator for &'a TypedArgList {
    type Item = &'a TypedArg;
    type IntoIter = std::slice::Iter<'a, TypedArg>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Argument of an application: a variable (`?x`) or an object name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum Term {
    #[display("{_0}")]
    Variable(String),
    #[display("{_0}")]
    Name(String),
}

impl Term {
    /// Builds a term from its text: a leading `?` denotes a variable.
    pub fn parse(text: impl Into<String>) -> Term {
        let text = text.into();
        if text.starts_with('?') {
            Term::Variable(text)
        } else {
            Term::Name(text)
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Term::Variable(name) | Term::Name(name) => name,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }
}
