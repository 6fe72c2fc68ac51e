use crate::expressions::Predicate;
use derive_more::derive::Display;

/// Top-level connective of a [`Formula`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Connective {
    /// An atomic formula
    None,
    Not,
    And,
}

/// Boolean combination of predicates.
///
/// Negation only applies to atoms and disjunctions cannot be represented.
#[derive(Clone, Debug, PartialEq)]
pub enum Formula {
    Atom(Predicate),
    Not(Predicate),
    And(Vec<Formula>),
}

impl Formula {
    /// The empty conjunction, which always holds.
    pub fn tautology() -> Formula {
        Formula::And(Vec::new())
    }

    pub fn connective(&self) -> Connective {
        match self {
            Formula::Atom(_) => Connective::None,
            Formula::Not(_) => Connective::Not,
            Formula::And(_) => Connective::And,
        }
    }

    /// Predicates appearing positively (`positive = true`) or negatively in the formula, in order of appearance.
    pub fn get_predicates(&self, positive: bool) -> Vec<&Predicate> {
        let mut out = Vec::new();
        self.collect_predicates(positive, &mut out);
        out
    }

    fn collect_predicates<'a>(&'a self, positive: bool, out: &mut Vec<&'a Predicate>) {
        match self {
            Formula::Atom(p) if positive => out.push(p),
            Formula::Not(p) if !positive => out.push(p),
            Formula::Atom(_) | Formula::Not(_) => {}
            Formula::And(subs) => subs.iter().for_each(|f| f.collect_predicates(positive, out)),
        }
    }
}

/// Qualifier of a condition or effect of a durative action.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum TimeSpecifier {
    #[display("start")]
    Start,
    #[display("end")]
    End,
    /// Over the whole duration of the action
    #[display("all")]
    All,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimedFormula {
    pub time: TimeSpecifier,
    pub formula: Formula,
}

impl TimedFormula {
    pub fn new(time: TimeSpecifier, formula: Formula) -> Self {
        TimedFormula { time, formula }
    }
}
