use crate::expressions::{NumericExpr, Predicate};
use crate::formula::{Formula, TimeSpecifier, TimedFormula};
use crate::params::TypedArgList;
use std::sync::Arc;

/// An instantaneous action.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    pub name: String,
    pub parameters: TypedArgList,
    pub precondition: Formula,
    pub effects: Vec<Formula>,
}

impl Action {
    /// Predicates of the precondition with the given polarity.
    pub fn get_pre(&self, positive: bool) -> Vec<&Predicate> {
        self.precondition.get_predicates(positive)
    }

    /// Predicates added (`positive = true`) or deleted by the action.
    pub fn get_eff(&self, positive: bool) -> Vec<&Predicate> {
        self.effects.iter().flat_map(|e| e.get_predicates(positive)).collect()
    }
}

/// An action with a duration, whose conditions and effects are attached to its start, its end or its whole duration.
#[derive(Clone, Debug, PartialEq)]
pub struct DurativeAction {
    pub name: String,
    pub parameters: TypedArgList,
    /// For an exact duration, lower and upper bounds are the same shared expression.
    pub duration_lower_bound: Arc<NumericExpr>,
    pub duration_upper_bound: Arc<NumericExpr>,
    pub conditions: Vec<TimedFormula>,
    pub effects: Vec<TimedFormula>,
}

fn timed_predicates(formulas: &[TimedFormula], time: TimeSpecifier, positive: bool) -> Vec<&Predicate> {
    formulas
        .iter()
        .filter(|f| f.time == time)
        .flat_map(|f| f.formula.get_predicates(positive))
        .collect()
}

impl DurativeAction {
    /// Predicates of the conditions qualified by `time`, with the given polarity.
    pub fn get_cond(&self, time: TimeSpecifier, positive: bool) -> Vec<&Predicate> {
        timed_predicates(&self.conditions, time, positive)
    }

    /// Predicates of the effects qualified by `time`, with the given polarity.
    pub fn get_eff(&self, time: TimeSpecifier, positive: bool) -> Vec<&Predicate> {
        timed_predicates(&self.effects, time, positive)
    }

    /// Returns true if the duration is fixed, i.e., both bounds have the same value.
    pub fn has_fixed_duration(&self) -> bool {
        Arc::ptr_eq(&self.duration_lower_bound, &self.duration_upper_bound)
            || self.duration_lower_bound == self.duration_upper_bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::TimeSpecifier::*;
    use crate::params::Term;

    fn p(name: &str) -> Predicate {
        Predicate::new(name, vec![])
    }

    #[test]
    fn instantaneous_queries() {
        let a = Action {
            name: "a".to_string(),
            parameters: TypedArgList::default(),
            precondition: Formula::And(vec![Formula::Atom(p("x")), Formula::Not(p("y"))]),
            effects: vec![Formula::Not(p("x")), Formula::Atom(p("y")), Formula::Atom(p("z"))],
        };
        assert_eq!(a.get_pre(true), vec![&p("x")]);
        assert_eq!(a.get_pre(false), vec![&p("y")]);
        assert_eq!(a.get_eff(true), vec![&p("y"), &p("z")]);
        assert_eq!(a.get_eff(false), vec![&p("x")]);
    }

    #[test]
    fn timed_filtering() {
        let d = Arc::new(NumericExpr::number(2.0));
        let a = DurativeAction {
            name: "da".to_string(),
            parameters: TypedArgList::default(),
            duration_lower_bound: d.clone(),
            duration_upper_bound: d,
            conditions: vec![TimedFormula::new(All, Formula::Atom(Predicate::new("ok", vec![Term::parse("?r")])))],
            effects: vec![
                TimedFormula::new(Start, Formula::Atom(p("p"))),
                TimedFormula::new(End, Formula::Not(p("p"))),
            ],
        };
        assert_eq!(a.get_eff(Start, true), vec![&p("p")]);
        assert_eq!(a.get_eff(End, false), vec![&p("p")]);
        assert!(a.get_eff(Start, false).is_empty());
        assert!(a.get_eff(End, true).is_empty());
        assert!(a.get_eff(All, true).is_empty());
        assert_eq!(a.get_cond(All, true).len(), 1);
        assert!(a.get_cond(Start, true).is_empty());
        assert!(a.has_fixed_duration());
    }
}
