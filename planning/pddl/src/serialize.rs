//! Canonical PDDL text of the AST.
//!
//! Every node implements [`Display`] as its PDDL text, which the reader accepts back and translates
//! into an equal node. Multi-line blocks (actions, domains and problems) are indented with [`PDDL_INDENT`].

use crate::actions::{Action, DurativeAction};
use crate::expressions::{FExpression, FHead, FunctionDef, NumericExpr, Predicate, PredicateDef};
use crate::formula::{Formula, TimeSpecifier, TimedFormula};
use crate::model::{Domain, InitElement, Metric, Problem};
use crate::params::{Term, TypedArg, TypedArgList};
use env_param::EnvParam;
use itertools::Itertools;
use std::fmt::{Display, Error, Formatter};
use std::str::FromStr;

/// Indentation unit of the multi-line output.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Indent {
    Tab,
    Spaces(u8),
}

impl FromStr for Indent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("tab") {
            Ok(Indent::Tab)
        } else {
            s.parse::<u8>()
                .map(Indent::Spaces)
                .map_err(|_| format!("expected `tab` or a number of spaces, got `{s}`"))
        }
    }
}

impl Display for Indent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            Indent::Tab => write!(f, "\t"),
            Indent::Spaces(n) => write!(f, "{:width$}", "", width = *n as usize),
        }
    }
}

pub static PDDL_INDENT: EnvParam<Indent> = EnvParam::new("PDDL_INDENT", "tab");

/// Canonical PDDL text of a node, as an owned string.
pub trait AsPddl {
    fn as_pddl(&self) -> String;
}

macro_rules! as_pddl {
    ($($t:ty),* $(,)?) => {
        $(
            impl AsPddl for $t {
                fn as_pddl(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

as_pddl!(
    Term,
    TypedArg,
    TypedArgList,
    Predicate,
    PredicateDef,
    FunctionDef,
    FHead,
    NumericExpr,
    Formula,
    TimeSpecifier,
    TimedFormula,
    Action,
    DurativeAction,
    InitElement,
    Metric,
    Domain,
    Problem,
);

/// Each item preceded by a space, e.g., ` a ?x b` (empty if there are no items).
fn spaced<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    items.into_iter().map(|item| format!(" {item}")).join("")
}

impl Display for TypedArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match &self.tpe {
            Some(tpe) => write!(f, "{} - {tpe}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl Display for TypedArgList {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self.iter().join(" "))
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "({}{})", self.name, spaced(&self.args))
    }
}

impl Display for PredicateDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "({}{})", self.name, spaced(&self.params))
    }
}

impl Display for FunctionDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "({}{})", self.name, spaced(&self.params))?;
        if let Some(tpe) = &self.return_type {
            write!(f, " - {tpe}")?;
        }
        Ok(())
    }
}

impl Display for FHead {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "({}{})", self.name, spaced(&self.args))
    }
}

impl Display for FExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match &self.rhs {
            Some(rhs) => write!(f, "({} {} {rhs})", self.op, self.lhs),
            None => write!(f, "({} {})", self.op, self.lhs),
        }
    }
}

impl Display for NumericExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            NumericExpr::Number(n) => write!(f, "{n}"),
            NumericExpr::Head(h) => write!(f, "{h}"),
            NumericExpr::Op(e) => write!(f, "{e}"),
        }
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            Formula::Atom(p) => write!(f, "{p}"),
            Formula::Not(p) => write!(f, "(not {p})"),
            Formula::And(conjuncts) => write!(f, "(and{})", spaced(conjuncts)),
        }
    }
}

impl Display for TimedFormula {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self.time {
            TimeSpecifier::All => write!(f, "(over all {})", self.formula),
            time => write!(f, "(at {time} {})", self.formula),
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let i = PDDL_INDENT.get();
        writeln!(f, "(:action {}", self.name)?;
        writeln!(f, "{i}:parameters ({})", self.parameters)?;
        writeln!(f, "{i}:precondition {}", self.precondition)?;
        writeln!(f, "{i}:effect (and{})", spaced(&self.effects))?;
        write!(f, ")")
    }
}

impl Display for DurativeAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let i = PDDL_INDENT.get();
        writeln!(f, "(:durative-action {}", self.name)?;
        writeln!(f, "{i}:parameters ({})", self.parameters)?;
        if self.has_fixed_duration() {
            writeln!(f, "{i}:duration (= ?duration {})", self.duration_lower_bound)?;
        } else {
            writeln!(
                f,
                "{i}:duration (and (<= ?duration {}) (>= ?duration {}))",
                self.duration_upper_bound, self.duration_lower_bound
            )?;
        }
        writeln!(f, "{i}:condition (and{})", spaced(&self.conditions))?;
        writeln!(f, "{i}:effect (and{})", spaced(&self.effects))?;
        write!(f, ")")
    }
}

impl Display for InitElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            InitElement::Fact(fact) => write!(f, "{fact}"),
            InitElement::Assign { head, value } => write!(f, "(= {head} {value})"),
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            Metric::Minimize(e) => write!(f, "minimize {e}"),
            Metric::Maximize(e) => write!(f, "maximize {e}"),
        }
    }
}

/// Writes a section with one item per line: `(key`, the items, then `)`.
fn block<T: Display>(f: &mut Formatter<'_>, i: Indent, key: &str, items: &[T]) -> Result<(), Error> {
    writeln!(f, "{i}({key}")?;
    for item in items {
        writeln!(f, "{i}{i}{item}")?;
    }
    writeln!(f, "{i})")
}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let i = PDDL_INDENT.get();
        writeln!(f, "(define (domain {})", self.name)?;
        writeln!(f, "{i}(:requirements{})", spaced(&self.requirements))?;
        writeln!(f, "{i}(:types{})", spaced(&self.types))?;
        writeln!(f, "{i}(:constants{})", spaced(&self.constants))?;
        if !self.functions.is_empty() {
            block(f, i, ":functions", &self.functions)?;
        }
        if !self.predicates.is_empty() {
            block(f, i, ":predicates", &self.predicates)?;
        }
        for a in &self.actions {
            writeln!(f, "{a}")?;
        }
        for a in &self.durative_actions {
            writeln!(f, "{a}")?;
        }
        write!(f, ")")
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let i = PDDL_INDENT.get();
        writeln!(f, "(define (problem {})", self.name)?;
        writeln!(f, "{i}(:domain {})", self.domain_name)?;
        if !self.requirements.is_empty() {
            writeln!(f, "{i}(:requirements{})", spaced(&self.requirements))?;
        }
        writeln!(f, "{i}(:objects{})", spaced(&self.objects))?;
        block(f, i, ":init", &self.initial_facts)?;
        writeln!(f, "{i}(:goal {})", self.goal)?;
        if let Some(metric) = &self.metric {
            writeln!(f, "{i}(:metric {metric})")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expressions::{ConstantNumber, NumericOp};
    use std::sync::Arc;

    fn p(name: &str, args: &[&str]) -> Predicate {
        Predicate::new(name, args.iter().map(|a| Term::parse(*a)).collect())
    }

    #[test]
    fn indent() {
        assert_eq!("tab".parse::<Indent>(), Ok(Indent::Tab));
        assert_eq!("2".parse::<Indent>(), Ok(Indent::Spaces(2)));
        assert!("two".parse::<Indent>().is_err());
        assert_eq!(Indent::Spaces(3).to_string(), "   ");
        assert_eq!(Indent::Tab.to_string(), "\t");
    }

    #[test]
    fn formulas() {
        assert_eq!(p("handempty", &[]).as_pddl(), "(handempty)");
        let f = Formula::And(vec![Formula::Atom(p("at", &["?b", "rooma"])), Formula::Not(p("free", &["?g"]))]);
        assert_eq!(f.as_pddl(), "(and (at ?b rooma) (not (free ?g)))");
        assert_eq!(Formula::tautology().as_pddl(), "(and)");
        let timed = TimedFormula::new(TimeSpecifier::All, Formula::Atom(p("ready", &["?r"])));
        assert_eq!(timed.as_pddl(), "(over all (ready ?r))");
        let timed = TimedFormula::new(TimeSpecifier::Start, Formula::Not(p("ready", &["?r"])));
        assert_eq!(timed.as_pddl(), "(at start (not (ready ?r)))");
    }

    #[test]
    fn declarations() {
        let params = TypedArgList::new(vec![
            TypedArg::typed("?r", "robot"),
            TypedArg::typed("?l", "(either room corridor)"),
            TypedArg::untyped("?x"),
        ]);
        assert_eq!(params.as_pddl(), "?r - robot ?l - (either room corridor) ?x");
        let battery = FunctionDef {
            name: "battery".to_string(),
            params: TypedArgList::new(vec![TypedArg::typed("?r", "robot")]),
            return_type: Some("number".to_string()),
        };
        assert_eq!(battery.as_pddl(), "(battery ?r - robot) - number");
        let nullary = PredicateDef {
            name: "handempty".to_string(),
            params: TypedArgList::default(),
        };
        assert_eq!(nullary.as_pddl(), "(handempty)");
    }

    #[test]
    fn numeric_expressions() {
        assert_eq!(NumericExpr::number(5.0).as_pddl(), "5");
        assert_eq!(NumericExpr::number(2.5).as_pddl(), "2.5");
        let speed = NumericExpr::Head(FHead::new("speed", vec![Term::parse("?r")]));
        let e = NumericExpr::binary(NumericOp::Div, NumericExpr::number(10.0), speed.clone());
        assert_eq!(e.as_pddl(), "(/ 10 (speed ?r))");
        assert_eq!(NumericExpr::negation(speed).as_pddl(), "(- (speed ?r))");
        let init = InitElement::Assign {
            head: FHead::new("speed", vec![Term::parse("r1")]),
            value: ConstantNumber(3.0),
        };
        assert_eq!(init.as_pddl(), "(= (speed r1) 3)");
    }

    #[test]
    fn action_layout() {
        let a = Action {
            name: "pick".to_string(),
            parameters: TypedArgList::new(vec![TypedArg::typed("?b", "ball")]),
            precondition: Formula::Atom(p("free", &[])),
            effects: vec![Formula::Not(p("free", &[])), Formula::Atom(p("carry", &["?b"]))],
        };
        let i = PDDL_INDENT.get();
        assert_eq!(
            a.as_pddl(),
            format!(
                "(:action pick\n{i}:parameters (?b - ball)\n{i}:precondition (free)\n\
                 {i}:effect (and (not (free)) (carry ?b))\n)"
            )
        );
    }

    #[test]
    fn duration_layout() {
        let mut a = DurativeAction {
            name: "move".to_string(),
            parameters: TypedArgList::default(),
            duration_lower_bound: Arc::new(NumericExpr::number(2.0)),
            duration_upper_bound: Arc::new(NumericExpr::number(2.0)),
            conditions: vec![],
            effects: vec![TimedFormula::new(TimeSpecifier::End, Formula::Atom(p("done", &[])))],
        };
        let text = a.as_pddl();
        assert!(text.contains(":duration (= ?duration 2)\n"), "{text}");
        assert!(text.contains(":condition (and)\n"), "{text}");
        assert!(text.contains(":effect (and (at end (done)))\n"), "{text}");

        a.duration_upper_bound = Arc::new(NumericExpr::number(5.0));
        let text = a.as_pddl();
        assert!(text.contains(":duration (and (<= ?duration 5) (>= ?duration 2))\n"), "{text}");
    }

    #[test]
    fn problem_layout() {
        let problem = Problem {
            name: "p1".to_string(),
            domain_name: "gripper".to_string(),
            requirements: vec![],
            objects: TypedArgList::new(vec![TypedArg::typed("rooma", "room")]),
            initial_facts: vec![InitElement::Fact(Formula::Atom(p("at-robby", &["rooma"])))],
            goal: Formula::Atom(p("at-robby", &["rooma"])),
            metric: Some(Metric::Minimize(NumericExpr::Head(FHead::new("total-time", vec![])))),
        };
        let i = PDDL_INDENT.get();
        assert_eq!(
            problem.as_pddl(),
            format!(
                "(define (problem p1)\n{i}(:domain gripper)\n{i}(:objects rooma - room)\n\
                 {i}(:init\n{i}{i}(at-robby rooma)\n{i})\n\
                 {i}(:goal (at-robby rooma))\n{i}(:metric minimize (total-time))\n)"
            )
        );
    }
}
