use crate::actions::{Action, DurativeAction};
use crate::expressions::{ConstantNumber, FHead, FunctionDef, NumericExpr, PredicateDef};
use crate::formula::Formula;
use crate::params::TypedArgList;

/// Element of the initial state of a problem.
#[derive(Clone, Debug, PartialEq)]
pub enum InitElement {
    /// A literal that holds initially
    Fact(Formula),
    /// Initial value of a numeric function, e.g., `(= (battery r1) 10)`
    Assign { head: FHead, value: ConstantNumber },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Metric {
    Minimize(NumericExpr),
    Maximize(NumericExpr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Domain {
    pub name: String,
    pub requirements: Vec<String>,
    pub types: TypedArgList,
    pub constants: TypedArgList,
    pub predicates: Vec<PredicateDef>,
    pub functions: Vec<FunctionDef>,
    pub actions: Vec<Action>,
    pub durative_actions: Vec<DurativeAction>,
}

impl Domain {
    pub fn get_action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn get_durative_action(&self, name: &str) -> Option<&DurativeAction> {
        self.durative_actions.iter().find(|a| a.name == name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Problem {
    pub name: String,
    pub domain_name: String,
    pub requirements: Vec<String>,
    pub objects: TypedArgList,
    pub initial_facts: Vec<InitElement>,
    pub goal: Formula,
    pub metric: Option<Metric>,
}

impl Problem {
    /// Literals of the initial state, ignoring the values of numeric functions.
    pub fn facts(&self) -> impl Iterator<Item = &Formula> + '_ {
        self.initial_facts.iter().filter_map(|e| match e {
            InitElement::Fact(f) => Some(f),
            InitElement::Assign { .. } => None,
        })
    }
}
