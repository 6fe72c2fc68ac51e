use super::*;
use crate::expressions::Predicate;
use crate::formula::Formula;
use crate::params::Term;

/// Translates a `Term` node, or directly one of its `Name`/`Variable` children.
pub fn translate_term(node: &Node) -> Result<Term> {
    let node = if node.rule() == Rule::Term {
        node.child(0)
            .ok_or_else(|| TranslateError::malformed_term("a term", node))?
    } else {
        node
    };
    match node.rule() {
        Rule::Variable => Ok(Term::Variable(node.text().into_owned())),
        Rule::Name => Ok(Term::Name(node.text().into_owned())),
        _ => Err(TranslateError::malformed_term("a variable or an object name", node)),
    }
}

/// Translates an atom `(p t1 t2)` of an `AtomicTermFormula` or `AtomicNameFormula` node.
pub fn translate_predicate(node: &Node) -> Result<Predicate> {
    let args = match node.rule() {
        Rule::AtomicTermFormula => node.children_of(Rule::Term).map(translate_term).collect::<Result<_>>()?,
        Rule::AtomicNameFormula => node.children_of(Rule::Name).map(translate_term).collect::<Result<_>>()?,
        _ => return Err(TranslateError::malformed_term("an atomic formula", node)),
    };
    Ok(Predicate::new(symbol_of(node, Rule::Predicate)?, args))
}

/// Translates a literal: an atom, or a node of the form `(not atom)`.
pub(super) fn translate_literal(node: &Node, atom_rule: Rule) -> Result<Formula> {
    if is_wrapper_of(node, atom_rule) {
        Ok(Formula::Atom(translate_predicate(&node.children()[0])?))
    } else if node.child(1).is_some_and(|c| c.is_token("not")) {
        match node.child(2) {
            Some(atom) if atom.rule() == atom_rule => Ok(Formula::Not(translate_predicate(atom)?)),
            _ => Err(unsupported(Construct::NegatedCompoundGoal, node)),
        }
    } else {
        Err(TranslateError::malformed_term("a literal", node))
    }
}

pub fn translate_goal_description(node: &Node) -> Result<Formula> {
    expect_rule(node, Rule::GoalDesc)?;
    if is_wrapper_of(node, Rule::AtomicTermFormula) {
        return translate_literal(node, Rule::AtomicTermFormula);
    }
    if node.has(Rule::FComp) {
        return Err(unsupported(Construct::FunctionComparison, node));
    }
    match keyword_of(node).as_deref() {
        Some("not") => translate_literal(node, Rule::AtomicTermFormula),
        Some("and") => {
            let conjuncts = node
                .children_of(Rule::GoalDesc)
                .map(translate_goal_description)
                .collect::<Result<Vec<_>>>()?;
            Ok(Formula::And(conjuncts))
        }
        Some("or") => Err(unsupported(Construct::Disjunction, node)),
        Some("imply") => Err(unsupported(Construct::Implication, node)),
        Some("exists") | Some("forall") => Err(unsupported(Construct::QuantifiedCondition, node)),
        Some("preference") => Err(unsupported(Construct::Preference, node)),
        _ => Err(TranslateError::malformed_term("a goal description", node)),
    }
}

/// Translates a `PEffect` node: a literal, possibly negated.
pub(super) fn translate_primitive_effect(node: &Node) -> Result<Formula> {
    if node.has(Rule::AssignOp) {
        return Err(unsupported(Construct::NumericEffect, node));
    }
    translate_literal(node, Rule::AtomicTermFormula)
}

/// Translates a `CEffect` node.
pub(super) fn translate_ceffect(node: &Node) -> Result<Formula> {
    expect_rule(node, Rule::CEffect)?;
    if is_wrapper_of(node, Rule::PEffect) {
        return translate_primitive_effect(&node.children()[0]);
    }
    match keyword_of(node).as_deref() {
        Some("forall") => Err(unsupported(Construct::QuantifiedEffect, node)),
        Some("when") => Err(unsupported(Construct::ConditionalEffect, node)),
        _ => Err(TranslateError::malformed_term("an effect", node)),
    }
}

/// Translates the `Effect` node of an action into the list of its effects.
pub fn translate_effect(node: &Node) -> Result<Vec<Formula>> {
    expect_rule(node, Rule::Effect)?;
    node.children_of(Rule::CEffect).map(translate_ceffect).collect()
}
