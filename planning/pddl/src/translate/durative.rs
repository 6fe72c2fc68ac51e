use super::goals::{translate_ceffect, translate_primitive_effect};
use super::numeric::translate_number;
use super::*;
use crate::actions::DurativeAction;
use crate::expressions::NumericExpr;
use crate::formula::{TimeSpecifier, TimedFormula};
use std::sync::Arc;

/// Direction of a simple duration constraint `(op ?duration v)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum DurOp {
    Eq,
    Le,
    Ge,
}

fn translate_dur_value(node: &Node) -> Result<NumericExpr> {
    match node.children() {
        [n] if n.rule() == Rule::Number => Ok(NumericExpr::Number(translate_number(n)?)),
        [e] if e.rule() == Rule::FExp => translate_numeric_expression(e),
        _ => Err(TranslateError::malformed_term("a duration value", node)),
    }
}

fn translate_simple_duration_constraint(node: &Node) -> Result<(DurOp, NumericExpr)> {
    expect_rule(node, Rule::SimpleDurationConstraint)?;
    if node.has(Rule::TimeSpecifier) {
        return Err(unsupported(Construct::TimedDurationConstraint, node));
    }
    let op_node = required(node, Rule::DurOp)?;
    let op = match &*op_node.text() {
        "=" => DurOp::Eq,
        "<=" => DurOp::Le,
        ">=" => DurOp::Ge,
        _ => return Err(TranslateError::malformed_duration("unknown comparison operator", op_node)),
    };
    let value = translate_dur_value(required(node, Rule::DurValue)?)?;
    Ok((op, value))
}

/// Translates a duration constraint into the pair `(lower_bound, upper_bound)`.
///
/// An exact duration `(= ?duration v)` yields the same shared value for both bounds. Otherwise
/// the constraint must be made of exactly one `>=` bound and one `<=` bound, in any order.
pub fn translate_duration_constraint(node: &Node) -> Result<(Arc<NumericExpr>, Arc<NumericExpr>)> {
    expect_rule(node, Rule::DurationConstraint)?;
    let constraints = node
        .children_of(Rule::SimpleDurationConstraint)
        .map(translate_simple_duration_constraint)
        .collect::<Result<Vec<_>>>()?;
    let mut constraints = constraints.into_iter();
    match (constraints.next(), constraints.next(), constraints.next()) {
        (Some((DurOp::Eq, value)), None, None) => {
            let value = Arc::new(value);
            Ok((value.clone(), value))
        }
        (Some((DurOp::Ge, lb)), Some((DurOp::Le, ub)), None) | (Some((DurOp::Le, ub)), Some((DurOp::Ge, lb)), None) => {
            Ok((Arc::new(lb), Arc::new(ub)))
        }
        (None, _, _) => Err(TranslateError::malformed_duration("no duration constraint", node)),
        (Some(_), None, None) => Err(TranslateError::malformed_duration(
            "a single inequality does not bound the duration on both sides",
            node,
        )),
        (Some(_), Some(_), None) => Err(TranslateError::malformed_duration(
            "expected one `<=` and one `>=` constraint",
            node,
        )),
        _ => Err(TranslateError::malformed_duration("more than two constraints", node)),
    }
}

fn translate_time_specifier(node: &Node) -> Result<TimeSpecifier> {
    match node.text().to_ascii_lowercase().as_str() {
        "start" => Ok(TimeSpecifier::Start),
        "end" => Ok(TimeSpecifier::End),
        "all" => Ok(TimeSpecifier::All),
        _ => Err(TranslateError::malformed_term("`start`, `end` or `all`", node)),
    }
}

/// Translates a `TimedGD` node: `(at start g)`, `(at end g)` or `(over all g)`.
fn translate_timed_gd(node: &Node) -> Result<TimedFormula> {
    expect_rule(node, Rule::TimedGD)?;
    let qualifier = node
        .first_of(Rule::Interval)
        .or_else(|| node.first_of(Rule::TimeSpecifier))
        .ok_or_else(|| TranslateError::malformed_term("a time qualifier", node))?;
    let time = translate_time_specifier(qualifier)?;
    let formula = translate_goal_description(required(node, Rule::GoalDesc)?)?;
    Ok(TimedFormula::new(time, formula))
}

/// Translates the condition of a durative action into the list of its timed conditions.
/// Nested conjunctions are flattened.
pub fn translate_timed_condition(node: &Node) -> Result<Vec<TimedFormula>> {
    expect_rule(node, Rule::DaGD)?;
    if is_wrapper_of(node, Rule::PrefTimedGD) {
        let pref = &node.children()[0];
        return if is_wrapper_of(pref, Rule::TimedGD) {
            Ok(vec![translate_timed_gd(&pref.children()[0])?])
        } else {
            Err(unsupported(Construct::Preference, pref))
        };
    }
    match keyword_of(node).as_deref() {
        Some("and") => {
            let mut conditions = Vec::new();
            for sub in node.children_of(Rule::DaGD) {
                conditions.extend(translate_timed_condition(sub)?);
            }
            Ok(conditions)
        }
        Some("forall") => Err(unsupported(Construct::QuantifiedCondition, node)),
        _ => Err(TranslateError::malformed_term("a timed condition", node)),
    }
}

/// Translates `(at start e)` or `(at end (and e1 e2))`, one timed formula per primitive effect.
fn translate_timed_effect(node: &Node) -> Result<Vec<TimedFormula>> {
    expect_rule(node, Rule::TimedEffect)?;
    if node.has(Rule::FAssignDa) {
        return Err(unsupported(Construct::NumericEffect, node));
    }
    if node.has(Rule::AssignOp) {
        return Err(unsupported(Construct::ContinuousEffect, node));
    }
    let time = translate_time_specifier(required(node, Rule::TimeSpecifier)?)?;
    if let Some(conjunction) = node.first_of(Rule::CondEffect) {
        return conjunction
            .children()
            .iter()
            .filter_map(|e| match e.rule() {
                Rule::PEffect => Some(translate_primitive_effect(e)),
                Rule::CEffect => Some(translate_ceffect(e)),
                _ => None,
            })
            .map(|formula| Ok(TimedFormula::new(time, formula?)))
            .collect();
    }
    let formula = translate_ceffect(required(node, Rule::CEffect)?)?;
    Ok(vec![TimedFormula::new(time, formula)])
}

/// Translates the effect of a durative action into the list of its timed effects.
/// Nested conjunctions are flattened.
pub fn translate_da_effect(node: &Node) -> Result<Vec<TimedFormula>> {
    expect_rule(node, Rule::DaEffect)?;
    if is_wrapper_of(node, Rule::TimedEffect) {
        return translate_timed_effect(&node.children()[0]);
    }
    match keyword_of(node).as_deref() {
        Some("and") => {
            let mut effects = Vec::new();
            for sub in node.children_of(Rule::DaEffect) {
                effects.extend(translate_da_effect(sub)?);
            }
            Ok(effects)
        }
        Some("forall") => Err(unsupported(Construct::QuantifiedEffect, node)),
        Some("when") => Err(unsupported(Construct::ConditionalEffect, node)),
        _ => Err(TranslateError::malformed_term("a timed effect", node)),
    }
}

pub fn translate_durative_action(node: &Node) -> Result<DurativeAction> {
    expect_rule(node, Rule::DurativeActionDef)?;
    let name = symbol_of(node, Rule::ActionSymbol)?;
    let _span = tracing::span!(tracing::Level::TRACE, "durative-action", %name).entered();
    let parameters = translate_typed_variable_list(required(node, Rule::TypedVariableList)?)?;
    let body = required(node, Rule::DaDefBody)?;
    let duration = body
        .first_of(Rule::DurationConstraint)
        .ok_or_else(|| TranslateError::missing_section(":duration", node))?;
    let (duration_lower_bound, duration_upper_bound) = translate_duration_constraint(duration)?;
    let conditions = match body.first_of(Rule::DaGD) {
        Some(cond) => translate_timed_condition(cond)?,
        None => Vec::new(),
    };
    let effects = match body.first_of(Rule::DaEffect) {
        Some(eff) => translate_da_effect(eff)?,
        None => Vec::new(),
    };
    tracing::trace!(conditions = conditions.len(), effects = effects.len(), "translated durative action");
    Ok(DurativeAction {
        name,
        parameters,
        duration_lower_bound,
        duration_upper_bound,
        conditions,
        effects,
    })
}
