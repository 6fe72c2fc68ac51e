//! Grammar rules shared by domains and problems: typed lists, terms, goals, numeric expressions and effects.

use super::*;

const ASSIGN_OPS: [&str; 5] = ["assign", "scale-up", "scale-down", "increase", "decrease"];
const BINARY_OPS: [&str; 4] = ["+", "-", "*", "/"];
const COMPARISONS: [&str; 5] = ["<", ">", "<=", ">=", "="];

/// Returns true if the atom is a numeric literal such as `3`, `-1` or `2.5`.
pub fn is_number(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.') && s.parse::<f64>().is_ok()
}

fn is_variable(s: &str) -> bool {
    s.starts_with('?')
}

/// Reads a sequence `a b - t1 c - t2 d` where each element is an atom of rule `elem`.
///
/// The result has the rule `list` with one `group` child per typed group followed by the
/// trailing untyped elements.
fn read_typed_list(items: &mut ListIter, list: Rule, group_rule: Rule, elem: Rule) -> Res<Node> {
    let mut children = Vec::new();
    let mut pending: Vec<Node> = Vec::new();
    while !items.is_empty() {
        let next = items.pop_atom()?;
        if next.str() == "-" {
            if pending.is_empty() {
                return Err(next.invalid("Type annotation without any element"));
            }
            let tpe = read_type(items.pop()?)?;
            let mut members = std::mem::take(&mut pending);
            members.push(keyword(next));
            members.push(tpe);
            children.push(group(group_rule, members));
        } else {
            match elem {
                Rule::Variable if !is_variable(next.str()) => return Err(next.invalid("Expected a variable")),
                Rule::Name if is_variable(next.str()) => return Err(next.invalid("Expected a name")),
                _ => {}
            }
            pending.push(leaf(elem, next));
        }
    }
    children.extend(pending);
    Ok(group(list, children))
}

pub(super) fn read_typed_names(items: &mut ListIter) -> Res<Node> {
    read_typed_list(items, Rule::TypedNameList, Rule::SingleTypeNameList, Rule::Name)
}

pub(super) fn read_typed_variables(items: &mut ListIter) -> Res<Node> {
    read_typed_list(items, Rule::TypedVariableList, Rule::SingleTypeVarList, Rule::Variable)
}

/// Parameter list of the form `(?a ?b - t)`, returned as the children `(` TypedVariableList `)`.
pub(super) fn read_parameters(e: &SExpr) -> Res<Vec<Node>> {
    let l = e.as_list().ok_or_else(|| e.invalid("Expected a parameter list"))?;
    let params = read_typed_variables(&mut l.iter())?;
    let span = l.loc();
    Ok(vec![
        Node::token("(").with_span(Some(span.start())),
        params,
        Node::token(")").with_span(Some(span.end())),
    ])
}

fn read_type(e: &SExpr) -> Res<Node> {
    match e {
        SExpr::Atom(a) => Ok(wrap(Rule::Type, leaf(Rule::Name, a))),
        SExpr::List(l) => {
            let mut items = l.iter();
            let either = items.pop_known_atom("either")?;
            let mut children = vec![keyword(either)];
            if items.is_empty() {
                return Err(e.invalid("Expected at least one type in `either`"));
            }
            for t in items {
                let t = t.as_atom().ok_or_else(|| t.invalid("Expected a type name"))?;
                children.push(leaf(Rule::Name, t));
            }
            Ok(parenthesized(Rule::Type, l, children))
        }
    }
}

/// Term of an atom: a variable, an object name or a function application.
fn read_term(e: &SExpr) -> Res<Node> {
    match e {
        SExpr::Atom(a) if is_variable(a.str()) => Ok(wrap(Rule::Term, leaf(Rule::Variable, a))),
        SExpr::Atom(a) => Ok(wrap(Rule::Term, leaf(Rule::Name, a))),
        SExpr::List(l) => {
            let mut items = l.iter();
            let name = items.pop_atom()?;
            let mut children = vec![wrap(Rule::FunctionSymbol, leaf(Rule::Name, name))];
            for t in items {
                children.push(read_term(t)?);
            }
            Ok(wrap(Rule::Term, parenthesized(Rule::FunctionTerm, l, children)))
        }
    }
}

/// Atomic formula `(p t1 t2)`
pub(super) fn read_atomic_formula(e: &SExpr) -> Res<Node> {
    let l = as_list(e)?;
    let mut items = l.iter();
    let pred = items.pop_atom().map_err(|m| m.title("Expected a predicate name"))?;
    let mut children = vec![wrap(Rule::Predicate, leaf(Rule::Name, pred))];
    for t in items {
        children.push(read_term(t)?);
    }
    Ok(parenthesized(Rule::AtomicTermFormula, l, children))
}

/// Returns true if the expression `(= a b)` compares two objects rather than two numeric expressions.
fn is_equality_atom(args: &[SExpr]) -> bool {
    args.len() == 2 && args.iter().all(|a| a.as_atom().is_some_and(|a| !is_number(a.str())))
}

/// Returns true if the expression is an atom `(p ...)` and not a composite goal.
fn is_atomic_formula(e: &SExpr) -> bool {
    match e.head() {
        Some(head) => match head.as_str() {
            "and" | "or" | "not" | "imply" | "exists" | "forall" | "preference" => false,
            "=" => e.as_application("=").is_some_and(is_equality_atom),
            h => !COMPARISONS.contains(&h),
        },
        None => false,
    }
}

/// Goal description, e.g., `(and (p ?x) (not (q ?y)))`.
pub(super) fn read_goal(e: &SExpr) -> Res<Node> {
    let l = e.as_list().ok_or_else(|| e.invalid("Expected a goal description"))?;
    if l.is_empty() {
        return Err(e.invalid("Empty goal description"));
    }
    if is_atomic_formula(e) {
        return Ok(wrap(Rule::GoalDesc, read_atomic_formula(e)?));
    }
    let mut items = l.iter();
    let head = items.pop_atom()?;
    let mut children = vec![keyword(head)];
    match head.keyword().as_str() {
        "and" | "or" => {
            for sub in items {
                children.push(read_goal(sub)?);
            }
        }
        "not" => {
            let negated = items.pop()?;
            expect_end(&items)?;
            if is_atomic_formula(negated) {
                children.push(read_atomic_formula(negated)?);
            } else {
                children.push(read_goal(negated)?);
            }
        }
        "imply" => {
            children.push(read_goal(items.pop()?)?);
            children.push(read_goal(items.pop()?)?);
            expect_end(&items)?;
        }
        "exists" | "forall" => {
            children.extend(read_parameters(items.pop()?)?);
            children.push(read_goal(items.pop()?)?);
            expect_end(&items)?;
        }
        "preference" => children.extend(items.map(raw)),
        _ => return Ok(wrap(Rule::GoalDesc, read_comparison(l)?)),
    }
    Ok(parenthesized(Rule::GoalDesc, l, children))
}

/// Numeric comparison `(<= e1 e2)`
fn read_comparison(l: &SList) -> Res<Node> {
    let mut items = l.iter();
    let op = items.pop_atom()?;
    if !COMPARISONS.contains(&op.str()) {
        return Err(op.invalid("Expected a comparison operator"));
    }
    let lhs = read_fexp(items.pop()?)?;
    let rhs = read_fexp(items.pop()?)?;
    expect_end(&items)?;
    Ok(parenthesized(Rule::FComp, l, vec![leaf(Rule::BinaryComp, op), lhs, rhs]))
}

/// Function application `(f ?x a)`, or a bare function symbol `f`.
pub(super) fn read_fhead(e: &SExpr) -> Res<Node> {
    match e {
        SExpr::Atom(a) => Ok(wrap(Rule::FHead, wrap(Rule::FunctionSymbol, leaf(Rule::Name, a)))),
        SExpr::List(l) => {
            let mut items = l.iter();
            let name = items.pop_atom()?;
            let mut children = vec![wrap(Rule::FunctionSymbol, leaf(Rule::Name, name))];
            for t in items {
                children.push(read_term(t)?);
            }
            Ok(parenthesized(Rule::FHead, l, children))
        }
    }
}

/// Numeric expression.
pub(super) fn read_fexp(e: &SExpr) -> Res<Node> {
    match e {
        SExpr::Atom(a) if is_number(a.str()) => Ok(wrap(Rule::FExp, leaf(Rule::Number, a))),
        SExpr::Atom(a) if is_variable(a.str()) => Ok(wrap(Rule::FExp, leaf(Rule::Variable, a))),
        SExpr::Atom(_) => Ok(wrap(Rule::FExp, read_fhead(e)?)),
        SExpr::List(l) => {
            let mut items = l.iter();
            let head = items.pop_atom().map_err(|m| m.title("Expected an operator or a function"))?;
            if !BINARY_OPS.contains(&head.str()) {
                return Ok(wrap(Rule::FExp, read_fhead(e)?));
            }
            match items.len() {
                0 => Err(e.invalid("Operation without operands")),
                1 if head.str() == "-" => {
                    let negated = read_fexp(items.pop()?)?;
                    Ok(parenthesized(Rule::FExp, l, vec![keyword(head), negated]))
                }
                1 => Err(e.invalid("Expected at least two operands")),
                _ => {
                    let mut children = vec![leaf(Rule::BinaryOp, head), read_fexp(items.pop()?)?];
                    for operand in items {
                        children.push(wrap(Rule::FExp2, read_fexp(operand)?));
                    }
                    Ok(parenthesized(Rule::FExp, l, children))
                }
            }
        }
    }
}

pub(super) fn is_assignment(e: &SExpr) -> bool {
    e.head().is_some_and(|h| ASSIGN_OPS.contains(&h.as_str()))
}

/// Numeric assignment `(increase (f ?x) 2)`, with the given rule.
pub(super) fn read_assignment(rule: Rule, e: &SExpr) -> Res<Node> {
    let l = as_list(e)?;
    let mut items = l.iter();
    let op = items.pop_atom()?;
    let head = read_fhead(items.pop()?)?;
    let value = read_fexp(items.pop()?)?;
    expect_end(&items)?;
    Ok(parenthesized(rule, l, vec![leaf(Rule::AssignOp, op), head, value]))
}

/// Primitive effect: a literal or a numeric assignment.
fn read_peffect(e: &SExpr) -> Res<Node> {
    if is_assignment(e) {
        return read_assignment(Rule::PEffect, e);
    }
    if let Some(args) = e.as_application("not") {
        let l = as_list(e)?;
        let mut items = l.iter();
        let not = items.pop_atom()?;
        match args {
            [atom] => Ok(parenthesized(
                Rule::PEffect,
                l,
                vec![keyword(not), read_atomic_formula(atom)?],
            )),
            _ => Err(e.invalid("Expected a single atom in negated effect")),
        }
    } else {
        Ok(wrap(Rule::PEffect, read_atomic_formula(e)?))
    }
}

/// Effect that may be conditional or quantified.
pub(super) fn read_ceffect(e: &SExpr) -> Res<Node> {
    let l = e.as_list().ok_or_else(|| e.invalid("Expected an effect"))?;
    match e.head().as_deref() {
        Some("forall") => {
            let mut items = l.iter();
            let mut children = vec![keyword(items.pop_atom()?)];
            children.extend(read_parameters(items.pop()?)?);
            let body = items.pop()?;
            children.push(group(Rule::Effect, read_effect_body(body)?));
            expect_end(&items)?;
            Ok(parenthesized(Rule::CEffect, l, children))
        }
        Some("when") => {
            let mut items = l.iter();
            let mut children = vec![keyword(items.pop_atom()?)];
            children.push(read_goal(items.pop()?)?);
            children.push(read_cond_effect(items.pop()?)?);
            expect_end(&items)?;
            Ok(parenthesized(Rule::CEffect, l, children))
        }
        Some("and") => Err(e.invalid("Nested conjunction in effect")),
        _ => Ok(wrap(Rule::CEffect, read_peffect(e)?)),
    }
}

pub(super) fn read_cond_effect(e: &SExpr) -> Res<Node> {
    match e.as_application("and") {
        Some(_) => {
            let l = as_list(e)?;
            let mut items = l.iter();
            let mut children = vec![keyword(items.pop_atom()?)];
            for p in items {
                let effect = match p.head().as_deref() {
                    Some("forall") | Some("when") => read_ceffect(p)?,
                    _ => read_peffect(p)?,
                };
                children.push(effect);
            }
            Ok(parenthesized(Rule::CondEffect, l, children))
        }
        None => Ok(wrap(Rule::CondEffect, read_peffect(e)?)),
    }
}

/// Children of an effect: `(` `and` CEffect* `)`, a single CEffect or `(` `)`.
pub(super) fn read_effect_body(e: &SExpr) -> Res<Vec<Node>> {
    let l = e.as_list().ok_or_else(|| e.invalid("Expected an effect"))?;
    let span = l.loc();
    let open = Node::token("(").with_span(Some(span.start()));
    let close = Node::token(")").with_span(Some(span.end()));
    if l.is_empty() {
        return Ok(vec![open, close]);
    }
    match e.as_application("and") {
        Some(_) => {
            let mut items = l.iter();
            let mut children = vec![open, keyword(items.pop_atom()?)];
            for eff in items {
                children.push(read_ceffect(eff)?);
            }
            children.push(close);
            Ok(children)
        }
        None => Ok(vec![read_ceffect(e)?]),
    }
}
