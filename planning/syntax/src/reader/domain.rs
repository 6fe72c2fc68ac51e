use super::formulas::*;
use super::*;

pub(super) fn read_domain(dom: &SExpr) -> Res<Node> {
    let l = dom.as_list().ok_or_else(|| dom.invalid("Expected a list"))?;
    let mut items = l.iter();
    let define = items.pop_known_atom("define")?;

    // extract the name of the domain, of the form `(domain XXX)`
    let decl = items.pop_list()?;
    let mut decl_items = decl.iter();
    let kw = decl_items.pop_known_atom("domain")?;
    let name = decl_items.pop_atom().map_err(|m| m.title("missing name of domain"))?;
    expect_end(&decl_items)?;
    let name = parenthesized(Rule::DomainName, decl, vec![keyword(kw), leaf(Rule::Name, name)]);

    let mut requirements = None;
    let mut types = None;
    let mut constants = None;
    let mut functions = None;
    let mut predicates = None;
    let mut constraints = None;
    let mut structures = Vec::new();

    for current in items {
        // a property associates a key (e.g. `:predicates`) to a value or a sequence of values
        let block = current
            .as_list()
            .ok_or_else(|| current.invalid("expected a property list"))?;
        let mut property = block.iter();
        let key = property.pop_atom()?;
        match key.keyword().as_str() {
            ":requirements" => {
                let node = read_requirements(block, key, property)?;
                set_once(&mut requirements, node, current)?
            }
            ":types" => {
                let list = read_typed_names(&mut property)?;
                let node = parenthesized(Rule::TypesDef, block, vec![keyword(key), list]);
                set_once(&mut types, node, current)?
            }
            ":constants" => {
                let list = read_typed_names(&mut property)?;
                let node = parenthesized(Rule::ConstantsDef, block, vec![keyword(key), list]);
                set_once(&mut constants, node, current)?
            }
            ":functions" => {
                let node = read_functions(block, key, property)?;
                set_once(&mut functions, node, current)?
            }
            ":predicates" => {
                let mut children = vec![keyword(key)];
                for pred in property {
                    let pl = pred.as_list().ok_or_else(|| pred.invalid("Expected a list"))?;
                    let mut pred_items = pl.iter();
                    let name = pred_items.pop_atom()?;
                    let params = read_typed_variables(&mut pred_items)?;
                    let predicate = wrap(Rule::Predicate, leaf(Rule::Name, name));
                    children.push(parenthesized(Rule::AtomicFormulaSkeleton, pl, vec![predicate, params]));
                }
                let node = parenthesized(Rule::PredicatesDef, block, children);
                set_once(&mut predicates, node, current)?
            }
            ":constraints" => {
                let mut children = vec![keyword(key)];
                children.extend(property.map(raw));
                let node = parenthesized(Rule::ConstraintsDef, block, children);
                set_once(&mut constraints, node, current)?
            }
            ":action" => {
                let action = read_action(block, key, property)?;
                structures.push(wrap(Rule::StructureDef, action));
            }
            ":durative-action" => {
                let action = read_durative_action(block, key, property)?;
                structures.push(wrap(Rule::StructureDef, action));
            }
            ":derived" => {
                let mut children = vec![keyword(key)];
                children.extend(property.map(raw));
                let derived = parenthesized(Rule::DerivedDef, block, children);
                structures.push(wrap(Rule::StructureDef, derived));
            }
            _ => return Err(current.invalid("unsupported block")),
        }
    }

    let mut children = vec![keyword(define), name];
    children.extend(
        [requirements, types, constants, functions, predicates, constraints]
            .into_iter()
            .flatten(),
    );
    children.extend(structures);
    Ok(parenthesized(Rule::Domain, l, children))
}

/// `(:requirements :strips :typing)`, shared with problems.
pub(super) fn read_requirements(block: &SList, key: &SAtom, property: ListIter) -> Res<Node> {
    let mut children = vec![keyword(key)];
    for feature in property {
        let feature = feature
            .as_atom()
            .ok_or_else(|| feature.invalid("Expected feature name but got list"))?;
        if !feature.str().starts_with(':') {
            return Err(feature.invalid("Requirement keys start with `:`"));
        }
        children.push(leaf(Rule::RequireKey, feature));
    }
    Ok(parenthesized(Rule::RequireDef, block, children))
}

fn read_functions(block: &SList, key: &SAtom, mut property: ListIter) -> Res<Node> {
    let mut functions = Vec::new();
    while let Ok(func) = property.pop() {
        // element is necessarily a function name and parameters, e.g., (battery ?r)
        let fl = func.as_list().ok_or_else(|| func.invalid("Expected a list"))?;
        let mut func_items = fl.iter();
        let name = func_items.pop_atom()?;
        let params = read_typed_variables(&mut func_items)?;
        let symbol = wrap(Rule::FunctionSymbol, leaf(Rule::Name, name));
        functions.push(parenthesized(Rule::AtomicFunctionSkeleton, fl, vec![symbol, params]));

        // from PDDL 3.1, it can have a type annotation, e.g., (battery ?r) - number
        if property.peek().is_some_and(|a| a.is_atom("-")) {
            let dash = property.pop_known_atom("-")?;
            let tpe = property.pop_atom().map_err(|m| m.title("expected a type"))?;
            functions.push(group(Rule::FunctionType, vec![keyword(dash), leaf(Rule::Name, tpe)]));
        }
    }
    let list = group(Rule::FunctionList, functions);
    Ok(parenthesized(Rule::FunctionsDef, block, vec![keyword(key), list]))
}

/// Key-value pairs of an action definition, e.g. `:parameters (?x) :precondition (p ?x)`
struct ActionFields<'a> {
    parameters: Option<(&'a SAtom, &'a SExpr)>,
    fields: Vec<(&'a SAtom, &'a SExpr)>,
}

fn read_fields<'a>(mut property: ListIter<'a>, allowed: &[&str]) -> Res<ActionFields<'a>> {
    let mut parameters = None;
    let mut fields: Vec<(&SAtom, &SExpr)> = Vec::new();
    while !property.is_empty() {
        let key = property.pop_atom()?;
        let value = property.pop().tag(key, "No value associated to this key")?;
        let kw = key.keyword();
        if kw == ":parameters" {
            if parameters.is_some() {
                return Err(key.invalid("Duplicated ':parameters' tag is not allowed"));
            }
            parameters = Some((key, value));
        } else if allowed.contains(&kw.as_str()) {
            if fields.iter().any(|(k, _)| k.keyword() == kw) {
                return Err(key.invalid("Duplicated key in action"));
            }
            fields.push((key, value));
        } else {
            return Err(key.invalid("unsupported key in action"));
        }
    }
    Ok(ActionFields { parameters, fields })
}

impl<'a> ActionFields<'a> {
    /// Children `:parameters` `(` TypedVariableList `)`. A missing parameter list is empty.
    fn parameters(&self) -> Res<Vec<Node>> {
        match self.parameters {
            Some((key, value)) => {
                let mut children = vec![keyword(key)];
                children.extend(read_parameters(value)?);
                Ok(children)
            }
            None => Ok(vec![
                implicit(":parameters"),
                implicit("("),
                Node::new(Rule::TypedVariableList, vec![]),
                implicit(")"),
            ]),
        }
    }

    fn get(&self, key: &str) -> Option<(&'a SAtom, &'a SExpr)> {
        self.fields.iter().find(|(k, _)| k.is(key)).copied()
    }
}

/// Value that is either an empty list `()` or some other expression.
fn empty_or(value: &SExpr, read: impl FnOnce(&SExpr) -> Res<Vec<Node>>) -> Res<Vec<Node>> {
    match value.as_list() {
        Some(l) if l.is_empty() => {
            let span = l.loc();
            Ok(vec![
                Node::token("(").with_span(Some(span.start())),
                Node::token(")").with_span(Some(span.end())),
            ])
        }
        _ => read(value),
    }
}

fn read_action(block: &SList, key: &SAtom, mut property: ListIter) -> Res<Node> {
    let name = property.pop_atom().map_err(|m| m.title("Missing action name"))?;
    let fields = read_fields(property, &[":precondition", ":effect"])?;

    let mut body = Vec::new();
    if let Some((key, value)) = fields.get(":precondition") {
        let mut children = vec![keyword(key)];
        children.extend(empty_or(value, |v| Ok(vec![read_goal(v)?]))?);
        body.push(group(Rule::Precondition, children));
    }
    if let Some((key, value)) = fields.get(":effect") {
        let mut children = vec![keyword(key)];
        children.extend(read_effect_body(value)?);
        body.push(group(Rule::Effect, children));
    }

    let mut children = vec![keyword(key), wrap(Rule::ActionSymbol, leaf(Rule::Name, name))];
    children.extend(fields.parameters()?);
    children.push(group(Rule::ActionDefBody, body));
    Ok(parenthesized(Rule::ActionDef, block, children))
}

fn read_durative_action(block: &SList, key: &SAtom, mut property: ListIter) -> Res<Node> {
    let name = property.pop_atom().map_err(|m| m.title("Missing action name"))?;
    let fields = read_fields(property, &[":duration", ":condition", ":effect"])?;

    let mut body = Vec::new();
    if let Some((key, value)) = fields.get(":duration") {
        body.push(keyword(key));
        body.push(read_duration_constraint(value)?);
    }
    if let Some((key, value)) = fields.get(":condition") {
        body.push(keyword(key));
        body.extend(empty_or(value, |v| Ok(vec![read_da_gd(v)?]))?);
    }
    if let Some((key, value)) = fields.get(":effect") {
        body.push(keyword(key));
        body.extend(empty_or(value, |v| Ok(vec![read_da_effect(v)?]))?);
    }

    let mut children = vec![keyword(key), wrap(Rule::ActionSymbol, leaf(Rule::Name, name))];
    children.extend(fields.parameters()?);
    children.push(group(Rule::DaDefBody, body));
    Ok(parenthesized(Rule::DurativeActionDef, block, children))
}

fn read_duration_constraint(e: &SExpr) -> Res<Node> {
    let l = e.as_list().ok_or_else(|| e.invalid("Expected a duration constraint"))?;
    if l.is_empty() {
        return Ok(parenthesized(Rule::DurationConstraint, l, vec![]));
    }
    match e.as_application("and") {
        Some(_) => {
            let mut items = l.iter();
            let mut children = vec![keyword(items.pop_atom()?)];
            for c in items {
                children.push(read_simple_duration_constraint(c)?);
            }
            Ok(parenthesized(Rule::DurationConstraint, l, children))
        }
        None => Ok(wrap(Rule::DurationConstraint, read_simple_duration_constraint(e)?)),
    }
}

fn read_time_specifier(e: &SExpr) -> Res<Node> {
    match e.as_atom() {
        Some(a) if a.is("start") || a.is("end") => Ok(leaf(Rule::TimeSpecifier, a)),
        _ => Err(e.invalid("Expected `start` or `end`")),
    }
}

fn read_simple_duration_constraint(e: &SExpr) -> Res<Node> {
    let l = e.as_list().ok_or_else(|| e.invalid("Expected a duration constraint"))?;
    let mut items = l.iter();
    let op = items.pop_atom()?;
    let children = if op.is("at") {
        let time = read_time_specifier(items.pop()?)?;
        let inner = read_simple_duration_constraint(items.pop()?)?;
        vec![keyword(op), time, inner]
    } else {
        if !["<=", ">=", "="].contains(&op.str()) {
            return Err(op.invalid("Expected a duration comparison (`=`, `<=` or `>=`)"));
        }
        let var = items.pop_known_atom("?duration")?;
        let value = match items.pop()? {
            SExpr::Atom(a) if is_number(a.str()) => wrap(Rule::DurValue, leaf(Rule::Number, a)),
            v => wrap(Rule::DurValue, read_fexp(v)?),
        };
        vec![leaf(Rule::DurOp, op), keyword(var), value]
    };
    expect_end(&items)?;
    Ok(parenthesized(Rule::SimpleDurationConstraint, l, children))
}

/// Durative action condition.
fn read_da_gd(e: &SExpr) -> Res<Node> {
    let l = e.as_list().ok_or_else(|| e.invalid("Expected a timed condition"))?;
    match e.head().as_deref() {
        Some("and") => {
            let mut items = l.iter();
            let mut children = vec![keyword(items.pop_atom()?)];
            for c in items {
                children.push(read_da_gd(c)?);
            }
            Ok(parenthesized(Rule::DaGD, l, children))
        }
        Some("forall") => {
            let mut items = l.iter();
            let mut children = vec![keyword(items.pop_atom()?)];
            children.extend(read_parameters(items.pop()?)?);
            children.push(read_da_gd(items.pop()?)?);
            expect_end(&items)?;
            Ok(parenthesized(Rule::DaGD, l, children))
        }
        Some("preference") => {
            let mut items = l.iter();
            let mut children = vec![keyword(items.pop_atom()?)];
            if let Some(SExpr::Atom(pref_name)) = items.peek() {
                children.push(leaf(Rule::Name, pref_name));
                items.pop()?;
            }
            children.push(read_timed_gd(items.pop()?)?);
            expect_end(&items)?;
            Ok(wrap(Rule::DaGD, parenthesized(Rule::PrefTimedGD, l, children)))
        }
        _ => Ok(wrap(Rule::DaGD, wrap(Rule::PrefTimedGD, read_timed_gd(e)?))),
    }
}

/// `(at start g)`, `(at end g)` or `(over all g)`
fn read_timed_gd(e: &SExpr) -> Res<Node> {
    let l = e.as_list().ok_or_else(|| e.invalid("Expected a timed condition"))?;
    let mut items = l.iter();
    let qualifier = items.pop_atom()?;
    let time = if qualifier.is("at") {
        read_time_specifier(items.pop()?)?
    } else if qualifier.is("over") {
        let interval = items.pop_atom()?;
        if !interval.is("all") {
            return Err(interval.invalid("Expected `all`"));
        }
        leaf(Rule::Interval, interval)
    } else {
        return Err(e.invalid("Expected a timed condition: `(at start ...)`, `(at end ...)` or `(over all ...)`"));
    };
    let goal = read_goal(items.pop()?)?;
    expect_end(&items)?;
    Ok(parenthesized(Rule::TimedGD, l, vec![keyword(qualifier), time, goal]))
}

/// Durative action effect.
fn read_da_effect(e: &SExpr) -> Res<Node> {
    let l = e.as_list().ok_or_else(|| e.invalid("Expected a timed effect"))?;
    let head = e.head();
    match head.as_deref() {
        Some("and") => {
            let mut items = l.iter();
            let mut children = vec![keyword(items.pop_atom()?)];
            for c in items {
                children.push(read_da_effect(c)?);
            }
            Ok(parenthesized(Rule::DaEffect, l, children))
        }
        Some("forall") => {
            let mut items = l.iter();
            let mut children = vec![keyword(items.pop_atom()?)];
            children.extend(read_parameters(items.pop()?)?);
            children.push(read_da_effect(items.pop()?)?);
            expect_end(&items)?;
            Ok(parenthesized(Rule::DaEffect, l, children))
        }
        Some("when") => {
            let mut items = l.iter();
            let mut children = vec![keyword(items.pop_atom()?)];
            children.push(read_da_gd(items.pop()?)?);
            children.push(read_timed_effect(items.pop()?)?);
            expect_end(&items)?;
            Ok(parenthesized(Rule::DaEffect, l, children))
        }
        _ => Ok(wrap(Rule::DaEffect, read_timed_effect(e)?)),
    }
}

/// `(at start eff)`, `(at end (and eff1 eff2))` or a continuous effect `(increase (f) (* #t 2))`
fn read_timed_effect(e: &SExpr) -> Res<Node> {
    let l = e.as_list().ok_or_else(|| e.invalid("Expected a timed effect"))?;
    if is_assignment(e) {
        // continuous effect
        return read_assignment(Rule::TimedEffect, e);
    }
    let mut items = l.iter();
    let head = items.pop_atom()?;
    if !head.is("at") {
        return Err(e.invalid("Expected a timed effect: `(at start ...)` or `(at end ...)`"));
    }
    let time = read_time_specifier(items.pop()?)?;
    let body = items.pop()?;
    expect_end(&items)?;
    let effect = if is_assignment(body) {
        read_assignment(Rule::FAssignDa, body)?
    } else if body.as_application("and").is_some() {
        read_cond_effect(body)?
    } else {
        read_ceffect(body)?
    };
    Ok(parenthesized(Rule::TimedEffect, l, vec![keyword(head), time, effect]))
}
