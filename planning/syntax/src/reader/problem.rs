use super::domain::read_requirements;
use super::formulas::*;
use super::*;

pub(super) fn read_problem(problem: &SExpr) -> Res<Node> {
    let l = problem.as_list().ok_or_else(|| problem.invalid("Expected a list"))?;
    let mut items = l.iter();
    let define = items.pop_known_atom("define")?;

    let decl = items
        .pop_list()
        .map_err(|m| m.title("Expected problem name definition of the form '(problem XXXXXX)'"))?;
    let mut decl_items = decl.iter();
    let kw = decl_items.pop_known_atom("problem")?;
    let name = decl_items.pop_atom()?;
    expect_end(&decl_items)?;
    let name = parenthesized(Rule::ProblemDecl, decl, vec![keyword(kw), leaf(Rule::Name, name)]);

    let mut domain = None;
    let mut requirements = None;
    let mut objects = None;
    let mut init = None;
    let mut goal = None;
    let mut constraints = None;
    let mut metric = None;

    for current in items {
        // a property associates a key (e.g. `:objects`) to a value or a sequence of values
        let block = current.as_list().ok_or_else(|| current.invalid("Expected a list"))?;
        let mut property = block.iter();
        let key = property.pop_atom()?;
        match key.keyword().as_str() {
            ":domain" => {
                let domain_name = property.pop_atom()?;
                expect_end(&property)?;
                let node = parenthesized(Rule::ProblemDomain, block, vec![keyword(key), leaf(Rule::Name, domain_name)]);
                set_once(&mut domain, node, current)?
            }
            ":requirements" => {
                let node = read_requirements(block, key, property)?;
                set_once(&mut requirements, node, current)?
            }
            ":objects" => {
                let list = read_typed_names(&mut property)?;
                let node = parenthesized(Rule::ObjectDecl, block, vec![keyword(key), list]);
                set_once(&mut objects, node, current)?
            }
            ":init" => {
                let mut children = vec![keyword(key)];
                for fact in property {
                    children.push(read_init_element(fact)?);
                }
                let node = parenthesized(Rule::Init, block, children);
                set_once(&mut init, node, current)?
            }
            ":goal" => {
                let g = read_goal(property.pop()?)?;
                expect_end(&property)?;
                let node = parenthesized(Rule::Goal, block, vec![keyword(key), g]);
                set_once(&mut goal, node, current)?
            }
            ":constraints" => {
                let mut children = vec![keyword(key)];
                children.extend(property.map(raw));
                let node = parenthesized(Rule::ProbConstraints, block, children);
                set_once(&mut constraints, node, current)?
            }
            ":metric" => {
                let qualifier = property.pop_atom()?;
                if !(qualifier.is("minimize") || qualifier.is("maximize")) {
                    return Err(qualifier.invalid("expected `maximize` or `minimize`"));
                }
                let expr = read_fexp(property.pop()?)?;
                expect_end(&property)?;
                let node = parenthesized(
                    Rule::MetricSpec,
                    block,
                    vec![keyword(key), leaf(Rule::Optimization, qualifier), expr],
                );
                set_once(&mut metric, node, current)?
            }
            _ => return Err(current.invalid("unsupported block")),
        }
    }

    let mut children = vec![keyword(define), name];
    children.extend(
        [domain, requirements, objects, init, goal, constraints, metric]
            .into_iter()
            .flatten(),
    );
    Ok(parenthesized(Rule::Problem, l, children))
}

/// Ground atom `(p a b)`
fn read_name_formula(e: &SExpr) -> Res<Node> {
    let l = e.as_list().ok_or_else(|| e.invalid("Expected a ground atom"))?;
    let mut items = l.iter();
    let pred = items.pop_atom()?;
    let mut children = vec![wrap(Rule::Predicate, leaf(Rule::Name, pred))];
    for arg in items {
        let arg = arg.as_atom().ok_or_else(|| arg.invalid("Expected an object name"))?;
        if arg.str().starts_with('?') {
            return Err(arg.invalid("Variables are not allowed in the initial state"));
        }
        children.push(leaf(Rule::Name, arg));
    }
    Ok(parenthesized(Rule::AtomicNameFormula, l, children))
}

fn read_name_literal(e: &SExpr) -> Res<Node> {
    match e.as_application("not") {
        Some([atom]) => {
            let l = as_list(e)?;
            let not = l.iter().pop_atom()?;
            Ok(parenthesized(
                Rule::NameLiteral,
                l,
                vec![keyword(not), read_name_formula(atom)?],
            ))
        }
        Some(_) => Err(e.invalid("Expected a single atom in negated literal")),
        None => Ok(wrap(Rule::NameLiteral, read_name_formula(e)?)),
    }
}

/// Element of the initial state: a literal, a function value `(= (f a) 3)` or `(= total-cost 0)`,
/// or a timed literal `(at 10 (p a))`.
fn read_init_element(e: &SExpr) -> Res<Node> {
    let l = e.as_list().ok_or_else(|| e.invalid("Expected an initial state element"))?;
    let mut items = l.iter();
    let head = items.pop_atom()?;
    if head.is("=") && items.len() == 2 {
        let fhead = read_fhead(items.pop()?)?;
        let value = items.pop_atom()?;
        expect_end(&items)?;
        let value = if is_number(value.str()) {
            leaf(Rule::Number, value)
        } else {
            leaf(Rule::Name, value)
        };
        return Ok(parenthesized(Rule::InitEl, l, vec![keyword(head), fhead, value]));
    }
    let timed = head.is("at")
        && items.len() == 2
        && items.peek().is_some_and(|t| t.as_atom().is_some_and(|t| is_number(t.str())));
    if timed {
        let time = items.pop_atom()?;
        let literal = read_name_literal(items.pop()?)?;
        return Ok(parenthesized(
            Rule::InitEl,
            l,
            vec![keyword(head), leaf(Rule::Number, time), literal],
        ));
    }
    Ok(wrap(Rule::InitEl, read_name_literal(e)?))
}
