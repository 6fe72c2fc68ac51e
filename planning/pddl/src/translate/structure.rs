use super::goals::translate_literal;
use super::numeric::translate_number;
use super::*;
use crate::actions::Action;
use crate::expressions::{FunctionDef, NumericExpr, PredicateDef};
use crate::formula::Formula;
use crate::model::{Domain, InitElement, Metric, Problem};
use crate::params::{TypedArg, TypedArgList};
use itertools::Itertools;

/// Text of a `Type` node: a type name or `(either t1 t2)`.
fn type_name(node: &Node) -> Result<String> {
    expect_rule(node, Rule::Type)?;
    let names = node.children_of(Rule::Name).map(|n| n.text()).collect_vec();
    match names.as_slice() {
        [name] if !node.children().iter().any(|c| c.is_token("either")) => Ok(name.to_string()),
        [] => Err(TranslateError::malformed_term("a type", node)),
        _ => Ok(format!("(either {})", names.iter().join(" "))),
    }
}

/// Flattens a typed list whose children are typed groups followed by the untyped elements.
fn translate_typed_list(node: &Node, list: Rule, group: Rule, elem: Rule) -> Result<TypedArgList> {
    expect_rule(node, list)?;
    let mut args = Vec::new();
    for child in node.children() {
        if child.rule() == group {
            let tpe = type_name(required(child, Rule::Type)?)?;
            for member in child.children_of(elem) {
                args.push(TypedArg::typed(member.text(), tpe.clone()));
            }
        } else if child.rule() == elem {
            args.push(TypedArg::untyped(child.text()));
        } else {
            return Err(TranslateError::malformed_term(format!("a {elem} or a typed group"), child));
        }
    }
    Ok(TypedArgList::new(args))
}

/// Translates a list of possibly typed names, e.g., `a b - room c`.
pub fn translate_typed_name_list(node: &Node) -> Result<TypedArgList> {
    translate_typed_list(node, Rule::TypedNameList, Rule::SingleTypeNameList, Rule::Name)
}

/// Translates a list of possibly typed variables, e.g., `?a ?b - room ?c`.
pub fn translate_typed_variable_list(node: &Node) -> Result<TypedArgList> {
    translate_typed_list(node, Rule::TypedVariableList, Rule::SingleTypeVarList, Rule::Variable)
}

/// Typed list of an optional section such as `(:types ...)`. An absent section is an empty list.
fn optional_typed_names(section: Option<&Node>) -> Result<TypedArgList> {
    match section {
        Some(section) => translate_typed_name_list(required(section, Rule::TypedNameList)?),
        None => Ok(TypedArgList::default()),
    }
}

fn requirements(section: Option<&Node>) -> Vec<String> {
    section
        .map(|s| s.children_of(Rule::RequireKey).map(|k| k.text().into_owned()).collect())
        .unwrap_or_default()
}

/// Translates an instantaneous action.
///
/// A missing precondition, or an empty one `()`, is the empty conjunction.
pub fn translate_action(node: &Node) -> Result<Action> {
    expect_rule(node, Rule::ActionDef)?;
    let name = symbol_of(node, Rule::ActionSymbol)?;
    let _span = tracing::span!(tracing::Level::TRACE, "action", %name).entered();
    let parameters = translate_typed_variable_list(required(node, Rule::TypedVariableList)?)?;
    let body = required(node, Rule::ActionDefBody)?;
    let precondition = match body.first_of(Rule::Precondition).and_then(|p| p.first_of(Rule::GoalDesc)) {
        Some(goal) => translate_goal_description(goal)?,
        None => Formula::tautology(),
    };
    let effects = match body.first_of(Rule::Effect) {
        Some(effect) => translate_effect(effect)?,
        None => Vec::new(),
    };
    tracing::trace!(effects = effects.len(), "translated action");
    Ok(Action {
        name,
        parameters,
        precondition,
        effects,
    })
}

/// Translates an element of the initial state.
pub fn translate_initial_element(node: &Node) -> Result<InitElement> {
    expect_rule(node, Rule::InitEl)?;
    if is_wrapper_of(node, Rule::NameLiteral) {
        let literal = &node.children()[0];
        return Ok(InitElement::Fact(translate_literal(literal, Rule::AtomicNameFormula)?));
    }
    match keyword_of(node).as_deref() {
        Some("at") if node.has(Rule::NameLiteral) => Err(unsupported(Construct::TimedInitialLiteral, node)),
        Some("=") => {
            let head = translate_fhead(required(node, Rule::FHead)?)?;
            let value = node
                .first_of(Rule::Number)
                .ok_or_else(|| TranslateError::malformed_term("a numeric value", node))?;
            Ok(InitElement::Assign {
                head,
                value: translate_number(value)?,
            })
        }
        _ => Err(TranslateError::malformed_term("a literal or a function value", node)),
    }
}

fn translate_predicate_def(node: &Node) -> Result<PredicateDef> {
    expect_rule(node, Rule::AtomicFormulaSkeleton)?;
    Ok(PredicateDef {
        name: symbol_of(node, Rule::Predicate)?,
        params: translate_typed_variable_list(required(node, Rule::TypedVariableList)?)?,
    })
}

fn translate_functions(section: &Node) -> Result<Vec<FunctionDef>> {
    let list = required(section, Rule::FunctionList)?;
    let mut functions: Vec<FunctionDef> = Vec::new();
    for child in list.children() {
        match child.rule() {
            Rule::AtomicFunctionSkeleton => functions.push(FunctionDef {
                name: symbol_of(child, Rule::FunctionSymbol)?,
                params: translate_typed_variable_list(required(child, Rule::TypedVariableList)?)?,
                return_type: None,
            }),
            Rule::FunctionType => {
                let tpe = required(child, Rule::Name)?.text().into_owned();
                // the type annotates all preceding functions that have none yet
                for f in functions.iter_mut().rev().take_while(|f| f.return_type.is_none()) {
                    f.return_type = Some(tpe.clone());
                }
            }
            _ => return Err(TranslateError::malformed_term("a function declaration", child)),
        }
    }
    Ok(functions)
}

/// Translates the root of a domain file.
pub fn translate_domain(node: &Node) -> Result<Domain> {
    if node.rule() != Rule::Domain {
        return Err(TranslateError::missing_section("domain definition", node));
    }
    let name_decl = node
        .first_of(Rule::DomainName)
        .ok_or_else(|| TranslateError::missing_section("(domain ...) declaration", node))?;
    let name = required(name_decl, Rule::Name)?.text().into_owned();
    let _span = tracing::span!(tracing::Level::TRACE, "domain", %name).entered();

    if let Some(constraints) = node.first_of(Rule::ConstraintsDef) {
        return Err(unsupported(Construct::TrajectoryConstraints, constraints));
    }
    let predicates = match node.first_of(Rule::PredicatesDef) {
        Some(section) => section
            .children_of(Rule::AtomicFormulaSkeleton)
            .map(translate_predicate_def)
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };
    let functions = match node.first_of(Rule::FunctionsDef) {
        Some(section) => translate_functions(section)?,
        None => Vec::new(),
    };

    let mut actions = Vec::new();
    let mut durative_actions = Vec::new();
    for structure in node.children_of(Rule::StructureDef) {
        match structure.child(0) {
            Some(a) if a.rule() == Rule::ActionDef => actions.push(translate_action(a)?),
            Some(a) if a.rule() == Rule::DurativeActionDef => durative_actions.push(translate_durative_action(a)?),
            Some(d) if d.rule() == Rule::DerivedDef => return Err(unsupported(Construct::DerivedPredicate, d)),
            _ => return Err(TranslateError::malformed_term("an action definition", structure)),
        }
    }

    let domain = Domain {
        name,
        requirements: requirements(node.first_of(Rule::RequireDef)),
        types: optional_typed_names(node.first_of(Rule::TypesDef))?,
        constants: optional_typed_names(node.first_of(Rule::ConstantsDef))?,
        predicates,
        functions,
        actions,
        durative_actions,
    };
    tracing::debug!(
        types = domain.types.len(),
        constants = domain.constants.len(),
        predicates = domain.predicates.len(),
        functions = domain.functions.len(),
        actions = domain.actions.len(),
        durative_actions = domain.durative_actions.len(),
        "translated domain {}",
        domain.name
    );
    Ok(domain)
}

fn translate_metric(section: &Node) -> Result<Metric> {
    let direction = required(section, Rule::Optimization)?;
    let expr: NumericExpr = translate_numeric_expression(required(section, Rule::FExp)?)?;
    match direction.text().to_ascii_lowercase().as_str() {
        "minimize" => Ok(Metric::Minimize(expr)),
        "maximize" => Ok(Metric::Maximize(expr)),
        _ => Err(TranslateError::malformed_term("`minimize` or `maximize`", direction)),
    }
}

/// Translates the root of a problem file.
pub fn translate_problem(node: &Node) -> Result<Problem> {
    if node.rule() != Rule::Problem {
        return Err(TranslateError::missing_section("problem definition", node));
    }
    let name_decl = node
        .first_of(Rule::ProblemDecl)
        .ok_or_else(|| TranslateError::missing_section("(problem ...) declaration", node))?;
    let name = required(name_decl, Rule::Name)?.text().into_owned();
    let _span = tracing::span!(tracing::Level::TRACE, "problem", %name).entered();

    let domain_decl = node
        .first_of(Rule::ProblemDomain)
        .ok_or_else(|| TranslateError::missing_section("(:domain ...) reference", node))?;
    let domain_name = required(domain_decl, Rule::Name)?.text().into_owned();

    if let Some(constraints) = node.first_of(Rule::ProbConstraints) {
        return Err(unsupported(Construct::TrajectoryConstraints, constraints));
    }
    let init = node
        .first_of(Rule::Init)
        .ok_or_else(|| TranslateError::missing_section(":init section", node))?;
    let initial_facts = init
        .children_of(Rule::InitEl)
        .map(translate_initial_element)
        .collect::<Result<Vec<_>>>()?;
    let goal = node
        .first_of(Rule::Goal)
        .ok_or_else(|| TranslateError::missing_section(":goal section", node))?;
    let goal = translate_goal_description(required(goal, Rule::GoalDesc)?)?;
    let metric = match node.first_of(Rule::MetricSpec) {
        Some(section) => Some(translate_metric(section)?),
        None => None,
    };

    let problem = Problem {
        name,
        domain_name,
        requirements: requirements(node.first_of(Rule::RequireDef)),
        objects: optional_typed_names(node.first_of(Rule::ObjectDecl))?,
        initial_facts,
        goal,
        metric,
    };
    tracing::debug!(
        objects = problem.objects.len(),
        initial_facts = problem.initial_facts.len(),
        "translated problem {} of domain {}",
        problem.name,
        problem.domain_name
    );
    Ok(problem)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(s: &str) -> Node {
        Node::token(s)
    }

    #[test]
    fn typed_variables() {
        let group = Node::new(
            Rule::SingleTypeVarList,
            vec![
                Node::leaf(Rule::Variable, "?a"),
                Node::leaf(Rule::Variable, "?b"),
                tok("-"),
                Node::new(Rule::Type, vec![Node::leaf(Rule::Name, "room")]),
            ],
        );
        let either = Node::new(
            Rule::SingleTypeVarList,
            vec![
                Node::leaf(Rule::Variable, "?c"),
                tok("-"),
                Node::new(
                    Rule::Type,
                    vec![
                        tok("("),
                        tok("either"),
                        Node::leaf(Rule::Name, "truck"),
                        Node::leaf(Rule::Name, "plane"),
                        tok(")"),
                    ],
                ),
            ],
        );
        let list = Node::new(
            Rule::TypedVariableList,
            vec![group, either, Node::leaf(Rule::Variable, "?d")],
        );
        let args = translate_typed_variable_list(&list).unwrap();
        assert_eq!(
            args.args,
            vec![
                TypedArg::typed("?a", "room"),
                TypedArg::typed("?b", "room"),
                TypedArg::typed("?c", "(either truck plane)"),
                TypedArg::untyped("?d"),
            ]
        );
    }

    #[test]
    fn init_elements() {
        let fhead = Node::new(
            Rule::FHead,
            vec![
                tok("("),
                Node::new(Rule::FunctionSymbol, vec![Node::leaf(Rule::Name, "cost")]),
                tok(")"),
            ],
        );
        let assign = Node::new(
            Rule::InitEl,
            vec![tok("("), tok("="), fhead, Node::leaf(Rule::Number, "3"), tok(")")],
        );
        match translate_initial_element(&assign).unwrap() {
            InitElement::Assign { head, value } => {
                assert_eq!(head.name, "cost");
                assert_eq!(value.0, 3.0);
            }
            other => panic!("unexpected {other:?}"),
        }

        let atom = Node::new(
            Rule::AtomicNameFormula,
            vec![
                tok("("),
                Node::new(Rule::Predicate, vec![Node::leaf(Rule::Name, "free")]),
                tok(")"),
            ],
        );
        let literal = Node::new(Rule::NameLiteral, vec![tok("("), tok("not"), atom, tok(")")]);
        let timed = Node::new(
            Rule::InitEl,
            vec![tok("("), tok("at"), Node::leaf(Rule::Number, "10"), literal.clone(), tok(")")],
        );
        assert!(matches!(
            translate_initial_element(&timed),
            Err(TranslateError::UnsupportedConstruct {
                construct: Construct::TimedInitialLiteral,
                ..
            })
        ));
        let negated = Node::new(Rule::InitEl, vec![literal]);
        let fact = translate_initial_element(&negated).unwrap();
        assert!(matches!(fact, InitElement::Fact(Formula::Not(ref p)) if p.name == "free"));
    }

    #[test]
    fn not_a_domain() {
        let node = Node::new(Rule::Problem, vec![tok("("), tok(")")]);
        assert!(matches!(
            translate_domain(&node),
            Err(TranslateError::MissingSection { .. })
        ));
    }
}
