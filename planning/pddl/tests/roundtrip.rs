//! Translation of complete PDDL files.
//!
//! Every file of the `pddl` folder must be translated, rendered and translated again into an
//! identical AST.

use pddl_ast::translate::{translate_domain, translate_problem};
use pddl_ast::*;
use pddl_syntax::{read_domain_tree, read_problem_tree, Input};
use test_each_file::test_each_file;

fn domain(text: &str) -> Domain {
    let tree = read_domain_tree(Input::from_string(text)).unwrap();
    translate_domain(&tree).unwrap()
}

fn problem(text: &str) -> Problem {
    let tree = read_problem_tree(Input::from_string(text)).unwrap();
    translate_problem(&tree).unwrap()
}

fn domain_error(text: &str) -> TranslateError {
    let tree = read_domain_tree(Input::from_string(text)).unwrap();
    translate_domain(&tree).unwrap_err()
}

fn problem_error(text: &str) -> TranslateError {
    let tree = read_problem_tree(Input::from_string(text)).unwrap();
    translate_problem(&tree).unwrap_err()
}

test_each_file! { in "./planning/pddl/tests/pddl" => roundtrip }

fn roundtrip(text: &str) {
    if text.contains("(problem") {
        let first = problem(text);
        let rendered = first.as_pddl();
        let second = problem(&rendered);
        assert_eq!(first, second, "{rendered}");
        assert_eq!(rendered, second.as_pddl());
    } else {
        let first = domain(text);
        let rendered = first.as_pddl();
        let second = domain(&rendered);
        assert_eq!(first, second, "{rendered}");
        assert_eq!(rendered, second.as_pddl());
    }
}

const GRIPPER: &str = include_str!("pddl/gripper/domain.pddl");
const GRIPPER_P01: &str = include_str!("pddl/gripper/p01.pddl");
const ROVERS: &str = include_str!("pddl/rovers/domain.pddl");
const ROVERS_P01: &str = include_str!("pddl/rovers/p01.pddl");

fn p(name: &str, args: &[&str]) -> Predicate {
    Predicate::new(name, args.iter().map(|a| Term::parse(*a)).collect())
}

#[test]
fn gripper() {
    let dom = domain(GRIPPER);
    assert_eq!(dom.name, "gripper-strips");
    assert_eq!(dom.requirements.len(), 4);
    assert_eq!(
        dom.types.args,
        vec![
            TypedArg::typed("room", "object"),
            TypedArg::typed("ball", "object"),
            TypedArg::typed("gripper", "object"),
        ]
    );
    assert!(dom.constants.is_empty());
    assert_eq!(dom.predicates.len(), 4);
    assert_eq!(dom.actions.len(), 3);
    assert!(dom.durative_actions.is_empty());

    let pick = dom.get_action("pick").unwrap();
    assert_eq!(pick.parameters.len(), 3);
    assert_eq!(
        pick.get_pre(true),
        vec![&p("at", &["?obj", "?room"]), &p("at-robby", &["?room"]), &p("free", &["?gripper"])]
    );
    assert!(pick.get_pre(false).is_empty());
    assert_eq!(pick.get_eff(true), vec![&p("carry", &["?obj", "?gripper"])]);
    assert_eq!(pick.get_eff(false), vec![&p("at", &["?obj", "?room"]), &p("free", &["?gripper"])]);

    let mv = dom.get_action("move").unwrap();
    assert_eq!(mv.get_pre(false), vec![&p("=", &["?from", "?to"])]);
}

#[test]
fn gripper_problem() {
    let pb = problem(GRIPPER_P01);
    assert_eq!(pb.name, "gripper-x-1");
    assert_eq!(pb.domain_name, "gripper-strips");
    assert_eq!(pb.objects.len(), 6);
    assert_eq!(pb.objects.args[5], TypedArg::typed("right", "gripper"));
    assert_eq!(pb.facts().count(), 5);
    assert_eq!(pb.goal.connective(), Connective::And);
    assert_eq!(pb.goal.get_predicates(true).len(), 2);
    assert!(pb.metric.is_none());
}

#[test]
fn polarity_partition() {
    let dom = domain(GRIPPER);
    for a in &dom.actions {
        for f in std::iter::once(&a.precondition).chain(&a.effects) {
            let pos = f.get_predicates(true);
            let neg = f.get_predicates(false);
            assert_eq!(pos.len() + neg.len(), count_literals(f));
        }
    }
}

fn count_literals(f: &Formula) -> usize {
    match f {
        Formula::Atom(_) | Formula::Not(_) => 1,
        Formula::And(fs) => fs.iter().map(count_literals).sum(),
    }
}

#[test]
fn rovers() {
    use TimeSpecifier::*;
    let dom = domain(ROVERS);
    assert_eq!(dom.constants.args, vec![TypedArg::typed("base", "waypoint")]);
    assert_eq!(dom.types.args.last(), Some(&TypedArg::untyped("objective")));
    let target = dom.predicates.iter().find(|p| p.name == "target").unwrap();
    assert_eq!(target.params.args[0].tpe.as_deref(), Some("(either objective waypoint)"));
    let returns: Vec<Option<&str>> = dom.functions.iter().map(|f| f.return_type.as_deref()).collect();
    assert_eq!(returns, vec![Some("number"), Some("number"), None]);

    let navigate = dom.get_durative_action("navigate").unwrap();
    assert!(navigate.has_fixed_duration());
    assert!(std::sync::Arc::ptr_eq(&navigate.duration_lower_bound, &navigate.duration_upper_bound));
    assert_eq!(navigate.duration_lower_bound.as_pddl(), "(/ (distance ?from ?to) (speed ?r))");
    assert_eq!(navigate.get_cond(Start, true), vec![&p("at", &["?r", "?from"]), &p("available", &["?r"])]);
    assert_eq!(navigate.get_cond(All, true), vec![&p("can-traverse", &["?r", "?from", "?to"])]);
    assert_eq!(navigate.get_eff(Start, false), vec![&p("at", &["?r", "?from"]), &p("available", &["?r"])]);
    assert_eq!(navigate.get_eff(End, true), vec![&p("at", &["?r", "?to"]), &p("available", &["?r"])]);
    assert!(navigate.get_eff(Start, true).is_empty());

    let calibrate = dom.get_durative_action("calibrate").unwrap();
    assert!(!calibrate.has_fixed_duration());
    assert_eq!(calibrate.duration_lower_bound.as_pddl(), "(calibration-time ?c)");
    assert_eq!(calibrate.duration_upper_bound.as_pddl(), "(* 2 (calibration-time ?c))");
    assert_eq!(calibrate.get_cond(Start, false), vec![&p("calibrated", &["?c"])]);
    assert_eq!(calibrate.effects.len(), 1);

    // nested conjunctions of timed conditions are flattened
    let take_image = dom.get_durative_action("take-image").unwrap();
    assert_eq!(take_image.conditions.len(), 4);
    assert_eq!(take_image.get_cond(All, true).len(), 3);
    assert_eq!(*take_image.duration_upper_bound, NumericExpr::number(7.0));

    let communicate = dom.get_action("communicate").unwrap();
    assert_eq!(communicate.effects, vec![Formula::Atom(p("communicated", &["?o"]))]);
    assert_eq!(communicate.get_pre(true)[1], &p("at", &["?r", "base"]));
}

#[test]
fn rovers_problem() {
    let pb = problem(ROVERS_P01);
    assert_eq!(pb.facts().count(), 8);
    let negated: Vec<&Formula> = pb.facts().filter(|f| f.connective() == Connective::Not).collect();
    assert_eq!(negated, vec![&Formula::Not(p("calibrated", &["cam"]))]);
    let speed = pb
        .initial_facts
        .iter()
        .find_map(|e| match e {
            InitElement::Assign { head, value } if head.name == "speed" => Some(value.0),
            _ => None,
        })
        .unwrap();
    assert_eq!(speed, 2.5);
    match &pb.metric {
        Some(Metric::Minimize(NumericExpr::Head(h))) => assert_eq!(h.name, "total-time"),
        other => panic!("unexpected metric {other:?}"),
    }
}

#[test]
fn rejected_constructs() {
    let cases = [
        (
            "(define (domain d) (:action a :parameters () :precondition (and (p) (and (or (q) (r))))))",
            Construct::Disjunction,
        ),
        (
            "(define (domain d) (:action a :parameters () :precondition (not (and (p) (q)))))",
            Construct::NegatedCompoundGoal,
        ),
        (
            "(define (domain d) (:action a :parameters (?x) :precondition (exists (?y) (p ?y))))",
            Construct::QuantifiedCondition,
        ),
        (
            "(define (domain d) (:action a :parameters () :precondition (> (f) 2)))",
            Construct::FunctionComparison,
        ),
        (
            "(define (domain d) (:action a :parameters () :effect (when (p) (q))))",
            Construct::ConditionalEffect,
        ),
        (
            "(define (domain d) (:action a :parameters () :effect (and (p) (increase (f) 1))))",
            Construct::NumericEffect,
        ),
        (
            "(define (domain d) (:durative-action a :parameters () :duration (at end (<= ?duration 2))))",
            Construct::TimedDurationConstraint,
        ),
        (
            "(define (domain d) (:durative-action a :parameters () :duration (= ?duration 2)
               :effect (increase (f) (* #t 2))))",
            Construct::ContinuousEffect,
        ),
        (
            "(define (domain d) (:action a :parameters () :precondition (imply (p) (q))))",
            Construct::Implication,
        ),
        (
            "(define (domain d) (:action a :parameters () :effect (forall (?x) (p ?x))))",
            Construct::QuantifiedEffect,
        ),
        (
            "(define (domain d) (:durative-action a :parameters () :duration (= ?duration 1)
               :condition (preference p1 (at start (p)))))",
            Construct::Preference,
        ),
        (
            "(define (domain d) (:durative-action a :parameters () :duration (= ?duration 1)
               :effect (forall (?x) (at end (p ?x)))))",
            Construct::QuantifiedEffect,
        ),
        (
            "(define (domain d) (:durative-action a :parameters () :duration (= ?duration 1)
               :effect (at end (and (p) (when (q) (r))))))",
            Construct::ConditionalEffect,
        ),
        (
            "(define (domain d) (:durative-action a :parameters () :duration (= ?duration 1)
               :effect (at end (and (p) (forall (?x) (r ?x))))))",
            Construct::QuantifiedEffect,
        ),
        ("(define (domain d) (:derived (p ?x) (q ?x)))", Construct::DerivedPredicate),
        (
            "(define (domain d) (:constraints (always (p))))",
            Construct::TrajectoryConstraints,
        ),
    ];
    for (text, expected) in cases {
        match domain_error(text) {
            TranslateError::UnsupportedConstruct { construct, .. } => assert_eq!(construct, expected, "{text}"),
            other => panic!("unexpected error {other} for {text}"),
        }
    }
}

#[test]
fn disjunction_text() {
    let err = domain_error("(define (domain d) (:action a :parameters () :precondition (and (p) (or (q) (r)))))");
    assert_eq!(err.text(), "(or (q) (r))");
    assert!(err.span().is_some());
    assert_eq!(err.to_message().get_title(), "Unsupported disjunction");
}

#[test]
fn timed_initial_literal() {
    let err = problem_error("(define (problem p) (:domain d) (:init (at 10 (p a))) (:goal (p a)))");
    assert!(matches!(
        err,
        TranslateError::UnsupportedConstruct {
            construct: Construct::TimedInitialLiteral,
            ..
        }
    ));
}

#[test]
fn malformed_durations() {
    let err = domain_error(
        "(define (domain d) (:durative-action a :parameters ()
           :duration (and (<= ?duration 5) (<= ?duration 2))))",
    );
    assert!(matches!(err, TranslateError::MalformedDuration { .. }), "{err}");
    let err = domain_error("(define (domain d) (:durative-action a :parameters () :condition (at start (p))))");
    assert!(matches!(err, TranslateError::MissingSection { .. }), "{err}");
}

#[test]
fn duration_in_any_order() {
    let dom = domain(
        "(define (domain d) (:durative-action a :parameters ()
           :duration (and (<= ?duration 5) (>= ?duration 2))
           :condition ()
           :effect (and (at start (p)) (at end (not (p))))))",
    );
    let a = &dom.durative_actions[0];
    assert_eq!(*a.duration_lower_bound, NumericExpr::number(2.0));
    assert_eq!(*a.duration_upper_bound, NumericExpr::number(5.0));
    assert!(a.conditions.is_empty());
    assert_eq!(a.get_eff(TimeSpecifier::Start, true), vec![&p("p", &[])]);
    assert_eq!(a.get_eff(TimeSpecifier::End, false), vec![&p("p", &[])]);
    assert!(a.get_eff(TimeSpecifier::Start, false).is_empty());
    assert!(a.get_eff(TimeSpecifier::End, true).is_empty());
}

#[test]
fn missing_sections() {
    let err = problem_error("(define (problem p) (:domain d) (:goal (p a)))");
    assert!(matches!(err, TranslateError::MissingSection { .. }), "{err}");
    let err = problem_error("(define (problem p) (:init (p a)) (:goal (p a)))");
    assert!(matches!(err, TranslateError::MissingSection { .. }), "{err}");
}

#[test]
fn empty_precondition() {
    let dom = domain(
        "(define (domain d) (:action a :parameters () :precondition () :effect (p))
                            (:action b :effect (p)))",
    );
    for a in &dom.actions {
        assert_eq!(a.precondition, Formula::tautology());
        assert!(a.parameters.is_empty());
    }
}

#[test]
fn conjunction_under_timed_effect() {
    let dom = domain(
        "(define (domain d) (:durative-action a :parameters (?x)
           :duration (= ?duration 1)
           :effect (at end (and (p ?x) (not (q ?x))))))",
    );
    let a = &dom.durative_actions[0];
    assert_eq!(a.effects.len(), 2);
    assert_eq!(a.get_eff(TimeSpecifier::End, true), vec![&p("p", &["?x"])]);
    assert_eq!(a.get_eff(TimeSpecifier::End, false), vec![&p("q", &["?x"])]);
}

#[test]
fn bare_function_value() {
    let pb = problem("(define (problem p) (:domain d) (:init (p a) (= total-cost 0)) (:goal (p a)))");
    assert_eq!(pb.initial_facts.len(), 2);
    assert!(matches!(
        &pb.initial_facts[1],
        InitElement::Assign { head, value } if head.name == "total-cost" && head.args.is_empty() && value.0 == 0.0
    ));
    assert_eq!(pb.facts().count(), 1);
    let rendered = pb.as_pddl();
    assert!(rendered.contains("(= (total-cost) 0)"), "{rendered}");
    assert_eq!(problem(&rendered), pb);
}
