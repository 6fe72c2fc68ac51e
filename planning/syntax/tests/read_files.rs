use pddl_syntax::{find_domain_of, read_domain_tree, read_problem_tree, Input, Rule, Spanned};
use std::path::PathBuf;

fn benchmarks() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../pddl/tests/pddl")
}

#[test]
fn finds_domain_next_to_problem() {
    for name in ["gripper", "rovers"] {
        let problem = benchmarks().join(name).join("p01.pddl");
        let domain = find_domain_of(&problem).unwrap();
        assert_eq!(domain.file_name().unwrap(), "domain.pddl");
        assert_eq!(domain.parent(), problem.parent());
    }
}

#[test]
fn reads_benchmarks() {
    for name in ["gripper", "rovers"] {
        let dir = benchmarks().join(name);
        let domain = read_domain_tree(Input::from_file(&dir.join("domain.pddl")).unwrap()).unwrap();
        assert_eq!(domain.rule(), Rule::Domain);
        assert!(domain.children_of(Rule::StructureDef).count() >= 3);
        let problem = read_problem_tree(Input::from_file(&dir.join("p01.pddl")).unwrap()).unwrap();
        assert_eq!(problem.rule(), Rule::Problem);
        let init = problem.first_of(Rule::Init).unwrap();
        assert!(init.children_of(Rule::InitEl).count() >= 5);
        // nodes read from a file point back to their source text
        let goal = problem.first_of(Rule::Goal).unwrap();
        assert!(goal.span().is_some());
        assert!(goal.text().starts_with("(:goal"));
    }
}

#[test]
fn error_location() {
    let text = "(define (domain d)\n  (:predicates (p))\n  (:unknown-block))";
    let err = read_domain_tree(Input::from_string(text)).unwrap_err();
    assert!(err.get_title().starts_with("unsupported block"), "{}", err.get_title());
    let rendered = err.to_string();
    assert!(rendered.contains(":unknown-block"), "{rendered}");
    assert!(rendered.contains("while reading a PDDL domain"), "{rendered}");
}
