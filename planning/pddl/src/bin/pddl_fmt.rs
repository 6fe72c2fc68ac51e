use clap::Parser;
use itertools::Itertools;
use pddl_ast::translate::{translate_domain, translate_problem};
use pddl_ast::{Domain, Predicate, TimeSpecifier};
use pddl_syntax::errors::*;
use pddl_syntax::{find_domain_of, read_domain_tree, read_problem_tree, Input};
use std::path::PathBuf;
use std::time::Instant;

/// Reads a PDDL domain and problem and prints them back in canonical form.
///
/// Any construct that cannot be represented (disjunctions, conditional effects, ...) is reported as an error.
#[derive(Debug, Parser)]
#[command(name = "pddl-fmt", rename_all = "kebab-case")]
struct Args {
    /// If not set, will look for a `domain.pddl` file in the directory of the
    /// problem file or in the parent directory.
    #[arg(long, short)]
    domain: Option<PathBuf>,
    /// Path to the problem file.
    problem: PathBuf,
    /// Logging level to use: one of "error", "warn", "info", "debug", "trace"
    #[arg(long, short, default_value = "info")]
    log_level: tracing::Level,
    /// Also print the predicates required, added and deleted by each action.
    #[arg(long)]
    queries: bool,
}

fn main() -> Res<()> {
    let opt = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_timer(tracing_subscriber::fmt::time::Uptime::from(Instant::now()))
        .with_writer(std::io::stderr)
        .with_max_level(opt.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let problem_file = &opt.problem;
    if !problem_file.exists() {
        return Err(Message::error(format!(
            "Problem file {} does not exist",
            problem_file.display()
        )));
    }

    let problem_file = problem_file.canonicalize()?;
    let domain_file = match opt.domain {
        Some(name) => name,
        None => find_domain_of(&problem_file)
            .map_err(|e| e.ctx("Consider specifying the domain with the option -d/--domain"))?,
    };
    tracing::info!("domain: {}", domain_file.display());
    tracing::info!("problem: {}", problem_file.display());

    let domain_tree = read_domain_tree(Input::from_file(&domain_file)?)?;
    let problem_tree = read_problem_tree(Input::from_file(&problem_file)?)?;

    let domain = translate_domain(&domain_tree).map_err(|e| e.to_message())?;
    let problem = translate_problem(&problem_tree).map_err(|e| e.to_message())?;
    if !problem.domain_name.eq_ignore_ascii_case(&domain.name) {
        tracing::warn!(
            "problem {} refers to domain {} but was given domain {}",
            problem.name,
            problem.domain_name,
            domain.name
        );
    }

    println!("{domain}\n");
    println!("{problem}");

    if opt.queries {
        println!();
        print_queries(&domain);
    }
    Ok(())
}

fn list(predicates: Vec<&Predicate>) -> String {
    predicates.iter().join(" ")
}

fn print_queries(domain: &Domain) {
    for a in &domain.actions {
        println!("{}", a.name);
        println!("  pre+: {}", list(a.get_pre(true)));
        println!("  pre-: {}", list(a.get_pre(false)));
        println!("  eff+: {}", list(a.get_eff(true)));
        println!("  eff-: {}", list(a.get_eff(false)));
    }
    for a in &domain.durative_actions {
        println!("{}", a.name);
        for time in [TimeSpecifier::Start, TimeSpecifier::All, TimeSpecifier::End] {
            println!("  cond+ {time}: {}", list(a.get_cond(time, true)));
            println!("  cond- {time}: {}", list(a.get_cond(time, false)));
        }
        for time in [TimeSpecifier::Start, TimeSpecifier::End] {
            println!("  eff+ {time}: {}", list(a.get_eff(time, true)));
            println!("  eff- {time}: {}", list(a.get_eff(time, false)));
        }
    }
}
