//! Locates the domain file of a problem from common naming conventions of planning benchmarks.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::errors::{Ctx, Message, Res};

/// Names of the files that may hold the domain of the problem `problem_filename`, by order of preference.
fn candidate_names(problem_filename: &str) -> Res<Vec<PathBuf>> {
    let mut candidates: Vec<PathBuf> = vec![Path::new("domain.pddl").to_path_buf()];

    // XXXXX.YY.pb.pddl and XXXXX.pb.pddl have the domain XXXXX.dom.pddl
    let re = Regex::new(r"^(.+?)(\.[^.]+)?\.pb\.pddl$")?;
    for m in re.captures_iter(problem_filename) {
        candidates.push(format!("{}.dom.pddl", &m[1]).into());
    }
    // XXXXX.pddl has the domain XXXXX-domain.pddl or domain-XXXXX.pddl
    let re = Regex::new(r"^(.+)\.pddl$")?;
    for m in re.captures_iter(problem_filename) {
        candidates.push(format!("{}-domain.pddl", &m[1]).into());
        candidates.push(format!("domain-{}.pddl", &m[1]).into());
    }
    // instance-NN.pddl has the domain domain-NN.pddl
    let re = Regex::new(r"^(?:instance|p|problem)-?([0-9]+)\.pddl$")?;
    for m in re.captures_iter(problem_filename) {
        candidates.push(format!("domain-{}.pddl", &m[1]).into());
        candidates.push(format!("domain{}.pddl", &m[1]).into());
    }
    Ok(candidates)
}

/// Attempts to find the domain file of the given problem.
///
/// Candidate file names are looked up in the directory of the problem, its parent and the
/// `domains` directory next to it.
pub fn find_domain_of(problem_file: &Path) -> Res<PathBuf> {
    let problem_filename = problem_file
        .file_name()
        .title("Invalid file")?
        .to_str()
        .title("Could not convert file name to utf8")?;
    let candidates = candidate_names(problem_filename)?;

    let mut directories = Vec::with_capacity(3);
    if let Some(curr) = problem_file.parent() {
        directories.push(curr.to_owned());
        if let Some(parent) = curr.parent() {
            directories.push(parent.to_owned());
            directories.push(parent.join("domains"));
        }
    }

    for f in &candidates {
        for dir in &directories {
            let candidate = dir.join(f);
            if candidate.exists() && candidate != problem_file {
                return Ok(candidate);
            }
        }
    }
    Err(Message::error(format!(
        "Could not find a domain file in the same or parent directory as the problem file. Candidates: {candidates:?}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(problem: &str) -> Vec<String> {
        candidate_names(problem)
            .unwrap()
            .into_iter()
            .map(|p| p.display().to_string())
            .collect()
    }

    #[test]
    fn naming_conventions() {
        assert!(names("gripper.04.pb.pddl").contains(&"gripper.dom.pddl".to_string()));
        assert!(names("rovers.pb.pddl").contains(&"rovers.dom.pddl".to_string()));
        assert!(names("p01.pddl").contains(&"p01-domain.pddl".to_string()));
        assert!(names("instance-3.pddl").contains(&"domain-3.pddl".to_string()));
        assert_eq!(names("problem.pddl")[0], "domain.pddl");
    }
}
