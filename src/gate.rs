// src/gate.rs

//! Existence gate: decide whether a run should happen at all.
//!
//! Before anything is spawned, the configured spec path pattern is checked
//! against the filesystem. When nothing matches, the run short-circuits:
//! relaxed policy resolves as a skipped (successful) run, strict policy
//! (`fail-when-no-tests-run`) resolves as [`SupervisorError::NoSpecsFound`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result as AnyResult};
use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, info, warn};

use crate::config::RunOptions;
use crate::errors::{Result, SupervisorError};
use crate::fs::FileSystem;

/// Outcome of the existence gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// At least one entry matches; go ahead and launch.
    Proceed,
    /// Nothing matches and the relaxed policy is active; resolve as success.
    Skip,
}

/// Run the gate for the given options.
pub fn check(fs: &dyn FileSystem, opts: &RunOptions) -> Result<GateDecision> {
    if any_match(fs, &opts.path)? {
        debug!(path = %opts.path, "spec path matched; proceeding");
        return Ok(GateDecision::Proceed);
    }

    if opts.fail_when_no_tests_run() {
        return Err(SupervisorError::NoSpecsFound {
            path: opts.path.clone(),
        });
    }

    info!(path = %opts.path, "[mocha] Directory {} does not exist. Not running", opts.path);
    Ok(GateDecision::Skip)
}

/// Returns true if at least one filesystem entry (file or directory) matches
/// `pattern`.
///
/// Patterns without glob metacharacters are treated as plain paths. Glob
/// patterns are matched component-wise: `*` does not cross `/`, `**` does.
pub fn any_match(fs: &dyn FileSystem, pattern: &str) -> AnyResult<bool> {
    if !has_glob_meta(pattern) {
        return Ok(fs.exists(Path::new(pattern)));
    }

    let (base, rest) = split_literal_base(pattern);
    let root = if base.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(&base)
    };
    if !fs.is_dir(&root) {
        return Ok(false);
    }

    let matcher = compile(pattern)?;
    let max_depth = if rest.iter().any(|c| c.contains("**")) {
        usize::MAX
    } else {
        rest.len()
    };

    let mut stack = vec![(root.clone(), 1usize)];
    while let Some((dir, depth)) = stack.pop() {
        let children = match fs.read_dir(&dir) {
            Ok(children) => children,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                continue;
            }
        };

        for child in children {
            let candidate = candidate_string(&child, &root, base.is_empty());
            if matcher.is_match(&candidate) {
                return Ok(true);
            }
            if depth < max_depth && fs.is_dir(&child) {
                stack.push((child, depth + 1));
            }
        }
    }

    Ok(false)
}

fn has_glob_meta(s: &str) -> bool {
    s.contains(['*', '?', '[', '{'])
}

/// Split a pattern into its literal leading directory and the remaining
/// components (the first of which contains a glob metacharacter).
fn split_literal_base(pattern: &str) -> (String, Vec<&str>) {
    let components: Vec<&str> = pattern.split('/').collect();
    let first_glob = components
        .iter()
        .position(|c| has_glob_meta(c))
        .unwrap_or(components.len());

    let base = components[..first_glob].join("/");
    let base = if base.is_empty() && pattern.starts_with('/') {
        "/".to_string()
    } else {
        base
    };
    (base, components[first_glob..].to_vec())
}

fn compile(pattern: &str) -> AnyResult<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid spec path pattern: {pattern}"))?;
    Ok(glob.compile_matcher())
}

/// Normalise a walked path into the string form the pattern is written in.
fn candidate_string(path: &Path, root: &Path, relative_to_root: bool) -> String {
    let path = if relative_to_root {
        path.strip_prefix(root).unwrap_or(path)
    } else {
        path
    };
    path.to_string_lossy().replace('\\', "/")
}
