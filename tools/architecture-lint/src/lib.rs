//! Workspace lint for crate layering.
//!
//! The pure crates must stay free of IO and of anything above them:
//!
//! - `core` depends on nothing else in the workspace
//! - `events` may use `core`, and may log through `tracing`
//! - `ledger` may use `core` and `events`, and never logs
//!
//! None of them may reach infrastructure crates, the tracing subscriber, or
//! the filesystem, network, process and environment modules of `std`.
//!
//! Run with `cargo run -p architecture-lint`.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use syn::visit::Visit;
use thiserror::Error;

/// A single boundary violation discovered by the linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `crates/`.
    pub file: PathBuf,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

#[derive(Debug, Error)]
pub enum ArchitectureLintError {
    #[error("I/O error while linting architecture: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse {}: {message}", .file.display())]
    Parse { file: PathBuf, message: String },

    #[error("architecture boundary violations:\n{}", render(.0))]
    Violations(Vec<Violation>),
}

fn render(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("- {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `crates/`, e.g. `ledger/src/group.rs`.
    pub file: PathBuf,
    pub contents: String,
}

/// The pure crates checked by the lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Core,
    Events,
    Ledger,
}

const LINTED_CRATES: [&str; 3] = ["core", "events", "ledger"];

const INFRA_CRATES: [&str; 4] = [
    "splitledger_infra",
    "splitledger_observability",
    "splitledger_cli",
    "tracing_subscriber",
];

const FORBIDDEN_STD_MODULES: [&str; 4] = ["fs", "net", "process", "env"];

impl Layer {
    fn infer_from_path(relative_path: &Path) -> Option<Self> {
        let first = relative_path
            .components()
            .next()?
            .as_os_str()
            .to_string_lossy();
        match first.as_ref() {
            "core" => Some(Self::Core),
            "events" => Some(Self::Events),
            "ledger" => Some(Self::Ledger),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Events => "events",
            Self::Ledger => "ledger",
        }
    }

    fn forbidden_crate_roots(self) -> BTreeSet<&'static str> {
        let mut roots = BTreeSet::from(INFRA_CRATES);
        match self {
            Self::Core => {
                roots.extend(["splitledger_events", "splitledger_ledger", "tracing"]);
            }
            Self::Events => {
                roots.insert("splitledger_ledger");
            }
            Self::Ledger => {
                roots.insert("tracing");
            }
        }
        roots
    }
}

/// Lint the pure crates under `crates_dir` (the workspace `crates/` directory).
pub fn lint_workspace_sources(crates_dir: &Path) -> Result<(), ArchitectureLintError> {
    let mut sources = Vec::new();
    for name in LINTED_CRATES {
        let src = crates_dir.join(name).join("src");
        if src.exists() {
            collect_sources_under(crates_dir, &src, &mut sources)?;
        }
    }
    lint_sources(&sources)
}

/// Lint the provided Rust sources. Intended for tests.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();

    for source in sources {
        let layer = Layer::infer_from_path(&source.file).ok_or_else(|| ArchitectureLintError::Parse {
            file: source.file.clone(),
            message: "unable to infer crate layer from file path".to_owned(),
        })?;
        let parsed = syn::parse_file(&source.contents).map_err(|err| ArchitectureLintError::Parse {
            file: source.file.clone(),
            message: err.to_string(),
        })?;
        violations.extend(lint_parsed_source(&source.file, layer, &parsed));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

fn lint_parsed_source(file: &Path, layer: Layer, parsed: &syn::File) -> Vec<Violation> {
    let forbidden = layer.forbidden_crate_roots();

    let mut collector = PathCollector::default();
    collector.visit_file(parsed);

    let mut messages = BTreeSet::new();
    for segments in &collector.paths {
        let Some(root) = segments.first().map(String::as_str) else {
            continue;
        };
        if let Some(hit) = forbidden.get(root) {
            messages.insert(format!("{} crate must not depend on `{hit}`", layer.name()));
        }
        if matches!(root, "std" | "core") {
            if let Some(module) = segments.get(1) {
                if FORBIDDEN_STD_MODULES.contains(&module.as_str()) {
                    messages.insert(format!("{} crate must not use `std::{module}`", layer.name()));
                }
            }
        }
    }

    messages
        .into_iter()
        .map(|message| Violation {
            file: file.to_path_buf(),
            message,
        })
        .collect()
}

#[derive(Default)]
struct PathCollector {
    paths: BTreeSet<Vec<String>>,
}

impl PathCollector {
    fn record_path(&mut self, path: &syn::Path) {
        let segments: Vec<String> = path
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        if !segments.is_empty() {
            self.paths.insert(segments);
        }
    }

    fn record_use_tree(&mut self, tree: &syn::UseTree, prefix: Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                let mut next = prefix;
                next.push(path.ident.to_string());
                self.record_use_tree(&path.tree, next);
            }
            syn::UseTree::Name(name) => {
                let mut segments = prefix;
                segments.push(name.ident.to_string());
                self.paths.insert(segments);
            }
            syn::UseTree::Rename(rename) => {
                let mut segments = prefix;
                segments.push(rename.ident.to_string());
                self.paths.insert(segments);
            }
            syn::UseTree::Glob(_) => {
                let mut segments = prefix;
                segments.push("*".to_owned());
                self.paths.insert(segments);
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.record_use_tree(item, prefix.clone());
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for PathCollector {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        self.record_path(node);
        syn::visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.record_use_tree(&node.tree, Vec::new());
    }
}

fn collect_sources_under(
    root: &Path,
    current: &Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    for entry in fs::read_dir(current)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_sources_under(root, &path, sources)?;
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("rs") {
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .map_err(|err| ArchitectureLintError::Parse {
                file: path.clone(),
                message: err.to_string(),
            })?
            .to_path_buf();
        let contents = fs::read_to_string(&path)?;
        sources.push(LintSource {
            file: relative,
            contents,
        });
    }
    Ok(())
}
