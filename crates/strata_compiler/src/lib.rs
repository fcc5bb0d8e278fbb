//! strata_compiler: Evaluation orchestration.
//!
//! Ties the pipeline together: discovers description files, parses them into
//! an arena, builds the scope tree, and replays each directory's statements
//! parent-before-children. Directories at the same depth evaluate in
//! parallel; each one only reads frozen ancestor scopes and produces an
//! owned binding table that is committed and frozen before the next depth
//! starts. A failing directory yields exactly one diagnostic and poisons its
//! descendants; unrelated subtrees keep going.

use bumpalo::Bump;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use strata_ast::node::SourceFile;
use strata_core::intern::StringInterner;
use strata_diagnostics::{messages, Diagnostic, DiagnosticCollection};
use strata_evaluator::Evaluator;
use strata_module::{ModuleInstance, ModuleRegistry};
use strata_parser::Parser;
use strata_scope::{ScopeId, ScopeTree, ScopeTreeError, Value};
use thiserror::Error;

/// The file name that marks a directory as owning a scope.
pub const DESCRIPTION_FILE_NAME: &str = "Strata.build";

/// Errors setting up an evaluation run. Violations during evaluation are
/// diagnostics, not errors; these are input-level failures.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    ScopeTree(#[from] ScopeTreeError),
}

// ============================================================================
// File sets
// ============================================================================

/// A snapshot of the description files in a source tree, mapping
/// `/`-separated relative file paths to their text. Supplied either by an
/// embedder (tests use this directly) or by walking a real directory tree.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    files: BTreeMap<String, String>,
}

impl FileSet {
    pub fn new() -> Self {
        Self {
            files: BTreeMap::new(),
        }
    }

    /// Add one description file, e.g. `lib/Strata.build`.
    pub fn add(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }

    /// Walk a real directory tree collecting every `Strata.build` file.
    pub fn from_disk(root: &Path) -> Result<Self, LoadError> {
        let mut set = Self::new();
        collect_description_files(root, String::new(), &mut set)?;
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn collect_description_files(
    dir: &Path,
    relative: String,
    set: &mut FileSet,
) -> Result<(), LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let child_relative = if relative.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", relative, name)
        };
        if path.is_dir() {
            collect_description_files(&path, child_relative, set)?;
        } else if name == DESCRIPTION_FILE_NAME {
            let text = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            set.add(child_relative, text);
        }
    }
    Ok(())
}

/// The directory that owns a description file ("" for the tree root).
fn dir_of(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => path[..idx].to_string(),
        None => String::new(),
    }
}

/// Depth of a directory below the tree root.
fn depth_of(dir: &str) -> usize {
    if dir.is_empty() {
        0
    } else {
        dir.split('/').count()
    }
}

/// Whether `ancestor` is a strict filesystem ancestor of `dir`.
fn is_strict_ancestor(ancestor: &str, dir: &str) -> bool {
    if ancestor.is_empty() {
        !dir.is_empty()
    } else {
        dir.len() > ancestor.len()
            && dir.starts_with(ancestor)
            && dir.as_bytes()[ancestor.len()] == b'/'
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// What happened to one directory during the run.
#[derive(Debug)]
pub enum DirOutcome {
    /// Evaluation completed; the scope is frozen and these modules were
    /// defined.
    Evaluated { modules: Vec<ModuleInstance> },
    /// Evaluation aborted with this single diagnostic.
    Failed { diagnostic: Diagnostic },
    /// Never evaluated: this ancestor directory failed first.
    Skipped { ancestor: String },
}

impl DirOutcome {
    pub fn is_evaluated(&self) -> bool {
        matches!(self, DirOutcome::Evaluated { .. })
    }
}

/// The result of evaluating a whole description tree.
#[derive(Debug)]
pub struct EvalResult {
    /// The scope tree; every evaluated directory's scope is frozen.
    pub tree: ScopeTree,
    /// Per-directory outcome, keyed by directory path.
    pub outcomes: BTreeMap<String, DirOutcome>,
    /// Every diagnostic of the run (parse and evaluation), sorted by
    /// location.
    pub diagnostics: DiagnosticCollection,
    interner: StringInterner,
}

impl EvalResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    /// All modules from evaluated directories, in directory order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleInstance> {
        self.outcomes.values().filter_map(|o| match o {
            DirOutcome::Evaluated { modules } => Some(modules.iter()),
            _ => None,
        })
        .flatten()
    }

    /// The frozen `name -> value` table of one evaluated directory, sorted
    /// by name. `None` while the directory failed, was skipped, or owns no
    /// description file.
    pub fn variables_of(&self, dir: &str) -> Option<Vec<(String, Value)>> {
        if !self.outcomes.get(dir)?.is_evaluated() {
            return None;
        }
        let scope = self.tree.scope_for_dir(dir)?;
        let mut variables: Vec<(String, Value)> = self
            .tree
            .get(scope)
            .bindings
            .iter()
            .filter_map(|(name, binding)| {
                binding
                    .value()
                    .map(|v| (self.interner.resolve(*name).to_string(), v.clone()))
            })
            .collect();
        variables.sort_by(|a, b| a.0.cmp(&b.0));
        Some(variables)
    }
}

// ============================================================================
// Program
// ============================================================================

/// One evaluation run over a description tree.
pub struct Program<'a> {
    arena: &'a Bump,
    files: FileSet,
    registry: ModuleRegistry,
    interner: StringInterner,
}

impl<'a> Program<'a> {
    /// Create a run. An empty registry disables module-type checking, for
    /// embedders that only consume variables.
    pub fn new(arena: &'a Bump, files: FileSet, registry: ModuleRegistry) -> Self {
        Self {
            arena,
            files,
            registry,
            interner: StringInterner::new(),
        }
    }

    /// The interner shared by every file of this run.
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Parse every description file, build the scope tree, and evaluate it
    /// parent-before-children.
    pub fn evaluate(self) -> Result<EvalResult, LoadError> {
        let mut diagnostics = DiagnosticCollection::new();
        let mut outcomes: BTreeMap<String, DirOutcome> = BTreeMap::new();
        // Directories whose descendants must not run.
        let mut poisoned: Vec<String> = Vec::new();

        // Parse everything up front; the arena owns every AST at once.
        let mut parsed: Vec<(String, SourceFile<'a>)> = Vec::new();
        for (path, text) in self.files.iter() {
            let parser = Parser::new(self.arena, &self.interner, path, text);
            let (source_file, parse_diagnostics) = parser.parse_source_file();
            let dir = dir_of(path);
            if parse_diagnostics.has_errors() {
                // Syntax failures are the collaborator's diagnostics, passed
                // through as the directory's outcome.
                let first = parse_diagnostics
                    .diagnostics()
                    .iter()
                    .find(|d| d.is_error())
                    .cloned();
                diagnostics.extend(parse_diagnostics);
                if let Some(diagnostic) = first {
                    outcomes.insert(dir.clone(), DirOutcome::Failed { diagnostic });
                }
                poisoned.push(dir);
            } else {
                diagnostics.extend(parse_diagnostics);
                parsed.push((dir, source_file));
            }
        }

        let dirs: Vec<String> = self.files.iter().map(|(path, _)| dir_of(path)).collect();
        let mut tree = ScopeTree::build(&dirs)?;

        // Evaluate level by level: every directory at one depth only reads
        // scopes frozen at shallower depths, so siblings run in parallel.
        parsed.sort_by_key(|(dir, _)| (depth_of(dir), dir.clone()));
        let mut index = 0;
        while index < parsed.len() {
            let depth = depth_of(&parsed[index].0);
            let mut level_end = index;
            while level_end < parsed.len() && depth_of(&parsed[level_end].0) == depth {
                level_end += 1;
            }

            let mut ready = Vec::new();
            for (dir, source_file) in &parsed[index..level_end] {
                let ancestor = poisoned
                    .iter()
                    .find(|p| is_strict_ancestor(p, dir))
                    .cloned();
                match (ancestor, tree.scope_for_dir(dir)) {
                    (Some(ancestor), _) => {
                        outcomes.insert(dir.clone(), DirOutcome::Skipped { ancestor });
                    }
                    (None, Some(scope)) => ready.push((dir.clone(), scope, source_file)),
                    // Every parsed directory was handed to ScopeTree::build.
                    (None, None) => unreachable!("directory {dir:?} has no scope"),
                }
            }

            let results: Vec<(
                String,
                ScopeId,
                Result<strata_evaluator::EvalOutput, Diagnostic>,
            )> = ready
                .into_par_iter()
                .map(|(dir, scope, source_file)| {
                    let result = Evaluator::new(&tree, scope).evaluate(source_file);
                    (dir, scope, result)
                })
                .collect();

            // Commit sequentially: freezing is a single-writer step.
            for (dir, scope, result) in results {
                match result {
                    Ok(output) => match self.check_module_types(&output.modules) {
                        Some(diagnostic) => {
                            diagnostics.add(diagnostic.clone());
                            outcomes.insert(dir.clone(), DirOutcome::Failed { diagnostic });
                            poisoned.push(dir);
                        }
                        None => {
                            tree.commit(scope, output.bindings);
                            outcomes.insert(
                                dir,
                                DirOutcome::Evaluated {
                                    modules: output.modules,
                                },
                            );
                        }
                    },
                    Err(diagnostic) => {
                        diagnostics.add(diagnostic.clone());
                        outcomes.insert(dir.clone(), DirOutcome::Failed { diagnostic });
                        poisoned.push(dir);
                    }
                }
            }

            index = level_end;
        }

        diagnostics.sort();
        Ok(EvalResult {
            tree,
            outcomes,
            diagnostics,
            interner: self.interner,
        })
    }

    /// The first module whose type is not registered, if checking is on.
    fn check_module_types(&self, modules: &[ModuleInstance]) -> Option<Diagnostic> {
        if self.registry.is_empty() {
            return None;
        }
        modules
            .iter()
            .find(|m| !self.registry.is_registered(&m.type_name))
            .map(|m| {
                Diagnostic::with_location(
                    m.location.clone(),
                    &messages::UNRECOGNIZED_MODULE_TYPE_0,
                    &[m.type_name.as_str()],
                )
            })
    }
}
