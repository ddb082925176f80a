//! The layered variable resolver

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chsync_model::Value;

use crate::loader;
use crate::placeholder::{Segment, tokenize};
use crate::source::{ProcessEnv, VariableEntry, VariableSource};
use crate::{Error, Result};

/// Result of resolving one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub resolved: String,
    /// Names left verbatim, in first-seen order
    pub unresolved_vars: Vec<String>,
}

/// Result of resolving every text leaf of a value.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectResolution {
    pub resolved: Value,
    pub unresolved_vars: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    /// Fail when any placeholder has neither a value nor an inline default
    pub strict: bool,
    /// Caller-supplied variables, ranked just below the process environment
    pub extra: HashMap<String, String>,
    pub process_env: ProcessEnv,
}

/// Resolves `${NAME}` / `${NAME:default}` placeholders.
///
/// Resolution never mutates the variable table, so `resolve` may be called
/// from several threads on a shared resolver.
#[derive(Debug, Clone, Default)]
pub struct VariableResolver {
    options: ResolverOptions,
    environment: HashMap<String, String>,
    base: HashMap<String, String>,
    environment_name: Option<String>,
}

impl VariableResolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Replace the base layer.
    pub fn with_base(mut self, vars: HashMap<String, String>) -> Self {
        self.base = vars;
        self
    }

    /// Replace the environment-specific layer.
    pub fn with_environment(mut self, vars: HashMap<String, String>) -> Self {
        self.environment = vars;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.options.strict
    }

    /// Name of the environment loaded by [`Self::load_environment`], if any.
    pub fn environment_name(&self) -> Option<&str> {
        self.environment_name.as_deref()
    }

    /// Load `environments/base.<ext>` and, when `env_name` is given,
    /// `environments/<env_name>.<ext>` beneath `repo_root`, merging both into
    /// the variable table.
    ///
    /// A missing base file is not an error. A named environment without a
    /// file is.
    pub async fn load_environment(&mut self, repo_root: &Path, env_name: Option<&str>) -> Result<()> {
        let dir = repo_root.join("environments");

        match loader::load_variable_file(&dir, "base").await? {
            Some(vars) => {
                tracing::debug!(count = vars.len(), "Loaded base variables");
                self.base.extend(vars);
            }
            None => tracing::debug!(dir = %dir.display(), "No base variable file"),
        }

        if let Some(name) = env_name {
            let vars = loader::load_variable_file(&dir, name)
                .await?
                .ok_or_else(|| Error::EnvironmentNotFound {
                    name: name.to_string(),
                    dir: dir.clone(),
                })?;
            tracing::debug!(environment = %name, count = vars.len(), "Loaded environment variables");
            self.environment.extend(vars);
            self.environment_name = Some(name.to_string());
        }

        Ok(())
    }

    /// Resolve every placeholder in `text`.
    pub fn resolve(&self, text: &str) -> Result<Resolution> {
        let mut unresolved = Vec::new();
        let mut in_progress = Vec::new();
        let resolved = self.expand(text, &mut in_progress, &mut unresolved)?;
        self.check_strict(&unresolved)?;
        Ok(Resolution {
            resolved,
            unresolved_vars: unresolved,
        })
    }

    /// Resolve every text leaf of `value`, recursing through mappings and sequences.
    pub fn resolve_object(&self, value: &Value) -> Result<ObjectResolution> {
        let mut unresolved = Vec::new();
        let resolved = value.map_strings(&mut |text| {
            let mut in_progress = Vec::new();
            self.expand(text, &mut in_progress, &mut unresolved)
        })?;
        self.check_strict(&unresolved)?;
        Ok(ObjectResolution {
            resolved,
            unresolved_vars: unresolved,
        })
    }

    /// Whether `text` contains at least one recognized placeholder.
    pub fn has_variables(text: &str) -> bool {
        tokenize(text)
            .iter()
            .any(|segment| matches!(segment, Segment::Placeholder(_)))
    }

    /// Every placeholder name in `text`, including those inside defaults,
    /// in first-seen order without duplicates.
    pub fn extract_variable_names(text: &str) -> Vec<String> {
        let mut names = Vec::new();
        collect_names(text, &mut names);
        names
    }

    /// The winning value and source of every variable the table knows about.
    pub fn variable_map(&self) -> BTreeMap<String, VariableEntry> {
        let mut names: Vec<String> = self
            .base
            .keys()
            .chain(self.environment.keys())
            .chain(self.options.extra.keys())
            .cloned()
            .collect();
        names.extend(self.options.process_env.known_names());

        names
            .into_iter()
            .filter_map(|name| {
                let (value, source) = self.lookup(&name)?;
                Some((name, VariableEntry { value, source }))
            })
            .collect()
    }

    /// Like [`Self::variable_map`], restricted to the names referenced by
    /// `text` and including inline defaults for names the table lacks.
    pub fn explain(&self, text: &str) -> BTreeMap<String, VariableEntry> {
        let mut defaults = HashMap::new();
        collect_defaults(text, &mut defaults);

        Self::extract_variable_names(text)
            .into_iter()
            .filter_map(|name| {
                let entry = match self.lookup(&name) {
                    Some((value, source)) => VariableEntry { value, source },
                    None => VariableEntry {
                        value: defaults.get(&name)?.clone(),
                        source: VariableSource::InlineDefault,
                    },
                };
                Some((name, entry))
            })
            .collect()
    }

    fn lookup(&self, name: &str) -> Option<(String, VariableSource)> {
        if let Some(value) = self.options.process_env.get(name) {
            return Some((value, VariableSource::ProcessEnvironment));
        }
        if let Some(value) = self.options.extra.get(name) {
            return Some((value.clone(), VariableSource::Extra));
        }
        if let Some(value) = self.environment.get(name) {
            return Some((value.clone(), VariableSource::Environment));
        }
        self.base
            .get(name)
            .map(|value| (value.clone(), VariableSource::Base))
    }

    /// Expand `text`, with `in_progress` holding the names currently being
    /// expanded on this call path.
    fn expand(
        &self,
        text: &str,
        in_progress: &mut Vec<String>,
        unresolved: &mut Vec<String>,
    ) -> Result<String> {
        let mut out = String::with_capacity(text.len());

        for segment in tokenize(text) {
            let placeholder = match segment {
                Segment::Text(literal) => {
                    out.push_str(literal);
                    continue;
                }
                Segment::Placeholder(p) => p,
            };

            if let Some(start) = in_progress.iter().position(|n| n == placeholder.name) {
                let mut chain: Vec<&str> = in_progress[start..].iter().map(String::as_str).collect();
                chain.push(placeholder.name);
                return Err(Error::CircularReference {
                    chain: chain.join(" -> "),
                });
            }

            match (self.lookup(placeholder.name), placeholder.default) {
                (Some((value, _)), _) => {
                    in_progress.push(placeholder.name.to_string());
                    let expanded = self.expand(&value, in_progress, unresolved)?;
                    in_progress.pop();
                    out.push_str(&expanded);
                }
                (None, Some(default)) => {
                    out.push_str(&self.expand(default, in_progress, unresolved)?);
                }
                (None, None) => {
                    out.push_str(placeholder.raw);
                    if !unresolved.iter().any(|n| n == placeholder.name) {
                        unresolved.push(placeholder.name.to_string());
                    }
                }
            }
        }

        Ok(out)
    }

    fn check_strict(&self, unresolved: &[String]) -> Result<()> {
        if self.options.strict && !unresolved.is_empty() {
            return Err(Error::Unresolved {
                names: unresolved.to_vec(),
            });
        }
        Ok(())
    }
}

fn collect_names(text: &str, names: &mut Vec<String>) {
    for segment in tokenize(text) {
        if let Segment::Placeholder(p) = segment {
            if !names.iter().any(|n| n == p.name) {
                names.push(p.name.to_string());
            }
            if let Some(default) = p.default {
                collect_names(default, names);
            }
        }
    }
}

fn collect_defaults(text: &str, defaults: &mut HashMap<String, String>) {
    for segment in tokenize(text) {
        if let Segment::Placeholder(p) = segment {
            if let Some(default) = p.default {
                defaults
                    .entry(p.name.to_string())
                    .or_insert_with(|| default.to_string());
                collect_defaults(default, defaults);
            }
        }
    }
}
