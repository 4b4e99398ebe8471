//! Vault-wide link resolution index

use std::collections::{BTreeMap, HashMap, HashSet};

use super::markdown::parse_metadata;
use super::{ContentStore, basename, is_markdown, normalize_path, parent_of};
use crate::Result;

/// Resolved links: source path -> target path -> occurrence count
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkIndex {
    resolved: BTreeMap<String, BTreeMap<String, usize>>,
}

/// Lookup tables used to resolve link text to a file
struct Resolver {
    files: HashSet<String>,
    by_basename: HashMap<String, Vec<String>>,
}

impl Resolver {
    fn new(files: impl IntoIterator<Item = String>) -> Self {
        let files: HashSet<String> = files.into_iter().collect();
        let mut by_basename: HashMap<String, Vec<String>> = HashMap::new();
        for path in &files {
            by_basename
                .entry(basename(path).to_lowercase())
                .or_default()
                .push(path.clone());
        }
        Self { files, by_basename }
    }

    /// Exact path, path + `.md` (from the source folder, then the root), or
    /// a unique basename match
    fn resolve(&self, source: &str, link: &str) -> Option<String> {
        let folder = parent_of(source);
        let mut bases = Vec::with_capacity(2);
        if !folder.is_empty() {
            bases.push(format!("{folder}/{link}"));
        }
        bases.push(link.to_string());

        for base in bases {
            let Ok(candidate) = normalize_path(&base) else {
                continue;
            };
            if self.files.contains(&candidate) {
                return Some(candidate);
            }
            let with_ext = format!("{candidate}.md");
            if self.files.contains(&with_ext) {
                return Some(with_ext);
            }
        }

        let key = basename(link).to_lowercase();
        match self.by_basename.get(&key).map(Vec::as_slice) {
            Some([only]) => Some(only.clone()),
            _ => None,
        }
    }
}

impl LinkIndex {
    /// Build the index by parsing every markdown note in the store
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be listed; unreadable notes are
    /// skipped
    pub async fn build(store: &dyn ContentStore) -> Result<Self> {
        let entries = store.list_entries().await?;
        let files: Vec<String> = entries
            .into_iter()
            .filter(super::Entry::is_file)
            .map(|e| e.path)
            .collect();
        let resolver = Resolver::new(files.iter().cloned());

        let mut index = Self::default();
        for source in files.iter().filter(|p| is_markdown(p)) {
            let content = match store.read(source).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::debug!(path = %source, error = %e, "skipping unreadable note");
                    continue;
                }
            };
            for link in parse_metadata(&content).links {
                if let Some(target) = resolver.resolve(source, &link.link) {
                    index.add(source, &target);
                }
            }
        }

        tracing::debug!(sources = index.resolved.len(), "built link index");
        Ok(index)
    }

    /// Record one link occurrence
    pub fn add(&mut self, source: &str, target: &str) {
        *self
            .resolved
            .entry(source.to_string())
            .or_default()
            .entry(target.to_string())
            .or_insert(0) += 1;
    }

    /// Sources linking to `target`, most links first
    #[must_use]
    pub fn backlinks(&self, target: &str) -> Vec<(String, usize)> {
        let mut out: Vec<(String, usize)> = self
            .resolved
            .iter()
            .filter_map(|(source, targets)| {
                targets
                    .get(target)
                    .filter(|count| **count > 0)
                    .map(|count| (source.clone(), *count))
            })
            .collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }

    /// Resolved outbound links of `source`
    #[must_use]
    pub fn outbound(&self, source: &str) -> Option<&BTreeMap<String, usize>> {
        self.resolved.get(source)
    }
}
