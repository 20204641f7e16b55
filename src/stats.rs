//! Solution statistics and translation coverage.
//!
//! [`SolutionStats`] only looks at the tree. [`coverage`] also loads every
//! source and target file through the registry and compares their keys.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    path::Path,
};

use serde::Serialize;
use tracing::debug;

use crate::{
    cancel::CancellationToken,
    error::Error,
    model::{FileReference, Project, Solution},
    registry::Registry,
    types::ResourceEntry,
    visitor::{Acceptor, Visitor, walk_solution},
};

/// Counts gathered from the tree alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SolutionStats {
    pub projects: usize,
    pub source_files: usize,
    pub target_files: usize,
    /// Number of files per format tag.
    pub formats: BTreeMap<String, usize>,
    /// Distinct cultures inferred from target file names.
    pub cultures: BTreeSet<String>,
}

impl SolutionStats {
    pub fn collect(solution: &Solution) -> Self {
        let mut stats = SolutionStats::default();
        solution
            .accept(&mut stats, false)
            .unwrap_or_else(|never| match never {});
        stats
    }
}

/// The cursor tells whether a file reference is a project's source.
impl Visitor<bool> for SolutionStats {
    type Value = ();
    type Error = std::convert::Infallible;

    fn visit_solution(&mut self, node: &Solution, cursor: bool) -> Result<(), Self::Error> {
        walk_solution(self, node, cursor)
    }

    fn visit_project(&mut self, node: &Project, _: bool) -> Result<(), Self::Error> {
        self.projects += 1;
        if let Some(source) = node.source() {
            source.accept(self, true)?;
        }
        for target in node.targets() {
            target.accept(self, false)?;
        }
        Ok(())
    }

    fn visit_file_reference(
        &mut self,
        node: &FileReference,
        is_source: bool,
    ) -> Result<(), Self::Error> {
        *self.formats.entry(node.format.to_ascii_lowercase()).or_insert(0) += 1;
        if is_source {
            self.source_files += 1;
        } else {
            self.target_files += 1;
            if let Some(culture) = node.culture() {
                self.cultures.insert(culture.to_string());
            }
        }
        Ok(())
    }
}

/// Key coverage of one target file against its project's source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetCoverage {
    pub project: String,
    pub path: String,
    pub culture: Option<String>,
    /// Keys in the source file.
    pub total: usize,
    /// Source keys present in the target with a non-empty value.
    pub translated: usize,
    /// Source keys absent from the target or empty there, in source order.
    pub missing: Vec<String>,
    /// Target keys the source no longer has, in target order.
    pub obsolete: Vec<String>,
}

impl TargetCoverage {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.translated as f64) * 100.0 / (self.total as f64)
        }
    }
}

/// Loads every file of `solution` and reports coverage per target.
///
/// Projects without a source file are skipped. Fails on the first file that
/// cannot be loaded, or with [`Error::Cancelled`].
pub fn coverage(
    solution: &Solution,
    registry: &Registry,
    cancel: &CancellationToken,
) -> Result<Vec<TargetCoverage>, Error> {
    let mut collector = CoverageCollector {
        registry,
        cancel,
        source_keys: Vec::new(),
        project: String::new(),
        reports: Vec::new(),
    };
    solution.accept(&mut collector, ())?;
    Ok(collector.reports)
}

/// Reads all entries of `file` with the codec registered for its type.
pub fn load_file(
    registry: &Registry,
    file: &FileReference,
    cancel: &CancellationToken,
) -> Result<Vec<ResourceEntry>, Error> {
    let codec = registry
        .select(&file.format)
        .ok_or_else(|| Error::UnknownFormat(file.format.clone()))?;
    codec.load(Path::new(&file.path), cancel)?.collect()
}

struct CoverageCollector<'a> {
    registry: &'a Registry,
    cancel: &'a CancellationToken,
    source_keys: Vec<String>,
    project: String,
    reports: Vec<TargetCoverage>,
}

impl Visitor<()> for CoverageCollector<'_> {
    type Value = ();
    type Error = Error;

    fn visit_solution(&mut self, node: &Solution, cursor: ()) -> Result<(), Error> {
        walk_solution(self, node, cursor)
    }

    fn visit_project(&mut self, node: &Project, cursor: ()) -> Result<(), Error> {
        let Some(source) = node.source() else {
            debug!(project = node.name(), "no source file, skipping coverage");
            return Ok(());
        };
        self.project = node.name().to_string();
        self.source_keys = load_file(self.registry, source, self.cancel)?
            .into_iter()
            .map(|entry| entry.key)
            .collect();

        for target in node.targets() {
            target.accept(self, cursor)?;
        }
        Ok(())
    }

    fn visit_file_reference(&mut self, node: &FileReference, _: ()) -> Result<(), Error> {
        let entries = load_file(self.registry, node, self.cancel)?;
        let values: HashMap<&str, &str> = entries
            .iter()
            .map(|e| (e.key.as_str(), e.value.as_str()))
            .collect();

        let missing: Vec<String> = self
            .source_keys
            .iter()
            .filter(|key| values.get(key.as_str()).is_none_or(|v| v.is_empty()))
            .cloned()
            .collect();
        let source_keys: BTreeSet<&str> = self.source_keys.iter().map(String::as_str).collect();
        let obsolete = entries
            .iter()
            .filter(|e| !source_keys.contains(e.key.as_str()))
            .map(|e| e.key.clone())
            .collect();

        self.reports.push(TargetCoverage {
            project: self.project.clone(),
            path: node.path.clone(),
            culture: node.culture().map(|c| c.to_string()),
            total: self.source_keys.len(),
            translated: self.source_keys.len() - missing.len(),
            missing,
            obsolete,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ResourceCodec, formats::ResxCodec, visitor::walk_project};

    fn sample() -> Solution {
        let mut solution = Solution::new("Demo", "");
        let mut app = Project::new("App");
        app.set_source(FileReference::new("/res/Strings.resx", "resx", ""))
            .unwrap();
        app.add_target(FileReference::new("/res/Strings.de-DE.resx", "RESX", ""))
            .unwrap();
        app.add_target(FileReference::new("/res/Strings.fr.csv", "csv", ""))
            .unwrap();
        solution.add_project(app);
        solution.add_project(Project::new("Empty"));
        solution
    }

    #[test]
    fn test_collect_counts() {
        let stats = SolutionStats::collect(&sample());
        assert_eq!(stats.projects, 2);
        assert_eq!(stats.source_files, 1);
        assert_eq!(stats.target_files, 2);
        assert_eq!(stats.formats.get("resx"), Some(&2));
        assert_eq!(stats.formats.get("csv"), Some(&1));
        assert_eq!(
            stats.cultures.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["de-DE", "fr"]
        );
    }

    #[test]
    fn test_walk_project_visits_every_file() {
        struct Count(usize);
        impl Visitor<()> for Count {
            type Value = ();
            type Error = ();
            fn visit_solution(&mut self, node: &Solution, c: ()) -> Result<(), ()> {
                walk_solution(self, node, c)
            }
            fn visit_project(&mut self, node: &Project, c: ()) -> Result<(), ()> {
                walk_project(self, node, c)
            }
            fn visit_file_reference(&mut self, _: &FileReference, _: ()) -> Result<(), ()> {
                self.0 += 1;
                Ok(())
            }
        }
        let mut count = Count(0);
        sample().accept(&mut count, ()).unwrap();
        assert_eq!(count.0, 3);
    }

    fn write_resx(path: &Path, entries: &[(&str, &str)]) {
        let entries: Vec<_> = entries
            .iter()
            .map(|(k, v)| ResourceEntry::new(*k, *v, ""))
            .collect();
        ResxCodec::default()
            .save(path, &mut entries.into_iter(), &CancellationToken::new())
            .unwrap();
    }

    #[test]
    fn test_coverage_compares_keys() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("Strings.resx");
        let target = dir.path().join("Strings.de.resx");
        write_resx(&source, &[("a", "A"), ("b", "B"), ("c", "C")]);
        write_resx(&target, &[("a", "A-de"), ("b", ""), ("old", "x")]);

        let mut project = Project::new("App");
        project
            .set_source(FileReference::new(source.to_string_lossy(), "resx", ""))
            .unwrap();
        project
            .add_target(FileReference::new(target.to_string_lossy(), "resx", ""))
            .unwrap();
        let mut solution = Solution::new("Demo", "");
        solution.add_project(project);

        let registry = Registry::with_defaults();
        let reports = coverage(&solution, &registry, &CancellationToken::new()).unwrap();
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.project, "App");
        assert_eq!(report.culture.as_deref(), Some("de"));
        assert_eq!(report.total, 3);
        assert_eq!(report.translated, 1);
        assert_eq!(report.missing, vec!["b", "c"]);
        assert_eq!(report.obsolete, vec!["old"]);
        assert!((report.percent() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_coverage_fails_on_missing_file() {
        let registry = Registry::with_defaults();
        let mut solution = Solution::new("Demo", "");
        let mut project = Project::new("App");
        project
            .set_source(FileReference::new("/definitely/not/here.resx", "resx", ""))
            .unwrap();
        solution.add_project(project);
        let err = coverage(&solution, &registry, &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_load_file_unknown_format() {
        let registry = Registry::with_defaults();
        let file = FileReference::new("/x.po", "po", "");
        assert!(matches!(
            load_file(&registry, &file, &CancellationToken::new()),
            Err(Error::UnknownFormat(_))
        ));
    }
}
