//! Structural checks over a solution, written as a [`Visitor`].

use std::{fmt::Display, path::Path};

use crate::{
    model::{FileReference, Project, Solution, same_path},
    registry::Registry,
    visitor::{Acceptor, Visitor},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One finding, located by a human-readable path into the tree
/// (`project "App" / target /res/Strings.de.resx`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub location: String,
    pub message: String,
}

impl Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.location, self.message)
    }
}

/// Cursor of the [`Validator`]: where in the tree it currently is.
#[derive(Debug, Clone)]
pub struct Location<'a> {
    label: String,
    source: Option<&'a FileReference>,
    is_source: bool,
}

/// Collects [`Issue`]s for a solution.
///
/// Format tags are checked against `registry`. With `check_files`, every
/// referenced file must also exist on disk.
pub struct Validator<'r> {
    registry: &'r Registry,
    check_files: bool,
    issues: Vec<Issue>,
}

impl<'r> Validator<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            check_files: false,
            issues: Vec::new(),
        }
    }

    pub fn with_file_checks(mut self, check_files: bool) -> Self {
        self.check_files = check_files;
        self
    }

    /// Validates `solution` and returns all findings, errors first.
    pub fn validate(mut self, solution: &Solution) -> Vec<Issue> {
        let root = Location {
            label: "solution".to_string(),
            source: None,
            is_source: false,
        };
        solution
            .accept(&mut self, root)
            .unwrap_or_else(|never| match never {});
        self.issues.sort_by(|a, b| b.severity.cmp(&a.severity));
        self.issues
    }

    fn report(&mut self, severity: Severity, location: &str, message: impl Into<String>) {
        self.issues.push(Issue {
            severity,
            location: location.to_string(),
            message: message.into(),
        });
    }
}

impl<'a> Visitor<Location<'a>> for Validator<'_> {
    type Value = ();
    type Error = std::convert::Infallible;

    fn visit_solution(&mut self, node: &Solution, cursor: Location<'a>) -> Result<(), Self::Error> {
        if node.name().trim().is_empty() {
            self.report(Severity::Warning, &cursor.label, "solution has no name");
        }
        if node.projects().is_empty() {
            self.report(Severity::Warning, &cursor.label, "solution has no projects");
        }
        for (index, project) in node.projects().iter().enumerate() {
            let label = if project.name().is_empty() {
                format!("project #{}", index + 1)
            } else {
                format!("project {:?}", project.name())
            };
            let cursor = Location {
                label,
                source: None,
                is_source: false,
            };
            project.accept(self, cursor)?;
        }
        Ok(())
    }

    fn visit_project(&mut self, node: &Project, cursor: Location<'a>) -> Result<(), Self::Error> {
        let label = cursor.label;
        match node.source() {
            Some(source) => {
                let cursor = Location {
                    label: format!("{label} / source {}", source.path),
                    source: Some(source),
                    is_source: true,
                };
                source.accept(self, cursor)?;
            }
            None => self.report(Severity::Warning, &label, "project has no source file"),
        }
        if node.targets().is_empty() {
            self.report(Severity::Warning, &label, "project has no target files");
        }
        for target in node.targets() {
            let cursor = Location {
                label: format!("{label} / target {}", target.path),
                source: node.source(),
                is_source: false,
            };
            target.accept(self, cursor)?;
        }
        Ok(())
    }

    fn visit_file_reference(
        &mut self,
        node: &FileReference,
        cursor: Location<'a>,
    ) -> Result<(), Self::Error> {
        let location = &cursor.label;
        if node.path.trim().is_empty() {
            self.report(Severity::Error, location, "file path is empty");
            return Ok(());
        }
        if node.format.trim().is_empty() {
            self.report(Severity::Error, location, "file type is empty");
        } else if self.registry.select(&node.format).is_none() {
            self.report(
                Severity::Error,
                location,
                format!("no codec registered for type `{}`", node.format),
            );
        }
        if self.check_files && !Path::new(&node.path).exists() {
            self.report(Severity::Error, location, "file does not exist");
        }
        if !cursor.is_source {
            if let Some(source) = cursor.source {
                if same_path(&source.path, &node.path) {
                    self.report(
                        Severity::Error,
                        location,
                        "target file is the same as the source file",
                    );
                }
            }
            if node.culture().is_none() {
                self.report(
                    Severity::Warning,
                    location,
                    "no culture found in the target file name",
                );
            }
        }
        Ok(())
    }
}
