//! The translation solution tree: [`Solution`] → [`Project`] → [`FileReference`].
//!
//! All entities are plain data. None of them knows about codecs or about
//! the operations run over it; those are written as visitors
//! (see [`crate::visitor`]).

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

use crate::error::Error;

lazy_static! {
    // Trailing `.xx`, `.xx-YY`, `.zh-Hans` ... segment of a file stem.
    static ref CULTURE_SUFFIX_REGEX: Regex =
        Regex::new(r"\.([A-Za-z]{2,3}(?:-[A-Za-z0-9]{2,8})*)$").unwrap();
}

/// Compares two file paths the way target uniqueness is enforced.
pub fn same_path(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// One resource file: where it is, which codec reads it, and a note.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct FileReference {
    /// Absolute or user-supplied path.
    pub path: String,

    /// Format tag, the registry key used to select a codec.
    #[serde(rename = "type")]
    pub format: String,

    /// Free-text comment.
    #[serde(default)]
    pub comment: String,
}

impl FileReference {
    pub fn new(path: impl Into<String>, format: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            format: format.into(),
            comment: comment.into(),
        }
    }

    /// Returns the culture encoded in the file name, e.g. `de-DE` for
    /// `Strings.de-DE.resx`. `None` for neutral files such as `Strings.resx`.
    pub fn culture(&self) -> Option<LanguageIdentifier> {
        let stem = Path::new(&self.path).file_stem()?.to_str()?;
        let captures = CULTURE_SUFFIX_REGEX.captures(stem)?;
        captures.get(1)?.as_str().parse().ok()
    }

    fn validate(&self) -> Result<(), Error> {
        if self.path.trim().is_empty() {
            return Err(Error::validation_error("file path must not be empty"));
        }
        if self.format.trim().is_empty() {
            return Err(Error::validation_error(format!(
                "file `{}` has no format type",
                self.path
            )));
        }
        Ok(())
    }
}

/// Result of [`Project::add_target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddTarget {
    /// A new target file was appended.
    Added,
    /// A target with the same path existed; its type and comment were updated.
    Updated,
}

/// A source resource file and its translated counterparts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Project {
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<FileReference>,
    #[serde(default)]
    targets: Vec<FileReference>,
}

impl Project {
    /// Creates a project with the given display name and no files.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn source(&self) -> Option<&FileReference> {
        self.source.as_ref()
    }

    /// Sets the source file, returning the previous one.
    pub fn set_source(&mut self, source: FileReference) -> Result<Option<FileReference>, Error> {
        source.validate()?;
        Ok(self.source.replace(source))
    }

    pub fn clear_source(&mut self) -> Option<FileReference> {
        self.source.take()
    }

    /// Target files in insertion order.
    pub fn targets(&self) -> &[FileReference] {
        &self.targets
    }

    pub fn find_target(&self, path: &str) -> Option<&FileReference> {
        self.targets.iter().find(|t| same_path(&t.path, path))
    }

    /// Adds a target file. A target whose path equals an existing one
    /// (ignoring case) updates that entry's type and comment instead.
    pub fn add_target(&mut self, target: FileReference) -> Result<AddTarget, Error> {
        target.validate()?;
        match self.targets.iter_mut().find(|t| same_path(&t.path, &target.path)) {
            Some(existing) => {
                existing.format = target.format;
                existing.comment = target.comment;
                Ok(AddTarget::Updated)
            }
            None => {
                self.targets.push(target);
                Ok(AddTarget::Added)
            }
        }
    }

    /// Removes the target with `path` (ignoring case).
    pub fn remove_target(&mut self, path: &str) -> Option<FileReference> {
        let index = self.targets.iter().position(|t| same_path(&t.path, path))?;
        Some(self.targets.remove(index))
    }

    /// Proposes a path for the `culture` translation of the source file:
    /// `dir/Strings.resx` becomes `dir/Strings.<culture>.resx`. Any culture
    /// suffix already on the source stem is replaced.
    pub fn target_path_for(&self, culture: &LanguageIdentifier) -> Option<String> {
        let source = Path::new(&self.source.as_ref()?.path);
        let stem = source.file_stem()?.to_str()?;
        let stem = CULTURE_SUFFIX_REGEX.replace(stem, "");
        let file_name = match source.extension().and_then(|e| e.to_str()) {
            Some(extension) => format!("{stem}.{culture}.{extension}"),
            None => format!("{stem}.{culture}"),
        };
        Some(source.with_file_name(file_name).to_string_lossy().into_owned())
    }
}

/// Root of the tree and unit of persistence.
///
/// `modified` is transient: it is raised by every mutation, cleared by
/// [`Solution::mark_saved`], and excluded from equality and serialization.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Solution {
    name: String,
    #[serde(default)]
    comment: String,
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(skip)]
    modified: bool,
}

impl PartialEq for Solution {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.comment == other.comment && self.projects == other.projects
    }
}

impl Eq for Solution {}

impl Solution {
    pub fn new(name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: comment.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.modified = true;
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
        self.modified = true;
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Appends a project and returns its index.
    pub fn add_project(&mut self, project: Project) -> usize {
        self.projects.push(project);
        self.modified = true;
        self.projects.len() - 1
    }

    pub fn remove_project(&mut self, index: usize) -> Option<Project> {
        if index >= self.projects.len() {
            return None;
        }
        self.modified = true;
        Some(self.projects.remove(index))
    }

    /// Mutable access to one project. Marks the solution as modified.
    pub fn project_mut(&mut self, index: usize) -> Option<&mut Project> {
        let project = self.projects.get_mut(index)?;
        self.modified = true;
        Some(project)
    }

    /// Index of the first project named `name`.
    pub fn find_project(&self, name: &str) -> Option<usize> {
        self.projects.iter().position(|p| p.name == name)
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    /// Pretty-printed JSON dump of the tree.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
