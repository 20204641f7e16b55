//! Double dispatch over the solution tree.
//!
//! Each entity implements [`Acceptor`] (and [`AcceptorMut`]) by forwarding to
//! the visitor method for its own type, passing the caller's cursor along
//! untouched. Entities do not recurse; a visitor decides whether to descend,
//! either by hand or through [`walk_solution`] and [`walk_project`].
//!
//! # Example
//!
//! ```
//! use transolution::{FileReference, Project, Solution};
//! use transolution::visitor::{Acceptor, Visitor, walk_project, walk_solution};
//!
//! /// Collects every file path, prefixed by its depth.
//! struct Paths(Vec<String>);
//!
//! impl Visitor<usize> for Paths {
//!     type Value = ();
//!     type Error = std::convert::Infallible;
//!
//!     fn visit_solution(&mut self, node: &Solution, depth: usize) -> Result<(), Self::Error> {
//!         walk_solution(self, node, depth + 1)
//!     }
//!     fn visit_project(&mut self, node: &Project, depth: usize) -> Result<(), Self::Error> {
//!         walk_project(self, node, depth + 1)
//!     }
//!     fn visit_file_reference(&mut self, node: &FileReference, depth: usize) -> Result<(), Self::Error> {
//!         self.0.push(format!("{depth}:{}", node.path));
//!         Ok(())
//!     }
//! }
//!
//! let mut solution = Solution::new("demo", "");
//! let mut project = Project::new("app");
//! project.set_source(FileReference::new("/s.resx", "resx", "")).unwrap();
//! solution.add_project(project);
//!
//! let mut paths = Paths(Vec::new());
//! solution.accept(&mut paths, 0).unwrap();
//! assert_eq!(paths.0, vec!["2:/s.resx"]);
//! ```

use crate::model::{FileReference, Project, Solution};

/// Operation over immutable tree entities.
///
/// `C` is the cursor: caller-defined context threaded through a traversal.
pub trait Visitor<C> {
    /// Value produced for each visited node.
    type Value: Default;
    type Error;

    fn visit_solution(&mut self, node: &Solution, cursor: C) -> Result<Self::Value, Self::Error>;

    fn visit_project(&mut self, node: &Project, cursor: C) -> Result<Self::Value, Self::Error>;

    fn visit_file_reference(
        &mut self,
        node: &FileReference,
        cursor: C,
    ) -> Result<Self::Value, Self::Error>;
}

/// Operation that fills or edits tree entities in place.
pub trait VisitorMut<C> {
    type Value: Default;
    type Error;

    fn visit_solution(&mut self, node: &mut Solution, cursor: C)
    -> Result<Self::Value, Self::Error>;

    fn visit_project(&mut self, node: &mut Project, cursor: C) -> Result<Self::Value, Self::Error>;

    fn visit_file_reference(
        &mut self,
        node: &mut FileReference,
        cursor: C,
    ) -> Result<Self::Value, Self::Error>;
}

/// Dispatches a [`Visitor`] to the method for the concrete entity type.
pub trait Acceptor {
    fn accept<V: Visitor<C> + ?Sized, C>(
        &self,
        visitor: &mut V,
        cursor: C,
    ) -> Result<V::Value, V::Error>;
}

/// Dispatches a [`VisitorMut`] to the method for the concrete entity type.
pub trait AcceptorMut {
    fn accept_mut<V: VisitorMut<C> + ?Sized, C>(
        &mut self,
        visitor: &mut V,
        cursor: C,
    ) -> Result<V::Value, V::Error>;
}

impl Acceptor for Solution {
    fn accept<V: Visitor<C> + ?Sized, C>(
        &self,
        visitor: &mut V,
        cursor: C,
    ) -> Result<V::Value, V::Error> {
        visitor.visit_solution(self, cursor)
    }
}

impl Acceptor for Project {
    fn accept<V: Visitor<C> + ?Sized, C>(
        &self,
        visitor: &mut V,
        cursor: C,
    ) -> Result<V::Value, V::Error> {
        visitor.visit_project(self, cursor)
    }
}

impl Acceptor for FileReference {
    fn accept<V: Visitor<C> + ?Sized, C>(
        &self,
        visitor: &mut V,
        cursor: C,
    ) -> Result<V::Value, V::Error> {
        visitor.visit_file_reference(self, cursor)
    }
}

impl AcceptorMut for Solution {
    fn accept_mut<V: VisitorMut<C> + ?Sized, C>(
        &mut self,
        visitor: &mut V,
        cursor: C,
    ) -> Result<V::Value, V::Error> {
        visitor.visit_solution(self, cursor)
    }
}

impl AcceptorMut for Project {
    fn accept_mut<V: VisitorMut<C> + ?Sized, C>(
        &mut self,
        visitor: &mut V,
        cursor: C,
    ) -> Result<V::Value, V::Error> {
        visitor.visit_project(self, cursor)
    }
}

impl AcceptorMut for FileReference {
    fn accept_mut<V: VisitorMut<C> + ?Sized, C>(
        &mut self,
        visitor: &mut V,
        cursor: C,
    ) -> Result<V::Value, V::Error> {
        visitor.visit_file_reference(self, cursor)
    }
}

/// Visits every project of `node` in order, each with a clone of `cursor`.
/// Stops at the first error.
pub fn walk_solution<V, C>(visitor: &mut V, node: &Solution, cursor: C) -> Result<V::Value, V::Error>
where
    V: Visitor<C> + ?Sized,
    C: Clone,
{
    for project in node.projects() {
        project.accept(visitor, cursor.clone())?;
    }
    Ok(V::Value::default())
}

/// Visits the source file (if set) and then every target file of `node`.
/// Stops at the first error.
pub fn walk_project<V, C>(visitor: &mut V, node: &Project, cursor: C) -> Result<V::Value, V::Error>
where
    V: Visitor<C> + ?Sized,
    C: Clone,
{
    if let Some(source) = node.source() {
        source.accept(visitor, cursor.clone())?;
    }
    for target in node.targets() {
        target.accept(visitor, cursor.clone())?;
    }
    Ok(V::Value::default())
}
