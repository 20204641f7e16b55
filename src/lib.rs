//! Translation solution core for Rust.
//!
//! A [`Solution`] groups [`Project`]s, each pairing one source resource file
//! with any number of translated target files. Resource files are read and
//! written as streams of [`ResourceEntry`] through a [`ResourceCodec`] picked
//! from a [`Registry`] by format tag. The tree itself is persisted as XML by
//! the [`transcoder`], which is a pair of [`visitor`]s over the model.
//!
//! ```
//! use transolution::{FileReference, Project, Solution, model_to_xml, xml_to_model};
//!
//! let mut project = Project::new("App");
//! project.set_source(FileReference::new("Strings.resx", "resx", "")).unwrap();
//! project.add_target(FileReference::new("Strings.de.resx", "resx", "")).unwrap();
//!
//! let mut solution = Solution::new("Demo", "");
//! solution.add_project(project);
//!
//! let xml = model_to_xml(&solution).unwrap();
//! let mut restored = Solution::default();
//! xml_to_model(&xml, &mut restored).unwrap();
//! assert_eq!(restored, solution);
//! ```

#![forbid(unsafe_code)]

pub mod cancel;
pub mod error;
pub mod formats;
pub mod fs;
pub mod model;
pub mod registry;
pub mod stats;
pub mod traits;
pub mod transcoder;
pub mod types;
pub mod validate;
pub mod visitor;

// Re-export most used types for easy consumption
pub use crate::{
    cancel::CancellationToken,
    error::Error,
    formats::FormatType,
    model::{AddTarget, FileReference, Project, Solution},
    registry::{Registry, default_registry},
    stats::{SolutionStats, TargetCoverage, coverage},
    traits::{EntryStream, ResourceCodec},
    transcoder::{load_solution, model_to_xml, save_solution, xml_to_model},
    types::{Finalize, ResourceEntry, SaveSummary},
    validate::{Issue, Severity, Validator},
};
