use std::path::Path;

use tracing::info;
use transolution::{
    AddTarget, FileReference, FormatType, Project, Solution, default_registry, load_solution,
    model::same_path, save_solution,
};
use unic_langid::LanguageIdentifier;

/// Which slot of a project a file goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Source,
    Target,
}

#[derive(Debug, Clone, Default)]
pub struct AddFileOptions {
    /// Explicit path. Required for sources; targets may use `culture` instead.
    pub path: Option<String>,
    pub culture: Option<String>,
    pub format: Option<String>,
    pub comment: String,
}

pub fn run_new_command(
    output: &str,
    name: Option<String>,
    comment: String,
    force: bool,
) -> Result<(), String> {
    if Path::new(output).exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            output
        ));
    }
    let name = name.unwrap_or_else(|| {
        Path::new(output)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let mut solution = Solution::new(name, comment);
    save(output, &mut solution)?;
    println!("✅ Created solution {:?} at {}", solution.name(), output);
    Ok(())
}

pub fn run_add_project_command(solution_path: &str, name: String) -> Result<(), String> {
    let mut solution = open(solution_path)?;
    if solution.find_project(&name).is_some() {
        return Err(format!("Project {:?} already exists", name));
    }
    solution.add_project(Project::new(name.clone()));
    save(solution_path, &mut solution)?;
    println!("✅ Added project {:?}", name);
    Ok(())
}

pub fn run_remove_project_command(solution_path: &str, name: &str) -> Result<(), String> {
    let mut solution = open(solution_path)?;
    let index = find_project(&solution, name)?;
    solution.remove_project(index);
    save(solution_path, &mut solution)?;
    println!("✅ Removed project {:?}", name);
    Ok(())
}

pub fn run_add_file_command(
    solution_path: &str,
    project: &str,
    role: FileRole,
    options: AddFileOptions,
    default_format: Option<&str>,
) -> Result<(), String> {
    let mut solution = open(solution_path)?;
    let index = find_project(&solution, project)?;
    let project = solution
        .project_mut(index)
        .ok_or_else(|| format!("Project {:?} not found", project))?;

    let path = match (&options.path, &options.culture, role) {
        (Some(path), _, _) => path.clone(),
        (None, Some(culture), FileRole::Target) => {
            let culture: LanguageIdentifier = culture
                .parse()
                .map_err(|e| format!("Invalid culture {:?}: {}", culture, e))?;
            project.target_path_for(&culture).ok_or_else(|| {
                "Cannot derive a target path: the project has no source file".to_string()
            })?
        }
        (None, Some(_), FileRole::Source) => {
            return Err("--culture only applies to target files".to_string());
        }
        (None, None, _) => return Err("Specify a file path or --culture".to_string()),
    };
    let format = resolve_format(&path, options.format.as_deref(), default_format)?;
    let file = FileReference::new(path.clone(), format.clone(), options.comment);

    match role {
        FileRole::Source => {
            let previous = project.set_source(file).map_err(|e| e.to_string())?;
            if let Some(previous) = previous {
                info!(previous = %previous.path, "replaced source file");
            }
            println!("✅ Set source {} [{}]", path, format);
        }
        FileRole::Target => match project.add_target(file).map_err(|e| e.to_string())? {
            AddTarget::Added => println!("✅ Added target {} [{}]", path, format),
            AddTarget::Updated => println!("✅ Updated target {} [{}]", path, format),
        },
    }
    save(solution_path, &mut solution)
}

pub fn run_remove_file_command(
    solution_path: &str,
    project: &str,
    path: &str,
    role: FileRole,
) -> Result<(), String> {
    let mut solution = open(solution_path)?;
    let index = find_project(&solution, project)?;
    let project = solution
        .project_mut(index)
        .ok_or_else(|| format!("Project {:?} not found", project))?;
    let removed = match role {
        FileRole::Source => {
            if project.source().is_some_and(|s| same_path(&s.path, path)) {
                project.clear_source()
            } else {
                None
            }
        }
        FileRole::Target => project.remove_target(path),
    };
    if removed.is_none() {
        return Err(format!("No such file in project: {}", path));
    }
    save(solution_path, &mut solution)?;
    println!("✅ Removed {}", path);
    Ok(())
}

/// Picks the format tag: `--format`, then the configured default, then the
/// file extension. The tag must name a registered codec.
pub fn resolve_format(
    path: &str,
    explicit: Option<&str>,
    default_format: Option<&str>,
) -> Result<String, String> {
    let tag = match explicit.or(default_format) {
        Some(tag) => tag.trim().to_lowercase(),
        None => FormatType::from_path(path)
            .map(|format| format.to_string())
            .map_err(|_| format!("Cannot infer format from path: {} (use --format)", path))?,
    };
    if default_registry().select(&tag).is_none() {
        return Err(format!(
            "Unknown format {:?}; available: {}",
            tag,
            default_registry().keys().join(", ")
        ));
    }
    Ok(tag)
}

pub(crate) fn open(path: &str) -> Result<Solution, String> {
    load_solution(path).map_err(|e| format!("Error reading {}: {}", path, e))
}

fn save(path: &str, solution: &mut Solution) -> Result<(), String> {
    save_solution(path, solution).map_err(|e| format!("Error writing {}: {}", path, e))
}

fn find_project(solution: &Solution, name: &str) -> Result<usize, String> {
    solution
        .find_project(name)
        .ok_or_else(|| format!("Project {:?} not found", name))
}
