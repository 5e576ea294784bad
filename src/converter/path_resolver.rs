//! # Path Resolver
//!
//! Logica centralizzata per il calcolo dei path di output.
//!
//! Il path di output è `{output_dir}/{stem}.{ext_target}`. Due sorgenti con lo
//! stesso stem (`x.jpg`, `x.png`) finirebbero sullo stesso file: le collisioni
//! vengono risolte PRIMA del dispatch secondo la `CollisionPolicy`.

use crate::file_manager::SourceFile;
use crate::format::TargetFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// What to do when several sources map to the same output path
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Every colliding file fails, nothing is written for them
    #[default]
    Fail,
    /// Colliding files keep their source extension: `x.jpg.jxl`, `x.png.jxl`
    KeepExtension,
}

/// Where a source file's conversion is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedOutput {
    Write(PathBuf),
    /// Another source targets the same path
    Conflict { path: PathBuf, with: Vec<String> },
}

/// A source file paired with its resolved output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPlan {
    pub source: SourceFile,
    pub output: PlannedOutput,
}

/// Computes output paths for a batch
pub struct PathResolver;

impl PathResolver {
    /// `{output_dir}/{stem}.{target_ext}`
    pub fn output_path(source: &SourceFile, output_dir: &Path, format: TargetFormat) -> PathBuf {
        output_dir.join(format!("{}.{}", source.stem(), format.extension()))
    }

    /// `{output_dir}/{stem}.{source_ext}.{target_ext}`
    pub fn output_path_with_source_extension(
        source: &SourceFile,
        output_dir: &Path,
        format: TargetFormat,
    ) -> PathBuf {
        output_dir.join(format!(
            "{}.{}.{}",
            source.stem(),
            source.extension(),
            format.extension()
        ))
    }

    /// Resolve the output of every source, keeping input order
    pub fn plan(
        files: Vec<SourceFile>,
        output_dir: &Path,
        format: TargetFormat,
        policy: CollisionPolicy,
    ) -> Vec<ConversionPlan> {
        let mut paths: Vec<PathBuf> = files
            .iter()
            .map(|source| Self::output_path(source, output_dir, format))
            .collect();

        if policy == CollisionPolicy::KeepExtension {
            for group in Self::collision_groups(&paths) {
                for index in group {
                    paths[index] =
                        Self::output_path_with_source_extension(&files[index], output_dir, format);
                }
            }
        }

        // Whatever still collides (always the case under `Fail`) is a conflict
        let mut conflicts: HashMap<usize, Vec<String>> = HashMap::new();
        for group in Self::collision_groups(&paths) {
            for &index in &group {
                let others = group
                    .iter()
                    .filter(|&&other| other != index)
                    .map(|&other| files[other].file_name())
                    .collect();
                conflicts.insert(index, others);
            }
        }

        files
            .into_iter()
            .zip(paths)
            .enumerate()
            .map(|(index, (source, path))| {
                let output = match conflicts.remove(&index) {
                    Some(with) => {
                        warn!(
                            "Output collision: {} and {} both map to {}",
                            source.file_name(),
                            with.join(", "),
                            path.display()
                        );
                        PlannedOutput::Conflict { path, with }
                    }
                    None => PlannedOutput::Write(path),
                };
                ConversionPlan { source, output }
            })
            .collect()
    }

    /// Indices sharing an output path, compared case-insensitively
    fn collision_groups(paths: &[PathBuf]) -> Vec<Vec<usize>> {
        let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, path) in paths.iter().enumerate() {
            let key = path.to_string_lossy().to_lowercase();
            by_key.entry(key).or_default().push(index);
        }

        let mut groups: Vec<Vec<usize>> = by_key
            .into_values()
            .filter(|group| group.len() > 1)
            .collect();
        groups.sort();
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(names: &[&str]) -> Vec<SourceFile> {
        names
            .iter()
            .map(|name| SourceFile::from_path(&Path::new("/in").join(name)).unwrap())
            .collect()
    }

    fn written(plan: &ConversionPlan) -> Option<&Path> {
        match &plan.output {
            PlannedOutput::Write(path) => Some(path),
            PlannedOutput::Conflict { .. } => None,
        }
    }

    #[test]
    fn test_output_path() {
        let source = SourceFile::from_path(Path::new("/in/photo.JPEG")).unwrap();
        assert_eq!(
            PathResolver::output_path(&source, Path::new("/out"), TargetFormat::Jxl),
            PathBuf::from("/out/photo.jxl")
        );
        assert_eq!(
            PathResolver::output_path_with_source_extension(&source, Path::new("/out"), TargetFormat::Webp),
            PathBuf::from("/out/photo.JPEG.webp")
        );
    }

    #[test]
    fn test_plan_without_collisions() {
        let plans = PathResolver::plan(
            sources(&["a.jpg", "b.png"]),
            Path::new("/out"),
            TargetFormat::Webp,
            CollisionPolicy::Fail,
        );

        assert_eq!(plans.len(), 2);
        assert_eq!(written(&plans[0]), Some(Path::new("/out/a.webp")));
        assert_eq!(written(&plans[1]), Some(Path::new("/out/b.webp")));
    }

    #[test]
    fn test_plan_fail_policy_marks_every_colliding_file() {
        let plans = PathResolver::plan(
            sources(&["a.jpg", "x.jpg", "x.png"]),
            Path::new("/out"),
            TargetFormat::Jxl,
            CollisionPolicy::Fail,
        );

        assert_eq!(written(&plans[0]), Some(Path::new("/out/a.jxl")));
        assert_eq!(
            plans[1].output,
            PlannedOutput::Conflict {
                path: PathBuf::from("/out/x.jxl"),
                with: vec!["x.png".to_string()],
            }
        );
        assert_eq!(
            plans[2].output,
            PlannedOutput::Conflict {
                path: PathBuf::from("/out/x.jxl"),
                with: vec!["x.jpg".to_string()],
            }
        );
    }

    #[test]
    fn test_plan_collisions_are_case_insensitive() {
        let plans = PathResolver::plan(
            sources(&["IMG.png", "img.jpg"]),
            Path::new("/out"),
            TargetFormat::Webp,
            CollisionPolicy::Fail,
        );
        assert!(plans.iter().all(|p| written(p).is_none()));
    }

    #[test]
    fn test_plan_keep_extension_policy() {
        let plans = PathResolver::plan(
            sources(&["a.png", "x.jpg", "x.png"]),
            Path::new("/out"),
            TargetFormat::Jxl,
            CollisionPolicy::KeepExtension,
        );

        assert_eq!(written(&plans[0]), Some(Path::new("/out/a.jxl")));
        assert_eq!(written(&plans[1]), Some(Path::new("/out/x.jpg.jxl")));
        assert_eq!(written(&plans[2]), Some(Path::new("/out/x.png.jxl")));
    }

    #[test]
    fn test_plan_keep_extension_detects_remaining_collisions() {
        // x.jpg is disambiguated to x.jpg.webp, which x.jpg.png also targets
        let plans = PathResolver::plan(
            sources(&["x.jpg", "x.jpg.png", "x.png"]),
            Path::new("/out"),
            TargetFormat::Webp,
            CollisionPolicy::KeepExtension,
        );

        assert!(written(&plans[0]).is_none());
        assert!(written(&plans[1]).is_none());
        assert_eq!(written(&plans[2]), Some(Path::new("/out/x.png.webp")));
    }
}
