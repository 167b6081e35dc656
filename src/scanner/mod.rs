pub mod classify;
pub mod filename;
pub mod normalize;
pub mod record;
pub mod release_group;

use crate::probe::Probe;
use crate::VIDEO_EXTENSIONS;
use classify::{LiveSetThreshold, VideoType};
use indicatif::{ProgressBar, ProgressStyle};
use normalize::NameStyle;
use rayon::prelude::*;
use record::MetadataRecord;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("'{0}' is not a valid directory")]
    NotADirectory(PathBuf),
    #[error("Could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// How sure a heuristic step is about its own output. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Tunables of the filename/classification engine.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassifierConfig {
    pub live_set_threshold: LiveSetThreshold,
    pub name_style: NameStyle,
}

/// Find video files in `dir`, sorted by path. Only the top level unless `recursive`.
pub fn discover(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<PathBuf> = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(max_depth).follow_links(true) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let ext = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    log::info!("Found {} video files in {}", files.len(), dir.display());
    Ok(files)
}

/// Probe and classify every file on a pool of `jobs` workers.
///
/// Records come back in the same order as `paths`. A file that can't be
/// probed still yields a record, with its technical fields left empty.
pub fn scan_files(
    paths: &[PathBuf],
    prober: &dyn Probe,
    config: &ClassifierConfig,
    jobs: usize,
) -> Result<Vec<MetadataRecord>, ScanError> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}) ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    pb.set_message("Probing...");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()?;

    let records: Vec<MetadataRecord> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                let record = process_file(path, prober, config);
                pb.inc(1);
                record
            })
            .collect()
    });

    let count = |t: VideoType| records.iter().filter(|r| r.video_type() == t).count();
    pb.finish_with_message(format!(
        "Done: {} music videos, {} live sets, {} live performances",
        count(VideoType::MusicVideo),
        count(VideoType::LiveSet),
        count(VideoType::LivePerformance),
    ));

    Ok(records)
}

fn process_file(path: &Path, prober: &dyn Probe, config: &ClassifierConfig) -> MetadataRecord {
    let probed = prober.probe(path);
    if let Err(e) = &probed {
        log::warn!("Could not probe {}: {}", path.display(), e);
    }
    let record = record::assemble_probed(path, probed, config);
    if record.confidence() == Confidence::Low {
        log::debug!("Low-confidence parse for {}", record.filename());
    }
    record
}
