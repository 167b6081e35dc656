use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;

use super::classify::{self, StemSignals, VideoType};
use super::filename;
use super::release_group;
use super::{ClassifierConfig, Confidence};
use crate::probe::{ProbeError, TechnicalMetadata};

/// Column order of every tabular export.
pub const FIELDS: &[&str] = &[
    "filename",
    "artist",
    "title",
    "pattern_confidence",
    "release_group",
    "type",
    "type_confidence",
    "confidence",
    "duration_seconds",
    "resolution",
    "video_codec",
    "audio_codec",
    "bitrate",
    "framerate",
    "filesize",
    "file_date",
];

/// Everything known about one video file. Built only by [`assemble`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataRecord {
    filename: String,
    artist: Option<String>,
    title: Option<String>,
    pattern_confidence: Confidence,
    release_group: Option<String>,
    #[serde(rename = "type")]
    video_type: VideoType,
    type_confidence: Confidence,
    confidence: Confidence,
    duration_seconds: Option<f64>,
    resolution: Option<String>,
    video_codec: Option<String>,
    audio_codec: Option<String>,
    bitrate: Option<u64>,
    framerate: Option<f64>,
    filesize: Option<u64>,
    file_date: Option<NaiveDate>,
}

impl MetadataRecord {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn artist(&self) -> Option<&str> {
        self.artist.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn pattern_confidence(&self) -> Confidence {
        self.pattern_confidence
    }

    pub fn release_group(&self) -> Option<&str> {
        self.release_group.as_deref()
    }

    pub fn video_type(&self) -> VideoType {
        self.video_type
    }

    pub fn type_confidence(&self) -> Confidence {
        self.type_confidence
    }

    /// The weaker of the name and type confidences.
    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        self.duration_seconds
    }

    pub fn resolution(&self) -> Option<&str> {
        self.resolution.as_deref()
    }

    pub fn video_codec(&self) -> Option<&str> {
        self.video_codec.as_deref()
    }

    pub fn audio_codec(&self) -> Option<&str> {
        self.audio_codec.as_deref()
    }

    pub fn bitrate(&self) -> Option<u64> {
        self.bitrate
    }

    pub fn framerate(&self) -> Option<f64> {
        self.framerate
    }

    pub fn filesize(&self) -> Option<u64> {
        self.filesize
    }

    pub fn file_date(&self) -> Option<NaiveDate> {
        self.file_date
    }

    /// Cells in [`FIELDS`] order; missing values are empty strings.
    pub fn csv_row(&self) -> Vec<String> {
        fn opt<T: ToString>(v: Option<T>) -> String {
            v.map(|v| v.to_string()).unwrap_or_default()
        }

        vec![
            self.filename.clone(),
            opt(self.artist()),
            opt(self.title()),
            self.pattern_confidence.as_str().to_string(),
            opt(self.release_group()),
            self.video_type.as_str().to_string(),
            self.type_confidence.as_str().to_string(),
            self.confidence.as_str().to_string(),
            opt(self.duration_seconds),
            opt(self.resolution()),
            opt(self.video_codec()),
            opt(self.audio_codec()),
            opt(self.bitrate),
            opt(self.framerate),
            opt(self.filesize),
            opt(self.file_date.map(|d| d.format("%Y-%m-%d"))),
        ]
    }
}

/// Build the record for one file from its path and probed attributes.
pub fn assemble(path: &Path, technical: TechnicalMetadata, config: &ClassifierConfig) -> MetadataRecord {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let group = release_group::detect(&stem);
    let parsed = filename::match_stem(&group.stem_without_group, &config.name_style);

    let signals = StemSignals::scan(&filename);
    let class = classify::classify(technical.duration_seconds, &signals, config.live_set_threshold);

    log::trace!(
        "{}: {:?} pattern, {} ({})",
        filename,
        parsed.pattern,
        class.video_type.as_str(),
        class.type_confidence.as_str()
    );

    MetadataRecord {
        filename,
        artist: parsed.artist,
        title: parsed.title,
        pattern_confidence: parsed.pattern_confidence,
        release_group: group.release_group,
        video_type: class.video_type,
        type_confidence: class.type_confidence,
        confidence: parsed.pattern_confidence.min(class.type_confidence),
        duration_seconds: technical.duration_seconds,
        resolution: technical.resolution,
        video_codec: technical.video_codec,
        audio_codec: technical.audio_codec,
        bitrate: technical.bitrate,
        framerate: technical.framerate,
        filesize: technical.filesize,
        file_date: technical.file_date,
    }
}

/// Like [`assemble`], treating a failed probe as "nothing known".
pub fn assemble_probed(
    path: &Path,
    probed: Result<TechnicalMetadata, ProbeError>,
    config: &ClassifierConfig,
) -> MetadataRecord {
    assemble(path, probed.unwrap_or_default(), config)
}
