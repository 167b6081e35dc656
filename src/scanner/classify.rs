use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

use super::filename;
use super::Confidence;
use crate::config::ConfigError;

/// What kind of recording a file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoType {
    MusicVideo,
    LiveSet,
    LivePerformance,
}

impl VideoType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MusicVideo => "music_video",
            Self::LiveSet => "live_set",
            Self::LivePerformance => "live_performance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationResult {
    pub video_type: VideoType,
    pub type_confidence: Confidence,
}

/// Duration at or above which a recording counts as a live set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveSetThreshold(f64);

impl LiveSetThreshold {
    /// 45 minutes.
    pub const DEFAULT_SECONDS: f64 = 2700.0;

    pub fn new(seconds: f64) -> Result<Self, ConfigError> {
        if seconds.is_finite() && seconds > 0.0 {
            Ok(Self(seconds))
        } else {
            Err(ConfigError::InvalidThreshold(seconds))
        }
    }

    pub fn seconds(self) -> f64 {
        self.0
    }
}

impl Default for LiveSetThreshold {
    fn default() -> Self {
        Self(Self::DEFAULT_SECONDS)
    }
}

/// Weak textual cues found in a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Signal {
    Live,
    Festival,
    Concert,
    /// Bare "set": also common in song titles ("Set Fire to the Rain")
    Set,
    /// "djset", "liveset", "dj set", "live set"
    DjSet,
    /// TV/web broadcast tags (HDTV, PDTV)
    Broadcast,
    /// Cues that the file holds one song (official video, lyric video, a YouTube ID)
    SingleTrack,
}

impl Signal {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "live" | "unplugged" | "livestream" => Some(Self::Live),
            "festival" | "fest" | "hellfest" | "openair" => Some(Self::Festival),
            "concert" | "gig" | "tour" => Some(Self::Concert),
            "set" => Some(Self::Set),
            "liveset" | "djset" => Some(Self::DjSet),
            "hdtv" | "pdtv" | "webcast" | "broadcast" => Some(Self::Broadcast),
            "official" | "video" | "clip" | "lyric" | "lyrics" | "single" | "remix"
            | "visualizer" => Some(Self::SingleTrack),
            _ => None,
        }
    }
}

/// The set of [`Signal`]s present in a filename.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StemSignals(BTreeSet<Signal>);

impl StemSignals {
    /// Scan a whole filename (not just the matched artist/title span:
    /// venue and broadcast cues often sit outside it).
    pub fn scan(filename: &str) -> Self {
        let words: Vec<String> = filename
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();

        let mut set: BTreeSet<Signal> = words.iter().filter_map(|w| Signal::from_word(w)).collect();
        if words
            .windows(2)
            .any(|pair| pair[1] == "set" && (pair[0] == "dj" || pair[0] == "live"))
        {
            set.insert(Signal::DjSet);
        }

        let stem = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename);
        if filename::contains_video_id(stem) {
            set.insert(Signal::SingleTrack);
        }

        Self(set)
    }

    pub fn contains(&self, signal: Signal) -> bool {
        self.0.contains(&signal)
    }

    /// Cues of an extended recording (concert, festival, DJ set), beyond a bare "live".
    fn has_set_context(&self) -> bool {
        [Signal::Festival, Signal::Concert, Signal::Set, Signal::DjSet]
            .into_iter()
            .any(|s| self.contains(s))
    }

    /// Cues that a short recording was performed live. Bare `Set` is left out:
    /// in a short clip it is usually title text.
    fn has_performance_marker(&self) -> bool {
        [
            Signal::Live,
            Signal::Festival,
            Signal::Concert,
            Signal::DjSet,
            Signal::Broadcast,
        ]
        .into_iter()
        .any(|s| self.contains(s))
    }
}

impl FromIterator<Signal> for StemSignals {
    fn from_iter<I: IntoIterator<Item = Signal>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Classify a recording from its duration and filename cues.
///
/// Tiered: first match wins (no duration → text cues only at low confidence;
/// long → live set; short with live cues → live performance; short → music video).
pub fn classify(
    duration_seconds: Option<f64>,
    signals: &StemSignals,
    threshold: LiveSetThreshold,
) -> ClassificationResult {
    let result = |video_type, type_confidence| ClassificationResult {
        video_type,
        type_confidence,
    };

    // Tier 1: no usable duration
    let Some(duration) = duration_seconds.filter(|d| d.is_finite() && *d > 0.0) else {
        let single = signals.contains(Signal::SingleTrack);
        return if signals.has_set_context() && !single {
            result(VideoType::LiveSet, Confidence::Low)
        } else if signals.contains(Signal::Live) {
            result(VideoType::LivePerformance, Confidence::Low)
        } else {
            result(VideoType::MusicVideo, Confidence::Low)
        };
    };

    // Tier 2: long enough to be a full set
    if duration >= threshold.seconds() {
        return result(VideoType::LiveSet, Confidence::High);
    }

    // Tier 3: short but performed live
    if signals.has_performance_marker() {
        return result(VideoType::LivePerformance, Confidence::Medium);
    }

    // Tier 4
    result(VideoType::MusicVideo, Confidence::High)
}
