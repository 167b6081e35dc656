use chrono::NaiveDate;
use serde::Deserialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("ffprobe not found at '{0}'")]
    NotFound(String),
    #[error("ffprobe timed out after {0:?}")]
    Timeout(Duration),
    #[error("ffprobe exited with {0}")]
    Failed(ExitStatus),
    #[error("Invalid ffprobe output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Technical attributes of a media file. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TechnicalMetadata {
    pub duration_seconds: Option<f64>,
    /// `WIDTHxHEIGHT` of the first video stream
    pub resolution: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    /// Overall bitrate in bits per second
    pub bitrate: Option<u64>,
    /// Frames per second of the first video stream
    pub framerate: Option<f64>,
    /// Bytes
    pub filesize: Option<u64>,
    /// Last modification date
    pub file_date: Option<NaiveDate>,
}

/// Source of technical metadata for a file path.
pub trait Probe: Sync {
    fn probe(&self, path: &Path) -> Result<TechnicalMetadata, ProbeError>;
}

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs `ffprobe` as a subprocess and reads its JSON report.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    program: PathBuf,
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Check that the ffprobe binary can be started.
    pub fn is_available(&self) -> bool {
        match Command::new(&self.program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(_) => {
                log::debug!("Found ffprobe: {}", self.program.display());
                true
            }
            Err(e) => {
                log::debug!("ffprobe check failed for {}: {}", self.program.display(), e);
                false
            }
        }
    }

    /// Run ffprobe on `path`, killing it if it exceeds the timeout.
    fn run(&self, path: &Path) -> Result<String, ProbeError> {
        let mut child = Command::new(&self.program)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    ProbeError::NotFound(self.program.display().to_string())
                } else {
                    ProbeError::Io(e)
                }
            })?;

        // Drain stdout on another thread so a large report can't fill the pipe
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("ffprobe stdout not captured"))?;
        let reader = std::thread::spawn(move || {
            let mut buf = String::new();
            stdout.read_to_string(&mut buf).map(|_| buf)
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                child.kill().ok();
                child.wait().ok();
                return Err(ProbeError::Timeout(self.timeout));
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        let output = reader
            .join()
            .map_err(|_| io::Error::other("ffprobe reader thread panicked"))??;

        if !status.success() {
            return Err(ProbeError::Failed(status));
        }
        Ok(output)
    }
}

impl Probe for FfprobeProber {
    /// Size and date come from the filesystem; everything else from ffprobe.
    /// If ffprobe fails the filesystem fields are still returned.
    fn probe(&self, path: &Path) -> Result<TechnicalMetadata, ProbeError> {
        let meta = std::fs::metadata(path)?;

        let mut technical = match self.run(path).and_then(|json| parse_ffprobe_json(&json)) {
            Ok(t) => t,
            Err(e) => {
                log::debug!("ffprobe failed for {}: {}", path.display(), e);
                TechnicalMetadata::default()
            }
        };
        technical.filesize = Some(meta.len());
        technical.file_date = file_date(&meta);
        Ok(technical)
    }
}

fn file_date(meta: &std::fs::Metadata) -> Option<NaiveDate> {
    meta.modified()
        .ok()
        .map(|t| chrono::DateTime::<chrono::Local>::from(t).date_naive())
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

// ffprobe reports numbers as strings in the format section
#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
}

/// Parse `ffprobe -print_format json -show_format -show_streams` output.
/// Missing or unparsable values become `None`; only malformed JSON is an error.
pub fn parse_ffprobe_json(json: &str) -> Result<TechnicalMetadata, ProbeError> {
    let out: FfprobeOutput = serde_json::from_str(json)?;

    let stream_of = |kind: &str| {
        out.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(kind))
    };
    let video = stream_of("video");
    let audio = stream_of("audio");

    let format_duration = out
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(parse_positive);
    let stream_duration = video
        .and_then(|v| v.duration.as_deref())
        .and_then(parse_positive);

    Ok(TechnicalMetadata {
        duration_seconds: format_duration.or(stream_duration),
        resolution: video.and_then(|v| match (v.width, v.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(format!("{w}x{h}")),
            _ => None,
        }),
        video_codec: video.and_then(|v| v.codec_name.clone()),
        audio_codec: audio.and_then(|a| a.codec_name.clone()),
        bitrate: out
            .format
            .as_ref()
            .and_then(|f| f.bit_rate.as_deref())
            .and_then(|s| s.trim().parse().ok()),
        framerate: video.and_then(|v| {
            v.r_frame_rate
                .as_deref()
                .and_then(parse_frame_rate)
                .or_else(|| v.avg_frame_rate.as_deref().and_then(parse_frame_rate))
        }),
        filesize: out
            .format
            .as_ref()
            .and_then(|f| f.size.as_deref())
            .and_then(|s| s.trim().parse().ok()),
        file_date: None,
    })
}

fn parse_positive(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

/// "30000/1001" → 29.97; "0/0" and garbage → None.
fn parse_frame_rate(s: &str) -> Option<f64> {
    match s.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den > 0.0 {
                Some(num / den).filter(|v| v.is_finite() && *v > 0.0)
            } else {
                None
            }
        }
        None => parse_positive(s),
    }
}
