use std::io::Write;

use clap::ValueEnum;
use thiserror::Error;

use crate::scanner::classify::VideoType;
use crate::scanner::record::{MetadataRecord, FIELDS};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// Write `records` to `out` in the chosen format.
pub fn render<W: Write>(records: &[MetadataRecord], format: OutputFormat, out: W) -> Result<(), ReportError> {
    match format {
        OutputFormat::Json => render_json(records, out),
        OutputFormat::Csv => render_csv(records, out),
        OutputFormat::Table => render_table(records, out),
    }
}

fn render_json<W: Write>(records: &[MetadataRecord], mut out: W) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(&mut out, records)?;
    writeln!(out)?;
    Ok(())
}

fn render_csv<W: Write>(records: &[MetadataRecord], out: W) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(FIELDS)?;
    for record in records {
        writer.write_record(record.csv_row())?;
    }
    writer.flush()?;
    Ok(())
}

const SECTIONS: &[(VideoType, &str)] = &[
    (VideoType::MusicVideo, "MUSIC VIDEOS"),
    (VideoType::LiveSet, "LIVE SETS"),
    (VideoType::LivePerformance, "LIVE PERFORMANCES"),
];

const TABLE_WIDTH: usize = 112;

fn render_table<W: Write>(records: &[MetadataRecord], mut out: W) -> Result<(), ReportError> {
    for (video_type, heading) in SECTIONS {
        let section: Vec<&MetadataRecord> = records
            .iter()
            .filter(|r| r.video_type() == *video_type)
            .collect();
        if section.is_empty() {
            continue;
        }

        writeln!(out, "{} ({})", heading, section.len())?;
        writeln!(out, "{}", "=".repeat(TABLE_WIDTH))?;
        writeln!(
            out,
            "{:<24} {:<30} {:>8} {:>9} {:<6} {:>10} {:>10} {:<6}",
            "Artist", "Title", "Duration", "Res", "Codec", "Bitrate", "Size", "Conf"
        )?;
        writeln!(out, "{}", "-".repeat(TABLE_WIDTH))?;

        for r in section {
            writeln!(
                out,
                "{:<24} {:<30} {:>8} {:>9} {:<6} {:>10} {:>10} {:<6}",
                truncate(r.artist().unwrap_or("unknown"), 24),
                truncate(r.title().unwrap_or("unknown"), 30),
                r.duration_seconds().map_or_else(unknown, format_duration),
                truncate(r.resolution().unwrap_or("unknown"), 9),
                truncate(r.video_codec().unwrap_or("-"), 6),
                r.bitrate().map_or_else(unknown, format_bitrate),
                r.filesize().map_or_else(unknown, format_filesize),
                r.confidence().as_str(),
            )?;
            if let Some(group) = r.release_group() {
                writeln!(out, "  release group: {}", group)?;
            }
        }
        writeln!(out)?;
    }

    let total_duration: f64 = records.iter().filter_map(|r| r.duration_seconds()).sum();
    let total_size: u64 = records.iter().filter_map(|r| r.filesize()).sum();
    writeln!(
        out,
        "Total: {} files, {} playtime, {}",
        records.len(),
        format_duration(total_duration),
        format_filesize(total_size)
    )?;
    Ok(())
}

fn unknown() -> String {
    "unknown".to_string()
}

/// Cut to `max` characters, ending in "..." when shortened.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

/// `H:MM:SS` for an hour or more, otherwise `M:SS`.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

pub fn format_bitrate(bits_per_second: u64) -> String {
    if bits_per_second >= 1_000_000 {
        format!("{:.1} Mbps", bits_per_second as f64 / 1_000_000.0)
    } else {
        format!("{} kbps", bits_per_second / 1000)
    }
}

pub fn format_filesize(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
