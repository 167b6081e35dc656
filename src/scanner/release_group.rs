use regex::Regex;
use std::sync::LazyLock;

/// Filename stem split into its content and a trailing scene-release group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseGroupInfo {
    pub stem_without_group: String,
    pub release_group: Option<String>,
}

impl ReleaseGroupInfo {
    fn unchanged(stem: &str) -> Self {
        Self {
            stem_without_group: stem.to_string(),
            release_group: None,
        }
    }
}

/// Rip, source, codec and resolution tags found between a title and its group.
const RELEASE_MARKERS: &[&str] = &[
    "dvdrip", "webrip", "bdrip", "brrip", "hdrip", "tvrip", "satrip",
    "hdtv", "pdtv", "dsr", "web", "dvd", "dvdr", "svcd", "vcd",
    "xvid", "divx", "x264", "x265", "h264", "h265", "hevc", "avc", "mpeg2", "mpeg4",
    "ac3", "aac",
    "480p", "576p", "720p", "1080i", "1080p", "2160p",
    "rerip", "proper", "repack", "internal", "ntsc", "pal",
];

/// Music video scene groups seen in the wild.
const KNOWN_GROUPS: &[&str] = &[
    "v1p0n3", "jaded", "typeoserv", "cubert", "cutthroat", "mud", "blag",
    "dike1999", "sts", "milka", "srp", "vfi", "mv4", "crds", "nazty2005",
    "pmd", "hdp", "ldv", "apv", "msz", "ma42",
];

/// Short tags some groups append after their own name (`-jaded-nV`).
const KNOWN_SUFFIXES: &[&str] = &["nv", "hdp", "apv", "ldv", "msz", "ucv"];

// "... Ripped By Someone", "...-rip_by_someone"
static RIPPED_BY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[-_.\s]*\bripp?(?:ed)?[\s_]*by[\s_]+(?P<group>[a-z0-9]+)[-_.\s]*$").unwrap()
});

fn is_delimiter(c: char) -> bool {
    matches!(c, '-' | '_' | '.') || c.is_whitespace()
}

fn is_marker(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    RELEASE_MARKERS.contains(&lower.as_str())
}

pub(crate) fn is_year(token: &str) -> bool {
    token.len() == 4
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token.starts_with("19") || token.starts_with("20"))
}

/// Markers that double as ordinary title words ("Proper Education", "Pal Joey").
const WORD_MARKERS: &[&str] = &["proper", "internal", "pal", "ntsc", "web", "dvd", "repack"];

fn is_strong_marker(token: &str) -> bool {
    is_marker(token) && !WORD_MARKERS.contains(&token.to_ascii_lowercase().as_str())
}

/// Source tags that follow the year in a broadcast capture ("2015 HDTV", "2019 WEB").
fn is_broadcast_tag(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    ["hdtv", "pdtv", "web", "dvd"].iter().any(|p| lower.starts_with(p))
}

/// Number of tokens at the left of a marker run (left to right) that are data,
/// not signature: leading years, plus a `<year> <source>` pair such as "2015 HDTV".
fn kept_prefix(run: &[&Token]) -> usize {
    let years = run.iter().take_while(|t| is_year(t.text)).count();
    match run.get(years) {
        Some(t) if years > 0 && is_broadcast_tag(t.text) => years + 1,
        _ => years,
    }
}

fn is_group_candidate(token: &str) -> bool {
    (2..=15).contains(&token.len())
        && token.bytes().all(|b| b.is_ascii_alphanumeric())
        && !token.bytes().all(|b| b.is_ascii_digit())
        && !is_marker(token)
}

fn is_known_group(token: &str) -> bool {
    KNOWN_GROUPS.contains(&token.to_ascii_lowercase().as_str())
}

fn is_known_suffix(token: &str) -> bool {
    KNOWN_SUFFIXES.contains(&token.to_ascii_lowercase().as_str())
}

/// A delimiter-separated token with its byte offsets in the stem.
#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    text: &'a str,
    start: usize,
}

/// Tokens of `stem`, last token first.
fn trailing_tokens(stem: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut end: Option<usize> = None;

    for (i, c) in stem.char_indices().rev() {
        if is_delimiter(c) {
            if let Some(e) = end.take() {
                let start = i + c.len_utf8();
                tokens.push(Token { text: &stem[start..e], start });
            }
        } else if end.is_none() {
            end = Some(i + c.len_utf8());
        }
    }
    if let Some(e) = end {
        tokens.push(Token { text: &stem[..e], start: 0 });
    }
    tokens
}

/// Cut `stem` at `cut` and tidy the remainder. `None` if nothing would be left.
fn strip_at(stem: &str, cut: usize, group: String) -> Option<ReleaseGroupInfo> {
    let remainder = stem[..cut].trim_end_matches(is_delimiter);
    if remainder.is_empty() {
        return None;
    }
    Some(ReleaseGroupInfo {
        stem_without_group: remainder.to_string(),
        release_group: Some(group),
    })
}

/// Detect a trailing scene-release group.
///
/// Tiered: first match wins (ripped-by phrase → marker chain before a group
/// → group suffix tag → known group name). Tags without a group after them,
/// and a lone year, are left in place.
pub fn detect(stem: &str) -> ReleaseGroupInfo {
    detect_group(stem).unwrap_or_else(|| ReleaseGroupInfo::unchanged(stem))
}

fn detect_group(stem: &str) -> Option<ReleaseGroupInfo> {
    // Tier 1: "Ripped By X"
    if let Some(caps) = RIPPED_BY_RE.captures(stem) {
        let whole = caps.get(0)?;
        let group = caps.name("group")?.as_str().to_string();
        if let Some(info) = strip_at(stem, whole.start(), group) {
            return Some(info);
        }
    }

    let tokens = trailing_tokens(stem);
    let last = *tokens.first()?;

    // A space-separated trailing word ("Artist - Pal Joey", "Artist - Sts") is title text.
    let boundary = stem[..last.start].chars().next_back();

    // Tier 2: group preceded by a run of markers/years with a codec or rip tag in it
    if matches!(boundary, Some('-' | '_' | '.')) && is_group_candidate(last.text) {
        let mut run: Vec<&Token> = tokens[1..]
            .iter()
            .take_while(|t| is_marker(t.text) || is_year(t.text))
            .collect();
        run.reverse();
        if run.iter().any(|t| is_strong_marker(t.text)) {
            let cut = run
                .get(kept_prefix(&run))
                .map_or(last.start, |t| t.start);
            if let Some(info) = strip_at(stem, cut, last.text.to_string()) {
                return Some(info);
            }
        }
    }

    // Tiers 3 and 4 need a hyphen/underscore boundary
    if !matches!(boundary, Some('-' | '_')) {
        return None;
    }

    // Tier 3: suffix tag, optionally glued to a known group
    if is_known_suffix(last.text) {
        if let Some(prev) = tokens.get(1).filter(|t| is_known_group(t.text)) {
            let group = format!("{}-{}", prev.text, last.text);
            if let Some(info) = strip_at(stem, prev.start, group) {
                return Some(info);
            }
        }
        return strip_at(stem, last.start, last.text.to_string());
    }

    // Tier 4: bare known group
    if is_known_group(last.text) {
        return strip_at(stem, last.start, last.text.to_string());
    }

    None
}
