use regex::Regex;
use std::sync::LazyLock;

use super::normalize::NameStyle;
use super::Confidence;

/// Which structural pattern produced a [`ParsedName`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePattern {
    /// `Artist - Title [ID]` / `Artist - Title-ID`
    VideoId,
    /// `Artist - Title`
    ArtistTitle,
    /// `Artist 'Album' Track`
    QuotedAlbum,
    /// `Artist - Venue 2015 HDTV ...`
    LiveSet,
    /// `Artist - Part - Part`
    MultiPart,
    /// No separator: the whole stem is taken as the artist.
    Fallback,
}

impl NamePattern {
    pub fn confidence(self) -> Confidence {
        match self {
            Self::VideoId | Self::ArtistTitle => Confidence::High,
            Self::QuotedAlbum | Self::LiveSet | Self::MultiPart => Confidence::Medium,
            Self::Fallback => Confidence::Low,
        }
    }
}

/// Artist/title inferred from a filename stem, already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub pattern_confidence: Confidence,
    pub pattern: NamePattern,
}

impl ParsedName {
    fn unmatched() -> Self {
        Self {
            artist: None,
            title: None,
            pattern_confidence: Confidence::Low,
            pattern: NamePattern::Fallback,
        }
    }
}

/// Normalized output of a single matcher.
struct NameParts {
    artist: String,
    title: Option<String>,
}

type Matcher = fn(&str, &NameStyle) -> Option<NameParts>;

/// Tried in order; the first matcher returning `Some` wins.
const MATCHERS: &[(NamePattern, Matcher)] = &[
    (NamePattern::VideoId, match_video_id),
    (NamePattern::ArtistTitle, match_artist_title),
    (NamePattern::QuotedAlbum, match_quoted_album),
    (NamePattern::LiveSet, match_live_set),
    (NamePattern::MultiPart, match_multi_part),
    (NamePattern::Fallback, match_fallback),
];

// Artist/title separator: a dash with spaces, underscores or dots on both sides.
// A bare hyphen inside a word ("Jay-Z", "SomeArtist-SomeTrack") is not one.
const SEP: &str = r"[\s_.]+[-–—][\s_.]+";

static SEP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(SEP).unwrap());

// Pattern 1a: "Artist - Title (info) [CsHiG-43Fzg]", "FBI - Title [x28l79]"
static BRACKET_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?P<artist>.+?){SEP}(?P<title>.+?)[\s_]*\[(?P<id>[A-Za-z0-9_-]{{6,20}})\]$"
    ))
    .unwrap()
});

// Pattern 1b: yt-dlp "Artist - Title-oW0VovnyjPY" (IDs may start with '-')
static DASH_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?P<artist>.+?){SEP}(?P<title>.+?)-(?P<id>[A-Za-z0-9_-]{{11}})$"
    ))
    .unwrap()
});

// Pattern 3: "Charlotte de Witte 'New Form' II - Return To Nowhere-EiEFdnU6KWY"
// Opening quote follows whitespace, closing quote precedes whitespace/ID/end,
// so contractions ("Ain't", "Goin'") never delimit an album.
static QUOTED_ALBUM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<artist>.+?)\s+'(?P<album>\S.*?\S)'(?:[\s_]+(?P<track>.+)|-[A-Za-z0-9_-]{11})?$",
    )
    .unwrap()
});

// A quoted album marker anywhere in a span.
static QUOTED_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)'\S.*?\S'(?:\s|-|$)").unwrap());

// Pattern 4: "Artist - Au Festival 2015 HDTV", "Napalm Death - Live Deathfist Festival 2019 WEB AVC"
static LIVE_SET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?P<artist>.+?){SEP}(?P<venue>.+?)[\s._-]+(?P<year>(?:19|20)\d{{2}})[\s._-]+(?:hdtv|pdtv|web|dvd)[a-z0-9]*(?:[\s._-]+[a-z0-9]+)*$"
    ))
    .unwrap()
});

// "<year> HDTV ..." tail: broadcast tags, not title text.
static TECH_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^|[\s._-])(?:19|20)\d{2}[\s._-]+(?:hdtv|pdtv|web|dvd)[a-z0-9]*(?:[\s._-]+[a-z0-9]+)*$",
    )
    .unwrap()
});

// Trailing yt-dlp ID on a track label
static TRAILING_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{1,2}(?P<id>[A-Za-z0-9_-]{10,11})$").unwrap());

static BRACKETED_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(?P<id>[A-Za-z0-9_-]{6,20})\]").unwrap());

/// True for tokens that look like an opaque external ID (YouTube, Dailymotion):
/// a digit somewhere, or an uppercase letter past the first position mixed
/// with lowercase. Plain words ("Remastered", "LIVE") don't qualify.
pub fn is_opaque_id(token: &str) -> bool {
    if token.is_empty()
        || !token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        return false;
    }
    let has_digit = token.bytes().any(|b| b.is_ascii_digit());
    let has_lower = token.bytes().any(|b| b.is_ascii_lowercase());
    let inner_upper = token.bytes().skip(1).any(|b| b.is_ascii_uppercase());
    has_digit || (has_lower && inner_upper)
}

/// True when `text` carries a bracketed or trailing yt-dlp style ID.
pub fn contains_video_id(text: &str) -> bool {
    BRACKETED_TOKEN_RE
        .captures_iter(text)
        .any(|c| is_opaque_id(&c["id"]))
        || TRAILING_ID_RE
            .captures(text)
            .is_some_and(|c| is_opaque_id(&c["id"]))
}

fn has_quoted_marker(span: &str) -> bool {
    QUOTED_MARKER_RE.is_match(span)
}

/// Scene names sometimes use dots for spaces ("Napalm.Death.-.Live.Set").
/// Only rewritten when there are no spaces or underscores at all.
fn undot(stem: &str) -> std::borrow::Cow<'_, str> {
    let dotted = stem.matches('.').count() >= 2
        && !stem.contains(|c: char| c.is_whitespace() || c == '_');
    if dotted {
        std::borrow::Cow::Owned(stem.replace('.', " "))
    } else {
        std::borrow::Cow::Borrowed(stem)
    }
}

fn artist_and_title(artist: &str, title: &str, style: &NameStyle) -> Option<NameParts> {
    if has_quoted_marker(artist) {
        return None;
    }
    Some(NameParts {
        artist: style.normalize(artist)?,
        title: Some(style.normalize(title)?),
    })
}

fn match_video_id(stem: &str, style: &NameStyle) -> Option<NameParts> {
    [&*BRACKET_ID_RE, &*DASH_ID_RE].into_iter().find_map(|re| {
        let caps = re.captures(stem)?;
        if !is_opaque_id(&caps["id"]) {
            return None;
        }
        artist_and_title(&caps["artist"], &caps["title"], style)
    })
}

fn match_artist_title(stem: &str, style: &NameStyle) -> Option<NameParts> {
    let mut seps = SEP_RE.find_iter(stem);
    let sep = seps.next()?;
    if seps.next().is_some() {
        return None;
    }
    let title = &stem[sep.end()..];
    if TECH_TAIL_RE.is_match(title) {
        return None;
    }
    artist_and_title(&stem[..sep.start()], title, style)
}

fn match_quoted_album(stem: &str, style: &NameStyle) -> Option<NameParts> {
    let caps = QUOTED_ALBUM_RE.captures(stem)?;
    let artist = style.normalize(&caps["artist"])?;
    let album = style.normalize(&caps["album"])?;

    let track = caps.name("track").and_then(|m| {
        let label = m.as_str();
        let label = match TRAILING_ID_RE.captures(label) {
            Some(c) if is_opaque_id(&c["id"]) => &label[..c.get(0)?.start()],
            _ => label,
        };
        style.normalize(label)
    });

    let title = match track {
        Some(track) => format!("{album} {track}"),
        None => album,
    };
    Some(NameParts {
        artist,
        title: Some(title),
    })
}

fn match_live_set(stem: &str, style: &NameStyle) -> Option<NameParts> {
    let caps = LIVE_SET_RE.captures(stem)?;
    let venue = format!("{} {}", &caps["venue"], &caps["year"]);
    artist_and_title(&caps["artist"], &venue, style)
}

fn match_multi_part(stem: &str, style: &NameStyle) -> Option<NameParts> {
    let mut seps = SEP_RE.find_iter(stem);
    let first = seps.next()?;
    seps.next()?;
    artist_and_title(&stem[..first.start()], &stem[first.end()..], style)
}

fn match_fallback(stem: &str, style: &NameStyle) -> Option<NameParts> {
    Some(NameParts {
        artist: style.normalize(stem)?,
        title: None,
    })
}

/// Split a (release-group-stripped) stem into artist and title.
///
/// Patterns are tried in priority order and the first one whose artist (and,
/// where required, title) survives normalization wins. Never fails: a stem
/// nothing recognises comes back as a low-confidence artist-only parse.
pub fn match_stem(stem: &str, style: &NameStyle) -> ParsedName {
    let stem = undot(stem);

    for (pattern, matcher) in MATCHERS {
        if let Some(parts) = matcher(&stem, style) {
            return ParsedName {
                artist: Some(parts.artist),
                title: parts.title,
                pattern_confidence: pattern.confidence(),
                pattern: *pattern,
            };
        }
    }

    ParsedName::unmatched()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(stem: &str) -> ParsedName {
        match_stem(stem, &NameStyle::default())
    }

    // === Pattern 1: video IDs ===

    #[test]
    fn bracket_id() {
        let r = parse("Daft_Punk - One_More_Time [abc123XYZ9]");
        assert_eq!(r.pattern, NamePattern::VideoId);
        assert_eq!(r.artist.as_deref(), Some("Daft Punk"));
        assert_eq!(r.title.as_deref(), Some("One More Time"));
        assert_eq!(r.pattern_confidence, Confidence::High);
    }

    #[test]
    fn bracket_id_with_info() {
        let r = parse("Tool - Schism (Official Video) [CsHiG-43Fzg]");
        assert_eq!(r.pattern, NamePattern::VideoId);
        assert_eq!(r.artist.as_deref(), Some("Tool"));
        assert_eq!(r.title.as_deref(), Some("Schism (Official Video)"));
    }

    #[test]
    fn short_dailymotion_id() {
        let r = parse("FBI - ON A LE STYLE QUI CLAQUE [x28l79]");
        assert_eq!(r.pattern, NamePattern::VideoId);
        assert_eq!(r.artist.as_deref(), Some("FBI"));
        assert_eq!(r.title.as_deref(), Some("ON A LE Style QUI Claque"));
    }

    #[test]
    fn ytdlp_dash_id() {
        let r = parse("Boards of Canada - Dayvan Cowboy-oW0VovnyjPY");
        assert_eq!(r.pattern, NamePattern::VideoId);
        assert_eq!(r.artist.as_deref(), Some("Boards Of Canada"));
        assert_eq!(r.title.as_deref(), Some("Dayvan Cowboy"));
    }

    #[test]
    fn ytdlp_id_starting_with_dash() {
        let r = parse("Artist - Formula--G_nX3n_sog");
        assert_eq!(r.pattern, NamePattern::VideoId);
        assert_eq!(r.title.as_deref(), Some("Formula"));
    }

    #[test]
    fn plain_word_in_brackets_is_not_an_id() {
        let r = parse("Artist - Title [Remastered]");
        assert_eq!(r.pattern, NamePattern::ArtistTitle);
        assert_eq!(r.title.as_deref(), Some("Title [Remastered]"));
    }

    #[test]
    fn opaque_id_heuristic() {
        assert!(is_opaque_id("abc123XYZ9"));
        assert!(is_opaque_id("CsHiG-43Fzg"));
        assert!(is_opaque_id("oW0VovnyjPY"));
        assert!(is_opaque_id("x28l79"));
        assert!(!is_opaque_id("Remastered"));
        assert!(!is_opaque_id("REMASTERED"));
        assert!(!is_opaque_id("lowercase"));
        assert!(!is_opaque_id("has space1"));
        assert!(!is_opaque_id(""));
    }

    // === Pattern 2: Artist - Title ===

    #[test]
    fn simple_artist_title() {
        let r = parse("Deftones - Change (In the House of Flies)");
        assert_eq!(r.pattern, NamePattern::ArtistTitle);
        assert_eq!(r.artist.as_deref(), Some("Deftones"));
        assert_eq!(r.title.as_deref(), Some("Change (In The House Of Flies)"));
        assert_eq!(r.pattern_confidence, Confidence::High);
    }

    #[test]
    fn underscore_separator() {
        let r = parse("Iron_Maiden_-_The_Trooper");
        assert_eq!(r.pattern, NamePattern::ArtistTitle);
        assert_eq!(r.artist.as_deref(), Some("Iron Maiden"));
        assert_eq!(r.title.as_deref(), Some("The Trooper"));
    }

    #[test]
    fn contractions_survive() {
        let r = parse("Guns N' Roses - Knockin' on Heaven's Door");
        assert_eq!(r.pattern, NamePattern::ArtistTitle);
        assert_eq!(r.artist.as_deref(), Some("Guns N' Roses"));
        assert_eq!(r.title.as_deref(), Some("Knockin' On Heaven's Door"));
    }

    #[test]
    fn hyphen_inside_word_is_not_a_separator() {
        let r = parse("Jay-Z - Izzo");
        assert_eq!(r.artist.as_deref(), Some("Jay-z"));
        assert_eq!(r.title.as_deref(), Some("Izzo"));
    }

    #[test]
    fn high_patterns_always_fill_both_fields() {
        for stem in [
            "A - B",
            "Daft_Punk - One_More_Time [abc123XYZ9]",
            "x - y-oW0VovnyjPY",
            "Iron_Maiden_-_The_Trooper",
        ] {
            let r = parse(stem);
            assert_eq!(r.pattern_confidence, Confidence::High, "{stem}");
            assert!(r.artist.is_some() && r.title.is_some(), "{stem}");
        }
    }

    #[test]
    fn empty_title_is_not_artist_title() {
        let r = parse("Artist - ...");
        assert_eq!(r.pattern, NamePattern::Fallback);
        assert_eq!(r.artist.as_deref(), Some("Artist"));
        assert_eq!(r.title, None);
    }

    // === Pattern 3: quoted album ===

    #[test]
    fn quoted_album_with_subtitle_and_id() {
        let r = parse("Charlotte de Witte 'New Form' II - Return To Nowhere-EiEFdnU6KWY");
        assert_eq!(r.pattern, NamePattern::QuotedAlbum);
        assert_eq!(r.artist.as_deref(), Some("Charlotte De Witte"));
        assert_eq!(r.title.as_deref(), Some("New Form II - Return To Nowhere"));
        assert_eq!(r.pattern_confidence, Confidence::Medium);
    }

    #[test]
    fn quoted_album_episode_only() {
        let r = parse("Charlotte de Witte 'New Form' I-3cOOu52n26c");
        assert_eq!(r.pattern, NamePattern::QuotedAlbum);
        assert_eq!(r.title.as_deref(), Some("New Form I"));
    }

    #[test]
    fn quoted_album_without_track() {
        let r = parse("Burial 'Untrue'");
        assert_eq!(r.pattern, NamePattern::QuotedAlbum);
        assert_eq!(r.artist.as_deref(), Some("Burial"));
        assert_eq!(r.title.as_deref(), Some("Untrue"));
    }

    #[test]
    fn quoted_album_with_inner_apostrophe() {
        let r = parse("Artist 'Don't Stop' Track One");
        assert_eq!(r.pattern, NamePattern::QuotedAlbum);
        assert_eq!(r.title.as_deref(), Some("Don't Stop Track One"));
    }

    #[test]
    fn single_letter_quote_is_not_an_album() {
        let r = parse("Rock 'n' Roll Band - Song");
        assert_eq!(r.pattern, NamePattern::ArtistTitle);
        assert_eq!(r.artist.as_deref(), Some("Rock 'N' Roll Band"));
    }

    // === Pattern 4: live sets ===

    #[test]
    fn au_festival_hdtv() {
        let r = parse("Artist - Au Festival 2015 HDTV");
        assert_eq!(r.pattern, NamePattern::LiveSet);
        assert_eq!(r.artist.as_deref(), Some("Artist"));
        assert_eq!(r.title.as_deref(), Some("Au Festival 2015"));
        assert_eq!(r.pattern_confidence, Confidence::Medium);
    }

    #[test]
    fn dotted_live_web() {
        let r = parse("Napalm.Death.-.Live.Deathfist.Festival.2019.WEB.AVC");
        assert_eq!(r.pattern, NamePattern::LiveSet);
        assert_eq!(r.artist.as_deref(), Some("Napalm Death"));
        assert_eq!(r.title.as_deref(), Some("Live Deathfist Festival 2019"));
    }

    #[test]
    fn year_without_tech_tag_is_plain_title() {
        let r = parse("Artist - Summer 2015");
        assert_eq!(r.pattern, NamePattern::ArtistTitle);
        assert_eq!(r.title.as_deref(), Some("Summer 2015"));
    }

    // === Pattern 5: multiple separators ===

    #[test]
    fn multi_part_keeps_rest_as_title() {
        let r = parse("Artist - Album - Track");
        assert_eq!(r.pattern, NamePattern::MultiPart);
        assert_eq!(r.artist.as_deref(), Some("Artist"));
        assert_eq!(r.title.as_deref(), Some("Album - Track"));
        assert_eq!(r.pattern_confidence, Confidence::Medium);
    }

    // === Pattern 6: fallback ===

    #[test]
    fn no_separator_falls_back() {
        let r = parse("SomeArtist-SomeTrack");
        assert_eq!(r.pattern, NamePattern::Fallback);
        assert_eq!(r.artist.as_deref(), Some("Someartist-sometrack"));
        assert_eq!(r.title, None);
        assert_eq!(r.pattern_confidence, Confidence::Low);
    }

    #[test]
    fn nothing_usable_is_unmatched() {
        for stem in ["", "   ", "_-_", "..."] {
            let r = parse(stem);
            assert_eq!(r.artist, None, "{stem:?}");
            assert_eq!(r.title, None, "{stem:?}");
            assert_eq!(r.pattern_confidence, Confidence::Low);
        }
    }

    #[test]
    fn video_id_anywhere() {
        assert!(contains_video_id("Artist - Title [abc123XYZ9] extra"));
        assert!(contains_video_id("Artist - Title-oW0VovnyjPY"));
        assert!(!contains_video_id("Artist - Title [Remastered]"));
        assert!(!contains_video_id("Artist - Some-Title-Remastered"));
    }

    #[test]
    fn undot_only_rewrites_dot_delimited_stems() {
        assert_eq!(undot("a.b.c"), "a b c");
        assert_eq!(undot("Mr.Oizo"), "Mr.Oizo");
        assert_eq!(undot("Artist - Feat. Someone.Else"), "Artist - Feat. Someone.Else");
    }
}
