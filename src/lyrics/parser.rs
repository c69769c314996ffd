//! LRC timestamp parser
//!
//! Turns a lyric payload into a `LyricSequence`:
//! [mm:ss.xx] Lyrics line here
//!
//! Example:
//! [00:12.34] Hello world
//! [00:15.00] Another line
//!
//! Only the leading tag of a line is read. Lines without one keep time 0,
//! which is how plain (unsynced) payloads come out. Input order is kept as-is,
//! so a misordered file stays misordered.

use super::{LyricLine, LyricSequence};

/// Parse a synced or plain lyric payload
pub fn parse(raw: &str) -> LyricSequence {
    if raw.is_empty() {
        return LyricSequence::from_lines(Vec::new());
    }

    let mut lines = Vec::new();

    for line in raw.lines() {
        let (time, text) = match parse_leading_tag(line) {
            Some((time, rest)) => (time, rest.trim()),
            None => (0.0, line),
        };

        if text.trim().is_empty() {
            continue;
        }

        lines.push(LyricLine::new(time, text));
    }

    LyricSequence::from_lines(lines)
}

/// Read a `[MM:SS.CC]` tag at the very start of `line`.
///
/// Returns the time in seconds and the remainder of the line. Each field is a
/// run of ASCII digits of any width; the last one counts hundredths.
fn parse_leading_tag(line: &str) -> Option<(f64, &str)> {
    let inner_start = line.strip_prefix('[')?;
    let end = inner_start.find(']')?;
    let tag = &inner_start[..end];
    let rest = &inner_start[end + 1..];

    let (minutes, tail) = tag.split_once(':')?;
    let (seconds, hundredths) = tail.split_once('.')?;

    let minutes = parse_digits(minutes)?;
    let seconds = parse_digits(seconds)?;
    let hundredths = parse_digits(hundredths)?;

    Some((minutes * 60.0 + seconds + hundredths / 100.0, rest))
}

fn parse_digits(s: &str) -> Option<f64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::NO_LYRICS_AVAILABLE;

    #[test]
    fn test_parse_leading_tag() {
        let (t, rest) = parse_leading_tag("[00:12.34]x").unwrap();
        assert!((t - 12.34).abs() < 1e-9);
        assert_eq!(rest, "x");
        let (t, rest) = parse_leading_tag("[1:02.5] y").unwrap();
        assert!((t - 62.05).abs() < 1e-9);
        assert_eq!(rest, " y");
        assert_eq!(parse_leading_tag("[ti:Title]"), None);
        assert_eq!(parse_leading_tag("[00:12]no fraction"), None);
        assert_eq!(parse_leading_tag("x [00:12.34]"), None);
    }

    #[test]
    fn test_parse_synced_line() {
        let seq = parse("[01:02.50]Hello");
        assert_eq!(seq.lines(), &[LyricLine::new(62.5, "Hello")]);
    }

    #[test]
    fn test_parse_empty_payload_is_sentinel() {
        let seq = parse("");
        assert_eq!(seq.lines(), &[LyricLine::new(0.0, NO_LYRICS_AVAILABLE)]);
    }

    #[test]
    fn test_parse_plain_drops_blank_lines() {
        let seq = parse("Plain line\n\n");
        assert_eq!(seq.lines(), &[LyricLine::new(0.0, "Plain line")]);
    }

    #[test]
    fn test_parse_drops_tag_only_lines_and_keeps_order() {
        let lrc = "[00:20.00]second\n[00:05.00]   \n[00:10.00] first\n";
        let seq = parse(lrc);
        assert_eq!(
            seq.lines(),
            &[LyricLine::new(20.0, "second"), LyricLine::new(10.0, "first")]
        );
    }

    #[test]
    fn test_parse_strips_only_first_tag() {
        let seq = parse("[00:01.00][00:02.00]chorus");
        assert_eq!(seq.lines(), &[LyricLine::new(1.0, "[00:02.00]chorus")]);
    }

    #[test]
    fn test_parse_untagged_keeps_text_verbatim() {
        let seq = parse("  indented\r\n[ar:Someone]");
        assert_eq!(seq.lines()[0], LyricLine::new(0.0, "  indented"));
        assert_eq!(seq.lines()[1], LyricLine::new(0.0, "[ar:Someone]"));
    }

    #[test]
    fn test_parse_whitespace_only_payload_is_sentinel() {
        let seq = parse("\n   \n");
        assert_eq!(seq.lines()[0].text, NO_LYRICS_AVAILABLE);
    }
}
