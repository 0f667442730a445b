//! Line lexer: splits the text into section-tagged records.
//!
//! Comments start at `;` and run to the end of the line. Blank lines and
//! comment-only lines produce no record, except that inside `[CURVES]` a
//! comment such as `;PUMP: Pump curve for pump 9` labels the next curve.

use std::borrow::Cow;

use hn_core::FormatError;
use hn_network::CurveType;

/// Sections that carry modelled data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Title,
    Junctions,
    Reservoirs,
    Tanks,
    Pipes,
    Pumps,
    Valves,
    Patterns,
    Curves,
    Coordinates,
    Options,
    Times,
    Demands,
    Status,
}

impl Section {
    pub fn name(self) -> &'static str {
        match self {
            Section::Title => "TITLE",
            Section::Junctions => "JUNCTIONS",
            Section::Reservoirs => "RESERVOIRS",
            Section::Tanks => "TANKS",
            Section::Pipes => "PIPES",
            Section::Pumps => "PUMPS",
            Section::Valves => "VALVES",
            Section::Patterns => "PATTERNS",
            Section::Curves => "CURVES",
            Section::Coordinates => "COORDINATES",
            Section::Options => "OPTIONS",
            Section::Times => "TIMES",
            Section::Demands => "DEMANDS",
            Section::Status => "STATUS",
        }
    }

    /// Sections whose records declare a node or link id.
    pub fn declares_element(self) -> bool {
        matches!(
            self,
            Section::Junctions
                | Section::Reservoirs
                | Section::Tanks
                | Section::Pipes
                | Section::Pumps
                | Section::Valves
        )
    }
}

enum Tag {
    Modelled(Section),
    Unmodelled,
    End,
}

fn classify(name: &str) -> Option<Tag> {
    let section = match name {
        "TITLE" => Section::Title,
        "JUNCTIONS" => Section::Junctions,
        "RESERVOIRS" => Section::Reservoirs,
        "TANKS" => Section::Tanks,
        "PIPES" => Section::Pipes,
        "PUMPS" => Section::Pumps,
        "VALVES" => Section::Valves,
        "PATTERNS" => Section::Patterns,
        "CURVES" => Section::Curves,
        "COORDINATES" => Section::Coordinates,
        "OPTIONS" => Section::Options,
        "TIMES" => Section::Times,
        "DEMANDS" => Section::Demands,
        "STATUS" => Section::Status,
        "TAGS" | "EMITTERS" | "QUALITY" | "SOURCES" | "REACTIONS" | "MIXING" | "ENERGY"
        | "CONTROLS" | "RULES" | "REPORT" | "VERTICES" | "LABELS" | "BACKDROP" | "LEAKAGE" => {
            return Some(Tag::Unmodelled);
        }
        "END" => return Some(Tag::End),
        _ => return None,
    };
    Some(Tag::Modelled(section))
}

/// One data line of a modelled section.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<'a> {
    pub section: Section,
    /// 1-based line number in the source text.
    pub line: usize,
    /// Line content with the comment removed, trimmed.
    pub text: &'a str,
    pub tokens: Vec<&'a str>,
    /// Curve purpose announced by a label comment just before this record.
    pub label: Option<CurveType>,
}

enum State {
    Outside,
    In(Section),
    Skipping,
}

/// Split `text` into records. Lines after `[END]` are ignored.
pub fn lex(text: &str) -> Result<Vec<Record<'_>>, FormatError> {
    let mut records = Vec::new();
    let mut state = State::Outside;
    let mut pending_label = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let raw = if idx == 0 {
            raw.trim_start_matches('\u{feff}')
        } else {
            raw
        };
        let (data, comment) = match raw.find(';') {
            Some(pos) => (&raw[..pos], Some(&raw[pos + 1..])),
            None => (raw, None),
        };
        let data = data.trim();

        if data.is_empty() {
            if let (State::In(Section::Curves), Some(comment)) = (&state, comment) {
                if let Some(label) = curve_label(comment) {
                    pending_label = Some(label);
                }
            }
            continue;
        }

        if data.starts_with('[') {
            let name = section_name(data).ok_or_else(|| FormatError::MalformedSection {
                line,
                tag: data.to_string(),
            })?;
            pending_label = None;
            state = match classify(&name) {
                Some(Tag::Modelled(section)) => State::In(section),
                Some(Tag::Unmodelled) => State::Skipping,
                Some(Tag::End) => break,
                None => {
                    return Err(FormatError::UnknownSection {
                        line,
                        tag: data.to_string(),
                    });
                }
            };
            continue;
        }

        match state {
            State::Outside => return Err(FormatError::OutsideSection { line }),
            State::Skipping => {}
            State::In(section) => records.push(Record {
                section,
                line,
                text: data,
                tokens: data.split_whitespace().collect(),
                label: pending_label.take(),
            }),
        }
    }

    Ok(records)
}

/// Decode raw file bytes. Non-UTF-8 bytes are tolerated inside comments and
/// replaced with U+FFFD; anywhere else they fail with the line number.
pub fn decode_source(bytes: &[u8]) -> Result<Cow<'_, str>, FormatError> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(Cow::Borrowed(text));
    }
    let mut text = String::with_capacity(bytes.len());
    for (idx, raw) in bytes.split(|&b| b == b'\n').enumerate() {
        if idx > 0 {
            text.push('\n');
        }
        // `;` never occurs inside a multi-byte sequence.
        let data_end = raw.iter().position(|&b| b == b';').unwrap_or(raw.len());
        let (data, comment) = raw.split_at(data_end);
        let data = std::str::from_utf8(data)
            .map_err(|_| FormatError::InvalidEncoding { line: idx + 1 })?;
        text.push_str(data);
        text.push_str(&String::from_utf8_lossy(comment));
    }
    Ok(Cow::Owned(text))
}

/// Upper-cased name of a well-formed `[NAME]` tag.
fn section_name(data: &str) -> Option<String> {
    let inner = data.strip_prefix('[')?.strip_suffix(']')?.trim();
    if inner.is_empty() || inner.contains(|c: char| c.is_whitespace() || c == '[' || c == ']') {
        return None;
    }
    Some(inner.to_ascii_uppercase())
}

/// `PUMP: ...` style curve label written in front of a curve.
fn curve_label(comment: &str) -> Option<CurveType> {
    let (word, _) = comment.trim().split_once(':')?;
    CurveType::from_keyword(word.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_blank_lines() {
        let text = "[JUNCTIONS]\n;ID Elev\n\n J1  10 ; first\n";
        let records = lex(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tokens, ["J1", "10"]);
        assert_eq!(records[0].line, 4);
        assert_eq!(records[0].section, Section::Junctions);
    }

    #[test]
    fn section_tags_are_case_insensitive() {
        let records = lex("[pipes]\nP1 A B 1 1 1\n").unwrap();
        assert_eq!(records[0].section, Section::Pipes);
    }

    #[test]
    fn malformed_and_unknown_tags() {
        let err = lex("[PIPES\nP1 A B 1 1 1\n").unwrap_err();
        assert!(matches!(err, FormatError::MalformedSection { line: 1, .. }));
        let err = lex("[TITLE]\nx\n[BOGUS]\n").unwrap_err();
        assert!(matches!(err, FormatError::UnknownSection { line: 3, ref tag } if tag == "[BOGUS]"));
    }

    #[test]
    fn data_before_first_tag_is_rejected() {
        let err = lex("J1 10\n[JUNCTIONS]\n").unwrap_err();
        assert!(matches!(err, FormatError::OutsideSection { line: 1 }));
        // Comments and blank lines before the first tag are fine.
        assert!(lex("; header\n\n[JUNCTIONS]\n").unwrap().is_empty());
    }

    #[test]
    fn unmodelled_sections_and_end_are_skipped() {
        let text = "[ENERGY]\nGlobal Efficiency 75\n[JUNCTIONS]\nJ1 1\n[END]\ngarbage [\n";
        let records = lex(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "J1 1");
    }

    #[test]
    fn latin1_bytes_are_tolerated_in_comments_only() {
        let text = decode_source(b"[JUNCTIONS]\r\nJ1 10 ; Reservat\xF3rio\n").unwrap();
        assert!(matches!(text, Cow::Owned(_)));
        let records = lex(&text).unwrap();
        assert_eq!(records[0].tokens, ["J1", "10"]);

        let err = decode_source(b"[JUNCTIONS]\nJ1 10\nJ\xF3 20\n").unwrap_err();
        assert!(matches!(err, FormatError::InvalidEncoding { line: 3 }));
        assert!(matches!(decode_source(b"[TITLE]\n").unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn curve_labels_attach_to_next_record() {
        let text = "[CURVES]\n;PUMP: pump curve\nC1 1 2\nC1 3 4\n;note: not a label\nC2 1 1\n";
        let records = lex(text).unwrap();
        assert_eq!(records[0].label, Some(CurveType::Pump));
        assert_eq!(records[1].label, None);
        assert_eq!(records[2].label, None);
    }
}
