//! brat `.ann` line parsing
//!
//! Entity tags:
//! ```text
//! T1\tSubject 0 8\tMichalka wonka
//! ```
//! Relations:
//! ```text
//! R1\tfounded Arg1:T1 Arg2:T3
//! ```
//! Other brat line kinds (events, attributes, notes) are not read.

use relvec_core::{RelvecError, Result, Tag};

/// A parsed relation line; arguments are still tag ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationLine {
    pub line_no: usize,
    pub id: String,
    pub label: String,
    pub arg1: String,
    pub arg2: String,
}

/// Lines starting with `marker`, with their 1-based line numbers
pub fn marked_lines(annotation: &str, marker: char) -> impl Iterator<Item = (usize, &str)> {
    annotation
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(move |(_, line)| line.starts_with(marker))
}

fn malformed(line_no: usize, line: &str, reason: impl Into<String>) -> RelvecError {
    RelvecError::MalformedLine {
        line_no,
        line: line.to_string(),
        reason: reason.into(),
    }
}

/// Parse an entity tag line into a [`Tag`]
pub fn parse_tag_line(line_no: usize, line: &str) -> Result<Tag> {
    let mut fields = line.splitn(3, '\t');
    let id = fields.next().unwrap_or_default();
    let body = fields
        .next()
        .ok_or_else(|| malformed(line_no, line, "missing tab-separated tag body"))?;
    let text = fields
        .next()
        .ok_or_else(|| malformed(line_no, line, "missing surface text"))?;

    let parts: Vec<&str> = body.split(' ').collect();
    let [label, start, end] = parts.as_slice() else {
        return Err(malformed(
            line_no,
            line,
            "expected `label start end` (discontinuous ranges are not supported)",
        ));
    };

    let start: usize = start
        .parse()
        .map_err(|_| malformed(line_no, line, format!("invalid start offset {start:?}")))?;
    let end: usize = end
        .parse()
        .map_err(|_| malformed(line_no, line, format!("invalid end offset {end:?}")))?;
    if start > end {
        return Err(malformed(line_no, line, "start offset after end offset"));
    }

    Ok(Tag::new(id, *label, start, end, text))
}

/// Parse a relation line into a [`RelationLine`]
pub fn parse_relation_line(line_no: usize, line: &str) -> Result<RelationLine> {
    let mut fields = line.split('\t');
    let id = fields.next().unwrap_or_default();
    let body = fields
        .next()
        .ok_or_else(|| malformed(line_no, line, "missing tab-separated relation body"))?;

    let parts: Vec<&str> = body.split(' ').filter(|p| !p.is_empty()).collect();
    if parts.len() < 3 {
        return Err(malformed(
            line_no,
            line,
            "expected `label Arg1:<tag> Arg2:<tag>`",
        ));
    }

    let arg1 = parts[1]
        .strip_prefix("Arg1:")
        .ok_or_else(|| malformed(line_no, line, "first argument is not Arg1"))?;
    let arg2 = parts[2]
        .strip_prefix("Arg2:")
        .ok_or_else(|| malformed(line_no, line, "second argument is not Arg2"))?;

    Ok(RelationLine {
        line_no,
        id: id.to_string(),
        label: parts[0].trim().to_string(),
        arg1: arg1.trim().to_string(),
        arg2: arg2.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_line() {
        let tag = parse_tag_line(1, "T1\tSubject 0 14\tMichalka wonka").unwrap();
        assert_eq!(tag.id, "T1");
        assert_eq!(tag.label, "Subject");
        assert_eq!((tag.start, tag.end), (0, 14));
        assert_eq!(tag.text, "Michalka wonka");
    }

    #[test]
    fn test_parse_tag_line_rejects_discontinuous() {
        let err = parse_tag_line(3, "T2\tSubject 0 5;6 8\tab cd").unwrap_err();
        match err {
            RelvecError::MalformedLine { line_no, .. } => assert_eq!(line_no, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_tag_line_rejects_bad_offsets() {
        assert!(parse_tag_line(1, "T1\tSubject a 4\tabcd").is_err());
        assert!(parse_tag_line(1, "T1\tSubject 6 4\tab").is_err());
        assert!(parse_tag_line(1, "T1\tSubject 0 4").is_err());
        assert!(parse_tag_line(1, "T1").is_err());
    }

    #[test]
    fn test_parse_relation_line() {
        let rel = parse_relation_line(4, "R1\tfounded Arg1:T1 Arg2:T3").unwrap();
        assert_eq!(rel.id, "R1");
        assert_eq!(rel.label, "founded");
        assert_eq!(rel.arg1, "T1");
        assert_eq!(rel.arg2, "T3");
        assert_eq!(rel.line_no, 4);
    }

    #[test]
    fn test_parse_relation_line_rejects_missing_args() {
        assert!(parse_relation_line(1, "R1\tfounded Arg1:T1").is_err());
        assert!(parse_relation_line(1, "R1\tfounded T1 T2").is_err());
        assert!(parse_relation_line(1, "R1").is_err());
    }

    #[test]
    fn test_marked_lines() {
        let ann = "T1\tA 0 1\ta\r\n#1\tAnnotatorNotes T1\tx\nR1\tr Arg1:T1 Arg2:T1\n";
        let tags: Vec<_> = marked_lines(ann, 'T').collect();
        assert_eq!(tags, vec![(1, "T1\tA 0 1\ta")]);
        let rels: Vec<_> = marked_lines(ann, 'R').map(|(n, _)| n).collect();
        assert_eq!(rels, vec![3]);
    }
}
