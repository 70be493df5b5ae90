use std::{iter::Enumerate, str::Lines};

use crate::{
    error::{ParseError, Result},
    path::PathPrefix,
    Entry,
};

const COMMENT_MARKERS: [char; 2] = ['#', '!'];

/// Turn one line of a properties file into an entry under `prefix`.
///
/// Returns `Ok(None)` for blank lines and comment lines (first non-whitespace
/// character is `#` or `!`).
///
/// The part before the first `=` of the trimmed line is the property name,
/// taken verbatim with every `.` replaced by `/`. The part after it is the value, cut at the first `#` and
/// trimmed.
///
/// # Errors
///
/// Returns an error if the line has no `=` or if the name before it is empty.
///
/// # Example
///
/// ```
/// use kvseed_core::{parse_line, PathPrefix};
///
/// let prefix = PathPrefix::from("config/dev/myapp/");
/// let entry = parse_line("db.host=localhost # comment", &prefix)
///     .unwrap()
///     .unwrap();
///
/// assert_eq!(entry.key, "config/dev/myapp/db/host");
/// assert_eq!(entry.value, "localhost");
/// ```
pub fn parse_line(line: &str, prefix: &PathPrefix) -> Result<Option<Entry>> {
    let line = line.trim();

    if line.is_empty() || line.starts_with(&COMMENT_MARKERS[..]) {
        return Ok(None);
    }

    let (name, rest) = line.split_once('=').ok_or(ParseError::MissingSeparator)?;

    if name.is_empty() {
        return Err(ParseError::EmptyKey);
    }

    let value = rest.split_once('#').map_or(rest, |(value, _)| value).trim();

    Ok(Some(Entry::new(prefix.join(&name.replace('.', "/")), value)))
}

/// A line of a properties document that produced either an entry or an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// 1-based line number in the source document.
    pub line_number: usize,
    pub result: Result<Entry>,
}

/// Iterator over the meaningful lines of a properties document.
///
/// Blank and comment lines are skipped.
#[derive(Debug, Clone)]
pub struct Properties<'a> {
    lines: Enumerate<Lines<'a>>,
    prefix: &'a PathPrefix,
}

impl Iterator for Properties<'_> {
    type Item = ParsedLine;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, line) in self.lines.by_ref() {
            match parse_line(line, self.prefix) {
                Ok(None) => {}
                Ok(Some(entry)) => {
                    return Some(ParsedLine {
                        line_number: index + 1,
                        result: Ok(entry),
                    })
                }
                Err(e) => {
                    return Some(ParsedLine {
                        line_number: index + 1,
                        result: Err(e),
                    })
                }
            }
        }

        None
    }
}

/// Parse a whole properties document.
#[must_use]
pub fn parse_str<'a>(input: &'a str, prefix: &'a PathPrefix) -> Properties<'a> {
    Properties {
        lines: input.lines().enumerate(),
        prefix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix() -> PathPrefix {
        PathPrefix::from("config/dev/myapp/")
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        for line in ["", "   ", "\t", " \t  "] {
            assert_eq!(parse_line(line, &prefix()), Ok(None), "line {line:?}");
        }
    }

    #[test]
    fn test_comment_lines_are_skipped() {
        for line in ["# comment", "! comment", "   # indented", "\t!x=y", "#a=b"] {
            assert_eq!(parse_line(line, &prefix()), Ok(None), "line {line:?}");
        }
    }

    #[test]
    fn test_inline_comment_is_stripped() {
        let entry = parse_line("db.host=localhost # comment", &prefix())
            .unwrap()
            .unwrap();
        assert_eq!(entry.key, "config/dev/myapp/db/host");
        assert_eq!(entry.value, "localhost");
    }

    #[test]
    fn test_dots_in_value_are_kept() {
        let entry = parse_line("a.b.c=1.2.3", &prefix()).unwrap().unwrap();
        assert_eq!(entry.key, "config/dev/myapp/a/b/c");
        assert_eq!(entry.value, "1.2.3");
    }

    #[test]
    fn test_only_first_separator_splits() {
        let entry = parse_line("url=http://host/?a=b", &prefix())
            .unwrap()
            .unwrap();
        assert_eq!(entry.key, "config/dev/myapp/url");
        assert_eq!(entry.value, "http://host/?a=b");
    }

    #[test]
    fn test_whitespace_around_line_and_value() {
        let entry = parse_line("  db.port=  5432  ", &prefix())
            .unwrap()
            .unwrap();
        assert_eq!(entry.key, "config/dev/myapp/db/port");
        assert_eq!(entry.value, "5432");
    }

    #[test]
    fn test_name_keeps_inner_whitespace() {
        let entry = parse_line("a.b =1", &prefix()).unwrap().unwrap();
        assert_eq!(entry.key, "config/dev/myapp/a/b ");
        assert_eq!(entry.value, "1");
    }

    #[test]
    fn test_empty_value() {
        let entry = parse_line("feature.flag=", &prefix()).unwrap().unwrap();
        assert_eq!(entry.key, "config/dev/myapp/feature/flag");
        assert_eq!(entry.value, "");

        let entry = parse_line("feature.flag= # nothing here", &prefix())
            .unwrap()
            .unwrap();
        assert_eq!(entry.value, "");
    }

    #[test]
    fn test_missing_separator() {
        assert_eq!(
            parse_line("just.a.key", &prefix()),
            Err(ParseError::MissingSeparator)
        );
    }

    #[test]
    fn test_empty_key() {
        assert_eq!(parse_line("=value", &prefix()), Err(ParseError::EmptyKey));
        assert_eq!(parse_line("   = value", &prefix()), Err(ParseError::EmptyKey));
    }

    #[test]
    fn test_parse_str_reports_line_numbers() {
        let prefix = PathPrefix::new("dev", "myapp", "bob");
        let input = "# header\r\n\r\ndb.host=localhost\r\nbroken\r\n! bang\r\ndb.port=5432 # pg\r\n";

        let parsed: Vec<_> = parse_str(input, &prefix).collect();

        assert_eq!(
            parsed,
            vec![
                ParsedLine {
                    line_number: 3,
                    result: Ok(Entry::new("config/dev/myapp/bob/db/host", "localhost")),
                },
                ParsedLine {
                    line_number: 4,
                    result: Err(ParseError::MissingSeparator),
                },
                ParsedLine {
                    line_number: 6,
                    result: Ok(Entry::new("config/dev/myapp/bob/db/port", "5432")),
                },
            ]
        );
    }

    #[test]
    fn test_parse_str_keeps_file_order_and_duplicates() {
        let prefix = PathPrefix::new("dev", "myapp", "bob");
        let input = "a=1\nb=2\na=3\n";

        let values: Vec<_> = parse_str(input, &prefix)
            .map(|line| line.result.unwrap().value)
            .collect();

        assert_eq!(values, ["1", "2", "3"]);
    }
}
