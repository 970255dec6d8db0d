//! Free-text coordinate parsing.
//!
//! Each non-blank line holds one coordinate as comma-separated fields.
//! Lines that cannot be turned into a coordinate are reported as warnings
//! instead of failing the whole input, and accepted lines with implausible
//! values get an extra non-blocking warning.

use crate::NewCoordinate;
use serde::{Deserialize, Serialize};

/// Lines with `|z|` below this while `|x|` is above [`TRUNCATED_Z_MIN_X`] look
/// like a Z value that lost digits.
const TRUNCATED_Z_MAX: i64 = 10;
const TRUNCATED_Z_MIN_X: i64 = 100;

/// Heights beyond this are outside any sensible build range.
const MAX_PLAUSIBLE_HEIGHT: i64 = 500;

/// Field order of a coordinate line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// `label, x, y, z`
    #[default]
    LabelFirst,
    /// `x, y, z, label` where the label may itself contain commas
    LabelLast,
}

impl Layout {
    pub fn format_hint(self) -> &'static str {
        match self {
            Layout::LabelFirst => "label, x, y, z",
            Layout::LabelLast => "x, y, z, label",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The line was dropped
    Rejected,
    /// The line was accepted but a value looks wrong
    Suspicious,
}

/// A diagnostic about one input line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// 1-based line number in the original text
    pub line_number: usize,
    /// The offending line, trimmed
    pub line: String,
    /// Human-readable description of the problem
    pub issue: String,
    pub severity: Severity,
}

/// Result of parsing a block of text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
    /// Accepted coordinates in input order
    pub coordinates: Vec<NewCoordinate>,
    pub warnings: Vec<ParseWarning>,
}

impl ParseReport {
    pub fn rejected(&self) -> impl Iterator<Item = &ParseWarning> {
        self.warnings
            .iter()
            .filter(|w| w.severity == Severity::Rejected)
    }

    pub fn suspicious(&self) -> impl Iterator<Item = &ParseWarning> {
        self.warnings
            .iter()
            .filter(|w| w.severity == Severity::Suspicious)
    }
}

/// Parses `label, x, y, z` lines.
pub fn parse(text: &str) -> ParseReport {
    parse_with_layout(text, Layout::LabelFirst)
}

pub fn parse_with_layout(text: &str, layout: Layout) -> ParseReport {
    let mut report = ParseReport::default();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let mut warn = |issue: String, severity| {
            report.warnings.push(ParseWarning {
                line_number: index + 1,
                line: line.to_owned(),
                issue,
                severity,
            });
        };

        match parse_line(line, layout) {
            Ok(coordinate) => {
                for issue in plausibility_issues(&coordinate) {
                    warn(issue, Severity::Suspicious);
                }
                report.coordinates.push(coordinate);
            }
            Err(issue) => warn(issue, Severity::Rejected),
        }
    }

    log::debug!(
        "Parsed {} coordinate(s) with {} warning(s)",
        report.coordinates.len(),
        report.warnings.len()
    );

    report
}

fn parse_line(line: &str, layout: Layout) -> Result<NewCoordinate, String> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();

    if parts.len() < 4 {
        return Err(format!(
            "Missing coordinates (expected {})",
            layout.format_hint()
        ));
    }

    let (label, numbers) = match layout {
        Layout::LabelFirst => (parts[0].to_owned(), &parts[1..4]),
        Layout::LabelLast => (parts[3..].join(", ").trim().to_owned(), &parts[0..3]),
    };

    let (Some(x), Some(y), Some(z)) = (
        parse_int(numbers[0]),
        parse_int(numbers[1]),
        parse_int(numbers[2]),
    ) else {
        return Err("Invalid coordinates (x, y and z must be whole numbers)".to_owned());
    };

    if label.is_empty() {
        return Err("Missing label".to_owned());
    }

    Ok(NewCoordinate::new(label, x, y, z))
}

fn plausibility_issues(coordinate: &NewCoordinate) -> Vec<String> {
    let x = i64::from(coordinate.x).abs();
    let y = i64::from(coordinate.y).abs();
    let z = i64::from(coordinate.z).abs();

    let mut issues = Vec::new();
    if z < TRUNCATED_Z_MAX && x > TRUNCATED_Z_MIN_X {
        issues.push(format!(
            "Z value {} is unusually small for X {}; it may be truncated",
            coordinate.z, coordinate.x
        ));
    }
    if y > MAX_PLAUSIBLE_HEIGHT {
        issues.push(format!(
            "Y value {} is outside the usual height range",
            coordinate.y
        ));
    }
    issues
}

/// Reads the leading base-10 integer of `field`.
///
/// An optional sign followed by at least one digit is required; anything
/// after the digits (such as a fractional part) is ignored, so `"12.9"`
/// reads as 12. Values that do not fit an `i32` are rejected.
pub fn parse_int(field: &str) -> Option<i32> {
    let field = field.trim_start();
    let (negative, rest) = match field.as_bytes().first() {
        Some(b'-') => (true, &field[1..]),
        Some(b'+') => (false, &field[1..]),
        _ => (false, field),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).ok()
}

/// Builds a coordinate from the single-entry form fields.
///
/// The label is required; blank or unreadable numbers fall back to 0.
pub fn parse_form(x: &str, y: &str, z: &str, label: &str) -> Option<NewCoordinate> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    Some(NewCoordinate::new(
        label,
        parse_int(x).unwrap_or(0),
        parse_int(y).unwrap_or(0),
        parse_int(z).unwrap_or(0),
    ))
}
