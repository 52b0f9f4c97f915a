//! Intermediate file formats shared by the fetcher and the graph builder.
//!
//! Two line-oriented codecs implement [`RecordCodec`]: line-delimited JSON
//! ([`RecordFormat::Json`]) and a compact text form ([`RecordFormat::Text`]).
//! Readers pick one codec per file by probing the first parseable line
//! ([`RecordFormat::detect`]) and then decode every line with it.

mod jsonl;
mod text;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::TxRecord;

pub use jsonl::JsonLinesCodec;
pub use text::TextCodec;

/// Encodes and decodes a single record as a single line (no newline).
pub trait RecordCodec: Send + Sync {
    fn encode(&self, record: &TxRecord) -> Result<String, CoreError>;

    /// Decode one trimmed, non-empty line. `line_num` is 1-based and only
    /// used for error reporting.
    fn decode(&self, line: &str, line_num: usize) -> Result<TxRecord, CoreError>;
}

// ==============================================================================
// Record Format Selection
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordFormat {
    #[default]
    Json,
    Text,
}

impl RecordFormat {
    pub fn codec(self) -> &'static dyn RecordCodec {
        match self {
            Self::Json => &JsonLinesCodec,
            Self::Text => &TextCodec,
        }
    }

    /// Probe the content for its format: the first non-empty, non-comment
    /// line that decodes under either grammar decides. JSON is tried first.
    /// Returns `None` when no line matches either grammar.
    pub fn detect(content: &str) -> Option<Self> {
        content
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| significant_line(line).map(|l| (idx + 1, l)))
            .find_map(|(line_num, line)| {
                [Self::Json, Self::Text]
                    .into_iter()
                    .find(|format| format.codec().decode(line, line_num).is_ok())
            })
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl FromStr for RecordFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "jsonl" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            other => Err(CoreError::Config(format!(
                "unknown record format `{other}`; expected json or text"
            ))),
        }
    }
}

// ==============================================================================
// Reading Record Files
// ==============================================================================

/// Outcome of reading an intermediate file. Lines that failed to decode are
/// counted in `skipped`; they never abort the read.
#[derive(Debug, Default)]
pub struct ParsedRecords {
    pub format: Option<RecordFormat>,
    pub records: Vec<TxRecord>,
    pub skipped: usize,
}

/// Decode every significant line of `content` with the detected codec.
pub fn parse_records(content: &str) -> ParsedRecords {
    let Some(format) = RecordFormat::detect(content) else {
        let skipped = content
            .lines()
            .filter(|line| significant_line(line).is_some())
            .count();
        if skipped > 0 {
            tracing::warn!(lines = skipped, "no line matches a known record format");
        }
        return ParsedRecords {
            format: None,
            records: Vec::new(),
            skipped,
        };
    };
    tracing::debug!(%format, "detected record format");

    let codec = format.codec();
    let mut parsed = ParsedRecords {
        format: Some(format),
        ..Default::default()
    };
    for (idx, line) in content.lines().enumerate() {
        let Some(line) = significant_line(line) else {
            continue;
        };
        match codec.decode(line, idx + 1) {
            Ok(record) => parsed.records.push(record),
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed record");
                parsed.skipped += 1;
            }
        }
    }
    parsed
}

/// Read and decode an intermediate file. Only I/O failures are errors.
pub fn read_records(path: &Path) -> Result<ParsedRecords, CoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CoreError::Io(std::io::Error::new(
            e.kind(),
            format!("read record file {}: {e}", path.display()),
        ))
    })?;
    Ok(parse_records(&content))
}

fn significant_line(line: &str) -> Option<&str> {
    let line = line.trim();
    (!line.is_empty() && !line.starts_with('#')).then_some(line)
}

fn parse_error(line: usize, message: impl Into<String>) -> CoreError {
    CoreError::RecordParse {
        line,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{input, output, record};

    #[test]
    fn detect_prefers_json_and_falls_back_to_text() {
        let json = r#"{"txid":"aa","vin":[],"vout":[]}"#;
        assert_eq!(RecordFormat::detect(json), Some(RecordFormat::Json));

        let text = "txid:aa vin: vout:bc1qxyz:1.5";
        assert_eq!(RecordFormat::detect(text), Some(RecordFormat::Text));
    }

    #[test]
    fn detect_skips_comments_blank_and_unparseable_lines() {
        let content = "\n# header\ngarbage line\ntxid:aa vin: vout:\n";
        assert_eq!(RecordFormat::detect(content), Some(RecordFormat::Text));
        assert_eq!(RecordFormat::detect("nothing useful\n\n"), None);
    }

    #[test]
    fn parse_records_skips_malformed_lines() {
        let good = JsonLinesCodec
            .encode(&record("aa", vec![], vec![output("bc1qxyz", 150_000_000)]))
            .expect("encode");
        let content = format!("{good}\n{{\"txid\": broken\n{good}\n");

        let parsed = parse_records(&content);
        assert_eq!(parsed.format, Some(RecordFormat::Json));
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn detected_codec_applies_to_the_whole_file() {
        // A text line in a JSON file is malformed, not re-detected.
        let json = JsonLinesCodec
            .encode(&record("aa", vec![input("p", 0)], vec![]))
            .expect("encode");
        let content = format!("{json}\ntxid:bb vin: vout:\n");

        let parsed = parse_records(&content);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].txid, "aa");
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn empty_content_parses_to_nothing() {
        let parsed = parse_records("");
        assert_eq!(parsed.format, None);
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn format_from_str_accepts_known_names() {
        assert_eq!("json".parse::<RecordFormat>().unwrap(), RecordFormat::Json);
        assert_eq!("TEXT".parse::<RecordFormat>().unwrap(), RecordFormat::Text);
        assert!("xml".parse::<RecordFormat>().is_err());
    }
}
