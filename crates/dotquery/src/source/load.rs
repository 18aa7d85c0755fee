//! Document loading from JSON and JSONL files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{DotQueryError, Result};

use super::{SourceWarning, SourceWarningKind};

/// How documents are framed inside a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// `.jsonl`: one JSON value per non-blank line.
    Lines,
    /// Anything else: a single document, or an array of documents.
    Document,
}

impl Framing {
    pub fn of(path: &Path) -> Self {
        let is_jsonl = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("jsonl"));
        if is_jsonl {
            Self::Lines
        } else {
            Self::Document
        }
    }
}

/// Documents of one file, produced on demand.
///
/// JSONL files are read line by line and keep their handle open until the
/// stream is exhausted or dropped. A bad line yields a warning and reading
/// continues with the next line.
pub struct DocumentStream {
    path: PathBuf,
    state: StreamState,
}

enum StreamState {
    Lines {
        reader: BufReader<File>,
        buffer: Vec<u8>,
        line: usize,
    },
    Batch(std::vec::IntoIter<Value>),
    Done,
}

/// Opens `path` and prepares its documents.
///
/// Fails when the file cannot be opened, or when a non-JSONL file is not valid
/// JSON as a whole.
pub fn load_documents(path: &Path) -> Result<DocumentStream> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let state = match Framing::of(path) {
        Framing::Lines => StreamState::Lines {
            reader,
            buffer: Vec::new(),
            line: 0,
        },
        Framing::Document => {
            let data: Value =
                serde_json::from_reader(reader).map_err(|error| DotQueryError::DocumentDecode {
                    path: path.to_path_buf(),
                    message: error.to_string(),
                })?;
            let documents = match data {
                Value::Array(items) => items,
                single => vec![single],
            };
            StreamState::Batch(documents.into_iter())
        }
    };

    log::debug!("opened {} as {:?}", path.display(), Framing::of(path));
    Ok(DocumentStream {
        path: path.to_path_buf(),
        state,
    })
}

impl DocumentStream {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn warning(&self, kind: SourceWarningKind) -> SourceWarning {
        SourceWarning::for_path(&self.path, kind)
    }
}

impl Iterator for DocumentStream {
    type Item = std::result::Result<Value, SourceWarning>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.state {
            StreamState::Batch(documents) => documents.next().map(Ok),
            StreamState::Lines {
                reader,
                buffer,
                line,
            } => loop {
                *line += 1;
                let number = *line;
                buffer.clear();
                match reader.read_until(b'\n', buffer) {
                    Ok(0) => {
                        self.state = StreamState::Done;
                        return None;
                    }
                    Err(error) => {
                        // A read error leaves the rest of the file unusable.
                        self.state = StreamState::Done;
                        return Some(Err(
                            self.warning(SourceWarningKind::Unreadable(error.to_string()))
                        ));
                    }
                    Ok(_) if buffer.iter().all(u8::is_ascii_whitespace) => continue,
                    // Decoded from bytes so that invalid UTF-8 only spoils its own line.
                    Ok(_) => {
                        let decoded = serde_json::from_slice(buffer);
                        return Some(decoded.map_err(|error| {
                            self.warning(SourceWarningKind::InvalidDocument {
                                line: number,
                                message: error.to_string(),
                            })
                        }));
                    }
                }
            },
            StreamState::Done => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("write file");
        path
    }

    #[test]
    fn framing_follows_extension() {
        assert_eq!(Framing::of(Path::new("a.jsonl")), Framing::Lines);
        assert_eq!(Framing::of(Path::new("a.JSONL")), Framing::Lines);
        assert_eq!(Framing::of(Path::new("a.json")), Framing::Document);
        assert_eq!(Framing::of(Path::new("a")), Framing::Document);
    }

    #[test]
    fn json_array_yields_each_element() {
        let dir = tempdir().expect("tempdir");
        let path = write(dir.path(), "docs.json", r#"[{"a": 1}, {"a": 2}]"#);
        let docs = load_documents(&path)
            .expect("load")
            .collect::<std::result::Result<Vec<_>, _>>()
            .expect("documents");
        assert_eq!(docs, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn json_object_is_a_single_document() {
        let dir = tempdir().expect("tempdir");
        let path = write(dir.path(), "doc.json", "{\"a\": {\"b\": 1}}\n");
        let docs = load_documents(&path).expect("load").collect::<Vec<_>>();
        assert_eq!(docs, vec![Ok(json!({"a": {"b": 1}}))]);
    }

    #[test]
    fn jsonl_skips_blank_lines_and_reports_bad_ones() {
        let dir = tempdir().expect("tempdir");
        let path = write(
            dir.path(),
            "docs.jsonl",
            "{\"a\": 1}\n\n   \n{broken\n{\"a\": 3}\n",
        );
        let items = load_documents(&path).expect("load").collect::<Vec<_>>();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0], Ok(json!({"a": 1})));
        match &items[1] {
            Err(SourceWarning {
                kind: SourceWarningKind::InvalidDocument { line, .. },
                ..
            }) => assert_eq!(*line, 4),
            other => panic!("expected invalid document warning, got {other:?}"),
        }
        assert_eq!(items[2], Ok(json!({"a": 3})));
    }

    #[test]
    fn invalid_utf8_line_only_skips_that_line() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("mixed.jsonl");
        let mut contents = b"{\"n\": 1}\n{\"n\": \"".to_vec();
        contents.extend_from_slice(&[0xff, 0xfe]);
        contents.extend_from_slice(b"\"}\r\n{\"n\": 3}");
        std::fs::write(&path, contents).expect("write file");

        let items = load_documents(&path).expect("load").collect::<Vec<_>>();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], Ok(json!({"n": 1})));
        assert!(matches!(
            &items[1],
            Err(SourceWarning {
                kind: SourceWarningKind::InvalidDocument { line: 2, .. },
                ..
            })
        ));
        assert_eq!(items[2], Ok(json!({"n": 3})));
    }

    #[test]
    fn invalid_json_file_fails_to_load() {
        let dir = tempdir().expect("tempdir");
        let path = write(dir.path(), "bad.json", "{\"a\": ");
        match load_documents(&path) {
            Err(DotQueryError::DocumentDecode { path: failed, .. }) => assert_eq!(failed, path),
            Err(other) => panic!("expected decode error, got {other:?}"),
            Ok(_) => panic!("expected decode error"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().expect("tempdir");
        match load_documents(&dir.path().join("absent.jsonl")) {
            Err(DotQueryError::Io(_)) => {}
            Err(other) => panic!("expected io error, got {other:?}"),
            Ok(_) => panic!("expected io error"),
        }
    }
}
