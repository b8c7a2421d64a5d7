use std::path::Path;

use anyhow::{Context, bail};

/// Text encoding for source files, validated once at startup from the
/// configured label. The wire protocol itself is always UTF-8 JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

impl TextEncoding {
    /// Parse an encoding label from configuration. Unknown labels are a
    /// configuration error, caught before the server starts serving.
    pub fn from_label(label: &str) -> anyhow::Result<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            other => bail!("unsupported encoding '{other}' (expected utf-8 or latin-1)"),
        }
    }

    pub fn decode(&self, bytes: Vec<u8>) -> anyhow::Result<String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes).context("file is not valid UTF-8"),
            Self::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

/// Read a source file and split it into lines, stripping `\n` and `\r\n`
/// terminators. Terminators are framing, not data.
pub fn load_lines(path: &Path, encoding: TextEncoding) -> anyhow::Result<Vec<String>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let text = encoding.decode(bytes)?;
    Ok(text.lines().map(str::to_owned).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn utf8_labels_parse() {
        assert_eq!(TextEncoding::from_label("utf-8").unwrap(), TextEncoding::Utf8);
        assert_eq!(TextEncoding::from_label("UTF8").unwrap(), TextEncoding::Utf8);
        assert_eq!(
            TextEncoding::from_label(" iso-8859-1 ").unwrap(),
            TextEncoding::Latin1
        );
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = TextEncoding::from_label("utf-16").unwrap_err();
        assert!(err.to_string().contains("unsupported encoding"));
    }

    #[test]
    fn load_lines_strips_terminators() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "alpha\nbeta\r\ngamma\n").unwrap();

        let lines = load_lines(file.path(), TextEncoding::Utf8).unwrap();
        assert_eq!(lines, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn load_lines_empty_file_yields_empty_set() {
        let file = NamedTempFile::new().unwrap();
        let lines = load_lines(file.path(), TextEncoding::Utf8).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn load_lines_missing_file_is_an_error() {
        let result = load_lines(Path::new("/nonexistent/source.txt"), TextEncoding::Utf8);
        assert!(result.is_err());
    }

    #[test]
    fn latin1_bytes_decode_without_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[b'c', b'a', b'f', 0xE9, b'\n']).unwrap();

        let lines = load_lines(file.path(), TextEncoding::Latin1).unwrap();
        assert_eq!(lines, vec!["caf\u{e9}"]);
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xFE, b'\n']).unwrap();

        let result = load_lines(file.path(), TextEncoding::Utf8);
        assert!(result.is_err());
    }
}
