use std::fmt::Write;
use std::{ops::Range, path::Path};

use switchbox_common::LayoutError;

pub mod compiler;

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
    pub span: Option<Range<usize>>,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.span {
            Some(span) => write!(f, "{}\n    at: ({:?})", &self.message, span),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self {
            message: err.to_string(),
            span: None,
        }
    }
}

impl From<&str> for ConfigError {
    fn from(err: &str) -> Self {
        Self {
            message: err.to_string(),
            span: None,
        }
    }
}

impl From<LayoutError> for ConfigError {
    fn from(err: LayoutError) -> Self {
        Self {
            message: layout_error_message(&err),
            span: None,
        }
    }
}

impl ConfigError {
    pub fn new(message: String, span: Range<usize>) -> Self {
        Self {
            message,
            span: Some(span),
        }
    }

    fn char_span(&self, source: &str) -> Option<Range<usize>> {
        self.span.clone().map(|b: Range<usize>| {
            let mut s = usize::MAX;
            let mut j = 0;
            for (i, c) in source.chars().enumerate() {
                if j >= b.start {
                    if s == usize::MAX {
                        s = i;
                    }
                    if j >= b.end {
                        return Some(s..i);
                    }
                }
                j += c.len_utf8();
            }
            if s == usize::MAX {
                s = source.chars().count();
            }
            Some(s..source.chars().count())
        })?
    }

    /// 1-based line and column of the start of the span.
    pub fn line_col(&self, source: &str) -> Option<(usize, usize)> {
        let start = self.span.as_ref()?.start.min(source.len());
        let before = source.get(..start)?;
        let line = before.matches('\n').count() + 1;
        let col = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        Some((line, col))
    }
}

pub fn layout_error_message(err: &LayoutError) -> String {
    match err {
        LayoutError::VersionMismatch => "Layout was written by an incompatible version".into(),
        LayoutError::Corrupt => "Layout data is truncated or corrupt".into(),
        LayoutError::SizeMismatch => "Layout does not match the scan length or output count".into(),
        LayoutError::TooManyUnits => "Too many buttons".into(),
        LayoutError::ScanIndexOutOfRange { scan_index, .. } => {
            format!("Scan index {scan_index} is past the end of the scan")
        }
        LayoutError::OutputIndexOutOfRange { output_index, .. } => {
            format!("Output {output_index} is past the last output")
        }
        LayoutError::DuplicateOutput { output_index, .. } => {
            format!("Output {output_index} is already assigned")
        }
        LayoutError::MissingSecondary { .. } => "Release press needs a release output".into(),
        LayoutError::UnexpectedSecondary { .. } => {
            "A release output can not have a release output of its own".into()
        }
    }
}

pub fn pretty_compile(file: &Path, src: &str) -> Result<compiler::LayoutConfig, ConfigError> {
    match compiler::compile(src) {
        Ok(config) => Ok(config),
        Err(err) => {
            use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
            let filename = file.to_str().unwrap_or("<unknown>");
            let mut colors = ColorGenerator::new();

            let a = colors.next();
            if let Some(span) = err.char_span(src) {
                let _ = Report::build(ReportKind::Error, (filename, span.clone()))
                    .with_message("Invalid layout".to_string())
                    .with_label(
                        Label::new((filename, span))
                            .with_message(&err.message)
                            .with_color(a),
                    )
                    .finish()
                    .eprint((filename, Source::from(src)));
            }
            Err(err)
        }
    }
}

pub fn text_to_binary(source: &str) -> Result<Vec<u16>, ConfigError> {
    let file = Path::new("<unknown>");
    let config = pretty_compile(file, source)?;
    Ok(config.serialize())
}

/// Little endian bytes, as stored on the device.
pub fn words_to_bytes(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

pub fn bytes_to_words(bytes: &[u8]) -> Result<Vec<u16>, ConfigError> {
    if bytes.len() % 2 != 0 {
        return Err("Layout has an odd number of bytes".into());
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|b| b[0] as u16 | ((b[1] as u16) << 8))
        .collect())
}

/// Render a binary layout as a Rust constant that can be compiled into firmware.
pub fn words_to_rust(name: &str, words: &[u16]) -> String {
    let mut out = format!("pub const {}: [u16; {}] = [", name, words.len());
    for (i, w) in words.iter().enumerate() {
        if i % 10 == 0 {
            out.push_str("\n   ");
        }
        let _ = write!(out, " {w},");
    }
    out.push_str("\n];\n");
    out
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod test;
