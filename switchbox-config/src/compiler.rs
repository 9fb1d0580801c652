use std::{fmt, ops::Range};

use switchbox_common::{
    layout::{self, LayoutReader},
    validate, ButtonConfig, ButtonKind, LayoutError, ReleaseBehaviour, UnitConfig,
    DEFAULT_DEBOUNCE_MS, DEFAULT_MOMENTARY_MS,
};

use crate::{layout_error_message, ConfigError};

type Result<T> = core::result::Result<T, ConfigError>;
type NameRange = Range<usize>;

const TOO_MANY_RHS: &str = "Only one value may be assigned";
const MISSING_RHS: &str = "Expected a value";
const EXPECTED_ASSIGN: &str = "Expected '='";
const EXPECTED_SECTION: &str = "expected '['";
const MISSING_BRACKET: &str = "missing ']'";
const UNKNOWN_SECTION: &str = "Unknown section; expected scan, defaults or buttons";
const UNKNOWN_PROPERTY: &str = "Unknown property";
const UNKNOWN_KIND: &str = "Unknown button kind; expected momentary or synthetic";
const UNKNOWN_OPTION: &str = "Unknown option";
const DUPLICATE_OPTION: &str = "Option already given";
const DUPLICATE_SECTION: &str = "Section already given";
const MISSING_SCAN_INDEX: &str = "Expected a scan index";
const INVALID_NUMBER: &str = "Invalid number";
const RELEASE_ONLY: &str = "Only allowed with release=<output>";
const INDEX_TOO_LARGE: &str = "Index too large for the layout size; the largest is 65534";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Scan,
    Defaults,
    Buttons,
}

/// A compiled layout, plus where in the source each unit came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    pub scan_len: u16,
    pub output_count: u16,
    pub debounce_ms: u16,
    pub momentary_ms: u16,
    pub units: Vec<UnitConfig>,
    spans: Vec<NameRange>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            scan_len: 0,
            output_count: 0,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            momentary_ms: DEFAULT_MOMENTARY_MS,
            units: Vec::new(),
            spans: Vec::new(),
        }
    }
}

impl LayoutConfig {
    pub fn serialize(&self) -> Vec<u16> {
        layout::serialize(self.scan_len, self.output_count, &self.units).collect()
    }

    /// Decode and validate a binary layout.
    pub fn deserialize(data: &[u16]) -> Result<Self> {
        let reader = LayoutReader::new(data.iter().copied())?;
        let header = *reader.header();
        let units = reader.collect::<core::result::Result<Vec<_>, _>>()?;
        validate(
            &units,
            header.scan_len as usize,
            header.output_count as usize,
        )?;
        Ok(Self {
            scan_len: header.scan_len,
            output_count: header.output_count,
            units,
            ..Default::default()
        })
    }

    /// The source line a unit was compiled from.
    pub fn unit_span(&self, unit: usize) -> Option<&NameRange> {
        self.spans.get(unit)
    }

    fn write_options(
        &self,
        f: &mut fmt::Formatter<'_>,
        config: &ButtonConfig,
        prefix: &str,
    ) -> fmt::Result {
        if config.debounce_ms != self.debounce_ms {
            write!(f, " {prefix}debounce={}", config.debounce_ms)?;
        }
        if config.momentary_ms != self.momentary_ms {
            write!(f, " {prefix}momentary={}", config.momentary_ms)?;
        }
        Ok(())
    }
}

/// Writes the layout back in source form.
impl fmt::Display for LayoutConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[scan]")?;
        writeln!(f, "length = {}", self.scan_len)?;
        writeln!(f, "outputs = {}", self.output_count)?;
        writeln!(f)?;
        writeln!(f, "[defaults]")?;
        writeln!(f, "debounce = {}", self.debounce_ms)?;
        writeln!(f, "momentary = {}", self.momentary_ms)?;
        writeln!(f)?;
        writeln!(f, "[buttons]")?;
        for unit in self.units.iter() {
            let primary = unit.primary();
            let kind = match primary.kind {
                ButtonKind::Momentary => "momentary",
                ButtonKind::SyntheticMomentary => "synthetic",
            };
            write!(f, "{} = {} {}", primary.output_index, kind, primary.scan_index)?;
            self.write_options(f, primary, "")?;
            if let Some(secondary) = unit.secondary() {
                if matches!(primary.release_behaviour, ReleaseBehaviour::SyntheticPress) {
                    write!(f, " release={}", secondary.output_index)?;
                    self.write_options(f, secondary, "release_")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct ButtonLine {
    span: NameRange,
    kind: ButtonKind,
    scan_index: u16,
    output_index: u16,
    debounce_ms: Option<u16>,
    momentary_ms: Option<u16>,
    release: Option<u16>,
    release_debounce_ms: Option<u16>,
    release_momentary_ms: Option<u16>,
}

struct Parser<'source> {
    source: &'source str,
    section: Section,
    seen: Vec<Section>,
    scan_len: Option<u16>,
    output_count: Option<u16>,
    debounce_ms: u16,
    momentary_ms: u16,
    buttons: Vec<ButtonLine>,
}

impl<'source> Parser<'source> {
    fn new(source: &'source str) -> Self {
        Self {
            source,
            section: Section::None,
            seen: Vec::new(),
            scan_len: None,
            output_count: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            momentary_ms: DEFAULT_MOMENTARY_MS,
            buttons: Vec::new(),
        }
    }

    fn parse_lines(&mut self) -> Result<()> {
        let source = self.source;
        for line in source.lines() {
            let line = match line.find('#') {
                Some(i) => &line[..i],
                None => line,
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                self.parse_section(line)?;
                continue;
            }

            let Some((lhs, rhs)) = line.split_once('=') else {
                return Err(self.error(EXPECTED_ASSIGN, line));
            };
            let (lhs, rhs) = (lhs.trim(), rhs.trim());
            match self.section {
                Section::None => return Err(self.error(EXPECTED_SECTION, line)),
                Section::Scan | Section::Defaults => self.parse_property(lhs, rhs)?,
                Section::Buttons => self.parse_button(line, lhs, rhs)?,
            }
        }
        Ok(())
    }

    fn parse_section(&mut self, line: &'source str) -> Result<()> {
        let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) else {
            return Err(self.error(MISSING_BRACKET, line));
        };
        let section = match name.trim() {
            "scan" => Section::Scan,
            "defaults" => Section::Defaults,
            "buttons" => Section::Buttons,
            _ => return Err(self.error(UNKNOWN_SECTION, line)),
        };
        if self.seen.contains(&section) {
            return Err(self.error(DUPLICATE_SECTION, line));
        }
        self.seen.push(section);
        self.section = section;
        Ok(())
    }

    fn parse_property(&mut self, name: &'source str, value: &'source str) -> Result<()> {
        let mut words = value.split_whitespace();
        let Some(word) = words.next() else {
            return Err(self.error(MISSING_RHS, name));
        };
        if let Some(extra) = words.next() {
            return Err(self.error(TOO_MANY_RHS, extra));
        }
        let n = self.number(word)?;
        match (self.section, name) {
            (Section::Scan, "length") => self.scan_len = Some(n),
            (Section::Scan, "outputs") => self.output_count = Some(n),
            (Section::Defaults, "debounce") => self.debounce_ms = n,
            (Section::Defaults, "momentary") => self.momentary_ms = n,
            _ => return Err(self.error(UNKNOWN_PROPERTY, name)),
        }
        Ok(())
    }

    fn parse_button(
        &mut self,
        line: &'source str,
        output: &'source str,
        value: &'source str,
    ) -> Result<()> {
        let mut words = value.split_whitespace();
        let mut button = ButtonLine {
            span: self.span(line),
            output_index: self.number(output)?,
            ..Default::default()
        };

        let Some(kind) = words.next() else {
            return Err(self.error(MISSING_RHS, line));
        };
        button.kind = match kind {
            "momentary" => ButtonKind::Momentary,
            "synthetic" => ButtonKind::SyntheticMomentary,
            _ => return Err(self.error(UNKNOWN_KIND, kind)),
        };

        let Some(scan) = words.next() else {
            return Err(self.error(MISSING_SCAN_INDEX, line));
        };
        button.scan_index = self.number(scan)?;

        let mut release_only = None;
        for word in words {
            let Some((name, n)) = word.split_once('=') else {
                return Err(self.error(UNKNOWN_OPTION, word));
            };
            let n = self.number(n)?;
            let slot = match name {
                "debounce" => &mut button.debounce_ms,
                "momentary" => &mut button.momentary_ms,
                "release" => &mut button.release,
                "release_debounce" => &mut button.release_debounce_ms,
                "release_momentary" => &mut button.release_momentary_ms,
                _ => return Err(self.error(UNKNOWN_OPTION, name)),
            };
            if slot.replace(n).is_some() {
                return Err(self.error(DUPLICATE_OPTION, word));
            }
            if name.starts_with("release_") {
                release_only.get_or_insert(word);
            }
        }
        if let (None, Some(word)) = (button.release, release_only) {
            return Err(self.error(RELEASE_ONLY, word));
        }

        self.buttons.push(button);
        Ok(())
    }

    fn build_config(self) -> Result<LayoutConfig> {
        let mut config = LayoutConfig {
            debounce_ms: self.debounce_ms,
            momentary_ms: self.momentary_ms,
            ..Default::default()
        };

        for line in self.buttons.iter() {
            let primary = ButtonConfig::new(line.kind, line.scan_index, line.output_index)
                .with_debounce(line.debounce_ms.unwrap_or(self.debounce_ms))
                .with_momentary(line.momentary_ms.unwrap_or(self.momentary_ms));
            let unit = match line.release {
                Some(output_index) => UnitConfig::Compound {
                    primary: primary.with_release(ReleaseBehaviour::SyntheticPress),
                    secondary: ButtonConfig::secondary(output_index)
                        .with_debounce(line.release_debounce_ms.unwrap_or(self.debounce_ms))
                        .with_momentary(line.release_momentary_ms.unwrap_or(self.momentary_ms)),
                },
                None => UnitConfig::Primary(primary),
            };
            config.units.push(unit);
            config.spans.push(line.span.clone());
        }

        config.scan_len = match self.scan_len {
            Some(n) => n,
            None => self.size_from(self.buttons.iter().map(|b| (b, b.scan_index)))?,
        };
        config.output_count = match self.output_count {
            Some(n) => n,
            None => self.size_from(self.buttons.iter().flat_map(|b| {
                core::iter::once((b, b.output_index)).chain(b.release.map(|r| (b, r)))
            }))?,
        };

        validate(
            &config.units,
            config.scan_len as usize,
            config.output_count as usize,
        )
        .map_err(|err| unit_error(&config, err))?;

        Ok(config)
    }

    /// One past the largest index used.
    fn size_from<'b>(
        &self,
        indexes: impl Iterator<Item = (&'b ButtonLine, u16)>,
    ) -> Result<u16> {
        let mut size = 0;
        for (line, index) in indexes {
            let Some(n) = index.checked_add(1) else {
                return Err(ConfigError::new(INDEX_TOO_LARGE.into(), line.span.clone()));
            };
            size = size.max(n);
        }
        Ok(size)
    }

    fn number(&self, word: &'source str) -> Result<u16> {
        let n = match word.strip_prefix("0x") {
            Some(hex) => u16::from_str_radix(hex, 16),
            None => word.parse(),
        };
        n.map_err(|_| self.error(INVALID_NUMBER, word))
    }

    fn span(&self, part: &str) -> NameRange {
        let start = part.as_ptr() as usize - self.source.as_ptr() as usize;
        start..start + part.len()
    }

    fn error(&self, message: impl Into<String>, part: &str) -> ConfigError {
        ConfigError::new(message.into(), self.span(part))
    }
}

fn unit_error(config: &LayoutConfig, err: LayoutError) -> ConfigError {
    let unit = match err {
        LayoutError::ScanIndexOutOfRange { unit, .. }
        | LayoutError::OutputIndexOutOfRange { unit, .. }
        | LayoutError::DuplicateOutput { unit, .. }
        | LayoutError::MissingSecondary { unit }
        | LayoutError::UnexpectedSecondary { unit } => Some(unit),
        _ => None,
    };
    ConfigError {
        message: layout_error_message(&err),
        span: unit.and_then(|u| config.unit_span(u)).cloned(),
    }
}

/// Compile the text form of a layout.
///
/// ```text
/// [scan]
/// length = 40
/// outputs = 29
///
/// [defaults]
/// debounce = 50
/// momentary = 50
///
/// [buttons]
/// # <output> = <momentary|synthetic> <scan index> [options]
/// 0 = momentary 22
/// 8 = synthetic 6 debounce=20 release=28 release_momentary=30
/// ```
pub fn compile(source: &str) -> Result<LayoutConfig> {
    let mut parser = Parser::new(source);
    parser.parse_lines()?;
    parser.build_config()
}

#[cfg(test)]
#[path = "compiler_test.rs"]
mod test;
