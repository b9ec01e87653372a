use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{de::Error as DeError, Deserialize, Deserializer};

use crate::error_codes::CodedError;

/// Closed range of consecutive characters to include in a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterRegion {
    start: char,
    end: char,
}

/// Printable ASCII, used when no regions are configured.
pub const DEFAULT_CHARACTER_REGION: CharacterRegion = CharacterRegion {
    start: ' ',
    end: '~',
};

impl CharacterRegion {
    pub fn new(start: char, end: char) -> Result<Self, CodedError> {
        if start > end {
            return Err(CodedError::format(format!(
                "character region start U+{:04X} is after end U+{:04X}",
                start as u32, end as u32
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> char {
        self.start
    }

    pub fn end(&self) -> char {
        self.end
    }

    pub fn characters(&self) -> impl Iterator<Item = char> {
        self.start..=self.end
    }
}

impl fmt::Display for CharacterRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}-0x{:X}", self.start as u32, self.end as u32)
    }
}

/// Accepts `A`, `A-Z`, `32-127` and `0x20-0x7F`; each side of a range is
/// parsed independently.
impl FromStr for CharacterRegion {
    type Err = CodedError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        if source.is_empty() {
            return Err(CodedError::format("empty character region"));
        }

        let parts = source
            .split('-')
            .map(|part| parse_character(part, source))
            .collect::<Result<Vec<_>, _>>()?;

        match parts.as_slice() {
            [single] => Self::new(*single, *single),
            [start, end] => Self::new(*start, *end),
            _ => Err(invalid_region(source)),
        }
    }
}

impl<'de> Deserialize<'de> for CharacterRegion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let source = String::deserialize(deserializer)?;
        source.parse().map_err(DeError::custom)
    }
}

fn parse_character(part: &str, source: &str) -> Result<char, CodedError> {
    let mut chars = part.chars();
    if let (Some(single), None) = (chars.next(), chars.next()) {
        return Ok(single);
    }

    let value = match part
        .strip_prefix("0x")
        .or_else(|| part.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => part.parse::<u32>(),
    }
    .map_err(|_| invalid_region(source))?;

    char::from_u32(value).ok_or_else(|| {
        CodedError::format(format!(
            "character region '{}' names U+{:04X}, which is not a valid character",
            source, value
        ))
    })
}

fn invalid_region(source: &str) -> CodedError {
    CodedError::format(format!(
        "invalid character region '{}'; expected A, A-Z, 32-127 or 0x20-0x7F",
        source
    ))
}

/// Distinct characters of all regions in first-seen order. An empty list
/// yields [`DEFAULT_CHARACTER_REGION`].
pub fn flatten(regions: &[CharacterRegion]) -> Vec<char> {
    if regions.is_empty() {
        return DEFAULT_CHARACTER_REGION.characters().collect();
    }

    let mut seen = HashSet::new();
    regions
        .iter()
        .flat_map(CharacterRegion::characters)
        .filter(|character| seen.insert(*character))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_codes::FORMAT_ERROR;

    fn region(source: &str) -> CharacterRegion {
        source.parse().expect("region should parse")
    }

    #[test]
    fn parses_every_supported_shape() {
        assert_eq!(region("A"), CharacterRegion::new('A', 'A').unwrap());
        assert_eq!(region("A-Z"), CharacterRegion::new('A', 'Z').unwrap());
        assert_eq!(region("32-127"), CharacterRegion::new(' ', '\u{7F}').unwrap());
        assert_eq!(region("0x20-0x7F"), CharacterRegion::new(' ', '\u{7F}').unwrap());
        assert_eq!(region("0x123"), CharacterRegion::new('\u{123}', '\u{123}').unwrap());
        assert_eq!(region("a-0x7A"), CharacterRegion::new('a', 'z').unwrap());
    }

    #[test]
    fn rejects_malformed_regions() {
        for source in ["", "A-B-C", "AB", "0xZZ", "-", "12-", "0xD800"] {
            let error = source.parse::<CharacterRegion>().unwrap_err();
            assert_eq!(error.code, FORMAT_ERROR, "'{source}' should be a format error");
        }
    }

    #[test]
    fn rejects_reversed_range() {
        let error = "Z-A".parse::<CharacterRegion>().unwrap_err();
        assert!(error.message.contains("after end"));
    }

    #[test]
    fn flatten_keeps_first_seen_order_without_duplicates() {
        let regions = [region("A-C"), region("B-D")];
        assert_eq!(flatten(&regions), vec!['A', 'B', 'C', 'D']);

        let regions = [region("x-z"), region("a-b"), region("y")];
        assert_eq!(flatten(&regions), vec!['x', 'y', 'z', 'a', 'b']);
    }

    #[test]
    fn flatten_of_nothing_is_printable_ascii() {
        let characters = flatten(&[]);
        assert_eq!(characters.len(), 95);
        assert_eq!(characters.first(), Some(&' '));
        assert_eq!(characters.last(), Some(&'~'));
    }

    #[test]
    fn deserializes_from_yaml_strings() {
        let regions: Vec<CharacterRegion> =
            serde_yaml::from_str("- 'A-Z'\n- '0x20'\n").expect("yaml should parse");
        assert_eq!(regions, vec![region("A-Z"), region(" ")]);
    }
}
