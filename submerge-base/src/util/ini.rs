//! INI parser: `[section] key = value ; comment` syntax,
//! preserving comment and blank lines by original line number so a
//! write-back reproduces the source file's layout.

use std::collections::BTreeMap;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IniEntry {
    Section(String),
    KeyValue { key: String, value: String, comment: Option<String> },
    Comment(String),
    Blank,
}

/// A parsed INI file: the ordered line list (for write-back) plus a
/// `section -> key -> value` index for lookups.
#[derive(Debug, Clone, Default)]
pub struct IniDocument {
    lines: Vec<IniEntry>,
    index: BTreeMap<String, BTreeMap<String, String>>,
}

impl IniDocument {
    pub fn parse(text: &str) -> Result<Self> {
        let mut doc = IniDocument::default();
        let mut section = String::new();
        for raw_line in text.lines() {
            let trimmed = raw_line.trim();
            if trimmed.is_empty() {
                doc.lines.push(IniEntry::Blank);
                continue;
            }
            if trimmed.starts_with(';') || trimmed.starts_with('#') {
                doc.lines.push(IniEntry::Comment(trimmed.to_string()));
                continue;
            }
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                section = trimmed[1..trimmed.len() - 1].trim().to_string();
                doc.index.entry(section.clone()).or_default();
                doc.lines.push(IniEntry::Section(section.clone()));
                continue;
            }
            let (body, comment) = match trimmed.find(';') {
                Some(idx) => (trimmed[..idx].trim(), Some(trimmed[idx + 1..].trim().to_string())),
                None => (trimmed, None),
            };
            let Some(eq) = body.find('=') else {
                return Err(crate::error::data_format(format!(
                    "ini: expected 'key = value' on line: {raw_line}"
                )));
            };
            let key = body[..eq].trim().to_string();
            let value = body[eq + 1..].trim().to_string();
            doc.index
                .entry(section.clone())
                .or_default()
                .insert(key.clone(), value.clone());
            doc.lines.push(IniEntry::KeyValue { key, value, comment });
        }
        Ok(doc)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.index.get(section)?.get(key).map(String::as_str)
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Reproduces the original text, including comment/blank lines, in their
    /// original order.
    pub fn write_back(&self) -> String {
        let mut out = String::new();
        for entry in &self.lines {
            match entry {
                IniEntry::Section(name) => {
                    out.push('[');
                    out.push_str(name);
                    out.push_str("]\n");
                }
                IniEntry::KeyValue { key, value, comment } => {
                    out.push_str(key);
                    out.push_str(" = ");
                    out.push_str(value);
                    if let Some(c) = comment {
                        out.push_str(" ; ");
                        out.push_str(c);
                    }
                    out.push('\n');
                }
                IniEntry::Comment(text) => {
                    out.push_str(text);
                    out.push('\n');
                }
                IniEntry::Blank => out.push('\n'),
            }
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    const SAMPLE: &str = "; top comment\n[server]\nhost = localhost ; default\nport = 8080\n\n[client]\ntimeout = 30\n";

    #[test]
    fn test_parse_and_lookup() {
        let doc = IniDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.get("server", "host"), Some("localhost"));
        assert_eq!(doc.get("server", "port"), Some("8080"));
        assert_eq!(doc.get("client", "timeout"), Some("30"));
        assert_eq!(doc.get("client", "missing"), None);
    }

    #[test]
    fn test_write_back_preserves_layout() {
        let doc = IniDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.write_back(), SAMPLE);
    }

    #[test]
    fn test_missing_equals_is_data_format_error() {
        assert!(IniDocument::parse("[a]\nbroken line\n").is_err());
    }
}
