//! Minimal BibTeX reading.
//!
//! Only what the collector and the renderers need: the `@type{key,` header,
//! splitting a `.bib` file into records, and reading field values.

use crate::core::DueError;
use regex::Regex;

const HEADER_PATTERN: &str = r"^\s*@(?P<type>[^\s{]*)\s*\{\s*(?P<key>[^\s,]*)\s*,";

/// Record types that carry no bibliographic entry.
const NON_ENTRY_TYPES: &[&str] = &["comment", "preamble", "string"];

/// Parse the `@type{key,` header of a record into `(type, key)`.
///
/// The type is lowercased; the key is returned as written.
pub fn parse_header(raw: &str) -> Result<(String, String), DueError> {
    let re = Regex::new(HEADER_PATTERN).map_err(|e| DueError::Other {
        message: e.to_string(),
    })?;

    let captures = re.captures(raw).ok_or_else(|| DueError::BibtexParse {
        excerpt: raw.trim().lines().next().unwrap_or_default().to_string(),
    })?;

    Ok((captures["type"].to_lowercase(), captures["key"].to_string()))
}

/// Split the contents of a `.bib` file into individual records.
///
/// A record starts with `@type{` or `@type(` at the beginning of a line.
/// Any other text, including stray `@` signs in comments, is ignored, as are
/// `@comment`, `@preamble` and `@string` blocks.
pub fn split_entries(content: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut offset = 0;

    while offset < content.len() {
        let line_end = content[offset..].find('\n').map_or(content.len(), |i| offset + i + 1);
        let line = &content[offset..line_end];
        let Some((entry_type, open)) = record_start(line) else {
            offset = line_end;
            continue;
        };

        let start = offset + line.len() - line.trim_start().len();
        let candidate = &content[start..];
        let open = open - (start - offset);
        let Some(close) = matching_close(candidate, open) else {
            // Unterminated record: keep what we have so the caller reports it
            records.push(candidate.trim().to_string());
            break;
        };

        if !NON_ENTRY_TYPES.contains(&entry_type.as_str()) {
            records.push(candidate[..=close].trim().to_string());
        }
        offset = start + close + 1;
    }

    records
}

/// The lowercased type and the byte offset of the opening delimiter, when
/// `line` starts a record.
fn record_start(line: &str) -> Option<(String, usize)> {
    let indent = line.len() - line.trim_start().len();
    let rest = line[indent..].strip_prefix('@')?;
    let type_len = rest.find(|c: char| !c.is_ascii_alphanumeric() && c != '_' && c != '-')?;
    let after_type = rest[type_len..].trim_start();
    if type_len == 0 || !after_type.starts_with(['{', '(']) {
        return None;
    }
    let open = line.len() - after_type.len();
    Some((rest[..type_len].to_lowercase(), open))
}

fn matching_close(text: &str, open: usize) -> Option<usize> {
    let (opener, closer) = if text[open..].starts_with('(') {
        ('(', ')')
    } else {
        ('{', '}')
    };
    let mut depth = 0usize;

    for (offset, ch) in text[open..].char_indices() {
        if ch == opener {
            depth += 1;
        } else if ch == closer {
            depth -= 1;
            if depth == 0 {
                return Some(open + offset);
            }
        }
    }
    None
}

/// Read the fields of a record as `(lowercased name, value)` pairs.
///
/// Braced, quoted and bare values are supported; outer delimiters are
/// stripped and inner braces removed.
pub fn fields(raw: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let Some(comma) = raw.find(',') else {
        return out;
    };
    let body: Vec<char> = raw[comma + 1..].chars().collect();
    let mut i = 0;

    loop {
        while i < body.len() && (body[i].is_whitespace() || body[i] == ',') {
            i += 1;
        }
        let start = i;
        while i < body.len() && (body[i].is_alphanumeric() || "_-:.".contains(body[i])) {
            i += 1;
        }
        if start == i {
            break;
        }
        let name: String = body[start..i].iter().collect::<String>().to_lowercase();

        while i < body.len() && body[i].is_whitespace() {
            i += 1;
        }
        if i >= body.len() || body[i] != '=' {
            break;
        }
        i += 1;
        while i < body.len() && body[i].is_whitespace() {
            i += 1;
        }
        if i >= body.len() {
            break;
        }

        let value = match body[i] {
            '{' => {
                let mut depth = 0usize;
                let begin = i + 1;
                while i < body.len() {
                    match body[i] {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                let value: String = body[begin..i.min(body.len())].iter().collect();
                i += 1;
                value
            }
            '"' => {
                let begin = i + 1;
                i += 1;
                while i < body.len() && body[i] != '"' {
                    i += 1;
                }
                let value: String = body[begin..i.min(body.len())].iter().collect();
                i += 1;
                value
            }
            _ => {
                let begin = i;
                while i < body.len() && body[i] != ',' && body[i] != '}' && body[i] != '\n' {
                    i += 1;
                }
                body[begin..i].iter().collect::<String>().trim().to_string()
            }
        };

        out.push((name, clean_value(&value)));
    }

    out
}

/// Look up a single field by (case-insensitive) name.
pub fn field(raw: &str, name: &str) -> Option<String> {
    let name = name.to_lowercase();
    fields(raw).into_iter().find(|(n, _)| *n == name).map(|(_, v)| v)
}

fn clean_value(value: &str) -> String {
    value.replace(['{', '}'], "").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalise records produced by DOI resolvers and data repositories.
///
/// `@data` records become `@misc` with `;`-separated author lists turned into
/// `and`-separated ones, en-dashes become `--`, and page fields lose a leading
/// letter (`S123` becomes `123`).
pub fn condition_bibtex(raw: &str) -> String {
    let mut bibtex = raw.to_string();
    if bibtex.starts_with("@data") {
        bibtex = bibtex.replacen("@data", "@misc", 1);
        bibtex = bibtex.replace(';', " and");
    }
    bibtex = bibtex.replace('\u{2013}', "--");

    if let Ok(re) = Regex::new(r#"(pages\s*=\s*["{])[a-zA-Z]"#) {
        bibtex = re.replace_all(&bibtex, "$1").into_owned();
    }
    bibtex
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"@article{Smith2020,
    author = {Smith, John and Doe, Jane},
    title = {A {Study} of Things},
    journal = "Journal of Stuff",
    year = 2020,
    pages = {S12--20}
}"#;

    #[test]
    fn test_parse_header() {
        let (entry_type, key) = parse_header(ARTICLE).unwrap();
        assert_eq!(entry_type, "article");
        assert_eq!(key, "Smith2020");
    }

    #[test]
    fn test_parse_header_with_spaces() {
        let (entry_type, key) = parse_header("  @Book { knuth84 ,\n title={TeX}}").unwrap();
        assert_eq!(entry_type, "book");
        assert_eq!(key, "knuth84");
    }

    #[test]
    fn test_parse_header_rejects_garbage() {
        let err = parse_header("article Smith2020 title").unwrap_err();
        assert!(matches!(err, DueError::BibtexParse { .. }));
    }

    #[test]
    fn test_fields() {
        let fields = fields(ARTICLE);
        assert_eq!(fields[0], ("author".to_string(), "Smith, John and Doe, Jane".to_string()));
        assert_eq!(fields[1], ("title".to_string(), "A Study of Things".to_string()));
        assert_eq!(fields[2], ("journal".to_string(), "Journal of Stuff".to_string()));
        assert_eq!(fields[3], ("year".to_string(), "2020".to_string()));
        assert_eq!(field(ARTICLE, "PAGES"), Some("S12--20".to_string()));
    }

    #[test]
    fn test_split_entries_skips_comments() {
        let content = format!(
            "% leading text\n@comment{{ignore me}}\n{ARTICLE}\n\n@string{{jos = \"J\"}}\n@misc{{other,\n title={{Other}}\n}}\n"
        );
        let records = split_entries(&content);
        assert_eq!(records.len(), 2);
        assert!(records[0].starts_with("@article{Smith2020"));
        assert!(records[1].starts_with("@misc{other"));
    }

    #[test]
    fn test_split_entries_ignores_stray_at_signs() {
        let content = format!(
            "% maintained by someone@example.org\n{ARTICLE}\n  see also: foo @ bar {{x}}\n\n  @misc (other,\n title={{Other}}\n)\n"
        );
        let records = split_entries(&content);
        assert_eq!(records.len(), 2);
        assert!(records[0].starts_with("@article{Smith2020"));
        assert_eq!(records[1], "@misc (other,\n title={Other}\n)");
    }

    #[test]
    fn test_split_entries_keeps_unterminated_record() {
        let records = split_entries("@article{open,\n title={Never closed}\n");
        assert_eq!(records, vec!["@article{open,\n title={Never closed}".to_string()]);
    }

    #[test]
    fn test_condition_bibtex() {
        let conditioned = condition_bibtex("@data{zenodo,\n author = {A; B},\n pages = {S1\u{2013}5}\n}");
        assert!(conditioned.starts_with("@misc{zenodo"));
        assert!(conditioned.contains("A and B"));
        assert!(conditioned.contains("pages = {1--5}"));
    }
}
