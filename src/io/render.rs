//! Plain-text rendering of references.
//!
//! BibTeX records are rendered as bibliography lines in one of a small set
//! of author-date styles. Records are normalised with
//! [`condition_bibtex`] first and TeX escapes are stripped. DOI entries are
//! rendered from their cached BibTeX record when one exists.

use crate::entries::bibtex::{condition_bibtex, fields, parse_header};
use crate::entries::{Entry, EntryKind};
use crate::io::doi::DoiCache;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{error, warn};

/// Bibliography styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    /// `Hunter, J.D., 2007. Title. Journal, 9(3), pp.90–95.`
    #[default]
    Harvard1,
    /// `Hunter, J. D. (2007). Title. Journal, 9(3), 90–95.`
    Apa,
}

impl Style {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "harvard1" | "harvard" => Some(Self::Harvard1),
            "apa" => Some(Self::Apa),
            _ => None,
        }
    }

    /// The named style, or harvard1 with a warning.
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            warn!("Unknown bibliography style '{}', falling back to harvard1", name);
            Self::Harvard1
        })
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Harvard1 => f.write_str("harvard1"),
            Self::Apa => f.write_str("apa"),
        }
    }
}

/// Render any entry as one line of text.
pub fn text_rendering(entry: &Entry, style: Style, cache: Option<&DoiCache>) -> String {
    match entry.kind() {
        EntryKind::Bibtex => format_bibtex(entry.raw(), style),
        EntryKind::Doi => match cache.and_then(|c| c.get(entry.raw())) {
            Some(bibtex) => format_bibtex(&bibtex, style),
            None => format!("DOI: {}", entry.raw()),
        },
        EntryKind::Text => entry.format(),
        EntryKind::Url => format!("URL: {}", entry.format()),
    }
}

/// Render a BibTeX record as a bibliography line.
///
/// A record without a valid header renders as `ERRORED: <reason>`.
pub fn format_bibtex(raw: &str, style: Style) -> String {
    let conditioned = condition_bibtex(raw.trim());
    let entry_type = match parse_header(&conditioned) {
        Ok((entry_type, _)) => entry_type,
        Err(e) => {
            error!("Failed to render BibTeX record: {}", e);
            return format!("ERRORED: {e}");
        }
    };

    let fields: BTreeMap<String, String> =
        fields(&conditioned).into_iter().map(|(name, value)| (name, detex(&value))).collect();
    let get = |name: &str| fields.get(name).map(String::as_str).filter(|v| !v.is_empty());

    let authors = get("author").or_else(|| get("editor")).map(|a| format_authors(a, style));
    let year = get("year").unwrap_or("n.d.");
    let mut out = match (style, authors) {
        (Style::Harvard1, Some(authors)) => format!("{authors}, {}. ", year.trim_end_matches('.')),
        (Style::Harvard1, None) => format!("{}. ", year.trim_end_matches('.')),
        (Style::Apa, Some(authors)) => format!("{authors} ({year}). "),
        (Style::Apa, None) => format!("({year}). "),
    };

    if let Some(title) = get("title") {
        out.push_str(title.trim_end_matches('.'));
    }

    let pages = get("pages").map(|p| format_pages(p, style));
    match entry_type.as_str() {
        "article" => {
            let mut parts = Vec::new();
            if let Some(journal) = get("journal") {
                parts.push(journal.trim_end_matches('.').to_string());
            }
            match (get("volume"), get("number")) {
                (Some(volume), Some(number)) => parts.push(format!("{volume}({number})")),
                (Some(volume), None) => parts.push(volume.to_string()),
                _ => {}
            }
            parts.extend(pages);
            if !parts.is_empty() {
                out.push_str(". ");
                out.push_str(&parts.join(", "));
            }
        }
        "inproceedings" | "incollection" | "conference" => {
            if let Some(booktitle) = get("booktitle") {
                out.push_str(". In ");
                out.push_str(booktitle.trim_end_matches('.'));
            }
            if let Some(publisher) = get("publisher") {
                out.push_str(". ");
                out.push_str(publisher);
            }
            if let Some(pages) = pages {
                out.push_str(", ");
                out.push_str(&pages);
            }
        }
        "book" => {
            if let Some(publisher) = get("publisher") {
                out.push_str(match style {
                    Style::Harvard1 => ", ",
                    Style::Apa => ". ",
                });
                out.push_str(publisher);
            }
        }
        _ => {
            if let Some(container) = get("journal").or_else(|| get("howpublished")).or_else(|| get("publisher")) {
                out.push_str(". ");
                out.push_str(container);
            }
        }
    }
    if !out.ends_with('.') {
        out.push('.');
    }

    if let Some(url) = get("url").filter(|_| entry_type == "misc") {
        out.push_str(" Available at: ");
        out.push_str(url);
        out.push('.');
    }
    out
}

fn format_authors(authors: &str, style: Style) -> String {
    let mut names: Vec<String> = Vec::new();
    let mut et_al = false;
    for name in authors.split(" and ").map(str::trim).filter(|n| !n.is_empty()) {
        if name.eq_ignore_ascii_case("others") {
            et_al = true;
        } else {
            names.push(format_name(name, style));
        }
    }

    let joined = match names.len() {
        0 => String::new(),
        1 => names.remove(0),
        _ => {
            let last = names.pop().unwrap_or_default();
            let separator = match style {
                Style::Harvard1 => " & ",
                Style::Apa => ", & ",
            };
            format!("{}{separator}{last}", names.join(", "))
        }
    };

    if et_al { format!("{joined} et al.") } else { joined }
}

/// `Last, First Middle` or `First Middle Last` as `Last, F.M.`.
fn format_name(name: &str, style: Style) -> String {
    let (last, given) = match name.split_once(',') {
        Some((last, given)) => (last.trim().to_string(), given.trim().to_string()),
        None => {
            let mut parts: Vec<&str> = name.split_whitespace().collect();
            let last = parts.pop().unwrap_or_default().to_string();
            (last, parts.join(" "))
        }
    };

    let initials: Vec<String> = given
        .split(|c: char| c.is_whitespace() || c == '.')
        .filter_map(|part| part.chars().find(|c| c.is_alphabetic()))
        .map(|c| format!("{c}."))
        .collect();

    if initials.is_empty() {
        return last;
    }
    match style {
        Style::Harvard1 => format!("{last}, {}", initials.concat()),
        Style::Apa => format!("{last}, {}", initials.join(" ")),
    }
}

fn format_pages(pages: &str, style: Style) -> String {
    let normalized = pages.replace("--", "\u{2013}").replace(" - ", "\u{2013}");
    let range = normalized.contains('\u{2013}') || normalized.contains('-');
    match (style, range) {
        (Style::Harvard1, true) => format!("pp.{normalized}"),
        (Style::Harvard1, false) => format!("p.{normalized}"),
        (Style::Apa, _) => normalized,
    }
}

/// Strip TeX escapes and accent commands from a field value.
fn detex(value: &str) -> String {
    let value = value.replace("\\&", "&").replace("\\%", "%").replace("\\_", "_");
    match Regex::new(r#"\\['"`^~=.]"#) {
        Ok(re) => re.replace_all(&value, "").into_owned(),
        Err(_) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const NUMPY: &str = r"@article{van2011numpy,
    title={The NumPy array: a structure for efficient numerical computation},
    author={Van Der Walt, Stefan and Colbert, S Chris and Varoquaux, Gael},
    journal={Computing in Science \& Engineering},
    volume={13},
    number={2},
    pages={22--30},
    year={2011}
}";

    #[test]
    fn test_harvard_article() {
        assert_eq!(
            format_bibtex(NUMPY, Style::Harvard1),
            "Van Der Walt, S., Colbert, S.C. & Varoquaux, G., 2011. The NumPy array: a structure for \
             efficient numerical computation. Computing in Science & Engineering, 13(2), pp.22\u{2013}30."
        );
    }

    #[test]
    fn test_apa_article() {
        assert_eq!(
            format_bibtex(NUMPY, Style::Apa),
            "Van Der Walt, S., Colbert, S. C., & Varoquaux, G. (2011). The NumPy array: a structure for \
             efficient numerical computation. Computing in Science & Engineering, 13(2), 22\u{2013}30."
        );
    }

    #[test]
    fn test_book_and_et_al() {
        let book = "@book{jain1988algorithms,\n title={Algorithms for clustering data},\n \
                    author={Jain, Anil K and Dubes, Richard C and others},\n year={1988},\n \
                    publisher={Prentice-Hall, Inc.}\n}";
        assert_eq!(
            format_bibtex(book, Style::Harvard1),
            "Jain, A.K. & Dubes, R.C. et al., 1988. Algorithms for clustering data, Prentice-Hall, Inc."
        );
    }

    #[test]
    fn test_accents_are_stripped() {
        let raw = r#"@inproceedings{ester1996density,
    title={A density-based algorithm},
    author={Ester, Martin and Sander, J{\"o}rg},
    booktitle={Kdd},
    pages={226--231},
    year={1996}
}"#;
        assert_eq!(
            format_bibtex(raw, Style::Harvard1),
            "Ester, M. & Sander, J., 1996. A density-based algorithm. In Kdd, pp.226\u{2013}231."
        );
    }

    #[test]
    fn test_misc_without_author_or_year() {
        let raw = "@misc{demo,\n title={Demo data},\n url={https://example.org}\n}";
        assert_eq!(
            format_bibtex(raw, Style::Harvard1),
            "n.d. Demo data. Available at: https://example.org."
        );
    }

    #[test]
    fn test_invalid_record_is_reported() {
        assert!(format_bibtex("not bibtex", Style::Harvard1).starts_with("ERRORED:"));
    }

    #[test]
    fn test_non_bibtex_entries() {
        assert_eq!(text_rendering(&Entry::text("Some paper"), Style::Harvard1, None), "Some paper");
        assert_eq!(
            text_rendering(&Entry::url("https://example.org"), Style::Harvard1, None),
            "URL: https://example.org"
        );
        assert_eq!(
            text_rendering(&Entry::doi("10.7717/peerj.453"), Style::Harvard1, None),
            "DOI: 10.7717/peerj.453"
        );
    }

    #[test]
    fn test_doi_uses_cached_record() {
        let temp = TempDir::new().unwrap();
        let cache = DoiCache::new(temp.path());
        cache
            .store("10.7717/peerj.453", "@article{skimage, title={scikit-image}, author={van der Walt, Stefan}, year={2014}, journal={PeerJ}}")
            .unwrap();

        let text = text_rendering(&Entry::doi("10.7717/peerj.453"), Style::Harvard1, Some(&cache));
        assert_eq!(text, "van der Walt, S., 2014. scikit-image. PeerJ.");
    }

    #[test]
    fn test_style_names() {
        assert_eq!(Style::from_name("Harvard1"), Some(Style::Harvard1));
        assert_eq!(Style::from_name("apa"), Some(Style::Apa));
        assert_eq!(Style::from_name("chicago"), None);
        assert_eq!(Style::resolve("chicago"), Style::Harvard1);
    }
}
