//! HTML entity to Unicode conversion.
//!
//! ENML bodies are XHTML and may use HTML named entities that an XML parser
//! does not know. They are replaced with their characters before parsing.
//! The five XML entities (amp, lt, gt, quot, apos) are left for the parser.

use std::sync::LazyLock;

use regex::Regex;

static ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([a-zA-Z][a-zA-Z0-9]*);").expect("invalid entity regex"));

/// Named HTML entities, sorted by name for binary search.
const HTML_ENTITIES: &[(&str, char)] = &[
    ("Dagger", '\u{2021}'),
    ("bull", '\u{2022}'),
    ("cent", '\u{00a2}'),
    ("copy", '\u{00a9}'),
    ("dagger", '\u{2020}'),
    ("darr", '\u{2193}'),
    ("deg", '\u{00b0}'),
    ("divide", '\u{00f7}'),
    ("emsp", '\u{2003}'),
    ("ensp", '\u{2002}'),
    ("euro", '\u{20ac}'),
    ("frac12", '\u{00bd}'),
    ("frac14", '\u{00bc}'),
    ("frac34", '\u{00be}'),
    ("ge", '\u{2265}'),
    ("harr", '\u{2194}'),
    ("hellip", '\u{2026}'),
    ("iexcl", '\u{00a1}'),
    ("iquest", '\u{00bf}'),
    ("laquo", '\u{00ab}'),
    ("larr", '\u{2190}'),
    ("ldquo", '\u{201c}'),
    ("le", '\u{2264}'),
    ("lsquo", '\u{2018}'),
    ("mdash", '\u{2014}'),
    ("middot", '\u{00b7}'),
    ("nbsp", '\u{00a0}'),
    ("ndash", '\u{2013}'),
    ("ne", '\u{2260}'),
    ("para", '\u{00b6}'),
    ("plusmn", '\u{00b1}'),
    ("pound", '\u{00a3}'),
    ("raquo", '\u{00bb}'),
    ("rarr", '\u{2192}'),
    ("rdquo", '\u{201d}'),
    ("reg", '\u{00ae}'),
    ("rsquo", '\u{2019}'),
    ("sect", '\u{00a7}'),
    ("shy", '\u{00ad}'),
    ("times", '\u{00d7}'),
    ("trade", '\u{2122}'),
    ("uarr", '\u{2191}'),
    ("yen", '\u{00a5}'),
];

/// Replace named HTML entities with their Unicode characters.
///
/// Unknown entities and the XML built-ins are preserved as-is.
pub(crate) fn convert_html_entities(enml: &str) -> String {
    if !enml.contains('&') {
        return enml.to_owned();
    }
    ENTITY_PATTERN
        .replace_all(enml, |caps: &regex::Captures| {
            lookup(&caps[1]).map_or_else(|| caps[0].to_owned(), String::from)
        })
        .into_owned()
}

fn lookup(name: &str) -> Option<char> {
    HTML_ENTITIES
        .binary_search_by(|(entity, _)| entity.cmp(&name))
        .ok()
        .map(|index| HTML_ENTITIES[index].1)
}
