//! Path templates and the escaping policy for URL and form values.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters never legal in a path segment; always escaped.
const PATH_ALWAYS: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'?')
    .add(b'#');

/// Unencoded path values additionally escape `%`, `/` and `:`.
///
/// An escaped `:` keeps a value from reading as a URL scheme.
const PATH_VALUE: &AsciiSet = &PATH_ALWAYS.add(b'%').add(b'/').add(b':');

/// Query names and values.
const QUERY_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'!')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}')
    .add(b'~');

/// Query and form values declared as already encoded.
const PRE_ENCODED: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'#');

/// Form field names and values.
const FORM_COMPONENT: &AsciiSet = &QUERY_COMPONENT.add(b'*');

/// Name of a `{name}` placeholder.
pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Contents of every `{...}` block, in order of appearance.
pub(crate) fn blocks(template: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        out.push(&after[..close]);
        rest = &after[close + 1..];
    }
    out
}

/// Distinct placeholder names of a path template.
pub(crate) fn placeholders(path: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for name in blocks(path) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Escape a path value.
pub(crate) fn encode_path(value: &str, encoded: bool) -> String {
    let set = if encoded { PATH_ALWAYS } else { PATH_VALUE };
    utf8_percent_encode(value, set).to_string()
}

/// Whether an escaped path value would add `.` or `..` segments.
pub(crate) fn is_traversal(escaped: &str) -> bool {
    escaped.split('/').any(|segment| {
        let lower = segment.to_ascii_lowercase().replace("%2e", ".");
        lower == "." || lower == ".."
    })
}

pub(crate) fn encode_query(value: &str, encoded: bool) -> String {
    let set = if encoded { PRE_ENCODED } else { QUERY_COMPONENT };
    utf8_percent_encode(value, set).to_string()
}

pub(crate) fn encode_form(value: &str, encoded: bool) -> String {
    let set = if encoded { PRE_ENCODED } else { FORM_COMPONENT };
    utf8_percent_encode(value, set).to_string()
}
