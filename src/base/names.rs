//! Helpers for the raw name strings found in CSDL documents.
//!
//! CSDL references are always strings: qualified names (`NS.Customer`),
//! collection wrappers (`Collection(NS.Order)`), target paths
//! (`NS.Container/Customers`) and operation signatures
//! (`NS.Discount(NS.Customer, Edm.Int32)`). These functions split those
//! strings without interpreting them.

use unicode_ident::{is_xid_continue, is_xid_start};

/// Maximum length of a CSDL simple identifier.
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Splits `Namespace.Name` at the last dot.
///
/// Returns `None` for names without a namespace part.
pub fn split_qualified(name: &str) -> Option<(&str, &str)> {
    name.rsplit_once('.')
        .filter(|(ns, simple)| !ns.is_empty() && !simple.is_empty())
}

/// The part after the last dot (the whole string if there is none).
pub fn simple_name(name: &str) -> &str {
    split_qualified(name).map_or(name, |(_, simple)| simple)
}

/// `true` for a CSDL `SimpleIdentifier`.
pub fn is_simple_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first == '_' || is_xid_start(first) => {}
        _ => return false,
    }
    s.len() <= MAX_IDENTIFIER_LEN && chars.all(is_xid_continue)
}

/// `true` for a dotted name whose every segment is a simple identifier.
pub fn is_qualified_name(s: &str) -> bool {
    s.contains('.') && s.split('.').all(is_simple_identifier)
}

/// Unwraps `Collection(X)` into `X`.
pub fn strip_collection(type_name: &str) -> Option<&str> {
    type_name
        .trim()
        .strip_prefix("Collection(")
        .and_then(|rest| rest.strip_suffix(')'))
        .map(str::trim)
}

/// Splits a `/`-delimited path, ignoring slashes inside parentheses.
///
/// `NS.F(Collection(NS.T))/p` yields `["NS.F(Collection(NS.T))", "p"]`.
pub fn split_path(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in path.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                segments.push(&path[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&path[start..]);
    segments
}

/// An operation reference with an optional parenthesized parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSignature<'a> {
    pub name: &'a str,
    /// `None` when the reference has no parameter list at all.
    pub parameters: Option<Vec<&'a str>>,
}

/// Parses `Name` or `Name(Type1, Type2)`.
///
/// Returns `None` when the parentheses are unbalanced.
pub fn parse_operation_signature(reference: &str) -> Option<OperationSignature<'_>> {
    let reference = reference.trim();
    let Some(open) = reference.find('(') else {
        return Some(OperationSignature {
            name: reference,
            parameters: None,
        });
    };
    let inner = reference[open + 1..].strip_suffix(')')?;
    let mut parameters = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parameters.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    let last = inner[start..].trim();
    if !last.is_empty() || !parameters.is_empty() {
        parameters.push(last);
    }
    Some(OperationSignature {
        name: reference[..open].trim(),
        parameters: Some(parameters),
    })
}
