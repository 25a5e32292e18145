//! SQL identifier quoting.
//!
//! Identifiers are delimited with backticks; a backtick inside a name is
//! escaped by doubling it.
//!
//! - Plain identifiers match `[A-Za-z_][A-Za-z0-9_$]*`
//! - [`Quoting::Minimal`] leaves plain, non-reserved identifiers bare

/// How identifiers are delimited when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quoting {
    /// Always quote (SELECT, GROUP BY and ORDER BY columns).
    #[default]
    Always,
    /// Quote only when the name is not a plain identifier or is a reserved word
    /// (predicate keys).
    Minimal,
}

/// Words that must stay quoted even under [`Quoting::Minimal`].
const RESERVED: &[&str] = &[
    "all", "and", "as", "asc", "between", "by", "case", "check", "column", "create", "delete",
    "desc", "distinct", "drop", "else", "exists", "from", "group", "having", "in", "index",
    "insert", "interval", "into", "is", "join", "key", "left", "like", "limit", "not", "null",
    "on", "or", "order", "primary", "range", "references", "right", "select", "set", "table",
    "then", "to", "union", "unique", "update", "using", "values", "when", "where", "with",
];

/// Check for `[A-Za-z_][A-Za-z0-9_$]*`.
pub fn is_plain(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
}

pub fn is_reserved(name: &str) -> bool {
    RESERVED.iter().any(|w| w.eq_ignore_ascii_case(name))
}

/// Check for an unsigned integer or decimal literal such as `1` or `2.5`.
pub fn is_numeric_literal(s: &str) -> bool {
    let mut seen_digit = false;
    let mut seen_dot = false;
    for c in s.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}

/// Quote an identifier with backticks.
pub fn quote(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    write_quoted(name, &mut out);
    out
}

pub(crate) fn write_quoted(name: &str, out: &mut String) {
    out.push('`');
    for ch in name.chars() {
        if ch == '`' {
            out.push_str("``");
        } else {
            out.push(ch);
        }
    }
    out.push('`');
}

/// Render an identifier under the given quoting mode.
pub fn render(name: &str, quoting: Quoting) -> String {
    match quoting {
        Quoting::Minimal if is_plain(name) && !is_reserved(name) => name.to_string(),
        _ => quote(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_simple() {
        assert_eq!(quote("user"), "`user`");
    }

    #[test]
    fn quote_escapes_backtick() {
        assert_eq!(quote("we`ird"), "`we``ird`");
    }

    #[test]
    fn plain_rules() {
        assert!(is_plain("city_id"));
        assert!(is_plain("_x$1"));
        assert!(!is_plain("1table"));
        assert!(!is_plain("my table"));
        assert!(!is_plain(""));
    }

    #[test]
    fn minimal_keeps_reserved_quoted() {
        assert_eq!(render("name", Quoting::Minimal), "name");
        assert_eq!(render("order", Quoting::Minimal), "`order`");
        assert_eq!(render("first name", Quoting::Minimal), "`first name`");
        assert_eq!(render("name", Quoting::Always), "`name`");
    }

    #[test]
    fn numeric_literals() {
        assert!(is_numeric_literal("1"));
        assert!(is_numeric_literal("2.5"));
        assert!(!is_numeric_literal("."));
        assert!(!is_numeric_literal("1a"));
    }
}
