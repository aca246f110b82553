//! `inspect` rendering for literal values
//!
//! Disassembly prints operands exactly as the reference VM does, so these
//! helpers reproduce its formatting rules for floats, strings and symbols.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use std::fmt::Write;

/// Operator method names that print as bare symbols (`:+`, `:[]=`, ...)
static OPERATOR_SYMBOLS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "+", "-", "*", "/", "%", "**", "==", "===", "!=", "<=>", "<", "<=", ">", ">=", "<<",
        ">>", "!", "~", "+@", "-@", "[]", "[]=", "=~", "!~", "&", "|", "^", "`",
    ]
    .into_iter()
    .collect()
});

/// Render a float: shortest round-trip digits, `.0` on integral values,
/// exponent form outside `1e-4 <= |f| < 1e16`.
pub fn float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if f == 0.0 {
        return if f.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let sci = format!("{:e}", f);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if (-4..16).contains(&exponent) {
        let mut fixed = format!("{}", f);
        if !fixed.contains('.') {
            fixed.push_str(".0");
        }
        fixed
    } else {
        let mut out = mantissa.to_string();
        if !out.contains('.') {
            out.push_str(".0");
        }
        let sign = if exponent < 0 { '-' } else { '+' };
        let _ = write!(out, "e{}{:02}", sign, exponent.abs());
        out
    }
}

/// Render a double-quoted string literal with escapes
pub fn string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\x0C' => out.push_str("\\f"),
            '\x0B' => out.push_str("\\v"),
            '\x08' => out.push_str("\\b"),
            '\x07' => out.push_str("\\a"),
            '\x1B' => out.push_str("\\e"),
            '#' if matches!(chars.peek(), Some('{' | '$' | '@')) => out.push_str("\\#"),
            c if c.is_control() => {
                let code = c as u32;
                if code < 0x10000 {
                    let _ = write!(out, "\\u{:04X}", code);
                } else {
                    let _ = write!(out, "\\u{{{:X}}}", code);
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a symbol literal, quoting names that are not plain identifiers
pub fn symbol(name: &str) -> String {
    if is_bare_symbol(name) {
        format!(":{}", name)
    } else {
        format!(":{}", string(name))
    }
}

fn is_bare_symbol(name: &str) -> bool {
    if OPERATOR_SYMBOLS.contains(name) {
        return true;
    }

    let body = if let Some(rest) = name.strip_prefix("@@") {
        rest
    } else if let Some(rest) = name.strip_prefix('@') {
        rest
    } else if let Some(rest) = name.strip_prefix('$') {
        rest
    } else {
        // Method names may end in one of `?`, `!` or `=`.
        name.strip_suffix(&['?', '!', '='][..]).unwrap_or(name)
    };

    is_identifier(body)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}
