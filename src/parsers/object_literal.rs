//! Object-literal grammar for generated TypeScript / JavaScript modules
//!
//! Generated token modules encode hierarchy through nested object literals.
//! Rather than counting braces line by line, this module parses the literal
//! syntax with nom and hands back a tree, so braces inside strings, comments
//! and trailing commas are handled by the grammar itself.
//!
//! ```text
//! object     := '{' (member (',' member)* ','?)? '}'
//! member     := '...' expression | key ':' value | key
//! key        := string | identifier | number | '[' ... ']'
//! value      := object | array | string | expression
//! ```

use std::sync::LazyLock;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1},
    character::complete::{char, multispace1, one_of, satisfy},
    combinator::{map, peek, recognize, value},
    error::{Error as NomError, ErrorKind},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult, Slice,
};
use nom_locate::LocatedSpan;
use regex::Regex;

pub type Span<'a> = LocatedSpan<&'a str>;

type PResult<'a, T> = IResult<Span<'a>, T>;

static ASSIGN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)(?:\bexport\s+default\s+|\bmodule\.exports\s*=\s*|\b(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::\s*[^=\n]+)?=\s*)",
    )
    .unwrap()
});

/// A parsed JavaScript value
#[derive(Debug, Clone, PartialEq)]
pub enum JsValue {
    Object(Vec<JsMember>),
    Array(Vec<JsValue>),
    Str(String),
    /// Any other expression, raw source text
    Expr(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsMember {
    pub key: String,
    pub value: JsValue,
    /// 1-based line of the key
    pub line: usize,
}

/// A top-level `const x = { … }` / `module.exports = { … }` / `export default { … }`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectAssignment {
    /// Variable name; `None` for `module.exports` and `export default`
    pub name: Option<String>,
    pub members: Vec<JsMember>,
    pub line: usize,
}

/// A syntax error in one assignment; other assignments still parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

/// Find and parse every object literal assigned at the top level of a module
pub fn parse_assignments(src: &str) -> (Vec<ObjectAssignment>, Vec<SyntaxError>) {
    let full = Span::new(src);
    let mut assignments = Vec::new();
    let mut errors = Vec::new();
    let mut consumed_to = 0usize;

    for caps in ASSIGN_RE.captures_iter(src) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() < consumed_to || !src[whole.end()..].starts_with('{') {
            continue;
        }

        let start = full.slice(whole.end()..);
        let line = start.location_line() as usize;
        match object(start) {
            Ok((rest, members)) => {
                consumed_to = rest.location_offset();
                assignments.push(ObjectAssignment {
                    name: caps.get(1).map(|m| m.as_str().to_string()),
                    members,
                    line,
                });
            }
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => errors.push(SyntaxError {
                line: e.input.location_line() as usize,
                message: format!("unexpected input near '{}'", snippet(e.input.fragment())),
            }),
            Err(nom::Err::Incomplete(_)) => errors.push(SyntaxError {
                line,
                message: "incomplete object literal".to_string(),
            }),
        }
    }

    (assignments, errors)
}

fn snippet(text: &str) -> String {
    text.chars().take(24).collect::<String>().replace('\n', " ")
}

// ============================================================================
// Whitespace and comments
// ============================================================================

fn ws(input: Span) -> PResult<()> {
    value(
        (),
        many0(alt((value((), multispace1), line_comment, block_comment))),
    )(input)
}

fn line_comment(input: Span) -> PResult<()> {
    value((), pair(tag("//"), take_while(|c: char| c != '\n')))(input)
}

fn block_comment(input: Span) -> PResult<()> {
    value((), tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

fn failure<T>(input: Span, kind: ErrorKind) -> PResult<T> {
    Err(nom::Err::Failure(NomError::new(input, kind)))
}

// ============================================================================
// Objects and arrays
// ============================================================================

fn object(input: Span) -> PResult<Vec<JsMember>> {
    let (mut input, _) = char('{')(input)?;
    let mut members = Vec::new();

    loop {
        let (rest, _) = ws(input)?;
        if rest.fragment().starts_with('}') {
            return Ok((rest.slice(1..), members));
        }

        let (rest, member) = member(rest)?;
        members.extend(member);

        let (rest, _) = ws(rest)?;
        match rest.fragment().chars().next() {
            Some(',') => input = rest.slice(1..),
            Some('}') => return Ok((rest.slice(1..), members)),
            _ => return failure(rest, ErrorKind::Char),
        }
    }
}

fn array(input: Span) -> PResult<Vec<JsValue>> {
    let (mut input, _) = char('[')(input)?;
    let mut items = Vec::new();

    loop {
        let (rest, _) = ws(input)?;
        if rest.fragment().starts_with(']') {
            return Ok((rest.slice(1..), items));
        }

        let (rest, item) = js_value(rest)?;
        items.push(item);

        let (rest, _) = ws(rest)?;
        match rest.fragment().chars().next() {
            Some(',') => input = rest.slice(1..),
            Some(']') => return Ok((rest.slice(1..), items)),
            _ => return failure(rest, ErrorKind::Char),
        }
    }
}

fn member(input: Span) -> PResult<Option<JsMember>> {
    if let Some(spread) = input.fragment().strip_prefix("...") {
        let skip = input.fragment().len() - spread.len();
        let (rest, _) = expression(input.slice(skip..))?;
        return Ok((rest, None));
    }

    let line = input.location_line() as usize;
    let (rest, key) = key(input)?;
    let (rest, _) = ws(rest)?;

    if rest.fragment().starts_with(':') {
        let (rest, _) = ws(rest.slice(1..))?;
        let (rest, value) = js_value(rest)?;
        return Ok((rest, Some(JsMember { key, value, line })));
    }

    // Shorthand property or method: nothing to extract
    if rest.fragment().starts_with('(') {
        let (rest, _) = expression(rest)?;
        return Ok((rest, None));
    }
    Ok((rest, None))
}

fn key(input: Span) -> PResult<String> {
    alt((
        string_literal,
        map(identifier, |s| s.fragment().to_string()),
        map(
            take_while1(|c: char| c.is_ascii_digit() || c == '.'),
            |s: Span| s.fragment().to_string(),
        ),
        map(
            delimited(char('['), take_until("]"), char(']')),
            |s: Span| format!("[{}]", s.fragment()),
        ),
    ))(input)
}

fn identifier(input: Span) -> PResult<Span> {
    recognize(pair(
        satisfy(|c| c.is_alphabetic() || c == '_' || c == '$'),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '$'),
    ))(input)
}

// ============================================================================
// Values
// ============================================================================

fn js_value(input: Span) -> PResult<JsValue> {
    alt((
        map(object, JsValue::Object),
        map(array, JsValue::Array),
        map(
            terminated(string_literal, peek(preceded(ws, one_of(",}]")))),
            JsValue::Str,
        ),
        map(expression, |raw| JsValue::Expr(strip_type_assertion(&raw))),
    ))(input)
}

/// `'#fff' as const` → `'#fff'`
fn strip_type_assertion(raw: &str) -> String {
    match raw.rfind(" as ") {
        Some(idx) => raw[..idx].trim().to_string(),
        None => raw.to_string(),
    }
}

fn string_literal(input: Span) -> PResult<String> {
    let (rest, quote) = one_of("\"'`")(input)?;
    let mut out = String::new();
    let mut escaped = false;

    for (idx, c) in rest.fragment().char_indices() {
        if escaped {
            out.push(match c {
                'n' => '\n',
                't' => '\t',
                other => other,
            });
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Ok((rest.slice(idx + c.len_utf8()..), out));
        } else {
            out.push(c);
        }
    }

    failure(input, ErrorKind::Char)
}

/// Raw expression text up to the next top-level `,` `;` or closing bracket
fn expression(input: Span) -> PResult<String> {
    let text = *input.fragment();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut end = text.len();

    for (idx, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                if depth == 0 {
                    end = idx;
                    break;
                }
                depth -= 1;
            }
            ',' | ';' if depth == 0 => {
                end = idx;
                break;
            }
            _ => {}
        }
    }

    let raw = text[..end].trim();
    if raw.is_empty() {
        return Err(nom::Err::Error(NomError::new(input, ErrorKind::Verify)));
    }
    Ok((input.slice(end..), raw.to_string()))
}

// ============================================================================
// Flattening
// ============================================================================

/// A leaf of the object tree with its key path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatEntry {
    /// Keys from the root, as written
    pub keys: Vec<String>,
    pub raw: String,
    pub line: usize,
}

/// Flatten nested members into leaf entries
pub fn flatten(members: &[JsMember]) -> Vec<FlatEntry> {
    let mut out = Vec::new();
    flatten_into(members, &mut Vec::new(), &mut out);
    out
}

fn flatten_into(members: &[JsMember], keys: &mut Vec<String>, out: &mut Vec<FlatEntry>) {
    for member in members {
        keys.push(member.key.clone());
        match &member.value {
            JsValue::Object(children) => flatten_into(children, keys, out),
            leaf => {
                if let Some(raw) = leaf_text(leaf) {
                    out.push(FlatEntry {
                        keys: keys.clone(),
                        raw,
                        line: member.line,
                    });
                }
            }
        }
        keys.pop();
    }
}

fn leaf_text(value: &JsValue) -> Option<String> {
    match value {
        JsValue::Str(s) | JsValue::Expr(s) => Some(s.clone()),
        // Font stacks: ['Inter', 'sans-serif']; fontSize tuples: ['1rem', { … }]
        JsValue::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    JsValue::Str(s) | JsValue::Expr(s) => Some(s.clone()),
                    _ => None,
                })
                .collect();
            let has_object = items.iter().any(|i| matches!(i, JsValue::Object(_)));
            match (parts.is_empty(), has_object) {
                (true, _) => None,
                (false, true) => parts.into_iter().next(),
                (false, false) => Some(parts.join(", ")),
            }
        }
        JsValue::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nested_typescript_object() {
        let src = r##"
// Generated file - do not edit
export const tokens = {
  colors: {
    brandPurple: '#7B00FF', // trailing comment
    'deep-space': "#0A0A1F",
    /* block { comment } */
    semantic: { primary: "#7B00FF", },
  },
  spacing: { md: '16px', lg: 24 },
} as const;
"##;
        let (assignments, errors) = parse_assignments(src);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].name.as_deref(), Some("tokens"));

        let flat = flatten(&assignments[0].members);
        let keys: Vec<String> = flat.iter().map(|e| e.keys.join(".")).collect();
        assert_eq!(
            keys,
            vec![
                "colors.brandPurple",
                "colors.deep-space",
                "colors.semantic.primary",
                "spacing.md",
                "spacing.lg",
            ]
        );
        assert_eq!(flat[0].raw, "#7B00FF");
        assert_eq!(flat[0].line, 5);
        assert_eq!(flat[4].raw, "24");
    }

    #[test]
    fn test_braces_inside_strings_do_not_confuse_nesting() {
        let src = r#"const t = { a: "{not.a.block}", b: { c: '}' }, d: 'x' };"#;
        let (assignments, errors) = parse_assignments(src);
        assert!(errors.is_empty());
        let flat = flatten(&assignments[0].members);
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[0].raw, "{not.a.block}");
        assert_eq!(flat[1].keys, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(flat[2].raw, "x");
    }

    #[test]
    fn test_module_exports_with_arrays_and_spreads() {
        let src = r#"
module.exports = {
  theme: {
    extend: {
      fontFamily: { sans: ['Inter', 'sans-serif'] },
      fontSize: { base: ['1rem', { lineHeight: '1.5rem' }] },
      colors: { ...baseColors, accent: colors.brand.purple },
    },
  },
};
"#;
        let (assignments, errors) = parse_assignments(src);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(assignments[0].name, None);

        let flat = flatten(&assignments[0].members);
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[0].raw, "Inter, sans-serif");
        assert_eq!(flat[1].raw, "1rem");
        assert_eq!(flat[2].raw, "colors.brand.purple");
    }

    #[test]
    fn test_syntax_error_is_reported_with_line() {
        let src = "export const broken = {\n  a: '#fff',\n  b '#000'\n};\nexport const ok = { c: '1px' };";
        let (assignments, errors) = parse_assignments(src);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 3);
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].name.as_deref(), Some("ok"));
    }

    #[test]
    fn test_type_annotation_and_as_const_values() {
        let src = "export const spacing: Record<string, string> = { sm: '8px' as const };";
        let (assignments, _) = parse_assignments(src);
        let flat = flatten(&assignments[0].members);
        assert_eq!(flat[0].raw, "'8px'");
    }
}
