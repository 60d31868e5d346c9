//! Serialized wire form of a formula document
//!
//! Text runs are written verbatim (with `&`, `<` and `>` escaped) and each
//! token becomes a marker element:
//!
//! ```text
//! total <token-chip id="P_0001" kind="position" label="Energy consumption">Energy consumption</token-chip>
//! ```
//!
//! On input a self-closing `<token-chip ... />` is accepted as well. A
//! marker without `kind` defaults to `position`; a marker without `label`
//! takes its inner text as the label.
//!
//! Any other markup is governed by [`UnknownTagPolicy`]. Values saved by
//! rich-text hosts usually arrive wrapped in a paragraph (`<p>...</p>`);
//! under the default `PassThrough` those tags become literal text and are
//! written back escaped (`&lt;p&gt;`). Strip the wrapper before loading, or
//! use `Reject` to refuse such values.

use serde::{Deserialize, Serialize};

use super::document::{DocumentError, Node};
use crate::token::{Token, TokenKind};

const TAG: &str = "token-chip";
const CLOSE_TAG: &str = "</token-chip>";

/// How the parser treats markup it does not recognise
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTagPolicy {
    /// Keep the tag verbatim as text
    #[default]
    PassThrough,
    /// Fail with `MalformedDocument`
    Reject,
}

/// Write nodes in wire form
pub fn write(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(text) => escape_text(text, &mut out),
            Node::Token(token) => {
                out.push('<');
                out.push_str(TAG);
                write_attr(&mut out, "id", &token.id);
                write_attr(&mut out, "kind", token.kind.as_str());
                write_attr(&mut out, "label", &token.label);
                out.push('>');
                escape_text(&token.label, &mut out);
                out.push_str(CLOSE_TAG);
            }
        }
    }
    out
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("&quot;"),
            _ => escape_char(ch, out),
        }
    }
    out.push('"');
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        escape_char(ch, out);
    }
}

fn escape_char(ch: char, out: &mut String) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        _ => out.push(ch),
    }
}

/// Parse wire form into (possibly non-canonical) nodes
pub fn parse(input: &str, policy: UnknownTagPolicy) -> Result<Vec<Node>, DocumentError> {
    let mut nodes = Vec::new();
    let mut text = String::new();
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];
        if rest.starts_with('<') {
            if is_marker_open(rest) {
                if !text.is_empty() {
                    nodes.push(Node::Text(std::mem::take(&mut text)));
                }
                let (token, consumed) = parse_marker(input, pos)?;
                nodes.push(Node::Token(token));
                pos += consumed;
                continue;
            }
            if rest.starts_with(CLOSE_TAG) {
                return Err(malformed(pos, "closing marker without opening marker"));
            }
            if let Some(len) = tag_len(rest) {
                match policy {
                    UnknownTagPolicy::PassThrough => {
                        tracing::debug!("Passing through unknown tag at byte {}", pos);
                        text.push_str(&rest[..len]);
                        pos += len;
                        continue;
                    }
                    UnknownTagPolicy::Reject => {
                        return Err(malformed(pos, "unknown tag"));
                    }
                }
            }
        }

        if rest.starts_with('&') {
            if let Some((ch, len)) = decode_entity(rest) {
                text.push(ch);
                pos += len;
                continue;
            }
        }

        // Safe: `pos` always sits on a char boundary
        let ch = rest.chars().next().unwrap_or_default();
        text.push(ch);
        pos += ch.len_utf8();
    }

    if !text.is_empty() {
        nodes.push(Node::Text(text));
    }
    Ok(nodes)
}

fn malformed(offset: usize, reason: &str) -> DocumentError {
    DocumentError::MalformedDocument {
        offset,
        reason: reason.to_string(),
    }
}

/// `<token-chip` followed by whitespace, `>` or `/`
fn is_marker_open(rest: &str) -> bool {
    let Some(after) = rest.strip_prefix('<').and_then(|r| r.strip_prefix(TAG)) else {
        return false;
    };
    matches!(after.chars().next(), Some(c) if c.is_whitespace() || c == '>' || c == '/')
}

/// Length of an unknown tag (`<name ...>`, `</name>`, `<!...>`), or `None`
/// if the `<` does not start markup
fn tag_len(rest: &str) -> Option<usize> {
    let mut chars = rest[1..].chars();
    let first = chars.next()?;
    let starts_tag = first.is_ascii_alphabetic()
        || first == '!'
        || (first == '/' && chars.next().is_some_and(|c| c.is_ascii_alphabetic()));
    if !starts_tag {
        return None;
    }
    rest.find('>').map(|end| end + 1)
}

/// Parse a marker starting at `start`; returns the token and consumed bytes
fn parse_marker(input: &str, start: usize) -> Result<(Token, usize), DocumentError> {
    let mut pos = start + 1 + TAG.len();
    let mut id: Option<String> = None;
    let mut kind: Option<String> = None;
    let mut label: Option<String> = None;

    let self_closing = loop {
        pos = skip_whitespace(input, pos);
        let rest = &input[pos..];
        if rest.is_empty() {
            return Err(malformed(start, "unterminated token marker"));
        }
        if let Some(stripped) = rest.strip_prefix("/>") {
            pos = input.len() - stripped.len();
            break true;
        }
        if rest.starts_with('>') {
            pos += 1;
            break false;
        }

        let (name, value, next) = parse_attr(input, pos).ok_or_else(|| {
            malformed(pos, "invalid attribute in token marker")
        })?;
        pos = next;
        let slot = match name {
            "id" => &mut id,
            "kind" => &mut kind,
            "label" => &mut label,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    };

    let inner = if self_closing {
        None
    } else {
        let rest = &input[pos..];
        let end = rest
            .find(CLOSE_TAG)
            .ok_or_else(|| malformed(start, "token marker is never closed"))?;
        let inner = decode_text(&rest[..end]);
        pos += end + CLOSE_TAG.len();
        Some(inner)
    };

    let id = match id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(malformed(start, "token marker is missing an id")),
    };
    let kind = match kind.as_deref() {
        None => TokenKind::Position,
        Some(name) => name
            .parse::<TokenKind>()
            .map_err(|_| malformed(start, &format!("unknown token kind '{}'", name)))?,
    };
    let label = label.or(inner).unwrap_or_default();

    Ok((Token::new(id, kind, label), pos - start))
}

fn skip_whitespace(input: &str, mut pos: usize) -> usize {
    while let Some(ch) = input[pos..].chars().next() {
        if !ch.is_whitespace() {
            break;
        }
        pos += ch.len_utf8();
    }
    pos
}

/// Parse `name="value"`, `name='value'`, `name=value` or a bare `name`
fn parse_attr(input: &str, pos: usize) -> Option<(&str, String, usize)> {
    let rest = &input[pos..];
    let name_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':'))
        .unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }
    let name = &rest[..name_len];
    let mut cursor = skip_whitespace(input, pos + name_len);
    if !input[cursor..].starts_with('=') {
        return Some((name, String::new(), cursor));
    }
    cursor = skip_whitespace(input, cursor + 1);

    let rest = &input[cursor..];
    let quote = rest.chars().next()?;
    if quote == '"' || quote == '\'' {
        let end = rest[1..].find(quote)?;
        let value = decode_text(&rest[1..1 + end]);
        Some((name, value, cursor + end + 2))
    } else {
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        Some((name, decode_text(&rest[..end]), cursor + end))
    }
}

/// Decode entities in a run of text; unknown entities stay literal
fn decode_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pos = 0;
    while pos < raw.len() {
        let rest = &raw[pos..];
        if rest.starts_with('&') {
            if let Some((ch, len)) = decode_entity(rest) {
                out.push(ch);
                pos += len;
                continue;
            }
        }
        let ch = rest.chars().next().unwrap_or_default();
        out.push(ch);
        pos += ch.len_utf8();
    }
    out
}

/// Decode a single entity at the start of `rest`
fn decode_entity(rest: &str) -> Option<(char, usize)> {
    let end = rest.char_indices().take(12).find(|&(_, c)| c == ';')?.0;
    let name = &rest[1..end];
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some((ch, end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy() -> Token {
        Token::new("P_0001", TokenKind::Position, "Energy consumption")
    }

    #[test]
    fn test_write_marker_shape() {
        let out = write(&[Node::Text("total ".into()), Node::Token(energy())]);
        assert_eq!(
            out,
            "total <token-chip id=\"P_0001\" kind=\"position\" label=\"Energy consumption\">Energy consumption</token-chip>"
        );
    }

    #[test]
    fn test_write_escapes_operators() {
        let out = write(&[Node::Text("a & b < c > d".into())]);
        assert_eq!(out, "a &amp; b &lt; c &gt; d");
    }

    #[test]
    fn test_write_escapes_quotes_in_attributes() {
        let token = Token::new("X\"1", TokenKind::Impact, "say \"hi\" & <bye>");
        let out = write(&[Node::Token(token.clone())]);
        assert!(out.contains("id=\"X&quot;1\""));
        assert_eq!(parse(&out, UnknownTagPolicy::Reject).unwrap(), vec![Node::Token(token)]);
    }

    #[test]
    fn test_parse_self_closing_marker() {
        let nodes = parse(
            "<token-chip id='I_0001' kind=impact label=\"GHG Scope 1\"/> + 1",
            UnknownTagPolicy::Reject,
        )
        .unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Token(Token::new("I_0001", TokenKind::Impact, "GHG Scope 1")),
                Node::Text(" + 1".into()),
            ]
        );
    }

    #[test]
    fn test_parse_label_falls_back_to_inner_text() {
        let nodes = parse(
            "<token-chip id=\"P_0002\">Labour &amp; cost</token-chip>",
            UnknownTagPolicy::Reject,
        )
        .unwrap();
        assert_eq!(
            nodes,
            vec![Node::Token(Token::new(
                "P_0002",
                TokenKind::Position,
                "Labour & cost"
            ))]
        );
    }

    #[test]
    fn test_parse_ignores_extra_attributes() {
        let nodes = parse(
            "<token-chip class=\"chip\" id=\"P_0001\" kind=\"position\" label=\"Energy consumption\" contenteditable=\"false\"></token-chip>",
            UnknownTagPolicy::Reject,
        )
        .unwrap();
        assert_eq!(nodes, vec![Node::Token(energy())]);
    }

    #[test]
    fn test_parse_unknown_kind_is_malformed() {
        let err = parse(
            "x <token-chip id=\"A\" kind=\"cell\" label=\"A\">A</token-chip>",
            UnknownTagPolicy::PassThrough,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::MalformedDocument { offset: 2, .. }
        ));
    }

    #[test]
    fn test_parse_missing_id_is_malformed() {
        for input in [
            "<token-chip kind=\"impact\" label=\"x\">x</token-chip>",
            "<token-chip id=\"\" kind=\"impact\">x</token-chip>",
        ] {
            assert!(matches!(
                parse(input, UnknownTagPolicy::PassThrough),
                Err(DocumentError::MalformedDocument { .. })
            ));
        }
    }

    #[test]
    fn test_parse_unterminated_marker_is_malformed() {
        for input in [
            "<token-chip id=\"P_0001\"",
            "<token-chip id=\"P_0001\">Energy",
            "</token-chip>",
        ] {
            assert!(
                parse(input, UnknownTagPolicy::PassThrough).is_err(),
                "{input}"
            );
        }
    }

    #[test]
    fn test_unknown_tags_by_policy() {
        let input = "<p>a + b</p>";
        assert_eq!(
            parse(input, UnknownTagPolicy::PassThrough).unwrap(),
            vec![Node::Text("<p>a + b</p>".into())]
        );
        assert!(matches!(
            parse(input, UnknownTagPolicy::Reject),
            Err(DocumentError::MalformedDocument { offset: 0, .. })
        ));
    }

    #[test]
    fn test_lone_angle_brackets_are_text() {
        let nodes = parse("a < 3 & b > 2", UnknownTagPolicy::Reject).unwrap();
        assert_eq!(nodes, vec![Node::Text("a < 3 & b > 2".into())]);
    }

    #[test]
    fn test_numeric_entities() {
        let nodes = parse("&#8800; &#x2260; &bogus;", UnknownTagPolicy::Reject).unwrap();
        assert_eq!(nodes, vec![Node::Text("≠ ≠ &bogus;".into())]);
    }

    #[test]
    fn test_marker_prefix_of_longer_tag_is_not_a_marker() {
        let nodes = parse("<token-chips>", UnknownTagPolicy::PassThrough).unwrap();
        assert_eq!(nodes, vec![Node::Text("<token-chips>".into())]);
    }
}
