//! Splits one already string-preserved source line into [`Token`]s.
//!
//! Case folding, comment stripping, and string preservation ([`crate::strings`])
//! all happen before a line reaches this module; the lexer itself only has to
//! worry about identifiers, integer literals, string sigils, and punctuation.

use crate::strings::parse_sigil;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Ident(String),
    Int(i64),
    StrSigil(u32),
    /// An operator or structural symbol: `( ) , : ^ ~ @ ? & | ! < > <= >= ==
    /// != + - * / \ #`.
    Symbol(String),
}

/// Multi-character symbols must be tried before their single-character
/// prefixes, or `<=` would lex as `<` followed by a stray `=`.
const MULTI_CHAR_SYMBOLS: &[&str] = &["<=", ">=", "==", "!="];
const SINGLE_CHAR_SYMBOLS: &[char] = &[
    '(', ')', ',', ':', '^', '~', '@', '?', '&', '|', '!', '<', '>', '+', '-', '*', '/', '\\', '#',
];

/// Strips a `%`-to-end-of-line comment. Safe to call after string
/// preservation: any literal `%` inside a string literal has already been
/// pulled into the string table and replaced by a digit-only sigil.
pub fn strip_comment(line: &str) -> &str {
    match line.find('%') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Tokenizes one line. Returns an error message (not a [`crate::error::CompileError`]
/// yet — the caller attaches the source location) on an unrecognized character.
pub fn tokenize(line: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '"' {
            let rest: String = chars[i..].iter().collect();
            match parse_sigil(&rest) {
                Some((key, consumed)) => {
                    tokens.push(Token::StrSigil(key));
                    i += consumed;
                }
                None => return Err(format!("Malformed string sigil at column {}", i)),
            }
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<i64>()
                .map_err(|_| format!("Integer literal '{}' out of range", text))?;
            tokens.push(Token::Int(value));
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            // Labels may contain '.' (§4.2's `IDENT` = `[A-Z0-9_.]+`), so a
            // reference to one (`GO A.B`) must lex as a single identifier
            // the same way the label's own definition line is validated.
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            tokens.push(Token::Ident(text));
            continue;
        }

        let remainder: String = chars[i..].iter().collect();
        if let Some(sym) = MULTI_CHAR_SYMBOLS.iter().find(|s| remainder.starts_with(**s)) {
            tokens.push(Token::Symbol(sym.to_string()));
            i += sym.chars().count();
            continue;
        }

        if SINGLE_CHAR_SYMBOLS.contains(&c) {
            tokens.push(Token::Symbol(c.to_string()));
            i += 1;
            continue;
        }

        return Err(format!("Unrecognized character '{}' at column {}", c, i));
    }

    Ok(tokens)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strips_trailing_comment() {
        assert_eq!(strip_comment("X INTO Y % set Y"), "X INTO Y ");
    }

    #[test]
    fn comment_marker_inside_sigil_survives() {
        assert_eq!(strip_comment("\"0\" INTO Y"), "\"0\" INTO Y");
    }

    #[test]
    fn tokenizes_mixed_line() {
        let toks = tokenize("X INTO Y#1").unwrap();
        assert_eq!(
            toks,
            vec![
                Token::Ident("X".into()),
                Token::Ident("INTO".into()),
                Token::Ident("Y".into()),
                Token::Symbol("#".into()),
                Token::Int(1),
            ]
        );
    }

    #[test]
    fn multi_char_symbol_wins_over_prefix() {
        let toks = tokenize("X<=Y").unwrap();
        assert_eq!(
            toks,
            vec![
                Token::Ident("X".into()),
                Token::Symbol("<=".into()),
                Token::Ident("Y".into()),
            ]
        );
    }

    #[test]
    fn string_sigil_lexes_as_one_token() {
        let toks = tokenize("\"3\" ^ \"4\"").unwrap();
        assert_eq!(
            toks,
            vec![
                Token::StrSigil(3),
                Token::Symbol("^".into()),
                Token::StrSigil(4),
            ]
        );
    }

    #[test]
    fn dotted_label_reference_lexes_as_one_identifier() {
        let toks = tokenize("GO A.B").unwrap();
        assert_eq!(
            toks,
            vec![Token::Ident("GO".into()), Token::Ident("A.B".into())]
        );
    }

    #[test]
    fn unrecognized_character_is_an_error() {
        assert!(tokenize("X $ Y").is_err());
    }
}
