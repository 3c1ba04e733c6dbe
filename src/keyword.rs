//! The statement and pseudo-variable keywords (§2, §4.3), recognized the
//! same way `vcpu`'s `OpCode` mnemonics are: a fieldless enum deriving
//! [`util::EnumFromStr`].

use util::EnumFromStr;
use util_derive::EnumFromStr;

#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumFromStr)]
pub enum Keyword {
    GO,
    GOIF,
    JUMP,
    THROW,
    RETURN,
    HANDLE,
    LOAD,
    INTO,
}

/// Stream pseudo-variables (§2.4's `STDIN`/`STDOUT`/`STDERR`). Kept
/// separate from [`Keyword`] since they appear in variable position
/// (`IDENT`, `@IDENT`, `INTO IDENT`), not statement position.
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumFromStr)]
pub enum Stream {
    STDIN,
    STDOUT,
    STDERR,
}

pub const RESERVED_WORDS: &[&str] = &[
    "GO", "GOIF", "JUMP", "THROW", "RETURN", "HANDLE", "LOAD", "INTO", "TRUE", "FALSE", "MAIN",
    "STD", "ERROR", "STDIN", "STDOUT", "STDERR",
];

pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keyword_parses_case_sensitive_upper() {
        assert_eq!(EnumFromStr::from_str("JUMP"), Ok(Keyword::JUMP));
        assert!(<Keyword as EnumFromStr>::from_str("jump").is_err());
    }

    #[test]
    fn stream_parses() {
        assert_eq!(EnumFromStr::from_str("STDOUT"), Ok(Stream::STDOUT));
        assert!(<Stream as EnumFromStr>::from_str("STDOUT2").is_err());
    }

    #[test]
    fn reserved_words_cover_keywords_and_literals() {
        assert!(is_reserved("TRUE"));
        assert!(is_reserved("ERROR"));
        assert!(!is_reserved("X"));
    }
}
