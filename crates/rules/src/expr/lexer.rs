//! Tokenizer for condition text.

use super::error::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    True,
    False,
    And,
    Or,
    Not,
    Bang,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
}

impl Token {
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("signal `{name}`"),
            Token::Int(i) => format!("integer {i}"),
            Token::Float(f) => format!("float {f}"),
            Token::Str(s) => format!("string {s:?}"),
            Token::True => "`true`".into(),
            Token::False => "`false`".into(),
            Token::And => "`and`".into(),
            Token::Or => "`or`".into(),
            Token::Not => "`not`".into(),
            Token::Bang => "`!`".into(),
            Token::EqEq => "`==`".into(),
            Token::NotEq => "`!=`".into(),
            Token::Lt => "`<`".into(),
            Token::Le => "`<=`".into(),
            Token::Gt => "`>`".into(),
            Token::Ge => "`>=`".into(),
            Token::Plus => "`+`".into(),
            Token::Minus => "`-`".into(),
            Token::Star => "`*`".into(),
            Token::Slash => "`/`".into(),
            Token::Percent => "`%`".into(),
            Token::LParen => "`(`".into(),
            Token::RParen => "`)`".into(),
        }
    }
}

/// A token with the byte offset it started at.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub offset: usize,
}

pub(crate) fn tokenize(src: &str) -> Result<Vec<Spanned>, ExprError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        let start = pos;

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let token = match c {
            b'(' => {
                pos += 1;
                Token::LParen
            }
            b')' => {
                pos += 1;
                Token::RParen
            }
            b'+' => {
                pos += 1;
                Token::Plus
            }
            b'-' => {
                pos += 1;
                Token::Minus
            }
            b'*' => {
                pos += 1;
                Token::Star
            }
            b'/' => {
                pos += 1;
                Token::Slash
            }
            b'%' => {
                pos += 1;
                Token::Percent
            }
            b'=' if peek(bytes, pos + 1) == Some(b'=') => {
                pos += 2;
                Token::EqEq
            }
            b'!' if peek(bytes, pos + 1) == Some(b'=') => {
                pos += 2;
                Token::NotEq
            }
            b'!' => {
                pos += 1;
                Token::Bang
            }
            b'<' if peek(bytes, pos + 1) == Some(b'=') => {
                pos += 2;
                Token::Le
            }
            b'<' => {
                pos += 1;
                Token::Lt
            }
            b'>' if peek(bytes, pos + 1) == Some(b'=') => {
                pos += 2;
                Token::Ge
            }
            b'>' => {
                pos += 1;
                Token::Gt
            }
            b'&' if peek(bytes, pos + 1) == Some(b'&') => {
                pos += 2;
                Token::And
            }
            b'|' if peek(bytes, pos + 1) == Some(b'|') => {
                pos += 2;
                Token::Or
            }
            b'"' | b'\'' => {
                let (text, end) = lex_string(src, pos)?;
                pos = end;
                Token::Str(text)
            }
            b'`' => {
                let (name, end) = lex_quoted_name(src, pos)?;
                pos = end;
                Token::Ident(name)
            }
            b'0'..=b'9' => {
                let (token, end) = lex_number(src, pos)?;
                pos = end;
                token
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while pos < bytes.len() && is_ident_continue(bytes[pos]) {
                    pos += 1;
                }
                keyword_or_ident(&src[start..pos])
            }
            _ => {
                let found = src[start..].chars().next().unwrap_or('\0');
                return Err(ExprError::UnexpectedChar {
                    found,
                    offset: start,
                });
            }
        };

        tokens.push(Spanned {
            token,
            offset: start,
        });
    }

    Ok(tokens)
}

fn peek(bytes: &[u8], pos: usize) -> Option<u8> {
    bytes.get(pos).copied()
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'.'
}

/// True if `name` lexes back as a single bare signal reference.
pub(crate) fn is_bare_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    let starts_ok = bytes
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == b'_');
    starts_ok
        && bytes.all(is_ident_continue)
        && matches!(keyword_or_ident(name), Token::Ident(_))
}

/// Both spellings of each combinator map to one token; `true`/`false`
/// normalize to 1/0 in the parser.
fn keyword_or_ident(word: &str) -> Token {
    match word {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "true" => Token::True,
        "false" => Token::False,
        _ => Token::Ident(word.to_string()),
    }
}

fn lex_string(src: &str, start: usize) -> Result<(String, usize), ExprError> {
    let mut chars = src[start..].char_indices();
    let (_, quote) = chars
        .next()
        .ok_or(ExprError::UnterminatedString { offset: start })?;
    let mut out = String::new();
    let mut escaped = false;

    for (i, c) in chars {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Ok((out, start + i + c.len_utf8()));
        } else {
            out.push(c);
        }
    }

    Err(ExprError::UnterminatedString { offset: start })
}

/// A signal name between backticks, for names outside `[A-Za-z0-9_.]`
/// such as `engine-temp`. No escapes; the name may not contain a backtick.
fn lex_quoted_name(src: &str, start: usize) -> Result<(String, usize), ExprError> {
    let body = &src[start + 1..];
    let Some(len) = body.find('`') else {
        return Err(ExprError::UnterminatedName { offset: start });
    };
    let name = &body[..len];
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == '=') {
        return Err(ExprError::InvalidName {
            name: name.to_string(),
            offset: start,
        });
    }
    Ok((name.to_string(), start + 1 + len + 1))
}

fn lex_number(src: &str, start: usize) -> Result<(Token, usize), ExprError> {
    let bytes = src.as_bytes();
    let mut pos = start;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }

    let is_float = peek(bytes, pos) == Some(b'.')
        && peek(bytes, pos + 1).is_some_and(|c| c.is_ascii_digit());
    if is_float {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
    }

    let text = &src[start..pos];
    let invalid = || ExprError::InvalidNumber {
        text: text.to_string(),
        offset: start,
    };
    let token = if is_float {
        Token::Float(text.parse().map_err(|_| invalid())?)
    } else {
        Token::Int(text.parse().map_err(|_| invalid())?)
    };
    Ok((token, pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        tokenize(src).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn dotted_identifiers() {
        assert_eq!(
            kinds("car.damage == true"),
            vec![Token::Ident("car.damage".into()), Token::EqEq, Token::True]
        );
    }

    #[test]
    fn both_spellings_share_tokens() {
        assert_eq!(kinds("a && b"), kinds("a and b"));
        assert_eq!(kinds("a || b"), kinds("a or b"));
    }

    #[test]
    fn numbers_and_strings() {
        assert_eq!(
            kinds("1 2.5 'front left' \"x\\\"y\""),
            vec![
                Token::Int(1),
                Token::Float(2.5),
                Token::Str("front left".into()),
                Token::Str("x\"y".into()),
            ]
        );
    }

    #[test]
    fn comparison_operators() {
        assert_eq!(
            kinds("< <= > >= != == !"),
            vec![
                Token::Lt,
                Token::Le,
                Token::Gt,
                Token::Ge,
                Token::NotEq,
                Token::EqEq,
                Token::Bang
            ]
        );
    }

    #[test]
    fn offsets_are_recorded() {
        let toks = tokenize("a  == 1").unwrap();
        assert_eq!(toks[1].offset, 3);
        assert_eq!(toks[2].offset, 6);
    }

    #[test]
    fn single_equals_is_rejected() {
        assert_eq!(
            tokenize("a = 1"),
            Err(ExprError::UnexpectedChar {
                found: '=',
                offset: 2
            })
        );
    }

    #[test]
    fn unterminated_string() {
        assert_eq!(
            tokenize("a == 'oops"),
            Err(ExprError::UnterminatedString { offset: 5 })
        );
    }

    #[test]
    fn hyphen_without_backticks_is_subtraction() {
        assert_eq!(
            kinds("engine-temp"),
            vec![
                Token::Ident("engine".into()),
                Token::Minus,
                Token::Ident("temp".into())
            ]
        );
    }

    #[test]
    fn backticks_quote_a_signal_name() {
        assert_eq!(
            kinds("`engine-temp` > 90"),
            vec![Token::Ident("engine-temp".into()), Token::Gt, Token::Int(90)]
        );
        assert_eq!(kinds("`and`"), vec![Token::Ident("and".into())]);
    }

    #[test]
    fn bad_quoted_names() {
        assert_eq!(
            tokenize("a + `oops"),
            Err(ExprError::UnterminatedName { offset: 4 })
        );
        assert!(matches!(
            tokenize("``"),
            Err(ExprError::InvalidName { offset: 0, .. })
        ));
        assert!(matches!(
            tokenize("`a b`"),
            Err(ExprError::InvalidName { .. })
        ));
    }

    #[test]
    fn bare_name_detection() {
        assert!(is_bare_name("car.damage"));
        assert!(is_bare_name("_x1"));
        assert!(!is_bare_name("engine-temp"));
        assert!(!is_bare_name("1st"));
        assert!(!is_bare_name("not"));
        assert!(!is_bare_name(""));
    }

    #[test]
    fn integer_overflow_is_invalid_number() {
        assert!(matches!(
            tokenize("99999999999999999999"),
            Err(ExprError::InvalidNumber { .. })
        ));
    }
}
