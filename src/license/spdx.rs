/// Tokens produced by [`tokenize`].
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Id(String),
    And,
    Or,
    With,
    LParen,
    RParen,
    /// Separator left by joined legacy license lists (`"MIT, ISC"`).
    Comma,
}

/// Tokenize an SPDX license expression such as `(MIT OR Apache-2.0) AND BSD-3-Clause`.
///
/// Operators are only recognised in upper case, as SPDX requires; `or` stays part of an id.
pub fn tokenize(expr: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        match c {
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            ',' => {
                tokens.push(Token::Comma);
                chars.next();
            }
            _ => {
                let mut s = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '(' | ')' | ',') {
                        break;
                    }
                    s.push(c);
                    chars.next();
                }
                let token = match s.as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "WITH" => Token::With,
                    _ => Token::Id(s),
                };
                tokens.push(token);
            }
        }
    }
    tokens
}

/// Free-text licenses that cannot be linked to a single SPDX page.
pub fn is_linkable(license: &str) -> bool {
    !(license == crate::models::UNKNOWN_LICENSE || license.starts_with("SEE LICENSE"))
}
