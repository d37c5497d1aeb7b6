use lazy_static::lazy_static;
use std::collections::HashSet;

lazy_static! {
    static ref KEYWORDS: HashSet<&'static str> = [
        "int", "float", "bool", "string", "void", "if", "else", "switch", "main", "include",
        "true", "false",
    ]
    .iter()
    .copied()
    .collect();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Keyword,
    Operator,
    Delimiter,
    Comment,
    Eof,
}

/// One classified token. `line` is 1-based; `column` is the 0-based character
/// offset of the token's first character within its line. String tokens keep
/// their surrounding quotes in `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }
}

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(word)
}

/// Tokenize Crimson source into a flat token sequence terminated by a single
/// Eof token. Scanning is strictly line-oriented: strings and comments never
/// span lines, and an unclosed string runs to the end of its line.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut line_num = 1;

    for line in source.lines() {
        let chars: Vec<char> = line.chars().collect();
        let mut pos = 0;

        while pos < chars.len() {
            while pos < chars.len() && chars[pos].is_whitespace() {
                pos += 1;
            }
            if pos >= chars.len() {
                break;
            }

            let c = chars[pos];

            // Line comment swallows the remainder of the line.
            if c == '/' && chars.get(pos + 1) == Some(&'/') {
                tokens.push(Token::new(TokenKind::Comment, slice(&chars, pos, chars.len()), line_num, pos));
                break;
            }

            // Preprocessor-style directives become one keyword token.
            if c == '#' {
                tokens.push(Token::new(TokenKind::Keyword, slice(&chars, pos, chars.len()), line_num, pos));
                break;
            }

            if c == '"' {
                let start = pos;
                pos += 1;
                while pos < chars.len() && chars[pos] != '"' {
                    if chars[pos] == '\\' && pos + 1 < chars.len() {
                        // A backslash protects the next character from closing
                        // the string; the escape itself is not decoded.
                        pos += 2;
                    } else {
                        pos += 1;
                    }
                }
                if pos < chars.len() {
                    pos += 1; // closing quote
                }
                tokens.push(Token::new(TokenKind::String, slice(&chars, start, pos), line_num, start));
                continue;
            }

            if c.is_ascii_digit() || c == '.' {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                    pos += 1;
                }
                tokens.push(Token::new(TokenKind::Number, slice(&chars, start, pos), line_num, start));
                continue;
            }

            if c.is_ascii_alphabetic() || c == '_' {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_') {
                    pos += 1;
                }
                let word = slice(&chars, start, pos);
                let kind = if is_keyword(&word) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                };
                tokens.push(Token::new(kind, word, line_num, start));
                continue;
            }

            if matches!(c, '+' | '-' | '*' | '/' | '=' | '!' | '<' | '>' | '&' | '|') {
                let start = pos;
                pos += 1;
                if let Some(&next) = chars.get(pos) {
                    let double = matches!(
                        (c, next),
                        ('=', '=') | ('!', '=') | ('<', '=') | ('>', '=') | ('&', '&') | ('|', '|')
                    );
                    if double {
                        pos += 1;
                    }
                }
                tokens.push(Token::new(TokenKind::Operator, slice(&chars, start, pos), line_num, start));
                continue;
            }

            if matches!(c, '(' | ')' | '{' | '}' | ';' | ',') {
                tokens.push(Token::new(TokenKind::Delimiter, c.to_string(), line_num, pos));
                pos += 1;
                continue;
            }

            // Anything unrecognized is skipped without producing a token.
            pos += 1;
        }

        line_num += 1;
    }

    tokens.push(Token::new(TokenKind::Eof, "", line_num, 0));
    tokens
}

fn slice(chars: &[char], start: usize, end: usize) -> String {
    chars[start..end].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).iter().map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<String> {
        tokenize(source)
            .iter()
            .map(|t| t.text.clone())
            .collect()
    }

    #[test]
    fn classifies_declaration() {
        assert_eq!(
            kinds("int x = 5;"),
            vec![
                TokenKind::Keyword,
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Number,
                TokenKind::Delimiter,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn main_and_switch_are_keywords() {
        let tokens = tokenize("main switch foo");
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::Keyword);
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
    }

    #[test]
    fn merges_two_char_operators() {
        assert_eq!(
            texts("a == b != c <= d >= e && f || g"),
            vec!["a", "==", "b", "!=", "c", "<=", "d", ">=", "e", "&&", "f", "||", "g", ""]
        );
    }

    #[test]
    fn separated_operators_stay_single() {
        let tokens = tokenize("a < = b");
        assert_eq!(tokens[1].text, "<");
        assert_eq!(tokens[2].text, "=");
    }

    #[test]
    fn string_token_keeps_quotes() {
        let tokens = tokenize("crym(\"hi\");");
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].text, "\"hi\"");
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        let tokens = tokenize(r#""a\"b""#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, r#""a\"b""#);
    }

    #[test]
    fn unclosed_string_runs_to_end_of_line() {
        let tokens = tokenize("\"open\nint x;");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, "\"open");
        assert_eq!(tokens[1].text, "int");
    }

    #[test]
    fn comment_swallows_rest_of_line() {
        let tokens = tokenize("int x; // trailing words\nint y;");
        let comment = tokens.iter().find(|t| t.kind == TokenKind::Comment).unwrap();
        assert_eq!(comment.text, "// trailing words");
        assert!(tokens.iter().any(|t| t.text == "y"));
    }

    #[test]
    fn directive_is_one_keyword_token() {
        let tokens = tokenize("#include <iostream>");
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[0].text, "#include <iostream>");
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn number_permits_multiple_dots() {
        let tokens = tokenize("1.2.3");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].text, "1.2.3");
    }

    #[test]
    fn unknown_characters_are_skipped() {
        assert_eq!(texts("int @ x"), vec!["int", "x", ""]);
    }

    #[test]
    fn eof_line_is_line_count_plus_one() {
        let tokens = tokenize("int x;\nint y;\n");
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.line, 3);
        assert_eq!(eof.text, "");
        assert_eq!(eof.column, 0);
    }

    #[test]
    fn columns_are_per_line_offsets() {
        let tokens = tokenize("if (x)\n  crym(y);");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 0));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 3));
        assert_eq!((tokens[2].line, tokens[2].column), (1, 4));
        // Second line: indentation shifts columns, line restarts the offset.
        assert_eq!((tokens[4].line, tokens[4].column), (2, 2));
    }
}
