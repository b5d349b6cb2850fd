//! Tokenizer for docql query text.

use crate::error::{DocqlError, DocqlResult};

/// Longest slice of source text quoted back in a grammar error.
const FRAGMENT_LEN: usize = 24;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Select,
    From,
    Where,
    Order,
    By,
    Asc,
    Desc,
    Skip,
    Limit,
    And,
    Or,
    Not,
    In,
    Like,
    Between,
    True,
    False,

    // Identifiers and literals
    Identifier(String),
    BindVar(String), // @name
    Integer(i64),
    Float(f64),
    String(String),

    // Operators
    Equal,         // = or ==
    LessThan,      // <
    LessThanEq,    // <=
    GreaterThan,   // >
    GreaterThanEq, // >=
    Minus,         // -
    Star,          // *

    // Delimiters
    Dot,          // .
    Comma,        // ,
    Colon,        // :
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    LeftParen,    // (
    RightParen,   // )

    Eof,
}

/// A token together with the character offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub offset: usize,
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            input: chars,
            position: 0,
            current_char,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    /// Source text starting at `offset`, cut to a readable length.
    pub fn fragment(&self, offset: usize) -> String {
        fragment_of(&self.input, offset)
    }

    fn error(&self, message: impl Into<String>, offset: usize) -> DocqlError {
        DocqlError::grammar(message, self.fragment(offset))
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> DocqlResult<Token> {
        let start = self.position;
        let mut num_str = String::new();
        let mut has_dot = false;

        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else if ch == '.' && !has_dot && self.peek_char().is_some_and(|c| c.is_ascii_digit())
            {
                has_dot = true;
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // "12abc" or "1.5x" is a malformed number, not a number followed by a name
        if self
            .current_char
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            return Err(self.error("Malformed number", start));
        }

        if has_dot {
            num_str
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| self.error(format!("Invalid float number: {}", num_str), start))
        } else {
            num_str
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| self.error(format!("Invalid integer number: {}", num_str), start))
        }
    }

    fn read_string(&mut self, quote: char) -> DocqlResult<Token> {
        let start = self.position;
        self.advance(); // Skip opening quote

        let mut string = String::new();

        while let Some(ch) = self.current_char {
            if ch == quote {
                self.advance(); // Skip closing quote
                return Ok(Token::String(string));
            } else if ch == '\\' {
                self.advance();
                if let Some(escaped) = self.current_char {
                    string.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        _ => escaped,
                    });
                    self.advance();
                }
            } else {
                string.push(ch);
                self.advance();
            }
        }

        Err(self.error("Unterminated string", start))
    }

    fn read_quoted_identifier(&mut self) -> DocqlResult<Token> {
        let start = self.position;
        self.advance(); // Skip opening backtick

        let mut ident = String::new();

        while let Some(ch) = self.current_char {
            if ch == '`' {
                self.advance();
                return Ok(Token::Identifier(ident));
            }
            ident.push(ch);
            self.advance();
        }

        Err(self.error("Unterminated quoted identifier", start))
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        word
    }

    fn read_identifier(&mut self) -> Token {
        let ident = self.read_word();

        match ident.to_uppercase().as_str() {
            "SELECT" => Token::Select,
            "FROM" => Token::From,
            "WHERE" => Token::Where,
            "ORDER" => Token::Order,
            "BY" => Token::By,
            "ASC" => Token::Asc,
            "DESC" => Token::Desc,
            "SKIP" => Token::Skip,
            "LIMIT" => Token::Limit,
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            "IN" => Token::In,
            "LIKE" => Token::Like,
            "BETWEEN" => Token::Between,
            "TRUE" => Token::True,
            "FALSE" => Token::False,
            _ => Token::Identifier(ident),
        }
    }

    fn read_bind_var(&mut self) -> DocqlResult<Token> {
        let start = self.position;
        self.advance(); // Skip '@'

        let name = self.read_word();
        if name.is_empty() {
            return Err(self.error("Expected parameter name after '@'", start));
        }

        Ok(Token::BindVar(name))
    }

    pub fn next_token(&mut self) -> DocqlResult<SpannedToken> {
        self.skip_whitespace();
        let offset = self.position;

        let token = match self.current_char {
            None => Token::Eof,
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(quote @ ('"' | '\'')) => self.read_string(quote)?,
            Some('`') => self.read_quoted_identifier()?,
            Some(ch) if ch.is_alphabetic() || ch == '_' => self.read_identifier(),
            Some('@') => self.read_bind_var()?,
            Some('=') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                }
                Token::Equal
            }
            Some('<') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::LessThanEq
                } else {
                    Token::LessThan
                }
            }
            Some('>') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::GreaterThanEq
                } else {
                    Token::GreaterThan
                }
            }
            Some(ch) => {
                let token = match ch {
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '.' => Token::Dot,
                    ',' => Token::Comma,
                    ':' => Token::Colon,
                    '{' => Token::LeftBrace,
                    '}' => Token::RightBrace,
                    '[' => Token::LeftBracket,
                    ']' => Token::RightBracket,
                    '(' => Token::LeftParen,
                    ')' => Token::RightParen,
                    _ => {
                        return Err(self.error(format!("Unexpected character '{}'", ch), offset));
                    }
                };
                self.advance();
                token
            }
        };

        Ok(SpannedToken { token, offset })
    }

    pub fn tokenize(&mut self) -> DocqlResult<Vec<SpannedToken>> {
        let mut tokens = Vec::new();

        loop {
            let spanned = self.next_token()?;
            let done = spanned.token == Token::Eof;
            tokens.push(spanned);
            if done {
                break;
            }
        }

        Ok(tokens)
    }
}

pub(crate) fn fragment_of(input: &[char], offset: usize) -> String {
    let fragment: String = input.iter().skip(offset).take(FRAGMENT_LEN).collect();
    if fragment.is_empty() {
        "<end of query>".to_string()
    } else {
        fragment
    }
}
