use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Str(String),
    /// Integer or decimal literal, kept as written.
    Num(String),
    /// Compact cardinality: `01`, `11`, `0N`, `1N`.
    Card(String),

    Colon,   // :
    Comma,   // ,
    LParen,  // (
    RParen,  // )
    Newline, // \n

    Eof,
}

/// A token and the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("line {line}: unexpected character {ch:?}")]
    UnexpectedChar { ch: char, line: usize },
    #[error("line {line}: unterminated string")]
    UnterminatedString { line: usize },
    #[error("line {line}: invalid number {text:?}")]
    InvalidNumber { text: String, line: usize },
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
        }
    }

    /// Skip blanks and `#` comments, stopping at newlines.
    fn skip_blanks_and_comments(&mut self) {
        loop {
            match self.chars.peek() {
                Some('\n') => break,
                Some(c) if c.is_whitespace() => {
                    self.chars.next();
                }
                Some('#') => {
                    while let Some(&c) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.chars.next();
                    }
                }
                _ => break,
            }
        }
    }

    fn read_word(&mut self, first: char) -> String {
        let mut s = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let mut s = String::new();
        loop {
            match self.chars.next() {
                // A doubled quote stands for itself.
                Some(c) if c == quote => {
                    if self.chars.peek() == Some(&quote) {
                        self.chars.next();
                        s.push(quote);
                    } else {
                        return Ok(s);
                    }
                }
                Some('\n') | None => return Err(LexError::UnterminatedString { line: self.line }),
                Some(c) => s.push(c),
            }
        }
    }

    /// A word starting with a digit: a cardinality (`0N`) or a number
    /// (`100`, `-1`, `3.5`).
    fn read_numeric(&mut self, first: char, negative: bool) -> Result<Token, LexError> {
        let word = self.read_word(first);
        let is_card =
            word.len() == 2 && matches!(word.as_bytes(), [b'0' | b'1', b'1' | b'n' | b'N']);
        if is_card && !negative && self.chars.peek() != Some(&'.') {
            return Ok(Token::Card(word));
        }

        let mut text = if negative { format!("-{}", word) } else { word };
        if self.chars.peek() == Some(&'.') {
            self.chars.next();
            text.push('.');
            while let Some(&c) = self.chars.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.chars.next();
                } else {
                    break;
                }
            }
        }

        let digits = text.trim_start_matches('-');
        if digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
            Ok(Token::Num(text))
        } else {
            Err(LexError::InvalidNumber { text, line: self.line })
        }
    }

    pub fn next_token(&mut self) -> Result<Spanned, LexError> {
        self.skip_blanks_and_comments();
        let line = self.line;

        let c = match self.chars.next() {
            Some(c) => c,
            None => return Ok(Spanned { token: Token::Eof, line }),
        };

        let token = match c {
            '\n' => {
                self.line += 1;
                Token::Newline
            }
            ':' => Token::Colon,
            ',' => Token::Comma,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '\'' | '"' => Token::Str(self.read_string(c)?),
            '-' => match self.chars.next() {
                Some(d) if d.is_ascii_digit() => self.read_numeric(d, true)?,
                _ => return Err(LexError::UnexpectedChar { ch: '-', line }),
            },
            c if c.is_ascii_digit() => self.read_numeric(c, false)?,
            c if c.is_alphabetic() || c == '_' => Token::Ident(self.read_word(c)),
            _ => return Err(LexError::UnexpectedChar { ch: c, line }),
        };

        Ok(Spanned { token, line })
    }

    pub fn tokenize(mut self) -> Result<Vec<Spanned>, LexError> {
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
