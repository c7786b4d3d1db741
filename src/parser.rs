//! Text notation ("mots codés") to [`Model`].
//!
//! ```text
//! # entities
//! Client: id INT pk, nom VARCHAR(100) not null
//! Produit: id INT pk, prix DECIMAL(8,2) default 0
//! # association with cardinalities and its own attributes
//! Achete, 0N Client, 1N Produit: quantite INT
//! # inheritance
//! Pro extends Client
//! ```

use crate::lexer::{LexError, Lexer, Spanned, Token};
use crate::model::{Association, AssociationLink, Attribute, Entity, InheritanceLink, Model};
use crate::transform::DEFAULT_TYPE;

/// Cardinality used when a link names none.
const DEFAULT_CARD: &str = "1,n";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("line {line}: unexpected token {found:?}, expected {expected}")]
    Unexpected {
        found: Token,
        expected: &'static str,
        line: usize,
    },
}

pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self { tokens, pos: 0 })
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).map(|s| &s.token).unwrap_or(&Token::Eof)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|s| s.line)
            .unwrap_or(1)
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        self.pos += 1;
        tok
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        ParseError::Unexpected {
            found: self.peek().clone(),
            expected,
            line: self.line(),
        }
    }

    fn expect_ident(&mut self, expected: &'static str) -> Result<String, ParseError> {
        match self.peek() {
            Token::Ident(_) => match self.advance() {
                Token::Ident(s) => Ok(s),
                _ => Err(self.unexpected(expected)),
            },
            _ => Err(self.unexpected(expected)),
        }
    }

    fn expect(&mut self, expected: Token, what: &'static str) -> Result<(), ParseError> {
        if *self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    /// Case-insensitive keyword check.
    fn check_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Token::Ident(s) if s.eq_ignore_ascii_case(keyword))
    }

    fn at_line_end(&self) -> bool {
        matches!(self.peek(), Token::Newline | Token::Eof)
    }

    fn end_line(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Token::Newline => {
                self.advance();
                Ok(())
            }
            Token::Eof => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    pub fn parse(&mut self) -> Result<Model, ParseError> {
        let mut model = Model::default();

        loop {
            while *self.peek() == Token::Newline {
                self.advance();
            }
            if *self.peek() == Token::Eof {
                break;
            }

            let name = self.expect_ident("entity or association name")?;
            match self.peek() {
                Token::Colon => {
                    self.advance();
                    let attributes = self.parse_attributes()?;
                    model.entities.push(Entity::new(name, attributes));
                }
                Token::Newline | Token::Eof => model.entities.push(Entity::new(name, vec![])),
                Token::Comma => self.parse_association(name, &mut model)?,
                Token::Ident(_) if self.check_keyword("extends") => {
                    self.advance();
                    let parent = self.expect_ident("parent entity")?;
                    model.inheritance_links.push(InheritanceLink::new(parent, name));
                }
                _ => return Err(self.unexpected("':', ',' or 'extends'")),
            }
            self.end_line()?;
        }

        Ok(model)
    }

    /// `Name, 11 Entity, 0N Entity[: attributes]` after the name.
    fn parse_association(&mut self, name: String, model: &mut Model) -> Result<(), ParseError> {
        while *self.peek() == Token::Comma {
            self.advance();
            let card = match self.peek().clone() {
                Token::Card(card) => {
                    self.advance();
                    card
                }
                _ => DEFAULT_CARD.to_string(),
            };
            let entity = self.expect_ident("linked entity")?;
            model
                .association_links
                .push(AssociationLink::new(name.clone(), entity, &card));
        }

        let attributes = if *self.peek() == Token::Colon {
            self.advance();
            self.parse_attributes()?
        } else {
            Vec::new()
        };
        model.associations.push(Association::new(name, attributes));
        Ok(())
    }

    fn parse_attributes(&mut self) -> Result<Vec<Attribute>, ParseError> {
        let mut attributes = Vec::new();
        if self.at_line_end() {
            return Ok(attributes);
        }
        loop {
            attributes.push(self.parse_attribute()?);
            if *self.peek() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }
        Ok(attributes)
    }

    /// `name [TYPE[(args)]] [pk] [unique] [not null] [default VALUE]`
    fn parse_attribute(&mut self) -> Result<Attribute, ParseError> {
        let name = self.expect_ident("attribute name")?;
        let typ = match self.peek() {
            Token::Ident(_) if !self.at_modifier() => self.parse_type()?,
            _ => DEFAULT_TYPE.to_string(),
        };
        let mut attr = Attribute::new(name, typ);

        while let Token::Ident(word) = self.peek().clone() {
            self.advance();
            match word.to_lowercase().as_str() {
                "pk" => attr.is_primary_key = true,
                "primary" => {
                    if !self.check_keyword("key") {
                        return Err(self.unexpected("'key'"));
                    }
                    self.advance();
                    attr.is_primary_key = true;
                }
                "unique" => attr.is_unique = true,
                "not" => {
                    if !self.check_keyword("null") {
                        return Err(self.unexpected("'null'"));
                    }
                    self.advance();
                    attr.is_not_null = true;
                }
                "default" => attr.default_value = Some(self.parse_value()?),
                _ => {
                    self.pos -= 1;
                    return Err(self.unexpected("attribute modifier"));
                }
            }
        }
        Ok(attr)
    }

    fn at_modifier(&self) -> bool {
        ["pk", "primary", "unique", "not", "default"]
            .iter()
            .any(|k| self.check_keyword(k))
    }

    /// `VARCHAR`, `DECIMAL(8,2)`, `ENUM('a','b')`, rebuilt as a string.
    fn parse_type(&mut self) -> Result<String, ParseError> {
        let mut typ = self.expect_ident("type")?;
        // Multi-word names: `DOUBLE PRECISION`.
        while matches!(self.peek(), Token::Ident(_)) && !self.at_modifier() {
            if let Token::Ident(word) = self.advance() {
                typ.push(' ');
                typ.push_str(&word);
            }
        }
        if *self.peek() != Token::LParen {
            return Ok(typ);
        }
        self.advance();

        let mut args = Vec::new();
        loop {
            let arg = match self.peek().clone() {
                Token::Num(n) | Token::Card(n) => n,
                Token::Ident(s) => s,
                Token::Str(s) => format!("'{}'", s.replace('\'', "''")),
                _ => return Err(self.unexpected("type argument")),
            };
            self.advance();
            args.push(arg);
            if *self.peek() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(Token::RParen, "')'")?;

        typ.push('(');
        typ.push_str(&args.join(","));
        typ.push(')');
        Ok(typ)
    }

    fn parse_value(&mut self) -> Result<String, ParseError> {
        match self.peek().clone() {
            Token::Num(v) | Token::Card(v) | Token::Ident(v) => {
                self.advance();
                Ok(v)
            }
            Token::Str(s) => {
                self.advance();
                Ok(format!("'{}'", s.replace('\'', "''")))
            }
            _ => Err(self.unexpected("default value")),
        }
    }
}

/// Parse a whole document.
pub fn parse_notation(input: &str) -> Result<Model, ParseError> {
    Parser::new(input)?.parse()
}
