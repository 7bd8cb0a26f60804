//! Expression parser for calculator input.
//!
//! This module implements a recursive descent parser for a closed arithmetic
//! grammar. The syntax tree it produces has exactly three node kinds (number,
//! unary sign, binary operation), so anything outside the grammar is refused
//! while parsing and can never reach evaluation.
//!
//! # BNF Grammar
//!
//! ```bnf
//! Expression ::= Sum
//! Sum        ::= Term ( ( "+" | "-" ) Term )*
//! Term       ::= Factor ( ( "*" | "/" | "//" | "%" ) Factor )*
//! Factor     ::= ( "+" | "-" ) Factor | Power
//! Power      ::= Primary ( "**" Factor )?
//! Primary    ::= Number | "(" Expression ")"
//! Number     ::= Integer | Float
//! Integer    ::= "0" ( "_"? "0" )* | [1-9] ( "_"? [0-9] )*
//! Float      ::= Digits "." Digits? Exponent? | "." Digits Exponent? | Digits Exponent
//! Exponent   ::= ( "e" | "E" ) ( "+" | "-" )? Digits
//! Digits     ::= [0-9] ( "_"? [0-9] )*
//! ```
//!
//! Precedence and associativity:
//! - `+` and `-` have the lowest precedence
//! - `*`, `/`, `//` and `%` bind tighter
//! - Unary `+` and `-` bind tighter than any binary operator on their right
//! - `**` binds tighter than a unary sign on its left and is right-associative,
//!   so `-2**2` is `-(2**2)` and `2**-1` is `2**(-1)`
//! - Parentheses override precedence

use super::errors::Rejection;
use super::models::{MAX_INTEGER_DIGITS, Number};
use num_bigint::BigInt;
use std::fmt;

/// Inputs longer than this are refused outright. Leaves room for the longest
/// integer result, its sign and a short edit, so any result reads back.
pub const MAX_EXPRESSION_LEN: usize = MAX_INTEGER_DIGITS + 100;

/// Maximum nesting of parentheses, unary signs and powers.
pub const MAX_NESTING: usize = 200;

/// Represents a token in the expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(Number),
    Identifier(String),

    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    DoubleStar,

    LeftParen,
    RightParen,

    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {n}"),
            Token::Identifier(name) => write!(f, "name '{name}'"),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::DoubleSlash => f.write_str("'//'"),
            Token::Percent => f.write_str("'%'"),
            Token::DoubleStar => f.write_str("'**'"),
            Token::LeftParen => f.write_str("'('"),
            Token::RightParen => f.write_str("')'"),
            Token::Eof => f.write_str("end of expression"),
        }
    }
}

/// Represents an Abstract Syntax Tree node for expressions.
///
/// Runs of left-associative operators are kept flat in [`Expr::Chain`], so the
/// depth of a tree is bounded by [`MAX_NESTING`] however long the input is.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(Number),

    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
    },

    /// `first op rest[0] op rest[1] ...`, applied left to right. Holds
    /// operators of one precedence level, never `**`.
    Chain {
        first: Box<Expr>,
        rest: Vec<(BinaryOp, Expr)>,
    },

    /// Right-associative power.
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
    },
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{n}"),
            Expr::Unary { operator, operand } => write!(f, "({}{operand})", operator.symbol()),
            Expr::Chain { first, rest } => {
                for _ in rest {
                    f.write_str("(")?;
                }
                write!(f, "{first}")?;
                for (operator, operand) in rest {
                    write!(f, " {} {operand})", operator.symbol())?;
                }
                Ok(())
            }
            Expr::Binary { left, operator, right } => {
                write!(f, "({left} {} {right})", operator.symbol())
            }
        }
    }
}

/// The seven permitted binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulo,
    Power,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::FloorDivide => "//",
            BinaryOp::Modulo => "%",
            BinaryOp::Power => "**",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
        }
    }
}

/// Lexical analyzer for tokenizing expressions.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    /// Creates a new lexer for the given input string.
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

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
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

    /// Reads a run of digits into `text`, dropping single `_` group
    /// separators between digits.
    fn read_digits(&mut self, text: &mut String) -> Result<(), Rejection> {
        let mut after_digit = false;

        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                text.push(ch);
                after_digit = true;
                self.advance();
            } else if ch == '_' && after_digit {
                if !self.peek(1).is_some_and(|next| next.is_ascii_digit()) {
                    text.push('_');
                    return Err(Rejection::MalformedNumber(text.clone()));
                }
                after_digit = false;
                self.advance();
            } else {
                break;
            }
        }

        Ok(())
    }

    /// True when the current `e`/`E` starts an exponent rather than a name.
    fn exponent_follows(&self) -> bool {
        match self.peek(1) {
            Some(ch) if ch.is_ascii_digit() => true,
            Some('+' | '-') => self.peek(2).is_some_and(|ch| ch.is_ascii_digit()),
            _ => false,
        }
    }

    /// Reads an integer or float literal.
    fn read_number(&mut self) -> Result<Number, Rejection> {
        let mut text = String::new();
        let mut is_float = false;

        self.read_digits(&mut text)?;

        if self.current_char == Some('.') {
            is_float = true;
            text.push('.');
            self.advance();
            self.read_digits(&mut text)?;
        }

        if matches!(self.current_char, Some('e' | 'E')) && self.exponent_follows() {
            is_float = true;
            text.push('e');
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.current_char {
                text.push(sign);
                self.advance();
            }
            self.read_digits(&mut text)?;
        }

        if is_float {
            return text
                .parse::<f64>()
                .map(Number::Float)
                .map_err(|_| Rejection::MalformedNumber(text));
        }

        // Leading zeros are only legal on zero itself.
        if text.len() > 1 && text.starts_with('0') && text.bytes().any(|b| b != b'0') {
            return Err(Rejection::MalformedNumber(text));
        }
        text.parse::<BigInt>()
            .map(Number::Integer)
            .map_err(|_| Rejection::MalformedNumber(text))
    }

    fn read_identifier(&mut self) -> String {
        let mut identifier = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        identifier
    }

    /// Reads a run of operator characters that have no place in the grammar.
    fn read_foreign_operator(&mut self) -> String {
        let mut operator = String::new();

        while let Some(ch) = self.current_char {
            if "<>=!&|^~@".contains(ch) {
                operator.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        operator
    }

    /// Gets the next token from the input.
    pub fn next_token(&mut self) -> Result<Token, Rejection> {
        self.skip_whitespace();

        let Some(ch) = self.current_char else {
            return Ok(Token::Eof);
        };

        match ch {
            '0'..='9' => Ok(Token::Number(self.read_number()?)),

            '.' if self.peek(1).is_some_and(|next| next.is_ascii_digit()) => {
                Ok(Token::Number(self.read_number()?))
            }

            c if c.is_alphabetic() || c == '_' => Ok(Token::Identifier(self.read_identifier())),

            '+' => {
                self.advance();
                Ok(Token::Plus)
            }

            '-' => {
                self.advance();
                Ok(Token::Minus)
            }

            '*' => {
                self.advance();
                if self.current_char == Some('*') {
                    self.advance();
                    Ok(Token::DoubleStar)
                } else {
                    Ok(Token::Star)
                }
            }

            '/' => {
                self.advance();
                if self.current_char == Some('/') {
                    self.advance();
                    Ok(Token::DoubleSlash)
                } else {
                    Ok(Token::Slash)
                }
            }

            '%' => {
                self.advance();
                Ok(Token::Percent)
            }

            '(' => {
                self.advance();
                Ok(Token::LeftParen)
            }

            ')' => {
                self.advance();
                Ok(Token::RightParen)
            }

            '<' | '>' | '=' | '!' | '&' | '|' | '^' | '~' | '@' => {
                Err(Rejection::OperatorNotAllowed(self.read_foreign_operator()))
            }

            ':' if self.peek(1) == Some('=') => Err(Rejection::OperatorNotAllowed(":=".to_string())),
            ':' => Err(Rejection::ConstructNotAllowed("slices and annotations")),
            '\'' | '"' => Err(Rejection::ConstructNotAllowed("strings")),
            '[' | ']' => Err(Rejection::ConstructNotAllowed("lists and subscripts")),
            '{' | '}' => Err(Rejection::ConstructNotAllowed("dicts and sets")),
            ',' => Err(Rejection::ConstructNotAllowed("tuples")),
            '.' => Err(Rejection::ConstructNotAllowed("attribute lookups")),
            ';' => Err(Rejection::ConstructNotAllowed("multiple statements")),

            other => Err(Rejection::UnexpectedCharacter(other)),
        }
    }
}

/// Recursive descent parser for calculator expressions.
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    depth: usize,
}

impl Parser {
    /// Creates a new parser for the given expression.
    pub fn new(input: &str) -> Result<Self, Rejection> {
        if input.len() > MAX_EXPRESSION_LEN {
            return Err(Rejection::TooLong(MAX_EXPRESSION_LEN));
        }

        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token()?;

        Ok(Self {
            lexer,
            current_token,
            depth: 0,
        })
    }

    fn advance(&mut self) -> Result<(), Rejection> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn unexpected(&self, expected: &'static str) -> Rejection {
        match self.current_token {
            Token::Eof => Rejection::UnexpectedEnd,
            ref found => Rejection::UnexpectedToken {
                found: found.to_string(),
                expected,
            },
        }
    }

    fn expect(&mut self, expected: Token, description: &'static str) -> Result<(), Rejection> {
        if self.current_token == expected {
            self.advance()
        } else {
            Err(self.unexpected(description))
        }
    }

    /// Runs `parse` one nesting level deeper, refusing to go past [`MAX_NESTING`].
    fn nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<Expr, Rejection>,
    ) -> Result<Expr, Rejection> {
        if self.depth >= MAX_NESTING {
            return Err(Rejection::TooDeeplyNested(MAX_NESTING));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parses the whole input as a single expression.
    pub fn parse(&mut self) -> Result<Expr, Rejection> {
        if self.current_token == Token::Eof {
            return Err(Rejection::Empty);
        }

        let expr = self.parse_sum()?;

        if self.current_token != Token::Eof {
            return Err(self.unexpected("an operator or end of expression"));
        }

        Ok(expr)
    }

    /// Parses addition and subtraction expressions.
    fn parse_sum(&mut self) -> Result<Expr, Rejection> {
        let first = self.parse_term()?;
        let mut rest = Vec::new();

        loop {
            let op = match self.current_token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance()?;
            rest.push((op, self.parse_term()?));
        }

        Ok(Self::chain(first, rest))
    }

    /// Parses multiplication, division, floor division and modulo expressions.
    fn parse_term(&mut self) -> Result<Expr, Rejection> {
        let first = self.parse_factor()?;
        let mut rest = Vec::new();

        loop {
            let op = match self.current_token {
                Token::Star => BinaryOp::Multiply,
                Token::Slash => BinaryOp::Divide,
                Token::DoubleSlash => BinaryOp::FloorDivide,
                Token::Percent => BinaryOp::Modulo,
                _ => break,
            };
            self.advance()?;
            rest.push((op, self.parse_factor()?));
        }

        Ok(Self::chain(first, rest))
    }

    fn chain(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
        if rest.is_empty() {
            first
        } else {
            Expr::Chain {
                first: Box::new(first),
                rest,
            }
        }
    }

    /// Parses unary sign expressions.
    fn parse_factor(&mut self) -> Result<Expr, Rejection> {
        let operator = match self.current_token {
            Token::Plus => UnaryOp::Plus,
            Token::Minus => UnaryOp::Minus,
            _ => return self.parse_power(),
        };
        self.advance()?;
        let operand = self.nested(Self::parse_factor)?;
        Ok(Expr::Unary {
            operator,
            operand: Box::new(operand),
        })
    }

    /// Parses power expressions (right-associative).
    fn parse_power(&mut self) -> Result<Expr, Rejection> {
        let base = self.parse_primary()?;

        if self.current_token == Token::DoubleStar {
            self.advance()?;
            let exponent = self.nested(Self::parse_factor)?;
            Ok(Expr::Binary {
                left: Box::new(base),
                operator: BinaryOp::Power,
                right: Box::new(exponent),
            })
        } else {
            Ok(base)
        }
    }

    /// Parses primary expressions (highest precedence).
    fn parse_primary(&mut self) -> Result<Expr, Rejection> {
        let (expr, callee) = match &self.current_token {
            Token::Number(value) => {
                let value = value.clone();
                self.advance()?;
                let callee = value.to_string();
                (Expr::Number(value), callee)
            }

            Token::Identifier(name) => {
                let name = name.clone();
                self.advance()?;
                return Err(if self.current_token == Token::LeftParen {
                    Rejection::CallNotAllowed(name)
                } else {
                    Rejection::NameNotAllowed(name)
                });
            }

            Token::LeftParen => {
                self.advance()?;
                let expr = self.nested(Self::parse_sum)?;
                self.expect(Token::RightParen, "')'")?;
                (expr, "(...)".to_string())
            }

            _ => return Err(self.unexpected("a number or '('")),
        };

        // Anything immediately followed by an argument list is a call.
        if self.current_token == Token::LeftParen {
            return Err(Rejection::CallNotAllowed(callee));
        }

        Ok(expr)
    }
}
