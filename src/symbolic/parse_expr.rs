use crate::symbolic::symbolic_engine::{BinaryOp, Expr, Func, UnaryOp, VARIABLE_X, VARIABLE_Y};
use log::debug;
use std::fmt;
use std::str::FromStr;
/// a module turns a String expression into a symbolic expression
///# Example
/// ```
/// use MathCanvas::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("2x^2 + sin(x)").unwrap();
/// assert_eq!(parsed_expression.to_string(), "((2 * (x ^ 2)) + sin(x))");
/// ```
//                  grammar, lowest precedence first
//
//   expression := term (('+' | '-') term)*
//   term       := unary (('*' | '/') unary)*
//   unary      := ('-' | '+') unary | power
//   power      := implicit (('^' | '**') unary)?          right-associative
//   implicit   := atom | NUMBER (IDENT | '(') power        2x, 2(x+1), 3sin(x)
//   atom       := NUMBER | VARIABLE | CONSTANT | FUNC '(' args ')' | '(' expression ')'
//
// The identifier namespace is closed: x, y, pi, e and the Func whitelist.

/// Deeper nesting than this is rejected instead of risking stack exhaustion.
/// It also bounds the nesting of an accepted tree's printed form, so anything
/// `parse` accepts reads back from its own `Display` output.
pub const MAX_DEPTH: usize = 256;

/// Tallest expression tree `parse` builds. Long operator chains such as
/// `x + x + ... + x` grow the tree without nesting, and every later tree walk
/// recurses once per level.
pub const MAX_HEIGHT: usize = 1024;

/// An expression together with its tree height.
type Parsed = (Expr, usize);

#[derive(Debug, Clone, PartialEq)]
pub enum ParseReason {
    EmptyInput,
    UnexpectedChar(char),
    UnexpectedToken(String),
    UnexpectedEnd,
    UnclosedParen,
    UnknownIdentifier(String),
    MissingCallParen(Func),
    WrongArity {
        func: Func,
        expected: usize,
        found: usize,
    },
    NumberOutOfRange(String),
    TooDeep,
}

impl fmt::Display for ParseReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseReason::EmptyInput => write!(f, "empty expression"),
            ParseReason::UnexpectedChar(c) => write!(f, "unexpected character '{}'", c),
            ParseReason::UnexpectedToken(t) => write!(f, "unexpected token '{}'", t),
            ParseReason::UnexpectedEnd => write!(f, "unexpected end of expression"),
            ParseReason::UnclosedParen => write!(f, "unclosed parenthesis"),
            ParseReason::UnknownIdentifier(name) => write!(f, "unknown identifier '{}'", name),
            ParseReason::MissingCallParen(func) => {
                write!(f, "function '{}' must be followed by '('", func)
            }
            ParseReason::WrongArity {
                func,
                expected,
                found,
            } => write!(
                f,
                "function '{}' takes {} argument(s), {} given",
                func, expected, found
            ),
            ParseReason::NumberOutOfRange(text) => {
                write!(f, "numeric literal '{}' is out of range", text)
            }
            ParseReason::TooDeep => write!(f, "expression is nested too deeply"),
        }
    }
}

/// Syntax error with the 0-based character offset where it was detected.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub position: usize,
    pub reason: ParseReason,
}

impl ParseError {
    fn new(position: usize, reason: ParseReason) -> Self {
        ParseError { position, reason }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at position {}", self.reason, self.position)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Ident(String),
    Op(BinaryOp),
    LParen,
    RParen,
    Comma,
    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::Ident(name) => write!(f, "{}", name),
            TokenKind::Op(op) => write!(f, "{}", op.symbol()),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::End => write!(f, "<end>"),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let start = i;
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c.is_ascii_digit() || c == '.' {
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i < chars.len() && chars[i] == '.' {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let text: String = chars[start..i].iter().collect();
            if text == "." {
                return Err(ParseError::new(start, ParseReason::UnexpectedChar('.')));
            }
            let value = text
                .parse::<f64>()
                .map_err(|_| ParseError::new(start, ParseReason::UnexpectedToken(text.clone())))?;
            if !value.is_finite() {
                return Err(ParseError::new(start, ParseReason::NumberOutOfRange(text)));
            }
            tokens.push(Token {
                kind: TokenKind::Number(value),
                pos: start,
            });
            continue;
        }
        if c.is_alphabetic() {
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident(chars[start..i].iter().collect()),
                pos: start,
            });
            continue;
        }
        let kind = match c {
            '+' => TokenKind::Op(BinaryOp::Add),
            '-' => TokenKind::Op(BinaryOp::Sub),
            '/' => TokenKind::Op(BinaryOp::Div),
            '^' => TokenKind::Op(BinaryOp::Pow),
            '*' if chars.get(i + 1) == Some(&'*') => {
                i += 1;
                TokenKind::Op(BinaryOp::Pow)
            }
            '*' => TokenKind::Op(BinaryOp::Mul),
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            _ => return Err(ParseError::new(start, ParseReason::UnexpectedChar(c))),
        };
        i += 1;
        tokens.push(Token { kind, pos: start });
    }
    tokens.push(Token {
        kind: TokenKind::End,
        pos: chars.len(),
    });
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn current(&self) -> &Token {
        // the End token is never consumed, so the index stays in bounds
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::End {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self) -> ParseError {
        let token = self.current();
        match token.kind {
            TokenKind::End => ParseError::new(token.pos, ParseReason::UnexpectedEnd),
            ref kind => ParseError::new(token.pos, ParseReason::UnexpectedToken(kind.to_string())),
        }
    }

    fn expect_closing(&mut self, open_pos: usize) -> Result<(), ParseError> {
        match self.current().kind {
            TokenKind::RParen => {
                self.advance();
                Ok(())
            }
            TokenKind::End => Err(ParseError::new(open_pos, ParseReason::UnclosedParen)),
            _ => Err(self.unexpected()),
        }
    }

    fn checked(&self, expr: Expr, height: usize) -> Result<Parsed, ParseError> {
        if height > MAX_HEIGHT {
            return Err(ParseError::new(self.current().pos, ParseReason::TooDeep));
        }
        Ok((expr, height))
    }

    fn parse_expression(&mut self) -> Result<Parsed, ParseError> {
        let (mut lhs, mut height) = self.parse_term()?;
        while let TokenKind::Op(op @ (BinaryOp::Add | BinaryOp::Sub)) = self.current().kind {
            self.advance();
            let (rhs, rhs_height) = self.parse_term()?;
            (lhs, height) = self.checked(
                Expr::Binary(op, lhs.boxed(), rhs.boxed()),
                1 + height.max(rhs_height),
            )?;
        }
        Ok((lhs, height))
    }

    fn parse_term(&mut self) -> Result<Parsed, ParseError> {
        let (mut lhs, mut height) = self.parse_unary()?;
        while let TokenKind::Op(op @ (BinaryOp::Mul | BinaryOp::Div)) = self.current().kind {
            self.advance();
            let (rhs, rhs_height) = self.parse_unary()?;
            (lhs, height) = self.checked(
                Expr::Binary(op, lhs.boxed(), rhs.boxed()),
                1 + height.max(rhs_height),
            )?;
        }
        Ok((lhs, height))
    }

    fn parse_unary(&mut self) -> Result<Parsed, ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::new(self.current().pos, ParseReason::TooDeep));
        }
        let result = match self.current().kind {
            TokenKind::Op(BinaryOp::Sub) => {
                self.advance();
                self.parse_unary().and_then(|(operand, height)| {
                    self.checked(Expr::Unary(UnaryOp::Neg, operand.boxed()), height + 1)
                })
            }
            TokenKind::Op(BinaryOp::Add) => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        };
        self.depth -= 1;
        result
    }

    fn parse_power(&mut self) -> Result<Parsed, ParseError> {
        let (base, base_height) = self.parse_implicit()?;
        if let TokenKind::Op(BinaryOp::Pow) = self.current().kind {
            self.advance();
            let (exponent, exponent_height) = self.parse_unary()?;
            return self.checked(base.pow(exponent), 1 + base_height.max(exponent_height));
        }
        Ok((base, base_height))
    }

    fn parse_implicit(&mut self) -> Result<Parsed, ParseError> {
        let numeral = matches!(self.current().kind, TokenKind::Number(_));
        let (atom, atom_height) = self.parse_atom()?;
        if numeral && matches!(self.current().kind, TokenKind::Ident(_) | TokenKind::LParen) {
            let (rhs, rhs_height) = self.parse_power()?;
            return self.checked(atom * rhs, 1 + atom_height.max(rhs_height));
        }
        Ok((atom, atom_height))
    }

    fn parse_atom(&mut self) -> Result<Parsed, ParseError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Number(value) => {
                self.advance();
                Ok((Expr::Const(value), 1))
            }
            TokenKind::Ident(ref name) => {
                self.advance();
                self.parse_identifier(name, token.pos)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_closing(token.pos)?;
                Ok(inner)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_identifier(&mut self, name: &str, pos: usize) -> Result<Parsed, ParseError> {
        match name {
            VARIABLE_X | VARIABLE_Y => return Ok((Expr::var(name), 1)),
            "pi" => return Ok((Expr::Const(std::f64::consts::PI), 1)),
            "e" => return Ok((Expr::Const(std::f64::consts::E), 1)),
            _ => {}
        }
        let func = Func::from_str(name).map_err(|_| {
            ParseError::new(pos, ParseReason::UnknownIdentifier(name.to_string()))
        })?;
        let open_pos = self.current().pos;
        if self.current().kind != TokenKind::LParen {
            return Err(ParseError::new(open_pos, ParseReason::MissingCallParen(func)));
        }
        self.advance();
        let mut args = Vec::new();
        let mut height = 0;
        if self.current().kind != TokenKind::RParen {
            loop {
                let (arg, arg_height) = self.parse_expression()?;
                args.push(arg);
                height = height.max(arg_height);
                if self.current().kind == TokenKind::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect_closing(open_pos)?;
        if args.len() != func.arity() {
            return Err(ParseError::new(
                pos,
                ParseReason::WrongArity {
                    func,
                    expected: func.arity(),
                    found: args.len(),
                },
            ));
        }
        self.checked(Expr::Call(func, args), height + 1)
    }
}

/// Deepest `parse_unary` nesting reached when the printed form of `expr` is
/// read back. Must follow the layout of `Expr`'s `Display`.
fn printed_depth(expr: &Expr) -> usize {
    match expr {
        Expr::Const(v) if *v < 0.0 => 3,
        Expr::Const(_) | Expr::Var(_) => 1,
        Expr::Unary(_, operand) => 2 + printed_depth(operand),
        Expr::Call(_, args) => 1 + args.iter().map(printed_depth).max().unwrap_or(0),
        Expr::Binary(BinaryOp::Pow, base, exponent) => {
            (1 + printed_depth(base)).max(2 + printed_depth(exponent))
        }
        Expr::Binary(op, lhs, rhs) => {
            // a left-leaning chain of one precedence level prints flat
            let mut deepest = printed_depth(rhs);
            let mut left = lhs.as_ref();
            loop {
                match left {
                    Expr::Binary(inner, l, r) if inner.chains_with(*op) => {
                        deepest = deepest.max(printed_depth(r));
                        left = l.as_ref();
                    }
                    _ => break,
                }
            }
            1 + deepest.max(printed_depth(left))
        }
    }
}

/// Parses text into an expression tree.
///
/// Fails with a [`ParseError`] carrying the character offset of the problem for
/// malformed syntax and for any identifier outside the closed namespace. Trees
/// taller than [`MAX_HEIGHT`], or whose printed form would nest deeper than
/// [`MAX_DEPTH`], are rejected with [`ParseReason::TooDeep`].
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.len() == 1 {
        return Err(ParseError::new(0, ParseReason::EmptyInput));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let (expr, _) = parser.parse_expression()?;
    if parser.current().kind != TokenKind::End {
        return Err(parser.unexpected());
    }
    if printed_depth(&expr) > MAX_DEPTH {
        return Err(ParseError::new(0, ParseReason::TooDeep));
    }
    Ok(expr)
}

impl Expr {
    /// Parses a string into a symbolic expression, see [`parse`].
    ///
    /// # Supported Syntax
    /// - Variables: x, y
    /// - Constants: 3, 2.5, .5, pi, e
    /// - Operators: +, -, *, /, ^ (or **)
    /// - Implicit multiplication after a numeral: 2x, 2(x+1)
    /// - Functions: sin, cos, tan, asin, acos, atan, sinh, cosh, tanh, exp, log (ln), sqrt, abs
    /// - Parentheses for grouping
    pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
        let parsed = parse(input);
        match &parsed {
            Ok(expr) => debug!("parsed '{}' into {}", input, expr),
            Err(err) => debug!("failed to parse '{}': {}", input, err),
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::var("x")
    }

    fn c(v: f64) -> Expr {
        Expr::Const(v)
    }

    #[test]
    fn test_parse_constant() {
        assert_eq!(parse("42").unwrap(), c(42.0));
        assert_eq!(parse("2.5").unwrap(), c(2.5));
        assert_eq!(parse(".5").unwrap(), c(0.5));
        assert_eq!(parse("4.").unwrap(), c(4.0));
    }

    #[test]
    fn test_parse_variable() {
        assert_eq!(parse("x").unwrap(), x());
        assert_eq!(parse(" y ").unwrap(), Expr::var("y"));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(parse("x + 2 * x").unwrap(), x() + c(2.0) * x());
        assert_eq!(parse("(x + 2) * x").unwrap(), (x() + c(2.0)) * x());
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(parse("x - 2 - 1").unwrap(), (x() - c(2.0)) - c(1.0));
        assert_eq!(parse("x / 2 / 4").unwrap(), (x() / c(2.0)) / c(4.0));
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(parse("x^2^3").unwrap(), x().pow(c(2.0).pow(c(3.0))));
        assert_eq!(parse("x**2").unwrap(), parse("x^2").unwrap());
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        assert_eq!(parse("-x^2").unwrap(), -(x().pow(c(2.0))));
        assert_eq!(parse("2^-x").unwrap(), c(2.0).pow(-x()));
        assert_eq!(parse("--x").unwrap(), -(-x()));
        assert_eq!(parse("+x").unwrap(), x());
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(parse("2x").unwrap(), c(2.0) * x());
        assert_eq!(parse("2(x+1)").unwrap(), c(2.0) * (x() + c(1.0)));
        assert_eq!(parse("2x^2").unwrap(), c(2.0) * x().pow(c(2.0)));
        assert_eq!(parse("3sin(x)").unwrap(), c(3.0) * Expr::call(Func::Sin, x()));
        assert_eq!(
            parse("2x + 1").unwrap(),
            c(2.0) * x() + c(1.0)
        );
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!(parse("sin(x)").unwrap(), Expr::call(Func::Sin, x()));
        assert_eq!(parse("ln(x)").unwrap(), Expr::call(Func::Log, x()));
        assert_eq!(
            parse("sqrt(abs(x))").unwrap(),
            Expr::call(Func::Sqrt, Expr::call(Func::Abs, x()))
        );
    }

    #[test]
    fn test_named_constants() {
        assert_eq!(parse("pi").unwrap(), c(std::f64::consts::PI));
        assert_eq!(parse("2e").unwrap(), c(2.0) * c(std::f64::consts::E));
    }

    #[test]
    fn test_unknown_identifier() {
        let err = parse("foo(x)").unwrap_err();
        assert_eq!(err.reason, ParseReason::UnknownIdentifier("foo".to_string()));
        assert_eq!(err.position, 0);
        assert!(err.to_string().contains("foo"));

        let err = parse("x + z").unwrap_err();
        assert_eq!(err.reason, ParseReason::UnknownIdentifier("z".to_string()));
        assert_eq!(err.position, 4);
    }

    #[test]
    fn test_code_injection_is_rejected() {
        let err = parse("__import__('os')").unwrap_err();
        assert_eq!(err.reason, ParseReason::UnexpectedChar('_'));
        let err = parse("exec(x)").unwrap_err();
        assert_eq!(err.reason, ParseReason::UnknownIdentifier("exec".to_string()));
    }

    #[test]
    fn test_wrong_arity() {
        let err = parse("sin(x, y)").unwrap_err();
        assert_eq!(
            err.reason,
            ParseReason::WrongArity {
                func: Func::Sin,
                expected: 1,
                found: 2
            }
        );
        assert!(parse("cos()").is_err());
    }

    #[test]
    fn test_missing_call_paren() {
        let err = parse("sin x").unwrap_err();
        assert_eq!(err.reason, ParseReason::MissingCallParen(Func::Sin));
        assert_eq!(err.position, 4);
    }

    #[test]
    fn test_unmatched_brackets() {
        let err = parse("(x + y").unwrap_err();
        assert_eq!(err.reason, ParseReason::UnclosedParen);
        assert_eq!(err.position, 0);
        let err = parse("x + y)").unwrap_err();
        assert_eq!(err.reason, ParseReason::UnexpectedToken(")".to_string()));
        assert_eq!(err.position, 5);
    }

    #[test]
    fn test_invalid_expression() {
        assert_eq!(parse("(x +").unwrap_err().reason, ParseReason::UnexpectedEnd);
        assert_eq!(parse("").unwrap_err().reason, ParseReason::EmptyInput);
        assert_eq!(parse("   ").unwrap_err().reason, ParseReason::EmptyInput);
        assert_eq!(parse("x $ 2").unwrap_err().reason, ParseReason::UnexpectedChar('$'));
        assert_eq!(parse("x * * 2").unwrap_err().position, 4);
        assert!(parse("2 3").is_err());
        assert!(parse(".").is_err());
    }

    #[test]
    fn test_number_out_of_range() {
        let huge = format!("1{}", "0".repeat(400));
        let err = parse(&huge).unwrap_err();
        assert!(matches!(err.reason, ParseReason::NumberOutOfRange(_)));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}x{}", "(".repeat(MAX_DEPTH + 10), ")".repeat(MAX_DEPTH + 10));
        assert_eq!(parse(&deep).unwrap_err().reason, ParseReason::TooDeep);
        let shallow = format!("{}x{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(parse(&shallow).unwrap(), x());
    }

    #[test]
    fn test_long_chains_are_capped() {
        let sum = vec!["x"; 20_000].join("+");
        let err = parse(&sum).unwrap_err();
        assert_eq!(err.reason, ParseReason::TooDeep);
        // reported at the operator after the first term that no longer fits
        assert_eq!(err.position, 2 * MAX_HEIGHT + 1);

        let product = vec!["2"; 200_000].join(" * ");
        assert_eq!(parse(&product).unwrap_err().reason, ParseReason::TooDeep);
        let quotient_of_sums = format!("({}) / 2", vec!["y"; 5_000].join(" - "));
        assert_eq!(parse(&quotient_of_sums).unwrap_err().reason, ParseReason::TooDeep);

        let fits = vec!["x"; MAX_HEIGHT].join("+");
        assert!(parse(&fits).is_ok());
    }

    #[test]
    fn test_positions_count_characters() {
        // 'π' is two bytes but one character
        let err = parse("π + x").unwrap_err();
        assert_eq!(err.reason, ParseReason::UnknownIdentifier("π".to_string()));
        let err = parse("x + ü").unwrap_err();
        assert_eq!(err.position, 4);
    }
}
