//! Turns a string into a symbolic expression.
//!
//! Recursive descent over a small token stream. Precedence, lowest first:
//! `+ -`, `* /`, unary `-`, power (`**` or `^`, right associative). So `-x**2` is `-(x^2)`
//! and `2^-1` is `2^(-1)`. Function arguments are separated by commas.
//! ```
//! use RustedRoots::numerical::numeric_context::NumericContext;
//! use RustedRoots::symbolic::symbolic_engine::Expr;
//! let ctx = NumericContext::default();
//! let parsed_expression = Expr::parse_expression("x**3 - x - 2").unwrap();
//! let f = parsed_expression.lambdify1D("x", &ctx).unwrap();
//! assert_eq!(f(&ctx.real(2.0)).to_f64(), 4.0);
//! ```
use crate::symbolic::symbolic_engine::{Expr, MathFn, MathFn2, NamedConst};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            _ if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Caret);
                i += 2;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            _ if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // exponent part only when digits follow: "2e" is 2 times the constant e
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{}'", literal))?;
                tokens.push(Token::Num(value));
            }
            _ if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            _ => return Err(format!("unexpected character '{}' at {}", c, i)),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        match self.next() {
            Some(ref token) if *token == expected => Ok(()),
            Some(token) => Err(format!("expected {:?}, found {:?}", expected, token)),
            None => Err(format!("expected {:?}, found end of input", expected)),
        }
    }

    fn parse_sum(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_product()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    lhs = lhs + self.parse_product()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    lhs = lhs - self.parse_product()?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_product(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    lhs = lhs * self.parse_unary()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    lhs = lhs / self.parse_unary()?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, String> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                let operand = self.parse_unary()?;
                Ok(match operand {
                    Expr::Const(val) => Expr::Const(-val),
                    other => -other,
                })
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr, String> {
        let base = self.parse_atom()?;
        if let Some(Token::Caret) = self.peek() {
            self.pos += 1;
            let exponent = self.parse_unary()?;
            return Ok(base.pow(exponent));
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Token::Num(val)) => Ok(Expr::Const(val)),
            Some(Token::LParen) => {
                let inner = self.parse_sum()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.pos += 1;
                    let args = self.parse_arguments()?;
                    return call(&name, args);
                }
                Ok(match NamedConst::from_str(&name) {
                    Ok(constant) => Expr::Named(constant),
                    Err(_) => Expr::Var(name),
                })
            }
            Some(token) => Err(format!("unexpected token {:?}", token)),
            None => Err("unexpected end of input".to_string()),
        }
    }

    /// comma separated expressions up to the closing parenthesis
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, String> {
        let mut args = vec![self.parse_sum()?];
        while let Some(Token::Comma) = self.peek() {
            self.pos += 1;
            args.push(self.parse_sum()?);
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }
}

fn call(name: &str, mut args: Vec<Expr>) -> Result<Expr, String> {
    let arity_error = |expected: usize, found: usize| {
        format!(
            "function '{}' takes {} argument(s), {} given",
            name, expected, found
        )
    };
    if let Ok(func) = MathFn::from_str(name) {
        return match args.pop() {
            Some(arg) if args.is_empty() => Ok(arg.apply_fn(func)),
            _ => Err(arity_error(1, args.len() + 1)),
        };
    }
    let binary = match (name, args.len()) {
        ("pow", 2) => None,
        ("pow", n) => return Err(arity_error(2, n)),
        (_, n) => match MathFn2::from_str(name) {
            Ok(func) if n == 2 => Some(func),
            Ok(_) => return Err(arity_error(2, n)),
            Err(_) => return Err(format!("unknown function '{}'", name)),
        },
    };
    let (Some(second), Some(first)) = (args.pop(), args.pop()) else {
        return Err(arity_error(2, 0));
    };
    Ok(match binary {
        Some(func) => first.apply_fn2(func, second),
        None => first.pow(second),
    })
}

/// parse a whole string, trailing tokens are an error
pub fn parse_expression_func(input: &str) -> Result<Expr, String> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_sum()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(format!("unexpected trailing token {:?}", token)),
    }
}

impl Expr {
    pub fn parse_expression(input: &str) -> Result<Expr, String> {
        parse_expression_func(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::Var("x".to_string())
    }

    #[test]
    fn test_parse_polynomial() {
        let expr = parse_expression_func("x**3 - x - 2").unwrap();
        let expected = x().pow(Expr::Const(3.0)) - x() - Expr::Const(2.0);
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_caret_and_double_star_are_the_same() {
        assert_eq!(
            parse_expression_func("x^2").unwrap(),
            parse_expression_func("x**2").unwrap()
        );
    }

    #[test]
    fn test_precedence() {
        let expr = parse_expression_func("1 + 2 * x").unwrap();
        assert_eq!(expr, Expr::Const(1.0) + Expr::Const(2.0) * x());
        // unary minus binds weaker than power
        let expr = parse_expression_func("-x^2").unwrap();
        assert_eq!(expr, -(x().pow(Expr::Const(2.0))));
        // power is right associative
        let expr = parse_expression_func("2^3^2").unwrap();
        assert_eq!(
            expr,
            Expr::Const(2.0).pow(Expr::Const(3.0).pow(Expr::Const(2.0)))
        );
    }

    #[test]
    fn test_functions_and_constants() {
        let expr = parse_expression_func("sin(pi * x) + exp(e)").unwrap();
        let expected = (Expr::Named(NamedConst::pi) * x()).apply_fn(MathFn::sin)
            + Expr::Named(NamedConst::e).apply_fn(MathFn::exp);
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_two_argument_functions() {
        let expr = parse_expression_func("hypot(x, 1) + atan2(x, 1)").unwrap();
        let expected = x().apply_fn2(MathFn2::hypot, Expr::Const(1.0))
            + x().apply_fn2(MathFn2::atan2, Expr::Const(1.0));
        assert_eq!(expr, expected);
        assert_eq!(
            parse_expression_func("pow(x, 3)").unwrap(),
            x().pow(Expr::Const(3.0))
        );
        assert_eq!(
            parse_expression_func("cbrt(exp2(x))").unwrap(),
            x().apply_fn(MathFn::exp2).apply_fn(MathFn::cbrt)
        );
    }

    #[test]
    fn test_wrong_number_of_arguments() {
        assert_eq!(
            parse_expression_func("sin(x, 1)").unwrap_err(),
            "function 'sin' takes 1 argument(s), 2 given"
        );
        assert_eq!(
            parse_expression_func("hypot(x)").unwrap_err(),
            "function 'hypot' takes 2 argument(s), 1 given"
        );
        assert!(parse_expression_func("pow(x, 2, 3)").is_err());
        assert!(parse_expression_func("atan2(x,)").is_err());
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(parse_expression_func("1e-3").unwrap(), Expr::Const(1e-3));
        assert_eq!(
            parse_expression_func("2e").unwrap_err(),
            "unexpected trailing token Ident(\"e\")"
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_expression_func("").is_err());
        assert!(parse_expression_func("x +").is_err());
        assert!(parse_expression_func("(x + 1").is_err());
        assert!(parse_expression_func("x + 1)").is_err());
        assert!(parse_expression_func("2x").is_err());
        assert!(parse_expression_func("foo(x)").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let expr = parse_expression_func("x^3 - 2*sin(x)/(x + 1) + atan2(x, pi)").unwrap();
        let reparsed = parse_expression_func(&expr.to_string()).unwrap();
        assert_eq!(expr, reparsed);
    }
}
