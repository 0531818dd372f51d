use crate::error::QueryError;
use crate::expr::Expr;

/// A single lexical token produced by `tokenize`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    And,
    Or,
    Not,
    LParen,
    RParen,
    Term(String),
}

/// Splits a raw query line into tokens, rejecting unmatched parentheses.
///
/// Parentheses are padded with spaces so they always land as their own
/// whitespace-delimited token, then classified alongside the `AND`/`OR`/`NOT`
/// keywords; anything else becomes a term token.
fn tokenize(input: &str) -> Result<Vec<Token>, QueryError> {
    let padded = input.replace('(', " ( ").replace(')', " ) ");
    let mut tokens = Vec::new();
    let mut depth = 0i32;

    for word in padded.split_whitespace() {
        match word {
            "(" => {
                depth += 1;
                tokens.push(Token::LParen);
            }
            ")" => {
                depth -= 1;
                if depth < 0 {
                    return Err(QueryError::UnmatchedParenthesis);
                }
                tokens.push(Token::RParen);
            }
            "AND" => tokens.push(Token::And),
            "OR" => tokens.push(Token::Or),
            "NOT" => tokens.push(Token::Not),
            term => tokens.push(Token::Term(term.to_string())),
        }
    }

    if depth != 0 {
        return Err(QueryError::UnmatchedParenthesis);
    }

    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    And,
    Or,
}

/// Lower binds tighter: `AND` is resolved before `OR`.
fn precedence(op: Op) -> u8 {
    match op {
        Op::And => 1,
        Op::Or => 2,
    }
}

fn apply(op: Op, lhs: Expr, rhs: Expr) -> Expr {
    match op {
        Op::And => Expr::And(Box::new(lhs), Box::new(rhs)),
        Op::Or => Expr::Or(Box::new(lhs), Box::new(rhs)),
    }
}

/// Shunting-yard parser with unary `NOT`, driven by an explicit token
/// cursor so parenthesized groups recurse into the same routine.
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn parse_group(&mut self) -> Result<Expr, QueryError> {
        let mut ops: Vec<Op> = Vec::new();
        let mut opr: Vec<Expr> = Vec::new();
        let mut negate_next = false;

        while self.pos < self.tokens.len() {
            match &self.tokens[self.pos] {
                Token::RParen => break,
                Token::Not => {
                    negate_next = !negate_next;
                    self.pos += 1;
                }
                Token::LParen => {
                    self.pos += 1;
                    let sub = self.parse_group()?;
                    match self.tokens.get(self.pos) {
                        Some(Token::RParen) => self.pos += 1,
                        _ => return Err(QueryError::UnmatchedParenthesis),
                    }
                    opr.push(negate_if(sub, &mut negate_next));
                }
                Token::Term(term) => {
                    let node = Expr::Term(term.clone());
                    opr.push(negate_if(node, &mut negate_next));
                    self.pos += 1;
                }
                Token::And | Token::Or => {
                    let incoming = if self.tokens[self.pos] == Token::And {
                        Op::And
                    } else {
                        Op::Or
                    };
                    while let Some(&top) = ops.last() {
                        if precedence(top) <= precedence(incoming) {
                            ops.pop();
                            let rhs = opr.pop().ok_or(QueryError::DanglingOperator)?;
                            let lhs = opr.pop().ok_or(QueryError::DanglingOperator)?;
                            opr.push(apply(top, lhs, rhs));
                        } else {
                            break;
                        }
                    }
                    ops.push(incoming);
                    self.pos += 1;
                }
            }
        }

        while let Some(op) = ops.pop() {
            let rhs = opr.pop().ok_or(QueryError::DanglingOperator)?;
            let lhs = opr.pop().ok_or(QueryError::DanglingOperator)?;
            opr.push(apply(op, lhs, rhs));
        }

        match opr.len() {
            0 => Err(QueryError::EmptyQuery),
            1 => Ok(opr.pop().unwrap()),
            _ => Err(QueryError::DanglingOperator),
        }
    }
}

fn negate_if(node: Expr, negate_next: &mut bool) -> Expr {
    if *negate_next {
        *negate_next = false;
        Expr::Not(Box::new(node))
    } else {
        node
    }
}

/// Parses a single boolean query line into an expression tree.
pub fn parse(input: &str) -> Result<Expr, QueryError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(QueryError::EmptyQuery);
    }
    let mut parser = Parser { tokens: &tokens, pos: 0 };
    let root = parser.parse_group()?;
    if parser.pos != parser.tokens.len() {
        return Err(QueryError::UnexpectedToken {
            token: format!("{:?}", parser.tokens[parser.pos]),
        });
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_term() {
        let expr = parse("cat").unwrap();
        assert_eq!(expr, Expr::Term("cat".to_string()));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse("a OR b AND c").unwrap();
        // Should parse as a OR (b AND c).
        match expr {
            Expr::Or(lhs, rhs) => {
                assert_eq!(*lhs, Expr::Term("a".to_string()));
                assert_eq!(
                    *rhs,
                    Expr::And(
                        Box::new(Expr::Term("b".to_string())),
                        Box::new(Expr::Term("c".to_string()))
                    )
                );
            }
            other => panic!("expected Or at root, got {:?}", other),
        }
    }

    #[test]
    fn and_is_left_associative() {
        let expr = parse("a AND b AND c").unwrap();
        assert_eq!(
            expr,
            Expr::And(
                Box::new(Expr::And(
                    Box::new(Expr::Term("a".to_string())),
                    Box::new(Expr::Term("b".to_string()))
                )),
                Box::new(Expr::Term("c".to_string()))
            )
        );
    }

    #[test]
    fn not_applies_to_single_term() {
        let expr = parse("NOT cat").unwrap();
        assert_eq!(expr, Expr::Not(Box::new(Expr::Term("cat".to_string()))));
    }

    #[test]
    fn not_applies_to_parenthesized_group() {
        let expr = parse("NOT (a AND b)").unwrap();
        assert_eq!(
            expr,
            Expr::Not(Box::new(Expr::And(
                Box::new(Expr::Term("a".to_string())),
                Box::new(Expr::Term("b".to_string()))
            )))
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        let expr = parse("(a OR b) AND c").unwrap();
        assert_eq!(
            expr,
            Expr::And(
                Box::new(Expr::Or(
                    Box::new(Expr::Term("a".to_string())),
                    Box::new(Expr::Term("b".to_string()))
                )),
                Box::new(Expr::Term("c".to_string()))
            )
        );
    }

    #[test]
    fn unmatched_open_paren_is_rejected() {
        assert_eq!(parse("(a AND b"), Err(QueryError::UnmatchedParenthesis));
    }

    #[test]
    fn unmatched_close_paren_is_rejected() {
        assert_eq!(parse("a AND b)"), Err(QueryError::UnmatchedParenthesis));
    }

    #[test]
    fn empty_query_is_rejected() {
        assert_eq!(parse("   "), Err(QueryError::EmptyQuery));
    }

    #[test]
    fn double_negation_cancels() {
        let expr = parse("z AND NOT NOT bb").unwrap();
        assert_eq!(
            expr,
            Expr::And(
                Box::new(Expr::Term("z".to_string())),
                Box::new(Expr::Term("bb".to_string()))
            )
        );
    }

    #[test]
    fn dangling_operator_is_rejected() {
        assert_eq!(parse("a AND"), Err(QueryError::DanglingOperator));
        assert_eq!(parse("AND a"), Err(QueryError::DanglingOperator));
    }
}
