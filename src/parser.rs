//! Statement and expression parsing (§4.2).
//!
//! Produces the single [`crate::ast`] tree consumed both by the evaluator
//! (folding: operators are applied as the tree reduces) and by the loader's
//! compile-time validator (inert: only [`LineRef`]s are inspected, nothing
//! is evaluated). There is one parse, not two grammars; see the module
//! comment on [`crate::ast`] for why.

use crate::ast::{AssignSource, Expr, Handler, LineRef, LineTarget, Statement};
use crate::constants::{STDERR, STDIN, STDOUT};
use crate::keyword::{is_reserved, Keyword};
use crate::lexer::Token;
use crate::operators::{Level, LEVELS};
use util::EnumFromStr;

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Cursor<'a> {
        Cursor { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn expect_symbol(&mut self, sym: &str) -> Result<(), String> {
        match self.next() {
            Some(Token::Symbol(s)) if s == sym => Ok(()),
            other => Err(format!("Expected '{}', found {:?}", sym, other)),
        }
    }

    fn eat_symbol(&mut self, sym: &str) -> bool {
        match self.peek() {
            Some(Token::Symbol(s)) if s == sym => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn expect_ident(&mut self) -> Result<String, String> {
        match self.next() {
            Some(Token::Ident(s)) => Ok(s.clone()),
            other => Err(format!("Expected an identifier, found {:?}", other)),
        }
    }

    fn expect_int(&mut self) -> Result<i64, String> {
        match self.next() {
            Some(Token::Int(n)) => Ok(*n),
            other => Err(format!("Expected an integer, found {:?}", other)),
        }
    }
}

/// Parses a full statement line (everything except bare labels and `LOAD`
/// declarations, which the loader handles directly on raw text).
pub fn parse_statement(tokens: &[Token]) -> Result<Statement, String> {
    if let Some(Token::Ident(word)) = tokens.first() {
        if let Ok(kw) = <Keyword as EnumFromStr>::from_str(word) {
            let mut cur = Cursor::new(&tokens[1..]);
            let stmt = match kw {
                Keyword::GO => parse_go(&mut cur)?,
                Keyword::GOIF => parse_goif(&mut cur)?,
                Keyword::JUMP => parse_jump(&mut cur)?,
                Keyword::THROW => parse_throw(&mut cur)?,
                Keyword::RETURN => parse_return(&mut cur)?,
                Keyword::HANDLE | Keyword::LOAD | Keyword::INTO => {
                    return Err(format!("'{}' cannot begin a statement", word));
                }
            };
            if !cur.at_end() {
                return Err("Unexpected tokens after statement".to_owned());
            }
            return Ok(stmt);
        }
    }

    parse_into(tokens)
}

fn parse_go(cur: &mut Cursor) -> Result<Statement, String> {
    Ok(Statement::Go(parse_line_ref(cur)?))
}

fn parse_goif(cur: &mut Cursor) -> Result<Statement, String> {
    let target = parse_line_ref(cur)?;
    let cond = parse_expr(cur)?;
    Ok(Statement::GoIf { target, cond })
}

fn parse_jump(cur: &mut Cursor) -> Result<Statement, String> {
    let target = parse_line_ref(cur)?;
    cur.expect_symbol("(")?;
    let mut args = Vec::new();
    if !cur.eat_symbol(")") {
        loop {
            args.push(parse_expr(cur)?);
            if cur.eat_symbol(",") {
                continue;
            }
            cur.expect_symbol(")")?;
            break;
        }
    }

    let mut handlers = Vec::new();
    while matches!(cur.peek(), Some(Token::Ident(w)) if w == "HANDLE") {
        cur.next();
        let exception = cur.expect_ident()?;
        let target = parse_line_ref(cur)?;
        handlers.push(Handler { exception, target });
    }

    Ok(Statement::Jump { target, args, handlers })
}

fn parse_throw(cur: &mut Cursor) -> Result<Statement, String> {
    Ok(Statement::Throw(cur.expect_ident()?))
}

fn parse_return(cur: &mut Cursor) -> Result<Statement, String> {
    let mut rets = Vec::new();
    if cur.eat_symbol("(") {
        if !cur.eat_symbol(")") {
            loop {
                rets.push(parse_expr(cur)?);
                if cur.eat_symbol(",") {
                    continue;
                }
                cur.expect_symbol(")")?;
                break;
            }
        }
    }
    Ok(Statement::Return(rets))
}

fn parse_into(tokens: &[Token]) -> Result<Statement, String> {
    let into_idx = tokens
        .iter()
        .position(|t| matches!(t, Token::Ident(w) if w == "INTO"))
        .ok_or_else(|| "Line is not a recognized statement (no INTO found)".to_owned())?;

    let lhs = &tokens[..into_idx];
    let rhs = &tokens[into_idx + 1..];

    if rhs.len() != 1 {
        return Err("INTO target must be a single identifier".to_owned());
    }
    let target = match &rhs[0] {
        Token::Ident(name) => name.clone(),
        other => return Err(format!("INTO target must be an identifier, found {:?}", other)),
    };
    if is_reserved(&target) && !matches!(target.as_str(), STDIN | STDOUT | STDERR) {
        return Err(format!("'{}' is a reserved word and cannot be assigned to", target));
    }

    let source = if lhs.len() == 1 && matches!(&lhs[0], Token::Symbol(s) if s == "@") {
        AssignSource::Unset
    } else {
        let mut cur = Cursor::new(lhs);
        let expr = parse_expr(&mut cur)?;
        if !cur.at_end() {
            return Err("Unexpected tokens before INTO".to_owned());
        }
        AssignSource::Expr(expr)
    };

    Ok(Statement::Into { source, target })
}

/// `ALIAS:TARGET` or bare `TARGET`, where `TARGET` is `^N`, `~±N`, or a
/// label identifier.
fn parse_line_ref(cur: &mut Cursor) -> Result<LineRef, String> {
    if let Some(Token::Symbol(s)) = cur.peek() {
        if s == "^" || s == "~" {
            let target = parse_line_target(cur)?;
            return Ok(LineRef { alias: None, target });
        }
    }

    let first = cur.expect_ident()?;
    if cur.eat_symbol(":") {
        let target = parse_line_target(cur)?;
        Ok(LineRef { alias: Some(first), target })
    } else {
        Ok(LineRef { alias: None, target: LineTarget::Label(first) })
    }
}

fn parse_line_target(cur: &mut Cursor) -> Result<LineTarget, String> {
    if cur.eat_symbol("^") {
        let n = parse_signed_int(cur)?;
        return Ok(LineTarget::Absolute(n));
    }
    if cur.eat_symbol("~") {
        let n = parse_signed_int(cur)?;
        return Ok(LineTarget::Relative(n));
    }
    Ok(LineTarget::Label(cur.expect_ident()?))
}

fn parse_signed_int(cur: &mut Cursor) -> Result<i64, String> {
    let negative = cur.eat_symbol("-");
    let n = cur.expect_int()?;
    Ok(if negative { -n } else { n })
}

/// Entry point for expressions: ternary `?:` sits below every level in
/// [`LEVELS`] and is parsed first, right-associatively.
fn parse_expr(cur: &mut Cursor) -> Result<Expr, String> {
    let cond = parse_level(cur, 0)?;
    if cur.eat_symbol("?") {
        let then_branch = parse_expr(cur)?;
        cur.expect_symbol(":")?;
        let else_branch = parse_expr(cur)?;
        return Ok(Expr::Ternary {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        });
    }
    Ok(cond)
}

fn parse_level(cur: &mut Cursor, idx: usize) -> Result<Expr, String> {
    if idx >= LEVELS.len() {
        return parse_atom(cur);
    }

    match &LEVELS[idx] {
        Level::Prefix(ops) => {
            if let Some(Token::Symbol(s)) = cur.peek() {
                if let Some((_, op)) = ops.iter().find(|(sym, _)| sym == s) {
                    let op = *op;
                    cur.next();
                    let operand = parse_level(cur, idx)?;
                    return Ok(Expr::Unary { op, operand: Box::new(operand) });
                }
            }
            parse_level(cur, idx + 1)
        }
        Level::Infix(ops) => {
            let mut left = parse_level(cur, idx + 1)?;
            loop {
                let matched = match cur.peek() {
                    Some(Token::Symbol(s)) => ops.iter().find(|(sym, _)| sym == s).map(|(_, op)| *op),
                    _ => None,
                };
                match matched {
                    Some(op) => {
                        cur.next();
                        let right = parse_level(cur, idx + 1)?;
                        left = Expr::Binary { op, lhs: Box::new(left), rhs: Box::new(right) };
                    }
                    None => break,
                }
            }
            Ok(left)
        }
    }
}

fn parse_atom(cur: &mut Cursor) -> Result<Expr, String> {
    match cur.next() {
        Some(Token::Int(n)) => Ok(Expr::IntLit(*n)),
        Some(Token::StrSigil(key)) => Ok(Expr::StrSigil(*key)),
        Some(Token::Ident(word)) if word == "TRUE" => Ok(Expr::BoolLit(true)),
        Some(Token::Ident(word)) if word == "FALSE" => Ok(Expr::BoolLit(false)),
        Some(Token::Ident(word)) => Ok(Expr::Var(word.clone())),
        Some(Token::Symbol(s)) if s == "@" => Ok(Expr::UnsetQuery(cur.expect_ident()?)),
        Some(Token::Symbol(s)) if s == "(" => {
            let inner = parse_expr(cur)?;
            cur.expect_symbol(")")?;
            Ok(inner)
        }
        other => Err(format!("Expected an expression, found {:?}", other)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::tokenize;
    use crate::operators::BinaryOp;

    fn parse(line: &str) -> Statement {
        let tokens = tokenize(line).unwrap();
        parse_statement(&tokens).unwrap()
    }

    #[test]
    fn parses_simple_into() {
        let stmt = parse("5 INTO X");
        match stmt {
            Statement::Into { source: AssignSource::Expr(Expr::IntLit(5)), target } => {
                assert_eq!(target, "X")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn parses_unset_sentinel() {
        let stmt = parse("@ INTO X");
        assert!(matches!(
            stmt,
            Statement::Into { source: AssignSource::Unset, .. }
        ));
    }

    #[test]
    fn parses_unset_query_inside_expr() {
        let stmt = parse("@X INTO Y");
        match stmt {
            Statement::Into { source: AssignSource::Expr(Expr::UnsetQuery(name)), .. } => {
                assert_eq!(name, "X")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn precedence_multiplies_before_adds() {
        let stmt = parse("1 + 2 * 3 INTO X");
        match stmt {
            Statement::Into { source: AssignSource::Expr(Expr::Binary { op: BinaryOp::Add, rhs, .. }), .. } => {
                assert!(matches!(*rhs, Expr::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn ternary_is_right_associative_and_lowest() {
        let stmt = parse("X ? 1 : Y ? 2 : 3 INTO Z");
        match stmt {
            Statement::Into { source: AssignSource::Expr(Expr::Ternary { else_branch, .. }), .. } => {
                assert!(matches!(*else_branch, Expr::Ternary { .. }));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn parses_jump_with_args_and_handlers() {
        let tokens = tokenize("JUMP ADD (3, 4) HANDLE OP_FAIL ERR").unwrap();
        let stmt = parse_statement(&tokens).unwrap();
        match stmt {
            Statement::Jump { target, args, handlers } => {
                assert_eq!(target.target, LineTarget::Label("ADD".into()));
                assert_eq!(args.len(), 2);
                assert_eq!(handlers.len(), 1);
                assert_eq!(handlers[0].exception, "OP_FAIL");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn parses_jump_with_forwarding_args() {
        let tokens = tokenize("JUMP L:GREET ()").unwrap();
        let stmt = parse_statement(&tokens).unwrap();
        match stmt {
            Statement::Jump { target, args, .. } => {
                assert_eq!(target.alias.as_deref(), Some("L"));
                assert!(args.is_empty());
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn parses_absolute_and_relative_targets() {
        let tokens = tokenize("GO ^5").unwrap();
        assert_eq!(
            parse_statement(&tokens).unwrap(),
            Statement::Go(LineRef { alias: None, target: LineTarget::Absolute(5) })
        );

        let tokens = tokenize("GO ~-3").unwrap();
        assert_eq!(
            parse_statement(&tokens).unwrap(),
            Statement::Go(LineRef { alias: None, target: LineTarget::Relative(-3) })
        );
    }

    #[test]
    fn parses_return_with_values() {
        let tokens = tokenize("RETURN (SUM)").unwrap();
        match parse_statement(&tokens).unwrap() {
            Statement::Return(rets) => assert_eq!(rets.len(), 1),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn bare_return_forwards() {
        let tokens = tokenize("RETURN").unwrap();
        match parse_statement(&tokens).unwrap() {
            Statement::Return(rets) => assert!(rets.is_empty()),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn assigning_into_a_reserved_word_is_rejected() {
        let tokens = tokenize("5 INTO GO").unwrap();
        assert!(parse_statement(&tokens).is_err());
    }

    #[test]
    fn assigning_into_a_stream_pseudo_variable_is_allowed() {
        let tokens = tokenize("5 INTO STDOUT").unwrap();
        assert!(parse_statement(&tokens).is_ok());
    }
}
