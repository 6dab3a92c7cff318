//! Parser (`spec.md` §4.C): recursive-descent with Pratt-style precedence
//! climbing for binary operators, plus the overloaded-punctuation
//! disambiguation `spec.md` §1 calls out as the hard part of this system.
//!
//! Structured the way the grounding pack's hand-written parsers are (e.g.
//! `faxc-par`): a tag cursor with `peek`/`advance`/`expect` primitives, a
//! statement dispatcher, and a Pratt loop for expressions. Unlike a
//! source-text lexer, our cursor walks an already-tagged stream (`&[Tag]`),
//! so "lookahead" is just indexing further into that slice — the
//! brace-balancing "forensics" `spec.md` describes are plain scans over that
//! slice with no backtracking cost.

use crate::ast::{ArgNode, Declaration, Expr, Literal, Stmt, StructElem};
use crate::exception::{RunResult, TekoException};
use crate::tag::{Brace, BinOp, CompOp, ConvOp, SetterOp, Tag, TagType, Visibility};

/// Sentinel precedence passed at the top of every expression: lower than
/// every real operator, so every operator is "strictly greater" and gets
/// consumed at least once.
pub const PREC_NONE: u8 = 0;
/// `==  !=  <  <=  >  >=  <:` — the lowest real precedence level.
pub const PREC_COMPARE: u8 = 1;
/// `+  -  &&  ||`
pub const PREC_ADD_SUB: u8 = 2;
/// `*  /  %`
pub const PREC_MULT_DIV: u8 = 3;
/// `^  :`  — `:` is the `_link` binary operator once mutated from a neutral
/// `Colon` tag (`spec.md` §4.C).
pub const PREC_EXP: u8 = 4;

/// Parses a full module (a sequence of top-level statements) from an
/// already-tagged token stream.
pub fn parse_program(tags: &[Tag]) -> RunResult<Vec<Stmt>> {
    let mut parser = Parser { tags, pos: 0 };
    let mut stmts = Vec::new();
    while !parser.eof() {
        stmts.push(parser.parse_statement()?);
    }
    Ok(stmts)
}

struct Parser<'a> {
    tags: &'a [Tag],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn eof(&self) -> bool {
        self.pos >= self.tags.len()
    }

    fn peek(&self) -> Option<&TagType> {
        self.tags.get(self.pos).map(|t| &t.kind)
    }

    fn peek_at(&self, offset: usize) -> Option<&TagType> {
        self.tags.get(self.pos + offset).map(|t| &t.kind)
    }

    /// Line of the current tag, or the last tag's line at end of input (for
    /// "unexpected end of input" error messages).
    fn line(&self) -> u32 {
        self.tags.get(self.pos).or_else(|| self.tags.last()).map_or(1, |t| t.line)
    }

    fn bump(&mut self) -> Tag {
        let tag = self.tags[self.pos].clone();
        self.pos += 1;
        tag
    }

    fn err(&self, message: impl Into<String>) -> TekoException {
        TekoException::lexical(self.line(), message)
    }

    fn expect(&mut self, expected: &TagType, what: &str) -> RunResult<Tag> {
        match self.peek() {
            Some(kind) if kind == expected => Ok(self.bump()),
            _ => Err(self.err(format!("expected {what}"))),
        }
    }

    fn expect_label(&mut self) -> RunResult<String> {
        match self.peek() {
            Some(TagType::Label(name)) => {
                let name = name.clone();
                self.bump();
                Ok(name)
            }
            _ => Err(self.err("expected an identifier")),
        }
    }

    fn eat(&mut self, kind: &TagType) -> bool {
        if self.peek() == Some(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    // ---- Statements ----------------------------------------------------

    fn parse_statement(&mut self) -> RunResult<Stmt> {
        match self.peek() {
            Some(TagType::If) => self.parse_if(),
            Some(TagType::For) => self.parse_for(),
            Some(TagType::While) => self.parse_while(),
            Some(TagType::Class) => self.parse_class(),
            Some(TagType::Let) => self.parse_let(),
            _ => self.parse_expr_led_statement(),
        }
    }

    fn parse_block(&mut self) -> RunResult<Vec<Stmt>> {
        self.expect(&TagType::Open(Brace::Curly), "'{'")?;
        let mut stmts = Vec::new();
        while self.peek() != Some(&TagType::Close(Brace::Curly)) {
            if self.eof() {
                return Err(self.err("unterminated block, expected '}'"));
            }
            stmts.push(self.parse_statement()?);
        }
        self.bump(); // '}'
        Ok(stmts)
    }

    fn parse_if(&mut self) -> RunResult<Stmt> {
        let line = self.line();
        self.bump(); // if
        self.expect(&TagType::Open(Brace::Paren), "'(' after 'if'")?;
        let cond = self.parse_expression(PREC_NONE)?;
        self.expect(&TagType::Close(Brace::Paren), "')' after if condition")?;
        let block = self.parse_block()?;
        let else_ = if self.eat(&TagType::Else) {
            if self.peek() == Some(&TagType::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                // A trailing bare `else block` desugars to `else if (true) block`.
                let else_line = self.line();
                let else_block = self.parse_block()?;
                Some(Box::new(Stmt::If {
                    cond: Expr::Simple(Literal::Bool(true), else_line),
                    block: else_block,
                    else_: None,
                    line: else_line,
                }))
            }
        } else {
            None
        };
        Ok(Stmt::If { cond, block, else_, line })
    }

    fn parse_while(&mut self) -> RunResult<Stmt> {
        let line = self.line();
        self.bump(); // while
        self.expect(&TagType::Open(Brace::Paren), "'(' after 'while'")?;
        let cond = self.parse_expression(PREC_NONE)?;
        self.expect(&TagType::Close(Brace::Paren), "')' after while condition")?;
        let block = self.parse_block()?;
        Ok(Stmt::While { cond, block, line })
    }

    fn parse_for(&mut self) -> RunResult<Stmt> {
        let line = self.line();
        self.bump(); // for
        self.expect(&TagType::Open(Brace::Paren), "'(' after 'for'")?;
        let type_expr = self.parse_expression(PREC_NONE)?;
        let label = self.expect_label()?;
        self.expect(&TagType::In, "'in' in for-loop header")?;
        let iterable = self.parse_expression(PREC_NONE)?;
        self.expect(&TagType::Close(Brace::Paren), "')' after for-loop header")?;
        let block = self.parse_block()?;
        Ok(Stmt::For { type_expr, label, iterable, block, line })
    }

    fn parse_class(&mut self) -> RunResult<Stmt> {
        let line = self.line();
        self.bump(); // class
        let name = self.expect_label()?;
        self.expect(&TagType::Open(Brace::Curly), "'{' in class body")?;
        let mut sections = Vec::new();
        let mut current_visibility = Visibility::Protected;
        let mut current_stmts = Vec::new();
        while self.peek() != Some(&TagType::Close(Brace::Curly)) {
            if self.eof() {
                return Err(self.err("unterminated class body, expected '}'"));
            }
            if let Some(TagType::Visibility(vis)) = self.peek() {
                let vis = *vis;
                // Lookahead: a visibility word only starts a new section when
                // followed by `:`; otherwise it's the start of a declaration
                // whose visibility modifier is a field of the declaration
                // itself (not yet modeled — reserved, see spec.md §4.F).
                if self.peek_at(1) == Some(&TagType::Colon) {
                    if !current_stmts.is_empty() {
                        sections.push((current_visibility, std::mem::take(&mut current_stmts)));
                    }
                    self.bump(); // visibility word
                    self.bump(); // ':'
                    current_visibility = vis;
                    continue;
                }
            }
            current_stmts.push(self.parse_statement()?);
        }
        if !current_stmts.is_empty() || sections.is_empty() {
            sections.push((current_visibility, current_stmts));
        }
        self.bump(); // '}'
        Ok(Stmt::ClassDeclaration { name, sections, line })
    }

    fn parse_let(&mut self) -> RunResult<Stmt> {
        let line = self.line();
        self.bump(); // let
        let mut decls = Vec::new();
        loop {
            let decl_line = self.line();
            let label = self.expect_label()?;
            let initializer = if self.eat(&TagType::Setter(SetterOp::Assign)) {
                Some(self.parse_expression(PREC_NONE)?)
            } else {
                None
            };
            decls.push(Declaration { type_expr: None, label, struct_params: None, initializer, line: decl_line });
            if !self.eat(&TagType::Comma) {
                break;
            }
        }
        self.expect(&TagType::Semicolon, "';' after declaration")?;
        Ok(Stmt::Declaration(decls, line))
    }

    /// Handles every statement form that starts with an expression:
    /// assignments, typed declarations, and plain expression statements.
    /// `spec.md` §4.C "Statement dispatch".
    fn parse_expr_led_statement(&mut self) -> RunResult<Stmt> {
        let line = self.line();
        let expr = self.parse_expression(PREC_NONE)?;
        match self.peek() {
            Some(TagType::Setter(op)) => {
                let op = *op;
                self.bump();
                let mut rhs = self.parse_expression(PREC_NONE)?;
                if let Some(binop) = op.compound_op() {
                    rhs = Expr::BinOp(binop, Box::new(expr.clone()), Box::new(rhs), line);
                }
                self.expect(&TagType::Semicolon, "';' after assignment")?;
                Ok(Stmt::Assignment(expr, rhs, line))
            }
            Some(TagType::Label(_)) => self.parse_declaration_list(expr, line),
            _ => {
                self.expect(&TagType::Semicolon, "';' after expression statement")?;
                Ok(Stmt::Expression(expr, line))
            }
        }
    }

    fn parse_declaration_list(&mut self, type_expr: Expr, line: u32) -> RunResult<Stmt> {
        let mut decls = Vec::new();
        loop {
            let decl_line = self.line();
            let label = self.expect_label()?;
            let struct_params =
                if self.peek() == Some(&TagType::Open(Brace::Paren)) { Some(self.parse_struct_param_list()?) } else { None };
            let initializer = if self.eat(&TagType::Setter(SetterOp::Assign)) {
                Some(self.parse_expression(PREC_NONE)?)
            } else {
                None
            };
            decls.push(Declaration {
                type_expr: Some(type_expr.clone()),
                label,
                struct_params,
                initializer,
                line: decl_line,
            });
            if !self.eat(&TagType::Comma) {
                break;
            }
        }
        self.expect(&TagType::Semicolon, "';' after declaration")?;
        Ok(Stmt::Declaration(decls, line))
    }

    /// `(Type label (= default)?, ...)` — shared by function-declaration
    /// parameter lists and the `(...)` struct-literal disambiguator.
    fn parse_struct_param_list(&mut self) -> RunResult<Vec<StructElem>> {
        self.expect(&TagType::Open(Brace::Paren), "'('")?;
        let mut elems = Vec::new();
        if self.eat(&TagType::Close(Brace::Paren)) {
            return Ok(elems);
        }
        loop {
            elems.push(self.parse_struct_elem()?);
            if !self.eat(&TagType::Comma) {
                break;
            }
        }
        self.expect(&TagType::Close(Brace::Paren), "')' to close parameter list")?;
        Ok(elems)
    }

    fn parse_struct_elem(&mut self) -> RunResult<StructElem> {
        let line = self.line();
        let type_expr = self.parse_expression(PREC_COMPARE)?;
        let label = self.expect_label()?;
        let default = if self.eat(&TagType::Setter(SetterOp::Assign)) { Some(self.parse_expression(PREC_NONE)?) } else { None };
        Ok(StructElem { type_expr, label, default, line })
    }

    // ---- Expressions -----------------------------------------------------

    fn parse_expression(&mut self, min_prec: u8) -> RunResult<Expr> {
        let mut left = self.parse_prefix()?;
        loop {
            match self.try_postfix(&left, min_prec)? {
                Some(next) => left = next,
                None => break,
            }
        }
        Ok(left)
    }

    fn parse_prefix(&mut self) -> RunResult<Expr> {
        let line = self.line();
        match self.peek() {
            None => Err(self.err("unexpected end of input")),
            Some(TagType::Label(name)) => {
                let name = name.clone();
                self.bump();
                Ok(Expr::Simple(Literal::Label(name), line))
            }
            Some(TagType::IntLit(v)) => {
                let v = *v;
                self.bump();
                Ok(Expr::Simple(Literal::Int(v), line))
            }
            Some(TagType::RealLit(v)) => {
                let v = *v;
                self.bump();
                Ok(Expr::Simple(Literal::Real(v), line))
            }
            Some(TagType::BoolLit(v)) => {
                let v = *v;
                self.bump();
                Ok(Expr::Simple(Literal::Bool(v), line))
            }
            Some(TagType::StringLit(s)) => {
                let s = s.clone();
                self.bump();
                Ok(Expr::Simple(Literal::Str(s), line))
            }
            Some(TagType::Bang) => {
                self.bump();
                let operand = self.parse_expression(PREC_EXP)?;
                Ok(Expr::Not(Box::new(operand), line))
            }
            // Prefix `$`: every scenario in spec.md §8 writes the `_tostr`
            // conversion prefix (`print($a)`), even though ConversionExpression
            // is otherwise postfix-only. Desugars to the postfix form applied
            // to a tightly-bound operand (see SPEC_FULL.md / DESIGN.md).
            Some(TagType::Conversion(ConvOp::ToStr)) => {
                self.bump();
                let operand = self.parse_expression(PREC_EXP)?;
                Ok(Expr::Conversion(Box::new(operand), ConvOp::ToStr, line))
            }
            Some(TagType::Conversion(conv @ (ConvOp::Curly | ConvOp::Square | ConvOp::Angle))) => {
                let conv = *conv;
                self.bump();
                let brace = match conv {
                    ConvOp::Curly => Brace::Curly,
                    ConvOp::Square => Brace::Square,
                    ConvOp::Angle => Brace::Angle,
                    _ => unreachable!(),
                };
                Ok(Expr::Sequence(brace, Vec::new(), line))
            }
            Some(TagType::Open(Brace::Paren)) => self.parse_paren_expr(),
            Some(TagType::Open(Brace::Curly)) => self.parse_curly_expr(),
            Some(TagType::Open(Brace::Square)) => {
                self.bump();
                let elems = self.parse_sequence_elems(&TagType::Close(Brace::Square), PREC_NONE)?;
                self.expect(&TagType::Close(Brace::Square), "']' to close array literal")?;
                Ok(Expr::Sequence(Brace::Square, elems, line))
            }
            Some(TagType::LAngle) => {
                self.bump();
                // Elements are parsed above COMPARE precedence so a bare
                // `>`/`<` inside an element can't be confused with the
                // literal's own closing bracket; use parens to compare.
                let elems = self.parse_sequence_elems(&TagType::RAngle, PREC_COMPARE)?;
                self.expect(&TagType::RAngle, "'>' to close set literal")?;
                Ok(Expr::Sequence(Brace::Angle, elems, line))
            }
            Some(other) => Err(self.err(format!("unexpected token {other:?} in expression"))),
        }
    }

    fn parse_sequence_elems(&mut self, terminator: &TagType, elem_min_prec: u8) -> RunResult<Vec<Expr>> {
        let mut elems = Vec::new();
        if self.peek() == Some(terminator) {
            return Ok(elems);
        }
        loop {
            elems.push(self.parse_expression(elem_min_prec)?);
            if !self.eat(&TagType::Comma) {
                break;
            }
        }
        Ok(elems)
    }

    /// `spec.md` §4.C: "Sequence/CodeBlock/Struct disambiguation for `{…}`".
    /// Scans forward with a brace-depth counter; a `;` found before the
    /// matching `}` at depth 0 means this is a code block, not a sequence.
    fn parse_curly_expr(&mut self) -> RunResult<Expr> {
        let line = self.line();
        if self.is_codeblock_ahead() {
            let block = self.parse_block()?;
            Ok(Expr::CodeBlock(block, line))
        } else {
            self.bump(); // '{'
            let elems = self.parse_sequence_elems(&TagType::Close(Brace::Curly), PREC_NONE)?;
            self.expect(&TagType::Close(Brace::Curly), "'}' to close list literal")?;
            Ok(Expr::Sequence(Brace::Curly, elems, line))
        }
    }

    fn is_codeblock_ahead(&self) -> bool {
        debug_assert_eq!(self.peek(), Some(&TagType::Open(Brace::Curly)));
        let mut depth: i32 = 0;
        let mut i = self.pos;
        loop {
            let Some(kind) = self.peek_at(i - self.pos) else {
                return false;
            };
            match kind {
                TagType::Open(Brace::Curly) => depth += 1,
                TagType::Close(Brace::Curly) => {
                    depth -= 1;
                    if depth == 0 {
                        return false;
                    }
                }
                TagType::Semicolon if depth == 1 => return true,
                _ => {}
            }
            i += 1;
        }
    }

    /// `spec.md` §4.C "For `(…)` (paren)": grouping, or — when the first
    /// parsed expression is immediately followed by a label — a struct
    /// (parameter-list) literal, reparsed from the same start position.
    fn parse_paren_expr(&mut self) -> RunResult<Expr> {
        let line = self.line();
        self.bump(); // '('
        if self.eat(&TagType::Close(Brace::Paren)) {
            return Ok(Expr::NewStruct(Vec::new(), line));
        }
        let rewind_pos = self.pos;
        let first = self.parse_expression(PREC_NONE)?;
        if matches!(self.peek(), Some(TagType::Label(_))) {
            self.pos = rewind_pos;
            let mut elems = Vec::new();
            loop {
                elems.push(self.parse_struct_elem()?);
                if !self.eat(&TagType::Comma) {
                    break;
                }
            }
            self.expect(&TagType::Close(Brace::Paren), "')' to close parameter list")?;
            return Ok(Expr::NewStruct(elems, line));
        }
        if self.eat(&TagType::Close(Brace::Paren)) {
            return Ok(first);
        }
        if self.peek() == Some(&TagType::Comma) {
            return Err(self.err("bare comma-separated tuples are not a supported expression; group a single value with parentheses or declare a struct type"));
        }
        Err(self.err("expected ')' to close parenthesized expression"))
    }

    /// Applies at most one postfix operation to `left`, returning `None`
    /// when no postfix form applies at the caller's precedence — the
    /// signal to stop the Pratt loop.
    fn try_postfix(&mut self, left: &Expr, min_prec: u8) -> RunResult<Option<Expr>> {
        let line = self.line();
        match self.peek() {
            Some(TagType::Open(Brace::Paren)) => {
                let args = self.parse_call_args()?;
                Ok(Some(Expr::Call(Box::new(left.clone()), args, line)))
            }
            Some(TagType::Dot) => {
                self.bump();
                if let Some(TagType::Label(name)) = self.peek() {
                    let name = name.clone();
                    self.bump();
                    Ok(Some(Expr::Attr(Box::new(left.clone()), name, line)))
                } else {
                    Ok(Some(Expr::Conversion(Box::new(left.clone()), ConvOp::ToReal, line)))
                }
            }
            Some(TagType::Colon) => {
                if PREC_EXP > min_prec {
                    self.bump();
                    let rhs = self.parse_expression(PREC_EXP)?;
                    Ok(Some(Expr::BinOp(BinOp::Link, Box::new(left.clone()), Box::new(rhs), line)))
                } else {
                    Ok(None)
                }
            }
            Some(TagType::LAngle) => {
                if PREC_COMPARE > min_prec {
                    self.bump();
                    let rhs = self.parse_expression(PREC_COMPARE)?;
                    Ok(Some(Expr::Comparison(CompOp::Lt, Box::new(left.clone()), Box::new(rhs), line)))
                } else {
                    Ok(None)
                }
            }
            Some(TagType::RAngle) => {
                if PREC_COMPARE > min_prec {
                    self.bump();
                    let rhs = self.parse_expression(PREC_COMPARE)?;
                    Ok(Some(Expr::Comparison(CompOp::Gt, Box::new(left.clone()), Box::new(rhs), line)))
                } else {
                    Ok(None)
                }
            }
            Some(TagType::Conversion(conv)) => {
                let conv = *conv;
                self.bump();
                Ok(Some(Expr::Conversion(Box::new(left.clone()), conv, line)))
            }
            Some(TagType::BinOp(op)) => {
                let op = *op;
                let prec = op.precedence();
                if prec > min_prec {
                    self.bump();
                    let rhs = self.parse_expression(prec)?;
                    Ok(Some(Expr::BinOp(op, Box::new(left.clone()), Box::new(rhs), line)))
                } else {
                    Ok(None)
                }
            }
            Some(TagType::Comparison(op)) => {
                if PREC_COMPARE > min_prec {
                    let op = *op;
                    self.bump();
                    let rhs = self.parse_expression(PREC_COMPARE)?;
                    Ok(Some(Expr::Comparison(op, Box::new(left.clone()), Box::new(rhs), line)))
                } else {
                    Ok(None)
                }
            }
            _ => Ok(None),
        }
    }

    fn parse_call_args(&mut self) -> RunResult<Vec<ArgNode>> {
        self.expect(&TagType::Open(Brace::Paren), "'('")?;
        let mut args = Vec::new();
        let mut seen_keyword = false;
        if self.eat(&TagType::Close(Brace::Paren)) {
            return Ok(args);
        }
        loop {
            let arg = self.parse_arg(seen_keyword)?;
            if arg.keyword.is_some() {
                seen_keyword = true;
            }
            args.push(arg);
            if !self.eat(&TagType::Comma) {
                break;
            }
        }
        self.expect(&TagType::Close(Brace::Paren), "')' to close argument list")?;
        Ok(args)
    }

    fn parse_arg(&mut self, seen_keyword: bool) -> RunResult<ArgNode> {
        if let (Some(TagType::Label(name)), Some(TagType::Setter(SetterOp::Assign))) = (self.peek(), self.peek_at(1)) {
            let name = name.clone();
            self.bump(); // label
            self.bump(); // '='
            let expr = self.parse_expression(PREC_NONE)?;
            return Ok(ArgNode { expr, keyword: Some(name) });
        }
        if seen_keyword {
            // `spec.md` §7.2 files this under static-semantic errors, not
            // syntactic ones, despite being caught here at parse time.
            return Err(TekoException::static_error(self.line(), "positional argument follows keyword argument"));
        }
        let expr = self.parse_expression(PREC_NONE)?;
        Ok(ArgNode { expr, keyword: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::tag_source;

    fn parse(src: &str) -> Vec<Stmt> {
        parse_program(&tag_source(src).unwrap()).unwrap()
    }

    #[test]
    fn parses_declaration_and_precedence() {
        let stmts = parse("int a = 3 + 4 * 2;");
        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Stmt::Declaration(decls, _) => {
                assert_eq!(decls.len(), 1);
                match decls[0].initializer.as_ref().unwrap() {
                    Expr::BinOp(BinOp::Add, l, r, _) => {
                        assert!(matches!(**l, Expr::Simple(Literal::Int(3), _)));
                        assert!(matches!(**r, Expr::BinOp(BinOp::Mul, _, _, _)));
                    }
                    other => panic!("expected BinOp(Add), got {other:?}"),
                }
            }
            other => panic!("expected Declaration, got {other:?}"),
        }
    }

    #[test]
    fn disambiguates_codeblock_from_sequence() {
        let stmts = parse("int a = { 1; };");
        let Stmt::Declaration(decls, _) = &stmts[0] else { panic!() };
        assert!(matches!(decls[0].initializer, Some(Expr::CodeBlock(_, _))));

        let stmts = parse("int{} a = {1, 2, 3};");
        let Stmt::Declaration(decls, _) = &stmts[0] else { panic!() };
        assert!(matches!(decls[0].type_expr, Some(Expr::Conversion(_, ConvOp::Curly, _))));
        assert!(matches!(decls[0].initializer, Some(Expr::Sequence(Brace::Curly, _, _))));
    }

    #[test]
    fn disambiguates_paren_struct_from_grouping() {
        let stmts = parse("int x = (1 + 2);");
        let Stmt::Declaration(decls, _) = &stmts[0] else { panic!() };
        assert!(matches!(decls[0].initializer, Some(Expr::BinOp(BinOp::Add, _, _, _))));

        let stmts = parse("int add(int a, int b) = { a + b; };");
        let Stmt::Declaration(decls, _) = &stmts[0] else { panic!() };
        assert!(decls[0].struct_params.as_ref().unwrap().len() == 2);
    }

    #[test]
    fn parses_if_else_chain_desugared() {
        let stmts = parse("if (3 < 5) { print(\"y\"); } else { print(\"n\"); }");
        let Stmt::If { else_, .. } = &stmts[0] else { panic!() };
        let else_ = else_.as_ref().unwrap();
        assert!(matches!(**else_, Stmt::If { cond: Expr::Simple(Literal::Bool(true), _), .. }));
    }

    #[test]
    fn positional_after_keyword_errors() {
        let src = "print(obj=1, 2);";
        let result = parse_program(&tag_source(src).unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn for_loop_header_parses() {
        let stmts = parse("for (int k in {1, 2, 3}) { print($k); }");
        assert!(matches!(stmts[0], Stmt::For { .. }));
    }
}
