//! The parser implementation.

use rill_ast::token::{Token, TokenKind};
use rill_ast::tree::*;
use rill_core::text::TextSpan;
use rill_diagnostics::{messages, DiagnosticCollection};
use rill_scanner::tokenize;

/// Parse a whole source text. Returns the program and all lexical plus
/// syntactic diagnostics.
pub fn parse(source: &str) -> (Program, DiagnosticCollection) {
    let (tokens, mut diagnostics) = tokenize(source);
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    diagnostics.extend(parser.take_diagnostics());
    (program, diagnostics)
}

/// The recursive-descent parser over a pre-scanned token list.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Cleared after a report so an error burst produces one diagnostic;
    /// set again as soon as the parser makes progress.
    errors_enabled: bool,
    diagnostics: DiagnosticCollection,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(matches!(
            tokens.last(),
            Some(token) if token.kind == TokenKind::EndOfFile
        ));
        Self {
            tokens,
            pos: 0,
            errors_enabled: true,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    #[inline]
    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    #[inline]
    fn peek(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    #[inline]
    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.at(TokenKind::EndOfFile)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.at_end() {
            self.pos += 1;
        }
        self.errors_enabled = true;
        token
    }

    fn try_consume(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume a token of the given kind, or report once and fabricate an
    /// empty token at the current position.
    fn consume(&mut self, kind: TokenKind) -> Token {
        if self.at(kind) {
            return self.advance();
        }
        self.report_unexpected(kind.description());
        Token::missing(kind, self.current().span)
    }

    fn report_unexpected(&mut self, expected: &str) {
        if !self.errors_enabled {
            return;
        }
        self.errors_enabled = false;
        let current = self.current();
        let actual = if current.text.is_empty() {
            current.kind.description().to_string()
        } else {
            current.text.clone()
        };
        self.diagnostics
            .report(current.span, &messages::UNEXPECTED_TOKEN, &[&actual, expected]);
    }

    // ========================================================================
    // Declarations and statements
    // ========================================================================

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.at_end() {
            let before = self.pos;
            statements.push(self.parse_declaration());
            if self.pos == before {
                // No progress: drop the offending token and start fresh.
                self.pos += 1;
                self.errors_enabled = true;
            }
        }
        Program { statements }
    }

    fn parse_declaration(&mut self) -> Stmt {
        match self.current().kind {
            TokenKind::Fun if self.is_function_declaration() => {
                Stmt::Function(self.parse_function_decl())
            }
            TokenKind::Record => Stmt::Record(self.parse_record_decl()),
            TokenKind::Let => Stmt::Variable(self.parse_variable_decl(false)),
            TokenKind::Def => Stmt::Variable(self.parse_variable_decl(true)),
            _ => self.parse_statement(),
        }
    }

    fn parse_statement(&mut self) -> Stmt {
        match self.current().kind {
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::Do => self.parse_do_while_stmt(),
            TokenKind::Defer => self.parse_defer_stmt(),
            TokenKind::OpenBrace => Stmt::Block(self.parse_block()),
            _ => Stmt::Expression(self.parse_expression()),
        }
    }

    /// Whether the `fun` at the current position starts a declaration:
    /// `fun name(...)`, `fun Receiver.name(...)` or `fun (Receiver).name(...)`.
    /// Anything else (e.g. an immediately invoked `fun (x: Int) ...`) is an
    /// expression.
    fn is_function_declaration(&self) -> bool {
        match self.peek(1).kind {
            TokenKind::Identifier => true,
            TokenKind::OpenParen => {
                let close = self.matching_paren(self.pos + 1);
                self.tokens
                    .get(close + 1)
                    .is_some_and(|t| t.kind == TokenKind::Dot)
            }
            _ => false,
        }
    }

    /// Index of the `)` matching the `(` at `open`, or the end-of-file
    /// index when unbalanced.
    fn matching_paren(&self, open: usize) -> usize {
        let mut depth = 0usize;
        let mut index = open;
        while index < self.tokens.len() - 1 {
            match self.tokens[index].kind {
                TokenKind::OpenParen => depth += 1,
                TokenKind::CloseParen => {
                    depth -= 1;
                    if depth == 0 {
                        return index;
                    }
                }
                _ => {}
            }
            index += 1;
        }
        index
    }

    fn parse_function_decl(&mut self) -> FunctionDecl {
        let fun_token = self.consume(TokenKind::Fun);
        let receiver = self.parse_method_receiver();
        let name = self.consume(TokenKind::Identifier);
        let (params, close_paren_span) = self.parse_params();
        let return_type = self
            .try_consume(TokenKind::Colon)
            .map(|_| self.parse_type());
        let body = self.parse_block();
        let span = fun_token.span.union(&body.span);
        FunctionDecl {
            receiver,
            name,
            params,
            return_type,
            body,
            close_paren_span,
            span,
        }
    }

    fn parse_method_receiver(&mut self) -> Option<TypeSyntax> {
        if self.at(TokenKind::Identifier) && self.peek(1).kind == TokenKind::Dot {
            let name = self.advance();
            self.consume(TokenKind::Dot);
            return Some(TypeSyntax::Normal(name));
        }
        if self.at(TokenKind::OpenParen) {
            self.advance();
            let ty = self.parse_type();
            self.consume(TokenKind::CloseParen);
            self.consume(TokenKind::Dot);
            return Some(ty);
        }
        None
    }

    /// `(name: T, ...)`. Returns the parameters and the closing `)` span.
    fn parse_params(&mut self) -> (Vec<Param>, TextSpan) {
        self.consume(TokenKind::OpenParen);
        let mut params = Vec::new();
        while !self.at(TokenKind::CloseParen) && !self.at_end() {
            let before = self.pos;
            let name = self.consume(TokenKind::Identifier);
            self.consume(TokenKind::Colon);
            let ty = self.parse_type();
            params.push(Param { name, ty });
            if !self.at(TokenKind::CloseParen) {
                self.consume(TokenKind::Comma);
            }
            if self.pos == before {
                break;
            }
        }
        let close = self.consume(TokenKind::CloseParen);
        (params, close.span)
    }

    fn parse_record_decl(&mut self) -> RecordDecl {
        let record_token = self.consume(TokenKind::Record);
        let name = self.consume(TokenKind::Identifier);
        let (fields, close_span) = self.parse_params();
        let span = record_token.span.union(&close_span);
        RecordDecl { name, fields, span }
    }

    fn parse_variable_decl(&mut self, read_only: bool) -> VariableDecl {
        let keyword = if read_only {
            self.consume(TokenKind::Def)
        } else {
            self.consume(TokenKind::Let)
        };
        let name = self.consume(TokenKind::Identifier);
        let ty = self
            .try_consume(TokenKind::Colon)
            .map(|_| self.parse_type());
        let equal = self.consume(TokenKind::Equal);
        let value = self.parse_expression();
        let span = keyword.span.union(&value.span());
        VariableDecl {
            keyword_span: keyword.span,
            read_only,
            name,
            ty,
            equal_span: equal.span,
            value,
            span,
        }
    }

    fn parse_if_stmt(&mut self) -> Stmt {
        let if_token = self.consume(TokenKind::If);
        self.consume(TokenKind::OpenParen);
        let condition = self.parse_expression();
        self.consume(TokenKind::CloseParen);
        let then_branch = Box::new(self.parse_statement());
        let else_branch = self
            .try_consume(TokenKind::Else)
            .map(|_| Box::new(self.parse_statement()));
        let end = else_branch
            .as_deref()
            .map(Stmt::span)
            .unwrap_or_else(|| then_branch.span());
        Stmt::If(IfStmt {
            condition,
            then_branch,
            else_branch,
            span: if_token.span.union(&end),
        })
    }

    fn parse_while_stmt(&mut self) -> Stmt {
        let while_token = self.consume(TokenKind::While);
        self.consume(TokenKind::OpenParen);
        let condition = self.parse_expression();
        self.consume(TokenKind::CloseParen);
        let body = Box::new(self.parse_statement());
        let span = while_token.span.union(&body.span());
        Stmt::While(WhileStmt {
            condition,
            body,
            span,
        })
    }

    fn parse_do_while_stmt(&mut self) -> Stmt {
        let do_token = self.consume(TokenKind::Do);
        let body = Box::new(self.parse_statement());
        self.consume(TokenKind::While);
        self.consume(TokenKind::OpenParen);
        let condition = self.parse_expression();
        let close = self.consume(TokenKind::CloseParen);
        Stmt::DoWhile(DoWhileStmt {
            body,
            condition,
            span: do_token.span.union(&close.span),
        })
    }

    fn parse_defer_stmt(&mut self) -> Stmt {
        let defer_token = self.consume(TokenKind::Defer);
        let body = Box::new(self.parse_statement());
        let span = defer_token.span.union(&body.span());
        Stmt::Defer(DeferStmt { body, span })
    }

    fn parse_block(&mut self) -> Block {
        let open = self.consume(TokenKind::OpenBrace);
        let mut statements = Vec::new();
        while !self.at(TokenKind::CloseBrace) && !self.at_end() {
            let before = self.pos;
            statements.push(self.parse_declaration());
            if self.pos == before {
                self.pos += 1;
                self.errors_enabled = true;
            }
        }
        let close = self.consume(TokenKind::CloseBrace);
        Block {
            statements,
            span: open.span.union(&close.span),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn parse_expression(&mut self) -> Expr {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Expr {
        let target = self.parse_ternary();
        if let Some(equal) = self.try_consume(TokenKind::Equal) {
            let value = self.parse_assignment();
            let span = target.span().union(&value.span());
            return Expr::Assignment(AssignmentExpr {
                target: Box::new(target),
                equal_span: equal.span,
                value: Box::new(value),
                span,
            });
        }
        target
    }

    fn parse_ternary(&mut self) -> Expr {
        let condition = self.parse_disjunction();
        if self.try_consume(TokenKind::Question).is_some() {
            let then_expr = self.parse_expression();
            self.consume(TokenKind::Colon);
            let else_expr = self.parse_expression();
            let span = condition.span().union(&else_expr.span());
            return Expr::Ternary(TernaryExpr {
                condition: Box::new(condition),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
                span,
            });
        }
        condition
    }

    fn parse_binary_level(
        &mut self,
        operators: &[TokenKind],
        next: fn(&mut Self) -> Expr,
    ) -> Expr {
        let mut left = next(self);
        while operators.contains(&self.current().kind) {
            let operator = self.advance();
            let right = next(self);
            let span = left.span().union(&right.span());
            left = Expr::Binary(BinaryExpr {
                left: Box::new(left),
                operator,
                right: Box::new(right),
                span,
            });
        }
        left
    }

    fn parse_disjunction(&mut self) -> Expr {
        self.parse_binary_level(&[TokenKind::PipePipe], Self::parse_conjunction)
    }

    fn parse_conjunction(&mut self) -> Expr {
        self.parse_binary_level(&[TokenKind::AmpersandAmpersand], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Expr {
        self.parse_binary_level(
            &[TokenKind::EqualEqual, TokenKind::BangEqual],
            Self::parse_comparison,
        )
    }

    fn parse_comparison(&mut self) -> Expr {
        self.parse_binary_level(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Expr {
        self.parse_binary_level(&[TokenKind::Plus, TokenKind::Minus], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Expr {
        self.parse_binary_level(&[TokenKind::Star, TokenKind::Slash], Self::parse_cast)
    }

    fn parse_cast(&mut self) -> Expr {
        let mut expr = self.parse_unary();
        while self.try_consume(TokenKind::As).is_some() {
            let ty = self.parse_type();
            let span = expr.span().union(&ty.span());
            expr = Expr::Cast(CastExpr {
                expr: Box::new(expr),
                ty,
                span,
            });
        }
        expr
    }

    fn parse_unary(&mut self) -> Expr {
        if matches!(
            self.current().kind,
            TokenKind::Plus | TokenKind::Minus | TokenKind::Bang
        ) {
            let operator = self.advance();
            let operand = self.parse_unary();
            let span = operator.span.union(&operand.span());
            return Expr::Unary(UnaryExpr {
                operator,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        // Postfix operators only bind on the same line, so a statement
        // starting with `(` or `[` is not a call/index on the previous one.
        while !self.current().line_break_before {
            match self.current().kind {
                TokenKind::OpenParen => {
                    let (arguments, args_span) = self.parse_call_args();
                    let span = expr.span().union(&args_span);
                    expr = Expr::Call(CallExpr {
                        target: Box::new(expr),
                        arguments,
                        args_span,
                        span,
                    });
                }
                TokenKind::OpenBracket => {
                    self.advance();
                    let index = self.parse_expression();
                    let close = self.consume(TokenKind::CloseBracket);
                    let span = expr.span().union(&close.span);
                    expr = Expr::Index(IndexExpr {
                        target: Box::new(expr),
                        index: Box::new(index),
                        span,
                    });
                }
                TokenKind::Dot => {
                    self.advance();
                    let name = self.consume(TokenKind::Identifier);
                    let span = expr.span().union(&name.span);
                    expr = Expr::Get(GetExpr {
                        target: Box::new(expr),
                        name,
                        span,
                    });
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_call_args(&mut self) -> (Vec<Expr>, TextSpan) {
        let open = self.consume(TokenKind::OpenParen);
        let mut arguments = Vec::new();
        while !self.at(TokenKind::CloseParen) && !self.at_end() {
            let before = self.pos;
            arguments.push(self.parse_expression());
            if !self.at(TokenKind::CloseParen) {
                self.consume(TokenKind::Comma);
            }
            if self.pos == before {
                break;
            }
        }
        let close = self.consume(TokenKind::CloseParen);
        (arguments, open.span.union(&close.span))
    }

    fn parse_primary(&mut self) -> Expr {
        match self.current().kind {
            TokenKind::Int
            | TokenKind::Long
            | TokenKind::Float
            | TokenKind::Double
            | TokenKind::String
            | TokenKind::Char
            | TokenKind::True
            | TokenKind::False => Expr::Literal(LiteralExpr {
                token: self.advance(),
            }),
            TokenKind::None => Expr::NoneLiteral(NoneExpr {
                span: self.advance().span,
            }),
            TokenKind::SelfKeyword => Expr::SelfExpr(SelfExpr {
                span: self.advance().span,
            }),
            TokenKind::Break => Expr::Break(BreakExpr {
                span: self.advance().span,
            }),
            TokenKind::Continue => Expr::Continue(ContinueExpr {
                span: self.advance().span,
            }),
            TokenKind::Identifier => Expr::Variable(VariableExpr {
                name: self.advance(),
            }),
            TokenKind::Fun => self.parse_function_expr(),
            TokenKind::New => self.parse_record_init(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Panic => {
                let keyword = self.advance();
                let message = self.parse_expression();
                let span = keyword.span.union(&message.span());
                Expr::Panic(PanicExpr {
                    keyword_span: keyword.span,
                    message: Box::new(message),
                    span,
                })
            }
            TokenKind::Try => {
                let keyword = self.advance();
                let expr = self.parse_expression();
                let span = keyword.span.union(&expr.span());
                Expr::Try(TryExpr {
                    keyword_span: keyword.span,
                    expr: Box::new(expr),
                    span,
                })
            }
            TokenKind::OpenBracket => self.parse_list_literal(),
            TokenKind::OpenBrace => self.parse_brace_literal(),
            TokenKind::OpenParen => self.parse_paren_or_tuple(),
            _ => {
                self.report_unexpected("expression");
                Expr::Variable(VariableExpr {
                    name: Token::missing(TokenKind::Identifier, self.current().span),
                })
            }
        }
    }

    fn parse_function_expr(&mut self) -> Expr {
        let fun_token = self.consume(TokenKind::Fun);
        let (params, close_paren_span) = self.parse_params();
        let return_type = self
            .try_consume(TokenKind::Colon)
            .map(|_| self.parse_type());
        let body = self.parse_block();
        let span = fun_token.span.union(&body.span);
        Expr::FunctionExpr(FunctionExpr {
            params,
            return_type,
            body,
            close_paren_span,
            span,
        })
    }

    fn parse_record_init(&mut self) -> Expr {
        let new_token = self.consume(TokenKind::New);
        let name = self.consume(TokenKind::Identifier);
        let (arguments, args_span) = self.parse_call_args();
        let span = new_token.span.union(&args_span);
        Expr::RecordInit(RecordInitExpr {
            name,
            arguments,
            args_span,
            span,
        })
    }

    /// `return` takes a value only when the next token is on the same line
    /// and can start an expression.
    fn parse_return(&mut self) -> Expr {
        let keyword = self.consume(TokenKind::Return);
        let next = self.current();
        let value = if !next.line_break_before && next.kind.can_start_expression() {
            Some(Box::new(self.parse_expression()))
        } else {
            None
        };
        let span = value
            .as_deref()
            .map(|v| keyword.span.union(&v.span()))
            .unwrap_or(keyword.span);
        Expr::Return(ReturnExpr {
            keyword_span: keyword.span,
            value,
            span,
        })
    }

    fn parse_list_literal(&mut self) -> Expr {
        let open = self.consume(TokenKind::OpenBracket);
        let mut elements = Vec::new();
        while !self.at(TokenKind::CloseBracket) && !self.at_end() {
            let before = self.pos;
            elements.push(self.parse_expression());
            if !self.at(TokenKind::CloseBracket) {
                self.consume(TokenKind::Comma);
            }
            if self.pos == before {
                break;
            }
        }
        let close = self.consume(TokenKind::CloseBracket);
        Expr::List(ListExpr {
            elements,
            span: open.span.union(&close.span),
        })
    }

    /// `{}` is an empty literal whose map/set flavor the binder infers;
    /// otherwise a `:` after the first expression selects a map.
    fn parse_brace_literal(&mut self) -> Expr {
        let open = self.consume(TokenKind::OpenBrace);
        if let Some(close) = self.try_consume(TokenKind::CloseBrace) {
            return Expr::Brace(BraceExpr {
                literal: BraceLiteral::Empty,
                span: open.span.union(&close.span),
            });
        }
        let first = self.parse_expression();
        if self.try_consume(TokenKind::Colon).is_some() {
            let first_value = self.parse_expression();
            let mut entries = vec![(first, first_value)];
            while self.try_consume(TokenKind::Comma).is_some() {
                let before = self.pos;
                let key = self.parse_expression();
                self.consume(TokenKind::Colon);
                let value = self.parse_expression();
                entries.push((key, value));
                if self.pos == before {
                    break;
                }
            }
            let close = self.consume(TokenKind::CloseBrace);
            return Expr::Brace(BraceExpr {
                literal: BraceLiteral::Map(entries),
                span: open.span.union(&close.span),
            });
        }
        let mut elements = vec![first];
        while self.try_consume(TokenKind::Comma).is_some() {
            let before = self.pos;
            elements.push(self.parse_expression());
            if self.pos == before {
                break;
            }
        }
        let close = self.consume(TokenKind::CloseBrace);
        Expr::Brace(BraceExpr {
            literal: BraceLiteral::Set(elements),
            span: open.span.union(&close.span),
        })
    }

    fn parse_paren_or_tuple(&mut self) -> Expr {
        let open = self.consume(TokenKind::OpenParen);
        let mut elements = vec![self.parse_expression()];
        while self.try_consume(TokenKind::Comma).is_some() {
            let before = self.pos;
            elements.push(self.parse_expression());
            if self.pos == before {
                break;
            }
        }
        let close = self.consume(TokenKind::CloseParen);
        let span = open.span.union(&close.span);
        if elements.len() == 1 {
            Expr::Paren(ParenExpr {
                inner: Box::new(elements.pop().unwrap()),
                span,
            })
        } else {
            Expr::Tuple(TupleExpr { elements, span })
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    pub fn parse_type(&mut self) -> TypeSyntax {
        let first = self.parse_postfix_type();
        if !self.at(TokenKind::Pipe) {
            return first;
        }
        let mut members = vec![first];
        while self.try_consume(TokenKind::Pipe).is_some() {
            members.push(self.parse_postfix_type());
        }
        let span = members[0].span().union(&members[members.len() - 1].span());
        TypeSyntax::Union(members, span)
    }

    /// Postfix brackets only apply when glued to the type they follow:
    /// `Int{}` is a set type while `Int { ... }` leaves the brace alone
    /// (it is a function body or a brace literal).
    fn parse_postfix_type(&mut self) -> TypeSyntax {
        let mut ty = self.parse_primary_type();
        loop {
            let glued = self.current().span.start == ty.span().end();
            if glued
                && self.at(TokenKind::OpenBracket)
                && self.peek(1).kind == TokenKind::CloseBracket
            {
                self.advance();
                let close = self.advance();
                let span = ty.span().union(&close.span);
                ty = TypeSyntax::List(Box::new(ty), span);
            } else if glued && self.at(TokenKind::OpenBrace) {
                self.advance();
                if let Some(close) = self.try_consume(TokenKind::CloseBrace) {
                    let span = ty.span().union(&close.span);
                    ty = TypeSyntax::Set(Box::new(ty), span);
                } else {
                    let value = self.parse_type();
                    let close = self.consume(TokenKind::CloseBrace);
                    let span = ty.span().union(&close.span);
                    ty = TypeSyntax::Map(Box::new(ty), Box::new(value), span);
                }
            } else {
                return ty;
            }
        }
    }

    fn parse_primary_type(&mut self) -> TypeSyntax {
        if let Some(open) = self.try_consume(TokenKind::OpenParen) {
            // `()` must be a function type: the arrow is required.
            if self.try_consume(TokenKind::CloseParen).is_some() {
                self.consume(TokenKind::Arrow);
                let ret = self.parse_type();
                let span = open.span.union(&ret.span());
                return TypeSyntax::Function(Vec::new(), Box::new(ret), span);
            }
            let mut members = vec![self.parse_type()];
            while self.try_consume(TokenKind::Comma).is_some() {
                let before = self.pos;
                members.push(self.parse_type());
                if self.pos == before {
                    break;
                }
            }
            let close = self.consume(TokenKind::CloseParen);
            if self.try_consume(TokenKind::Arrow).is_some() {
                let ret = self.parse_type();
                let span = open.span.union(&ret.span());
                return TypeSyntax::Function(members, Box::new(ret), span);
            }
            let span = open.span.union(&close.span);
            if members.len() > 1 {
                return TypeSyntax::Tuple(members, span);
            }
            return TypeSyntax::Paren(Box::new(members.pop().unwrap()), span);
        }
        TypeSyntax::Normal(self.consume(TokenKind::Identifier))
    }
}
