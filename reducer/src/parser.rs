// Parser for GLSL shader source.
//
// Parses a token stream (from the lexer) into a `TranslationUnit`. Uses
// chumsky combinators. Parentheses are kept as `Paren` nodes so the printed
// tree matches the source shape.
//
// Preconditions: input is a valid token stream from `lexer::lex()`.
// Postconditions: returns a tree whose nodes carry `NodeId::UNASSIGNED`;
//   `parse_unit` numbers them from the caller's allocator.
// Failure modes: syntax errors produce `Rich` diagnostics.
// Side effects: none.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;
use chumsky::Boxed;

use crate::ast::*;
use crate::id::IdAllocator;
use crate::lexer::Token;

/// Result of parsing: tree plus any errors.
#[derive(Debug)]
pub struct ParseResult {
    pub unit: Option<TranslationUnit>,
    pub errors: Vec<Rich<'static, Token, SimpleSpan>>,
}

type ParserExtra<'tokens> = extra::Err<Rich<'tokens, Token, SimpleSpan>>;

/// Parse a GLSL source string. Lexes then parses.
pub fn parse(source: &str) -> ParseResult {
    let lex_result = crate::lexer::lex(source);
    let len = source.len();

    let token_iter = lex_result.tokens.into_iter().map(|(tok, span)| {
        let cspan: SimpleSpan = (span.start..span.end).into();
        (tok, cspan)
    });
    let eoi: SimpleSpan = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let (unit, parse_errors) = unit_parser().parse(stream).into_output_errors();

    let mut all_errors: Vec<Rich<'static, Token, SimpleSpan>> = lex_result
        .errors
        .into_iter()
        .map(|e| {
            let span: SimpleSpan = (e.span.start..e.span.end).into();
            Rich::custom(span, e.message)
        })
        .collect();
    all_errors.extend(parse_errors.into_iter().map(|e| e.into_owned()));

    ParseResult {
        unit,
        errors: all_errors,
    }
}

/// Parse and number a stage. Any lex or parse error rejects the whole source.
pub fn parse_unit(
    source: &str,
    ids: &mut IdAllocator,
) -> Result<TranslationUnit, Vec<Rich<'static, Token, SimpleSpan>>> {
    let result = parse(source);
    match result.unit {
        Some(mut unit) if result.errors.is_empty() => {
            unit.number_nodes(ids);
            Ok(unit)
        }
        _ => Err(result.errors),
    }
}

// ── Expressions ──

#[derive(Clone)]
enum Postfix {
    Index(Expr),
    Member(String),
    Inc,
    Dec,
}

fn binary_level<'tokens, I>(
    operand: Boxed<'tokens, 'tokens, I, Expr, ParserExtra<'tokens>>,
    op: impl Parser<'tokens, I, BinaryOp, ParserExtra<'tokens>> + Clone + 'tokens,
) -> Boxed<'tokens, 'tokens, I, Expr, ParserExtra<'tokens>>
where
    I: ValueInput<'tokens, Token = Token, Span = SimpleSpan>,
{
    operand
        .clone()
        .foldl(op.then(operand).repeated(), |lhs, (op, rhs)| {
            Expr::binary(op, lhs, rhs)
        })
        .boxed()
}

fn expr_parser<'tokens, I>() -> impl Parser<'tokens, I, Expr, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let ident = select! { Token::Ident(name) => name };

        let literal = select! {
            Token::IntLit(v) => Literal::Int(v),
            Token::UintLit(v) => Literal::Uint(v),
            Token::FloatLit(v) => Literal::Float(v),
            Token::BoolLit(v) => Literal::Bool(v),
        }
        .map(Expr::literal);

        // ── Primary: literal | call | variable | '(' expr ')' ──

        let args = expr
            .clone()
            .separated_by(just(Token::Comma))
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LParen), just(Token::RParen));

        let call_or_variable = ident.clone().then(args.or_not()).map(|(name, args)| match args {
            Some(args) => Expr::new(ExprKind::Call { callee: name, args }),
            None => Expr::variable(name),
        });

        let paren = expr
            .clone()
            .delimited_by(just(Token::LParen), just(Token::RParen))
            .map(|inner| Expr::new(ExprKind::Paren(Box::new(inner))));

        let primary = choice((literal, call_or_variable, paren));

        // ── Postfix: [index] .field ++ -- ──

        let postfix_op = choice((
            expr.clone()
                .delimited_by(just(Token::LBracket), just(Token::RBracket))
                .map(Postfix::Index),
            just(Token::Dot).ignore_then(ident.clone()).map(Postfix::Member),
            just(Token::Inc).to(Postfix::Inc),
            just(Token::Dec).to(Postfix::Dec),
        ));

        let postfix = primary.foldl(postfix_op.repeated(), |base, op| match op {
            Postfix::Index(index) => Expr::index(base, index),
            Postfix::Member(field) => Expr::new(ExprKind::Member {
                base: Box::new(base),
                field,
            }),
            Postfix::Inc => Expr::new(ExprKind::Unary {
                op: UnaryOp::PostInc,
                operand: Box::new(base),
            }),
            Postfix::Dec => Expr::new(ExprKind::Unary {
                op: UnaryOp::PostDec,
                operand: Box::new(base),
            }),
        });

        // ── Prefix unary ──

        let prefix_op = select! {
            Token::Minus => UnaryOp::Neg,
            Token::Plus => UnaryOp::Plus,
            Token::Bang => UnaryOp::Not,
            Token::Tilde => UnaryOp::BitNot,
            Token::Inc => UnaryOp::PreInc,
            Token::Dec => UnaryOp::PreDec,
        };

        let unary = prefix_op
            .repeated()
            .foldr(postfix, |op, operand| {
                Expr::new(ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                })
            })
            .boxed();

        // ── Binary levels, tightest first ──

        let multiplicative = binary_level(
            unary,
            select! {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Rem,
            },
        );
        let additive = binary_level(
            multiplicative,
            select! {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
            },
        );
        let shift = binary_level(
            additive,
            select! {
                Token::Shl => BinaryOp::Shl,
                Token::Shr => BinaryOp::Shr,
            },
        );
        let relational = binary_level(
            shift,
            select! {
                Token::Lt => BinaryOp::Lt,
                Token::Gt => BinaryOp::Gt,
                Token::Le => BinaryOp::Le,
                Token::Ge => BinaryOp::Ge,
            },
        );
        let equality = binary_level(
            relational,
            select! {
                Token::EqEq => BinaryOp::Eq,
                Token::NotEq => BinaryOp::Ne,
            },
        );
        let bit_and = binary_level(equality, just(Token::Amp).to(BinaryOp::BitAnd));
        let bit_xor = binary_level(bit_and, just(Token::Caret).to(BinaryOp::BitXor));
        let bit_or = binary_level(bit_xor, just(Token::Pipe).to(BinaryOp::BitOr));
        let logical_and = binary_level(bit_or, just(Token::AndAnd).to(BinaryOp::LogicalAnd));
        let logical_xor =
            binary_level(logical_and, just(Token::XorXor).to(BinaryOp::LogicalXor));
        let logical_or = binary_level(logical_xor, just(Token::OrOr).to(BinaryOp::LogicalOr));

        // ── Conditional and assignment (right-associative) ──

        let ternary = logical_or
            .then(
                just(Token::Question)
                    .ignore_then(expr.clone())
                    .then_ignore(just(Token::Colon))
                    .then(expr.clone())
                    .or_not(),
            )
            .map(|(cond, branches)| match branches {
                None => cond,
                Some((then, otherwise)) => Expr::new(ExprKind::Ternary {
                    cond: Box::new(cond),
                    then: Box::new(then),
                    otherwise: Box::new(otherwise),
                }),
            });

        let assign_op = select! {
            Token::Assign => AssignOp::Assign,
            Token::AddAssign => AssignOp::Add,
            Token::SubAssign => AssignOp::Sub,
            Token::MulAssign => AssignOp::Mul,
            Token::DivAssign => AssignOp::Div,
            Token::RemAssign => AssignOp::Rem,
        };

        ternary
            .then(assign_op.then(expr).or_not())
            .map(|(lhs, rest)| match rest {
                None => lhs,
                Some((op, rhs)) => Expr::new(ExprKind::Assign {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }),
            })
    })
}

// ── Translation unit ──

fn unit_parser<'tokens, I>() -> impl Parser<'tokens, I, TranslationUnit, ParserExtra<'tokens>>
where
    I: ValueInput<'tokens, Token = Token, Span = SimpleSpan>,
{
    let expr = expr_parser();
    let ident = select! { Token::Ident(name) => name };

    // ── Types and qualifiers ──

    let basic_type = ident.clone().try_map(|name: String, span| {
        BasicType::from_name(&name)
            .ok_or_else(|| Rich::custom(span, format!("expected a type, found '{name}'")))
    });

    let precision = select! {
        Token::Highp => Precision::High,
        Token::Mediump => Precision::Medium,
        Token::Lowp => Precision::Low,
    };

    let layout_id = ident
        .clone()
        .then(
            just(Token::Assign)
                .ignore_then(select! { Token::IntLit(v) if v >= 0 => v as u32 })
                .or_not(),
        )
        .map(|(name, value)| LayoutQualifier { name, value });

    let layout = just(Token::Layout).ignore_then(
        layout_id
            .separated_by(just(Token::Comma))
            .at_least(1)
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LParen), just(Token::RParen))
            .map(TypeQualifier::Layout),
    );

    let qualifier = choice((
        select! {
            Token::Const => TypeQualifier::Const,
            Token::Uniform => TypeQualifier::Uniform,
            Token::In => TypeQualifier::In,
            Token::Out => TypeQualifier::Out,
            Token::InOut => TypeQualifier::InOut,
            Token::Flat => TypeQualifier::Flat,
            Token::Buffer => TypeQualifier::Buffer,
        },
        precision.clone().map(TypeQualifier::Precision),
        layout,
    ));

    let qualified_type = qualifier
        .clone()
        .repeated()
        .collect::<Vec<_>>()
        
        .then(basic_type.clone())
        .map(|(qualifiers, base)| QualifiedType { qualifiers, base });

    let array_suffix = expr
        .clone()
        .or_not()
        .delimited_by(just(Token::LBracket), just(Token::RBracket))
        .map(|size| ArrayInfo { size });

    // ── Variable declarations ──

    let declarator = ident
        .clone()
        .then(array_suffix.clone().or_not())
        .then(just(Token::Assign).ignore_then(expr.clone()).or_not())
        .map(|((name, array), init)| VarDeclInfo { name, array, init });

    let variables = qualified_type
        .clone()
        .then(
            declarator
                .separated_by(just(Token::Comma))
                .at_least(1)
                .collect::<Vec<_>>(),
        )
        .then_ignore(just(Token::Semi))
        .map(|(ty, vars)| VariablesDecl { ty, vars });

    // ── Statements ──

    let stmt = recursive(|stmt| {
        let paren_expr = expr
            .clone()
            .delimited_by(just(Token::LParen), just(Token::RParen));

        let block = stmt
            .clone()
            .repeated()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LBrace), just(Token::RBrace))
            .map(StmtKind::Block);

        let decl_stmt = variables.clone().map(StmtKind::Decl);
        let expr_stmt = expr.clone().then_ignore(just(Token::Semi)).map(StmtKind::Expr);
        let empty = just(Token::Semi).to(StmtKind::Empty);

        let if_stmt = just(Token::If)
            .ignore_then(paren_expr.clone())
            .then(stmt.clone())
            .then(just(Token::Else).ignore_then(stmt.clone()).or_not())
            .map(|((cond, then), otherwise): ((Expr, Stmt), Option<Stmt>)| StmtKind::If {
                cond,
                then: Box::new(then),
                otherwise: otherwise.map(Box::new),
            });

        let for_init = choice((decl_stmt.clone(), expr_stmt.clone(), empty.clone())).map(Stmt::new);

        let for_stmt = just(Token::For)
            .ignore_then(
                for_init
                    .then(expr.clone().or_not())
                    .then_ignore(just(Token::Semi))
                    .then(expr.clone().or_not())
                    .delimited_by(just(Token::LParen), just(Token::RParen)),
            )
            .then(stmt.clone())
            .map(|(((init, cond), step), body)| StmtKind::For {
                init: Box::new(init),
                cond,
                step,
                body: Box::new(body),
            });

        let while_stmt = just(Token::While)
            .ignore_then(paren_expr.clone())
            .then(stmt.clone())
            .map(|(cond, body)| StmtKind::While {
                cond,
                body: Box::new(body),
            });

        let do_while = just(Token::Do)
            .ignore_then(stmt)
            .then_ignore(just(Token::While))
            .then(paren_expr)
            .then_ignore(just(Token::Semi))
            .map(|(body, cond)| StmtKind::DoWhile {
                body: Box::new(body),
                cond,
            });

        let return_stmt = just(Token::Return)
            .ignore_then(expr.clone().or_not())
            .then_ignore(just(Token::Semi))
            .map(StmtKind::Return);

        let jump = select! {
            Token::Break => StmtKind::Break,
            Token::Continue => StmtKind::Continue,
            Token::Discard => StmtKind::Discard,
        }
        .then_ignore(just(Token::Semi));

        choice((
            block,
            if_stmt,
            for_stmt,
            while_stmt,
            do_while,
            return_stmt,
            jump,
            empty,
            decl_stmt,
            expr_stmt,
        ))
        .map(Stmt::new)
        .boxed()
    });

    // ── Top-level declarations ──

    let directive = select! { Token::Directive(text) => DeclKind::Directive(text) };

    let precision_decl = just(Token::Precision)
        .ignore_then(precision)
        .then(basic_type)
        .then_ignore(just(Token::Semi))
        .map(|(precision, ty)| DeclKind::Precision { precision, ty });

    let param = qualified_type
        .clone()
        .then(ident.clone().or_not())
        .then(array_suffix.clone().or_not())
        .map(|((ty, name), array)| ParamDecl { ty, name, array });

    let body = stmt
        .repeated()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LBrace), just(Token::RBrace))
        .map(Some)
        .or(just(Token::Semi).to(None));

    let function = qualified_type
        .clone()
        .then(ident.clone())
        .then(
            param
                .separated_by(just(Token::Comma))
                .collect::<Vec<_>>()
                .delimited_by(just(Token::LParen), just(Token::RParen)),
        )
        .then(body)
        .map(|(((return_type, name), params), body)| {
            DeclKind::Function(FunctionDef {
                return_type,
                name,
                params: normalize_void_params(params),
                body,
            })
        });

    let member = qualified_type
        .clone()
        .then(ident.clone())
        .then(array_suffix.or_not())
        .then_ignore(just(Token::Semi))
        .map(|((ty, name), array)| BlockMember { ty, name, array });

    let interface_block = qualifier
        .clone()
        .repeated()
        .at_least(1)
        .collect::<Vec<_>>()
        .then(ident.clone())
        .then(
            member
                .repeated()
                .collect::<Vec<_>>()
                .delimited_by(just(Token::LBrace), just(Token::RBrace)),
        )
        .then(ident.or_not())
        .then_ignore(just(Token::Semi))
        .map(|(((qualifiers, name), members), instance)| {
            DeclKind::InterfaceBlock(InterfaceBlock {
                qualifiers,
                name,
                members,
                instance,
            })
        });

    let qualifiers_only = qualifier
        .repeated()
        .at_least(1)
        .collect::<Vec<_>>()
        .then_ignore(just(Token::Semi))
        .map(DeclKind::Qualifiers);

    let declaration = choice((
        directive,
        precision_decl,
        function,
        interface_block,
        variables.map(DeclKind::Variables),
        qualifiers_only,
    ))
    .map(Declaration::new);

    declaration
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
        .map(TranslationUnit::new)
}

/// `f(void)` declares no parameters.
fn normalize_void_params(params: Vec<ParamDecl>) -> Vec<ParamDecl> {
    match params.as_slice() {
        [only]
            if only.name.is_none()
                && only.array.is_none()
                && only.ty == QualifiedType::plain(BasicType::Void) =>
        {
            Vec::new()
        }
        _ => params,
    }
}

// ── Tests ──
