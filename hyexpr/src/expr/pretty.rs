//! RcDoc-based pretty-printer with termcolor annotations for expressions.
//!
//! Role
//! - Convert an expression into an annotated document, inserting parentheses
//!   only where dropping them would change how the text parses.
//! - Provide colored output for terminals (TTY-aware) and plain strings for
//!   logs, tests and [`std::fmt::Display`].
//!
//! Parenthesization
//! - A child node is wrapped when its precedence is lower than its parent's.
//! - At equal precedence it is wrapped when it is the right operand of a
//!   regrouping operator (`- / // % ** << >>`), the left operand of `**`, any
//!   operand of a comparison, a nested `and`/`or`, or a unary operand of a
//!   unary operator.
//! - Variables, literals and external calls never need parentheses.
//!
//! Performance
//! - Building the doc is O(n) in expression size.
use std::io::{self, Write};

use pretty::{FmtWrite, RcDoc, RenderAnnotated};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::expr::Expr;
use crate::expr::node::{Callee, ExprNode, Operand};
use crate::ops::Operation;
use crate::value::Value;
use crate::variable::Variable;

/// Styles used to annotate parts of the pretty-printed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Punct, // commas, `=` of named arguments
    /// Parentheses are colored by nesting depth so matching pairs share a color.
    Paren(u8),
    Keyword,  // and, or, not, is, in
    Operator, // +, **, <<, ==
    Ident,    // variables and argument names
    Literal,  // numbers, strings, booleans
    Function, // external function names
}

impl Style {
    fn to_color_spec(self) -> ColorSpec {
        let mut s = ColorSpec::new();
        match self {
            Style::Punct => {
                s.set_dimmed(true);
            }
            Style::Paren(depth) => {
                let fg = match depth % 6 {
                    0 => Color::Blue,
                    1 => Color::Green,
                    2 => Color::White,
                    3 => Color::Yellow,
                    4 => Color::Red,
                    5 => Color::Magenta,
                    _ => unreachable!(),
                };
                s.set_fg(Some(fg)).set_dimmed(true);
            }
            Style::Keyword => {
                s.set_fg(Some(Color::Cyan)).set_bold(true);
            }
            Style::Operator => {
                s.set_fg(Some(Color::Yellow)).set_bold(true);
            }
            Style::Ident => {
                s.set_fg(Some(Color::Green)).set_bold(true);
            }
            Style::Literal => {
                s.set_fg(Some(Color::Magenta));
            }
            Style::Function => {
                s.set_fg(Some(Color::Cyan));
            }
        }
        s
    }
}

fn punct(s: &'static str) -> RcDoc<'static, Style> {
    RcDoc::as_string(s).annotate(Style::Punct)
}

#[inline]
fn lparen(depth: u8) -> RcDoc<'static, Style> {
    RcDoc::as_string("(").annotate(Style::Paren(depth))
}

#[inline]
fn rparen(depth: u8) -> RcDoc<'static, Style> {
    RcDoc::as_string(")").annotate(Style::Paren(depth))
}

fn op(operation: Operation) -> RcDoc<'static, Style> {
    let style = if operation.is_keyword() {
        Style::Keyword
    } else {
        Style::Operator
    };
    RcDoc::as_string(operation.symbol()).annotate(style)
}

fn ident(v: &Variable) -> RcDoc<'static, Style> {
    RcDoc::as_string(v.name()).annotate(Style::Ident)
}

fn literal(value: &Value) -> RcDoc<'static, Style> {
    RcDoc::as_string(value).annotate(Style::Literal)
}

/// Whether `child`, rendered as an operand of `parent`, must be wrapped.
fn requires_parens(child: &Operand, parent: Operation, is_right: bool) -> bool {
    let Operand::Node(node) = child else {
        return false;
    };
    let Callee::Op(current) = node.callee() else {
        return false;
    };

    let current_prec = current.precedence();
    let parent_prec = parent.precedence();
    if current_prec != parent_prec {
        return current_prec < parent_prec;
    }

    (is_right && parent.is_right_sensitive())
        || (parent == Operation::Pow && !is_right)
        || parent.is_comparison()
        || (parent.is_logical() && current.is_logical())
        || (parent.is_unary() && current.is_unary())
}

#[inline]
fn to_doc_parenthesized_with_depth(
    operand: &Operand,
    parent: Operation,
    is_right: bool,
    depth: u8,
) -> RcDoc<'static, Style> {
    if requires_parens(operand, parent, is_right) {
        lparen(depth)
            .append(to_doc_with_depth(operand, depth.wrapping_add(1)))
            .append(rparen(depth))
            .group()
    } else {
        to_doc_with_depth(operand, depth)
    }
}

/// `head(p1, p2, k1=v1)`
fn call_doc(head: RcDoc<'static, Style>, node: &ExprNode, depth: u8) -> RcDoc<'static, Style> {
    let inner = depth.wrapping_add(1);
    let positional = node
        .positional()
        .iter()
        .map(|arg| to_doc_with_depth(arg, inner));
    let named = node.named().iter().map(|(name, arg)| {
        RcDoc::as_string(name)
            .annotate(Style::Ident)
            .append(punct("="))
            .append(to_doc_with_depth(arg, inner))
    });

    head.append(lparen(depth))
        .append(RcDoc::intersperse(positional.chain(named), punct(", ")))
        .append(rparen(depth))
        .group()
}

/// Depth-aware variant that colors parentheses by nesting level.
fn to_doc_with_depth(operand: &Operand, depth: u8) -> RcDoc<'static, Style> {
    let node = match operand {
        Operand::Variable(v) => return ident(v),
        Operand::Literal(value) => return literal(value),
        Operand::Node(node) => node,
    };

    match (node.callee(), node.positional()) {
        (Callee::External(func), _) => call_doc(
            RcDoc::as_string(func.name()).annotate(Style::Function),
            node,
            depth,
        ),
        (Callee::Op(operation), [inner]) if operation.is_unary() => op(*operation)
            .append(to_doc_parenthesized_with_depth(inner, *operation, false, depth))
            .group(),
        (Callee::Op(operation), [lhs, rhs]) if !operation.is_unary() => {
            to_doc_parenthesized_with_depth(lhs, *operation, false, depth)
                .append(RcDoc::text(" "))
                .append(op(*operation))
                .append(RcDoc::text(" "))
                .append(to_doc_parenthesized_with_depth(rhs, *operation, true, depth))
                .group()
        }
        // Not constructible through the public API; shown in call form.
        (Callee::Op(operation), _) => call_doc(op(*operation), node, depth),
    }
}

// A writer that maps Style annotations to termcolor ColorSpec on a WriteColor sink.
struct ColorWriter<'w, W: WriteColor + Write> {
    out: &'w mut W,
}

impl<'a, 'w, W: WriteColor + Write> RenderAnnotated<'a, Style> for ColorWriter<'w, W> {
    fn push_annotation(&mut self, ann: &'a Style) -> io::Result<()> {
        self.out.set_color(&ann.to_color_spec())
    }
    fn pop_annotation(&mut self) -> io::Result<()> {
        self.out.reset()
    }
}

impl<'w, W: WriteColor + Write> pretty::Render for ColorWriter<'w, W> {
    type Error = io::Error;
    fn write_str(&mut self, s: &str) -> io::Result<usize> {
        self.out.write_all(s.as_bytes())?;
        Ok(s.len())
    }
    fn write_str_all(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }
    fn fail_doc(&self) -> Self::Error {
        io::Error::other("render failed")
    }
}

/// Render a document to a `termcolor::WriteColor` with width-aware layout.
fn render_to<W: WriteColor + Write>(
    doc: &RcDoc<'_, Style>,
    width: usize,
    out: &mut W,
) -> io::Result<()> {
    let mut cw = ColorWriter { out };
    doc.render_raw(width, &mut cw)
}

/// Plain text without colors.
pub(crate) fn render_plain(operand: &Operand) -> String {
    let mut buf = String::new();
    let _ = to_doc_with_depth(operand, 0).render_fmt(80, &mut buf);
    buf
}

pub(crate) fn fmt_operand(operand: &Operand, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut w = FmtWrite::new(f);
    to_doc_with_depth(operand, 0).render_raw(80, &mut w)
}

/// Convenience: retrieve the width of the terminal, or 80 if it cannot be determined.
fn terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

// ======================== Trait impls =========================
/// Colored pretty-printing for anything implementing [`Expr`].
pub trait PrettyExpr {
    /// Build an RcDoc representation of this expression with style annotations.
    fn pretty_doc(&self) -> RcDoc<'static, Style>;

    /// Render this expression with colors to any termcolor writer at the given width.
    fn pretty_render_to<W: WriteColor + Write>(&self, width: usize, out: &mut W) -> io::Result<()>;

    /// Print this expression to stdout with colors (TTY-aware), at auto-detected width.
    fn pretty_print(&self) -> io::Result<()>;
}

impl<T: Expr> PrettyExpr for T {
    #[inline]
    fn pretty_doc(&self) -> RcDoc<'static, Style> {
        to_doc_with_depth(&self.operand(), 0)
    }

    #[inline]
    fn pretty_render_to<W: WriteColor + Write>(&self, width: usize, out: &mut W) -> io::Result<()> {
        render_to(&self.pretty_doc(), width, out)
    }

    fn pretty_print(&self) -> io::Result<()> {
        let stdout = StandardStream::stdout(ColorChoice::Auto);
        let mut stdout = stdout.lock();
        render_to(&self.pretty_doc(), terminal_width(), &mut stdout)?;
        writeln!(stdout)
    }
}
