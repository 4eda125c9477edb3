//! Embedded-to-networked SQL dialect translation.
//!
//! Statements are authored in the `SQLite` dialect. When the active backend is
//! `MySQL` they are rewritten lexically before dispatch; nothing here parses
//! SQL into a syntax tree. Only these shapes are touched:
//!
//! | `SQLite`                      | `MySQL`              |
//! |-------------------------------|----------------------|
//! | `INSERT OR IGNORE`            | `INSERT IGNORE`      |
//! | `INSERT OR REPLACE`           | `REPLACE`            |
//! | `AUTOINCREMENT`               | `AUTO_INCREMENT`     |
//! | `DATE('now')`                 | `CURRENT_DATE()`     |
//! | `DATETIME('now')`, `'now'`    | `NOW()`              |
//! | `a \|\| b \|\| c`             | `CONCAT(a, b, c)`    |
//!
//! String literals, quoted identifiers and comments are never rewritten, and
//! placeholders are never reordered or renumbered. Rewriting already
//! translated text is a no-op.
//!
//! A `||` operand is a primary with any unary `-`, `+` or `~` in front of it.
//! A postfix `COLLATE name` is not part of the operand: `a || b COLLATE x`
//! becomes `CONCAT(a, b) COLLATE x`.

use std::borrow::Cow;

mod parsers;
mod scanner;

use scanner::{Node, TokenKind, build_tree, next_significant, tokenize};

/// Outcome of translating one statement for the networked backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewritten<'a> {
    /// Dispatch this text. Borrowed when no rewrite was needed.
    Sql(Cow<'a, str>),
    /// Backend-control text (`PRAGMA`, literal transaction control) that has
    /// no meaning on the networked backend and must not be dispatched.
    Skip,
}

/// Coarse statement classification from the leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    /// `INSERT` or `REPLACE`
    Insert,
    Update,
    Delete,
    /// Common table expression; may or may not write
    With,
    Other,
}

impl StatementKind {
    /// Whether the driver's last-insert identity applies to this statement.
    #[must_use]
    pub fn generates_identity(self) -> bool {
        matches!(self, StatementKind::Insert)
    }

    /// Whether the driver's changed-row counter applies to this statement.
    #[must_use]
    pub fn counts_changes(self) -> bool {
        matches!(
            self,
            StatementKind::Insert | StatementKind::Update | StatementKind::Delete
        )
    }
}

/// Classify a statement by its first keyword, skipping comments and whitespace.
#[must_use]
pub fn classify(sql: &str) -> StatementKind {
    let tokens = tokenize(sql);
    let Some(first) = tokens.iter().find(|t| !t.is_trivia()) else {
        return StatementKind::Other;
    };
    if first.kind != TokenKind::Word {
        return StatementKind::Other;
    }
    match first.text.to_ascii_uppercase().as_str() {
        "SELECT" | "VALUES" => StatementKind::Select,
        "INSERT" | "REPLACE" => StatementKind::Insert,
        "UPDATE" => StatementKind::Update,
        "DELETE" => StatementKind::Delete,
        "WITH" => StatementKind::With,
        _ => StatementKind::Other,
    }
}

/// Recognise statements that only steer the embedded engine: `PRAGMA ...`,
/// `BEGIN [IMMEDIATE] TRANSACTION`, `COMMIT`, `ROLLBACK`.
#[must_use]
pub fn is_backend_control(sql: &str) -> bool {
    let tokens = tokenize(sql);
    let mut words = tokens.iter().filter(|t| !t.is_trivia());
    let Some(first) = words.next() else {
        return false;
    };
    if first.is_word("PRAGMA") || first.is_word("COMMIT") || first.is_word("ROLLBACK") {
        return true;
    }
    if !first.is_word("BEGIN") {
        return false;
    }
    match words.next() {
        Some(next) if next.is_word("TRANSACTION") => true,
        Some(next) if next.is_word("IMMEDIATE") => {
            words.next().is_some_and(|t| t.is_word("TRANSACTION"))
        }
        _ => false,
    }
}

/// Translate one embedded-dialect statement for the networked backend.
///
/// ```rust
/// use sql_bridge::translation::{Rewritten, rewrite_for_networked};
///
/// let out = rewrite_for_networked("INSERT OR IGNORE INTO t (a) VALUES ('x' || ?)");
/// assert_eq!(
///     out,
///     Rewritten::Sql("INSERT IGNORE INTO t (a) VALUES (CONCAT('x', ?))".into())
/// );
/// assert_eq!(rewrite_for_networked("PRAGMA foreign_keys = ON"), Rewritten::Skip);
/// ```
#[must_use]
pub fn rewrite_for_networked(sql: &str) -> Rewritten<'_> {
    if is_backend_control(sql) {
        tracing::debug!(sql, "skipping embedded-only control statement");
        return Rewritten::Skip;
    }

    let tree = build_tree(tokenize(sql));
    let mut writer = Writer::with_capacity(sql.len());
    render_sequence(&tree, &mut writer);

    if writer.changed {
        tracing::debug!(from = sql, to = %writer.out, "rewrote statement for mysql");
        Rewritten::Sql(Cow::Owned(writer.out))
    } else {
        Rewritten::Sql(Cow::Borrowed(sql))
    }
}

struct Writer {
    out: String,
    changed: bool,
}

impl Writer {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity + 16),
            changed: false,
        }
    }

    fn keep(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn replace(&mut self, text: &str) {
        self.out.push_str(text);
        self.changed = true;
    }
}

fn render_sequence(nodes: &[Node<'_>], writer: &mut Writer) {
    let mut idx = 0;
    while idx < nodes.len() {
        if let Some(next) = render_concat_chain(nodes, idx, writer) {
            idx = next;
            continue;
        }
        idx = render_node(nodes, idx, writer);
    }
}

/// Fold `a || b || c` starting at `start` into `CONCAT(a, b, c)`. `||` binds
/// tighter than every other binary operator in `SQLite`, so primaries are
/// exactly its operands. Returns the index after the chain when one was found.
fn render_concat_chain(nodes: &[Node<'_>], start: usize, writer: &mut Writer) -> Option<usize> {
    if is_unary_operator(&nodes[start]) && !in_prefix_position(nodes, start) {
        return None;
    }
    let first_end = operand_end(nodes, start)?;
    let mut operands = vec![(start, first_end)];
    let mut cursor = first_end;

    while let Some(op) = next_significant(nodes, cursor) {
        if !nodes[op].is_kind(TokenKind::Concat) {
            break;
        }
        let Some(operand_start) = next_significant(nodes, op + 1) else {
            break;
        };
        let Some(end) = operand_end(nodes, operand_start) else {
            break;
        };
        operands.push((operand_start, end));
        cursor = end;
    }

    if operands.len() < 2 {
        return None;
    }

    writer.replace("CONCAT(");
    for (n, (from, to)) in operands.into_iter().enumerate() {
        if n > 0 {
            writer.replace(", ");
        }
        render_sequence(&nodes[from..to], writer);
    }
    writer.replace(")");
    Some(cursor)
}

/// End (exclusive) of the primary expression starting at `idx`, if any.
fn operand_end(nodes: &[Node<'_>], idx: usize) -> Option<usize> {
    let node = nodes.get(idx)?;
    let Some(token) = node.token() else {
        return Some(idx + 1);
    };
    match token.kind {
        TokenKind::StringLit | TokenKind::Number | TokenKind::Placeholder => Some(idx + 1),
        // unary `-`, `+` and `~` bind tighter than `||`
        TokenKind::Other if is_unary_operator(node) => {
            operand_end(nodes, next_significant(nodes, idx + 1)?)
        }
        TokenKind::Word if token.is_word("CASE") => case_end(nodes, idx),
        TokenKind::Word | TokenKind::QuotedIdent => {
            let mut end = idx + 1;
            // qualified names: schema.table.column
            while nodes.get(end).is_some_and(|n| n.is_kind(TokenKind::Dot))
                && nodes.get(end + 1).is_some_and(|n| {
                    n.is_kind(TokenKind::Word) || n.is_kind(TokenKind::QuotedIdent)
                })
            {
                end += 2;
            }
            // function call
            if let Some(next) = next_significant(nodes, end)
                && matches!(nodes[next], Node::Group { .. })
            {
                end = next + 1;
            }
            Some(end)
        }
        _ => None,
    }
}

/// Keywords after which `-`, `+` and `~` start an operand instead of
/// subtracting from one.
const PREFIX_KEYWORDS: &[&str] = &[
    "SELECT", "DISTINCT", "ALL", "WHERE", "AND", "OR", "NOT", "CASE", "WHEN", "THEN", "ELSE",
    "ON", "SET", "BY", "HAVING", "IS", "LIKE", "GLOB", "BETWEEN", "IN", "LIMIT", "OFFSET",
    "RETURNING",
];

fn is_unary_operator(node: &Node<'_>) -> bool {
    node.token()
        .is_some_and(|t| t.kind == TokenKind::Other && matches!(t.text, "-" | "+" | "~"))
}

/// Whether the operator at `idx` is a prefix: nothing that ends an operand
/// comes right before it.
fn in_prefix_position(nodes: &[Node<'_>], idx: usize) -> bool {
    let Some(prev) = (0..idx).rev().find(|&i| !nodes[i].is_trivia()) else {
        return true;
    };
    let Some(token) = nodes[prev].token() else {
        return false;
    };
    match token.kind {
        TokenKind::StringLit
        | TokenKind::Number
        | TokenKind::Placeholder
        | TokenKind::QuotedIdent
        | TokenKind::CloseParen => false,
        TokenKind::Word => PREFIX_KEYWORDS.iter().any(|kw| token.is_word(kw)),
        _ => true,
    }
}

fn case_end(nodes: &[Node<'_>], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, node) in nodes.iter().enumerate().skip(start) {
        if node.is_word("CASE") {
            depth += 1;
        } else if node.is_word("END") {
            depth -= 1;
            if depth == 0 {
                return Some(idx + 1);
            }
        }
    }
    None
}

/// Render a single node, applying the keyword-level rewrites. Returns the
/// index of the next node to render.
fn render_node(nodes: &[Node<'_>], idx: usize, writer: &mut Writer) -> usize {
    let token = match &nodes[idx] {
        Node::Group { children, closed } => {
            writer.keep("(");
            render_sequence(children, writer);
            if *closed {
                writer.keep(")");
            }
            return idx + 1;
        }
        Node::Leaf(token) => token,
    };

    match token.kind {
        TokenKind::Word if token.is_word("INSERT") => {
            if let Some((replacement, next)) = insert_or_conflict(nodes, idx) {
                writer.replace(replacement);
                return next;
            }
        }
        TokenKind::Word if token.is_word("AUTOINCREMENT") => {
            writer.replace("AUTO_INCREMENT");
            return idx + 1;
        }
        TokenKind::Word if token.is_word("DATE") || token.is_word("DATETIME") => {
            if let Some(group) = next_significant(nodes, idx + 1)
                && is_now_call_args(&nodes[group])
            {
                writer.replace(if token.is_word("DATE") {
                    "CURRENT_DATE()"
                } else {
                    "NOW()"
                });
                return group + 1;
            }
        }
        TokenKind::StringLit if is_now_literal(token.text) => {
            writer.replace("NOW()");
            return idx + 1;
        }
        _ => {}
    }

    writer.keep(token.text);
    idx + 1
}

/// `INSERT OR IGNORE` / `INSERT OR REPLACE` starting at `idx`.
fn insert_or_conflict(nodes: &[Node<'_>], idx: usize) -> Option<(&'static str, usize)> {
    let or = next_significant(nodes, idx + 1)?;
    if !nodes[or].is_word("OR") {
        return None;
    }
    let action = next_significant(nodes, or + 1)?;
    if nodes[action].is_word("IGNORE") {
        Some(("INSERT IGNORE", action + 1))
    } else if nodes[action].is_word("REPLACE") {
        Some(("REPLACE", action + 1))
    } else {
        None
    }
}

fn is_now_call_args(node: &Node<'_>) -> bool {
    let Node::Group {
        children,
        closed: true,
    } = node
    else {
        return false;
    };
    let mut args = children.iter().filter(|n| !n.is_trivia());
    matches!(
        (args.next().and_then(Node::token), args.next()),
        (Some(token), None) if token.kind == TokenKind::StringLit && is_now_literal(token.text)
    )
}

fn is_now_literal(text: &str) -> bool {
    text.eq_ignore_ascii_case("'now'")
}
