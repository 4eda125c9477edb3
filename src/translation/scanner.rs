use super::parsers::{
    is_block_comment_start, is_concat_operator, is_line_comment_start, is_word_byte,
    is_word_start, scan_block_comment, scan_line_comment, scan_quoted, scan_while,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TokenKind {
    /// Keyword or bare identifier
    Word,
    /// `'...'`
    StringLit,
    /// `"..."` or `` `...` ``
    QuotedIdent,
    Number,
    /// `?`, `?NNN`, `:name`, `@name`, `$name`
    Placeholder,
    /// `||`
    Concat,
    OpenParen,
    CloseParen,
    Dot,
    Whitespace,
    Comment,
    /// Any other single character (operators, commas, semicolons)
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Token<'a> {
    pub(super) kind: TokenKind,
    pub(super) text: &'a str,
}

impl Token<'_> {
    pub(super) fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub(super) fn is_word(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(keyword)
    }
}

/// Split SQL text into lexical tokens. Concatenating every token's text
/// reproduces the input exactly.
pub(super) fn tokenize(sql: &str) -> Vec<Token<'_>> {
    let bytes = sql.as_bytes();
    let mut tokens = Vec::new();
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        let (kind, end) = match b {
            b'\'' => (TokenKind::StringLit, scan_quoted(bytes, idx, b'\'')),
            b'"' | b'`' => (TokenKind::QuotedIdent, scan_quoted(bytes, idx, b)),
            _ if is_line_comment_start(bytes, idx) => {
                (TokenKind::Comment, scan_line_comment(bytes, idx))
            }
            _ if is_block_comment_start(bytes, idx) => {
                (TokenKind::Comment, scan_block_comment(bytes, idx))
            }
            _ if is_concat_operator(bytes, idx) => (TokenKind::Concat, idx + 2),
            _ if b.is_ascii_whitespace() => (
                TokenKind::Whitespace,
                scan_while(bytes, idx, |c| c.is_ascii_whitespace()),
            ),
            _ if b.is_ascii_digit() => (
                TokenKind::Number,
                scan_while(bytes, idx + 1, |c| c.is_ascii_alphanumeric() || c == b'.'),
            ),
            _ if is_word_start(b) => (TokenKind::Word, scan_while(bytes, idx, is_word_byte)),
            b'?' => (
                TokenKind::Placeholder,
                scan_while(bytes, idx + 1, |c| c.is_ascii_digit()),
            ),
            b':' | b'@' | b'$' if bytes.get(idx + 1).copied().is_some_and(is_word_start) => (
                TokenKind::Placeholder,
                scan_while(bytes, idx + 1, is_word_byte),
            ),
            b'(' => (TokenKind::OpenParen, idx + 1),
            b')' => (TokenKind::CloseParen, idx + 1),
            b'.' => (TokenKind::Dot, idx + 1),
            _ => (TokenKind::Other, idx + 1),
        };
        tokens.push(Token {
            kind,
            text: &sql[idx..end],
        });
        idx = end;
    }

    tokens
}

/// A token, or a parenthesised group of nodes.
#[derive(Debug, Clone)]
pub(super) enum Node<'a> {
    Leaf(Token<'a>),
    Group {
        children: Vec<Node<'a>>,
        closed: bool,
    },
}

impl<'a> Node<'a> {
    pub(super) fn token(&self) -> Option<&Token<'a>> {
        match self {
            Node::Leaf(token) => Some(token),
            Node::Group { .. } => None,
        }
    }

    pub(super) fn is_trivia(&self) -> bool {
        self.token().is_some_and(Token::is_trivia)
    }

    pub(super) fn is_word(&self, keyword: &str) -> bool {
        self.token().is_some_and(|t| t.is_word(keyword))
    }

    pub(super) fn is_kind(&self, kind: TokenKind) -> bool {
        self.token().is_some_and(|t| t.kind == kind)
    }
}

/// Nest tokens by parentheses. A stray `)` stays a leaf.
pub(super) fn build_tree(tokens: Vec<Token<'_>>) -> Vec<Node<'_>> {
    let mut stack: Vec<Vec<Node<'_>>> = vec![Vec::new()];

    for token in tokens {
        match token.kind {
            TokenKind::OpenParen => stack.push(Vec::new()),
            TokenKind::CloseParen if stack.len() > 1 => {
                let children = stack.pop().unwrap_or_default();
                if let Some(parent) = stack.last_mut() {
                    parent.push(Node::Group {
                        children,
                        closed: true,
                    });
                }
            }
            _ => {
                if let Some(current) = stack.last_mut() {
                    current.push(Node::Leaf(token));
                }
            }
        }
    }

    // Unbalanced input: fold any open groups back into their parents.
    while stack.len() > 1 {
        let children = stack.pop().unwrap_or_default();
        if let Some(parent) = stack.last_mut() {
            parent.push(Node::Group {
                children,
                closed: false,
            });
        }
    }

    stack.pop().unwrap_or_default()
}

/// Index of the next non-trivia node at or after `from`.
pub(super) fn next_significant(nodes: &[Node<'_>], from: usize) -> Option<usize> {
    (from..nodes.len()).find(|&idx| !nodes[idx].is_trivia())
}
