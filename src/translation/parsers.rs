pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-')
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

pub(super) fn is_concat_operator(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'|') && bytes.get(idx + 1) == Some(&b'|')
}

/// Identifier bytes. Non-ASCII bytes count as identifier bytes so token
/// boundaries always fall on ASCII, and therefore on char boundaries.
pub(super) fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

pub(super) fn is_word_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

/// Return the index one past the closing `quote`, honouring doubled-quote
/// escapes. Unterminated literals run to the end of input.
pub(super) fn scan_quoted(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut idx = start + 1;
    while idx < bytes.len() {
        if bytes[idx] == quote {
            if bytes.get(idx + 1) == Some(&quote) {
                idx += 2;
                continue;
            }
            return idx + 1;
        }
        idx += 1;
    }
    bytes.len()
}

pub(super) fn scan_line_comment(bytes: &[u8], start: usize) -> usize {
    let mut idx = start;
    while idx < bytes.len() && bytes[idx] != b'\n' {
        idx += 1;
    }
    idx
}

/// Block comments do not nest in either dialect.
pub(super) fn scan_block_comment(bytes: &[u8], start: usize) -> usize {
    let mut idx = start + 2;
    while idx < bytes.len() {
        if is_block_comment_end(bytes, idx) {
            return idx + 2;
        }
        idx += 1;
    }
    bytes.len()
}

pub(super) fn scan_while(bytes: &[u8], start: usize, pred: impl Fn(u8) -> bool) -> usize {
    let mut idx = start;
    while idx < bytes.len() && pred(bytes[idx]) {
        idx += 1;
    }
    idx
}
