use std::borrow::Cow;
use std::fmt::Write;

mod parsers;
mod scanner;

use parsers::{
    is_block_comment_end, is_block_comment_start, is_escaped_quote, is_line_comment_start,
};
use scanner::{State, closing_quote};

/// Native positional marker of a backend driver.
///
/// Generated SQL always uses `?`; the executor rewrites it into the connection's style right
/// before dispatch, so swapping backends never touches call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// Plain `?`, passed through untouched.
    Question,
    /// SQLite-style numbered markers `?1, ?2, ...`.
    Numbered,
    /// PostgreSQL-style `$1, $2, ...`.
    Dollar,
    /// Python DB-API `format` style `%s`; literal `%` is doubled.
    Format,
}

impl PlaceholderStyle {
    /// Shorthand for [`translate_placeholders`].
    #[must_use]
    pub fn translate<'a>(self, sql: &'a str) -> Cow<'a, str> {
        translate_placeholders(sql, self)
    }
}

/// Rewrite every `?` placeholder of `sql` into `target` style.
///
/// Placeholders inside quoted strings, backtick-quoted identifiers and comments are left alone.
/// Returns a borrowed `Cow` when no changes are needed.
///
/// ```rust
/// use sql_mapper::prelude::*;
///
/// let sql = "update `users` set `name`=? where `id`=?";
/// assert_eq!(
///     translate_placeholders(sql, PlaceholderStyle::Dollar),
///     "update `users` set `name`=$1 where `id`=$2"
/// );
/// ```
#[must_use]
pub fn translate_placeholders(sql: &str, target: PlaceholderStyle) -> Cow<'_, str> {
    if target == PlaceholderStyle::Question {
        return Cow::Borrowed(sql);
    }

    let bytes = sql.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut ordinal = 0_usize;
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        if target == PlaceholderStyle::Format && b == b'%' {
            let buf = out.get_or_insert_with(|| String::with_capacity(sql.len() + 8));
            buf.push_str(&sql[copied..=idx]);
            buf.push('%');
            copied = idx + 1;
            idx += 1;
            continue;
        }

        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'`' => state = State::BacktickQuoted,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'?' => {
                    ordinal += 1;
                    let buf = out.get_or_insert_with(|| String::with_capacity(sql.len() + 8));
                    buf.push_str(&sql[copied..idx]);
                    push_marker(buf, target, ordinal);
                    copied = idx + 1;
                }
                _ => {}
            },
            State::SingleQuoted | State::DoubleQuoted | State::BacktickQuoted => {
                if let Some(quote) = closing_quote(state)
                    && b == quote
                {
                    if is_escaped_quote(bytes, idx, quote) {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
        }
        idx += 1;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    }
}

fn push_marker(buf: &mut String, target: PlaceholderStyle, ordinal: usize) {
    match target {
        PlaceholderStyle::Question => buf.push('?'),
        PlaceholderStyle::Numbered => {
            let _ = write!(buf, "?{ordinal}");
        }
        PlaceholderStyle::Dollar => {
            let _ = write!(buf, "${ordinal}");
        }
        PlaceholderStyle::Format => buf.push_str("%s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_sqlite_markers() {
        let sql = "insert into `t` (`a`, `b`, `id`) values (?, ?, ?)";
        let res = translate_placeholders(sql, PlaceholderStyle::Numbered);
        assert_eq!(res, "insert into `t` (`a`, `b`, `id`) values (?1, ?2, ?3)");
    }

    #[test]
    fn translates_to_format_and_doubles_percent() {
        let sql = "select * from `t` where `name` like '50%' and `id`=?";
        let res = translate_placeholders(sql, PlaceholderStyle::Format);
        assert_eq!(res, "select * from `t` where `name` like '50%%' and `id`=%s");
    }

    #[test]
    fn skips_inside_literals_identifiers_and_comments() {
        let sql = "select '?', `we?ird`, ? -- ?\n/* ? /* ? */ */ from t where a = ?";
        let res = translate_placeholders(sql, PlaceholderStyle::Dollar);
        assert_eq!(
            res,
            "select '?', `we?ird`, $1 -- ?\n/* ? /* ? */ */ from t where a = $2"
        );
    }

    #[test]
    fn escaped_quotes_stay_quoted() {
        let sql = "select 'it''s ?' from t where a = ?";
        let res = translate_placeholders(sql, PlaceholderStyle::Numbered);
        assert_eq!(res, "select 'it''s ?' from t where a = ?1");
    }

    #[test]
    fn keeps_multibyte_text_intact() {
        let sql = "select * from t where name = 'é?ü' and a = ?";
        let res = translate_placeholders(sql, PlaceholderStyle::Dollar);
        assert_eq!(res, "select * from t where name = 'é?ü' and a = $1");
    }

    #[test]
    fn borrows_when_unchanged() {
        let sql = "select 1";
        assert!(matches!(
            translate_placeholders(sql, PlaceholderStyle::Numbered),
            Cow::Borrowed(_)
        ));
        assert!(matches!(
            PlaceholderStyle::Question.translate("select ?"),
            Cow::Borrowed(_)
        ));
    }
}
