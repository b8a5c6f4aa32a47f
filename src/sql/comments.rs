//! Comment stripping ahead of tokenization.

use super::ParseError;

/// Replace `-- line` and `/* block */` comments with blanks.
///
/// Newlines inside comments are kept so line numbers in later errors still
/// point at the source text. String literals (including `E'...'`), quoted identifiers
/// and dollar-quoted bodies are copied through untouched. Block comments nest.
pub fn strip_comments(input: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();
    let mut line = 1;

    while let Some((idx, c)) = chars.next() {
        match c {
            '-' if chars.peek().map(|&(_, n)| n) == Some('-') => {
                out.push(' ');
                while let Some(&(_, n)) = chars.peek() {
                    if n == '\n' {
                        break;
                    }
                    out.push(' ');
                    chars.next();
                }
            }
            '/' if chars.peek().map(|&(_, n)| n) == Some('*') => {
                let start_line = line;
                chars.next();
                out.push_str("  ");
                let mut depth = 1;
                let mut prev = '\0';
                while depth > 0 {
                    let Some((_, n)) = chars.next() else {
                        return Err(ParseError::UnterminatedComment { line: start_line });
                    };
                    if n == '\n' {
                        line += 1;
                        out.push('\n');
                    } else {
                        out.push(' ');
                    }
                    if prev == '/' && n == '*' {
                        depth += 1;
                        prev = '\0';
                    } else if prev == '*' && n == '/' {
                        depth -= 1;
                        prev = '\0';
                    } else {
                        prev = n;
                    }
                }
            }
            'E' | 'e'
                if chars.peek().map(|&(_, n)| n) == Some('\'') && !follows_word(input, idx) =>
            {
                out.push(c);
                if let Some((_, q)) = chars.next() {
                    out.push(q);
                }
                while let Some((_, n)) = chars.next() {
                    out.push(n);
                    if n == '\n' {
                        line += 1;
                    }
                    if n == '\\' {
                        if let Some((_, escaped)) = chars.next() {
                            out.push(escaped);
                            if escaped == '\n' {
                                line += 1;
                            }
                        }
                    } else if n == '\'' {
                        break;
                    }
                }
            }
            '\'' | '"' => {
                out.push(c);
                // A doubled quote closes and reopens, which copies through unchanged.
                for (_, n) in chars.by_ref() {
                    out.push(n);
                    if n == '\n' {
                        line += 1;
                    }
                    if n == c {
                        break;
                    }
                }
            }
            '$' => {
                let rest = &input[idx..];
                match dollar_delimiter(rest) {
                    Some(delim) => {
                        let body_end = rest[delim.len()..]
                            .find(delim)
                            .map(|off| delim.len() + off + delim.len())
                            .unwrap_or(rest.len());
                        let quoted = &rest[..body_end];
                        out.push_str(quoted);
                        line += quoted.matches('\n').count();
                        while let Some(&(i, _)) = chars.peek() {
                            if i >= idx + body_end {
                                break;
                            }
                            chars.next();
                        }
                    }
                    None => out.push(c),
                }
            }
            '\n' => {
                line += 1;
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn follows_word(input: &str, idx: usize) -> bool {
    input[..idx]
        .chars()
        .next_back()
        .is_some_and(|p| p.is_alphanumeric() || p == '_' || p == '$')
}

/// The `$tag$` opener at the start of `s`, if any.
pub(crate) fn dollar_delimiter(s: &str) -> Option<&str> {
    let body = s.strip_prefix('$')?;
    let tag_len: usize = body
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .map(char::len_utf8)
        .sum();
    if body[..tag_len].starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if body[tag_len..].starts_with('$') {
        Some(&s[..tag_len + 2])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_comment_removed() {
        let out = strip_comments("CREATE -- note\nTABLE t();").unwrap();
        assert!(!out.contains("note"));
        assert!(out.contains("TABLE t();"));
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn test_block_comment_keeps_newlines() {
        let out = strip_comments("a /* one\ntwo */ b").unwrap();
        assert_eq!(out.len(), "a /* one\ntwo */ b".len());
        assert!(out.starts_with("a "));
        assert!(out.ends_with(" b"));
        assert_eq!(out.matches('\n').count(), 1);
    }

    #[test]
    fn test_nested_block_comment() {
        let out = strip_comments("/* a /* b */ c */ x").unwrap();
        assert_eq!(out.trim(), "x");
    }

    #[test]
    fn test_markers_inside_strings_survive() {
        let out = strip_comments("DEFAULT '-- not a comment' /* gone */").unwrap();
        assert!(out.contains("'-- not a comment'"));
        assert!(!out.contains("gone"));
    }

    #[test]
    fn test_escape_string_survives() {
        let sql = r"DEFAULT E'it\'s -- kept' -- dropped";
        let out = strip_comments(sql).unwrap();
        assert!(out.contains(r"E'it\'s -- kept'"));
        assert!(!out.contains("dropped"));
    }

    #[test]
    fn test_dollar_quoted_body_survives() {
        let sql = "SELECT $fn$ -- kept $fn$; -- dropped";
        let out = strip_comments(sql).unwrap();
        assert!(out.contains("$fn$ -- kept $fn$"));
        assert!(!out.contains("dropped"));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = strip_comments("x\n/* open").unwrap_err();
        assert_eq!(err, ParseError::UnterminatedComment { line: 2 });
    }
}
