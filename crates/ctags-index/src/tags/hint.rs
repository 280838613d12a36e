use regex::bytes::Regex;

/// Where a tag says its definition lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationHint {
    /// 0-based line number (the table stores it 1-based).
    Line(u32),
    /// No-magic search pattern `/^text$/`. `text` still carries the table's
    /// `\\` and `\/` escapes.
    Pattern {
        text: String,
        anchored_end: bool,
    },
    /// Anything else; resolves to line 0.
    Unresolvable,
}

impl LocationHint {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_suffix(";\"").unwrap_or(raw);

        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            return match raw.parse::<u32>() {
                Ok(line) => Self::Line(line.saturating_sub(1)),
                Err(_) => Self::Unresolvable,
            };
        }

        let Some(body) = raw.strip_prefix("/^").and_then(|rest| rest.strip_suffix('/')) else {
            return Self::Unresolvable;
        };

        match body.strip_suffix('$') {
            Some(text) => Self::Pattern {
                text: text.to_owned(),
                anchored_end: true,
            },
            None => Self::Pattern {
                text: body.to_owned(),
                anchored_end: false,
            },
        }
    }

    /// Build the line matcher for a pattern hint.
    ///
    /// The excerpt is literal: table escapes are undone first, then every
    /// regex metacharacter is escaped, and the result is anchored at line
    /// start (and line end when the pattern was).
    pub fn line_regex(&self) -> Option<Result<Regex, regex::Error>> {
        let Self::Pattern {
            text,
            anchored_end,
        } = self
        else {
            return None;
        };

        let mut expr = String::with_capacity(text.len() + 8);
        expr.push('^');
        expr.push_str(&regex::escape(&unescape_excerpt(text)));
        if *anchored_end {
            expr.push('$');
        }
        Some(Regex::new(&expr))
    }
}

/// Undo the tag format's `\\` and `\/` escapes. Other backslashes are kept.
fn unescape_excerpt(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some(next @ ('\\' | '/')) => out.push(next),
            Some(next) => {
                out.push('\\');
                out.push(next);
            },
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src/tags/hint_tests.rs"]
mod tests;
