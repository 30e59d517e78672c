// Splits a command line into tokens.
//
// Whitespace separates tokens, "double" and 'single' quotes group text into one
// token and are stripped. Quotes can start mid-token (cn="John Doe" is one
// token). A backslash escapes the next character outside quotes, and `"` or `\`
// inside double quotes; single quotes take everything literally. An
// unterminated quote never fails: the rest of the line becomes the last token
// and the opening offset is reported.

use serde::Serialize;

/// One token of a command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub text: String,
    /// True if any part of the token was quoted
    pub quoted: bool,
    /// Byte offset of the token's first character in the input
    pub offset: usize,
}

impl Token {
    /// Unquoted tokens starting with `-` are flags. A lone `-` is not.
    pub fn is_flag(&self) -> bool {
        !self.quoted && self.text.len() > 1 && self.text.starts_with('-')
    }
}

/// Result of tokenizing a line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    pub tokens: Vec<Token>,
    /// Byte offset of a quote that was never closed
    pub unterminated_quote: Option<usize>,
}

impl Tokens {
    pub fn texts(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.text.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

pub fn tokenize(input: &str) -> Tokens {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;
    let mut start = 0;
    let mut open_quote: Option<(char, usize)> = None;
    let mut chars = input.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if let Some((quote, _)) = open_quote {
            match ch {
                c if c == quote => open_quote = None,
                '\\' if quote == '"' => match chars.peek() {
                    Some(&(_, next)) if next == '"' || next == '\\' => {
                        current.push(next);
                        chars.next();
                    }
                    _ => current.push(ch),
                },
                c => current.push(c),
            }
            continue;
        }

        match ch {
            '\\' => {
                if !in_token {
                    in_token = true;
                    start = idx;
                }
                // A trailing backslash stays literal
                match chars.next() {
                    Some((_, next)) => current.push(next),
                    None => current.push(ch),
                }
            }
            '"' | '\'' => {
                if !in_token {
                    in_token = true;
                    start = idx;
                }
                quoted = true;
                open_quote = Some((ch, idx));
            }
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(Token {
                        text: std::mem::take(&mut current),
                        quoted,
                        offset: start,
                    });
                    in_token = false;
                    quoted = false;
                }
            }
            c => {
                if !in_token {
                    in_token = true;
                    start = idx;
                }
                current.push(c);
            }
        }
    }

    if in_token {
        tokens.push(Token {
            text: current,
            quoted,
            offset: start,
        });
    }

    Tokens {
        tokens,
        unterminated_quote: open_quote.map(|(_, at)| at),
    }
}

/// Strip a trailing help marker.
///
/// Returns the partial command and whether a `?` was present. Both `search?`
/// and `search ?` ask for help on `search`.
pub fn strip_help_marker(input: &str) -> (&str, bool) {
    let trimmed = input.trim();
    match trimmed.strip_suffix('?') {
        Some(rest) => (rest.trim_end_matches('?').trim_end(), true),
        None => (trimmed, false),
    }
}

/// Quote a value so that [`tokenize`] gives it back as a single token
pub fn quote_if_needed(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\'));

    if !needs_quotes {
        return value.to_string();
    }

    if !value.contains(['"', '\\']) {
        format!("\"{}\"", value)
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}
