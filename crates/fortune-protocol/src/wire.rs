//! Line tokenizer and argument quoting.
//!
//! A line is a verb followed by arguments separated by whitespace. An
//! argument that contains a space travels between double quotes:
//!
//! ```text
//! GUESS "WHEEL OF FORTUNE"
//! FILL "h e l l o" _ _ _ _ _
//! ```
//!
//! Two limitations apply. Embedded quote characters are
//! never escaped, and an unterminated quote swallows the rest of the line
//! as one token instead of failing.

use std::borrow::Cow;

use crate::Verb;

/// Splits a line into its verb token and the remaining body.
///
/// The body has its leading whitespace removed. Either part may be empty.
///
/// ```rust
/// use fortune_protocol::wire::split_verb;
///
/// assert_eq!(split_verb("JOIN   pedro"), ("JOIN", "pedro"));
/// assert_eq!(split_verb("GO"), ("GO", ""));
/// ```
pub fn split_verb(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.find(char::is_whitespace) {
        Some(end) => (&line[..end], line[end..].trim_start()),
        None => (line, ""),
    }
}

/// Splits a command body into argument tokens.
///
/// Each step consumes either a bare run of non-whitespace characters or a
/// quoted run up to the next quote, then any whitespace after it. Quotes
/// are stripped and every token is trimmed. An empty body yields no
/// tokens.
///
/// ```rust
/// use fortune_protocol::wire::tokenize;
///
/// assert_eq!(tokenize("pedro"), vec!["pedro"]);
/// assert_eq!(tokenize("\"h e l l o\" _ _"), vec!["h e l l o", "_", "_"]);
/// assert!(tokenize("").is_empty());
/// ```
pub fn tokenize(body: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = body.trim_start();

    while !rest.is_empty() {
        let (token, remainder) = match rest.strip_prefix('"') {
            Some(quoted) => match quoted.find('"') {
                Some(end) => (&quoted[..end], &quoted[end + 1..]),
                // Unterminated: the rest of the line is one token.
                None => (quoted, ""),
            },
            None => {
                let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                (&rest[..end], &rest[end..])
            }
        };
        tokens.push(token.trim().to_string());
        rest = remainder.trim_start();
    }

    tokens
}

/// Quotes an argument if, and only if, it contains a space.
pub fn quote(arg: &str) -> Cow<'_, str> {
    if arg.contains(' ') {
        Cow::Owned(format!("\"{arg}\""))
    } else {
        Cow::Borrowed(arg)
    }
}

/// Builds a full line: the verb, then each argument after one space.
pub fn encode_line<S: AsRef<str>>(verb: Verb, args: &[S]) -> String {
    let mut line = String::from(verb.as_str());
    for arg in args {
        line.push(' ');
        line.push_str(&quote(arg.as_ref()));
    }
    line
}
