//! Shell-style splitting of DSL text into words.

use crate::error::{DotQueryError, Result};

/// Splits DSL text into words.
///
/// - whitespace separates words
/// - `'...'` is literal, `"..."` honours `\"`, `\\`, `\$` and `` \` ``
/// - a backslash outside quotes escapes the next character
/// - adjacent quoted and unquoted pieces join into one word
/// - unquoted `(` and `)` are always words of their own
pub fn tokenize_dsl(input: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current: Option<String> = None;
    let mut chars = input.char_indices();

    while let Some((position, ch)) = chars.next() {
        match ch {
            ch if ch.is_whitespace() => {
                if let Some(word) = current.take() {
                    words.push(word);
                }
            }
            '(' | ')' => {
                if let Some(word) = current.take() {
                    words.push(word);
                }
                words.push(ch.to_string());
            }
            '\'' => {
                let word = current.get_or_insert_with(String::new);
                loop {
                    match chars.next() {
                        Some((_, '\'')) => break,
                        Some((_, next)) => word.push(next),
                        None => return Err(unterminated('\'', position)),
                    }
                }
            }
            '"' => {
                let word = current.get_or_insert_with(String::new);
                loop {
                    match chars.next() {
                        Some((_, '"')) => break,
                        Some((_, '\\')) => match chars.next() {
                            Some((_, escaped @ ('"' | '\\' | '$' | '`'))) => word.push(escaped),
                            Some((_, '\n')) => {}
                            Some((_, other)) => {
                                word.push('\\');
                                word.push(other);
                            }
                            None => return Err(unterminated('"', position)),
                        },
                        Some((_, next)) => word.push(next),
                        None => return Err(unterminated('"', position)),
                    }
                }
            }
            '\\' => match chars.next() {
                // Line continuation.
                Some((_, '\n')) => {}
                Some((_, escaped)) => current.get_or_insert_with(String::new).push(escaped),
                None => {
                    return Err(DotQueryError::QueryParse(format!(
                        "dangling escape at byte {position}"
                    )))
                }
            },
            _ => current.get_or_insert_with(String::new).push(ch),
        }
    }

    if let Some(word) = current {
        words.push(word);
    }
    Ok(words)
}

fn unterminated(quote: char, position: usize) -> DotQueryError {
    DotQueryError::QueryParse(format!("missing closing {quote} near byte {position}"))
}
