//! Dot-path parser.

use crate::error::{DotQueryError, Result};

use super::{DotPath, Selector};

/// Parses a dot-path string into its selectors.
pub fn parse_dot_path(input: &str) -> Result<DotPath> {
    let mut parser = Parser::new(input);
    let selectors = parser.parse_path()?;
    Ok(DotPath {
        raw: input.to_string(),
        selectors,
    })
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self, ch: char) {
        self.pos += ch.len_utf8();
    }

    fn error(&self, reason: impl std::fmt::Display) -> DotQueryError {
        DotQueryError::PathSyntax(format!(
            "{reason} at byte {} in {:?}",
            self.pos, self.input
        ))
    }

    fn parse_path(&mut self) -> Result<Vec<Selector>> {
        if self.input.is_empty() {
            return Err(DotQueryError::PathSyntax("path is empty".to_string()));
        }

        let mut selectors = Vec::new();
        loop {
            self.parse_segment(&mut selectors)?;
            match self.peek() {
                None => return Ok(selectors),
                Some('.') => self.advance('.'),
                Some(other) => return Err(self.error(format!("unexpected '{other}'"))),
            }
        }
    }

    /// segment := (name | '*')? bracket*, with at least one part present.
    fn parse_segment(&mut self, selectors: &mut Vec<Selector>) -> Result<()> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            match ch {
                '.' | '[' => break,
                ']' => return Err(self.error("unexpected ']'")),
                _ => self.advance(ch),
            }
        }

        let name = &self.input[start..self.pos];
        let has_name = !name.is_empty();
        match name {
            "" => {}
            "*" => selectors.push(Selector::Wildcard),
            _ => selectors.push(Selector::Member(name.to_string())),
        }

        let mut brackets = 0usize;
        while self.peek() == Some('[') {
            self.advance('[');
            selectors.push(self.parse_bracket()?);
            brackets += 1;
        }

        if !has_name && brackets == 0 {
            return Err(self.error("empty path segment"));
        }
        Ok(())
    }

    /// bracket body := '*' | integer | quoted key, followed by ']'.
    fn parse_bracket(&mut self) -> Result<Selector> {
        let selector = match self.peek() {
            Some('*') => {
                self.advance('*');
                Selector::Wildcard
            }
            Some(quote @ ('\'' | '"')) => {
                self.advance(quote);
                Selector::Key(self.parse_quoted(quote)?)
            }
            Some(_) => {
                let start = self.pos;
                while let Some(ch) = self.peek() {
                    if ch == ']' {
                        break;
                    }
                    self.advance(ch);
                }
                let raw = self.input[start..self.pos].trim();
                let index = raw
                    .parse::<i64>()
                    .map_err(|_| self.error(format!("invalid index '{raw}'")))?;
                Selector::Index(index)
            }
            None => return Err(self.error("unclosed '['")),
        };

        match self.peek() {
            Some(']') => {
                self.advance(']');
                Ok(selector)
            }
            Some(other) => Err(self.error(format!("expected ']', got '{other}'"))),
            None => Err(self.error("unclosed '['")),
        }
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String> {
        let mut key = String::new();
        let mut escaped = false;
        while let Some(ch) = self.peek() {
            self.advance(ch);
            if escaped {
                key.push(ch);
                escaped = false;
                continue;
            }
            if ch == '\\' {
                escaped = true;
                continue;
            }
            if ch == quote {
                return Ok(key);
            }
            key.push(ch);
        }
        Err(self.error("missing closing quote"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors(input: &str) -> Vec<Selector> {
        parse_dot_path(input).expect("parse").selectors
    }

    #[test]
    fn parses_dotted_members() {
        assert_eq!(
            selectors("a.b.0"),
            vec![
                Selector::Member("a".to_string()),
                Selector::Member("b".to_string()),
                Selector::Member("0".to_string()),
            ]
        );
    }

    #[test]
    fn parses_wildcards_and_brackets() {
        assert_eq!(
            selectors("items[*].tags[-1]"),
            vec![
                Selector::Member("items".to_string()),
                Selector::Wildcard,
                Selector::Member("tags".to_string()),
                Selector::Index(-1),
            ]
        );
        assert_eq!(
            selectors("*.name"),
            vec![Selector::Wildcard, Selector::Member("name".to_string())]
        );
        assert_eq!(selectors("[0][1]"), vec![Selector::Index(0), Selector::Index(1)]);
    }

    #[test]
    fn parses_quoted_keys_with_dots() {
        assert_eq!(
            selectors(r#"meta["a.b"]['it\'s']"#),
            vec![
                Selector::Member("meta".to_string()),
                Selector::Key("a.b".to_string()),
                Selector::Key("it's".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_malformed_paths() {
        for input in ["", "a..b", ".a", "a.", "a[", "a[x]", "a[1", "a]", "a['b", "a[1]x"] {
            match parse_dot_path(input) {
                Err(DotQueryError::PathSyntax(_)) => {}
                other => panic!("expected syntax error for {input:?}, got {other:?}"),
            }
        }
    }
}
