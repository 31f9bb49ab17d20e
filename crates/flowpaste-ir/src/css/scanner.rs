//! Brace-aware tokenizer for stylesheet text.
//!
//! Splits a stylesheet into top-level items without interpreting selectors or
//! values. Quotes and parentheses are tracked so `{`, `}` and `;` inside
//! strings or functions never terminate a construct.

/// A top-level stylesheet construct. All slices borrow from the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssItem<'a> {
    /// `selector { body }`
    Rule(QualifiedRule<'a>),
    /// `@name prelude { body }`
    AtBlock(AtRule<'a>),
    /// `@name prelude;`
    AtStatement(AtRule<'a>),
}

impl<'a> CssItem<'a> {
    pub fn source(&self) -> &'a str {
        match self {
            CssItem::Rule(rule) => rule.source,
            CssItem::AtBlock(rule) | CssItem::AtStatement(rule) => rule.source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedRule<'a> {
    pub selector: &'a str,
    pub body: &'a str,
    pub source: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtRule<'a> {
    /// Lowercase name without the `@`.
    pub name: &'a str,
    pub prelude: &'a str,
    pub body: Option<&'a str>,
    pub source: &'a str,
}

impl AtRule<'_> {
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A single `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased, except custom properties which are case-sensitive.
    pub property: String,
    pub value: String,
}

/// Removes `/* ... */` comments, leaving string contents untouched.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;
    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            out.push(ch);
            if ch == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                out.push(ch);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Scans comment-free stylesheet text into top-level items.
pub fn scan(css: &str) -> Vec<CssItem<'_>> {
    Scanner::new(css).items()
}

struct Scanner<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn items(mut self) -> Vec<CssItem<'a>> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eof() {
                break;
            }
            let start = self.pos;
            let item = if self.bytes[start] == b'@' {
                self.at_rule(start)
            } else {
                self.qualified_rule(start)
            };
            if let Some(item) = item {
                items.push(item);
            }
        }
        items
    }

    fn qualified_rule(&mut self, start: usize) -> Option<CssItem<'a>> {
        match self.find_structural() {
            Some(b'{') => {
                let selector = self.input[start..self.pos].trim();
                let (body, end) = self.block();
                let source = self.input[start..end].trim();
                if selector.is_empty() {
                    return None;
                }
                Some(CssItem::Rule(QualifiedRule {
                    selector,
                    body,
                    source,
                }))
            }
            // Stray `;` or `}`: drop the fragment and resynchronize after it.
            Some(_) => {
                self.pos += 1;
                None
            }
            None => None,
        }
    }

    fn at_rule(&mut self, start: usize) -> Option<CssItem<'a>> {
        self.pos += 1;
        let name_start = self.pos;
        while !self.eof() {
            let b = self.bytes[self.pos];
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let name = &self.input[name_start..self.pos];
        let prelude_start = self.pos;
        match self.find_structural() {
            Some(b'{') => {
                let prelude = self.input[prelude_start..self.pos].trim();
                let (body, end) = self.block();
                Some(CssItem::AtBlock(AtRule {
                    name,
                    prelude,
                    body: Some(body),
                    source: self.input[start..end].trim(),
                }))
            }
            Some(b';') => {
                let prelude = self.input[prelude_start..self.pos].trim();
                self.pos += 1;
                Some(CssItem::AtStatement(AtRule {
                    name,
                    prelude,
                    body: None,
                    source: self.input[start..self.pos].trim(),
                }))
            }
            Some(_) => {
                self.pos += 1;
                None
            }
            None => {
                let prelude = self.input[prelude_start..].trim();
                Some(CssItem::AtStatement(AtRule {
                    name,
                    prelude,
                    body: None,
                    source: self.input[start..].trim(),
                }))
            }
        }
    }

    /// Advances to the next top-level `{`, `;` or `}` and returns it.
    fn find_structural(&mut self) -> Option<u8> {
        let mut parens = 0usize;
        while !self.eof() {
            let b = self.bytes[self.pos];
            match b {
                b'"' | b'\'' => {
                    self.skip_string(b);
                    continue;
                }
                b'(' => parens += 1,
                b')' => parens = parens.saturating_sub(1),
                b'{' | b'}' | b';' if parens == 0 => return Some(b),
                _ => {}
            }
            self.pos += 1;
        }
        None
    }

    /// Consumes a `{ ... }` block starting at the opening brace. Returns the
    /// inner text and the index just past the closing brace.
    fn block(&mut self) -> (&'a str, usize) {
        self.pos += 1;
        let body_start = self.pos;
        let mut depth = 1usize;
        while !self.eof() {
            let b = self.bytes[self.pos];
            match b {
                b'"' | b'\'' => {
                    self.skip_string(b);
                    continue;
                }
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        let body = &self.input[body_start..self.pos];
                        self.pos += 1;
                        return (body, self.pos);
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        // Unterminated block runs to end of input.
        (&self.input[body_start..], self.input.len())
    }

    fn skip_string(&mut self, quote: u8) {
        self.pos += 1;
        while !self.eof() {
            let b = self.bytes[self.pos];
            self.pos += 1;
            if b == b'\\' {
                self.pos += 1;
            } else if b == quote {
                return;
            }
        }
        self.pos = self.pos.min(self.bytes.len());
    }

    fn skip_whitespace(&mut self) {
        while !self.eof() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }
}

/// Splits on `separator` outside strings and parentheses. Pieces are trimmed
/// and empty pieces dropped.
pub fn split_top_level(input: &str, separator: u8) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut parts = Vec::new();
    let mut parens = 0usize;
    let mut brackets = 0usize;
    let mut quote: Option<u8> = None;
    let mut start = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 1;
            } else if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'(' => parens += 1,
            b')' => parens = parens.saturating_sub(1),
            b'[' => brackets += 1,
            b']' => brackets = brackets.saturating_sub(1),
            _ if b == separator && parens == 0 && brackets == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&input[start..]);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Splits a value into space-separated components, keeping functions whole.
pub fn split_value_components(value: &str) -> Vec<&str> {
    let bytes = value.as_bytes();
    let mut parts = Vec::new();
    let mut parens = 0usize;
    let mut start: Option<usize> = None;
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'(' => parens += 1,
            b')' => parens = parens.saturating_sub(1),
            _ => {}
        }
        if b.is_ascii_whitespace() && parens == 0 {
            if let Some(s) = start.take() {
                parts.push(&value[s..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        parts.push(&value[s..]);
    }
    parts
}

/// Parses a declaration block body into ordered declarations.
pub fn parse_declarations(body: &str) -> Vec<Declaration> {
    split_top_level(body, b';')
        .into_iter()
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            let property = if name.starts_with("--") {
                name.to_string()
            } else {
                name.to_ascii_lowercase()
            };
            Some(Declaration {
                property,
                value: value.to_string(),
            })
        })
        .collect()
}
