//! Predicate-driven text scanning
//!
//! [`ScanCursor`] is a window `[start, end)` over an immutable source string.
//! Every operation either narrows the window or hands back a sub-window that
//! borrows the same source, so parsing never copies the input. Predicates
//! decide where a cursor stops and how much a match consumes.
//!
//! The cursor never fails: once the window is exhausted, seeks stop and
//! takes return empty windows. Callers detect truncated input by checking
//! [`ScanCursor::is_empty`].
//!
//! # Example
//!
//! ```
//! use ngm_git::scan::{whitespace, ScanCursor};
//!
//! let mut cursor = ScanCursor::new("# branch.head main\n");
//! let kind = cursor.take_until(whitespace());
//! assert_eq!(kind.as_str(), "#");
//! ```

/// A test applied to the start of a string suffix
pub trait Predicate {
    /// Byte length of the match at the very start of `haystack`, or `None`
    /// when the predicate does not match there.
    fn match_len(&self, haystack: &str) -> Option<usize>;

    /// Whether the predicate matches at the start of `haystack`
    fn matches(&self, haystack: &str) -> bool {
        self.match_len(haystack).is_some()
    }
}

impl<P: Predicate + ?Sized> Predicate for &P {
    fn match_len(&self, haystack: &str) -> Option<usize> {
        (**self).match_len(haystack)
    }
}

fn first_char_if(haystack: &str, test: impl Fn(char) -> bool) -> Option<usize> {
    haystack
        .chars()
        .next()
        .filter(|c| test(*c))
        .map(char::len_utf8)
}

/// Any Unicode whitespace character
#[derive(Debug, Clone, Copy, Default)]
pub struct Whitespace;

impl Predicate for Whitespace {
    fn match_len(&self, haystack: &str) -> Option<usize> {
        first_char_if(haystack, char::is_whitespace)
    }
}

/// An ASCII digit
#[derive(Debug, Clone, Copy, Default)]
pub struct Digit;

impl Predicate for Digit {
    fn match_len(&self, haystack: &str) -> Option<usize> {
        first_char_if(haystack, |c| c.is_ascii_digit())
    }
}

/// An alphabetic character
#[derive(Debug, Clone, Copy, Default)]
pub struct Letter;

impl Predicate for Letter {
    fn match_len(&self, haystack: &str) -> Option<usize> {
        first_char_if(haystack, char::is_alphabetic)
    }
}

/// One specific character
#[derive(Debug, Clone, Copy)]
pub struct Char(pub char);

impl Predicate for Char {
    fn match_len(&self, haystack: &str) -> Option<usize> {
        first_char_if(haystack, |c| c == self.0)
    }
}

/// A literal string. The empty literal never matches.
#[derive(Debug, Clone, Copy)]
pub struct Literal<'p>(pub &'p str);

impl Predicate for Literal<'_> {
    fn match_len(&self, haystack: &str) -> Option<usize> {
        (!self.0.is_empty() && haystack.starts_with(self.0)).then_some(self.0.len())
    }
}

/// Matches a single character wherever the inner predicate does not
#[derive(Debug, Clone, Copy)]
pub struct Not<P>(pub P);

impl<P: Predicate> Predicate for Not<P> {
    fn match_len(&self, haystack: &str) -> Option<usize> {
        if self.0.matches(haystack) {
            None
        } else {
            first_char_if(haystack, |_| true)
        }
    }
}

/// Alternation; the first matching branch decides the length
#[derive(Debug, Clone, Copy)]
pub struct Or<A, B>(pub A, pub B);

impl<A: Predicate, B: Predicate> Predicate for Or<A, B> {
    fn match_len(&self, haystack: &str) -> Option<usize> {
        self.0
            .match_len(haystack)
            .or_else(|| self.1.match_len(haystack))
    }
}

pub fn whitespace() -> Whitespace {
    Whitespace
}

pub fn digit() -> Digit {
    Digit
}

pub fn letter() -> Letter {
    Letter
}

pub fn ch(c: char) -> Char {
    Char(c)
}

pub fn lit(s: &str) -> Literal<'_> {
    Literal(s)
}

pub fn not<P: Predicate>(p: P) -> Not<P> {
    Not(p)
}

pub fn or<A: Predicate, B: Predicate>(a: A, b: B) -> Or<A, B> {
    Or(a, b)
}

/// A newline or carriage return
pub fn eol() -> Or<Char, Char> {
    or(ch('\n'), ch('\r'))
}

/// A window over an immutable source string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanCursor<'a> {
    source: &'a str,
    start: usize,
    end: usize,
}

impl<'a> ScanCursor<'a> {
    /// Create a cursor covering the whole of `source`
    pub fn new(source: &'a str) -> Self {
        ScanCursor {
            source,
            start: 0,
            end: source.len(),
        }
    }

    fn window(&self, start: usize, end: usize) -> ScanCursor<'a> {
        ScanCursor {
            source: self.source,
            start,
            end,
        }
    }

    /// The unconsumed text
    pub fn as_str(&self) -> &'a str {
        &self.source[self.start..self.end]
    }

    /// Remaining length in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Byte offset of the window start within the source
    pub fn offset(&self) -> usize {
        self.start
    }

    /// Whether `p` matches at the current position
    pub fn starts_with(&self, p: impl Predicate) -> bool {
        p.matches(self.as_str())
    }

    fn step(&mut self) {
        if let Some(c) = self.as_str().chars().next() {
            self.start += c.len_utf8();
        }
    }

    /// Advance until `p` matches or the input is exhausted.
    ///
    /// Does nothing if `p` already matches at the current position.
    pub fn seek(&mut self, p: impl Predicate) -> &mut Self {
        while !self.is_empty() && !p.matches(self.as_str()) {
            self.step();
        }
        self
    }

    /// Advance one character, then [`seek`](Self::seek).
    pub fn seek_next(&mut self, p: impl Predicate) -> &mut Self {
        self.step();
        self.seek(p)
    }

    /// [`seek`](Self::seek), then consume the matched region.
    pub fn seek_past(&mut self, p: impl Predicate) -> &mut Self {
        self.seek(&p);
        if let Some(len) = p.match_len(self.as_str()) {
            self.start += len;
        }
        self
    }

    /// Take the next `n` characters, clipped to the end of the window
    pub fn take(&mut self, n: usize) -> ScanCursor<'a> {
        let from = self.start;
        let to = self
            .as_str()
            .char_indices()
            .nth(n)
            .map_or(self.end, |(i, _)| self.start + i);
        self.start = to;
        self.window(from, to)
    }

    /// Take everything up to the first match of `p` (or the end).
    ///
    /// If `p` matches at the current position the result is empty and
    /// nothing is consumed.
    pub fn take_until(&mut self, p: impl Predicate) -> ScanCursor<'a> {
        let from = self.start;
        self.seek(p);
        self.window(from, self.start)
    }

    /// Take the run of characters matching `p`
    pub fn take_while(&mut self, p: impl Predicate) -> ScanCursor<'a> {
        self.take_until(not(p))
    }

    /// Like [`take_until`](Self::take_until) without consuming anything
    pub fn peek_until(&self, p: impl Predicate) -> ScanCursor<'a> {
        let mut probe = *self;
        probe.take_until(p)
    }

    /// Take the current line, then skip line terminators so the cursor
    /// rests on the first character of the next non-empty line.
    pub fn take_line(&mut self) -> ScanCursor<'a> {
        let line = self.take_until(eol());
        self.seek(not(eol()));
        line
    }

    /// Take everything up to `p`, then skip the whole run of consecutive
    /// matches of `p`.
    pub fn split_on_next(&mut self, p: impl Predicate) -> ScanCursor<'a> {
        let head = self.take_until(&p);
        while let Some(len) = p.match_len(self.as_str()) {
            if len == 0 {
                break;
            }
            self.start += len;
        }
        head
    }

    /// Skip leading whitespace
    pub fn trim_start(&mut self) -> &mut Self {
        self.seek(not(whitespace()))
    }
}
