//! Per-session line interning.
//!
//! Every distinct line gets a small dense [`Token`] so that the LCS core can
//! compare integers instead of byte strings. Tokens are only meaningful for
//! the [`Interner`] that produced them.

use std::collections::HashMap;
use std::hash::Hash;

/// Opaque identifier of one distinct line within a single [`Interner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(u32);

impl Token {
    /// Position of this token in the interner's reverse table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Maps values to dense tokens and back. There is no removal; an interner
/// lives for one diff, merge or annotate request.
#[derive(Debug, Clone)]
pub struct Interner<T> {
    forward: HashMap<T, Token>,
    reverse: Vec<T>,
}

impl<T> Default for Interner<T> {
    fn default() -> Self {
        Self {
            forward: HashMap::new(),
            reverse: Vec::new(),
        }
    }
}

impl<T: Hash + Eq + Clone> Interner<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the token for `value`, allocating the next unused one if the
    /// value has not been seen before.
    pub fn intern(&mut self, value: T) -> Token {
        if let Some(token) = self.forward.get(&value) {
            return *token;
        }
        assert!(
            self.reverse.len() < u32::MAX as usize,
            "interner token space exhausted"
        );
        let token = Token(self.reverse.len() as u32);
        self.reverse.push(value.clone());
        self.forward.insert(value, token);
        token
    }

    /// Intern a whole sequence, preserving order.
    pub fn intern_all<I>(&mut self, values: I) -> Vec<Token>
    where
        I: IntoIterator<Item = T>,
    {
        values.into_iter().map(|v| self.intern(v)).collect()
    }

    /// The value behind `token`.
    ///
    /// # Panics
    ///
    /// Panics if `token` was not produced by this interner.
    pub fn lookup(&self, token: Token) -> &T {
        assert!(
            token.index() < self.reverse.len(),
            "token {} out of range for interner of {} entries",
            token.index(),
            self.reverse.len()
        );
        &self.reverse[token.index()]
    }

    /// Number of distinct values seen so far.
    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }
}
