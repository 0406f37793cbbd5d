//! Conversation Store
//!
//! Information Hiding:
//! - The backing vector is private; turns can only be appended
//! - Readers get a borrowed snapshot, never mutable access

use serde::{Deserialize, Serialize};
use std::fmt;
use std::slice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered, append-only log of turns, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Add a turn at the end. Never fails.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Borrowing view of every turn in insertion order.
    ///
    /// The returned iterator is `Clone`, so the same snapshot can be walked
    /// any number of times.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            inner: self.turns.iter(),
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

#[derive(Debug, Clone)]
pub struct Snapshot<'a> {
    inner: slice::Iter<'a, Turn>,
}

impl<'a> Iterator for Snapshot<'a> {
    type Item = &'a Turn;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Snapshot<'_> {}
