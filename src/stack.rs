//! LIFO byte-string stack used for the main and alt stacks of the interpreter

use crate::types::*;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptStack {
    items: Vec<ByteString>,
}

impl ScriptStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: ByteString) {
        self.items.push(item);
    }

    pub fn pop(&mut self) -> Option<ByteString> {
        self.items.pop()
    }

    /// Top element
    pub fn peek(&self) -> Option<&ByteString> {
        self.items.last()
    }

    /// Element `index` positions below the top; `peek_at(0)` is the top.
    pub fn peek_at(&self, index: usize) -> Option<&ByteString> {
        let len = self.items.len();
        if index >= len {
            return None;
        }
        self.items.get(len - 1 - index)
    }

    /// Removes the element `index` positions below the top, keeping the
    /// order of the others.
    pub fn remove_at(&mut self, index: usize) -> Option<ByteString> {
        let len = self.items.len();
        if index >= len {
            return None;
        }
        Some(self.items.remove(len - 1 - index))
    }

    /// Inserts so that the new element ends up `index` positions below the
    /// top. `insert_at(0, x)` is a push.
    pub fn insert_at(&mut self, index: usize, item: ByteString) -> bool {
        let len = self.items.len();
        if index > len {
            return false;
        }
        self.items.insert(len - index, item);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements bottom to top
    pub fn items(&self) -> &[ByteString] {
        &self.items
    }
}
