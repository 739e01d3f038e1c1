//! Scope stack shared by the reader and the writer.
//!
//! The top of the stack is always the innermost open structure. Entering an
//! array or object pushes its `Empty*` scope, leaving pops it, and the first
//! element moves the top from `Empty*` to `Nonempty*`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    /// No value has been read or written yet.
    EmptyDocument,
    /// The top-level value is complete.
    NonemptyDocument,
    EmptyArray,
    NonemptyArray,
    EmptyObject,
    /// An object with at least one member, waiting for the next name.
    NonemptyObject,
    /// An object whose last name still waits for its value.
    DanglingName,
    /// The stream was closed.
    Closed,
}

#[derive(Debug, Clone)]
pub(crate) struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        let mut scopes = Vec::with_capacity(32);
        scopes.push(Scope::EmptyDocument);
        Self { scopes }
    }

    pub fn push(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    pub fn pop(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    /// The innermost scope. An exhausted stack reads as closed.
    pub fn peek(&self) -> Scope {
        self.scopes.last().copied().unwrap_or(Scope::Closed)
    }

    pub fn replace_top(&mut self, scope: Scope) {
        if let Some(top) = self.scopes.last_mut() {
            *top = scope;
        } else {
            self.scopes.push(scope);
        }
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Drops every scope and leaves a single [`Scope::Closed`] marker.
    pub fn close(&mut self) {
        self.scopes.clear();
        self.scopes.push(Scope::Closed);
    }
}
