// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-thread coordination stacks
//!
//! Each manager owns a scope id; a thread keeps one stack per scope so that
//! independent managers never see each other's coordinations. All access
//! goes through `try_with` so calls made while the thread is being torn down
//! degrade to "empty stack".

use super::coordination::Coordination;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

type Stack = Vec<Arc<Coordination>>;

thread_local! {
    static STACKS: RefCell<HashMap<u64, Stack>> = RefCell::new(HashMap::new());
}

fn with_stack<R>(scope: u64, f: impl FnOnce(&mut Stack) -> R) -> Option<R> {
    STACKS
        .try_with(|stacks| {
            let mut stacks = stacks.borrow_mut();
            let stack = stacks.entry(scope).or_default();
            let result = f(stack);
            if stack.is_empty() {
                stacks.remove(&scope);
            }
            result
        })
        .ok()
}

pub(crate) fn push(scope: u64, coordination: Arc<Coordination>) {
    with_stack(scope, |stack| stack.push(coordination));
}

pub(crate) fn pop(scope: u64) -> Option<Arc<Coordination>> {
    with_stack(scope, |stack| stack.pop()).flatten()
}

/// Top of the stack, discarding entries that were terminated elsewhere
pub(crate) fn peek_active(scope: u64) -> Option<Arc<Coordination>> {
    // discarded entries are dropped after the stack borrow ends
    let (top, _discarded) = with_stack(scope, |stack| {
        let mut discarded = Vec::new();
        while stack.last().is_some_and(|c| c.is_terminated()) {
            discarded.extend(stack.pop());
        }
        (stack.last().cloned(), discarded)
    })?;
    top
}

pub(crate) fn contains(scope: u64, id: u64) -> bool {
    with_stack(scope, |stack| stack.iter().any(|c| c.id() == id)).unwrap_or(false)
}

pub(crate) fn remove(scope: u64, id: u64) -> bool {
    let removed = with_stack(scope, |stack| {
        let pos = stack.iter().position(|c| c.id() == id)?;
        Some(stack.remove(pos))
    })
    .flatten();
    removed.is_some()
}

/// Coordinations pushed after `id`, topmost first
pub(crate) fn above(scope: u64, id: u64) -> Vec<Arc<Coordination>> {
    with_stack(scope, |stack| match stack.iter().position(|c| c.id() == id) {
        Some(pos) => stack[pos + 1..].iter().rev().cloned().collect(),
        None => Vec::new(),
    })
    .unwrap_or_default()
}

/// The coordination directly beneath `id`
pub(crate) fn below(scope: u64, id: u64) -> Option<Arc<Coordination>> {
    with_stack(scope, |stack| {
        let pos = stack.iter().position(|c| c.id() == id)?;
        pos.checked_sub(1).map(|below| stack[below].clone())
    })
    .flatten()
}

pub(crate) fn depth(scope: u64) -> usize {
    with_stack(scope, |stack| stack.len()).unwrap_or(0)
}
