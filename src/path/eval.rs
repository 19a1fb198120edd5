//! Path evaluation.
//!
//! Evaluation is a breadth-first walk: every segment maps the current node
//! list to the next one. Nothing here allocates beyond the node lists, and
//! the results borrow from the input value.

use super::{Segment, Selector};
use serde_json::Value;

pub(super) fn select<'v>(segments: &[Segment], root: &'v Value) -> Vec<&'v Value> {
    let mut current = vec![root];

    for segment in segments {
        let mut next = Vec::new();
        for node in current {
            match segment {
                Segment::Child(selector) => apply(selector, node, &mut next),
                Segment::Descendant(selector) => {
                    let mut scope = Vec::new();
                    self_and_descendants(node, &mut scope);
                    for n in scope {
                        apply(selector, n, &mut next);
                    }
                }
            }
        }
        if next.is_empty() {
            return next;
        }
        current = next;
    }

    current
}

/// Pre-order: the node itself, then each child subtree in document order.
fn self_and_descendants<'v>(node: &'v Value, out: &mut Vec<&'v Value>) {
    out.push(node);
    match node {
        Value::Object(map) => {
            for value in map.values() {
                self_and_descendants(value, out);
            }
        }
        Value::Array(items) => {
            for value in items {
                self_and_descendants(value, out);
            }
        }
        _ => {}
    }
}

fn apply<'v>(selector: &Selector, node: &'v Value, out: &mut Vec<&'v Value>) {
    match selector {
        Selector::Name(name) => {
            if let Value::Object(map) = node {
                if let Some(value) = map.get(name) {
                    out.push(value);
                }
            }
        }
        Selector::Wildcard => match node {
            Value::Object(map) => out.extend(map.values()),
            Value::Array(items) => out.extend(items.iter()),
            _ => {}
        },
        Selector::Index(index) => {
            if let Value::Array(items) = node {
                if let Some(i) = resolve_index(*index, items.len()) {
                    out.push(&items[i]);
                }
            }
        }
        Selector::Slice { start, end, step } => {
            if let Value::Array(items) = node {
                out.extend(slice_indices(*start, *end, *step, items.len()).into_iter().map(|i| &items[i]));
            }
        }
        Selector::Union(selectors) => {
            for selector in selectors {
                apply(selector, node, out);
            }
        }
    }
}

fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let i = if index < 0 { index + len } else { index };
    if (0..len).contains(&i) { Some(i as usize) } else { None }
}

/// Python-style slice indices. `step` is never zero (rejected by the parser).
fn slice_indices(start: Option<i64>, end: Option<i64>, step: i64, len: usize) -> Vec<usize> {
    let len = len as i64;
    let normalize = |i: i64| if i < 0 { i + len } else { i };
    let mut out = Vec::new();

    if step > 0 {
        let mut i = start.map(normalize).unwrap_or(0).clamp(0, len);
        let end = end.map(normalize).unwrap_or(len).clamp(0, len);
        while i < end {
            out.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    } else {
        let mut i = start.map(normalize).unwrap_or(len - 1).clamp(-1, len - 1);
        let end = end.map(normalize).unwrap_or(-1).clamp(-1, len - 1);
        while i > end {
            out.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    }

    out
}
