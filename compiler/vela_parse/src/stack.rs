//! Stack growth for deeply nested input.
//!
//! Recursive descent over pathological nesting (`((((...))))`) can exhaust
//! the thread stack long before memory runs out. Recursive entry points wrap
//! themselves in [`ensure_sufficient_stack`], which grows the stack on
//! demand via `stacker`.

/// Remaining stack below this triggers a growth (64KB red zone).
const RED_ZONE: usize = 64 * 1024;

/// Each growth allocates this much additional stack (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
