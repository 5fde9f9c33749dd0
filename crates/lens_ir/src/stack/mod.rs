//! Stack safety for recursive value walks.
//!
//! Value graphs coming back from the interpreter can nest arbitrarily deep
//! (a linked list of a few thousand nodes is an ordinary program). Every
//! recursive walk over a `Value` wraps its recursive step in
//! [`ensure_sufficient_stack`].

/// Minimum stack space to keep available (100KB red zone).
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
#[cfg(not(target_arch = "wasm32"))]
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
///
/// - **Native**: uses `stacker::maybe_grow`
/// - **WASM**: calls `f()` directly (the engine manages its own stack)
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
