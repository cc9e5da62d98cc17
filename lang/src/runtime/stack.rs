/// Runs `f`, growing the stack first if it is running low.
///
/// Interpreted recursion maps directly onto host recursion, so deep but
/// finite programs need more than the default thread stack.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    const RED_ZONE: usize = 100 * 1024;
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
