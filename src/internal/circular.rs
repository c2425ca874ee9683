//! Circular dependency detection infrastructure.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};
use crate::key::TypeKey;

#[cfg(feature = "smallvec")]
type Stack = smallvec::SmallVec<[TypeKey; 16]>;
#[cfg(not(feature = "smallvec"))]
type Stack = Vec<TypeKey>;

// Thread-local resolution stack; never shared between threads
thread_local! {
    static RESOLUTION_STACK: RefCell<Stack> = RefCell::new(Stack::new());
}

/// Guard for one frame of the thread-local resolution stack.
///
/// Pushing fails with [`DiError::Circular`] when the key is already on the
/// stack. Dropping the guard pops the frame, so the stack is released on
/// success, on error and during unwinding alike.
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub(crate) struct StackGuard {
    key: TypeKey,
}

impl StackGuard {
    pub(crate) fn push(key: TypeKey, max_depth: usize) -> DiResult<Self> {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();

            // Circular detection BEFORE pushing the new key
            if stack.iter().any(|k| *k == key) {
                let mut path: Vec<&'static str> =
                    stack.iter().map(TypeKey::display_name).collect();
                path.push(key.display_name());
                return Err(DiError::Circular(path));
            }

            if stack.len() >= max_depth {
                return Err(DiError::DepthExceeded(stack.len()));
            }

            stack.push(key);
            Ok(Self { key })
        })
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        // try_with: the thread-local may already be gone during thread teardown
        let _ = RESOLUTION_STACK.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(last) = stack.pop() {
                debug_assert_eq!(last, self.key);
            }
        });
    }
}

/// Keys currently being resolved on this thread, first-pushed first.
pub(crate) fn current_chain() -> Vec<TypeKey> {
    RESOLUTION_STACK.with(|stack| stack.borrow().iter().copied().collect())
}
