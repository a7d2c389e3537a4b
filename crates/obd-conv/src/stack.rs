//! Fixed-capacity LIFO buffer
//!
//! Used by the formula compiler (pending operators and the postfix output)
//! and by the evaluator (intermediate values). One instance per compile or
//! evaluate call; never shared.

/// Fixed-capacity stack over contiguous storage.
///
/// The stack grows upward: the first pushed element occupies slot 0 and the
/// newest element the highest occupied slot. [`TokenStack::as_slice`] and
/// [`TokenStack::to_vec`] therefore yield elements oldest-first, the mirror
/// image of a pop sequence. The compiler relies on this to turn its output
/// stack into a postfix sequence with one bulk copy.
///
/// Overflow and underflow are contract violations and panic. Callers that
/// handle untrusted input check [`TokenStack::is_full`] before pushing.
#[derive(Debug, Clone)]
pub struct TokenStack<T, const N: usize> {
    data: [T; N],
    top: usize,
}

impl<T: Copy + Default, const N: usize> TokenStack<T, N> {
    /// Create an empty stack
    pub fn new() -> Self {
        Self {
            data: [T::default(); N],
            top: 0,
        }
    }

    /// Maximum number of elements
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of elements currently stored
    pub fn len(&self) -> usize {
        self.top
    }

    pub fn is_empty(&self) -> bool {
        self.top == 0
    }

    pub fn is_full(&self) -> bool {
        self.top == N
    }

    /// Push an element on top.
    ///
    /// # Panics
    ///
    /// Panics if the stack is full.
    pub fn push(&mut self, item: T) {
        assert!(self.top < N, "token stack overflow (capacity {})", N);
        self.data[self.top] = item;
        self.top += 1;
    }

    /// Remove and return the top element.
    ///
    /// # Panics
    ///
    /// Panics if the stack is empty.
    pub fn pop(&mut self) -> T {
        assert!(self.top > 0, "token stack underflow");
        self.top -= 1;
        self.data[self.top]
    }

    /// Top element, or `None` when empty
    pub fn peek(&self) -> Option<T> {
        self.top.checked_sub(1).map(|i| self.data[i])
    }

    /// Occupied storage, oldest element first
    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.top]
    }

    /// Copy the occupied storage out, oldest element first
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }

    pub fn clear(&mut self) {
        self.top = 0;
    }
}

impl<T: Copy + Default, const N: usize> Default for TokenStack<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
