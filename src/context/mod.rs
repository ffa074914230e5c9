use std::any::{Any, TypeId};
use std::sync::Arc;

/// Call-scoped, tree-shaped value store.
///
/// A `Context` is an immutable chain of bindings. [`bind`] never mutates
/// the receiver; it returns a new child context carrying one extra value,
/// keyed by the value's type. [`lookup`] walks the chain from the newest
/// binding outward, so a child binding shadows a parent binding of the
/// same type for the child's subtree only; the parent (and any sibling
/// derived from it) never observes it.
///
/// Using the `TypeId` as the key makes bindings collision-proof: two
/// unrelated subsystems can only clash if they bind the exact same type,
/// and a private newtype rules even that out.
///
/// Cancellation and deadlines are not built in. A host that needs them
/// binds its own token type and checks it from inside the work it runs.
///
/// # Examples
///
/// ```
/// use txscope::Context;
///
/// #[derive(Debug, PartialEq)]
/// struct RequestId(u64);
///
/// let root = Context::new();
/// let ctx = root.bind(RequestId(7));
///
/// assert_eq!(ctx.lookup::<RequestId>(), Some(&RequestId(7)));
/// assert_eq!(root.lookup::<RequestId>(), None);
/// ```
///
/// [`bind`]: Context::bind
/// [`lookup`]: Context::lookup
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Frame>>,
}

struct Frame {
    parent: Option<Arc<Frame>>,
    key: TypeId,
    value: Box<dyn Any + Send + Sync>,
}

impl Context {
    /// An empty root context.
    pub fn new() -> Self {
        Self { head: None }
    }

    /// Derive a child context carrying `value`.
    ///
    /// The receiver is untouched; only contexts derived from the returned
    /// one can see the binding.
    pub fn bind<T: Send + Sync + 'static>(&self, value: T) -> Context {
        Context {
            head: Some(Arc::new(Frame {
                parent: self.head.clone(),
                key: TypeId::of::<T>(),
                value: Box::new(value),
            })),
        }
    }

    /// The nearest binding of `T` on this context's derivation chain.
    pub fn lookup<T: Send + Sync + 'static>(&self) -> Option<&T> {
        let mut frame = self.head.as_deref();
        while let Some(f) = frame {
            if f.key == TypeId::of::<T>() {
                return f.value.downcast_ref::<T>();
            }
            frame = f.parent.as_deref();
        }
        None
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut depth = 0usize;
        let mut frame = self.head.as_deref();
        while let Some(fr) = frame {
            depth += 1;
            frame = fr.parent.as_deref();
        }
        f.debug_struct("Context").field("depth", &depth).finish()
    }
}
