//! Run-time wrapping of callables.
//!
//! [`Deprecated`] pairs a callable with its [`Target`].  Arguments are
//! passed as a tuple, so one wrapper type covers any arity up to six:
//!
//! ```
//! use depwarn_core::{Deprecated, Target};
//!
//! static ADD: Target = Target::function("add", file!(), line!(), &[]);
//! let add = Deprecated::new(&ADD, |a: i32, b: i32| a + b);
//! assert_eq!(add.call((2, 3)), 5);
//! ```

use crate::notice;
use crate::target::Target;

/// Call a value with its arguments packed in a tuple.
///
/// Implemented for every `Fn` of arity 0 through 6.
pub trait Invoke<Args> {
    type Output;

    fn invoke(&self, args: Args) -> Self::Output;
}

macro_rules! impl_invoke {
    ($($arg:ident),*) => {
        impl<Func, Ret, $($arg,)*> Invoke<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Ret,
        {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn invoke(&self, ($($arg,)*): ($($arg,)*)) -> Ret {
                (self)($($arg),*)
            }
        }
    };
}

impl_invoke!();
impl_invoke!(A);
impl_invoke!(A, B);
impl_invoke!(A, B, C);
impl_invoke!(A, B, C, D);
impl_invoke!(A, B, C, D, E);
impl_invoke!(A, B, C, D, E, F);

/// A callable that warns on every call and otherwise behaves like `inner`.
#[derive(Debug, Clone)]
pub struct Deprecated<'t, F> {
    target: &'t Target,
    inner: F,
}

impl<'t, F> Deprecated<'t, F> {
    pub const fn new(target: &'t Target, inner: F) -> Self {
        Self { target, inner }
    }

    pub fn target(&self) -> &Target {
        self.target
    }

    /// The wrapped callable, bypassing the warning.
    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn into_inner(self) -> F {
        self.inner
    }

    /// Emit the notice, then call the wrapped callable with `args`.
    ///
    /// The result is returned unchanged; a panic in the callable unwinds
    /// through after the notice has been written.
    #[track_caller]
    pub fn call<Args>(&self, args: Args) -> F::Output
    where
        F: Invoke<Args>,
    {
        notice::emit(self.target);
        self.inner.invoke(args)
    }
}
