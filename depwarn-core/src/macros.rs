//! Definition-time decoration.

/// Mark a function, method or type constructor as deprecated.
///
/// The generated item keeps its signature and body.  It is
/// `#[track_caller]`, and every call writes a deprecation notice to the
/// current sink before the original body runs.
///
/// # Functions and methods
///
/// Free functions, methods with any receiver, associated functions and
/// provided trait methods all use the same form.  Only `///` doc comments
/// are accepted as attributes; they become the notice's documentation.
///
/// ```
/// use depwarn_core::mark_deprecated;
///
/// struct Flash;
///
/// impl Flash {
///     mark_deprecated! {
///         /// Use `Flash::set(true)` instead.
///         pub fn on(&self) -> bool {
///             true
///         }
///     }
/// }
///
/// assert!(Flash.on());
/// ```
///
/// # Types
///
/// Wrapping an `impl` block marks the type itself: each constructor in it
/// writes a "Creating an instance of a deprecated class" notice, using the
/// `impl` block's doc comments as documentation.  One such block per type.
///
/// The block takes constructors only: associated functions returning
/// `Self`, with `name: Type` parameters and no receiver.  Methods go in a
/// separate, ordinary `impl` block.
///
/// ```
/// use depwarn_core::mark_deprecated;
///
/// pub struct Compass {
///     heading: f32,
/// }
///
/// mark_deprecated! {
///     /// Superseded by `Spatial`.
///     impl Compass {
///         pub fn new(heading: f32) -> Self {
///             Self { heading }
///         }
///     }
/// }
///
/// impl Compass {
///     pub fn heading(&self) -> f32 {
///         self.heading
///     }
/// }
///
/// assert_eq!(Compass::new(90.0).heading(), 90.0);
/// ```
///
/// A method inside the block is rejected:
///
/// ```compile_fail
/// use depwarn_core::mark_deprecated;
///
/// pub struct Meter(u32);
///
/// mark_deprecated! {
///     impl Meter {
///         pub fn value(&self) -> u32 {
///             self.0
///         }
///     }
/// }
/// ```
///
/// A wrapper type built on top of a deprecated one should construct it
/// from a `#[track_caller]` constructor of its own, so the notice points
/// at whoever built the wrapper.
///
/// # Qualifier order
///
/// Put `mark_deprecated!` directly around the `fn`; visibility goes inside.
/// Other attributes (`#[inline]`, `#[must_use]`, ...) are not accepted on
/// the function form.  Neither are generic parameters, `where` clauses, or
/// `const`, `unsafe`, `async` and `extern` functions; wrap those at run time
/// with [`Deprecated`](crate::Deprecated) instead.
///
/// ```compile_fail
/// use depwarn_core::mark_deprecated;
///
/// mark_deprecated! {
///     fn first<T: Clone>(items: &[T]) -> T {
///         items[0].clone()
///     }
/// }
/// ```
///
/// # Caller resolution
///
/// The caller's file and line come from `#[track_caller]`, so they are
/// only meaningful for direct calls.  Passing the function as a value
/// (`iter.map(fetch)`, a `fn` pointer, a `dyn Fn`) reports the standard
/// library shim that invoked it, e.g. `core/src/ops/function.rs`.  Call it
/// from a closure (`iter.map(|x| fetch(x))`) to keep the real caller.
///
/// The caller's function name is read from debug info.  Builds without it,
/// including this workspace's release profile (`strip = "symbols"`),
/// report `<unknown>()` as the caller.
#[macro_export]
macro_rules! mark_deprecated {
    (
        $(#[doc = $doc:literal])*
        impl $ty:ident {
            $(
                $(#[$fn_attr:meta])*
                $fn_vis:vis fn $ctor:ident ( $($arg:ident : $arg_ty:ty),* $(,)? ) -> Self $body:block
            )*
        }
    ) => {
        $(#[doc = $doc])*
        impl $ty {
            #[doc(hidden)]
            fn __depwarn_class_target() -> &'static $crate::Target {
                static TARGET: $crate::Target =
                    $crate::Target::class(stringify!($ty), file!(), line!(), &[$($doc),*]);
                &TARGET
            }

            $(
                $(#[$fn_attr])*
                #[track_caller]
                $fn_vis fn $ctor ( $($arg : $arg_ty),* ) -> Self {
                    $crate::notice::emit(Self::__depwarn_class_target());
                    $body
                }
            )*
        }
    };

    (
        $(#[doc = $doc:literal])*
        $vis:vis fn $name:ident ( $($params:tt)* ) $(-> $ret:ty)? $body:block
    ) => {
        $(#[doc = $doc])*
        #[track_caller]
        $vis fn $name ( $($params)* ) $(-> $ret)? {
            static __DEPWARN_TARGET: $crate::Target =
                $crate::Target::function(stringify!($name), file!(), line!(), &[$($doc),*]);
            $crate::notice::emit(&__DEPWARN_TARGET);
            $body
        }
    };
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::ops::Deref;
    use std::sync::Arc;

    use crate::notice::{NOTICE_TERMINATOR, WARNING_TAG};
    use crate::sink::{with_sink, CaptureSink};

    type Kwargs = BTreeMap<&'static str, i32>;

    /// Strip `part` and everything before it, failing if absent.
    fn cutter<'a>(part: &str, s: &'a str) -> &'a str {
        let at = s
            .find(part)
            .unwrap_or_else(|| panic!("{part:?} not found in {s:?}"));
        &s[at + part.len()..]
    }

    fn kwargs() -> Kwargs {
        BTreeMap::from([("x", 1), ("y", 2)])
    }

    fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
        let sink = Arc::new(CaptureSink::new());
        let out = with_sink(sink.clone(), f);
        (out, sink.take())
    }

    /// Check the headline of a function notice piece by piece, in order.
    fn assert_function_headline(headline: &str, name: &str, caller: &str) {
        let rest = cutter(WARNING_TAG, headline);
        let rest = cutter(&format!("deprecated function {name}"), rest);
        let rest = cutter("macros.rs", rest);
        let rest = cutter("Called from", rest);
        let rest = cutter("macros.rs", rest);
        let rest = cutter(&format!("by {caller}().\n"), rest);
        assert_eq!(rest, "");
    }

    fn assert_class_headline(headline: &str, name: &str, caller: &str) {
        let rest = cutter(WARNING_TAG, headline);
        let rest = cutter("Creating an instance", rest);
        let rest = cutter(&format!("deprecated class {name} in"), rest);
        let rest = cutter("macros.rs", rest);
        let rest = cutter("Called from", rest);
        let rest = cutter("macros.rs", rest);
        let rest = cutter(&format!("by {caller}().\n"), rest);
        assert_eq!(rest, "");
    }

    // -----------------------------------------------------------------------
    // Free functions
    // -----------------------------------------------------------------------

    mark_deprecated! {
        fn function() -> i32 {
            1
        }
    }

    mark_deprecated! {
        fn function_with_arg(arg: i32) -> i32 {
            arg
        }
    }

    /// Named arguments travel as a struct.
    struct KwargOptions {
        kwarg: i32,
    }

    mark_deprecated! {
        fn function_with_kwarg(opts: KwargOptions) -> i32 {
            opts.kwarg
        }
    }

    mark_deprecated! {
        /// Fails on odd input.
        fn fallible(n: u32) -> Result<u32, String> {
            if n % 2 == 1 {
                return Err(format!("odd: {n}"));
            }
            Ok(n / 2)
        }
    }

    #[test]
    fn test_deprecated_function() {
        let (value, writes) = capture(|| function());
        assert_eq!(value, 1);
        assert_eq!(writes.len(), 3);
        assert_function_headline(&writes[0], "function", "test_deprecated_function");
        assert_eq!(writes[1], "");
        assert_eq!(writes[2], NOTICE_TERMINATOR);
    }

    #[test]
    fn test_deprecated_function_arg() {
        let (value, writes) = capture(|| function_with_arg(1));
        assert_eq!(value, 1);
        assert_function_headline(&writes[0], "function_with_arg", "test_deprecated_function_arg");
        assert_eq!(writes[2], "\n");
    }

    #[test]
    fn test_deprecated_function_kwarg() {
        let (value, writes) = capture(|| function_with_kwarg(KwargOptions { kwarg: 1 }));
        assert_eq!(value, 1);
        assert_function_headline(&writes[0], "function_with_kwarg", "test_deprecated_function_kwarg");
        assert_eq!(writes[2], "\n");
    }

    #[test]
    fn test_early_return_and_errors_pass_through() {
        let (results, writes) = capture(|| (fallible(4), fallible(3)));
        assert_eq!(results.0, Ok(2));
        assert_eq!(results.1, Err("odd: 3".to_owned()));
        assert_eq!(writes.len(), 6);
        assert_eq!(writes[1], "Fails on odd input.");
        assert_eq!(writes[4], "Fails on odd input.");
    }

    #[test]
    fn test_headline_names_declaration_line() {
        let (_, writes) = capture(|| function());
        let rest = cutter(", line ", &writes[0]);
        let decl_line: u32 = rest[..rest.find('.').unwrap()].parse().unwrap();
        assert!(decl_line > 0);
    }

    // -----------------------------------------------------------------------
    // Methods
    // -----------------------------------------------------------------------

    struct Class {
        args: Vec<i32>,
        kwargs: Kwargs,
    }

    impl Class {
        fn new(args: Vec<i32>, kwargs: Kwargs) -> Self {
            Self { args, kwargs }
        }

        mark_deprecated! {
            /// Dummy deprecated method.
            fn method(&self) -> (Vec<i32>, Kwargs) {
                (self.args.clone(), self.kwargs.clone())
            }
        }

        mark_deprecated! {
            /// Dummy deprecated static method.
            fn static_method() -> (Option<Vec<i32>>, Option<Kwargs>) {
                (None, None)
            }
        }
    }

    trait Registered {
        const ARGS: Option<&'static [i32]>;

        mark_deprecated! {
            /// Dummy deprecated class method.
            fn clsmethod() -> Option<&'static [i32]> {
                Self::ARGS
            }
        }
    }

    impl Registered for Class {
        const ARGS: Option<&'static [i32]> = None;
    }

    #[test]
    fn test_deprecated_class_method() {
        let obj = Class::new(vec![1, 2, 3], kwargs());
        let (value, writes) = capture(|| obj.method());
        assert_eq!(value, (vec![1, 2, 3], kwargs()));
        assert_function_headline(&writes[0], "method", "test_deprecated_class_method");
        assert_eq!(writes[1], "Dummy deprecated method.");
        assert_eq!(writes[2], "\n");
    }

    #[test]
    fn test_deprecated_class_static() {
        let (value, writes) = capture(|| Class::static_method());
        assert_eq!(value, (None, None));
        assert_eq!(writes.len(), 3);
        assert_function_headline(&writes[0], "static_method", "test_deprecated_class_static");
        assert_eq!(writes[1], "Dummy deprecated static method.");
        assert_eq!(writes[2], "\n");
    }

    #[test]
    fn test_deprecated_class_clsmethod() {
        let (value, writes) = capture(|| Class::clsmethod());
        assert_eq!(value, None);
        assert_eq!(writes.len(), 3);
        assert_function_headline(&writes[0], "clsmethod", "test_deprecated_class_clsmethod");
        assert_eq!(writes[2], "\n");
    }

    // -----------------------------------------------------------------------
    // Types
    // -----------------------------------------------------------------------

    #[derive(Debug, PartialEq)]
    struct Legacy {
        args: Vec<i32>,
        kwargs: Kwargs,
    }

    mark_deprecated! {
        /// Dummy deprecated class.
        impl Legacy {
            fn new(args: Vec<i32>, kwargs: Kwargs) -> Self {
                Self { args, kwargs }
            }

            fn empty() -> Self {
                Self { args: Vec::new(), kwargs: Kwargs::new() }
            }
        }
    }

    impl Legacy {
        fn arg_count(&self) -> usize {
            self.args.len()
        }
    }

    /// Builds on `Legacy` the way a subclass extends its base.
    struct Inherited {
        base: Legacy,
        args: Vec<i32>,
        kwargs: Kwargs,
    }

    impl Deref for Inherited {
        type Target = Legacy;

        fn deref(&self) -> &Legacy {
            &self.base
        }
    }

    impl Inherited {
        #[track_caller]
        fn new(args: Vec<i32>, kwargs: Kwargs) -> Self {
            let base = Legacy::new(args.clone(), kwargs.clone());
            Self { base, args, kwargs }
        }
    }

    #[test]
    fn test_deprecated_class() {
        let (obj, writes) = capture(|| Legacy::new(vec![1, 2, 3], kwargs()));
        assert_eq!(obj.args, vec![1, 2, 3]);
        assert_eq!(obj.kwargs, kwargs());
        assert_eq!(writes.len(), 3);
        assert_class_headline(&writes[0], "Legacy", "test_deprecated_class");
        assert_eq!(writes[1], "Dummy deprecated class.");
        assert_eq!(writes[2], "\n");
    }

    #[test]
    fn test_every_constructor_warns() {
        let (obj, writes) = capture(|| Legacy::empty());
        assert_eq!(obj, Legacy { args: vec![], kwargs: Kwargs::new() });
        assert_class_headline(&writes[0], "Legacy", "test_every_constructor_warns");
    }

    #[test]
    fn test_instance_methods_do_not_warn() {
        let (counts, writes) = capture(|| {
            let obj = Legacy::new(vec![1, 2, 3], kwargs());
            (obj.arg_count(), obj.arg_count())
        });
        assert_eq!(counts, (3, 3));
        assert_eq!(writes.len(), 3);
        assert_class_headline(&writes[0], "Legacy", "test_instance_methods_do_not_warn");
    }

    #[test]
    fn test_deprecated_class_inherited() {
        let (obj, writes) = capture(|| Inherited::new(vec![1, 2, 3], kwargs()));
        let base: &Legacy = &obj;
        assert_eq!(base.args, vec![1, 2, 3]);
        assert_eq!(obj.args, vec![1, 2, 3]);
        assert_eq!(obj.kwargs, kwargs());
        assert_eq!(writes.len(), 3);
        assert_class_headline(&writes[0], "Legacy", "test_deprecated_class_inherited");
        assert_eq!(writes[2], "\n");
    }

    #[test]
    fn test_one_notice_per_instantiation() {
        let (_, writes) = capture(|| {
            for _ in 0..3 {
                Inherited::new(vec![], Kwargs::new());
            }
        });
        assert_eq!(writes.len(), 9);
        assert!(writes.iter().step_by(3).all(|w| w.contains("deprecated class Legacy")));
    }

    #[test]
    #[allow(clippy::redundant_closure)]
    fn test_closure_keeps_the_real_caller() {
        let (values, writes) = capture(|| (1..=2).map(|n| function_with_arg(n)).collect::<Vec<_>>());
        assert_eq!(values, vec![1, 2]);
        assert_eq!(writes.len(), 6);
        for headline in writes.iter().step_by(3) {
            assert!(!headline.contains("function.rs"), "{headline}");
            assert_function_headline(headline, "function_with_arg", "test_closure_keeps_the_real_caller");
        }
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    #[allow(clippy::redundant_closure)]
    fn test_concurrent_callers_get_own_notices() {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    let (value, writes) = capture(|| {
                        (0..i + 1).map(|n| function_with_arg(n)).sum::<i32>()
                    });
                    (i, value, writes.len())
                })
            })
            .collect();

        for handle in handles {
            let (i, value, count) = handle.join().unwrap();
            assert_eq!(value, (0..i + 1).sum::<i32>());
            assert_eq!(count, 3 * (i as usize + 1));
        }
    }
}
