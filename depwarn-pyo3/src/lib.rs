//! `depwarn` -- Thin PyO3 wrappers around `depwarn_core`.
//!
//! Exposes a single decorator, `depwarn.deprecated`, for Python facade
//! modules.  Formatting and the three-write emission live in
//! `depwarn_core`; this crate only gathers the Python-side metadata
//! (`__name__`, `__code__`, `__doc__`, the caller frame) and routes the
//! writes to `sys.stderr.write`.
//!
//! # Usage (Python)
//!
//! ```python
//! from depwarn import deprecated
//!
//! class Gps:
//!     @staticmethod
//!     @deprecated          # wrap first, then qualify
//!     def legacy_start():
//!         ...
//!
//! @deprecated
//! class OldCompass:
//!     '''Use Spatial instead.'''
//! ```

use pyo3::exceptions::PyTypeError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyTuple, PyType};

use depwarn_core::caller::UNKNOWN;
use depwarn_core::{CallSite, DeprecationError, DiagnosticSink, Notice, Target, TargetKind};

// ---------------------------------------------------------------------------
// sys.stderr sink
// ---------------------------------------------------------------------------

/// Writes through whatever `sys.stderr.write` resolves to at call time.
struct PyStderr<'py> {
    py: Python<'py>,
}

impl DiagnosticSink for PyStderr<'_> {
    fn write(&self, chunk: &str) -> Result<(), DeprecationError> {
        self.py
            .import("sys")
            .and_then(|sys| sys.getattr("stderr"))
            .and_then(|stderr| stderr.call_method1("write", (chunk,)))
            .map(drop)
            .map_err(|e| DeprecationError::Sink(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Metadata helpers
// ---------------------------------------------------------------------------

fn attr_string(obj: &Bound<'_, PyAny>, name: &str) -> Option<String> {
    obj.getattr(name).ok()?.extract().ok()
}

fn docstring(obj: &Bound<'_, PyAny>) -> Option<String> {
    attr_string(obj, "__doc__")
}

/// The frame that invoked the wrapper.
///
/// Native calls push no Python frame, so the innermost frame is the caller.
fn caller_frame(py: Python<'_>) -> PyResult<CallSite> {
    let frame = py.import("sys")?.getattr("_getframe")?.call0()?;
    let code = frame.getattr("f_code")?;
    let file: String = code.getattr("co_filename")?.extract()?;
    let line: Option<u32> = frame.getattr("f_lineno")?.extract()?;
    let function: String = code.getattr("co_name")?.extract()?;
    Ok(CallSite::new(file, line, function))
}

fn python_caller(py: Python<'_>) -> CallSite {
    caller_frame(py).unwrap_or_else(|e| {
        log::debug!("no Python caller frame available: {e}");
        CallSite::unknown()
    })
}

fn warn(py: Python<'_>, target: &Target) {
    Notice::new(target, python_caller(py)).write_to(&PyStderr { py });
}

fn function_target(func: &Bound<'_, PyAny>) -> Target {
    let name = attr_string(func, "__name__").unwrap_or_else(|| UNKNOWN.to_owned());
    let (file, line) = match func.getattr("__code__") {
        Ok(code) => (
            attr_string(&code, "co_filename").unwrap_or_else(|| UNKNOWN.to_owned()),
            code.getattr("co_firstlineno")
                .ok()
                .and_then(|l| l.extract::<u32>().ok()),
        ),
        Err(_) => (UNKNOWN.to_owned(), None),
    };
    Target::dynamic(TargetKind::Function, name, file, line, docstring(func))
}

fn class_target(cls: &Bound<'_, PyType>) -> Target {
    let any = cls.as_any();
    let name = attr_string(any, "__name__").unwrap_or_else(|| UNKNOWN.to_owned());
    let module = attr_string(any, "__module__").unwrap_or_else(|| UNKNOWN.to_owned());
    Target::dynamic(TargetKind::Class, name, module, None, docstring(any))
}

// ---------------------------------------------------------------------------
// Wrapped function
// ---------------------------------------------------------------------------

/// Callable returned by `deprecated` for functions and methods.
///
/// Carries an instance `__dict__` so `functools.update_wrapper` can copy
/// the wrapped function's `__name__`, `__qualname__`, `__doc__`,
/// `__module__`, `__dict__` and `__wrapped__` onto it.
#[pyclass(module = "depwarn", dict)]
struct DeprecatedFunction {
    wrapped: PyObject,
    target: Target,
}

#[pymethods]
impl DeprecatedFunction {
    #[pyo3(signature = (*args, **kwargs))]
    fn __call__<'py>(
        &self,
        py: Python<'py>,
        args: &Bound<'py, PyTuple>,
        kwargs: Option<&Bound<'py, PyDict>>,
    ) -> PyResult<PyObject> {
        warn(py, &self.target);
        self.wrapped
            .bind(py)
            .call(args.clone(), kwargs)
            .map(Bound::unbind)
    }

    /// Bind like a plain function so it works as a method.
    fn __get__(
        slf: Bound<'_, Self>,
        instance: Option<PyObject>,
        _owner: Option<PyObject>,
    ) -> PyResult<PyObject> {
        match instance {
            Some(instance) => slf
                .py()
                .import("types")?
                .getattr("MethodType")?
                .call1((slf, instance))
                .map(Bound::unbind),
            None => Ok(slf.into_any().unbind()),
        }
    }

    fn __repr__(&self) -> String {
        format!("<deprecated function {}>", self.target.name())
    }
}

// ---------------------------------------------------------------------------
// Wrapped class
// ---------------------------------------------------------------------------

/// Replacement `__new__` installed on a deprecated class.
#[pyclass(module = "depwarn", frozen)]
struct DeprecatedNew {
    original: PyObject,
    /// `object.__new__` rejects extra arguments once `__new__` is
    /// overridden, so it only ever receives the class.  The arity check it
    /// would have made is done by `reject_arguments` instead.
    plain_object_new: bool,
    target: Target,
}

#[pymethods]
impl DeprecatedNew {
    #[pyo3(signature = (cls, *args, **kwargs))]
    fn __call__<'py>(
        &self,
        py: Python<'py>,
        cls: &Bound<'py, PyAny>,
        args: &Bound<'py, PyTuple>,
        kwargs: Option<&Bound<'py, PyDict>>,
    ) -> PyResult<PyObject> {
        warn(py, &self.target);
        let original = self.original.bind(py);
        if self.plain_object_new {
            reject_arguments(py, cls, args, kwargs)?;
            return original.call1((cls,)).map(Bound::unbind);
        }
        let mut forwarded = Vec::with_capacity(args.len() + 1);
        forwarded.push(cls.clone());
        forwarded.extend(args.iter());
        original
            .call(PyTuple::new(py, forwarded)?, kwargs)
            .map(Bound::unbind)
    }
}

/// `C(1)` on a class defining neither `__new__` nor `__init__` must still
/// raise `TypeError`, as it does without the decorator.
fn reject_arguments<'py>(
    py: Python<'py>,
    cls: &Bound<'py, PyAny>,
    args: &Bound<'py, PyTuple>,
    kwargs: Option<&Bound<'py, PyDict>>,
) -> PyResult<()> {
    let has_arguments = !args.is_empty() || kwargs.is_some_and(|kw| !kw.is_empty());
    if !has_arguments {
        return Ok(());
    }
    let object_init = py.import("builtins")?.getattr("object")?.getattr("__init__")?;
    if cls.getattr("__init__")?.is(&object_init) {
        let name = attr_string(cls, "__name__").unwrap_or_else(|| UNKNOWN.to_owned());
        return Err(PyTypeError::new_err(format!("{name}() takes no arguments")));
    }
    Ok(())
}

/// Install the warning hook as `cls.__new__` and hand the class back.
///
/// The class object itself is returned, so `isinstance` checks and
/// subclassing keep working; subclasses inherit the hook.
fn deprecate_class<'py>(py: Python<'py>, cls: &Bound<'py, PyType>) -> PyResult<PyObject> {
    let target = class_target(cls);
    let builtins = py.import("builtins")?;
    let object_new = builtins.getattr("object")?.getattr("__new__")?;
    let original = cls.getattr("__new__")?;
    let plain_object_new = original.is(&object_new);

    let hook = Py::new(
        py,
        DeprecatedNew {
            original: original.unbind(),
            plain_object_new,
            target,
        },
    )?;
    let hook = builtins.getattr("staticmethod")?.call1((hook,))?;
    cls.setattr("__new__", hook)?;

    Ok(cls.clone().into_any().unbind())
}

// ---------------------------------------------------------------------------
// deprecated
// ---------------------------------------------------------------------------

/// Mark a function, method or class as deprecated.
///
/// Apply it below `@staticmethod` / `@classmethod`, never above.
#[pyfunction]
fn deprecated<'py>(py: Python<'py>, obj: &Bound<'py, PyAny>) -> PyResult<PyObject> {
    if let Ok(cls) = obj.downcast::<PyType>() {
        return deprecate_class(py, cls);
    }
    if !obj.is_callable() {
        return Err(PyTypeError::new_err(
            "deprecated() expects a function, method or class",
        ));
    }

    let wrapper = Py::new(
        py,
        DeprecatedFunction {
            wrapped: obj.clone().unbind(),
            target: function_target(obj),
        },
    )?;
    py.import("functools")?
        .getattr("update_wrapper")?
        .call1((wrapper.bind(py), obj))?;
    Ok(wrapper.into_any())
}

// ---------------------------------------------------------------------------
// Module registration
// ---------------------------------------------------------------------------

/// Register the `depwarn` Python module.
#[pymodule]
fn depwarn(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(deprecated, m)?)?;
    m.add_class::<DeprecatedFunction>()?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("__doc__", "Deprecation warnings for functions, methods and classes.")?;

    Ok(())
}
