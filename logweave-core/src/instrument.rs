//! Function call instrumentation.
//!
//! [`Emitter::wrap`] turns any closure into an [`Instrumented`] wrapper that
//! logs each call on entry and on exit at the emitter's level. The wrapper
//! hands back exactly what the closure returned; logging only ever adds
//! lines, it never changes results or swallows panics.
//!
//! ```rust,ignore
//! let double = logger.debug().wrap(|x: i32| x * 2, "double", WrapOptions::new());
//! assert_eq!(double.call(21)?, 42);
//! // debug: Calling function double with args 21
//! // debug: Returned synchronous return value 42 from function double
//! ```
//!
//! Several arguments travel as one tuple. Method-style closures take the
//! receiver first and are called through [`Instrumented::call_on`].
//!
//! Arguments and receivers are logged structurally. Results go through
//! [`IntoValue`], so a returned `String` reads as plain text while a `Vec`
//! is inspected. Closures returning `Result` are called through the
//! `*_fallible` methods, which write no exit line for an `Err`.
//!
//! Whether logging happens is decided once per call. If the emitter is
//! disabled when the call starts, the closure runs with no selector
//! evaluated and no line written, even if the level changes before a
//! deferred result settles.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

#[cfg(feature = "async")]
use std::future::Future;

#[cfg(feature = "async")]
use futures_util::future::{Either, FutureExt};

use crate::emitter::{Emitter, Route};
use crate::error::LogResult;
use crate::serialize::{display, inspect, IntoValue, Value};

const ENTRY: [&str; 3] = ["Calling function ", " with args ", ""];
const ENTRY_WITH_THIS: [&str; 4] = ["Calling function ", " with args ", " and this ", ""];
const SYNC_RESULT: [&str; 3] = ["Returned synchronous return value ", " from function ", ""];
#[cfg(feature = "async")]
const DEFERRED_NOTICE: [&str; 2] = [
    "Called function ",
    " but returned deferred return value... resolving",
];
#[cfg(feature = "async")]
const ASYNC_RESULT: [&str; 3] = ["Returned asynchronous return value ", " from function ", ""];

/// Chooses what part of a call's data ends up in the log line.
pub trait Select<T> {
    /// Hand the selected representation of `value` to `render`.
    fn with_selected<O>(&self, value: &T, render: impl FnOnce(Value<'_>) -> O) -> O;
}

/// Logs the value itself: scalars through `Display`, containers through `Debug`.
///
/// Default for results. Types without an [`IntoValue`] conversion need
/// [`Inspect`] or a mapping selector.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<T> Select<T> for Identity
where
    for<'v> &'v T: IntoValue<'v>,
{
    fn with_selected<O>(&self, value: &T, render: impl FnOnce(Value<'_>) -> O) -> O {
        render(IntoValue::into_value(value))
    }
}

/// Logs any `Debug` value structurally. Default for arguments and receivers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inspect;

impl<T: fmt::Debug> Select<T> for Inspect {
    fn with_selected<O>(&self, value: &T, render: impl FnOnce(Value<'_>) -> O) -> O {
        render(inspect(value))
    }
}

/// Logs whatever a caller-supplied closure derives from the value.
pub struct Mapped<F, U> {
    f: F,
    _output: PhantomData<fn() -> U>,
}

impl<F, U> Mapped<F, U> {
    fn new(f: F) -> Self {
        Self {
            f,
            _output: PhantomData,
        }
    }
}

impl<T, F, U> Select<T> for Mapped<F, U>
where
    F: Fn(&T) -> U,
    for<'v> &'v U: IntoValue<'v>,
{
    fn with_selected<O>(&self, value: &T, render: impl FnOnce(Value<'_>) -> O) -> O {
        let selected = (self.f)(value);
        render(IntoValue::into_value(&selected))
    }
}

impl<F, U> Clone for Mapped<F, U>
where
    F: Clone,
{
    fn clone(&self) -> Self {
        Self::new(self.f.clone())
    }
}

impl<F, U> fmt::Debug for Mapped<F, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mapped(..)")
    }
}

/// Selectors for arguments, result and receiver, plus whether to show the receiver.
#[derive(Debug, Clone)]
pub struct WrapOptions<A = Inspect, R = Identity, T = Inspect> {
    args: A,
    result: R,
    receiver: T,
    show_this: bool,
}

impl WrapOptions {
    /// Log raw arguments and results, hide the receiver.
    pub fn new() -> Self {
        Self {
            args: Inspect,
            result: Identity,
            receiver: Inspect,
            show_this: false,
        }
    }
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R, T> WrapOptions<A, R, T> {
    /// Map the argument list to the value that gets logged.
    pub fn args<Args, U, F>(self, f: F) -> WrapOptions<Mapped<F, U>, R, T>
    where
        F: Fn(&Args) -> U,
        for<'v> &'v U: IntoValue<'v>,
    {
        self.args_with(Mapped::new(f))
    }

    /// Map the return value (or the settled value of a future) before logging.
    pub fn result<Res, U, F>(self, f: F) -> WrapOptions<A, Mapped<F, U>, T>
    where
        F: Fn(&Res) -> U,
        for<'v> &'v U: IntoValue<'v>,
    {
        self.result_with(Mapped::new(f))
    }

    /// Map the receiver before logging. Only used with [`WrapOptions::show_this`].
    pub fn receiver<This, U, F>(self, f: F) -> WrapOptions<A, R, Mapped<F, U>>
    where
        F: Fn(&This) -> U,
        for<'v> &'v U: IntoValue<'v>,
    {
        self.receiver_with(Mapped::new(f))
    }

    pub fn args_with<S>(self, selector: S) -> WrapOptions<S, R, T> {
        WrapOptions {
            args: selector,
            result: self.result,
            receiver: self.receiver,
            show_this: self.show_this,
        }
    }

    /// Use any selector for results, e.g. [`Inspect`] for a struct without a conversion.
    pub fn result_with<S>(self, selector: S) -> WrapOptions<A, S, T> {
        WrapOptions {
            args: self.args,
            result: selector,
            receiver: self.receiver,
            show_this: self.show_this,
        }
    }

    pub fn receiver_with<S>(self, selector: S) -> WrapOptions<A, R, S> {
        WrapOptions {
            args: self.args,
            result: self.result,
            receiver: selector,
            show_this: self.show_this,
        }
    }

    pub fn show_this(mut self, show: bool) -> Self {
        self.show_this = show;
        self
    }
}

/// Everything fixed at wrap time.
#[derive(Debug)]
struct Descriptor<A, R, T> {
    name: Arc<str>,
    emitter: Emitter,
    options: WrapOptions<A, R, T>,
}

impl<A, R, T> Descriptor<A, R, T> {
    /// Resolves where this call's lines go and writes the entry line there.
    fn enter<This, Args>(&self, this: &This, args: &Args) -> LogResult<Route>
    where
        A: Select<Args>,
        T: Select<This>,
    {
        let route = self.emitter.route();
        if route == Route::Skip {
            return Ok(route);
        }

        let name = &*self.name;
        self.options.args.with_selected(args, |args| {
            if self.options.show_this {
                self.options.receiver.with_selected(this, |this| {
                    self.emitter
                        .forward(route, &ENTRY_WITH_THIS, &[display(&name), args, this])
                })
            } else {
                self.emitter.forward(route, &ENTRY, &[display(&name), args])
            }
        })?;
        Ok(route)
    }

    fn log_result<Res>(
        &self,
        route: Route,
        fragments: &[&str; 3],
        result: &Res,
    ) -> LogResult<String>
    where
        R: Select<Res>,
    {
        if route == Route::Skip {
            return Ok(String::new());
        }

        let name = &*self.name;
        self.options.result.with_selected(result, |value| {
            self.emitter
                .forward(route, fragments, &[value, display(&name)])
        })
    }

    fn finish<Res>(&self, route: Route, result: Res) -> LogResult<Res>
    where
        R: Select<Res>,
    {
        self.log_result(route, &SYNC_RESULT, &result)?;
        Ok(result)
    }

    /// `Err` outcomes are handed back without an exit line.
    fn finish_fallible<V, E>(&self, route: Route, outcome: Result<V, E>) -> LogResult<Result<V, E>>
    where
        R: Select<V>,
    {
        if let Ok(value) = &outcome {
            self.log_result(route, &SYNC_RESULT, value)?;
        }
        Ok(outcome)
    }
}

#[cfg(feature = "async")]
impl<A, R, T> Descriptor<A, R, T> {
    /// Writes the deferred notice and attaches `on_settle` to `pending`.
    fn defer<Fut, S>(
        descriptor: &Arc<Self>,
        route: Route,
        pending: Fut,
        on_settle: S,
    ) -> LogResult<impl Future<Output = Fut::Output>>
    where
        Fut: Future,
        S: FnOnce(&Self, Route, &Fut::Output) -> LogResult<String>,
    {
        if route == Route::Skip {
            return Ok(Either::Left(pending));
        }

        let name = &*descriptor.name;
        descriptor
            .emitter
            .forward(route, &DEFERRED_NOTICE, &[display(&name)])?;

        let descriptor = Arc::clone(descriptor);
        Ok(Either::Right(pending.inspect(move |value| {
            if let Err(err) = on_settle(&*descriptor, route, value) {
                tracing::error!(
                    function = %descriptor.name,
                    error = %err,
                    "could not log resolved value"
                );
            }
        })))
    }

    fn settled<Res>(&self, route: Route, value: &Res) -> LogResult<String>
    where
        R: Select<Res>,
    {
        self.log_result(route, &ASYNC_RESULT, value)
    }

    fn settled_fallible<V, E>(&self, route: Route, outcome: &Result<V, E>) -> LogResult<String>
    where
        R: Select<V>,
    {
        match outcome {
            Ok(value) => self.log_result(route, &ASYNC_RESULT, value),
            Err(_) => Ok(String::new()),
        }
    }
}

/// A wrapped closure that logs every call.
///
/// Logging failures come back as `Err`; the closure's own return value is
/// always passed through untouched inside `Ok`. The `*_fallible` variants
/// take closures returning `Result` and write no exit line for an `Err`.
pub struct Instrumented<F, A = Inspect, R = Identity, T = Inspect> {
    f: F,
    descriptor: Arc<Descriptor<A, R, T>>,
}

impl<F, A, R, T> Instrumented<F, A, R, T> {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Immediate call of a free function.
    pub fn call<Args, Out>(&self, args: Args) -> LogResult<Out>
    where
        F: Fn(Args) -> Out,
        A: Select<Args>,
        R: Select<Out>,
        T: Select<()>,
    {
        let route = self.descriptor.enter(&(), &args)?;
        let result = (self.f)(args);
        self.descriptor.finish(route, result)
    }

    /// Immediate call of a method-style closure with an explicit receiver.
    pub fn call_on<This, Args, Out>(&self, this: &This, args: Args) -> LogResult<Out>
    where
        F: Fn(&This, Args) -> Out,
        A: Select<Args>,
        R: Select<Out>,
        T: Select<This>,
    {
        let route = self.descriptor.enter(this, &args)?;
        let result = (self.f)(this, args);
        self.descriptor.finish(route, result)
    }

    /// Call of a free function that can fail.
    ///
    /// Only `Ok` values get an exit line, and the result selector sees the
    /// `Ok` value rather than the `Result`.
    pub fn call_fallible<Args, V, E>(&self, args: Args) -> LogResult<Result<V, E>>
    where
        F: Fn(Args) -> Result<V, E>,
        A: Select<Args>,
        R: Select<V>,
        T: Select<()>,
    {
        let route = self.descriptor.enter(&(), &args)?;
        let outcome = (self.f)(args);
        self.descriptor.finish_fallible(route, outcome)
    }

    pub fn call_on_fallible<This, Args, V, E>(
        &self,
        this: &This,
        args: Args,
    ) -> LogResult<Result<V, E>>
    where
        F: Fn(&This, Args) -> Result<V, E>,
        A: Select<Args>,
        R: Select<V>,
        T: Select<This>,
    {
        let route = self.descriptor.enter(this, &args)?;
        let outcome = (self.f)(this, args);
        self.descriptor.finish_fallible(route, outcome)
    }
}

#[cfg(feature = "async")]
impl<F, A, R, T> Instrumented<F, A, R, T> {
    /// Call a future-returning free function.
    ///
    /// Entry and deferred-notice lines are written before this returns. The
    /// returned future writes the resolved value when it settles and yields
    /// that value unchanged. Dropping it unsettled drops that line too.
    pub fn call_async<Args, Fut>(&self, args: Args) -> LogResult<impl Future<Output = Fut::Output>>
    where
        F: Fn(Args) -> Fut,
        Fut: Future,
        A: Select<Args>,
        R: Select<Fut::Output>,
        T: Select<()>,
    {
        let route = self.descriptor.enter(&(), &args)?;
        let pending = (self.f)(args);
        Descriptor::defer(&self.descriptor, route, pending, Descriptor::settled)
    }

    /// Receiver-taking counterpart of [`Instrumented::call_async`].
    pub fn call_on_async<This, Args, Fut>(
        &self,
        this: &This,
        args: Args,
    ) -> LogResult<impl Future<Output = Fut::Output>>
    where
        F: Fn(&This, Args) -> Fut,
        Fut: Future,
        A: Select<Args>,
        R: Select<Fut::Output>,
        T: Select<This>,
    {
        let route = self.descriptor.enter(this, &args)?;
        let pending = (self.f)(this, args);
        Descriptor::defer(&self.descriptor, route, pending, Descriptor::settled)
    }

    /// Future counterpart of [`Instrumented::call_fallible`]: a future that
    /// settles to `Err` writes no resolved-value line.
    pub fn call_async_fallible<Args, Fut, V, E>(
        &self,
        args: Args,
    ) -> LogResult<impl Future<Output = Result<V, E>>>
    where
        F: Fn(Args) -> Fut,
        Fut: Future<Output = Result<V, E>>,
        A: Select<Args>,
        R: Select<V>,
        T: Select<()>,
    {
        let route = self.descriptor.enter(&(), &args)?;
        let pending = (self.f)(args);
        Descriptor::defer(&self.descriptor, route, pending, Descriptor::settled_fallible)
    }

    pub fn call_on_async_fallible<This, Args, Fut, V, E>(
        &self,
        this: &This,
        args: Args,
    ) -> LogResult<impl Future<Output = Result<V, E>>>
    where
        F: Fn(&This, Args) -> Fut,
        Fut: Future<Output = Result<V, E>>,
        A: Select<Args>,
        R: Select<V>,
        T: Select<This>,
    {
        let route = self.descriptor.enter(this, &args)?;
        let pending = (self.f)(this, args);
        Descriptor::defer(&self.descriptor, route, pending, Descriptor::settled_fallible)
    }
}

impl<F: Clone, A, R, T> Clone for Instrumented<F, A, R, T> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            descriptor: Arc::clone(&self.descriptor),
        }
    }
}

impl<F, A: fmt::Debug, R: fmt::Debug, T: fmt::Debug> fmt::Debug for Instrumented<F, A, R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrumented")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl Emitter {
    /// Wrap `f` so every call is logged at this emitter's level under `name`.
    pub fn wrap<F, A, R, T>(
        &self,
        f: F,
        name: impl Into<Arc<str>>,
        options: WrapOptions<A, R, T>,
    ) -> Instrumented<F, A, R, T> {
        Instrumented {
            f,
            descriptor: Arc::new(Descriptor {
                name: name.into(),
                emitter: self.clone(),
                options,
            }),
        }
    }
}
