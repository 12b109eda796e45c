// Step adapters: turn closures of any supported arity into a uniform callable.
//
// Each adapter knows its own parameter count and types. Calling it binds the
// supplied arguments positionally and reports arity or type mismatches as a
// `StepError` instead of failing opaquely.

use crate::error::StepError;
use crate::step_arg::{FromStepArg, StepArg};

/// Uniform, type-erased step implementation.
pub type StepFn = Box<dyn Fn(Vec<StepArg>) -> Result<(), StepError> + Send + Sync>;

/// Return types a step implementation may have.
pub trait StepOutput {
    fn into_step_result(self) -> Result<(), StepError>;
}

impl StepOutput for () {
    fn into_step_result(self) -> Result<(), StepError> {
        Ok(())
    }
}

impl<E> StepOutput for Result<(), E>
where
    E: Into<anyhow::Error>,
{
    fn into_step_result(self) -> Result<(), StepError> {
        self.map_err(|e| StepError::Failed(e.into()))
    }
}

/// Conversion of a closure into a [`StepFn`].
///
/// `Args` is a marker (the tuple of parameter types) that keeps the impls for
/// different arities apart; callers never name it.
pub trait IntoStepImpl<Args> {
    fn into_step_impl(self) -> StepFn;
}

/// Wrap a closure that wants the raw, unconverted argument list.
pub fn variadic<F, R>(f: F) -> StepFn
where
    F: Fn(Vec<StepArg>) -> R + Send + Sync + 'static,
    R: StepOutput,
{
    Box::new(move |args| f(args).into_step_result())
}

macro_rules! impl_into_step_impl {
    ($($ty:ident),*) => {
        impl<F, R, $($ty,)*> IntoStepImpl<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            R: StepOutput,
            $($ty: FromStepArg,)*
        {
            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn into_step_impl(self) -> StepFn {
                Box::new(move |args: Vec<StepArg>| {
                    let expected = <[&str]>::len(&[$(stringify!($ty)),*]);
                    let actual = args.len();
                    if actual != expected {
                        return Err(StepError::ArityMismatch { expected, actual });
                    }
                    let mut args = args.into_iter().enumerate();
                    $(
                        let (index, arg) = args
                            .next()
                            .ok_or(StepError::ArityMismatch { expected, actual })?;
                        let $ty = <$ty as FromStepArg>::from_step_arg(arg, index)?;
                    )*
                    (self)($($ty),*).into_step_result()
                })
            }
        }
    };
}

impl_into_step_impl!();
impl_into_step_impl!(A1);
impl_into_step_impl!(A1, A2);
impl_into_step_impl!(A1, A2, A3);
impl_into_step_impl!(A1, A2, A3, A4);
impl_into_step_impl!(A1, A2, A3, A4, A5);
impl_into_step_impl!(A1, A2, A3, A4, A5, A6);
impl_into_step_impl!(A1, A2, A3, A4, A5, A6, A7);
impl_into_step_impl!(A1, A2, A3, A4, A5, A6, A7, A8);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn adapt<Args, F: IntoStepImpl<Args>>(f: F) -> StepFn {
        f.into_step_impl()
    }

    #[test]
    fn zero_arity_closure_is_called() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let step = adapt(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        step(Vec::new()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn mixed_arguments_bind_positionally() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let step = adapt(move |name: String, table: Table, count: i64| {
            *sink.lock().unwrap() = Some((name, table.headers.clone(), count));
        });

        let table = Table::new(vec!["H".into()]);
        step(vec![
            StepArg::Scalar("first".into()),
            StepArg::Table(table),
            StepArg::Scalar("7".into()),
        ])
        .unwrap();

        let seen = seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.0, "first");
        assert_eq!(seen.1, vec!["H".to_string()]);
        assert_eq!(seen.2, 7);
    }

    #[test]
    fn wrong_argument_count_is_reported() {
        let step = adapt(|_a: String, _b: String| {});
        let err = step(vec![StepArg::Scalar("only one".into())]).unwrap_err();
        assert!(matches!(err, StepError::ArityMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn wrong_argument_type_is_reported() {
        let step = adapt(|_t: Table| {});
        let err = step(vec![StepArg::Scalar("not a table".into())]).unwrap_err();
        assert!(matches!(err, StepError::ArgumentTypeMismatch { index: 0, .. }));
    }

    #[test]
    fn returned_error_becomes_failed() {
        let step = adapt(|| -> anyhow::Result<()> { anyhow::bail!("assertion failed") });
        let err = step(Vec::new()).unwrap_err();
        assert!(matches!(err, StepError::Failed(_)));
        assert_eq!(err.to_string(), "assertion failed");
    }

    #[test]
    fn variadic_receives_raw_arguments() {
        let count = Arc::new(AtomicUsize::new(0));
        let sink = count.clone();
        let step = variadic(move |args: Vec<StepArg>| {
            sink.store(args.len(), Ordering::SeqCst);
        });
        step(vec![
            StepArg::Scalar("a".into()),
            StepArg::Table(Table::default()),
            StepArg::Scalar("b".into()),
        ])
        .unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
