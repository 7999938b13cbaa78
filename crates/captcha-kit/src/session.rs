use std::sync::Mutex;

use captcha_kit_core::Tensor;

use crate::KitError;

/// A loaded model that maps one input tensor to one output tensor.
///
/// Sessions are not assumed to be reentrant: [`crate::Recognizer`] and
/// [`crate::Detector`] call `run` with exclusive access. Returning `Ok(None)`
/// means the engine produced no output.
pub trait InferenceSession {
    type Error: std::error::Error + Send + Sync + 'static;

    fn run(&mut self, input: &Tensor) -> Result<Option<Tensor>, Self::Error>;
}

impl<F, E> InferenceSession for F
where
    F: FnMut(&Tensor) -> Result<Option<Tensor>, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn run(&mut self, input: &Tensor) -> Result<Option<Tensor>, E> {
        self(input)
    }
}

/// Run `session` under its lock and reject missing or empty output.
pub(crate) fn run_locked<S: InferenceSession>(
    session: &Mutex<S>,
    input: &Tensor,
) -> Result<Tensor, KitError> {
    let mut guard = session.lock().map_err(|_| KitError::SessionPoisoned)?;
    let output = guard
        .run(input)
        .map_err(|e| KitError::Session(Box::new(e)))?;
    match output {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(KitError::EmptyOutput),
    }
}
