//! Caller-supplied verify step: maps a validated principal to an
//! application user, or declines it.
use std::marker::PhantomData;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::debug;

use crate::services::cas::principal::Principal;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Decision of the verify step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict<U> {
    Accept { user: U, info: Option<String> },
    Reject { info: Option<String> },
}

impl<U> Verdict<U> {
    /// `done(err, user, info)` style: no user means reject.
    pub fn from_user(user: Option<U>, info: Option<String>) -> Self {
        match user {
            Some(user) => Verdict::Accept { user, info },
            None => Verdict::Reject { info },
        }
    }
}

#[async_trait]
pub trait Verify: Send + Sync {
    type User: Send;

    /// An `Err` ends the attempt as an error; it is never downgraded to a failure.
    async fn verify(&self, principal: Principal) -> Result<Verdict<Self::User>, BoxError>;
}

/// Completion handle handed to callback-style verify functions.
///
/// Every method consumes the handle, so it completes at most once. Dropping it
/// without completing ends the attempt as an error.
#[derive(Debug)]
pub struct Done<U> {
    tx: oneshot::Sender<Result<Verdict<U>, BoxError>>,
}

impl<U> Done<U> {
    pub fn success(self, user: U, info: Option<String>) {
        self.complete(Ok(Verdict::Accept { user, info }));
    }

    pub fn fail(self, info: Option<String>) {
        self.complete(Ok(Verdict::Reject { info }));
    }

    pub fn error(self, cause: impl Into<BoxError>) {
        self.complete(Err(cause.into()));
    }

    pub fn complete(self, result: Result<Verdict<U>, BoxError>) {
        if self.tx.send(result).is_err() {
            // The attempt was dropped (client went away) before verify finished.
            debug!("verify completed after the authentication attempt was abandoned");
        }
    }
}

/// Adapter for `(principal, done)` callbacks. The callback may complete
/// synchronously or move `done` into a spawned task.
pub struct VerifyFn<F, U> {
    f: F,
    _user: PhantomData<fn() -> U>,
}

pub fn verify_fn<U, F>(f: F) -> VerifyFn<F, U>
where
    F: Fn(Principal, Done<U>) + Send + Sync,
{
    VerifyFn {
        f,
        _user: PhantomData,
    }
}

#[async_trait]
impl<U, F> Verify for VerifyFn<F, U>
where
    U: Send + 'static,
    F: Fn(Principal, Done<U>) + Send + Sync,
{
    type User = U;

    async fn verify(&self, principal: Principal) -> Result<Verdict<U>, BoxError> {
        let (tx, rx) = oneshot::channel();
        (self.f)(principal, Done { tx });

        rx.await
            .map_err(|_| BoxError::from("verify step dropped its completion without calling it"))?
    }
}
