//! Caller checks applied to resolved events

use std::future::Future;

use async_trait::async_trait;
use eyre::Result;
use serde_json::Value;

use crate::event::Payload;

/// Decides whether a resolved event satisfies a wait
///
/// An `Err` is a caller failure: it ends the wait and is never read as `false`.
#[async_trait]
pub trait EventCheck: Send + Sync {
    async fn check(&self, args: &[Value]) -> Result<bool>;
}

/// Synchronous check built from a closure
pub struct FnCheck<F>(F);

#[async_trait]
impl<F> EventCheck for FnCheck<F>
where
    F: Fn(&[Value]) -> Result<bool> + Send + Sync,
{
    async fn check(&self, args: &[Value]) -> Result<bool> {
        (self.0)(args)
    }
}

/// Check built from a closure returning a future over owned arguments
pub struct AsyncCheck<F>(F);

#[async_trait]
impl<F, Fut> EventCheck for AsyncCheck<F>
where
    F: Fn(Payload) -> Fut + Send + Sync,
    Fut: Future<Output = Result<bool>> + Send,
{
    async fn check(&self, args: &[Value]) -> Result<bool> {
        (self.0)(args.to_vec()).await
    }
}

pub fn check_fn<F>(f: F) -> FnCheck<F>
where
    F: Fn(&[Value]) -> Result<bool> + Send + Sync,
{
    FnCheck(f)
}

pub fn check_async<F, Fut>(f: F) -> AsyncCheck<F>
where
    F: Fn(Payload) -> Fut + Send + Sync,
    Fut: Future<Output = Result<bool>> + Send,
{
    AsyncCheck(f)
}
