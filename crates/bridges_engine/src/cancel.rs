use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::{ServiceError, TaskOutcome};

/// A cancelable unit of work with two teardown strengths.
///
/// The scope token lives as long as the group and is what long-lived
/// observers watch. Producers get tokens from the children set, which
/// `cancel_children` replaces without touching the scope. `cancel` ends the
/// scope, every child, and any later use of the group.
#[derive(Debug)]
pub struct CancellationGroup {
    scope: CancellationToken,
    children: CancellationToken,
}

impl CancellationGroup {
    pub fn new() -> Self {
        Self::with_scope(CancellationToken::new())
    }

    fn with_scope(scope: CancellationToken) -> Self {
        let children = scope.child_token();
        Self { scope, children }
    }

    /// A nested group that is cancelled together with this one.
    pub fn child_group(&self) -> Self {
        Self::with_scope(self.scope.child_token())
    }

    pub fn scope_token(&self) -> CancellationToken {
        self.scope.clone()
    }

    /// Token for one producer task.
    pub fn child_token(&self) -> CancellationToken {
        self.children.child_token()
    }

    /// Stops the running producers; the group stays usable.
    pub fn cancel_children(&mut self) {
        self.children.cancel();
        self.children = self.scope.child_token();
    }

    pub fn cancel(&self) {
        self.scope.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.scope.is_cancelled()
    }
}

impl Default for CancellationGroup {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives `work` until it finishes or `token` is cancelled.
pub(crate) async fn guarded<T, F>(token: &CancellationToken, work: F) -> TaskOutcome<T>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => TaskOutcome::Cancelled,
        result = work => TaskOutcome::from_result(result),
    }
}
