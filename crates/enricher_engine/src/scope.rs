use tokio_util::sync::CancellationToken;

/// Liveness of the context that owns a pipeline.
///
/// Clones observe the same scope. Work started inside the scope gets a child
/// token, so ending the scope cancels it synchronously.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    token: CancellationToken,
}

impl Scope {
    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// End the scope. Safe to call any number of times.
    pub fn teardown(&self) {
        self.token.cancel();
    }

    /// Resolves once the scope has ended.
    pub async fn ended(&self) {
        self.token.cancelled().await;
    }

    pub(crate) fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }
}

/// Owns a [`Scope`] and ends it when dropped.
#[derive(Debug)]
pub struct ScopeGuard {
    scope: Scope,
}

impl ScopeGuard {
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn is_live(&self) -> bool {
        self.scope.is_live()
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.scope.teardown();
    }
}

pub fn bind_scope() -> ScopeGuard {
    ScopeGuard {
        scope: Scope::default(),
    }
}
