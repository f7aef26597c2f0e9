//! [`HookRegistry`] — an ordered pipeline of [`Hook`]s, dispatched by the Orchestrator
//! at each [`HookPoint`].

use crate::hook::{Hook, HookAction, HookContext};
use std::sync::Arc;

/// Dispatches a [`HookContext`] to every registered [`Hook`] whose `points()` include
/// the context's point, in registration order.
///
/// The pipeline short-circuits on any action other than [`HookAction::Continue`] —
/// subsequent hooks are not called. Hook errors are logged and treated as `Continue`
/// (spec §7: hook failures, like tool failures, should not take down the turn by
/// themselves; only an explicit `Halt` does that).
#[derive(Default)]
pub struct HookRegistry {
    hooks: Vec<Arc<dyn Hook>>,
}

impl HookRegistry {
    /// An empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook to the end of the pipeline.
    pub fn add(&mut self, hook: Arc<dyn Hook>) {
        self.hooks.push(hook);
    }

    /// `true` if no hooks are registered — the Orchestrator may skip dispatch
    /// entirely on the hot path when this holds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Dispatch one [`HookContext`] through the pipeline, returning the first
    /// non-`Continue` action, or `Continue` if every hook at this point continued.
    pub async fn dispatch(&self, ctx: &HookContext) -> HookAction {
        for hook in &self.hooks {
            if !hook.points().contains(&ctx.point) {
                continue;
            }
            match hook.on_event(ctx).await {
                Ok(HookAction::Continue) => continue,
                Ok(action) => return action,
                Err(err) => {
                    tracing::warn!(point = ?ctx.point, chat_id = %ctx.chat_id, error = %err, "hook failed, continuing");
                    continue;
                }
            }
        }
        HookAction::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::HookPoint;
    use async_trait::async_trait;
    use chorus_core::CoreError;

    struct AlwaysContinue {
        points: Vec<HookPoint>,
    }

    #[async_trait]
    impl Hook for AlwaysContinue {
        fn points(&self) -> &[HookPoint] {
            &self.points
        }

        async fn on_event(&self, _ctx: &HookContext) -> Result<HookAction, CoreError> {
            Ok(HookAction::Continue)
        }
    }

    struct AlwaysHalt;

    #[async_trait]
    impl Hook for AlwaysHalt {
        fn points(&self) -> &[HookPoint] {
            &[HookPoint::PreToolUse]
        }

        async fn on_event(&self, _ctx: &HookContext) -> Result<HookAction, CoreError> {
            Ok(HookAction::Halt { reason: "budget exceeded".into() })
        }
    }

    struct AlwaysErrors;

    #[async_trait]
    impl Hook for AlwaysErrors {
        fn points(&self) -> &[HookPoint] {
            &[HookPoint::PreInference]
        }

        async fn on_event(&self, _ctx: &HookContext) -> Result<HookAction, CoreError> {
            Err(CoreError::Internal("boom".into()))
        }
    }

    #[tokio::test]
    async fn empty_registry_continues() {
        let registry = HookRegistry::new();
        let ctx = HookContext::new(HookPoint::PreInference, "chat-1");
        assert!(matches!(registry.dispatch(&ctx).await, HookAction::Continue));
    }

    #[tokio::test]
    async fn irrelevant_points_are_skipped() {
        let mut registry = HookRegistry::new();
        registry.add(Arc::new(AlwaysHalt));
        let ctx = HookContext::new(HookPoint::PreInference, "chat-1");
        assert!(matches!(registry.dispatch(&ctx).await, HookAction::Continue));
    }

    #[tokio::test]
    async fn halt_short_circuits_the_pipeline() {
        let mut registry = HookRegistry::new();
        registry.add(Arc::new(AlwaysContinue { points: vec![HookPoint::PreToolUse] }));
        registry.add(Arc::new(AlwaysHalt));
        let ctx = HookContext::new(HookPoint::PreToolUse, "chat-1");
        match registry.dispatch(&ctx).await {
            HookAction::Halt { reason } => assert_eq!(reason, "budget exceeded"),
            other => panic!("expected Halt, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn hook_errors_are_treated_as_continue() {
        let mut registry = HookRegistry::new();
        registry.add(Arc::new(AlwaysErrors));
        let ctx = HookContext::new(HookPoint::PreInference, "chat-1");
        assert!(matches!(registry.dispatch(&ctx).await, HookAction::Continue));
    }
}
