//! Effect-based state management
//!
//! An effect-aware reducer returns both whether state changed and a list of
//! declarative side effects for the caller to run:
//!
//! ```ignore
//! fn reducer(state: &mut S, action: A) -> DispatchResult<E>
//! ```
//!
//! The notification center uses this to keep timer scheduling out of its
//! reducer: `Show` returns `ScheduleExpiry`, `Hide` returns `CancelExpiry`,
//! and the center hands those to its scheduler after the state is committed.

use std::marker::PhantomData;

use crate::action::Action;

/// Result of dispatching an action to an effect-aware store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult<E> {
    /// Whether the state was modified by this action.
    pub changed: bool,
    /// Effects to be processed after dispatch, in order.
    pub effects: Vec<E>,
}

impl<E> Default for DispatchResult<E> {
    fn default() -> Self {
        Self::unchanged()
    }
}

impl<E> DispatchResult<E> {
    /// No state change and no effects.
    #[inline]
    pub fn unchanged() -> Self {
        Self {
            changed: false,
            effects: vec![],
        }
    }

    /// State changed, no effects.
    #[inline]
    pub fn changed() -> Self {
        Self {
            changed: true,
            effects: vec![],
        }
    }

    /// State changed with a single effect.
    #[inline]
    pub fn changed_with(effect: E) -> Self {
        Self {
            changed: true,
            effects: vec![effect],
        }
    }

    /// State changed with multiple effects.
    #[inline]
    pub fn changed_with_many(effects: Vec<E>) -> Self {
        Self {
            changed: true,
            effects,
        }
    }

    /// Add an effect to this result.
    #[inline]
    pub fn with(mut self, effect: E) -> Self {
        self.effects.push(effect);
        self
    }

    /// Returns true if there are any effects to process.
    #[inline]
    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }
}

/// A reducer function that can emit effects.
pub type EffectReducer<S, A, E> = fn(&mut S, A) -> DispatchResult<E>;

/// A store whose reducer returns [`DispatchResult<E>`] instead of `bool`.
pub struct EffectStore<S, A, E> {
    state: S,
    reducer: EffectReducer<S, A, E>,
    _marker: PhantomData<(A, E)>,
}

impl<S, A, E> EffectStore<S, A, E>
where
    A: Action,
{
    /// Create a new effect store with the given initial state and reducer.
    pub fn new(state: S, reducer: EffectReducer<S, A, E>) -> Self {
        Self {
            state,
            reducer,
            _marker: PhantomData,
        }
    }

    /// Get a reference to the current state.
    #[inline]
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Dispatch an action to the store.
    #[inline]
    pub fn dispatch(&mut self, action: A) -> DispatchResult<E> {
        (self.reducer)(&mut self.state, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    enum TimerAction {
        Start(u32),
        Stop(u32),
        Fire(u32),
    }

    impl Action for TimerAction {
        fn name(&self) -> &'static str {
            match self {
                TimerAction::Start(_) => "Start",
                TimerAction::Stop(_) => "Stop",
                TimerAction::Fire(_) => "Fire",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TimerEffect {
        Arm(u32),
        Disarm(u32),
    }

    fn reducer(running: &mut Vec<u32>, action: TimerAction) -> DispatchResult<TimerEffect> {
        match action {
            TimerAction::Start(id) => {
                running.push(id);
                DispatchResult::changed_with(TimerEffect::Arm(id))
            }
            TimerAction::Stop(id) if running.contains(&id) => {
                running.retain(|r| *r != id);
                DispatchResult::changed_with(TimerEffect::Disarm(id))
            }
            TimerAction::Fire(id) if running.contains(&id) => {
                running.retain(|r| *r != id);
                DispatchResult::changed()
            }
            TimerAction::Stop(_) | TimerAction::Fire(_) => DispatchResult::unchanged(),
        }
    }

    #[test]
    fn test_dispatch_result_builders() {
        let r: DispatchResult<TimerEffect> = DispatchResult::unchanged();
        assert!(!r.changed);
        assert!(!r.has_effects());

        let r = DispatchResult::changed_with_many(vec![TimerEffect::Arm(1), TimerEffect::Arm(2)])
            .with(TimerEffect::Disarm(1));
        assert!(r.changed);
        assert_eq!(r.effects.len(), 3);
        assert_eq!(DispatchResult::<TimerEffect>::default(), DispatchResult::unchanged());
    }

    #[test]
    fn test_effect_store_emits_effects() {
        let mut store = EffectStore::new(Vec::new(), reducer);

        let result = store.dispatch(TimerAction::Start(7));
        assert_eq!(result.effects, vec![TimerEffect::Arm(7)]);

        let result = store.dispatch(TimerAction::Stop(7));
        assert!(result.changed);
        assert_eq!(result.effects, vec![TimerEffect::Disarm(7)]);
        assert!(store.state().is_empty());
    }

    #[test]
    fn test_late_fire_is_noop() {
        let mut store = EffectStore::new(Vec::new(), reducer);
        store.dispatch(TimerAction::Start(1));
        store.dispatch(TimerAction::Stop(1));

        let result = store.dispatch(TimerAction::Fire(1));
        assert!(!result.changed);
        assert!(!result.has_effects());
    }
}
