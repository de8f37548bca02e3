//! Typed state machines
//!
//! A flat state machine over caller-defined state and event enums:
//! - Transition table lookup
//! - Entry callbacks
//! - Transition history
//!
//! Playback uses this for `Idle`/`Playing`/`Paused`/`Completed`.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt::Debug;
use std::hash::Hash;

/// An action executed when a state is entered
pub type Action = Box<dyn FnMut() + Send>;

/// A transition in the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition<S, E> {
    pub from: S,
    pub event: E,
    pub to: S,
}

impl<S, E> Transition<S, E> {
    pub fn new(from: S, event: E, to: S) -> Self {
        Self { from, event, to }
    }
}

/// Builder for creating state machines
pub struct StateMachineBuilder<S, E> {
    initial: S,
    transitions: Vec<Transition<S, E>>,
    entry_callbacks: FxHashMap<S, SmallVec<[Action; 1]>>,
}

impl<S, E> StateMachineBuilder<S, E>
where
    S: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Debug,
{
    pub fn new(initial: S) -> Self {
        Self {
            initial,
            transitions: Vec::new(),
            entry_callbacks: FxHashMap::default(),
        }
    }

    /// Add a transition (from, event, to)
    pub fn on(mut self, from: S, event: E, to: S) -> Self {
        self.transitions.push(Transition::new(from, event, to));
        self
    }

    /// Add the same event transition from several states
    pub fn on_any(mut self, from: &[S], event: E, to: S) -> Self {
        self.transitions
            .extend(from.iter().map(|&state| Transition::new(state, event, to)));
        self
    }

    /// Add an entry action for a state
    pub fn on_enter<F: FnMut() + Send + 'static>(mut self, state: S, action: F) -> Self {
        self.entry_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(action));
        self
    }

    pub fn build(self) -> StateMachine<S, E> {
        StateMachine {
            current: self.initial,
            transitions: self.transitions,
            entry_callbacks: self.entry_callbacks,
            history: Vec::new(),
        }
    }
}

/// A state machine instance
pub struct StateMachine<S, E> {
    current: S,
    transitions: Vec<Transition<S, E>>,
    entry_callbacks: FxHashMap<S, SmallVec<[Action; 1]>>,
    history: Vec<Transition<S, E>>,
}

impl<S, E> StateMachine<S, E>
where
    S: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Debug,
{
    pub fn builder(initial: S) -> StateMachineBuilder<S, E> {
        StateMachineBuilder::new(initial)
    }

    pub fn current_state(&self) -> S {
        self.current
    }

    pub fn is_in(&self, state: S) -> bool {
        self.current == state
    }

    /// Transitions taken so far
    pub fn history(&self) -> &[Transition<S, E>] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Check if an event can trigger a transition from the current state
    pub fn can_send(&self, event: E) -> bool {
        self.find(event).is_some()
    }

    /// Send an event; returns the new state if a transition fired
    pub fn send(&mut self, event: E) -> Option<S> {
        let from = self.current;
        let Some(to) = self.find(event) else {
            tracing::trace!(?from, ?event, "event ignored");
            return None;
        };

        self.current = to;
        self.history.push(Transition::new(from, event, to));
        tracing::debug!(?from, ?event, ?to, "state transition");

        if let Some(callbacks) = self.entry_callbacks.get_mut(&to) {
            for callback in callbacks.iter_mut() {
                callback();
            }
        }

        Some(to)
    }

    /// Register an entry callback for a state
    pub fn on_enter<F: FnMut() + Send + 'static>(&mut self, state: S, callback: F) {
        self.entry_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(callback));
    }

    fn find(&self, event: E) -> Option<S> {
        self.transitions
            .iter()
            .find(|t| t.from == self.current && t.event == event)
            .map(|t| t.to)
    }
}

impl<S: Debug, E: Debug> Debug for StateMachine<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("transitions", &self.transitions.len())
            .field("history", &self.history.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Door {
        Closed,
        Open,
        Locked,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Push {
        Open,
        Close,
        Lock,
        Unlock,
    }

    fn door() -> StateMachineBuilder<Door, Push> {
        StateMachine::builder(Door::Closed)
            .on(Door::Closed, Push::Open, Door::Open)
            .on(Door::Open, Push::Close, Door::Closed)
            .on(Door::Closed, Push::Lock, Door::Locked)
            .on(Door::Locked, Push::Unlock, Door::Closed)
    }

    #[test]
    fn test_simple_transitions() {
        let mut fsm = door().build();
        assert_eq!(fsm.current_state(), Door::Closed);

        assert_eq!(fsm.send(Push::Open), Some(Door::Open));
        assert_eq!(fsm.send(Push::Close), Some(Door::Closed));
        assert_eq!(fsm.send(Push::Lock), Some(Door::Locked));
        assert!(fsm.is_in(Door::Locked));
    }

    #[test]
    fn test_invalid_event_no_transition() {
        let mut fsm = door().build();
        fsm.send(Push::Lock);

        assert_eq!(fsm.send(Push::Open), None);
        assert_eq!(fsm.current_state(), Door::Locked);
        assert!(!fsm.can_send(Push::Open));
        assert!(fsm.can_send(Push::Unlock));
    }

    #[test]
    fn test_on_any() {
        let mut fsm = StateMachine::builder(Door::Open)
            .on_any(&[Door::Open, Door::Closed], Push::Lock, Door::Locked)
            .build();

        assert_eq!(fsm.send(Push::Lock), Some(Door::Locked));
        assert_eq!(fsm.send(Push::Lock), None);
    }

    #[test]
    fn test_entry_callbacks() {
        let entered = Arc::new(Mutex::new(0));
        let entered_clone = entered.clone();

        let mut fsm = door()
            .on_enter(Door::Open, move || {
                *entered_clone.lock().unwrap() += 1;
            })
            .build();

        fsm.send(Push::Open);
        fsm.send(Push::Close);
        fsm.send(Push::Open);
        assert_eq!(*entered.lock().unwrap(), 2);

        // Ignored events never fire callbacks
        fsm.send(Push::Open);
        assert_eq!(*entered.lock().unwrap(), 2);
    }

    #[test]
    fn test_history() {
        let mut fsm = door().build();
        fsm.send(Push::Open);
        fsm.send(Push::Close);

        assert_eq!(
            fsm.history(),
            &[
                Transition::new(Door::Closed, Push::Open, Door::Open),
                Transition::new(Door::Open, Push::Close, Door::Closed),
            ]
        );

        fsm.clear_history();
        assert!(fsm.history().is_empty());
    }
}
