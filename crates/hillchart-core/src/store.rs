//! The single owner of the live chart state.
//!
//! Every mutation goes through [`Store`], which
//! 1. updates the in-memory [`ChartState`],
//! 2. persists a fresh token into its [`Location`] (immediately, or after a quiet window for
//!    continuous edits such as drags and typing),
//! 3. notifies subscribers with the post-mutation state.
//!
//! The store is single-threaded. Debounced persistence is cooperative: the host calls
//! [`Store::poll`] from its event loop (use [`Store::next_deadline`] to schedule the wake-up).

use crate::clock::{Clock, SystemClock};
use crate::codec;
use crate::debounce::Debouncer;
use crate::location::Location;
use crate::model::{ChartPatch, ChartState, DEFAULT_SCOPE_NAME, Scope, ScopePatch, clamp_position};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
const SCOPE_ID_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    /// Quiet window for debounced persistence.
    pub debounce: Duration,
    /// Name given to scopes added with blank text.
    pub default_scope_name: String,
    /// Position used when `add_scope` is called without one.
    pub default_position: f64,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            default_scope_name: DEFAULT_SCOPE_NAME.to_string(),
            default_position: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Persist {
    Immediate,
    Debounced,
}

struct Subscriber {
    active: Rc<Cell<bool>>,
    callback: Box<dyn FnMut(&ChartState)>,
}

/// Handle returned by [`Store::subscribe`].
///
/// Dropping the handle does not unsubscribe; call [`Subscription::unsubscribe`].
#[derive(Debug, Clone)]
pub struct Subscription {
    active: Rc<Cell<bool>>,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        self.active.set(false);
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

pub struct Store<L: Location, C: Clock = SystemClock> {
    state: ChartState,
    location: L,
    clock: C,
    options: StoreOptions,
    debouncer: Debouncer,
    subscribers: Vec<Subscriber>,
}

impl<L: Location + std::fmt::Debug, C: Clock> std::fmt::Debug for Store<L, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("location", &self.location)
            .field("options", &self.options)
            .field("debouncer", &self.debouncer)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl<L: Location> Store<L, SystemClock> {
    /// Store with the wall clock and default options.
    pub fn new(location: L) -> Self {
        Self::init(location, SystemClock, StoreOptions::default())
    }
}

impl<L: Location, C: Clock> Store<L, C> {
    /// Builds the store from whatever the location's fragment currently holds.
    ///
    /// Missing, empty or unreadable fragments yield the default chart; unreadable ones are
    /// logged and otherwise ignored.
    pub fn init(location: L, clock: C, options: StoreOptions) -> Self {
        let state = load_from(&location).unwrap_or_default();
        let debouncer = Debouncer::new(options.debounce);
        Self {
            state,
            location,
            clock,
            options,
            debouncer,
            subscribers: Vec::new(),
        }
    }

    /// Re-derives state after the location changed externally (back/forward, pasted link).
    ///
    /// Adopts the decoded state and notifies subscribers only when it differs from the current
    /// state at token precision. Returns whether the state changed.
    pub fn handle_navigation(&mut self) -> bool {
        let Some(state) = load_from(&self.location) else {
            return false;
        };
        if codec::encode(&state) == codec::encode(&self.state) {
            return false;
        }
        // A pending write would overwrite the location the user just navigated to.
        self.debouncer.cancel();
        tracing::debug!(scopes = state.scopes.len(), "adopted chart state from navigation");
        self.state = state;
        self.notify();
        true
    }

    /// Snapshot of the current state.
    pub fn get(&self) -> ChartState {
        self.state.clone()
    }

    pub fn state(&self) -> &ChartState {
        &self.state
    }

    pub fn update(&mut self, patch: ChartPatch) {
        if let Some(title) = patch.title {
            self.state.title = title;
        }
        self.persist(Persist::Debounced);
        self.notify();
    }

    /// Appends a new scope and persists right away.
    ///
    /// Blank names fall back to [`StoreOptions::default_scope_name`]; a missing or non-finite
    /// position falls back to [`StoreOptions::default_position`].
    pub fn add_scope(&mut self, name: &str, position: Option<f64>) -> Scope {
        let name = match name.trim() {
            "" => self.options.default_scope_name.clone(),
            trimmed => trimmed.to_string(),
        };
        let position = position
            .and_then(clamp_position)
            .or_else(|| clamp_position(self.options.default_position))
            .unwrap_or(0.0);
        let scope = Scope {
            id: self.fresh_scope_id(),
            name,
            position,
        };
        self.state.scopes.push(scope.clone());
        self.persist(Persist::Immediate);
        self.notify();
        scope
    }

    /// Applies `patch` to the scope with `id`. Unknown ids leave the state untouched.
    ///
    /// Returns whether a scope matched.
    pub fn update_scope(&mut self, id: &str, patch: ScopePatch) -> bool {
        let found = match self.state.scope_mut(id) {
            Some(scope) => {
                patch.apply(scope);
                true
            }
            None => false,
        };
        self.persist(Persist::Debounced);
        self.notify();
        found
    }

    /// Removes the scope with `id`; removing an unknown id is a no-op.
    ///
    /// Returns whether a scope was removed.
    pub fn remove_scope(&mut self, id: &str) -> bool {
        let before = self.state.scopes.len();
        self.state.scopes.retain(|s| s.id != id);
        let removed = self.state.scopes.len() != before;
        self.persist(Persist::Immediate);
        self.notify();
        removed
    }

    pub fn get_scope(&self, id: &str) -> Option<Scope> {
        self.state.scope(id).cloned()
    }

    /// Registers `callback` to run after every mutation with the new state.
    pub fn subscribe(&mut self, callback: impl FnMut(&ChartState) + 'static) -> Subscription {
        let active = Rc::new(Cell::new(true));
        self.subscribers.push(Subscriber {
            active: Rc::clone(&active),
            callback: Box::new(callback),
        });
        Subscription { active }
    }

    /// Persists immediately and returns the full location, fragment included.
    pub fn shareable_url(&mut self) -> String {
        self.persist(Persist::Immediate);
        self.location.href()
    }

    /// Runs the pending debounced persist if its quiet window has elapsed.
    pub fn poll(&mut self) -> bool {
        if self.debouncer.take_due(self.clock.now()) {
            self.write_location();
            return true;
        }
        false
    }

    /// Runs the pending debounced persist now, if there is one.
    pub fn flush(&mut self) -> bool {
        if self.debouncer.cancel() {
            self.write_location();
            return true;
        }
        false
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn has_pending_persist(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Flushes any pending persist, drops all subscribers and hands the location back.
    pub fn shutdown(mut self) -> L {
        self.flush();
        self.subscribers.clear();
        self.location
    }

    fn persist(&mut self, mode: Persist) {
        match mode {
            Persist::Immediate => {
                self.debouncer.cancel();
                self.write_location();
            }
            Persist::Debounced => self.debouncer.schedule(self.clock.now()),
        }
    }

    fn write_location(&mut self) {
        let token = codec::encode(&self.state);
        tracing::debug!(len = token.len(), "persisting chart token");
        self.location.replace_fragment(&token);
    }

    fn notify(&mut self) {
        self.subscribers.retain(|s| s.active.get());
        for subscriber in &mut self.subscribers {
            // A callback may unsubscribe a later subscriber through a cloned handle.
            if subscriber.active.get() {
                (subscriber.callback)(&self.state);
            }
        }
    }

    fn fresh_scope_id(&self) -> String {
        loop {
            let id = short_id();
            if !self.state.contains_scope(&id) {
                return id;
            }
        }
    }
}

fn load_from(location: &impl Location) -> Option<ChartState> {
    let fragment = location.fragment()?;
    match codec::decode(&fragment) {
        Ok(state) => Some(state),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable chart token in location");
            None
        }
    }
}

/// Six lowercase base-36 characters drawn from a random UUID.
fn short_id() -> String {
    const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut n = uuid::Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(SCOPE_ID_LEN);
    for _ in 0..SCOPE_ID_LEN {
        out.push(char::from(ALPHABET[(n % 36) as usize]));
        n /= 36;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_ids_are_six_lowercase_alphanumerics() {
        for _ in 0..64 {
            let id = short_id();
            assert_eq!(id.len(), SCOPE_ID_LEN);
            assert!(
                id.chars()
                    .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()),
                "unexpected id {id:?}"
            );
        }
    }
}
