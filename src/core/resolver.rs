//! Per-state transition resolvers.
//!
//! A resolver decides, from one observed condition change, whether the
//! active state should hand over to another state. Resolvers are looked up
//! by state name every time they are needed, so they can be registered,
//! replaced or removed while the machine runs. A state without a resolver
//! simply never transitions on its own.

use super::conditions::ConditionMap;
use super::history::ConditionChange;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What a resolver is asked to react to.
#[derive(Clone, Debug, PartialEq)]
pub enum Trigger {
    /// The state has just been entered.
    Entered,
    /// A condition slot changed since the state's previous observation.
    Changed(ConditionChange),
    /// An event arrived but no observed slot changed.
    Unchanged,
}

impl Trigger {
    pub fn change(&self) -> Option<&ConditionChange> {
        match self {
            Trigger::Changed(change) => Some(change),
            _ => None,
        }
    }

    /// Change on `channel` with a non-zero value, the common gate for
    /// "something was switched on".
    pub fn activated(&self, channel: &str) -> Option<&ConditionChange> {
        self.change()
            .filter(|change| change.channel == channel && change.value != 0.0)
    }
}

impl From<Option<ConditionChange>> for Trigger {
    fn from(change: Option<ConditionChange>) -> Self {
        change.map_or(Trigger::Unchanged, Trigger::Changed)
    }
}

/// Decides the next state from an observed change.
///
/// Implementations must be pure and bounded: no blocking, no I/O. Returning
/// `None` means "stay". Returning a name that is not registered is reported
/// by the machine as an unknown state.
///
/// Any `Fn(&Trigger, &ConditionMap) -> Option<String>` closure is a resolver.
///
/// # Example
///
/// ```rust
/// use showstate::core::{ConditionMap, Trigger, TransitionResolver};
///
/// let resolver = |trigger: &Trigger, _: &ConditionMap| {
///     trigger.activated("/video").map(|_| "fin".to_string())
/// };
///
/// assert_eq!(resolver.resolve(&Trigger::Entered, &ConditionMap::new()), None);
/// ```
pub trait TransitionResolver: Send + Sync {
    fn resolve(&self, trigger: &Trigger, conditions: &ConditionMap) -> Option<String>;
}

impl<F> TransitionResolver for F
where
    F: Fn(&Trigger, &ConditionMap) -> Option<String> + Send + Sync,
{
    fn resolve(&self, trigger: &Trigger, conditions: &ConditionMap) -> Option<String> {
        self(trigger, conditions)
    }
}

/// Resolvers keyed by the name of the state they belong to.
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<String, Arc<dyn TransitionResolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the resolver for `state`, returning the
    /// previous one.
    pub fn register<R>(
        &mut self,
        state: impl Into<String>,
        resolver: R,
    ) -> Option<Arc<dyn TransitionResolver>>
    where
        R: TransitionResolver + 'static,
    {
        self.resolvers.insert(state.into(), Arc::new(resolver))
    }

    /// Fluent form of [`register`](Self::register).
    pub fn with<R>(mut self, state: impl Into<String>, resolver: R) -> Self
    where
        R: TransitionResolver + 'static,
    {
        self.register(state, resolver);
        self
    }

    pub fn remove(&mut self, state: &str) -> Option<Arc<dyn TransitionResolver>> {
        self.resolvers.remove(state)
    }

    pub fn get(&self, state: &str) -> Option<&dyn TransitionResolver> {
        self.resolvers.get(state).map(|resolver| resolver.as_ref())
    }

    pub fn contains(&self, state: &str) -> bool {
        self.resolvers.contains_key(state)
    }

    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.resolvers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut states: Vec<_> = self.states().collect();
        states.sort_unstable();
        f.debug_struct("ResolverRegistry")
            .field("states", &states)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(channel: &str, index: usize, value: f64) -> Trigger {
        Trigger::Changed(ConditionChange {
            channel: channel.to_string(),
            index,
            value,
            unique: true,
        })
    }

    fn to_fin(trigger: &Trigger, _: &ConditionMap) -> Option<String> {
        trigger.activated("/video").map(|_| "fin".to_string())
    }

    #[test]
    fn missing_resolver_is_not_an_error() {
        let registry = ResolverRegistry::new();
        assert!(registry.get("idle").is_none());
        assert!(!registry.contains("idle"));
    }

    #[test]
    fn function_items_are_resolvers() {
        let registry = ResolverRegistry::new().with("exit", to_fin);
        let resolver = registry.get("exit").unwrap();

        let conditions = ConditionMap::new();
        assert_eq!(
            resolver.resolve(&change("/video", 0, 1.0), &conditions),
            Some("fin".to_string())
        );
        assert_eq!(resolver.resolve(&change("/video", 0, 0.0), &conditions), None);
        assert_eq!(resolver.resolve(&Trigger::Unchanged, &conditions), None);
    }

    #[test]
    fn register_replaces_existing_resolver() {
        let mut registry = ResolverRegistry::new();
        assert!(registry.register("idle", to_fin).is_none());

        let replaced = registry.register("idle", |_: &Trigger, _: &ConditionMap| {
            Some("retrieval1".to_string())
        });
        assert!(replaced.is_some());
        assert_eq!(registry.len(), 1);

        let resolver = registry.get("idle").unwrap();
        assert_eq!(
            resolver.resolve(&Trigger::Entered, &ConditionMap::new()),
            Some("retrieval1".to_string())
        );
    }

    #[test]
    fn remove_drops_resolver() {
        let mut registry = ResolverRegistry::new().with("exit", to_fin);
        assert!(registry.remove("exit").is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn trigger_from_latest_change() {
        assert_eq!(Trigger::from(None), Trigger::Unchanged);
        let trigger = Trigger::from(Some(ConditionChange {
            channel: "/retrieval".to_string(),
            index: 0,
            value: 1.0,
            unique: false,
        }));
        assert_eq!(trigger.change().map(|c| c.index), Some(0));
        assert!(trigger.activated("/retrieval").is_some());
        assert!(trigger.activated("/video").is_none());
    }
}
