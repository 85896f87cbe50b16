//! The retrieval installation.
//!
//! A visitor picks one of two retrievals from `idle`. Inside a retrieval,
//! placing an object either completes the set (both `/video/object` slots
//! on, go to `exit`) or sends the visitor back to `idle`. Any `/video`
//! event from `exit` finishes the show.

use crate::core::{ConditionMap, ResolverRegistry, Trigger};

pub const RETRIEVAL: &str = "/retrieval";
pub const VIDEO_OBJECT: &str = "/video/object";
pub const VIDEO: &str = "/video";

/// Resolvers for `idle`, `retrieval1`, `retrieval2` and `exit`.
pub fn resolvers() -> ResolverRegistry {
    ResolverRegistry::new()
        .with("idle", idle)
        .with("retrieval1", retrieval)
        .with("retrieval2", retrieval)
        .with("exit", exit)
}

pub fn idle(trigger: &Trigger, _: &ConditionMap) -> Option<String> {
    let change = trigger.activated(RETRIEVAL)?;
    match change.index {
        0 => Some("retrieval1".to_string()),
        1 => Some("retrieval2".to_string()),
        _ => None,
    }
}

pub fn retrieval(trigger: &Trigger, conditions: &ConditionMap) -> Option<String> {
    trigger.activated(VIDEO_OBJECT)?;
    let placed = |index| conditions.value(VIDEO_OBJECT, index) == Some(1.0);
    if placed(0) && placed(1) {
        Some("exit".to_string())
    } else {
        Some("idle".to_string())
    }
}

pub fn exit(trigger: &Trigger, _: &ConditionMap) -> Option<String> {
    trigger
        .change()
        .filter(|change| change.channel == VIDEO)
        .map(|_| "fin".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConditionChange;

    fn changed(channel: &str, index: usize, value: f64) -> Trigger {
        Trigger::Changed(ConditionChange {
            channel: channel.to_string(),
            index,
            value,
            unique: true,
        })
    }

    fn conditions(objects: [f64; 2]) -> ConditionMap {
        let mut conditions = ConditionMap::new();
        conditions.declare(RETRIEVAL, 2);
        conditions.declare(VIDEO_OBJECT, 2);
        conditions.declare(VIDEO, 1);
        conditions.set(VIDEO_OBJECT, 0, objects[0]).unwrap();
        conditions.set(VIDEO_OBJECT, 1, objects[1]).unwrap();
        conditions
    }

    #[test]
    fn idle_picks_retrieval_by_slot() {
        let map = conditions([0.0, 0.0]);
        assert_eq!(idle(&changed(RETRIEVAL, 0, 1.0), &map).as_deref(), Some("retrieval1"));
        assert_eq!(idle(&changed(RETRIEVAL, 1, 1.0), &map).as_deref(), Some("retrieval2"));
    }

    #[test]
    fn idle_ignores_zero_values_and_other_channels() {
        let map = conditions([0.0, 0.0]);
        assert_eq!(idle(&changed(RETRIEVAL, 0, 0.0), &map), None);
        assert_eq!(idle(&changed(VIDEO, 0, 1.0), &map), None);
        assert_eq!(idle(&Trigger::Entered, &map), None);
    }

    #[test]
    fn retrieval_needs_both_objects_for_exit() {
        let trigger = changed(VIDEO_OBJECT, 1, 1.0);
        assert_eq!(retrieval(&trigger, &conditions([1.0, 1.0])).as_deref(), Some("exit"));
        assert_eq!(retrieval(&trigger, &conditions([0.0, 1.0])).as_deref(), Some("idle"));
    }

    #[test]
    fn retrieval_ignores_removed_objects() {
        let trigger = changed(VIDEO_OBJECT, 0, 0.0);
        assert_eq!(retrieval(&trigger, &conditions([0.0, 1.0])), None);
    }

    #[test]
    fn exit_finishes_on_any_video_event() {
        let map = conditions([1.0, 1.0]);
        assert_eq!(exit(&changed(VIDEO, 0, 0.0), &map).as_deref(), Some("fin"));
        assert_eq!(exit(&changed(RETRIEVAL, 0, 1.0), &map), None);
        assert_eq!(exit(&Trigger::Entered, &map), None);
    }

    #[test]
    fn registry_covers_every_deciding_state() {
        let registry = resolvers();
        let mut states: Vec<_> = registry.states().collect();
        states.sort_unstable();
        assert_eq!(states, vec!["exit", "idle", "retrieval1", "retrieval2"]);
    }
}
