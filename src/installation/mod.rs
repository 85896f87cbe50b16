//! Resolver sets for concrete installations.
//!
//! Each installation module exposes a `resolvers()` function returning the
//! registry for its states table.

pub mod retrieval;

use crate::core::ResolverRegistry;

/// Names accepted by [`by_name`].
pub const INSTALLATIONS: &[&str] = &["retrieval"];

/// Look up an installation's resolvers by name.
pub fn by_name(name: &str) -> Option<ResolverRegistry> {
    match name {
        "retrieval" => Some(retrieval::resolvers()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_installation_resolves() {
        for name in INSTALLATIONS {
            assert!(by_name(name).is_some(), "missing installation {name}");
        }
    }

    #[test]
    fn unknown_installation_is_none() {
        assert!(by_name("gallery").is_none());
    }
}
