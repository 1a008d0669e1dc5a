// TypeCheck Checker Implementation
//
// A minimal host checker: reports reads of component members that the
// component does not declare.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use super::super::api::{HostDiagnostic, HostTypeChecker};

/// `Property 'x' does not exist on type 'Y'.`
pub const PROPERTY_DOES_NOT_EXIST: i32 = 2339;

static MEMBER_READ: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(this\)\.([A-Za-z_$][\w$]*)").expect("member read pattern is valid"));

/// Knows the declared members of each component class.
#[derive(Debug, Clone, Default)]
pub struct MemberChecker {
    members: HashMap<String, HashSet<String>>,
}

impl MemberChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component<I, S>(mut self, component: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members.insert(component.into(), members.into_iter().map(Into::into).collect());
        self
    }
}

impl HostTypeChecker for MemberChecker {
    fn check(&self, component: &str, tcb_source: &str) -> Vec<HostDiagnostic> {
        let Some(members) = self.members.get(component) else {
            return Vec::new();
        };
        MEMBER_READ
            .captures_iter(tcb_source)
            .filter_map(|caps| caps.get(1))
            .filter(|name| !members.contains(name.as_str()))
            .map(|name| {
                HostDiagnostic::new(
                    name.start(),
                    name.len(),
                    PROPERTY_DOES_NOT_EXIST,
                    format!("Property '{}' does not exist on type '{}'.", name.as_str(), component),
                )
            })
            .collect()
    }
}
