//! Conditions on call arguments that decide whether a wrapped call cites.
//!
//! A condition names an argument by position and by name, and lists the
//! values that trigger the citation. The [`Trigger::Default`] value (written
//! `"DC_DEFAULT"`) matches a call that does not supply the argument at all.
//! All conditions must hold.
//!
//! ```rust
//! use duecite::collector::Conditions;
//! use duecite::runtime::CallArgs;
//! use serde_json::json;
//!
//! let conditions = Conditions::new().on(1, "method", ["purge", "DC_DEFAULT"]);
//!
//! assert!(conditions.matches(&CallArgs::positional([json!("data")])));
//! assert!(conditions.matches(&CallArgs::new().kwarg("method", json!("purge"))));
//! assert!(!conditions.matches(&CallArgs::new().kwarg("method", json!("push"))));
//! ```
//!
//! A name with dots, such as `"self.method"`, looks the argument up by its
//! first segment and then reads the remaining segments as nested fields of
//! the argument's value.

use crate::constants::DC_DEFAULT;
use crate::runtime::CallArgs;
use serde_json::Value;
use tracing::debug;

/// A value that makes a condition hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// The argument was not supplied
    Default,
    /// The argument equals this value
    Value(Value),
}

impl Trigger {
    /// Parse a string trigger; `"DC_DEFAULT"` is [`Trigger::Default`].
    pub fn parse(value: &str) -> Self {
        if value == DC_DEFAULT {
            Self::Default
        } else {
            Self::Value(Value::String(value.to_string()))
        }
    }
}

impl From<&str> for Trigger {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<Value> for Trigger {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Condition {
    position: usize,
    name: String,
    triggers: Vec<Trigger>,
}

impl Condition {
    fn matches(&self, args: &CallArgs) -> bool {
        let mut segments = self.name.split('.');
        let arg_name = segments.next().unwrap_or_default();

        let Some(mut value) = args.lookup(Some(self.position), Some(arg_name)) else {
            return self.triggers.contains(&Trigger::Default);
        };

        for attribute in segments {
            match value.get(attribute) {
                Some(inner) => value = inner,
                None => {
                    debug!("Argument {} has no attribute {}; condition does not hold", arg_name, attribute);
                    return false;
                }
            }
        }

        self.triggers.iter().any(|trigger| matches!(trigger, Trigger::Value(v) if v == value))
    }
}

/// Conjunction of argument conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    conditions: Vec<Condition>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition on the argument at `position` or named `name`.
    #[must_use]
    pub fn on<I, T>(mut self, position: usize, name: &str, triggers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Trigger>,
    {
        self.conditions.push(Condition {
            position,
            name: name.to_string(),
            triggers: triggers.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether every condition holds for `args`.
    pub fn matches(&self, args: &CallArgs) -> bool {
        self.conditions.iter().all(|condition| condition.matches(args))
    }
}
