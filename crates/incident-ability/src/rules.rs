//! # Rules
//!
//! A rule grants (`Allow`) or refuses (`Deny`) an action on a resource
//! type, optionally narrowed to a list of fields and to instances whose
//! attributes match a set of conditions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::actions::Action;
use crate::resources::ResourceType;

/// Whether a rule grants or refuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// The rule grants the action.
    Allow,
    /// The rule refuses the action.
    Deny,
}

/// A single declarative ability rule.
///
/// Conditions are a JSON object matched field by field against the
/// instance being checked; nested objects are matched recursively and
/// leaves are compared for equality. There is no operator language.
///
/// # Example
///
/// ```
/// use incident_ability::{Action, ResourceType, Rule};
/// use serde_json::json;
///
/// let rule = Rule::allow(Action::Update, ResourceType::Incident)
///     .with_conditions(json!({ "resolved": false }));
///
/// assert!(rule.matches_conditions(Some(&json!({ "id": 4, "resolved": false }))));
/// assert!(!rule.matches_conditions(Some(&json!({ "id": 4, "resolved": true }))));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Grant or refuse.
    pub effect: Effect,
    /// The action this rule is declared for (`Manage` covers all).
    pub action: Action,
    /// The resource type this rule is declared for (`All` covers all).
    pub resource: ResourceType,
    /// Fields the rule is restricted to. `None` means every field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Attribute match against the instance. `None` means every instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Value>,
}

impl Rule {
    /// Create an unrestricted rule.
    pub fn new(effect: Effect, action: Action, resource: ResourceType) -> Self {
        Self {
            effect,
            action,
            resource,
            fields: None,
            conditions: None,
        }
    }

    /// Create a granting rule.
    pub fn allow(action: Action, resource: ResourceType) -> Self {
        Self::new(Effect::Allow, action, resource)
    }

    /// Create a refusing rule.
    pub fn deny(action: Action, resource: ResourceType) -> Self {
        Self::new(Effect::Deny, action, resource)
    }

    /// Restrict the rule to the given fields.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict the rule to instances matching `conditions`.
    pub fn with_conditions(mut self, conditions: Value) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Check if this is a refusing rule.
    pub fn is_inverted(&self) -> bool {
        self.effect == Effect::Deny
    }

    /// Check if the rule is declared for this action and resource type.
    pub fn is_relevant(&self, action: Action, resource: ResourceType) -> bool {
        self.action.covers(action) && self.resource.covers(resource)
    }

    /// Check the rule's conditions against an instance.
    ///
    /// Without an instance (a type-level check), a conditional granting
    /// rule matches (some instance might qualify) and a conditional
    /// refusing rule does not (not every instance is refused).
    ///
    /// # Arguments
    ///
    /// * `instance` - The instance attributes, or `None` for a type-level check
    pub fn matches_conditions(&self, instance: Option<&Value>) -> bool {
        let Some(conditions) = &self.conditions else {
            return true;
        };
        match instance {
            None => !self.is_inverted(),
            Some(instance) => condition_matches(conditions, instance),
        }
    }

    /// Check the rule's field restriction against the requested fields.
    ///
    /// A granting rule matches when every requested field is in its list.
    /// A refusing rule matches when any requested field is in its list.
    /// With no requested fields, field-restricted granting rules match and
    /// field-restricted refusing rules do not.
    ///
    /// # Arguments
    ///
    /// * `requested` - Fields the caller wants to change
    pub fn matches_fields(&self, requested: &[&str]) -> bool {
        let Some(fields) = &self.fields else {
            return true;
        };
        if requested.is_empty() {
            return !self.is_inverted();
        }
        let listed = |field: &&str| fields.iter().any(|f| f == field);
        if self.is_inverted() {
            requested.iter().any(listed)
        } else {
            requested.iter().all(listed)
        }
    }
}

/// Recursive field-by-field equality of `expected` against `actual`.
///
/// Every key of an expected object must be present in the actual object
/// with a matching value; extra keys in `actual` are ignored.
pub(crate) fn condition_matches(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => expected.iter().all(|(key, value)| {
            actual
                .get(key)
                .map_or(false, |found| condition_matches(value, found))
        }),
        (Value::Object(_), _) => false,
        _ => expected == actual,
    }
}
