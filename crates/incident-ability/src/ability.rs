//! # Ability
//!
//! An ability is an ordered list of rules answering "can this account
//! perform this action on this resource (instance, fields)?".
//!
//! Resolution walks the relevant rules from the most recently declared to
//! the first; the first rule whose conditions and fields match decides.
//! A later `Deny` therefore overrides an earlier `Allow` for the same
//! action, type and condition, and no matching rule means deny.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::actions::Action;
use crate::resources::ResourceType;
use crate::rules::{Effect, Rule};

/// Evaluated rule set for one account.
///
/// # Example
///
/// ```
/// use incident_ability::{Ability, AbilityBuilder, Action, ResourceType};
/// use serde_json::json;
///
/// let mut builder = AbilityBuilder::new();
/// builder.can(Action::Read, ResourceType::Incident);
/// builder
///     .cannot(Action::Read, ResourceType::Incident)
///     .when(json!({ "hidden": true }));
/// let ability = builder.build();
///
/// assert!(ability.can(Action::Read, ResourceType::Incident));
/// assert!(ability.can_on(Action::Read, ResourceType::Incident, &json!({ "hidden": false }), &[]));
/// assert!(!ability.can_on(Action::Read, ResourceType::Incident, &json!({ "hidden": true }), &[]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    rules: Vec<Rule>,
}

impl Ability {
    /// Create an ability from rules in declaration order.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// An ability without rules; every check denies.
    pub fn empty() -> Self {
        Self::default()
    }

    /// All rules in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Check if the ability has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules declared for this action and resource type, most recent first.
    pub fn rules_for(&self, action: Action, resource: ResourceType) -> impl Iterator<Item = &Rule> {
        self.rules
            .iter()
            .rev()
            .filter(move |rule| rule.is_relevant(action, resource))
    }

    /// The rule that decides a check, if any matches.
    ///
    /// # Arguments
    ///
    /// * `action` - The concrete action being attempted
    /// * `resource` - The resource type
    /// * `instance` - Instance attributes, `None` for a type-level check
    /// * `fields` - Fields the caller wants to change (may be empty)
    pub fn deciding_rule(
        &self,
        action: Action,
        resource: ResourceType,
        instance: Option<&Value>,
        fields: &[&str],
    ) -> Option<&Rule> {
        self.rules_for(action, resource)
            .find(|rule| rule.matches_conditions(instance) && rule.matches_fields(fields))
    }

    fn decide(
        &self,
        action: Action,
        resource: ResourceType,
        instance: Option<&Value>,
        fields: &[&str],
    ) -> bool {
        let allowed = self
            .deciding_rule(action, resource, instance, fields)
            .map_or(false, |rule| rule.effect == Effect::Allow);

        tracing::trace!(
            action = %action,
            resource = %resource,
            instance = instance.is_some(),
            fields = ?fields,
            allowed,
            "Ability check"
        );

        allowed
    }

    /// Type-level check: may the action be performed on some instance?
    pub fn can(&self, action: Action, resource: ResourceType) -> bool {
        self.decide(action, resource, None, &[])
    }

    /// Instance-level check with an optional list of fields to change.
    ///
    /// The request is granted only if one granting rule covers the
    /// instance and every requested field, and no later refusing rule
    /// matches first. There are no partial grants.
    pub fn can_on(&self, action: Action, resource: ResourceType, instance: &Value, fields: &[&str]) -> bool {
        self.decide(action, resource, Some(instance), fields)
    }

    /// Negation of [`Ability::can`].
    pub fn cannot(&self, action: Action, resource: ResourceType) -> bool {
        !self.can(action, resource)
    }

    /// Negation of [`Ability::can_on`].
    pub fn cannot_on(&self, action: Action, resource: ResourceType, instance: &Value, fields: &[&str]) -> bool {
        !self.can_on(action, resource, instance, fields)
    }
}

/// Builder collecting rules in declaration order.
#[derive(Debug, Default)]
pub struct AbilityBuilder {
    rules: Vec<Rule>,
}

/// Handle to the rule just declared, for narrowing it.
#[derive(Debug)]
pub struct RuleHandle<'a> {
    rule: &'a mut Rule,
}

impl RuleHandle<'_> {
    /// Restrict the rule to the given fields.
    pub fn fields<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict the rule to instances matching `conditions`.
    pub fn when(self, conditions: Value) -> Self {
        self.rule.conditions = Some(conditions);
        self
    }
}

impl AbilityBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a granting rule.
    pub fn can(&mut self, action: Action, resource: ResourceType) -> RuleHandle<'_> {
        self.push(Rule::allow(action, resource))
    }

    /// Declare a refusing rule.
    pub fn cannot(&mut self, action: Action, resource: ResourceType) -> RuleHandle<'_> {
        self.push(Rule::deny(action, resource))
    }

    /// Append a prepared rule.
    pub fn push(&mut self, rule: Rule) -> RuleHandle<'_> {
        self.rules.push(rule);
        let last = self.rules.len() - 1;
        RuleHandle {
            rule: &mut self.rules[last],
        }
    }

    /// Finish the ability.
    pub fn build(self) -> Ability {
        Ability::new(self.rules)
    }
}
