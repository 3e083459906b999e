//! # Role Policy
//!
//! The tracker's rule table: which rules each role receives.
//!
//! | Role | Rules |
//! |---|---|
//! | Admin | manage all |
//! | Moderator | read Incident; update Incident while unresolved; never delete Incident; never update a resolved Incident; update `banned` of a Player; read ReportReason |
//! | Player | create / read own Incident; update `details`, `reportReasonId` of own unresolved Incident; never delete Incident; read own User; read ReportReason |
//! | anything else | no rules |
//!
//! A banned account additionally cannot create incidents.

use incident_model::{Role, User};
use serde_json::json;

use crate::ability::{Ability, AbilityBuilder};
use crate::actions::Action;
use crate::resources::ResourceType;

/// Fields a player may change on their own incident.
pub const PLAYER_INCIDENT_FIELDS: [&str; 2] = ["details", "reportReasonId"];

/// Fields a moderator may change on a player's account.
pub const MODERATOR_USER_FIELDS: [&str; 1] = ["banned"];

/// Build the ability of an account.
///
/// # Example
///
/// ```
/// use incident_ability::{define_ability, Action, ResourceType};
/// use incident_model::{Role, User};
/// use serde_json::json;
///
/// let moderator = User::new(3, "bob.moderator@test.com", "Bob Moderator", Role::Moderator);
/// let ability = define_ability(&moderator);
///
/// assert!(ability.can_on(Action::Update, ResourceType::Incident, &json!({ "resolved": false }), &[]));
/// assert!(!ability.can_on(Action::Update, ResourceType::Incident, &json!({ "resolved": true }), &[]));
/// ```
pub fn define_ability(user: &User) -> Ability {
    define_ability_for(Some(user.role), user.id, user.banned)
}

/// Build the ability for a role, account ID and ban status.
///
/// `None` stands for a role value the tracker does not know; such an
/// account gets no rules and every check denies.
pub fn define_ability_for(role: Option<Role>, user_id: i64, banned: bool) -> Ability {
    let mut builder = AbilityBuilder::new();

    match role {
        Some(Role::Admin) => {
            builder.can(Action::Manage, ResourceType::All);
        }
        Some(Role::Moderator) => {
            builder.can(Action::Read, ResourceType::Incident);
            builder
                .can(Action::Update, ResourceType::Incident)
                .when(json!({ "resolved": false }));
            builder.cannot(Action::Delete, ResourceType::Incident);
            builder
                .cannot(Action::Update, ResourceType::Incident)
                .when(json!({ "resolved": true }));
            builder
                .can(Action::Update, ResourceType::User)
                .fields(MODERATOR_USER_FIELDS)
                .when(json!({ "role": Role::Player.as_str() }));
            builder.can(Action::Read, ResourceType::ReportReason);
        }
        Some(Role::Player) => {
            builder
                .can(Action::Create, ResourceType::Incident)
                .when(json!({ "reporterId": user_id }));
            builder
                .can(Action::Read, ResourceType::Incident)
                .when(json!({ "reporterId": user_id }));
            builder
                .can(Action::Update, ResourceType::Incident)
                .fields(PLAYER_INCIDENT_FIELDS)
                .when(json!({ "reporterId": user_id, "resolved": false }));
            builder.cannot(Action::Delete, ResourceType::Incident);
            builder
                .can(Action::Read, ResourceType::User)
                .when(json!({ "id": user_id }));
            builder.can(Action::Read, ResourceType::ReportReason);
        }
        None => {}
    }

    if banned && role.is_some() {
        builder.cannot(Action::Create, ResourceType::Incident);
    }

    builder.build()
}

/// Build the ability from a raw role name, as stored or received.
///
/// Unknown role names yield an empty ability.
pub fn define_ability_for_role_name(role: &str, user_id: i64, banned: bool) -> Ability {
    define_ability_for(Role::parse(role), user_id, banned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn user(id: i64, role: Role) -> User {
        User::new(id, format!("user{id}@test.com"), format!("User {id}"), role)
    }

    fn incident(reporter_id: i64, resolved: bool) -> Value {
        json!({ "id": 10, "reporterId": reporter_id, "resolved": resolved })
    }

    #[test]
    fn test_admin_can_do_everything() {
        let ability = define_ability(&user(4, Role::Admin));
        for action in Action::all() {
            for resource in ResourceType::all() {
                assert!(ability.can(action, resource), "{action} {resource}");
                assert!(ability.can_on(action, resource, &incident(1, true), &["resolved", "role"]));
            }
        }
    }

    #[test]
    fn test_moderator_incident_rules() {
        let ability = define_ability(&user(3, Role::Moderator));

        assert!(ability.can(Action::Read, ResourceType::Incident));
        assert!(ability.can_on(Action::Read, ResourceType::Incident, &incident(1, true), &[]));

        assert!(ability.can_on(Action::Update, ResourceType::Incident, &incident(1, false), &["resolved"]));
        assert!(!ability.can_on(Action::Update, ResourceType::Incident, &incident(1, true), &["resolved"]));

        assert!(!ability.can(Action::Delete, ResourceType::Incident));
        assert!(!ability.can_on(Action::Delete, ResourceType::Incident, &incident(1, false), &[]));
        assert!(!ability.can(Action::Create, ResourceType::Incident));
    }

    #[test]
    fn test_moderator_may_only_ban_players() {
        let ability = define_ability(&user(3, Role::Moderator));
        let player = json!({ "id": 2, "role": "Player" });
        let admin = json!({ "id": 4, "role": "Admin" });

        assert!(ability.can_on(Action::Update, ResourceType::User, &player, &["banned"]));
        assert!(!ability.can_on(Action::Update, ResourceType::User, &player, &["role"]));
        assert!(!ability.can_on(Action::Update, ResourceType::User, &admin, &["banned"]));
        assert!(!ability.can(Action::Read, ResourceType::User));
    }

    #[test]
    fn test_moderator_reads_reasons_but_not_audit_log() {
        let ability = define_ability(&user(3, Role::Moderator));
        assert!(ability.can(Action::Read, ResourceType::ReportReason));
        assert!(!ability.can(Action::Create, ResourceType::ReportReason));
        assert!(!ability.can(Action::Read, ResourceType::AuditLog));
    }

    #[test]
    fn test_player_reads_only_own_incidents() {
        let ability = define_ability(&user(1, Role::Player));
        assert!(ability.can(Action::Read, ResourceType::Incident));
        assert!(ability.can_on(Action::Read, ResourceType::Incident, &incident(1, false), &[]));
        assert!(!ability.can_on(Action::Read, ResourceType::Incident, &incident(2, false), &[]));
    }

    #[test]
    fn test_player_creates_only_as_reporter() {
        let ability = define_ability(&user(1, Role::Player));
        assert!(ability.can_on(Action::Create, ResourceType::Incident, &json!({ "reporterId": 1 }), &[]));
        assert!(!ability.can_on(Action::Create, ResourceType::Incident, &json!({ "reporterId": 2 }), &[]));
    }

    #[test]
    fn test_player_updates_own_unresolved_details_only() {
        let ability = define_ability(&user(1, Role::Player));
        let own_open = incident(1, false);

        assert!(ability.can_on(Action::Update, ResourceType::Incident, &own_open, &["details"]));
        assert!(ability.can_on(Action::Update, ResourceType::Incident, &own_open, &["details", "reportReasonId"]));
        assert!(!ability.can_on(Action::Update, ResourceType::Incident, &own_open, &["resolved"]));
        assert!(!ability.can_on(Action::Update, ResourceType::Incident, &incident(1, true), &["details"]));
        assert!(!ability.can_on(Action::Update, ResourceType::Incident, &incident(2, false), &["details"]));
    }

    #[test]
    fn test_player_never_deletes_and_reads_only_self() {
        let ability = define_ability(&user(1, Role::Player));
        assert!(!ability.can(Action::Delete, ResourceType::Incident));
        assert!(ability.can_on(Action::Read, ResourceType::User, &json!({ "id": 1 }), &[]));
        assert!(!ability.can_on(Action::Read, ResourceType::User, &json!({ "id": 2 }), &[]));
        assert!(!ability.can(Action::Update, ResourceType::User));
        assert!(ability.can(Action::Read, ResourceType::ReportReason));
        assert!(!ability.can(Action::Read, ResourceType::AuditLog));
    }

    #[test]
    fn test_banned_player_cannot_create() {
        let banned = user(1, Role::Player).with_banned(true);
        let ability = define_ability(&banned);
        assert!(!ability.can(Action::Create, ResourceType::Incident));
        assert!(!ability.can_on(Action::Create, ResourceType::Incident, &json!({ "reporterId": 1 }), &[]));
        // Reading is unaffected
        assert!(ability.can_on(Action::Read, ResourceType::Incident, &incident(1, false), &[]));
    }

    #[test]
    fn test_unknown_role_denies_everything() {
        for name in ["user", "guest", "", "superadmin"] {
            let ability = define_ability_for_role_name(name, 1, false);
            assert!(ability.is_empty());
            for action in Action::all() {
                for resource in ResourceType::all() {
                    assert!(ability.cannot(action, resource));
                }
            }
        }
        assert!(define_ability_for_role_name("moderator", 3, false).can(Action::Read, ResourceType::Incident));
    }

    #[test]
    fn test_unlisted_pairs_are_denied() {
        let allowed: &[(Role, Action, ResourceType)] = &[
            (Role::Moderator, Action::Read, ResourceType::Incident),
            (Role::Moderator, Action::Update, ResourceType::Incident),
            (Role::Moderator, Action::Update, ResourceType::User),
            (Role::Moderator, Action::Read, ResourceType::ReportReason),
            (Role::Player, Action::Create, ResourceType::Incident),
            (Role::Player, Action::Read, ResourceType::Incident),
            (Role::Player, Action::Update, ResourceType::Incident),
            (Role::Player, Action::Read, ResourceType::User),
            (Role::Player, Action::Read, ResourceType::ReportReason),
        ];

        for role in [Role::Moderator, Role::Player] {
            let ability = define_ability(&user(1, role));
            for action in [Action::Read, Action::Create, Action::Update, Action::Delete] {
                for resource in ResourceType::all() {
                    let expected = allowed.contains(&(role, action, resource));
                    assert_eq!(ability.can(action, resource), expected, "{role} {action} {resource}");
                }
            }
        }
    }
}
