//! User handlers
//!
//! Bans are a moderator action on players; role changes are admin only.

use incident_ability::{Action, ResourceType};
use incident_audit::{AuditAction, AuditEntry};
use incident_model::{Role, User, UserPatch};
use serde_json::json;
use tracing::instrument;

use crate::error::{ServiceError, ServiceResult};
use crate::request::RequestContext;
use crate::service::TrackerService;

impl TrackerService {
    /// List accounts, newest first. Players only see their own.
    #[instrument(skip(self, ctx))]
    pub async fn list_users(&self, ctx: &RequestContext) -> ServiceResult<Vec<User>> {
        let (actor, ability) = self.authenticate(ctx).await?;
        if ability.cannot(Action::Read, ResourceType::User) {
            return Err(ServiceError::forbidden());
        }

        let only = if actor.role.is_staff() { None } else { Some(actor.id) };
        let users = self
            .store
            .list_users(only)
            .await?
            .into_iter()
            .filter(|user| ability.can_on(Action::Read, ResourceType::User, &user.snapshot(), &[]))
            .collect();

        Ok(users)
    }

    /// Get a single account.
    #[instrument(skip(self, ctx))]
    pub async fn get_user(&self, ctx: &RequestContext, id: i64) -> ServiceResult<User> {
        let (_actor, ability) = self.authenticate(ctx).await?;

        let user = self
            .store
            .get_user(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        if !ability.can_on(Action::Read, ResourceType::User, &user.snapshot(), &[]) {
            return Err(ServiceError::forbidden());
        }

        Ok(user)
    }

    /// Ban, unban or change the role of an account.
    ///
    /// Each requested field is checked separately against the target
    /// account: `banned` needs update rights on the target's `banned`
    /// field, `role` on its `role` field.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the account does not exist
    /// - `Forbidden` if any requested field is not permitted
    /// - `Validation` ("No valid fields to update") for an empty patch
    #[instrument(skip(self, ctx, patch))]
    pub async fn update_user(&self, ctx: &RequestContext, id: i64, patch: UserPatch) -> ServiceResult<User> {
        let (actor, ability) = self.authenticate(ctx).await?;

        let target = self
            .store
            .get_user(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        let before = target.snapshot();
        for field in patch.requested_fields() {
            if !ability.can_on(Action::Update, ResourceType::User, &before, &[field]) {
                tracing::debug!(actor_id = actor.id, target_id = id, field, "User update denied");
                return Err(ServiceError::forbidden());
            }
        }

        if patch.is_empty() {
            return Err(ServiceError::Validation("No valid fields to update".to_string()));
        }

        let mut updated = target.clone();
        if let Some(banned) = patch.banned {
            updated.banned = banned;
        }
        if let Some(role) = patch.role {
            updated.role = role;
        }
        let updated = self.store.save_user(updated).await?;
        let after = updated.snapshot();

        let mut entries = Vec::new();
        if let Some(banned) = patch.banned {
            let action = if banned {
                AuditAction::UserBanned
            } else {
                AuditAction::UserUnbanned
            };
            tracing::info!(target_id = id, actor_id = actor.id, action = %action, "Ban status changed");
            entries.push(
                self.audit_entry(ctx, action, &actor, id)
                    .with_metadata(json!({ "before": before, "after": after })),
            );
        }
        if let Some(role) = patch.role {
            tracing::info!(target_id = id, actor_id = actor.id, from = %target.role, to = %role, "Role changed");
            entries.push(
                self.audit_entry(ctx, AuditAction::UserRoleChanged, &actor, id)
                    .with_metadata(json!({ "before": before, "after": after })),
            );
            if let Some(entry) = self.moderator_change(ctx, &actor, &target, role) {
                entries.push(entry);
            }
        }
        self.audit.record_all(entries).await;

        Ok(updated)
    }

    fn moderator_change(&self, ctx: &RequestContext, actor: &User, target: &User, role: Role) -> Option<AuditEntry> {
        let action = match (target.role, role) {
            (from, Role::Moderator) if from != Role::Moderator => AuditAction::ModeratorAdded,
            (Role::Moderator, to) if to != Role::Moderator => AuditAction::ModeratorRemoved,
            _ => return None,
        };
        Some(
            self.audit_entry(ctx, action, actor, target.id)
                .with_metadata(json!({ "userId": target.id, "email": target.email })),
        )
    }
}
