//! Scope and permission predicates.
//!
//! Permission strings follow `{domain}.scope.{scope}` and
//! `{domain}.action.{name}`. A caller that supplies no permission list is
//! permitted nothing except `open` actions.

use crudkit_model::{ActionConfig, FieldConfig, Scope};

/// True if `field` is declared for `scope` (or for every scope).
pub fn field_in_scope(field: &FieldConfig, scope: Scope) -> bool {
    field.scopes.as_ref().is_none_or(|scopes| scopes.contains(&scope))
}

/// True if `action` is declared for `scope` (or for every scope).
pub fn action_in_scope(action: &ActionConfig, scope: Scope) -> bool {
    action.scopes.as_ref().is_none_or(|scopes| scopes.contains(&scope))
}

/// Permission string granting access to `scope` of `domain`.
pub fn scope_permission(domain: &str, scope: Scope) -> String {
    format!("{domain}.scope.{scope}")
}

/// Permission string granting action `name` of `domain`.
pub fn action_permission(domain: &str, name: &str) -> String {
    format!("{domain}.action.{name}")
}

pub fn is_scope_permitted(domain: &str, scope: Scope, permissions: Option<&[String]>) -> bool {
    let Some(permissions) = permissions else {
        return false;
    };
    let wanted = scope_permission(domain, scope);
    permissions.iter().any(|p| *p == wanted)
}

pub fn is_action_permitted(
    domain: &str,
    action: &ActionConfig,
    permissions: Option<&[String]>,
) -> bool {
    if action.open {
        return true;
    }
    let Some(permissions) = permissions else {
        return false;
    };
    let wanted = action_permission(domain, &action.name);
    permissions.iter().any(|p| *p == wanted)
}

/// Not hidden, in scope and permitted.
pub fn is_action_visible(
    domain: &str,
    action: &ActionConfig,
    scope: Scope,
    permissions: Option<&[String]>,
) -> bool {
    !action.hidden
        && action_in_scope(action, scope)
        && is_action_permitted(domain, action, permissions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perms(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| (*p).to_string()).collect()
    }

    #[test]
    fn permission_strings() {
        assert_eq!(scope_permission("users", Scope::Edit), "users.scope.edit");
        assert_eq!(action_permission("users", "delete"), "users.action.delete");
    }

    #[test]
    fn unscoped_field_is_everywhere() {
        let field = FieldConfig::text("name");
        assert!(Scope::ALL.iter().all(|s| field_in_scope(&field, *s)));

        let field = field.with_scopes([Scope::Index]);
        assert!(field_in_scope(&field, Scope::Index));
        assert!(!field_in_scope(&field, Scope::Edit));
    }

    #[test]
    fn missing_permissions_deny_scopes() {
        assert!(!is_scope_permitted("users", Scope::Index, None));
        let granted = perms(&["users.scope.index"]);
        assert!(is_scope_permitted("users", Scope::Index, Some(&granted)));
        assert!(!is_scope_permitted("users", Scope::Edit, Some(&granted)));
        assert!(!is_scope_permitted("posts", Scope::Index, Some(&granted)));
    }

    #[test]
    fn open_actions_skip_permission_check() {
        let open = ActionConfig::new("back").open();
        assert!(is_action_permitted("users", &open, None));
        assert!(is_action_permitted("users", &open, Some(&[])));

        let guarded = ActionConfig::new("delete");
        assert!(!is_action_permitted("users", &guarded, None));
        assert!(is_action_permitted("users", &guarded, Some(&perms(&["users.action.delete"]))));
    }

    #[test]
    fn visibility_combines_hidden_scope_and_permission() {
        let granted = perms(&["users.action.save"]);
        let save = ActionConfig::new("save").with_scopes([Scope::Add, Scope::Edit]);
        assert!(is_action_visible("users", &save, Scope::Add, Some(&granted)));
        assert!(!is_action_visible("users", &save, Scope::View, Some(&granted)));
        assert!(!is_action_visible("users", &save.clone().hidden(), Scope::Add, Some(&granted)));
        assert!(!is_action_visible("users", &save, Scope::Add, None));
    }
}
