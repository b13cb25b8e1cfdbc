use crate::api::auth::AuthScope;
use crate::errors::RunhubError;
use crate::models::workflow::Workflow;

/// A run is readable only within the scope of its owning workflow: org
/// tokens must match the workflow's org, user tokens its user. The resulting
/// `Forbidden` renders identically to a missing run.
pub fn auth_run_view(scope: &AuthScope, workflow: &Workflow) -> Result<(), RunhubError> {
    let in_scope = match scope {
        AuthScope::Org(org_id) => workflow.org_id.as_deref() == Some(org_id.as_str()),
        AuthScope::User(user_id) => workflow.user_id.as_deref() == Some(user_id.as_str()),
    };

    if in_scope {
        Ok(())
    } else {
        Err(RunhubError::Forbidden(format!(
            "Workflow {} is out of scope for the current token",
            workflow.id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charybdis::types::Uuid;

    fn workflow(org_id: Option<&str>, user_id: Option<&str>) -> Workflow {
        let now = chrono::Utc::now();

        Workflow {
            id: Uuid::new_v4(),
            name: "txt2img".to_string(),
            org_id: org_id.map(str::to_string),
            user_id: user_id.map(str::to_string),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn org_token_reads_org_workflow() {
        let scope = AuthScope::Org("org_1".to_string());

        assert!(auth_run_view(&scope, &workflow(Some("org_1"), None)).is_ok());
    }

    #[test]
    fn org_token_cannot_read_another_orgs_workflow() {
        let scope = AuthScope::Org("org_1".to_string());

        let err = auth_run_view(&scope, &workflow(Some("org_2"), None)).unwrap_err();

        assert!(matches!(err, RunhubError::Forbidden(_)));
    }

    #[test]
    fn user_token_reads_own_workflow() {
        let scope = AuthScope::User("user_1".to_string());

        assert!(auth_run_view(&scope, &workflow(None, Some("user_1"))).is_ok());
    }

    #[test]
    fn org_token_does_not_match_on_user_id() {
        // the checks are mutually exclusive, an org token never matches a
        // user-owned workflow even for the same identifier
        let scope = AuthScope::Org("user_1".to_string());

        assert!(auth_run_view(&scope, &workflow(None, Some("user_1"))).is_err());
    }

    #[test]
    fn user_token_does_not_match_on_org_id() {
        let scope = AuthScope::User("org_1".to_string());

        assert!(auth_run_view(&scope, &workflow(Some("org_1"), None)).is_err());
    }
}
