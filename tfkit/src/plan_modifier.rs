//! Stock plan modifiers
//!
//! Plan modifiers run per attribute after the planned value is assembled.
//! They may rewrite the planned value or flag the attribute as forcing
//! resource replacement.

use crate::schema::{PlanModifier, PlanModifierRequest, PlanModifierResponse};
use crate::types::Dynamic;

/// Forces replacement whenever the attribute's value changes.
///
/// Null-to-null and transitions involving unknown values never trigger.
pub struct RequiresReplace;

impl RequiresReplace {
    pub fn create() -> Box<Self> {
        Box::new(Self)
    }
}

impl PlanModifier for RequiresReplace {
    fn description(&self) -> String {
        "changing this attribute requires replacing the resource".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let requires_replace = !matches!(
            (&request.state_value, &request.plan_value),
            (Dynamic::Null, Dynamic::Null) | (Dynamic::Unknown, _) | (_, Dynamic::Unknown)
        ) && request.state_value != request.plan_value;

        PlanModifierResponse {
            plan_value: request.plan_value,
            requires_replace,
            diagnostics: Vec::new(),
        }
    }
}

/// Keeps the prior state value when the planned value is unknown.
///
/// The usual companion of computed attributes that never change after
/// creation (identifiers, server-assigned URIs).
pub struct UseStateForUnknown;

impl UseStateForUnknown {
    pub fn create() -> Box<Self> {
        Box::new(Self)
    }
}

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> String {
        "use the prior state value while the new value is unknown".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let plan_value = match &request.plan_value {
            Dynamic::Unknown => match &request.state_value {
                Dynamic::Null | Dynamic::Unknown => request.plan_value,
                known => known.clone(),
            },
            _ => request.plan_value,
        };

        PlanModifierResponse {
            plan_value,
            requires_replace: false,
            diagnostics: Vec::new(),
        }
    }
}

/// Forces replacement when a caller-supplied predicate holds.
pub struct RequiresReplaceIf<F>
where
    F: Fn(&PlanModifierRequest) -> bool + Send + Sync,
{
    predicate: F,
    reason: String,
}

impl<F> RequiresReplaceIf<F>
where
    F: Fn(&PlanModifierRequest) -> bool + Send + Sync + 'static,
{
    pub fn create(predicate: F, reason: impl Into<String>) -> Box<Self> {
        Box::new(Self {
            predicate,
            reason: reason.into(),
        })
    }
}

impl<F> PlanModifier for RequiresReplaceIf<F>
where
    F: Fn(&PlanModifierRequest) -> bool + Send + Sync,
{
    fn description(&self) -> String {
        self.reason.clone()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let requires_replace = (self.predicate)(&request);

        PlanModifierResponse {
            plan_value: request.plan_value,
            requires_replace,
            diagnostics: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributePath;

    fn request(state: Dynamic, plan: Dynamic) -> PlanModifierRequest {
        PlanModifierRequest {
            config_value: plan.clone(),
            state_value: state,
            plan_value: plan,
            path: AttributePath::new("field"),
        }
    }

    #[test]
    fn requires_replace_triggers_on_change() {
        let m = RequiresReplace;
        let response = m.modify(request(
            Dynamic::Number(1.0),
            Dynamic::Number(2.0),
        ));
        assert!(response.requires_replace);
    }

    #[test]
    fn requires_replace_ignores_same_value() {
        let m = RequiresReplace;
        let response = m.modify(request(
            Dynamic::String("x".to_string()),
            Dynamic::String("x".to_string()),
        ));
        assert!(!response.requires_replace);
    }

    #[test]
    fn requires_replace_ignores_null_and_unknown() {
        let m = RequiresReplace;
        assert!(!m.modify(request(Dynamic::Null, Dynamic::Null)).requires_replace);
        assert!(
            !m.modify(request(Dynamic::Unknown, Dynamic::String("v".to_string())))
                .requires_replace
        );
        assert!(
            !m.modify(request(Dynamic::String("v".to_string()), Dynamic::Unknown))
                .requires_replace
        );
    }

    #[test]
    fn use_state_for_unknown_restores_prior_value() {
        let m = UseStateForUnknown;
        let response = m.modify(request(
            Dynamic::String("kept".to_string()),
            Dynamic::Unknown,
        ));
        assert_eq!(response.plan_value, Dynamic::String("kept".to_string()));
    }

    #[test]
    fn use_state_for_unknown_leaves_known_plan_alone() {
        let m = UseStateForUnknown;
        let response = m.modify(request(
            Dynamic::String("old".to_string()),
            Dynamic::String("new".to_string()),
        ));
        assert_eq!(response.plan_value, Dynamic::String("new".to_string()));
    }

    #[test]
    fn use_state_for_unknown_keeps_unknown_when_no_prior() {
        let m = UseStateForUnknown;
        let response = m.modify(request(Dynamic::Null, Dynamic::Unknown));
        assert_eq!(response.plan_value, Dynamic::Unknown);
    }

    #[test]
    fn requires_replace_if_runs_predicate() {
        let m = RequiresReplaceIf::create(
            |req| {
                matches!((&req.state_value, &req.plan_value),
                    (Dynamic::String(old), Dynamic::String(new)) if !old.is_empty() && new.is_empty())
            },
            "cannot clear without replacement",
        );

        assert!(
            m.modify(request(
                Dynamic::String("set".to_string()),
                Dynamic::String(String::new())
            ))
            .requires_replace
        );
        assert!(
            !m.modify(request(
                Dynamic::String(String::new()),
                Dynamic::String("set".to_string())
            ))
            .requires_replace
        );
    }
}
