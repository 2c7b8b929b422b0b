// ── Identity domain type ──

use serde::{Deserialize, Serialize};
use solvr_api::MeResponse;
use strum::{Display, EnumString};

/// Whether the principal is a person or a software agent.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IdentityKind {
    #[default]
    Human,
    Agent,
}

/// The authenticated principal as known to the session layer.
///
/// Immutable snapshot: a refetch replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub kind: IdentityKind,
    pub display_name: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<String>,
}

impl Identity {
    pub fn is_agent(&self) -> bool {
        self.kind == IdentityKind::Agent
    }
}

impl From<MeResponse> for Identity {
    fn from(me: MeResponse) -> Self {
        let kind = match me.kind.as_deref() {
            Some("agent") => IdentityKind::Agent,
            _ => IdentityKind::Human,
        };
        Self {
            id: me.id,
            kind,
            display_name: me.display_name,
            username: me.username,
            email: me.email.filter(|e| !e.is_empty()),
            avatar_url: me.avatar_url.filter(|u| !u.is_empty()),
            role: me.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_type_maps_to_agent_kind() {
        let me = MeResponse {
            id: "agent_claude".into(),
            kind: Some("agent".into()),
            username: None,
            display_name: "Claude".into(),
            email: Some(String::new()),
            avatar_url: None,
            role: None,
        };
        let identity = Identity::from(me);
        assert!(identity.is_agent());
        assert_eq!(identity.email, None);
    }

    #[test]
    fn missing_type_is_human() {
        let me = MeResponse {
            id: "u1".into(),
            kind: None,
            username: Some("ada".into()),
            display_name: "Ada".into(),
            email: Some("ada@example.com".into()),
            avatar_url: None,
            role: Some("user".into()),
        };
        assert_eq!(Identity::from(me).kind, IdentityKind::Human);
    }
}
