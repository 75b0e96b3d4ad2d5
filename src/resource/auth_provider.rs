//! Authentication provider resources.

use super::builder::{DiffContext, ResourceDiff};
use super::meta::ObjectMeta;
use crate::diff::{diff_field, diff_string_array, diff_variant, ensure_known, TaggedVariant};
use crate::patch::{to_document, Patch, PatchError, PatchOperation, PatchSet, Phase};
use crate::pointer::Pointer;
use crate::value::empty_string_as_none;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Separator used by dynamic role assignments that do not set one.
pub const DEFAULT_ROLE_SEPARATOR: &str = ":";

/// Fields that only exist on OAuth2 providers.
const OAUTH2_FIELDS: &[&str] = &["authorizationUrl", "tokenUrl", "userinfoUrl"];

/// ProviderType is the discriminator of an auth provider spec.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderType {
    Oidc,
    OAuth2,
    Unknown(String),
}

impl ProviderType {
    pub fn as_str(&self) -> &str {
        match self {
            ProviderType::Oidc => "oidc",
            ProviderType::OAuth2 => "oauth2",
            ProviderType::Unknown(s) => s,
        }
    }

    /// Fields that exist only under this provider type.
    pub fn conditional_fields(&self) -> &'static [&'static str] {
        match self {
            ProviderType::OAuth2 => OAUTH2_FIELDS,
            ProviderType::Oidc | ProviderType::Unknown(_) => &[],
        }
    }
}

impl From<String> for ProviderType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "oidc" => ProviderType::Oidc,
            "oauth2" => ProviderType::OAuth2,
            _ => ProviderType::Unknown(s),
        }
    }
}

impl From<ProviderType> for String {
    fn from(t: ProviderType) -> Self {
        match t {
            ProviderType::Unknown(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// RoleAssignment decides which roles a user gets after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RoleAssignment {
    Static {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        roles: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Dynamic {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        claim_path: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        separator: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl TaggedVariant for RoleAssignment {
    const DISCRIMINATOR: &'static str = "type";

    fn tag(&self) -> Option<&'static str> {
        match self {
            RoleAssignment::Static { .. } => Some("static"),
            RoleAssignment::Dynamic { .. } => Some("dynamic"),
            RoleAssignment::Unknown => None,
        }
    }

    fn same_shape_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RoleAssignment::Static { roles: a }, RoleAssignment::Static { roles: b }) => a == b,
            (
                RoleAssignment::Dynamic { claim_path: pa, separator: sa },
                RoleAssignment::Dynamic { claim_path: pb, separator: sb },
            ) => {
                pa == pb
                    && sa.as_deref().unwrap_or(DEFAULT_ROLE_SEPARATOR)
                        == sb.as_deref().unwrap_or(DEFAULT_ROLE_SEPARATOR)
            }
            _ => false,
        }
    }
}

/// OrganizationAssignment decides which organization a user lands in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OrganizationAssignment {
    #[serde(rename_all = "camelCase")]
    Static {
        #[serde(default)]
        organization_name: String,
    },
    #[serde(rename_all = "camelCase")]
    Dynamic {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        claim_path: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization_name_prefix: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization_name_suffix: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    PerUser {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization_name_prefix: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organization_name_suffix: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

fn affix_eq(a: &Option<String>, b: &Option<String>) -> bool {
    a.as_deref().unwrap_or_default() == b.as_deref().unwrap_or_default()
}

impl TaggedVariant for OrganizationAssignment {
    const DISCRIMINATOR: &'static str = "type";

    fn tag(&self) -> Option<&'static str> {
        match self {
            OrganizationAssignment::Static { .. } => Some("static"),
            OrganizationAssignment::Dynamic { .. } => Some("dynamic"),
            OrganizationAssignment::PerUser { .. } => Some("perUser"),
            OrganizationAssignment::Unknown => None,
        }
    }

    fn same_shape_eq(&self, other: &Self) -> bool {
        use OrganizationAssignment::*;

        match (self, other) {
            (Static { organization_name: a }, Static { organization_name: b }) => a == b,
            (
                Dynamic {
                    claim_path: pa,
                    organization_name_prefix: prefix_a,
                    organization_name_suffix: suffix_a,
                },
                Dynamic {
                    claim_path: pb,
                    organization_name_prefix: prefix_b,
                    organization_name_suffix: suffix_b,
                },
            ) => pa == pb && affix_eq(prefix_a, prefix_b) && affix_eq(suffix_a, suffix_b),
            (
                PerUser {
                    organization_name_prefix: prefix_a,
                    organization_name_suffix: suffix_a,
                },
                PerUser {
                    organization_name_prefix: prefix_b,
                    organization_name_suffix: suffix_b,
                },
            ) => affix_eq(prefix_a, prefix_b) && affix_eq(suffix_a, suffix_b),
            _ => false,
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// AuthProviderSpec is the patchable part of an auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthProviderSpec {
    pub provider_type: ProviderType,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_string_as_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_string_as_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_string_as_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_string_as_none")]
    pub client_secret: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub username_claim: Vec<String>,
    pub role_assignment: RoleAssignment,
    pub organization_assignment: OrganizationAssignment,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_string_as_none")]
    pub authorization_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_string_as_none")]
    pub token_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_string_as_none")]
    pub userinfo_url: Option<String>,
}

impl AuthProviderSpec {
    /// Returns the value of a provider-type specific field.
    fn conditional_field(&self, name: &str) -> Option<&String> {
        match name {
            "authorizationUrl" => self.authorization_url.as_ref(),
            "tokenUrl" => self.token_url.as_ref(),
            "userinfoUrl" => self.userinfo_url.as_ref(),
            _ => None,
        }
    }
}

/// AuthProvider is an authentication provider resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthProvider {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: AuthProviderSpec,
}

/// AuthProviderPatchBuilder produces the patch for an auth provider.
///
/// When the provider type and the client secret change together the whole
/// spec is replaced in one operation, so the server never observes the new
/// type paired with the old secret.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthProviderPatchBuilder;

impl AuthProviderPatchBuilder {
    pub fn new() -> Self {
        AuthProviderPatchBuilder
    }

    pub fn build(&self, current: &AuthProvider, desired: &AuthProvider) -> Result<Patch, PatchError> {
        let root = Pointer::root().field("spec");
        let cur = &current.spec;
        let des = &desired.spec;

        check_shapes(&root, cur)?;
        check_shapes(&root, des)?;

        let type_changed = cur.provider_type != des.provider_type;
        let secret_changed = cur.client_secret != des.client_secret;

        if type_changed && secret_changed {
            debug!(
                from = cur.provider_type.as_str(),
                to = des.provider_type.as_str(),
                "provider type and client secret changed together, replacing spec"
            );
            return Ok(Patch::from(vec![PatchOperation::replace(
                root.clone(),
                to_document(&root, des)?,
            )]));
        }

        let mut set = PatchSet::new();

        if type_changed {
            set.push(
                Phase::Discriminator,
                PatchOperation::replace(root.field("providerType"), des.provider_type.as_str()),
            );
        }

        diff_common_fields(&root, cur, des, &mut set)?;
        diff_conditional_fields(&root, cur, des, &mut set)?;

        let org = root.field("organizationAssignment");
        set.push_opt(
            Phase::Variant,
            diff_variant(&org, &cur.organization_assignment, &des.organization_assignment)?,
        );
        let role = root.field("roleAssignment");
        set.push_opt(
            Phase::Variant,
            diff_variant(&role, &cur.role_assignment, &des.role_assignment)?,
        );

        Ok(set.into_patch())
    }
}

fn diff_common_fields(
    root: &Pointer,
    cur: &AuthProviderSpec,
    des: &AuthProviderSpec,
    set: &mut PatchSet,
) -> Result<(), PatchError> {
    let scalars = [
        ("issuer", &cur.issuer, &des.issuer),
        ("clientId", &cur.client_id, &des.client_id),
        ("clientSecret", &cur.client_secret, &des.client_secret),
    ];
    for (name, old, new) in scalars {
        set.push_opt(Phase::Scalar, diff_field(&root.field(name), old.as_ref(), new.as_ref())?);
    }

    set.push_opt(
        Phase::Scalar,
        diff_field(&root.field("enabled"), Some(&cur.enabled), Some(&des.enabled))?,
    );
    set.push_opt(
        Phase::Scalar,
        diff_field(
            &root.field("displayName"),
            cur.display_name.as_ref(),
            des.display_name.as_ref(),
        )?,
    );
    set.push_opt(
        Phase::Scalar,
        diff_string_array(&root.field("scopes"), &cur.scopes, &des.scopes),
    );
    set.push_opt(
        Phase::Scalar,
        diff_string_array(&root.field("usernameClaim"), &cur.username_claim, &des.username_claim),
    );
    Ok(())
}

fn check_shapes(root: &Pointer, spec: &AuthProviderSpec) -> Result<(), PatchError> {
    if let ProviderType::Unknown(_) = spec.provider_type {
        return Err(PatchError::invalid_shape(root.field("providerType").as_str()));
    }
    ensure_known(&root.field("roleAssignment"), &spec.role_assignment)?;
    ensure_known(&root.field("organizationAssignment"), &spec.organization_assignment)?;
    Ok(())
}

/// Adds the fields of the new provider type and removes those that only
/// existed under the old one. Removal is never implicit.
fn diff_conditional_fields(
    root: &Pointer,
    cur: &AuthProviderSpec,
    des: &AuthProviderSpec,
    set: &mut PatchSet,
) -> Result<(), PatchError> {
    let was = cur.provider_type.conditional_fields();
    let now = des.provider_type.conditional_fields();

    for name in now {
        let old = if was.contains(name) {
            cur.conditional_field(name)
        } else {
            None
        };
        set.push_opt(
            Phase::Scalar,
            diff_field(&root.field(name), old, des.conditional_field(name))?,
        );
    }
    for name in was.iter().filter(|f| !now.contains(*f)) {
        if cur.conditional_field(name).is_some() {
            set.push(Phase::Scalar, PatchOperation::remove(root.field(name)));
        }
    }
    Ok(())
}

impl ResourceDiff for AuthProvider {
    const KIND: &'static str = "auth-provider";

    fn diff(_ctx: DiffContext<'_>, current: &Self, desired: &Self) -> Result<Patch, PatchError> {
        AuthProviderPatchBuilder::new().build(current, desired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_type_strings() {
        let t: ProviderType = serde_json::from_value(json!("oauth2")).unwrap();
        assert_eq!(t, ProviderType::OAuth2);
        assert_eq!(serde_json::to_value(&t).unwrap(), json!("oauth2"));

        let t: ProviderType = serde_json::from_value(json!("saml")).unwrap();
        assert_eq!(t, ProviderType::Unknown("saml".into()));
        assert_eq!(serde_json::to_value(&t).unwrap(), json!("saml"));
    }

    #[test]
    fn test_role_assignment_wire_shape() {
        let r: RoleAssignment =
            serde_json::from_value(json!({"type": "dynamic", "claimPath": ["groups"]})).unwrap();
        assert_eq!(
            r,
            RoleAssignment::Dynamic {
                claim_path: vec!["groups".into()],
                separator: None
            }
        );

        let r: RoleAssignment = serde_json::from_value(json!({"type": "ldap", "base": "dc=x"})).unwrap();
        assert_eq!(r, RoleAssignment::Unknown);
    }

    #[test]
    fn test_missing_separator_equals_default() {
        let a = RoleAssignment::Dynamic {
            claim_path: vec!["groups".into()],
            separator: None,
        };
        let b = RoleAssignment::Dynamic {
            claim_path: vec!["groups".into()],
            separator: Some(":".into()),
        };
        assert!(a.same_shape_eq(&b));

        let c = RoleAssignment::Dynamic {
            claim_path: vec!["groups".into()],
            separator: Some(",".into()),
        };
        assert!(!a.same_shape_eq(&c));
    }

    #[test]
    fn test_org_assignment_affix_defaults() {
        let a: OrganizationAssignment = serde_json::from_value(json!({"type": "perUser"})).unwrap();
        let b: OrganizationAssignment =
            serde_json::from_value(json!({"type": "perUser", "organizationNamePrefix": ""})).unwrap();
        assert!(a.same_shape_eq(&b));

        let c: OrganizationAssignment =
            serde_json::from_value(json!({"type": "dynamic", "claimPath": ["org"]})).unwrap();
        assert!(!a.same_shape_eq(&c));
        assert_eq!(c.tag(), Some("dynamic"));
    }
}
