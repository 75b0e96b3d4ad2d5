//! Device resources and the device-spec diff shared with fleet templates.

use super::builder::{DiffContext, ResourceDiff};
use super::meta::ObjectMeta;
use crate::diff::{diff_composite_list, diff_field, diff_map, ensure_all_known, TaggedVariant};
use crate::patch::{to_document, Patch, PatchError, PatchOperation, PatchSet, Phase};
use crate::pointer::Pointer;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// DeviceOsSpec selects the OS image a device runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceOsSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
}

impl DeviceOsSpec {
    pub fn new(image: impl Into<String>) -> Self {
        DeviceOsSpec { image: image.into() }
    }
}

/// Returns the OS image, or `None` when no image is set.
fn os_image(os: &Option<DeviceOsSpec>) -> Option<&str> {
    os.as_ref().map(|os| os.image.as_str()).filter(|image| !image.is_empty())
}

fn os_unset(os: &Option<DeviceOsSpec>) -> bool {
    os_image(os).is_none()
}

/// An `os` block without an image is read as no `os` block at all.
fn os_with_image<'de, D>(deserializer: D) -> Result<Option<DeviceOsSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let os: Option<DeviceOsSpec> = Option::deserialize(deserializer)?;
    Ok(os.filter(|os| !os.image.is_empty()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRef {
    pub repository: String,
    pub target_revision: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    pub name: String,
    pub namespace: String,
    pub mount_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRef {
    pub repository: String,
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

/// FileSpec is one file of an inline configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSpec {
    pub path: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
}

/// ConfigProviderSpec is one entry of a device configuration list. The
/// `configType` field selects the source of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "configType")]
pub enum ConfigProviderSpec {
    #[serde(rename_all = "camelCase")]
    GitConfigProviderSpec { name: String, git_ref: GitRef },
    #[serde(rename_all = "camelCase")]
    KubernetesSecretProviderSpec { name: String, secret_ref: SecretRef },
    #[serde(rename_all = "camelCase")]
    InlineConfigProviderSpec {
        name: String,
        #[serde(default)]
        inline: Vec<FileSpec>,
    },
    #[serde(rename_all = "camelCase")]
    HttpConfigProviderSpec { name: String, http_ref: HttpRef },
    #[serde(other)]
    Unknown,
}

impl TaggedVariant for ConfigProviderSpec {
    const DISCRIMINATOR: &'static str = "configType";

    fn tag(&self) -> Option<&'static str> {
        match self {
            ConfigProviderSpec::GitConfigProviderSpec { .. } => Some("GitConfigProviderSpec"),
            ConfigProviderSpec::KubernetesSecretProviderSpec { .. } => Some("KubernetesSecretProviderSpec"),
            ConfigProviderSpec::InlineConfigProviderSpec { .. } => Some("InlineConfigProviderSpec"),
            ConfigProviderSpec::HttpConfigProviderSpec { .. } => Some("HttpConfigProviderSpec"),
            ConfigProviderSpec::Unknown => None,
        }
    }

    fn same_shape_eq(&self, other: &Self) -> bool {
        self == other
    }
}

/// ApplicationProviderSpec is one application deployed on a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationProviderSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_type: Option<String>,
    pub image: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env_vars: BTreeMap<String, String>,
}

/// DeviceSpec is the patchable part of a device, also used as the fleet
/// device template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSpec {
    #[serde(default, skip_serializing_if = "os_unset", deserialize_with = "os_with_image")]
    pub os: Option<DeviceOsSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub config: Vec<ConfigProviderSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<ApplicationProviderSpec>,
}

/// Device is a managed device resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: DeviceSpec,
}

/// Diffs two device specs rooted at `base`.
///
/// The OS sub-document exists only while it carries an image: it is added
/// whole when an image is first set and removed whole when the image is
/// cleared. Configuration and application lists go through the composite
/// list differ.
pub(crate) fn diff_device_spec(
    ctx: DiffContext<'_>,
    base: &Pointer,
    current: &DeviceSpec,
    desired: &DeviceSpec,
    set: &mut PatchSet,
) -> Result<(), PatchError> {
    let os = base.field("os");
    match (os_image(&current.os), os_image(&desired.os)) {
        (None, None) => {}
        (None, Some(image)) => {
            let value = to_document(&os, &DeviceOsSpec::new(image))?;
            set.push(Phase::Scalar, PatchOperation::add(os, value));
        }
        (Some(_), None) => set.push(Phase::Scalar, PatchOperation::remove(os)),
        (Some(c), Some(d)) => {
            set.push_opt(Phase::Scalar, diff_field(&os.field("image"), Some(c), Some(d))?);
        }
    }

    let config = base.field("config");
    ensure_all_known(&config, &current.config)?;
    ensure_all_known(&config, &desired.config)?;
    set.extend(
        Phase::CompositeList,
        diff_composite_list(ctx.tree, &config, &current.config, &desired.config)?,
    );

    let applications = base.field("applications");
    set.extend(
        Phase::CompositeList,
        diff_composite_list(ctx.tree, &applications, &current.applications, &desired.applications)?,
    );

    Ok(())
}

/// DevicePatchBuilder produces the patch for a device.
pub struct DevicePatchBuilder<'a> {
    ctx: DiffContext<'a>,
    owned_by_fleet: bool,
}

impl<'a> DevicePatchBuilder<'a> {
    pub fn new(ctx: DiffContext<'a>) -> Self {
        DevicePatchBuilder {
            ctx,
            owned_by_fleet: false,
        }
    }

    /// Marks the device as bound to a fleet. The fleet owns the spec of such
    /// a device, so only its labels are patched.
    pub fn owned_by_fleet(mut self, owned: bool) -> Self {
        self.owned_by_fleet = owned;
        self
    }

    pub fn build(&self, current: &Device, desired: &Device) -> Result<Patch, PatchError> {
        let mut set = PatchSet::new();

        let labels = Pointer::from_fields(["metadata", "labels"]);
        set.extend(
            Phase::Map,
            diff_map(
                &labels,
                &current.metadata.labels,
                &desired.metadata.labels,
                self.ctx.options.key_policy,
            )?,
        );

        if self.owned_by_fleet {
            debug!("device is owned by a fleet, patching labels only");
            return Ok(set.into_patch());
        }

        diff_device_spec(self.ctx, &Pointer::root().field("spec"), &current.spec, &desired.spec, &mut set)?;
        Ok(set.into_patch())
    }
}

impl ResourceDiff for Device {
    const KIND: &'static str = "device";

    fn diff(ctx: DiffContext<'_>, current: &Self, desired: &Self) -> Result<Patch, PatchError> {
        DevicePatchBuilder::new(ctx).build(current, desired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{JsonPatchTree, PatchOptions};
    use crate::patch::OpKind;
    use serde_json::json;

    fn device(doc: serde_json::Value) -> Device {
        serde_json::from_value(doc).unwrap()
    }

    fn build(current: &Device, desired: &Device, owned: bool) -> Patch {
        let options = PatchOptions::default();
        let ctx = DiffContext {
            options: &options,
            tree: &JsonPatchTree,
        };
        DevicePatchBuilder::new(ctx)
            .owned_by_fleet(owned)
            .build(current, desired)
            .unwrap()
    }

    #[test]
    fn test_os_image_added() {
        let current = device(json!({"metadata": {}, "spec": {}}));
        let desired = device(json!({"metadata": {}, "spec": {"os": {"image": "quay.io/os:1"}}}));
        let patch = build(&current, &desired, false);
        assert_eq!(patch.len(), 1);
        assert_eq!(
            patch.operations()[0],
            PatchOperation::add(Pointer::from_fields(["spec", "os"]), json!({"image": "quay.io/os:1"}))
        );
    }

    #[test]
    fn test_os_image_changed_and_removed() {
        let v1 = device(json!({"spec": {"os": {"image": "quay.io/os:1"}}}));
        let v2 = device(json!({"spec": {"os": {"image": "quay.io/os:2"}}}));
        let none = device(json!({"spec": {}}));

        let patch = build(&v1, &v2, false);
        assert_eq!(patch.operations()[0].kind(), OpKind::Replace);
        assert_eq!(patch.operations()[0].path().as_str(), "/spec/os/image");

        let patch = build(&v1, &none, false);
        assert_eq!(patch.operations(), &[PatchOperation::remove(Pointer::from_fields(["spec", "os"]))]);
    }

    #[test]
    fn test_os_image_cleared_removes_os() {
        let current = Device {
            spec: DeviceSpec {
                os: Some(DeviceOsSpec::new("img:1")),
                ..DeviceSpec::default()
            },
            ..Device::default()
        };
        let desired = Device {
            spec: DeviceSpec {
                os: Some(DeviceOsSpec::new("")),
                ..DeviceSpec::default()
            },
            ..Device::default()
        };
        assert_eq!(
            build(&current, &desired, false).into_inner(),
            vec![PatchOperation::remove(Pointer::from_fields(["spec", "os"]))]
        );

        let parsed = device(json!({"spec": {"os": {"image": ""}}}));
        assert_eq!(parsed.spec.os, None);
        assert_eq!(
            build(&current, &parsed, false).into_inner(),
            vec![PatchOperation::remove(Pointer::from_fields(["spec", "os"]))]
        );
    }

    #[test]
    fn test_empty_os_gets_image_added_whole() {
        let current = Device {
            spec: DeviceSpec {
                os: Some(DeviceOsSpec::default()),
                ..DeviceSpec::default()
            },
            ..Device::default()
        };
        let desired = device(json!({"spec": {"os": {"image": "img:1"}}}));
        assert_eq!(
            build(&current, &desired, false).into_inner(),
            vec![PatchOperation::add(
                Pointer::from_fields(["spec", "os"]),
                json!({"image": "img:1"})
            )]
        );

        let parsed = device(json!({"spec": {"os": {}}}));
        assert_eq!(
            build(&parsed, &desired, false).into_inner(),
            build(&current, &desired, false).into_inner()
        );
        assert!(build(&parsed, &current, false).is_empty());
        assert_eq!(serde_json::to_value(&current.spec).unwrap(), json!({}));
    }

    #[test]
    fn test_os_change_precedes_label_change() {
        let current = device(json!({"metadata": {"labels": {"site": "a"}}, "spec": {}}));
        let desired = device(json!({
            "metadata": {"labels": {"site": "b"}},
            "spec": {"os": {"image": "img"}}
        }));
        let paths: Vec<String> = build(&current, &desired, false)
            .iter()
            .map(|op| op.path().to_string())
            .collect();
        assert_eq!(paths, vec!["/spec/os", "/metadata/labels/site"]);
    }

    #[test]
    fn test_fleet_owned_device_patches_labels_only() {
        let current = device(json!({"metadata": {"labels": {"site": "a"}}, "spec": {}}));
        let desired = device(json!({
            "metadata": {"labels": {"site": "a", "fleet": "edge"}},
            "spec": {"os": {"image": "img"}}
        }));
        let patch = build(&current, &desired, true);
        assert_eq!(patch.len(), 1);
        assert_eq!(patch.operations()[0].path().as_str(), "/metadata/labels/fleet");
    }

    #[test]
    fn test_unknown_config_type() {
        let current = device(json!({"spec": {}}));
        let desired = device(json!({"spec": {"config": [{"configType": "S3ConfigProviderSpec", "name": "x"}]}}));
        assert_eq!(desired.spec.config[0], ConfigProviderSpec::Unknown);
        let options = PatchOptions::default();
        let ctx = DiffContext {
            options: &options,
            tree: &JsonPatchTree,
        };
        let err = DevicePatchBuilder::new(ctx).build(&current, &desired).unwrap_err();
        assert!(matches!(err, PatchError::InvalidShape { ref path } if path == "/spec/config/0/configType"));
    }

    #[test]
    fn test_config_type_tag() {
        let spec: ConfigProviderSpec = serde_json::from_value(json!({
            "configType": "KubernetesSecretProviderSpec",
            "name": "creds",
            "secretRef": {"name": "s", "namespace": "ns", "mountPath": "/etc/creds"}
        }))
        .unwrap();
        assert_eq!(spec.tag(), Some("KubernetesSecretProviderSpec"));
    }
}
