//! Fleet resources.

use super::builder::{DiffContext, ResourceDiff};
use super::device::{diff_device_spec, DeviceSpec};
use super::meta::{LabelSelector, ObjectMeta};
use crate::diff::{diff_atomic, diff_field, diff_map, diff_optional_variant, TaggedVariant};
use crate::patch::{to_document, Patch, PatchError, PatchOperation, PatchSet, Phase};
use crate::pointer::Pointer;
use crate::value::empty_string_as_none;
use serde::{Deserialize, Serialize};

/// BatchLimit caps how many devices a batch selects, either as a count or
/// as a percentage such as `"20%"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchLimit {
    Count(i64),
    Percentage(String),
}

/// Batch is one step of a batch sequence rollout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<BatchLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_threshold: Option<String>,
}

/// DeviceSelection decides which devices are updated in which order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy")]
pub enum DeviceSelection {
    BatchSequence {
        #[serde(default)]
        sequence: Vec<Batch>,
    },
    #[serde(other)]
    Unknown,
}

impl TaggedVariant for DeviceSelection {
    const DISCRIMINATOR: &'static str = "strategy";

    fn tag(&self) -> Option<&'static str> {
        match self {
            DeviceSelection::BatchSequence { .. } => Some("BatchSequence"),
            DeviceSelection::Unknown => None,
        }
    }

    fn same_shape_eq(&self, other: &Self) -> bool {
        self == other
    }
}

/// DisruptionBudget limits how many devices of a group may be updating at
/// the same time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisruptionBudget {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_available: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolloutPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_string_as_none")]
    pub default_update_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_selection: Option<DeviceSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disruption_budget: Option<DisruptionBudget>,
}

/// DeviceTemplate is the device spec applied to every device of a fleet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTemplate {
    #[serde(default)]
    pub spec: DeviceSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSpec {
    #[serde(default)]
    pub selector: LabelSelector,
    #[serde(default)]
    pub template: DeviceTemplate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollout_policy: Option<RolloutPolicy>,
}

/// Fleet is a group of devices sharing one device template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fleet {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: FleetSpec,
}

/// FleetPatchBuilder produces the patch for a fleet.
pub struct FleetPatchBuilder<'a> {
    ctx: DiffContext<'a>,
}

impl<'a> FleetPatchBuilder<'a> {
    pub fn new(ctx: DiffContext<'a>) -> Self {
        FleetPatchBuilder { ctx }
    }

    pub fn build(&self, current: &Fleet, desired: &Fleet) -> Result<Patch, PatchError> {
        let policy = self.ctx.options.key_policy;
        let spec = Pointer::root().field("spec");
        let mut set = PatchSet::new();

        set.extend(
            Phase::Map,
            diff_map(
                &Pointer::from_fields(["metadata", "labels"]),
                &current.metadata.labels,
                &desired.metadata.labels,
                policy,
            )?,
        );
        set.extend(
            Phase::Map,
            diff_map(
                &spec.field("selector").field("matchLabels"),
                &current.spec.selector.match_labels,
                &desired.spec.selector.match_labels,
                policy,
            )?,
        );

        let template = spec.field("template").field("spec");
        diff_device_spec(
            self.ctx,
            &template,
            &current.spec.template.spec,
            &desired.spec.template.spec,
            &mut set,
        )?;

        diff_rollout_policy(
            &spec.field("rolloutPolicy"),
            current.spec.rollout_policy.as_ref(),
            desired.spec.rollout_policy.as_ref(),
            &mut set,
        )?;

        Ok(set.into_patch())
    }
}

/// A policy present on one side only is added or removed whole; otherwise
/// its fields are diffed one by one.
fn diff_rollout_policy(
    path: &Pointer,
    current: Option<&RolloutPolicy>,
    desired: Option<&RolloutPolicy>,
    set: &mut PatchSet,
) -> Result<(), PatchError> {
    let (cur, des) = match (current, desired) {
        (None, None) => return Ok(()),
        (None, Some(d)) => {
            set.push(Phase::Variant, PatchOperation::add(path.clone(), to_document(path, d)?));
            return Ok(());
        }
        (Some(_), None) => {
            set.push(Phase::Variant, PatchOperation::remove(path.clone()));
            return Ok(());
        }
        (Some(c), Some(d)) => (c, d),
    };

    set.push_opt(
        Phase::Scalar,
        diff_field(
            &path.field("defaultUpdateTimeout"),
            cur.default_update_timeout.as_ref(),
            des.default_update_timeout.as_ref(),
        )?,
    );
    set.push_opt(
        Phase::Variant,
        diff_optional_variant(
            &path.field("deviceSelection"),
            cur.device_selection.as_ref(),
            des.device_selection.as_ref(),
        )?,
    );
    set.push_opt(
        Phase::Variant,
        diff_atomic(
            &path.field("disruptionBudget"),
            cur.disruption_budget.as_ref(),
            des.disruption_budget.as_ref(),
        )?,
    );
    Ok(())
}

impl ResourceDiff for Fleet {
    const KIND: &'static str = "fleet";

    fn diff(ctx: DiffContext<'_>, current: &Self, desired: &Self) -> Result<Patch, PatchError> {
        FleetPatchBuilder::new(ctx).build(current, desired)
    }
}
