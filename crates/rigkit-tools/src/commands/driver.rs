//! Shape-key drivers controlled by a widget joint

use rigkit_core::{
    Axis, Constraint, ConstraintKind, ConstraintSpace, DRIVER_VARIABLE_NAME, DriverVariable,
    LimitSettings, ObjectKind, RangeMapping, Scene, ShapeKeyDriver, TransformChannel,
    TransformLocks,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::target::pose_selection;
use crate::config::ToolConfig;
use crate::report::{CommandError, CommandOutcome};

pub fn channel_label(channel: TransformChannel) -> &'static str {
    match channel {
        TransformChannel::Location => "LOCATION",
        TransformChannel::Rotation => "ROTATION",
        TransformChannel::Scale => "SCALE",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverParams {
    pub target_mesh: Option<Uuid>,
    pub shape_key: Option<String>,
    pub channel: TransformChannel,
    /// Joint-local axis read by the driver
    pub axis: Axis,
    /// Input range; degrees for rotation
    pub range_start: f32,
    pub range_end: f32,
    pub value_min: f32,
    pub value_max: f32,
    /// Lock every other transform channel of the joint
    pub lock_to_axis: bool,
    /// Add a limit constraint mirroring the input range
    pub constrain_to_range: bool,
    /// Joint group; empty falls back to the configured driver group
    pub group: String,
}

impl DriverParams {
    pub fn new(channel: TransformChannel, config: &ToolConfig) -> Self {
        let (range_start, range_end) = match channel {
            TransformChannel::Rotation => (0.0, 90.0),
            _ => (0.0, 1.0),
        };
        Self {
            target_mesh: None,
            shape_key: None,
            channel,
            axis: Axis::X,
            range_start,
            range_end,
            value_min: 0.0,
            value_max: 1.0,
            lock_to_axis: true,
            constrain_to_range: true,
            group: config.naming.driver_group.clone(),
        }
    }

    /// Input range in the units the driver variable reports
    pub fn input_range(&self) -> (f32, f32) {
        match self.channel {
            TransformChannel::Rotation => {
                (self.range_start.to_radians(), self.range_end.to_radians())
            }
            _ => (self.range_start, self.range_end),
        }
    }
}

impl Default for DriverParams {
    fn default() -> Self {
        Self::new(TransformChannel::Location, &ToolConfig::default())
    }
}

/// Drive a shape key from the first selected pose joint
pub fn execute_create_driver(
    scene: &mut Scene,
    config: &ToolConfig,
    params: &DriverParams,
) -> Result<CommandOutcome, CommandError> {
    let mesh_id = params
        .target_mesh
        .ok_or_else(|| CommandError::precondition("No target mesh selected"))?;
    let mesh_object = scene.get_object(mesh_id)?;
    if mesh_object.kind() != ObjectKind::Mesh {
        return Err(CommandError::precondition("Selected object is not a mesh"));
    }
    let mesh_name = mesh_object.name.clone();
    let key = params
        .shape_key
        .as_deref()
        .ok_or_else(|| CommandError::precondition("No shape key selected"))?;

    if scene
        .active_object()
        .is_none_or(|o| o.kind() != ObjectKind::Skeleton)
    {
        return Err(CommandError::precondition("No armature selected"));
    }
    let Some((skeleton_id, selected)) = pose_selection(scene) else {
        return Err(CommandError::precondition("No bone selected"));
    };
    let joint = *selected
        .first()
        .ok_or_else(|| CommandError::precondition("No bone selected"))?;

    let mesh = scene.mesh(mesh_id)?;
    if mesh.shape_keys.is_empty() {
        return Err(CommandError::precondition("Target mesh has no shape keys"));
    }
    if mesh.shape_key(key).is_none() {
        return Err(CommandError::precondition(format!(
            "Shape key '{key}' not found"
        )));
    }
    let (start, end) = params.input_range();
    let mapping = RangeMapping::new(
        start,
        end,
        params.value_min,
        params.value_max,
        config.tolerances.driver_range,
    )
    .ok_or(CommandError::ZeroWidthRange)?;

    // Joint: name, group, locks and limits
    let group = if params.group.is_empty() {
        config.naming.driver_group.as_str()
    } else {
        params.group.as_str()
    };
    let skeleton = scene.skeleton_mut(skeleton_id)?;
    let joint_name = skeleton.rename_joint(joint, &format!("{mesh_name}.{key}_CTL"))?;
    skeleton.groups.assign_exclusive(joint, group);

    let channel = params.channel;
    let target = skeleton.get_joint_mut(joint)?;
    target.pose.locks.clear();
    target
        .constraints
        .retain(|c| !matches!(&c.kind, ConstraintKind::Limit(l) if l.channel == channel));
    if params.lock_to_axis {
        target.pose.locks = TransformLocks::only_free(channel, params.axis);
    }
    if params.constrain_to_range {
        let mut limit = LimitSettings::new(channel).with_range(params.axis, start, end);
        limit.use_transform_limit = true;
        limit.owner_space = ConstraintSpace::Local;
        target.constraints.push(
            Constraint::new(ConstraintKind::Limit(limit))
                .with_name(format!("ShapeKey_{key}_Limit")),
        );
    }

    // Shape key: slider range and driver
    let variable = DriverVariable {
        name: DRIVER_VARIABLE_NAME.to_string(),
        object: skeleton_id,
        joint,
        channel,
        axis: params.axis,
    };
    let shape_key = scene
        .mesh_mut(mesh_id)?
        .shape_key_mut(key)
        .ok_or_else(|| CommandError::precondition(format!("Shape key '{key}' not found")))?;
    shape_key.slider_min = shape_key.slider_min.min(params.value_min);
    shape_key.slider_max = shape_key.slider_max.max(params.value_max);
    let driver = ShapeKeyDriver::new(variable, mapping);
    debug!("Driver expression for {}: {}", key, driver.expression);
    shape_key.driver = Some(driver);

    let message = format!(
        "Driver created: {} ({} {}) -> {}",
        joint_name,
        channel_label(channel),
        params.axis.label(),
        key
    );
    info!("{}", message);
    Ok(CommandOutcome::with_info(message))
}
