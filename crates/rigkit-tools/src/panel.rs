//! Context-sensitive tool panel
//!
//! The panel is a state machine keyed on the active object kind, its mode
//! and the selection shape. Each state maps to a fixed list of commands;
//! the info sections below the tools are plain data for the host to draw.

use rigkit_core::{ObjectKind, ObjectMode, ParentKind, Scene};

use crate::context::{ContextSnapshot, MeshParenting};
use crate::registry::{
    ADD_IK, ADD_JOINT_AT_SELECTION, ADD_LOCKED_TRACK, ADD_STRETCH_TO, ADD_TRACK_TO, ALIGN_CHAIN,
    ALIGN_TO_FACE, ARMATURE_JOINT_MAGNET, CHAIN_RENAME, CREATE_ARMATURE, DOCTOR,
    MESH_JOINT_MAGNET, PARENT_MESH_TO_JOINT, PARENT_MESHES_TO_NEAREST, SHAPE_KEY_DRIVER,
    STRAIGHTEN, VERTEX_JOINT_PICKER,
};

/// Number of selected pose joints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseSelection {
    None,
    One,
    Two,
    Many,
}

impl PoseSelection {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => PoseSelection::None,
            1 => PoseSelection::One,
            2 => PoseSelection::Two,
            _ => PoseSelection::Many,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    NoTools,
    MeshEditUnparented,
    MeshEditOnSkeleton,
    SkeletonEdit,
    /// Skeleton in object mode with meshes selected
    SkeletonObjectWithMeshes,
    SkeletonPose(PoseSelection),
}

impl PanelState {
    pub fn from_context(ctx: &ContextSnapshot) -> Self {
        if ctx.selected_objects == 0 {
            return PanelState::NoTools;
        }
        match (ctx.active_kind, ctx.mode) {
            (Some(ObjectKind::Mesh), ObjectMode::Edit) => match ctx.mesh_parenting {
                MeshParenting::None => PanelState::MeshEditUnparented,
                MeshParenting::Skeleton | MeshParenting::Joint => PanelState::MeshEditOnSkeleton,
                MeshParenting::OtherObject => PanelState::NoTools,
            },
            (Some(ObjectKind::Skeleton), ObjectMode::Edit) => PanelState::SkeletonEdit,
            (Some(ObjectKind::Skeleton), ObjectMode::Object) if ctx.selected_meshes > 0 => {
                PanelState::SkeletonObjectWithMeshes
            }
            (Some(ObjectKind::Skeleton), ObjectMode::Pose) => {
                PanelState::SkeletonPose(PoseSelection::from_count(ctx.selected_joints))
            }
            _ => PanelState::NoTools,
        }
    }

    pub fn capture(scene: &Scene) -> Self {
        Self::from_context(&ContextSnapshot::capture(scene))
    }

    pub fn title(&self) -> &'static str {
        match self {
            PanelState::NoTools => "No Tools Available",
            PanelState::MeshEditUnparented | PanelState::MeshEditOnSkeleton => {
                "Mesh Rigging Tools"
            }
            PanelState::SkeletonEdit => "Armature Rigging Tools",
            PanelState::SkeletonObjectWithMeshes => "Armature Object Rigging Tools",
            PanelState::SkeletonPose(_) => "Armature Pose Rigging Tools",
        }
    }

    /// Command ids shown for this state, in display order
    pub fn commands(&self) -> &'static [&'static str] {
        const CONSTRAINTS: &[&str] = &[
            DOCTOR,
            CHAIN_RENAME,
            SHAPE_KEY_DRIVER,
            ADD_IK,
            ADD_TRACK_TO,
            ADD_STRETCH_TO,
            ADD_LOCKED_TRACK,
        ];
        match self {
            PanelState::NoTools => &[],
            PanelState::MeshEditUnparented => &[CREATE_ARMATURE],
            PanelState::MeshEditOnSkeleton => &[
                MESH_JOINT_MAGNET,
                VERTEX_JOINT_PICKER,
                ADD_JOINT_AT_SELECTION,
            ],
            PanelState::SkeletonEdit => &[
                CHAIN_RENAME,
                ARMATURE_JOINT_MAGNET,
                STRAIGHTEN,
                ALIGN_TO_FACE,
                ALIGN_CHAIN,
            ],
            PanelState::SkeletonObjectWithMeshes => &[PARENT_MESHES_TO_NEAREST],
            PanelState::SkeletonPose(PoseSelection::None) => &[DOCTOR],
            PanelState::SkeletonPose(PoseSelection::One | PoseSelection::Two) => CONSTRAINTS,
            PanelState::SkeletonPose(PoseSelection::Many) => &[DOCTOR, CHAIN_RENAME, SHAPE_KEY_DRIVER],
        }
    }
}

// ============== Info Sections ==============

/// IK summary of the active pose joint
#[derive(Debug, Clone, PartialEq)]
pub struct IkSummary {
    pub target: Option<String>,
    pub pole_target: Option<String>,
    pub chain_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelSection {
    /// Unparented mesh, offers armature creation
    CreateParent { mesh: String, command: &'static str },
    /// Mesh rigidly parented to a joint
    JointParent {
        mesh: String,
        label: String,
        command: &'static str,
    },
    Armature {
        heading: String,
        show_names: bool,
        in_front: bool,
    },
    ActiveJoint {
        name: String,
        deform: bool,
        connected: bool,
    },
    ActivePoseJoint {
        name: String,
        ik: Option<IkSummary>,
        has_custom_shape: bool,
    },
    VertexGroups { names: Vec<String> },
}

/// "Object" or "Object:Joint" for a constraint target
fn target_label(scene: &Scene, target: &rigkit_core::TargetRef) -> String {
    let object = scene.object_name(target.object).unwrap_or_default();
    match target
        .joint
        .and_then(|j| scene.skeleton(target.object).ok()?.joint_name(j))
    {
        Some(joint) => format!("{object}:{joint}"),
        None => object.to_string(),
    }
}

/// Info sections for the current active object, top to bottom
pub fn panel_sections(scene: &Scene) -> Vec<PanelSection> {
    let mut sections = Vec::new();
    if scene.selected_objects().is_empty() {
        return sections;
    }
    let Some(active) = scene.active_object() else {
        return sections;
    };
    let parent_skeleton = active
        .parent
        .filter(|p| scene.object(p.object).is_some_and(|o| o.kind() == ObjectKind::Skeleton));

    if active.kind() == ObjectKind::Mesh {
        match active.parent {
            None => sections.push(PanelSection::CreateParent {
                mesh: active.name.clone(),
                command: CREATE_ARMATURE,
            }),
            Some(relation) => {
                if let (Some(skeleton), ParentKind::Joint(joint)) = (parent_skeleton, relation.kind)
                {
                    let armature = scene.object_name(skeleton.object).unwrap_or_default();
                    let joint = scene
                        .skeleton(skeleton.object)
                        .ok()
                        .and_then(|s| s.joint_name(joint))
                        .unwrap_or_default();
                    sections.push(PanelSection::JointParent {
                        mesh: active.name.clone(),
                        label: format!("Parent Bone: {armature} - {joint}"),
                        command: PARENT_MESH_TO_JOINT,
                    });
                }
            }
        }
    }

    let armature = if active.kind() == ObjectKind::Skeleton {
        Some((active, "Active Armature"))
    } else {
        parent_skeleton
            .and_then(|p| scene.object(p.object))
            .map(|o| (o, "Parent Armature"))
    };
    if let Some((object, heading)) = armature {
        sections.push(PanelSection::Armature {
            heading: format!("{heading}: {}", object.name),
            show_names: object.display.show_names,
            in_front: object.display.in_front,
        });
    }

    if let Some(skeleton) = active.as_skeleton()
        && let Some(joint) = skeleton.active_joint()
    {
        sections.push(PanelSection::ActiveJoint {
            name: joint.name.clone(),
            deform: joint.deform,
            connected: joint.connected,
        });
        if active.mode == ObjectMode::Pose && !skeleton.selected_joints().is_empty() {
            let ik = joint
                .ik_constraint()
                .and_then(|c| c.as_ik())
                .map(|ik| IkSummary {
                    target: ik.target.map(|t| target_label(scene, &t)),
                    pole_target: ik.pole_target.map(|t| target_label(scene, &t)),
                    chain_count: ik.chain_count,
                });
            sections.push(PanelSection::ActivePoseJoint {
                name: joint.name.clone(),
                ik,
                has_custom_shape: joint.pose.custom_shape.is_some(),
            });
        }
    }

    if let Some(mesh) = active.as_mesh()
        && matches!(active.mode, ObjectMode::Edit | ObjectMode::WeightPaint)
    {
        sections.push(PanelSection::VertexGroups {
            names: mesh.vertex_groups.iter().map(|g| g.name.clone()).collect(),
        });
    }
    sections
}
