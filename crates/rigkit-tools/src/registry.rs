//! Static command registry
//!
//! Each entry describes one invokable command: identifier, label, tooltip,
//! the parameters its dialog shows and the predicate deciding when it may run.

use rigkit_core::{ObjectKind, ObjectMode};

use crate::context::{ContextSnapshot, MeshParenting};

// ============== Command Identifiers ==============

pub const ADD_IK: &str = "rig.add_ik";
pub const ADD_STRETCH_TO: &str = "rig.add_stretch_to";
pub const ADD_LOCKED_TRACK: &str = "rig.add_locked_track";
pub const ADD_TRACK_TO: &str = "rig.add_track_to";
pub const MESH_JOINT_MAGNET: &str = "rig.mesh_joint_magnet";
pub const ARMATURE_JOINT_MAGNET: &str = "rig.armature_joint_magnet";
pub const CHAIN_RENAME: &str = "rig.chain_rename";
pub const ALIGN_TO_FACE: &str = "rig.align_to_face";
pub const ALIGN_CHAIN: &str = "rig.align_chain";
pub const STRAIGHTEN: &str = "rig.straighten";
pub const DOCTOR: &str = "rig.doctor";
pub const CREATE_ARMATURE: &str = "rig.create_armature";
pub const ADD_JOINT_AT_SELECTION: &str = "rig.add_joint_at_selection";
pub const VERTEX_JOINT_PICKER: &str = "rig.vertex_joint_picker";
pub const PARENT_MESHES_TO_NEAREST: &str = "rig.parent_meshes_to_nearest";
pub const PARENT_MESH_TO_JOINT: &str = "rig.parent_mesh_to_joint";
pub const SHAPE_KEY_DRIVER: &str = "rig.shape_key_driver";

// ============== Parameter Specs ==============

/// Type, default and bounds of a dialog parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    Int { default: i32, min: i32, max: i32 },
    Float { default: f32, min: f32, max: f32 },
    Bool { default: bool },
    Enum {
        options: &'static [&'static str],
        default: &'static str,
    },
    Text { default: &'static str },
    /// Object or joint picked in the scene
    ObjectRef,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: ParamKind,
}

const fn int(name: &'static str, label: &'static str, default: i32, min: i32, max: i32) -> ParamSpec {
    ParamSpec {
        name,
        label,
        kind: ParamKind::Int { default, min, max },
    }
}

const fn float(
    name: &'static str,
    label: &'static str,
    default: f32,
    min: f32,
    max: f32,
) -> ParamSpec {
    ParamSpec {
        name,
        label,
        kind: ParamKind::Float { default, min, max },
    }
}

const fn flag(name: &'static str, label: &'static str, default: bool) -> ParamSpec {
    ParamSpec {
        name,
        label,
        kind: ParamKind::Bool { default },
    }
}

const fn choice(
    name: &'static str,
    label: &'static str,
    options: &'static [&'static str],
    default: &'static str,
) -> ParamSpec {
    ParamSpec {
        name,
        label,
        kind: ParamKind::Enum { options, default },
    }
}

const fn text(name: &'static str, label: &'static str, default: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        label,
        kind: ParamKind::Text { default },
    }
}

const fn object_ref(name: &'static str, label: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        label,
        kind: ParamKind::ObjectRef,
    }
}

const AXES: &[&str] = &["X", "Y", "Z"];
const SIGNED_AXES: &[&str] = &["+X", "-X", "+Y", "-Y", "+Z", "-Z"];
const TRACK_AXES: &[&str] = &["+X", "+Y", "+Z", "-X", "-Y", "-Z"];
const SPACES: &[&str] = &["World", "Custom", "Pose", "LocalWithParent", "Local"];
const INFLUENCE: ParamSpec = float("influence", "Influence", 1.0, 0.0, 1.0);
const TARGET: ParamSpec = object_ref("target", "Target");

const IK_PARAMS: &[ParamSpec] = &[
    TARGET,
    object_ref("pole_target", "Pole Target"),
    float("pole_angle", "Pole Angle", 0.0, -180.0, 180.0),
    int("chain_count", "Chain Length", 2, 0, 255),
    int("iterations", "Iterations", 500, 1, 10000),
    flag("use_tail", "Use Tail", true),
    flag("use_stretch", "Stretch", false),
    flag("use_location", "Location", true),
    flag("use_rotation", "Rotation", false),
    float("weight", "Weight Position", 1.0, 0.01, 1.0),
    float("orient_weight", "Weight Rotation", 0.0, 0.0, 1.0),
    INFLUENCE,
];

const STRETCH_TO_PARAMS: &[ParamSpec] = &[
    TARGET,
    float("rest_length", "Rest Length", 0.0, 0.0, 100.0),
    float("bulge", "Volume Variation", 1.0, 0.0, 100.0),
    flag("use_bulge_min", "Volume Min", false),
    flag("use_bulge_max", "Volume Max", false),
    float("bulge_min", "Min", 1.0, 0.0, 1.0),
    float("bulge_max", "Max", 1.0, 1.0, 100.0),
    float("bulge_smooth", "Smooth", 0.0, 0.0, 1.0),
    choice("volume", "Volume", &["XZ", "X", "Z", "None"], "XZ"),
    choice("keep_axis", "Keep Axis", &["PlaneX", "PlaneZ", "SwingY"], "SwingY"),
    INFLUENCE,
];

const LOCKED_TRACK_PARAMS: &[ParamSpec] = &[
    TARGET,
    choice("track_axis", "Track Axis", TRACK_AXES, "+Y"),
    choice("lock_axis", "Lock Axis", AXES, "Z"),
    INFLUENCE,
];

const TRACK_TO_PARAMS: &[ParamSpec] = &[
    TARGET,
    choice("track_axis", "Track Axis", TRACK_AXES, "+Y"),
    choice("up_axis", "Up Axis", AXES, "Z"),
    flag("use_target_z", "Target Z", false),
    choice("target_space", "Target Space", SPACES, "World"),
    choice("owner_space", "Owner Space", SPACES, "World"),
    object_ref("space_target", "Custom Space"),
    INFLUENCE,
];

const MAGNET_PARAMS: &[ParamSpec] = &[
    object_ref("joint_end", "Snap To"),
    flag("move_tail_with_head", "Move Tail With Head", false),
];

const CHAIN_RENAME_PARAMS: &[ParamSpec] = &[
    text("base_name", "Base Name", "Bone"),
    choice(
        "side",
        "Side",
        &["L", "R", "Top", "Bot", "Fr", "Bk", "None"],
        "L",
    ),
    choice("role", "Type", &["DEF", "CTRL", "MCH", "None"], "DEF"),
    flag("rename_ik_targets", "Rename IK Targets", false),
];

const ALIGN_TO_FACE_PARAMS: &[ParamSpec] = &[
    flag("flip_direction", "Flip Direction", false),
    flag("move_to_face", "Move To Face", true),
    flag("align_to_edge", "Align Roll To Active Edge", false),
    choice("edge_axis", "Edge Axis", &["X", "Z"], "X"),
    flag("flip_roll", "Flip Roll", false),
    flag("move_selected", "Move Other Selected Bones", true),
];

const ALIGN_CHAIN_PARAMS: &[ParamSpec] = &[
    flag("copy_roll", "Copy Roll", false),
    flag("copy_length", "Copy Length", false),
];

const STRAIGHTEN_PARAMS: &[ParamSpec] = &[
    choice("axis", "Axis", SIGNED_AXES, "+Y"),
    float("length", "Length", 1.0, 0.0, 1000.0),
];

const DOCTOR_PARAMS: &[ParamSpec] = &[
    flag("disable_deform_on_ik_targets", "Disable Deform On IK Targets", true),
    flag("disable_deform_on_unprefixed", "Disable Deform On Non-DEF Bones", true),
    flag("enable_deform_on_prefixed", "Enable Deform On DEF Bones", true),
    flag("move_deform_to_group", "Move DEF Bones To Collection", true),
    flag("move_mechanism_to_group", "Move MCH Bones To Collection", true),
    flag("move_control_to_group", "Move CTRL Bones To Collection", true),
    flag("clean_symmetry_names", "Clean Symmetry Names", true),
    flag("apply_transforms", "Apply Armature Transforms", true),
    flag("generate_report", "Generate Report", true),
];

const CREATE_ARMATURE_PARAMS: &[ParamSpec] = &[
    int("joint_count", "Number of Bones", 1, 1, 100),
    choice(
        "parent_scheme",
        "Parent Type",
        &["Joint", "Skinned", "Object"],
        "Skinned",
    ),
];

const ADD_JOINT_PARAMS: &[ParamSpec] = &[
    text("name", "Bone Name", "Bone"),
    choice("direction", "Direction", SIGNED_AXES, "+Z"),
    float("length", "Length", 1.0, 0.0, 1000.0),
    flag("deform", "Deform", true),
];

const PICKER_PARAMS: &[ParamSpec] = &[
    object_ref("joint", "Pick Bone"),
    flag("replace_all", "Replace All Assignments", true),
    flag("deform_only", "Only Show Deform Bones", true),
];

const NEAREST_PARAMS: &[ParamSpec] = &[
    choice("joint_point", "Bone Point", &["Head", "Tail", "Center"], "Center"),
    flag("deform_only", "Only Deform Bones", true),
    flag("replace_parent", "Replace Existing Parent", false),
];

const PARENT_TO_JOINT_PARAMS: &[ParamSpec] = &[
    object_ref("skeleton", "Armature"),
    object_ref("joint", "Bone"),
];

const DRIVER_PARAMS: &[ParamSpec] = &[
    object_ref("target_mesh", "Target Mesh"),
    object_ref("shape_key", "Shape Key"),
    choice("channel", "Control Transform", &["Location", "Rotation", "Scale"], "Location"),
    choice("axis", "Control Axis", AXES, "X"),
    float("range_start", "Range Start", 0.0, -10.0, 10.0),
    float("range_end", "Range End", 1.0, -10.0, 10.0),
    float("value_min", "Shape Key Min", 0.0, -1.0, 1.0),
    float("value_max", "Shape Key Max", 1.0, -1.0, 1.0),
    flag("lock_to_axis", "Lock to Axis", true),
    flag("constrain_to_range", "Constrain to Range", true),
    text("group", "Bone Collection", "CTL"),
];

// ============== Predicates ==============

fn one_or_two_pose_joints(ctx: &ContextSnapshot) -> bool {
    ctx.is_skeleton_pose()
        && ctx.has_active_joint
        && (1..=2).contains(&ctx.selected_joints)
}

fn mesh_edit_on_skeleton(ctx: &ContextSnapshot) -> bool {
    ctx.is_mesh_edit_on_skeleton()
}

fn skeleton_edit(ctx: &ContextSnapshot) -> bool {
    ctx.is_skeleton_edit()
}

fn joints_selected(ctx: &ContextSnapshot) -> bool {
    (ctx.is_skeleton_edit() || ctx.is_skeleton_pose()) && ctx.selected_joints > 0
}

fn skeleton_and_mesh(ctx: &ContextSnapshot) -> bool {
    ctx.is_skeleton_edit() && ctx.selected_skeletons == 1 && ctx.selected_meshes == 1
}

fn single_edit_joint(ctx: &ContextSnapshot) -> bool {
    ctx.is_skeleton_edit() && ctx.selected_joints == 1
}

fn edit_joints_selected(ctx: &ContextSnapshot) -> bool {
    ctx.is_skeleton_edit() && ctx.selected_joints > 0
}

fn active_skeleton(ctx: &ContextSnapshot) -> bool {
    ctx.active_kind == Some(ObjectKind::Skeleton)
}

fn unparented_mesh(ctx: &ContextSnapshot) -> bool {
    ctx.active_kind == Some(ObjectKind::Mesh) && ctx.mesh_parenting == MeshParenting::None
}

fn skeleton_with_meshes(ctx: &ContextSnapshot) -> bool {
    ctx.is_active(ObjectKind::Skeleton, ObjectMode::Object) && ctx.selected_meshes > 0
}

fn single_mesh(ctx: &ContextSnapshot) -> bool {
    ctx.selected_meshes == 1
}

fn pose_joint_selected(ctx: &ContextSnapshot) -> bool {
    ctx.is_skeleton_pose() && ctx.selected_joints > 0
}

// ============== Registry ==============

/// One invokable command
#[derive(Debug, Clone, Copy)]
pub struct CommandDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    pub poll: fn(&ContextSnapshot) -> bool,
}

impl CommandDescriptor {
    pub fn can_run(&self, ctx: &ContextSnapshot) -> bool {
        (self.poll)(ctx)
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }
}

static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor {
        id: ADD_IK,
        label: "Add IK",
        description: "Add an inverse kinematics constraint to the active bone",
        params: IK_PARAMS,
        poll: one_or_two_pose_joints,
    },
    CommandDescriptor {
        id: ADD_STRETCH_TO,
        label: "Add Stretch To",
        description: "Add a stretch-to constraint to the active bone",
        params: STRETCH_TO_PARAMS,
        poll: one_or_two_pose_joints,
    },
    CommandDescriptor {
        id: ADD_LOCKED_TRACK,
        label: "Add Locked Track",
        description: "Add a locked-track constraint to the active bone",
        params: LOCKED_TRACK_PARAMS,
        poll: one_or_two_pose_joints,
    },
    CommandDescriptor {
        id: ADD_TRACK_TO,
        label: "Add Track To",
        description: "Add a track-to constraint to the active bone",
        params: TRACK_TO_PARAMS,
        poll: one_or_two_pose_joints,
    },
    CommandDescriptor {
        id: MESH_JOINT_MAGNET,
        label: "Snap Bone To Vertices",
        description: "Move a bone head or tail to the selected vertices",
        params: MAGNET_PARAMS,
        poll: mesh_edit_on_skeleton,
    },
    CommandDescriptor {
        id: ARMATURE_JOINT_MAGNET,
        label: "Snap Bone To Selected Joints",
        description: "Move a bone head or tail to the selected bone joints",
        params: MAGNET_PARAMS,
        poll: skeleton_edit,
    },
    CommandDescriptor {
        id: CHAIN_RENAME,
        label: "Rename Bone Chain",
        description: "Rename a parent-child chain of bones with numbered names",
        params: CHAIN_RENAME_PARAMS,
        poll: joints_selected,
    },
    CommandDescriptor {
        id: ALIGN_TO_FACE,
        label: "Align Bone To Face",
        description: "Point the active bone along the selected faces' normal",
        params: ALIGN_TO_FACE_PARAMS,
        poll: skeleton_and_mesh,
    },
    CommandDescriptor {
        id: ALIGN_CHAIN,
        label: "Align Bone Chain",
        description: "Point every connected child along the selected bone",
        params: ALIGN_CHAIN_PARAMS,
        poll: single_edit_joint,
    },
    CommandDescriptor {
        id: STRAIGHTEN,
        label: "Straighten Bones",
        description: "Point the selected bones along a world axis",
        params: STRAIGHTEN_PARAMS,
        poll: edit_joints_selected,
    },
    CommandDescriptor {
        id: DOCTOR,
        label: "Bone Doctor",
        description: "Fix deform flags, collections and names, and report rig problems",
        params: DOCTOR_PARAMS,
        poll: active_skeleton,
    },
    CommandDescriptor {
        id: CREATE_ARMATURE,
        label: "Add Armature To Mesh",
        description: "Create an armature at the selection center and parent the mesh to it",
        params: CREATE_ARMATURE_PARAMS,
        poll: unparented_mesh,
    },
    CommandDescriptor {
        id: ADD_JOINT_AT_SELECTION,
        label: "Add Bone At Selection",
        description: "Add a bone to the parent armature at the selected vertices",
        params: ADD_JOINT_PARAMS,
        poll: mesh_edit_on_skeleton,
    },
    CommandDescriptor {
        id: VERTEX_JOINT_PICKER,
        label: "Vertex Bone Assignment",
        description: "Assign selected vertices to a bone's vertex group",
        params: PICKER_PARAMS,
        poll: mesh_edit_on_skeleton,
    },
    CommandDescriptor {
        id: PARENT_MESHES_TO_NEAREST,
        label: "Parent Meshes To Nearest Bones",
        description: "Parent each selected mesh to the closest bone",
        params: NEAREST_PARAMS,
        poll: skeleton_with_meshes,
    },
    CommandDescriptor {
        id: PARENT_MESH_TO_JOINT,
        label: "Parent Mesh To Bone",
        description: "Parent the selected mesh to a chosen bone",
        params: PARENT_TO_JOINT_PARAMS,
        poll: single_mesh,
    },
    CommandDescriptor {
        id: SHAPE_KEY_DRIVER,
        label: "Create Widget Driver",
        description: "Create a shape key driver controlled by bone movement",
        params: DRIVER_PARAMS,
        poll: pose_joint_selected,
    },
];

/// Every registered command
pub fn commands() -> &'static [CommandDescriptor] {
    COMMANDS
}

pub fn find_command(id: &str) -> Option<&'static CommandDescriptor> {
    COMMANDS.iter().find(|c| c.id == id)
}

/// Commands whose predicate accepts `ctx`
pub fn available_commands(ctx: &ContextSnapshot) -> Vec<&'static CommandDescriptor> {
    COMMANDS.iter().filter(|c| c.can_run(ctx)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{add_quad_mesh, arm_scene, select_joints};
    use rigkit_core::Scene;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_and_findable() {
        let ids: HashSet<_> = commands().iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), commands().len());
        assert_eq!(commands().len(), 17);
        for id in ids {
            assert_eq!(find_command(id).map(|c| c.id), Some(id));
        }
        assert!(find_command("rig.unknown").is_none());
    }

    #[test]
    fn test_param_defaults() {
        let rename = find_command(CHAIN_RENAME).unwrap();
        assert_eq!(
            rename.param("base_name").map(|p| p.kind),
            Some(ParamKind::Text { default: "Bone" })
        );
        let armature = find_command(CREATE_ARMATURE).unwrap();
        assert_eq!(
            armature.param("joint_count").map(|p| p.kind),
            Some(ParamKind::Int {
                default: 1,
                min: 1,
                max: 100
            })
        );
        for command in commands() {
            for spec in command.params {
                if let ParamKind::Enum { options, default } = spec.kind {
                    assert!(options.contains(&default), "{}.{}", command.id, spec.name);
                }
            }
        }
    }

    #[test]
    fn test_pose_predicates() {
        let (mut scene, skeleton, [shoulder, elbow, hand]) = arm_scene();
        let ctx = ContextSnapshot::capture(&scene);
        assert!(!find_command(ADD_IK).unwrap().can_run(&ctx));
        assert!(find_command(CHAIN_RENAME).unwrap().can_run(&ctx));
        assert!(find_command(SHAPE_KEY_DRIVER).unwrap().can_run(&ctx));

        select_joints(&mut scene, skeleton, &[elbow, hand]);
        let ctx = ContextSnapshot::capture(&scene);
        assert!(find_command(ADD_IK).unwrap().can_run(&ctx));
        assert!(find_command(ADD_TRACK_TO).unwrap().can_run(&ctx));
        assert!(!find_command(ALIGN_CHAIN).unwrap().can_run(&ctx));

        scene.get_object_mut(skeleton).unwrap().mode = ObjectMode::Edit;
        select_joints(&mut scene, skeleton, &[shoulder]);
        let ctx = ContextSnapshot::capture(&scene);
        let ids: Vec<_> = available_commands(&ctx).iter().map(|c| c.id).collect();
        assert!(ids.contains(&ALIGN_CHAIN));
        assert!(ids.contains(&STRAIGHTEN));
        assert!(ids.contains(&ARMATURE_JOINT_MAGNET));
        assert!(!ids.contains(&ADD_IK));
    }

    #[test]
    fn test_constraints_need_active_joint() {
        let (mut scene, skeleton, [_, elbow, hand]) = arm_scene();
        select_joints(&mut scene, skeleton, &[elbow, hand]);
        scene.skeleton_mut(skeleton).unwrap().active = None;
        let ctx = ContextSnapshot::capture(&scene);
        assert!(!ctx.has_active_joint);
        for id in [ADD_IK, ADD_STRETCH_TO, ADD_LOCKED_TRACK, ADD_TRACK_TO] {
            assert!(!find_command(id).unwrap().can_run(&ctx), "{id}");
        }
    }

    #[test]
    fn test_mesh_predicates() {
        let mut scene = Scene::default();
        let mesh = add_quad_mesh(&mut scene, "Body");
        scene.set_active(mesh).unwrap();
        let ctx = ContextSnapshot::capture(&scene);
        assert!(find_command(CREATE_ARMATURE).unwrap().can_run(&ctx));
        assert!(find_command(PARENT_MESH_TO_JOINT).unwrap().can_run(&ctx));
        assert!(!find_command(VERTEX_JOINT_PICKER).unwrap().can_run(&ctx));
        assert!(available_commands(&ContextSnapshot::capture(&Scene::default())).is_empty());
    }
}
