//! Shared fixtures for the workflow tests: an emulated project populated
//! with documents shaped the way the pipeline itself would have built them.

use scenedoc::{ConstraintKind, Document, InMemoryDocument, NodeSnapshot};

use stagehand::asset::{ASSET_NODE_NAME, ASSET_TYPE_ATTR};
use stagehand::dialog::ScriptedDialogs;
use stagehand::pipeline_session::PipelineSession;
use stagehand::settings::InMemorySettings;

pub const PROJECT_ROOT: &str = "/project";
pub const PRESETS_DIR: &str = "/app/presets";

pub const ROCK_MESH_PATH: &str = "/project/scenes/Props/Rock/Rock_MSH.ma";
pub const HERO_MESH_PATH: &str = "/project/scenes/Characters/Hero/Hero_MSH.ma";
pub const HERO_SKINNED_MESH_PATH: &str = "/project/scenes/Characters/Hero/Hero_SKM.ma";
pub const HERO_RIG_PATH: &str = "/project/scenes/Characters/Hero/Hero_RIG.ma";
pub const HERO_WALK_PATH: &str = "/project/scenes/Characters/Hero/Animations/Hero@Walk.ma";

/// The emulated project a test runs against. The backend and dialog handles
/// share state with the session, so a test can script prompts and inspect
/// stored documents while the session drives the workflows.
pub struct PipelineHarness {
    pub backend: InMemoryDocument,
    pub dialogs: ScriptedDialogs,
    pub session: PipelineSession,
}

/// A harness over an empty project. `export_root` may be empty, which
/// leaves exporting unconfigured.
pub fn harness(export_root: &str) -> PipelineHarness {
    let _ = env_logger::try_init();

    let mut backend = InMemoryDocument::new();
    backend.set_project_root(PROJECT_ROOT);

    let dialogs = ScriptedDialogs::new();
    let session = PipelineSession::new(
        Document::new(backend.clone()),
        dialogs.clone(),
        InMemorySettings::with_export_root(export_root),
        PRESETS_DIR,
    );

    PipelineHarness {
        backend,
        dialogs,
        session,
    }
}

fn asset_node(type_label: &str) -> NodeSnapshot {
    NodeSnapshot::transform(ASSET_NODE_NAME).attribute(ASSET_TYPE_ATTR, type_label, true)
}

/// A saved mesh asset: the locked, tagged asset node wrapping its geometry.
pub fn mesh_document(geometry: &str) -> Vec<NodeSnapshot> {
    vec![asset_node("Mesh")
        .children([NodeSnapshot::transform(geometry)])
        .locked()]
}

/// A saved skeleton asset over a small joint hierarchy.
pub fn skeleton_document() -> Vec<NodeSnapshot> {
    vec![asset_node("Skeleton")
        .children([NodeSnapshot::joint("Root")
            .children([NodeSnapshot::joint("Hips").children([NodeSnapshot::joint("Spine")])])])
        .locked()]
}

/// A saved skinned mesh, shaped the way its creation left it: the imported
/// mesh and skeleton renamed to their type labels under the asset node.
pub fn skinned_mesh_document() -> Vec<NodeSnapshot> {
    vec![asset_node("SkinnedMesh")
        .children([labeled_mesh(), labeled_skeleton(Vec::new())])
        .locked()]
}

/// A saved rig, shaped the way its creation left it: the asset node
/// unlocked, the imported skinned mesh beneath it, and the rig's control
/// constraints living on the joints.
pub fn rig_document() -> Vec<NodeSnapshot> {
    let skinned_mesh = NodeSnapshot::transform("SkinnedMesh")
        .attribute(ASSET_TYPE_ATTR, "SkinnedMesh", true)
        .children([
            labeled_mesh(),
            labeled_skeleton(vec![
                NodeSnapshot::constraint("Hips_parentConstraint1", ConstraintKind::Parent),
                NodeSnapshot::constraint("Hips_orientConstraint1", ConstraintKind::Orient),
            ]),
        ])
        .locked();

    vec![asset_node("Rig").children([skinned_mesh, NodeSnapshot::transform("Controls")])]
}

/// A rig whose skinned mesh lost its skeleton, for exercising the export
/// guard rails.
pub fn rig_without_skeleton_document() -> Vec<NodeSnapshot> {
    let skinned_mesh = NodeSnapshot::transform("SkinnedMesh")
        .attribute(ASSET_TYPE_ATTR, "SkinnedMesh", true)
        .children([labeled_mesh()])
        .locked();

    vec![asset_node("Rig").children([skinned_mesh])]
}

/// A saved animation, shaped the way its creation left it: the referenced
/// rig's root attached under the locked asset node.
pub fn animation_document() -> Vec<NodeSnapshot> {
    animation_document_over(rig_document())
}

/// An animation document built over an arbitrary rig document's nodes.
pub fn animation_document_over(mut rig_roots: Vec<NodeSnapshot>) -> Vec<NodeSnapshot> {
    let rig = rig_roots.remove(0).referenced("Hero_RIG");
    vec![asset_node("Animation").children([rig]).locked()]
}

fn labeled_mesh() -> NodeSnapshot {
    NodeSnapshot::transform("Mesh")
        .attribute(ASSET_TYPE_ATTR, "Mesh", true)
        .children([NodeSnapshot::transform("HeroShape")])
        .locked()
}

fn labeled_skeleton(extra_hips_children: Vec<NodeSnapshot>) -> NodeSnapshot {
    let mut hips_children = vec![NodeSnapshot::joint("Spine")];
    hips_children.extend(extra_hips_children);

    NodeSnapshot::transform("Skeleton")
        .attribute(ASSET_TYPE_ATTR, "Skeleton", true)
        .children([
            NodeSnapshot::joint("Root").children([NodeSnapshot::joint("Hips").children(hips_children)])
        ])
        .locked()
}
