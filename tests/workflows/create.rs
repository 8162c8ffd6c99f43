//! End-to-end runs of the asset creation workflow against the emulated
//! project, from the first prompt to the saved document.

use std::path::{Path, PathBuf};

use maplit::btreemap;
use pretty_assertions::assert_eq;
use scenedoc::{AttrValue, Attribute, NodeSnapshot};

use stagehand::asset::{AssetType, ASSET_NODE_NAME, ASSET_TYPE_ATTR, IMPORT_NAMESPACE};
use stagehand::create::{create_asset, CreateOutcome, NewAssetRequest};
use stagehand::dialog::{Answer, SaveChoice};
use stagehand::error::Error;

use crate::support;

fn request(asset_type: AssetType, name: &str, parent_folder: &str) -> NewAssetRequest {
    NewAssetRequest {
        asset_type,
        name: name.to_owned(),
        parent_folder: parent_folder.to_owned(),
    }
}

fn child_names(node: &NodeSnapshot) -> Vec<&str> {
    node.children.iter().map(|child| child.name.as_str()).collect()
}

#[test]
fn a_mesh_is_created_in_its_own_folder_under_the_parent() {
    let mut harness = support::harness("");
    harness.dialogs.push_save_choice(SaveChoice::DontSave);
    harness.dialogs.push_answer(Answer::Yes); // static mesh?

    let outcome = create_asset(&mut harness.session, &request(AssetType::Mesh, "Rock", "Props"))
        .unwrap();

    assert_eq!(
        outcome,
        CreateOutcome::Created {
            path: PathBuf::from(support::ROCK_MESH_PATH),
        }
    );
    assert_eq!(
        harness.session.document().current_path(),
        Some(PathBuf::from(support::ROCK_MESH_PATH))
    );

    let roots = harness.backend.snapshot_saved(support::ROCK_MESH_PATH).unwrap();
    assert_eq!(roots.len(), 1);

    let asset = &roots[0];
    assert_eq!(asset.name, ASSET_NODE_NAME);
    assert!(asset.locked, "mesh asset nodes are locked after creation");
    assert_eq!(
        asset.attributes,
        btreemap! {
            ASSET_TYPE_ATTR.to_owned() => Attribute {
                value: AttrValue::String("Mesh".to_owned()),
                locked: true,
            },
            "static".to_owned() => Attribute {
                value: AttrValue::Bool(true),
                locked: true,
            },
        }
    );

    assert_eq!(
        harness.dialogs.prompts(),
        ["Save changes to untitled document?", "Will this be a static mesh?"]
    );
}

#[test]
fn a_skeleton_references_the_currently_opened_mesh() {
    let mut harness = support::harness("");
    harness
        .backend
        .load_document(support::ROCK_MESH_PATH, support::mesh_document("RockShape"));
    harness
        .session
        .document()
        .open(support::ROCK_MESH_PATH, true)
        .unwrap();

    harness.dialogs.push_answer(Answer::Yes); // reference the open mesh?

    let outcome = create_asset(
        &mut harness.session,
        &request(AssetType::Skeleton, "Rock", "Props"),
    )
    .unwrap();

    let skeleton_path = "/project/scenes/Props/Rock/Rock_SKL.ma";
    assert_eq!(
        outcome,
        CreateOutcome::Created {
            path: PathBuf::from(skeleton_path),
        }
    );

    let roots = harness.backend.snapshot_saved(skeleton_path).unwrap();
    assert_eq!(roots.len(), 1);

    let asset = &roots[0];
    assert!(asset.locked);
    assert_eq!(asset.children.len(), 1);

    // The referenced mesh root hangs under the asset node, still in its
    // reference namespace and still locked.
    let referenced = &asset.children[0];
    assert_eq!(referenced.name, ASSET_NODE_NAME);
    assert_eq!(referenced.namespace.as_deref(), Some("Rock_MSH"));
    assert_eq!(referenced.reference_namespace.as_deref(), Some("Rock_MSH"));
    assert!(referenced.locked);

    // The mesh document was open and titled, so there was no save prompt.
    assert_eq!(
        harness.dialogs.prompts(),
        ["Do you want to Reference the currently opened Mesh?"]
    );
}

#[test]
fn a_rig_imports_its_skinned_mesh_and_stays_unlocked() {
    let mut harness = support::harness("");
    harness.backend.load_document(
        support::HERO_SKINNED_MESH_PATH,
        support::skinned_mesh_document(),
    );

    harness.dialogs.push_save_choice(SaveChoice::DontSave);
    harness.dialogs.push_answer(Answer::Yes); // import a skinned mesh?
    harness
        .dialogs
        .push_file(Some(PathBuf::from(support::HERO_SKINNED_MESH_PATH)));

    let outcome = create_asset(&mut harness.session, &request(AssetType::Rig, "Hero", "Characters"))
        .unwrap();

    assert_eq!(
        outcome,
        CreateOutcome::Created {
            path: PathBuf::from(support::HERO_RIG_PATH),
        }
    );

    let roots = harness.backend.snapshot_saved(support::HERO_RIG_PATH).unwrap();
    assert_eq!(roots.len(), 1);

    let asset = &roots[0];
    assert!(
        !asset.locked,
        "rig asset nodes stay unlocked so exports can pull the skeleton out"
    );
    assert_eq!(child_names(asset), ["SkinnedMesh"]);

    // The imported subtree was renamed to its type label, relocked, and
    // pulled out of the staging namespace.
    let skinned_mesh = &asset.children[0];
    assert!(skinned_mesh.locked);
    assert_eq!(skinned_mesh.namespace, None);
    assert_eq!(child_names(skinned_mesh), ["Mesh", "Skeleton"]);

    assert!(!harness
        .session
        .document()
        .namespace_exists(IMPORT_NAMESPACE)
        .unwrap());

    // The temporary asset-node document was cleaned up after the import.
    let temp_path = PathBuf::from("/project/scenes/Characters/Hero/Hero_SKM_AssetNode.ma");
    assert!(!harness.backend.saved_paths().contains(&temp_path));

    assert_eq!(
        harness.dialogs.prompts(),
        [
            "Save changes to untitled document?",
            "Do you want to Import a SkinnedMesh?",
            "Select SkinnedMesh file",
        ]
    );
}

#[test]
fn a_skinned_mesh_imports_both_of_its_dependencies() {
    let skeleton_path = "/project/scenes/Characters/Hero/Hero_SKL.ma";

    let mut harness = support::harness("");
    harness
        .backend
        .load_document(support::HERO_MESH_PATH, support::mesh_document("HeroShape"));
    harness
        .backend
        .load_document(skeleton_path, support::skeleton_document());
    harness
        .session
        .document()
        .open(support::HERO_MESH_PATH, true)
        .unwrap();

    harness.dialogs.push_answer(Answer::Yes); // import the open mesh?
    harness.dialogs.push_answer(Answer::Yes); // import a skeleton?
    harness.dialogs.push_file(Some(PathBuf::from(skeleton_path)));

    let outcome = create_asset(
        &mut harness.session,
        &request(AssetType::SkinnedMesh, "Hero", "Characters"),
    )
    .unwrap();

    assert_eq!(
        outcome,
        CreateOutcome::Created {
            path: PathBuf::from(support::HERO_SKINNED_MESH_PATH),
        }
    );

    // Both imports were collapsed under the asset node in table order.
    let roots = harness
        .backend
        .snapshot_saved(support::HERO_SKINNED_MESH_PATH)
        .unwrap();
    let asset = &roots[0];
    assert!(asset.locked);
    assert_eq!(child_names(asset), ["Mesh", "Skeleton"]);
    assert_eq!(child_names(&asset.children[0]), ["HeroShape"]);
    assert_eq!(child_names(&asset.children[1]), ["Root"]);

    // The sources were only read from, never written.
    assert_eq!(
        harness.backend.snapshot_saved(support::HERO_MESH_PATH),
        Some(support::mesh_document("HeroShape"))
    );
    assert_eq!(
        harness.backend.snapshot_saved(skeleton_path),
        Some(support::skeleton_document())
    );

    // Both temporary asset-node documents were cleaned up.
    let saved = harness.backend.saved_paths();
    assert!(!saved.contains(&PathBuf::from(
        "/project/scenes/Characters/Hero/Hero_MSH_AssetNode.ma"
    )));
    assert!(!saved.contains(&PathBuf::from(
        "/project/scenes/Characters/Hero/Hero_SKL_AssetNode.ma"
    )));

    assert_eq!(
        harness.dialogs.prompts(),
        [
            "Do you want to Import the currently opened Mesh?",
            "Do you want to Import a Skeleton?",
            "Select Skeleton file",
        ]
    );
}

#[test]
fn a_skinned_mesh_proceeds_without_a_declined_skeleton() {
    let mut harness = support::harness("");
    harness
        .backend
        .load_document(support::ROCK_MESH_PATH, support::mesh_document("RockShape"));

    harness.dialogs.push_save_choice(SaveChoice::DontSave);
    harness.dialogs.push_answer(Answer::Yes); // import a mesh?
    harness
        .dialogs
        .push_file(Some(PathBuf::from(support::ROCK_MESH_PATH)));
    harness.dialogs.push_answer(Answer::No); // import a skeleton?

    let outcome = create_asset(
        &mut harness.session,
        &request(AssetType::SkinnedMesh, "Hero", "Characters"),
    )
    .unwrap();

    assert_eq!(
        outcome,
        CreateOutcome::Created {
            path: PathBuf::from(support::HERO_SKINNED_MESH_PATH),
        }
    );

    // The declined skeleton just means less substructure; the asset is
    // otherwise complete.
    let roots = harness
        .backend
        .snapshot_saved(support::HERO_SKINNED_MESH_PATH)
        .unwrap();
    let asset = &roots[0];
    assert!(asset.locked);
    assert_eq!(child_names(asset), ["Mesh"]);

    assert_eq!(
        harness.dialogs.prompts(),
        [
            "Save changes to untitled document?",
            "Do you want to Import a Mesh?",
            "Select Mesh file",
            "Do you want to Import a Skeleton?",
        ]
    );
}

#[test]
fn an_animation_is_created_beside_its_rig() {
    let mut harness = support::harness("");
    harness
        .backend
        .load_document(support::HERO_RIG_PATH, support::rig_document());
    harness
        .session
        .document()
        .open(support::HERO_RIG_PATH, true)
        .unwrap();

    harness.dialogs.push_answer(Answer::Yes); // reference the open rig?
    harness.dialogs.push_answer(Answer::No); // will this animation loop?

    let outcome = create_asset(
        &mut harness.session,
        &request(AssetType::Animation, "Walk", ""),
    )
    .unwrap();

    // Named after the rig, in an Animations folder beside it.
    assert_eq!(
        outcome,
        CreateOutcome::Created {
            path: PathBuf::from(support::HERO_WALK_PATH),
        }
    );

    let roots = harness.backend.snapshot_saved(support::HERO_WALK_PATH).unwrap();
    let asset = &roots[0];
    assert!(asset.locked);
    assert_eq!(
        asset.attributes,
        btreemap! {
            ASSET_TYPE_ATTR.to_owned() => Attribute {
                value: AttrValue::String("Animation".to_owned()),
                locked: true,
            },
        },
        "declining the loop prompt leaves no loop attribute behind"
    );

    let rig = &asset.children[0];
    assert_eq!(rig.name, ASSET_NODE_NAME);
    assert_eq!(rig.reference_namespace.as_deref(), Some("Hero_RIG"));

    assert_eq!(
        harness.dialogs.prompts(),
        [
            "Do you want to Reference the currently opened Rig?",
            "Will this animation loop?",
        ]
    );
}

#[test]
fn declining_the_overwrite_prompt_cancels_cleanly() {
    let mut harness = support::harness("");
    harness
        .backend
        .load_document(support::HERO_RIG_PATH, support::rig_document());
    harness
        .backend
        .load_document(support::HERO_WALK_PATH, support::animation_document());
    harness
        .session
        .document()
        .open(support::HERO_RIG_PATH, true)
        .unwrap();

    harness.dialogs.push_answer(Answer::Yes); // reference the open rig?
    // The overwrite prompt is left unscripted, which declines it.

    let outcome = create_asset(
        &mut harness.session,
        &request(AssetType::Animation, "Walk", ""),
    )
    .unwrap();

    assert_eq!(outcome, CreateOutcome::Cancelled);

    // The existing animation was not touched and the rig is still open.
    assert_eq!(
        harness.backend.snapshot_saved(support::HERO_WALK_PATH),
        Some(support::animation_document())
    );
    assert_eq!(
        harness.session.document().current_path(),
        Some(PathBuf::from(support::HERO_RIG_PATH))
    );

    assert_eq!(
        harness.dialogs.prompts(),
        [
            "Do you want to Reference the currently opened Rig?",
            "Hero@Walk.ma exists, do you want to overwrite the file?",
        ]
    );
}

#[test]
fn saving_the_untitled_document_routes_through_the_save_picker() {
    let mut harness = support::harness("");
    harness.session.document().create_node("Scratch", None).unwrap();

    harness.dialogs.push_save_choice(SaveChoice::Save);
    harness
        .dialogs
        .push_save_path(Some(PathBuf::from("/project/scenes/WIP/Scratch.ma")));
    harness.dialogs.push_answer(Answer::No); // static mesh?

    let outcome = create_asset(&mut harness.session, &request(AssetType::Mesh, "Rock", "Props"))
        .unwrap();

    assert_eq!(
        outcome,
        CreateOutcome::Created {
            path: PathBuf::from(support::ROCK_MESH_PATH),
        }
    );

    // The untitled work landed where the picker pointed before the new
    // document took over.
    let scratch = harness
        .backend
        .snapshot_saved("/project/scenes/WIP/Scratch.ma")
        .unwrap();
    assert_eq!(scratch.len(), 1);
    assert_eq!(scratch[0].name, "Scratch");
}

#[test]
fn backing_out_of_the_save_picker_cancels_cleanly() {
    let mut harness = support::harness("");
    harness.session.document().create_node("Scratch", None).unwrap();

    harness.dialogs.push_save_choice(SaveChoice::Save);
    harness.dialogs.push_save_path(None);

    let outcome = create_asset(&mut harness.session, &request(AssetType::Mesh, "Rock", "Props"))
        .unwrap();

    assert_eq!(outcome, CreateOutcome::Cancelled);

    // Nothing was written and the untitled work is still the open document.
    assert!(harness.backend.saved_paths().is_empty());
    assert_eq!(harness.session.document().current_path(), None);

    let roots = harness.backend.snapshot_current();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].name, "Scratch");

    assert_eq!(
        harness.dialogs.prompts(),
        ["Save changes to untitled document?", "Save current document"]
    );
}

#[test]
fn a_source_without_an_asset_node_fails_and_rolls_nothing_back() {
    let junk_path = "/project/scenes/Props/Junk.ma";

    let mut harness = support::harness("");
    harness
        .backend
        .load_document(junk_path, vec![NodeSnapshot::transform("Leftover")]);

    harness.dialogs.push_save_choice(SaveChoice::DontSave);
    harness.dialogs.push_answer(Answer::Yes); // import a mesh?
    harness.dialogs.push_file(Some(PathBuf::from(junk_path)));
    harness.dialogs.push_answer(Answer::No); // import a skeleton?

    let err = create_asset(
        &mut harness.session,
        &request(AssetType::SkinnedMesh, "Hero", "Characters"),
    )
    .unwrap_err();

    assert!(matches!(err, Error::MissingAssetNode { path } if path == Path::new(junk_path)));

    // No rollback: the half-made destination document stays on disk, and
    // the junk source is the document left open.
    assert!(harness
        .backend
        .snapshot_saved(support::HERO_SKINNED_MESH_PATH)
        .is_some());
    assert_eq!(
        harness.session.document().current_path(),
        Some(PathBuf::from(junk_path))
    );
}

#[test]
fn referencing_an_empty_document_reports_the_empty_namespace() {
    let empty_path = "/project/scenes/Props/Empty_MSH.ma";

    let mut harness = support::harness("");
    harness.backend.load_document(empty_path, Vec::new());

    harness.dialogs.push_save_choice(SaveChoice::DontSave);
    harness.dialogs.push_answer(Answer::Yes); // reference a mesh?
    harness.dialogs.push_file(Some(PathBuf::from(empty_path)));

    let err = create_asset(
        &mut harness.session,
        &request(AssetType::Skeleton, "Hero", "Characters"),
    )
    .unwrap_err();

    assert!(matches!(err, Error::EmptyReference { namespace } if namespace == "Empty_MSH"));
}
