//! End-to-end runs of the export pipeline against the emulated project,
//! covering the standard, explicit-folder, and interactive entry points and
//! the revert that follows every export.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use scenedoc::{DocumentEvent, NodeSnapshot, PlaybackRange};

use stagehand::asset::{AssetType, ASSET_TYPE_ATTR};
use stagehand::error::{Error, ErrorKind};
use stagehand::export::{
    export_current, export_current_interactive, export_current_to, ExportOutcome,
};
use stagehand::settings::SettingKey;

use crate::support;

fn drained_event_kinds(harness: &support::PipelineHarness) -> Vec<&'static str> {
    harness
        .session
        .document_events()
        .try_iter()
        .map(|event| match event {
            DocumentEvent::Opened(_) => "opened",
            DocumentEvent::Saved(_) => "saved",
            DocumentEvent::Exported(_) => "exported",
            _ => "other",
        })
        .collect()
}

#[test]
fn a_mesh_exports_to_the_mirrored_standard_folder() {
    let mut harness = support::harness("/game/imports");
    harness
        .backend
        .load_document(support::ROCK_MESH_PATH, support::mesh_document("RockShape"));
    harness
        .session
        .document()
        .open(support::ROCK_MESH_PATH, true)
        .unwrap();

    let target = export_current(&mut harness.session).unwrap();
    assert_eq!(target, PathBuf::from("/game/imports/Props/Rock/Rock_MSH.fbx"));

    let record = harness.backend.exchange_record(&target).unwrap();
    assert_eq!(
        record.preset,
        PathBuf::from("/app/presets/mesh.fbxexportpreset")
    );
    assert_eq!(record.root_names, ["Asset"]);
    assert_eq!(record.node_names, ["Asset", "RockShape"]);

    // The stored document is untouched and the export ended on a reload.
    assert_eq!(
        harness.backend.snapshot_saved(support::ROCK_MESH_PATH),
        Some(support::mesh_document("RockShape"))
    );
    assert_eq!(
        harness.session.document().current_path(),
        Some(PathBuf::from(support::ROCK_MESH_PATH))
    );
    assert_eq!(
        drained_event_kinds(&harness),
        ["opened", "saved", "exported", "opened"]
    );
}

#[test]
fn a_skinned_mesh_exports_its_whole_subtree() {
    let mut harness = support::harness("/game/imports");
    harness.backend.load_document(
        support::HERO_SKINNED_MESH_PATH,
        support::skinned_mesh_document(),
    );
    harness
        .session
        .document()
        .open(support::HERO_SKINNED_MESH_PATH, true)
        .unwrap();

    let target = export_current_to(&mut harness.session, Path::new("/game/out")).unwrap();
    assert_eq!(target, PathBuf::from("/game/out/Hero_SKM.fbx"));

    let record = harness.backend.exchange_record(&target).unwrap();
    assert_eq!(
        record.preset,
        PathBuf::from("/app/presets/skinned_mesh.fbxexportpreset")
    );
    assert_eq!(
        record.node_names,
        ["Asset", "Mesh", "HeroShape", "Skeleton", "Root", "Hips", "Spine"]
    );
    // Nothing was baked on the way out of a skinned mesh.
    assert_eq!(record.baked, vec![]);
}

#[test]
fn unsaved_edits_are_persisted_by_the_export_save() {
    let mut harness = support::harness("/game/imports");
    harness
        .backend
        .load_document(support::ROCK_MESH_PATH, support::mesh_document("RockShape"));
    harness
        .session
        .document()
        .open(support::ROCK_MESH_PATH, true)
        .unwrap();
    harness
        .session
        .document()
        .create_node("WorkInProgress", None)
        .unwrap();

    let target = export_current(&mut harness.session).unwrap();

    // The forced save wrote the edit, and the reload brought it back.
    let roots = harness.backend.snapshot_saved(support::ROCK_MESH_PATH).unwrap();
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[1].name, "WorkInProgress");

    // Only the asset node's subtree went into the exchange file.
    let record = harness.backend.exchange_record(&target).unwrap();
    assert_eq!(record.node_names, ["Asset", "RockShape"]);
}

#[test]
fn an_animation_bakes_its_skeleton_and_reverts_the_document() {
    let mut harness = support::harness("/game/imports");
    harness
        .backend
        .load_document(support::HERO_WALK_PATH, support::animation_document());
    harness
        .session
        .document()
        .open(support::HERO_WALK_PATH, true)
        .unwrap();

    let range = PlaybackRange::new(1.0, 60.0);
    harness.backend.set_playback_range(range);

    let target = export_current(&mut harness.session).unwrap();
    assert_eq!(
        target,
        PathBuf::from("/game/imports/Characters/Hero/Animations/Hero@Walk.fbx")
    );

    let record = harness.backend.exchange_record(&target).unwrap();
    assert_eq!(
        record.preset,
        PathBuf::from("/app/presets/animation.fbxexportpreset")
    );

    // Only the asset node and the baked skeleton went out; the rig, its
    // mesh, its controls, and the stripped constraints did not.
    assert_eq!(
        record.node_names,
        ["Asset", "Skeleton", "Root", "Hips", "Spine"]
    );
    assert_eq!(
        record.baked,
        vec![
            ("Root".to_owned(), range),
            ("Hips".to_owned(), range),
            ("Spine".to_owned(), range),
        ]
    );

    // None of the destructive steps outlived the export: the stored
    // document is byte-for-byte the fixture, and the reload made it the
    // current document again.
    assert_eq!(
        harness.backend.snapshot_saved(support::HERO_WALK_PATH),
        Some(support::animation_document())
    );
    assert_eq!(harness.backend.snapshot_current(), support::animation_document());
}

#[test]
fn an_animation_missing_its_skeleton_fails_and_reverts() {
    let roots = support::animation_document_over(support::rig_without_skeleton_document());

    let mut harness = support::harness("/game/imports");
    harness
        .backend
        .load_document(support::HERO_WALK_PATH, roots.clone());
    harness
        .session
        .document()
        .open(support::HERO_WALK_PATH, true)
        .unwrap();

    let err = export_current(&mut harness.session).unwrap_err();
    assert!(matches!(err, Error::MissingDependency(AssetType::Skeleton)));
    assert_eq!(err.kind(), ErrorKind::MissingDependency);

    // The failure happened after the rig reference was already pulled in,
    // so the revert is what restores the document.
    assert!(harness.backend.exchange_paths().is_empty());
    assert_eq!(harness.backend.snapshot_current(), roots);
    assert_eq!(
        harness.session.document().current_path(),
        Some(PathBuf::from(support::HERO_WALK_PATH))
    );
}

#[test]
fn an_animation_without_a_rig_reports_the_missing_dependency() {
    let roots = vec![NodeSnapshot::transform("Asset")
        .attribute(ASSET_TYPE_ATTR, "Animation", true)
        .locked()];

    let mut harness = support::harness("/game/imports");
    harness
        .backend
        .load_document(support::HERO_WALK_PATH, roots);
    harness
        .session
        .document()
        .open(support::HERO_WALK_PATH, true)
        .unwrap();

    let err = export_current(&mut harness.session).unwrap_err();
    assert!(matches!(err, Error::MissingDependency(AssetType::Rig)));
    assert!(harness.backend.exchange_paths().is_empty());
}

#[test]
fn a_rig_that_is_not_referenced_is_rejected() {
    // The rig hangs under the asset node as local nodes, not as a
    // reference, so there is nothing to materialize.
    let mut rig_roots = support::rig_document();
    let rig = rig_roots.remove(0);
    let roots = vec![NodeSnapshot::transform("Asset")
        .attribute(ASSET_TYPE_ATTR, "Animation", true)
        .children([rig])
        .locked()];

    let mut harness = support::harness("/game/imports");
    harness
        .backend
        .load_document(support::HERO_WALK_PATH, roots.clone());
    harness
        .session
        .document()
        .open(support::HERO_WALK_PATH, true)
        .unwrap();

    let err = export_current(&mut harness.session).unwrap_err();
    assert!(matches!(err, Error::RigNotReferenced));

    assert!(harness.backend.exchange_paths().is_empty());
    assert_eq!(harness.backend.snapshot_current(), roots);
}

#[test]
fn configuring_the_export_root_unblocks_the_standard_export() {
    let mut harness = support::harness("");
    harness
        .backend
        .load_document(support::ROCK_MESH_PATH, support::mesh_document("RockShape"));
    harness
        .session
        .document()
        .open(support::ROCK_MESH_PATH, true)
        .unwrap();

    let err = export_current(&mut harness.session).unwrap_err();
    assert!(matches!(err, Error::ExportRootUnset));
    assert!(harness.backend.exchange_paths().is_empty());

    // The root is written through the session, the way a host settings
    // dialog hands it in.
    harness
        .session
        .settings_mut()
        .write(SettingKey::ExportRoot, "/game/imports")
        .unwrap();

    let target = export_current(&mut harness.session).unwrap();
    assert_eq!(target, PathBuf::from("/game/imports/Props/Rock/Rock_MSH.fbx"));
    assert!(harness.backend.exchange_record(&target).is_some());
}

#[test]
fn the_interactive_export_respects_cancellation() {
    let mut harness = support::harness("/game/imports");
    harness
        .backend
        .load_document(support::ROCK_MESH_PATH, support::mesh_document("RockShape"));
    harness
        .session
        .document()
        .open(support::ROCK_MESH_PATH, true)
        .unwrap();
    // The folder picker is left unscripted, which cancels it.

    let outcome = export_current_interactive(&mut harness.session).unwrap();

    assert_eq!(outcome, ExportOutcome::Cancelled);
    assert!(harness.backend.exchange_paths().is_empty());
    assert_eq!(harness.dialogs.prompts(), ["Select path to export asset to."]);
}

#[test]
fn the_interactive_export_writes_where_the_user_points() {
    // No export root is configured; the interactive path works anyway.
    let mut harness = support::harness("");
    harness
        .backend
        .load_document(support::ROCK_MESH_PATH, support::mesh_document("RockShape"));
    harness
        .session
        .document()
        .open(support::ROCK_MESH_PATH, true)
        .unwrap();
    harness
        .dialogs
        .push_folder(Some(PathBuf::from("/handoff/props")));

    let outcome = export_current_interactive(&mut harness.session).unwrap();

    assert_eq!(
        outcome,
        ExportOutcome::Exported(PathBuf::from("/handoff/props/Rock_MSH.fbx"))
    );
    assert!(harness
        .backend
        .exchange_record("/handoff/props/Rock_MSH.fbx")
        .is_some());
}
