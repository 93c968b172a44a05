//! End-to-end scenarios for the image index and transform, backed by real
//! directories on disk.

use fob_images::{
    AssetIndex, ImagesContext, ImagesOptions, InvalidationEvent, Resolution,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create an (empty) image file under the project root
fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).expect("Failed to create image dir");
    fs::write(path, b"\x89PNG").expect("Failed to write image");
}

fn project(files: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for file in files {
        touch(dir.path(), file);
    }
    dir
}

fn component_id(root: &Path, name: &str) -> String {
    root.join("src").join(name).to_string_lossy().into_owned()
}

#[test]
fn scenario_a_simple_image() {
    let dir = project(&["assets/img/logo.png"]);
    let options = ImagesOptions::new()
        .with_dirs(["assets/img"])
        .with_extensions(["png"]);
    let mut index = AssetIndex::new(options, dir.path()).unwrap();

    assert!(index.scan().unwrap());
    assert_eq!(index.derive_canonical_name("assets/img/logo.png"), "Logo");

    let record = index.find_image::<&str>("Logo", &[]).unwrap();
    assert_eq!(record.path, "/assets/img/logo.png");
    assert_eq!(
        record.source_path.as_deref(),
        Some(dir.path().join("assets/img/logo.png").as_path())
    );
}

#[test]
fn scenario_b_index_file_takes_folder_name() {
    let dir = project(&["assets/img/icons/index.svg"]);
    let options = ImagesOptions::new()
        .with_dirs(["assets/img"])
        .with_extensions(["png", "svg"]);
    let mut index = AssetIndex::new(options, dir.path()).unwrap();
    index.scan().unwrap();

    assert_eq!(index.derive_canonical_name("assets/img/icons/index.svg"), "Icons");
    assert_eq!(
        index.find_image::<&str>("Icons", &[]).unwrap().path,
        "/assets/img/icons/index.svg"
    );
}

#[test]
fn scenario_c_conflicting_names() {
    let dir = project(&["a/Foo.png", "b/Foo.png"]);
    let options = ImagesOptions::new()
        .with_dirs(["a", "b"])
        .with_extensions(["png"]);
    let mut index = AssetIndex::new(options, dir.path()).unwrap();
    index.scan().unwrap();

    // Directories are scanned in configured order, so `a/` is inserted first
    let record = index.find_image::<&str>("Foo", &[]).unwrap();
    assert_eq!(record.path, "/a/Foo.png");
    assert_eq!(index.records().filter(|r| r.name == "Foo").count(), 1);

    let conflicts = index.rebuild_name_table();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].name, "Foo");
    assert_eq!(conflicts[0].kept, "/a/Foo.png");
    assert_eq!(conflicts[0].discarded, "/b/Foo.png");
}

#[test]
fn scenario_d_transform_replaces_reference() {
    let dir = project(&["assets/img/logo.png"]);
    let options = ImagesOptions::new()
        .with_dirs(["assets/img"])
        .with_props(["src"]);
    let mut context = ImagesContext::initialize(options, dir.path()).unwrap();

    let code = "return (_openBlock(), _createElementBlock(\"img\", { src: _ctx.Logo }, null))";
    let output = context
        .handle(code, &component_id(dir.path(), "App.vue"))
        .unwrap()
        .unwrap();

    let (head, body) = output.split_once('\n').unwrap();
    assert_eq!(head, "import __fob_images_0 from '/assets/img/logo.png'");
    assert!(body.contains("{ src: __fob_images_0 }"));
    assert!(!body.contains("_ctx.Logo"));
    assert_eq!(output.matches("import ").count(), 1);
}

#[test]
fn scenario_e_leading_underscore_is_skipped() {
    let dir = project(&["assets/img/internal.png"]);
    let options = ImagesOptions::new().with_dirs(["assets/img"]);
    let mut context = ImagesContext::initialize(options, dir.path()).unwrap();

    let id = component_id(dir.path(), "App.vue");
    let output = context.transform("{ src: _ctx._internal }", &id).unwrap().unwrap();

    assert_eq!(output.code, "{ src: _ctx._internal }");
    assert_eq!(output.bindings, 0);
    assert!(context.index().files_using("Internal").is_empty());
    assert!(context.index().files_using("_internal").is_empty());
}

#[test]
fn scenario_f_removal_invalidates_users_only() {
    let dir = project(&["assets/img/logo.png", "assets/img/banner.png"]);
    let options = ImagesOptions::new().with_dirs(["assets/img"]);
    let mut context = ImagesContext::initialize(options, dir.path()).unwrap();

    let app = component_id(dir.path(), "App.vue");
    let footer = component_id(dir.path(), "Footer.vue");
    context.handle("{ src: _ctx.logo }", &app).unwrap();
    context.handle("{ src: _ctx.banner }", &footer).unwrap();

    let removed = dir.path().join("assets/img/logo.png");
    fs::remove_file(&removed).unwrap();
    let event = context
        .asset_removed(&removed.to_string_lossy())
        .expect("App.vue referenced Logo");

    match event {
        InvalidationEvent::Update { files, .. } => assert_eq!(files, ["/src/App.vue"]),
        other => panic!("expected targeted update, got {other:?}"),
    }
}

#[test]
fn scan_is_idempotent() {
    let dir = project(&["img/a.png", "img/nested/b.png"]);
    let options = ImagesOptions::new().with_dirs(["img"]);
    let mut index = AssetIndex::new(options, dir.path()).unwrap();

    assert!(index.scan().unwrap());
    let mut first: Vec<_> = index.records().cloned().collect();
    first.sort_by(|a, b| a.name.cmp(&b.name));

    // Files created after the first scan are not picked up by scanning again
    touch(dir.path(), "img/c.png");
    assert!(!index.scan().unwrap());
    let mut second: Vec<_> = index.records().cloned().collect();
    second.sort_by(|a, b| a.name.cmp(&b.name));

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn exclusion_never_returns_self() {
    let dir = project(&["src/components/Badge.vue"]);
    let options = ImagesOptions::new()
        .with_dirs(["src/components"])
        .with_extensions(["vue"]);
    let mut index = AssetIndex::new(options.clone(), dir.path()).unwrap();
    index.scan().unwrap();

    assert!(index.find_image("Badge", &["/src/components/Badge.vue"]).is_none());
    assert!(index.find_image("Badge", &["src/components/Badge.vue"]).is_none());

    let options = options.with_resolver(|_: &str| Some("/fallback/badge.svg"));
    let mut index = AssetIndex::new(options, dir.path()).unwrap();
    index.scan().unwrap();
    let record = index.find_image("Badge", &["/src/components/Badge.vue"]).unwrap();
    assert_eq!(record.path, "/fallback/badge.svg");
}

#[test]
fn fallback_resolvers_in_order() {
    let dir = TempDir::new().unwrap();
    let options = ImagesOptions::new()
        .with_dirs(["assets/img"])
        .with_resolver(|name: &str| (name == "Only").then(|| "/first/only.png".to_string()))
        .with_resolver(|name: &str| {
            Some(Resolution::Image {
                path: format!("/second/{name}.png"),
            })
        });
    let mut context = ImagesContext::initialize(options, dir.path()).unwrap();
    let id = component_id(dir.path(), "App.vue");

    let output = context
        .handle("{ src: _ctx.only } { src: _ctx.other }", &id)
        .unwrap()
        .unwrap();

    let lines: Vec<_> = output.lines().collect();
    assert_eq!(lines[0], "import __fob_images_0 from '/first/only.png'");
    assert_eq!(lines[1], "import __fob_images_1 from '/second/Other.png'");
    assert_eq!(
        lines[2],
        "{ src: __fob_images_0 } { src: __fob_images_1 }"
    );
}

#[test]
fn options_file_drives_the_context() {
    let dir = project(&["static/images/hero.webp"]);
    fs::write(
        dir.path().join("fob-images.json"),
        r#"{ "dirs": ["~/images"], "alias": [{ "find": "~", "replacement": "static" }],
             "props": ["src", "poster"] }"#,
    )
    .unwrap();

    let options = ImagesOptions::load(dir.path(), None).unwrap();
    let mut context = ImagesContext::initialize(options, dir.path()).unwrap();
    let id = component_id(dir.path(), "Video.vue");

    let output = context.handle("{ poster: _ctx.hero }", &id).unwrap().unwrap();
    assert!(output.starts_with("import __fob_images_0 from '/static/images/hero.webp'\n"));
}
