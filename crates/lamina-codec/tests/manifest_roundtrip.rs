use std::fs;
use std::path::PathBuf;

use lamina_codec::{
    CodecError, DEFAULT_PLACEHOLDER, ImageFormat, ManifestError, load_stack, save_stack,
};
use lamina_core::{LayerStack, OperatorSpec, Pixel, PixelGrid};

fn scratch(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("lamina-manifest-{}-{test}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn sample_stack() -> LayerStack {
    let mut stack = LayerStack::new();
    let board = PixelGrid::checkerboard("board", 4, 3, 1, Pixel::WHITE, Pixel::BLACK).unwrap();
    stack.add_layer("background", board).unwrap();
    stack.create_layer("notes").unwrap();
    stack
        .add_layer(
            "tint layer",
            PixelGrid::filled("tint", 4, 3, Pixel::new(200, 40, 40)).unwrap(),
        )
        .unwrap();
    stack.apply_spec(&OperatorSpec::Grayscale).unwrap();
    stack.set_visibility("notes", false).unwrap();
    stack
}

#[test]
fn test_stack_survives_save_and_load() {
    let dir = scratch("roundtrip");
    let path = dir.join("session.txt");
    let stack = sample_stack();

    let manifest = save_stack(&stack, &path, ImageFormat::Png, DEFAULT_PLACEHOLDER).unwrap();
    assert_eq!(manifest.entries.len(), 3);
    assert_eq!(
        manifest.entries[2].image.as_deref(),
        Some(std::path::Path::new("02_tint_layer.png"))
    );
    assert!(dir.join("00_background.png").exists());
    assert!(manifest.entries[1].image.is_none());

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("notes, empty, false"));

    let back = load_stack(&path, DEFAULT_PLACEHOLDER).unwrap();
    assert_eq!(back.layer_names(), stack.layer_names());
    assert_eq!(back.canvas_size(), Some((4, 3)));
    assert_eq!(back.current_name().as_deref(), Some("tint layer"));
    assert!(!back.layer("notes").unwrap().is_visible());
    assert!(!back.layer("notes").unwrap().has_image());
    assert_eq!(
        back.layer("tint layer").unwrap().image(),
        stack.layer("tint layer").unwrap().image()
    );
    assert_eq!(back.render(), stack.render());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_ppm_layers_resolve_relative_to_manifest() {
    let dir = scratch("relative");
    fs::create_dir_all(dir.join("img")).unwrap();
    fs::write(dir.join("img").join("dot.ppm"), "P3\n1 1\n255\n9 8 7\n").unwrap();
    fs::write(
        dir.join("stack.txt"),
        "# hand written\n\nbase, img/dot.ppm, true\nblank, empty, true\n",
    )
    .unwrap();

    let stack = load_stack(&dir.join("stack.txt"), DEFAULT_PLACEHOLDER).unwrap();
    assert_eq!(stack.layer_names(), vec!["base", "blank"]);
    assert_eq!(stack.render().unwrap().get(0, 0).unwrap(), Pixel::new(9, 8, 7));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_missing_layer_image_names_the_layer() {
    let dir = scratch("missing");
    fs::write(dir.join("stack.txt"), "ghost, nowhere.png, true\n").unwrap();

    let err = load_stack(&dir.join("stack.txt"), DEFAULT_PLACEHOLDER).unwrap_err();
    match err {
        ManifestError::Codec { layer, source } => {
            assert_eq!(layer, "ghost");
            assert!(matches!(source, CodecError::Io(_)));
        }
        other => panic!("unexpected error: {other}"),
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_mismatched_layer_sizes_are_rejected() {
    let dir = scratch("mismatch");
    fs::write(dir.join("a.ppm"), "P3 1 1 255 0 0 0").unwrap();
    fs::write(dir.join("b.ppm"), "P3 2 1 255 0 0 0 0 0 0").unwrap();
    fs::write(dir.join("stack.txt"), "a, a.ppm, true\nb, b.ppm, true\n").unwrap();

    let err = load_stack(&dir.join("stack.txt"), DEFAULT_PLACEHOLDER).unwrap_err();
    assert!(matches!(err, ManifestError::Edit(_)));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_duplicate_names_in_manifest_are_rejected() {
    let dir = scratch("duplicate");
    fs::write(dir.join("stack.txt"), "a, empty, true\na, empty, false\n").unwrap();

    let err = load_stack(&dir.join("stack.txt"), DEFAULT_PLACEHOLDER).unwrap_err();
    assert!(matches!(err, ManifestError::Edit(_)));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_every_accepted_name_survives_round_trip() {
    let mut stack = LayerStack::new();
    for name in ["#top", " padded", "padded ", "a,b"] {
        assert!(stack.create_layer(name).is_err(), "{name:?}");
    }

    let dir = scratch("names");
    let path = dir.join("names.txt");
    stack
        .add_layer("base", PixelGrid::filled("b", 2, 2, Pixel::BLACK).unwrap())
        .unwrap();
    stack
        .add_layer("top #1", PixelGrid::filled("t", 2, 2, Pixel::WHITE).unwrap())
        .unwrap();
    stack.create_layer("two words").unwrap();

    save_stack(&stack, &path, ImageFormat::Ppm, DEFAULT_PLACEHOLDER).unwrap();
    let back = load_stack(&path, DEFAULT_PLACEHOLDER).unwrap();
    assert_eq!(back.layer_names(), stack.layer_names());
    assert_eq!(back.render(), stack.render());
    assert_eq!(back.render().unwrap().get(0, 0).unwrap(), Pixel::WHITE);

    let _ = fs::remove_dir_all(&dir);
}
