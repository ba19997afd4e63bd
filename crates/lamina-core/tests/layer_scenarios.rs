use lamina_core::{
    ColorMatrix, Convolution, EditError, ErrorKind, LayerStack, OperatorSpec, Pixel, PixelGrid,
};

fn black(width: u32, height: u32) -> PixelGrid {
    PixelGrid::filled("black", width, height, Pixel::BLACK).expect("valid size")
}

fn center_dot() -> PixelGrid {
    let mut pixels = vec![Pixel::BLACK; 9];
    pixels[4] = Pixel::WHITE;
    PixelGrid::from_raw("dot", 3, 3, pixels).expect("3x3")
}

fn assert_kind(result: Result<(), EditError>, kind: ErrorKind) {
    match result {
        Err(e) => assert_eq!(e.kind(), kind, "unexpected error: {e}"),
        Ok(()) => panic!("expected {kind} error, got success"),
    }
}

#[test]
fn test_sepia_on_black_stays_black() {
    let mut stack = LayerStack::new();
    stack.create_layer("a").unwrap();
    stack.load_image(black(2, 2)).unwrap();
    stack.apply(&ColorMatrix::sepia()).unwrap();

    let out = stack.render().expect("a has an image");
    assert_eq!(out.dimensions(), (2, 2));
    assert!(out.pixels().iter().all(|p| *p == Pixel::BLACK));
}

#[test]
fn test_blur_spreads_center_dot_one_ring() {
    let mut stack = LayerStack::new();
    stack.create_layer("a").unwrap();
    stack.load_image(center_dot()).unwrap();
    stack.apply(&Convolution::blur()).unwrap();

    let out = stack.render().unwrap();
    // 255 * 4/16 = 63.75
    assert_eq!(out.get(1, 1).unwrap(), Pixel::new(63, 63, 63));
    // Edge-adjacent: 255 * 2/16 = 31.875
    assert_eq!(out.get(0, 1).unwrap(), Pixel::new(31, 31, 31));
    assert_eq!(out.get(1, 2).unwrap(), Pixel::new(31, 31, 31));
    // Corners see the dot only diagonally: 255 * 1/16 = 15.9375
    for (r, c) in [(0, 0), (0, 2), (2, 0), (2, 2)] {
        assert_eq!(out.get(r, c).unwrap(), Pixel::new(15, 15, 15), "corner ({r}, {c})");
    }
}

#[test]
fn test_render_skips_hidden_top_layer() {
    let a = PixelGrid::filled("a", 2, 2, Pixel::new(10, 20, 30)).unwrap();
    let b = PixelGrid::filled("b", 2, 2, Pixel::new(200, 200, 200)).unwrap();

    let mut stack = LayerStack::new();
    stack.add_layer("a", a.clone()).unwrap();
    stack.add_layer("b", b).unwrap();
    stack.set_visibility("b", false).unwrap();

    let rendered = stack.render().unwrap();
    assert!(rendered.same_with_name(&a));
}

#[test]
fn test_operator_without_current_layer_leaves_stack_unchanged() {
    let mut stack = LayerStack::new();
    let before = stack.clone();
    assert_kind(stack.apply_spec(&OperatorSpec::Grayscale), ErrorKind::InvalidState);
    assert_eq!(stack, before);
    assert_eq!(stack.current_index(), None);
    assert!(stack.layers().is_empty());
}

#[test]
fn test_second_image_with_other_size_is_rejected() {
    let mut stack = LayerStack::new();
    stack.create_layer("a").unwrap();
    stack.load_image(black(4, 4)).unwrap();
    stack.create_layer("b").unwrap();
    assert_kind(stack.load_image(black(4, 5)), ErrorKind::DimensionMismatch);
}

#[test]
fn test_duplicate_and_missing_names() {
    let mut stack = LayerStack::new();
    stack.create_layer("a").unwrap();
    assert_kind(stack.create_layer("a"), ErrorKind::DuplicateLayer);
    assert_kind(stack.remove_layer("nope"), ErrorKind::NotFound);
}

#[test]
fn test_full_editing_session() {
    let board = PixelGrid::checkerboard("board", 8, 6, 2, Pixel::new(255, 0, 0), Pixel::BLACK)
        .unwrap();

    let mut stack = LayerStack::new();
    stack.add_layer("base", board).unwrap();
    stack.apply_spec(&OperatorSpec::Grayscale).unwrap();
    stack.apply_spec(&OperatorSpec::Sharpen).unwrap();
    stack
        .apply_spec(&OperatorSpec::Mosaic {
            seeds: 4,
            rng_seed: Some(7),
        })
        .unwrap();

    let out = stack.render().unwrap();
    assert_eq!(out.name(), "board");
    assert!(out.pixels().iter().all(|p| p.r == p.g && p.g == p.b));

    let small = stack.resized(4, 3).unwrap();
    assert_eq!(small.render().unwrap().dimensions(), (4, 3));
}
