mod common;

use common::{standard_deck, write_deck, write_png, SlideSpec};
use deck_core::label::{LABEL_SHAPE_NAME, TEMPLATE_SLIDE_LINE};
use deck_core::{Error, Position};
use deck_pptx::{
    add_label_to_existing_slide, copy_slide_replace_image, copy_slide_replace_images,
    replace_image_on_existing_slide, replace_images_in_copy, InsertOptions, Presentation, Shape,
};
use std::path::Path;

fn labels<'a>(shapes: &[Shape<'a>]) -> Vec<Shape<'a>> {
    shapes
        .iter()
        .filter(|s| s.name() == Some(LABEL_SHAPE_NAME))
        .copied()
        .collect()
}

#[test]
fn test_single_image_copy_matches_template() {
    let tmp = tempfile::tempdir().unwrap();
    let template = Position::new(0.14, 0.96, 5.43, 2.72);
    let path = standard_deck(tmp.path(), template, 0);
    let image = write_png(tmp.path(), "new.png", 20, 10, 200);

    let index =
        copy_slide_replace_image(&path, 1, &image, None, &InsertOptions::default()).unwrap();
    assert_eq!(index, 2);

    let pres = Presentation::open(&path).unwrap();
    assert_eq!(pres.slide_count(), 3);
    let slide = pres.slide(index).unwrap();
    let shapes = slide.shapes();
    let pictures = slide.pictures();
    assert_eq!(pictures.len(), 1);
    assert_eq!(pictures[0].xfrm(), Some(template.to_emu()));
    assert!(shapes.iter().all(|s| !s.kind().is_text()));

    let provenance = pictures[0].provenance();
    assert_eq!(provenance.path, Some(image.display().to_string()));
    assert_eq!(provenance.name.as_deref(), Some("new.png"));

    // The template itself is untouched
    assert_eq!(pres.slide(1).unwrap().shapes().len(), 3);
}

#[test]
fn test_copy_drops_empty_placeholders() {
    let tmp = tempfile::tempdir().unwrap();
    let template = Position::new(0.5, 1.0, 4.0, 3.0);
    let path = write_deck(
        tmp.path(),
        "placeholder.pptx",
        &[SlideSpec::new()
            .title("Mixed")
            .empty_picture_placeholder()
            .picture(template)],
    );
    let image = write_png(tmp.path(), "new.png", 10, 10, 3);

    let index =
        copy_slide_replace_image(&path, 0, &image, None, &InsertOptions::default()).unwrap();

    let pres = Presentation::open(&path).unwrap();
    let shapes = pres.slide(index).unwrap().shapes();
    assert_eq!(shapes.len(), 1);
    assert!(shapes[0].kind().is_picture());
    assert_eq!(shapes[0].xfrm(), Some(template.to_emu()));

    // The template keeps its placeholder
    assert_eq!(pres.slide(0).unwrap().shapes().len(), 3);
}

#[test]
fn test_two_images_follow_reading_order() {
    let tmp = tempfile::tempdir().unwrap();
    let p1 = Position::new(0.5, 1.0, 4.0, 3.0);
    let p2 = Position::new(5.0, 1.02, 4.0, 3.0);
    // Right-hand picture first in the shape tree
    let path = write_deck(
        tmp.path(),
        "two.pptx",
        &[SlideSpec::new().title("Pair").picture(p2).picture(p1)],
    );
    let a = write_png(tmp.path(), "a.png", 10, 10, 1);
    let b = write_png(tmp.path(), "b.png", 10, 10, 2);

    let index =
        copy_slide_replace_images(&path, 0, &[&a, &b], None, &InsertOptions::default()).unwrap();

    let pres = Presentation::open(&path).unwrap();
    let pictures = pres.slide(index).unwrap().pictures();
    assert_eq!(pictures.len(), 2);
    assert_eq!(pictures[0].provenance().name.as_deref(), Some("a.png"));
    assert_eq!(pictures[0].xfrm(), Some(p1.to_emu()));
    assert_eq!(pictures[1].provenance().name.as_deref(), Some("b.png"));
    assert_eq!(pictures[1].xfrm(), Some(p2.to_emu()));
}

#[test]
fn test_count_mismatch_changes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let path = standard_deck(tmp.path(), Position::new(1.0, 1.0, 4.0, 3.0), 0);
    let a = write_png(tmp.path(), "a.png", 10, 10, 1);
    let b = write_png(tmp.path(), "b.png", 10, 10, 2);
    let before = std::fs::read(&path).unwrap();

    let err = copy_slide_replace_images(&path, 1, &[&a, &b], None, &InsertOptions::default())
        .unwrap_err();
    match err {
        Error::InvalidValue(msg) => {
            assert!(msg.contains('2'));
            assert!(msg.contains('1'));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(std::fs::read(&path).unwrap(), before);

    // The in-memory core checks before duplicating too
    let mut pres = Presentation::open(&path).unwrap();
    assert!(replace_images_in_copy(&mut pres, 1, &[&a, &b], None, &InsertOptions::default()).is_err());
    assert_eq!(pres.slide_count(), 2);
}

#[test]
fn test_missing_image_fails_before_writing() {
    let tmp = tempfile::tempdir().unwrap();
    let path = standard_deck(tmp.path(), Position::new(1.0, 1.0, 4.0, 3.0), 0);
    let a = write_png(tmp.path(), "a.png", 10, 10, 1);
    let missing = tmp.path().join("missing.png");
    let before = std::fs::read(&path).unwrap();

    let err = copy_slide_replace_images(
        &path,
        1,
        &[&a, &missing],
        Some(&[Position::new(0.0, 0.0, 1.0, 1.0), Position::new(1.0, 0.0, 1.0, 1.0)]),
        &InsertOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::FileNotFound(p) if p == missing));
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn test_template_without_pictures() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_deck(tmp.path(), "bare.pptx", &[SlideSpec::new().title("Nothing")]);
    let a = write_png(tmp.path(), "a.png", 10, 10, 1);

    let err = copy_slide_replace_image(&path, 0, &a, None, &InsertOptions::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidValue(_)));
    assert_eq!(Presentation::open(&path).unwrap().slide_count(), 1);

    // Explicit positions do not need template pictures
    let index = copy_slide_replace_image(
        &path,
        0,
        &a,
        Some(Position::new(1.0, 1.0, 2.0, 2.0)),
        &InsertOptions::default(),
    )
    .unwrap();
    assert_eq!(index, 1);
}

#[test]
fn test_copy_with_label() {
    let tmp = tempfile::tempdir().unwrap();
    let path = standard_deck(tmp.path(), Position::new(1.0, 1.0, 4.0, 3.0), 0);
    let plots = tmp.path().join("plots");
    std::fs::create_dir(&plots).unwrap();
    let image = write_png(&plots, "trend.png", 10, 10, 1);

    let options = InsertOptions::default()
        .with_label(true)
        .with_base_dir(Some(tmp.path().to_path_buf()));
    let index = copy_slide_replace_image(&path, 1, &image, None, &options).unwrap();

    let pres = Presentation::open(&path).unwrap();
    let shapes = pres.slide(index).unwrap().shapes();
    let found = labels(&shapes);
    assert_eq!(found.len(), 1);
    assert_eq!(
        found[0].text(),
        Path::new("plots").join("trend.png").display().to_string()
    );
    let label = found[0].xfrm().unwrap().to_position();
    assert!(label.approx_eq(&Position::new(4.9, 7.12, 5.0, 0.28), 1e-6));
}

#[test]
fn test_replace_on_existing_slide() {
    let tmp = tempfile::tempdir().unwrap();
    let geometry = Position::new(0.5, 1.25, 6.0, 4.0);
    let path = standard_deck(tmp.path(), geometry, 0);
    let image = write_png(tmp.path(), "fresh.png", 12, 8, 77);

    let options = InsertOptions::default().with_label(true);
    replace_image_on_existing_slide(&path, 1, &image, &options).unwrap();

    let pres = Presentation::open(&path).unwrap();
    assert_eq!(pres.slide_count(), 2);
    let slide = pres.slide(1).unwrap();
    let pictures = slide.pictures();
    assert_eq!(pictures.len(), 1);
    assert_eq!(pictures[0].xfrm(), Some(geometry.to_emu()));
    assert_eq!(pictures[0].provenance().name.as_deref(), Some("fresh.png"));

    let shapes = slide.shapes();
    assert!(shapes.iter().all(|s| s.text() != "old label"));
    assert_eq!(labels(&shapes).len(), 1);
    // The title placeholder is kept
    assert!(shapes.iter().any(|s| s.text() == "Template"));
}

#[test]
fn test_replace_without_picture() {
    let tmp = tempfile::tempdir().unwrap();
    let path = standard_deck(tmp.path(), Position::new(1.0, 1.0, 1.0, 1.0), 0);
    let image = write_png(tmp.path(), "x.png", 4, 4, 5);

    let err = replace_image_on_existing_slide(&path, 0, &image, &InsertOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidValue(_)));
}

#[test]
fn test_label_existing_slide() {
    let tmp = tempfile::tempdir().unwrap();
    let path = standard_deck(tmp.path(), Position::new(1.0, 1.0, 4.0, 3.0), 0);

    // No pictures: nothing written
    let before = std::fs::read(&path).unwrap();
    assert!(!add_label_to_existing_slide(&path, 0, None).unwrap());
    assert_eq!(std::fs::read(&path).unwrap(), before);

    // The template picture never had provenance
    assert!(add_label_to_existing_slide(&path, 1, None).unwrap());
    let pres = Presentation::open(&path).unwrap();
    let shapes = pres.slide(1).unwrap().shapes();
    let found = labels(&shapes);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text(), TEMPLATE_SLIDE_LINE);

    // Labelling again replaces the earlier label
    let image = write_png(tmp.path(), "c.png", 4, 4, 9);
    let index = copy_slide_replace_image(&path, 1, &image, None, &InsertOptions::default()).unwrap();
    assert!(add_label_to_existing_slide(&path, index, None).unwrap());
    assert!(add_label_to_existing_slide(&path, index, None).unwrap());

    let pres = Presentation::open(&path).unwrap();
    let shapes = pres.slide(index).unwrap().shapes();
    let found = labels(&shapes);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text(), image.display().to_string());
}
