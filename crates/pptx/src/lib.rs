//! PPTX (Office Open XML) backend for template-driven image insertion.
//!
//! A .pptx is a ZIP package of XML parts. Slides are duplicated and edited
//! at the shape-tree level, then the whole package is written back at once.

pub mod batch;
pub mod insert;
pub mod inspect;
pub mod label;
pub mod lifecycle;
pub mod media;
pub mod mutator;
pub mod package;
pub mod position;
pub mod presentation;
pub mod rels;
pub mod shapes;
pub mod workflow;
pub mod xml;

pub use batch::{run_batch, BatchFailure, BatchReport};
pub use insert::{insert_image, insert_image_preserve_aspect};
pub use inspect::{extract_image_metadata, list_slides};
pub use lifecycle::{delete_slide, delete_slides};
pub use mutator::{
    duplicate_slide, insert_picture, read_provenance, remove_all_text, remove_free_text_boxes,
    remove_pictures, set_provenance,
};
pub use position::{all_image_positions, get_all_positions, get_position, image_position};
pub use presentation::Presentation;
pub use shapes::{Shape, ShapeKind, Slide};
pub use workflow::{
    add_label_to_existing_slide, copy_slide_replace_image, copy_slide_replace_images,
    replace_image_on_existing_slide, replace_images_in_copy, InsertOptions,
};
