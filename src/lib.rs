//! PDF Object Model Library for Rust
//!
//! Presents the object graph of a PDF document as a lazily built tree
//! table, suitable for an object browser. Every dictionary entry, array
//! element and followed reference becomes a row with three columns: where
//! the object appears, its type, and its value.
//!
//! The same object can appear at several places in the tree (two
//! references to one indirect object, or a reference cycle). The model
//! keeps every such alias consistent when the object is edited, and
//! announces each change of shape to its listeners before and after it
//! happens.
//!
//! ```
//! use pdf_object_model::{parse_document, ItemRole, ModelIndex, PdfObjectModel};
//!
//! let document = parse_document(
//!     b"1 0 obj << /Type /Catalog /Count 3 >> endobj trailer << /Root 1 0 R >>",
//! )?;
//! let mut model = PdfObjectModel::new(document)?;
//!
//! let root = model.index(0, 0, &ModelIndex::invalid());
//! assert_eq!(model.row_count(&root), 2);
//!
//! let count = model.index(1, 2, &root);
//! model.set_data(&count, b"4", ItemRole::Edit)?;
//! assert!(model.is_document_changed());
//! # Ok::<(), pdf_object_model::ObjectModelError>(())
//! ```

mod error;
pub mod model;
pub mod pdf;

pub use error::{ModelResult, ObjectModelError};
pub use model::{
    Column, ItemData, ItemFlags, ItemRole, ModelConfig, ModelEvent, ModelIndex, ModelListener,
    ModelTree, NodeId, Orientation, Parentage, PdfObjectModel, RootSelection,
};
pub use pdf::{parse_document, parse_object, DataType, Dictionary, Document, Object, ObjectId, ObjectRef};

/// Parse `data` as a document and build a model over it with `config`
pub fn open(data: &[u8], config: ModelConfig) -> ModelResult<PdfObjectModel> {
    let document = parse_document(data)?;
    PdfObjectModel::with_config(document, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &[u8] = b"\
        1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n\
        2 0 obj << /Type /Pages /Kids [] /Count 0 >> endobj\n\
        trailer << /Root 1 0 R /Size 3 >>";

    #[test]
    fn test_open() -> ModelResult<()> {
        let mut model = open(SAMPLE, ModelConfig::default())?;
        let root = model.index(0, 0, &ModelIndex::invalid());

        assert_eq!(model.row_count(&root), 2);
        assert_eq!(model.data(&root, ItemRole::Display).as_text(), Some("/Root"));
        assert_eq!(model.tree().len(), 3);
        Ok(())
    }

    #[test]
    fn test_open_rejects_garbage() {
        assert!(open(b"1 0 obj << /Type", ModelConfig::default()).is_err());
        assert!(matches!(
            open(b"trailer << >>", ModelConfig::default()),
            Err(ObjectModelError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_edit_round_trip_through_document() -> ModelResult<()> {
        let mut model = open(SAMPLE, ModelConfig::default())?;
        let root = model.index(0, 0, &ModelIndex::invalid());
        let pages_ref = model.index(1, 0, &root);
        let pages = model.index(0, 0, &pages_ref);
        let count = model.index(2, 2, &pages);

        assert!(model.set_data(&count, b"7", ItemRole::Edit)?);

        let document = model.into_document();
        let pages = document.resolve(ObjectRef::new(2, 0)).and_then(Object::as_dict);
        assert_eq!(pages.and_then(|p| p.get_integer("Count")), Some(7));
        Ok(())
    }
}
