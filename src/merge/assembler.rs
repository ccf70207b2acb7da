//! In-memory PDF assembly.
//!
//! The assembler owns the in-progress output document for exactly one
//! merge invocation. The first valid input becomes the base document;
//! every later input is renumbered past the current `max_id`, its objects
//! copied across, and its page references pushed onto the base Kids array
//! in their original internal order. Pages are strictly append-only: no
//! reordering, no deduplication, no re-rendering.

use lopdf::{Document, Object, ObjectId};

use crate::error::{ParseError, PipelineError};

/// Accumulates pages from validated input documents into one output PDF.
pub struct DocumentAssembler {
    /// The in-progress output. `None` until the first successful append.
    output: Option<Document>,

    /// Highest object id in `output`; appended documents renumber past it.
    max_id: u32,

    /// Object id of the base document's Pages node.
    pages_root: ObjectId,

    /// Running page count across all appended inputs.
    page_count: usize,
}

impl DocumentAssembler {
    /// Create an assembler holding an empty output document.
    pub fn new() -> Self {
        Self {
            output: None,
            max_id: 0,
            pages_root: (0, 0),
            page_count: 0,
        }
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// True if no pages have been appended yet.
    pub fn is_empty(&self) -> bool {
        self.page_count == 0
    }

    /// Parse `bytes` as a PDF and append all of its pages, in their
    /// original internal order, to the end of the output.
    ///
    /// Returns the number of pages appended. A failure leaves the
    /// accumulated output exactly as it was, so the caller is free to
    /// skip the entry and continue.
    ///
    /// # Errors
    ///
    /// [`ParseError`] if `bytes` is not a well-formed PDF, parses with
    /// zero pages, or has no usable page tree.
    pub fn append(&mut self, bytes: &[u8]) -> Result<usize, ParseError> {
        let mut doc = Document::load_mem(bytes).map_err(|e| ParseError::new(e.to_string()))?;

        let appended = doc.get_pages().len();
        if appended == 0 {
            return Err(ParseError::new("document has no pages"));
        }

        match self.output.as_mut() {
            None => {
                // Validate the tree before installing the base so a broken
                // first input is skipped instead of poisoning the output.
                let pages_root = locate_pages_root(&doc)?;
                self.max_id = doc.max_id;
                self.pages_root = pages_root;
                self.output = Some(doc);
            }
            Some(merged) => {
                doc.renumber_objects_with(self.max_id + 1);
                self.max_id = doc.max_id;

                let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
                merged.objects.extend(doc.objects);
                graft_pages(merged, self.pages_root, &page_ids)?;
            }
        }

        self.page_count += appended;
        Ok(appended)
    }

    /// Serialize the accumulated output to bytes, consuming the assembler.
    ///
    /// # Errors
    ///
    /// [`PipelineError::EmptyOutput`] if no pages were ever appended;
    /// [`PipelineError::Serialize`] if lopdf fails to write the document.
    pub fn serialize(self) -> Result<Vec<u8>, PipelineError> {
        let mut doc = self.output.ok_or(PipelineError::EmptyOutput)?;

        doc.compress();
        doc.renumber_objects();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| PipelineError::Serialize {
                detail: e.to_string(),
            })?;

        Ok(buffer)
    }
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the Pages node referenced by the catalog and verify its Kids
/// array is usable for grafting.
fn locate_pages_root(doc: &Document) -> Result<ObjectId, ParseError> {
    let catalog = doc
        .catalog()
        .map_err(|e| ParseError::new(format!("no catalog: {e}")))?;

    let pages_id = catalog
        .get(b"Pages")
        .and_then(|p| p.as_reference())
        .map_err(|e| ParseError::new(format!("no pages reference: {e}")))?;

    let pages = doc
        .get_object(pages_id)
        .and_then(Object::as_dict)
        .map_err(|e| ParseError::new(format!("pages node is not a dictionary: {e}")))?;

    pages
        .get(b"Kids")
        .and_then(Object::as_array)
        .map_err(|e| ParseError::new(format!("pages node has no kids array: {e}")))?;

    Ok(pages_id)
}

/// Push `page_ids` onto the base Kids array, bump Count, and point each
/// grafted page's Parent at the base Pages node.
///
/// The base tree was validated when it was installed, so failures here
/// indicate a bug rather than bad input.
fn graft_pages(
    merged: &mut Document,
    pages_root: ObjectId,
    page_ids: &[ObjectId],
) -> Result<(), ParseError> {
    let pages = merged
        .get_object_mut(pages_root)
        .and_then(Object::as_dict_mut)
        .map_err(|e| ParseError::new(format!("pages node vanished: {e}")))?;

    let kids = pages
        .get_mut(b"Kids")
        .and_then(Object::as_array_mut)
        .map_err(|e| ParseError::new(format!("kids array vanished: {e}")))?;
    for &page_id in page_ids {
        kids.push(Object::Reference(page_id));
    }

    let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
    pages.set("Count", Object::Integer(count + page_ids.len() as i64));

    for &page_id in page_ids {
        if let Ok(Object::Dictionary(dict)) = merged.get_object_mut(page_id) {
            dict.set("Parent", Object::Reference(pages_root));
        }
    }

    Ok(())
}
