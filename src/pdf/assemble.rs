//! Page assembly using lopdf
//!
//! Source documents are renumbered once into a shared id space. Each output
//! then copies only the objects its pages reach, gets a fresh page tree and
//! is saved on its own.

use std::collections::{BTreeMap, HashMap};

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::document::{PageSource, SourceDocument};
use crate::error::{Error, Result};
use crate::plan::AssemblyUnit;
use crate::queue::DocumentId;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Parent chains deeper than this are treated as broken
const MAX_TREE_DEPTH: usize = 64;

/// Renumbered source objects and page tables, shared by every unit of a job
#[derive(Debug)]
pub struct PagePool {
    objects: BTreeMap<ObjectId, Object>,
    pages: HashMap<DocumentId, Vec<ObjectId>>,
    max_id: u32,
}

impl PagePool {
    /// Renumber `sources` into one id space
    pub fn new(sources: &[&SourceDocument]) -> Result<Self> {
        let mut max_id = 1;
        let mut objects = BTreeMap::new();
        let mut pages = HashMap::new();

        for source in sources {
            // Renumber objects in this document to avoid conflicts
            let mut doc = source.document().clone();
            doc.renumber_objects_with(max_id);
            max_id = doc.max_id + 1;

            let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
            for &page_id in &page_ids {
                materialize_inherited(&mut doc, page_id)?;
            }

            pages.insert(source.id(), page_ids);
            objects.extend(doc.objects);
        }

        Ok(Self {
            objects,
            pages,
            max_id: max_id - 1,
        })
    }

    fn page_id(&self, document: DocumentId, index: usize) -> Result<ObjectId> {
        let table = self
            .pages
            .get(&document)
            .ok_or(Error::UnknownDocument(document))?;
        table
            .get(index)
            .copied()
            .ok_or_else(|| Error::UnreadableDocument {
                name: document.to_string(),
                reason: format!("page index {} does not exist", index),
            })
    }

    /// Copy `root` and everything it references into `out`
    ///
    /// Page tree parents are not followed, so a page pulls in its own
    /// content and resources but not its siblings.
    fn copy_reachable(&self, root: ObjectId, out: &mut BTreeMap<ObjectId, Object>) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if out.contains_key(&id) {
                continue;
            }
            if let Some(object) = self.objects.get(&id) {
                push_references(object, &mut stack);
                out.insert(id, object.clone());
            }
        }
    }

    /// Build one output document from `unit`
    pub fn assemble(&self, unit: &AssemblyUnit) -> Result<Vec<u8>> {
        let mut assembled = Document::with_version("1.5");
        // new_object_id() must hand out ids above every pooled object
        assembled.max_id = self.max_id;

        let mut page_ids = Vec::with_capacity(unit.len());
        for page in &unit.pages {
            let page_id = self.page_id(page.document, page.index)?;

            if page_ids.contains(&page_id) {
                // Same page listed twice: the page tree needs a distinct node
                let copy = assembled.get_object(page_id)?.clone();
                page_ids.push(assembled.add_object(copy));
            } else {
                self.copy_reachable(page_id, &mut assembled.objects);
                page_ids.push(page_id);
            }
        }

        let pages_id = assembled.new_object_id();

        let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
        let mut pages_object = Dictionary::new();
        pages_object.set("Type", Object::Name(b"Pages".to_vec()));
        pages_object.set("Count", Object::Integer(page_ids.len() as i64));
        pages_object.set("Kids", Object::Array(kids));

        let catalog_id = assembled.new_object_id();
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));

        assembled.objects.insert(catalog_id, Object::Dictionary(catalog));
        assembled.objects.insert(pages_id, Object::Dictionary(pages_object));
        assembled.trailer.set("Root", Object::Reference(catalog_id));

        for &page_id in &page_ids {
            if let Ok(page) = assembled.get_dictionary_mut(page_id) {
                page.set("Parent", Object::Reference(pages_id));
            }
        }

        // Objects reachable only through unselected pages, e.g. via /P links
        let pruned = assembled.prune_objects();
        log::debug!(
            "Assembled {} pages from {} objects, pruned {}",
            page_ids.len(),
            assembled.objects.len(),
            pruned.len()
        );

        assembled.compress();

        let mut buffer = Vec::new();
        assembled.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

/// Build one output document from `unit`
///
/// `sources` must contain every document the unit refers to. Jobs with
/// several units should build a [`PagePool`] once instead.
pub fn assemble_unit(unit: &AssemblyUnit, sources: &[&SourceDocument]) -> Result<Vec<u8>> {
    let used = unit.documents();
    if let Some(missing) = used
        .iter()
        .find(|&&id| !sources.iter().any(|s| s.id() == id))
    {
        return Err(Error::UnknownDocument(*missing));
    }

    let sources: Vec<&SourceDocument> = sources
        .iter()
        .copied()
        .filter(|s| used.contains(&s.id()))
        .collect();
    PagePool::new(&sources)?.assemble(unit)
}

fn is_page_tree_node(dict: &Dictionary) -> bool {
    matches!(
        dict.get(b"Type").and_then(Object::as_name),
        Ok(b"Page") | Ok(b"Pages")
    )
}

fn push_dictionary_references(dict: &Dictionary, stack: &mut Vec<ObjectId>) {
    let skip_parent = is_page_tree_node(dict);
    for (key, value) in dict.iter() {
        if skip_parent && key.as_slice() == b"Parent" {
            continue;
        }
        push_references(value, stack);
    }
}

fn push_references(object: &Object, stack: &mut Vec<ObjectId>) {
    match object {
        Object::Reference(id) => stack.push(*id),
        Object::Array(items) => {
            for item in items {
                push_references(item, stack);
            }
        }
        Object::Dictionary(dict) => push_dictionary_references(dict, stack),
        Object::Stream(stream) => push_dictionary_references(&stream.dict, stack),
        _ => {}
    }
}

/// Copy inherited attributes from the page's ancestors onto the page itself
///
/// Once the page is re-parented under a new Pages node, anything it used to
/// inherit from the old tree would be lost.
fn materialize_inherited(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut inherited: Vec<(Vec<u8>, Object)> = Vec::new();
    {
        let page = doc.get_dictionary(page_id)?;
        let mut missing: Vec<&[u8]> = INHERITABLE
            .iter()
            .copied()
            .filter(|key| !page.has(key))
            .collect();

        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut depth = 0;

        while let Some(parent_id) = parent {
            if missing.is_empty() || depth >= MAX_TREE_DEPTH {
                break;
            }
            let node = match doc.get_dictionary(parent_id) {
                Ok(node) => node,
                Err(_) => break,
            };
            missing.retain(|key| match node.get(key) {
                Ok(value) => {
                    inherited.push((key.to_vec(), value.clone()));
                    false
                }
                Err(_) => true,
            });
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
            depth += 1;
        }
    }

    if !inherited.is_empty() {
        let page = doc.get_dictionary_mut(page_id)?;
        for (key, value) in inherited {
            page.set(key, value);
        }
    }
    Ok(())
}
