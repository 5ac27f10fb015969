use std::collections::HashMap;
use std::rc::Rc;

use crate::xml::{ScriptDocument, ScriptElement};

/// Block ids of one document mapped to their elements.
///
/// Blocks keep the position of their first declaration; a later block with the
/// same id replaces the element but not the position.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    entries: Vec<(String, Rc<ScriptElement>)>,
    index_by_id: HashMap<String, usize>,
    duplicates: Vec<String>,
}

impl BlockRegistry {
    pub fn from_document(document: &ScriptDocument) -> Self {
        let mut registry = Self::default();
        registry.collect(&document.root);
        registry
    }

    fn collect(&mut self, element: &Rc<ScriptElement>) {
        if element.name == "block" {
            if let Some(id) = element.id() {
                self.register(id, Rc::clone(element));
            }
        }
        for child in &element.children {
            self.collect(child);
        }
    }

    fn register(&mut self, id: &str, element: Rc<ScriptElement>) {
        match self.index_by_id.get(id) {
            Some(&index) => {
                self.entries[index].1 = element;
                self.duplicates.push(id.to_string());
            }
            None => {
                self.index_by_id.insert(id.to_string(), self.entries.len());
                self.entries.push((id.to_string(), element));
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Rc<ScriptElement>> {
        self.index_by_id.get(id).map(|&index| &self.entries[index].1)
    }

    pub fn first(&self) -> Option<(&str, &Rc<ScriptElement>)> {
        self.entries
            .first()
            .map(|(id, element)| (id.as_str(), element))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    /// Ids declared more than once, in the order the repeats were found.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
