use serde_json::{Map, Value};

use crate::model::HighlightRecord;
use crate::notion::api;

pub const PAGE_PROPERTY: &str = "Page";
pub const FAVORITE_PROPERTY: &str = "Favorite";
pub const SOURCE_PROPERTY: &str = "Source";
pub const NOTE_HEADING: &str = "Note";

/// A highlight page ready to be created: its properties and body blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightDocument {
    pub properties: Map<String, Value>,
    pub children: Vec<Value>,
}

impl HighlightDocument {
    pub fn builder(record: &HighlightRecord) -> HighlightDocumentBuilder<'_> {
        HighlightDocumentBuilder::new(record)
    }

    pub fn source_id(&self) -> Option<&str> {
        self.properties
            .get(SOURCE_PROPERTY)?
            .get("relation")?
            .get(0)?
            .get("id")?
            .as_str()
    }
}

/// Body sections in render order. Each one contributes zero or more blocks.
#[derive(Debug, Clone, Copy)]
enum Section {
    Quote,
    Note,
}

const SECTIONS: [Section; 2] = [Section::Quote, Section::Note];

impl Section {
    fn blocks(self, record: &HighlightRecord) -> Vec<Value> {
        match self {
            Section::Quote => vec![api::quote_block(&record.highlight_text)],
            Section::Note => match record.note() {
                Some(note) => vec![api::heading_3_block(NOTE_HEADING), api::paragraph_block(note)],
                None => Vec::new(),
            },
        }
    }
}

pub struct HighlightDocumentBuilder<'a> {
    record: &'a HighlightRecord,
    favorite: bool,
    source_id: Option<&'a str>,
}

impl<'a> HighlightDocumentBuilder<'a> {
    pub fn new(record: &'a HighlightRecord) -> Self {
        Self {
            record,
            favorite: false,
            source_id: None,
        }
    }

    pub fn favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    pub fn source(mut self, source_id: Option<&'a str>) -> Self {
        self.source_id = source_id;
        self
    }

    pub fn build(self) -> HighlightDocument {
        let children = SECTIONS
            .iter()
            .flat_map(|section| section.blocks(self.record))
            .collect();

        let mut properties = Map::new();
        properties.insert(
            PAGE_PROPERTY.to_string(),
            api::number_property(self.record.page_number),
        );
        properties.insert(
            FAVORITE_PROPERTY.to_string(),
            api::checkbox_property(self.favorite),
        );
        if let Some(id) = self.source_id {
            properties.insert(SOURCE_PROPERTY.to_string(), api::relation_property(id));
        }

        HighlightDocument {
            properties,
            children,
        }
    }
}
