//! Notion wire types and block builders.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Notion rejects text objects whose content exceeds this many characters.
pub const MAX_TEXT_LENGTH: usize = 2000;

#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub filter: TitleFilter<'a>,
}

#[derive(Debug, Serialize)]
pub struct TitleFilter<'a> {
    pub property: &'a str,
    pub title: TitleEquals<'a>,
}

#[derive(Debug, Serialize)]
pub struct TitleEquals<'a> {
    pub equals: &'a str,
}

impl<'a> QueryRequest<'a> {
    pub fn title_equals(property: &'a str, title: &'a str) -> Self {
        Self {
            filter: TitleFilter {
                property,
                title: TitleEquals { equals: title },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<PageRef>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub id: String,
    #[serde(default)]
    pub title: Vec<RichText>,
}

impl Database {
    pub fn display_title(&self) -> String {
        self.title
            .iter()
            .map(|part| match (&part.plain_text, &part.text) {
                (Some(plain), _) => plain.as_str(),
                (None, Some(text)) => text.content.as_str(),
                (None, None) => "",
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: Option<String>,
    #[serde(default)]
    pub text: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
pub struct TextContent {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CreatePageRequest<'a> {
    pub parent: Parent<'a>,
    pub properties: &'a Map<String, Value>,
    pub children: &'a [Value],
}

#[derive(Debug, Serialize)]
pub struct Parent<'a> {
    pub database_id: &'a str,
}

fn rich_text(content: &str, italic: bool) -> Vec<Value> {
    let chars: Vec<char> = content.chars().collect();
    if chars.is_empty() {
        return vec![text_object(String::new(), italic)];
    }
    chars
        .chunks(MAX_TEXT_LENGTH)
        .map(|chunk| text_object(chunk.iter().collect(), italic))
        .collect()
}

fn text_object(content: String, italic: bool) -> Value {
    let mut text = json!({
        "type": "text",
        "text": { "content": content },
    });
    if italic {
        text["annotations"] = json!({ "italic": true });
    }
    text
}

fn block(kind: &str, rich_text: Vec<Value>) -> Value {
    let mut block = json!({ "object": "block", "type": kind });
    block[kind] = json!({ "rich_text": rich_text });
    block
}

pub fn quote_block(content: &str) -> Value {
    block("quote", rich_text(content, true))
}

pub fn heading_3_block(content: &str) -> Value {
    block("heading_3", rich_text(content, false))
}

pub fn paragraph_block(content: &str) -> Value {
    block("paragraph", rich_text(content, false))
}

pub fn number_property(value: u64) -> Value {
    json!({ "number": value })
}

pub fn checkbox_property(value: bool) -> Value {
    json!({ "checkbox": value })
}

pub fn relation_property(page_id: &str) -> Value {
    json!({ "relation": [{ "id": page_id }] })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_block_is_italic() {
        let block = quote_block("Listen deeply.");
        assert_eq!(block["type"], "quote");
        let text = &block["quote"]["rich_text"][0];
        assert_eq!(text["text"]["content"], "Listen deeply.");
        assert_eq!(text["annotations"]["italic"], true);
    }

    #[test]
    fn test_paragraph_has_no_annotations() {
        let block = paragraph_block("plain");
        assert_eq!(block["type"], "paragraph");
        assert!(block["paragraph"]["rich_text"][0].get("annotations").is_none());
    }

    #[test]
    fn test_long_text_is_split() {
        let long = "é".repeat(MAX_TEXT_LENGTH + 5);
        let block = paragraph_block(&long);
        let parts = block["paragraph"]["rich_text"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(
            parts[1]["text"]["content"].as_str().unwrap().chars().count(),
            5
        );
    }

    #[test]
    fn test_query_request_shape() {
        let body = serde_json::to_value(QueryRequest::title_equals("Name", "Dune")).unwrap();
        assert_eq!(
            body,
            json!({ "filter": { "property": "Name", "title": { "equals": "Dune" } } })
        );
    }

    #[test]
    fn test_database_display_title() {
        let db: Database = serde_json::from_value(json!({
            "id": "abc",
            "title": [
                { "plain_text": "Reading ", "text": { "content": "Reading " } },
                { "text": { "content": "Highlights" } }
            ]
        }))
        .unwrap();
        assert_eq!(db.display_title(), "Reading Highlights");
    }
}
