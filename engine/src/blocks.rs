use serde::{Deserialize, Serialize};

/// One block of post content. The document store records each kind with its
/// own payload shape; unknown kinds decode into [`ContentBlock::Unknown`] so
/// a newer block type never fails a ranking call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", from = "RawBlock")]
pub enum ContentBlock {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    List { items: Vec<String>, ordered: bool },
    Quote { text: String, caption: Option<String> },
    Code { code: String, language: Option<String> },
    Image { url: String, caption: Option<String> },
    Unknown { text: Option<String> },
}

impl ContentBlock {
    /// Plain text this block contributes to ranking. Code and images carry
    /// no prose; unknown blocks contribute their text field if one was
    /// present on the wire.
    pub fn plain_text(&self) -> Option<String> {
        match self {
            ContentBlock::Heading { text, .. } | ContentBlock::Paragraph { text } => {
                non_empty(text)
            }
            ContentBlock::List { items, .. } => {
                let joined = items
                    .iter()
                    .map(|item| item.trim())
                    .filter(|item| !item.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                if joined.is_empty() {
                    None
                } else {
                    Some(joined)
                }
            }
            ContentBlock::Quote { text, .. } => non_empty(text),
            ContentBlock::Code { .. } | ContentBlock::Image { .. } => None,
            ContentBlock::Unknown { text } => text.as_deref().and_then(non_empty),
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Concatenate the text of every text-bearing block, space-separated.
pub fn content_text(blocks: &[ContentBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        if let Some(text) = block.plain_text() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&text);
        }
    }
    out
}

/// Permissive wire shape for a content block; fields absent from a given
/// kind simply stay `None`.
#[derive(Deserialize)]
struct RawBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    level: Option<u8>,
    #[serde(default)]
    items: Option<Vec<String>>,
    #[serde(default)]
    ordered: Option<bool>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl From<RawBlock> for ContentBlock {
    fn from(raw: RawBlock) -> Self {
        match raw.kind.as_str() {
            "heading" => ContentBlock::Heading {
                level: raw.level.unwrap_or(2),
                text: raw.text.unwrap_or_default(),
            },
            "paragraph" => ContentBlock::Paragraph {
                text: raw.text.unwrap_or_default(),
            },
            "list" => ContentBlock::List {
                items: raw.items.unwrap_or_default(),
                ordered: raw.ordered.unwrap_or(false),
            },
            "quote" => ContentBlock::Quote {
                text: raw.text.unwrap_or_default(),
                caption: raw.caption,
            },
            "code" => ContentBlock::Code {
                code: raw.code.unwrap_or_default(),
                language: raw.language,
            },
            "image" => ContentBlock::Image {
                url: raw.url.unwrap_or_default(),
                caption: raw.caption,
            },
            _ => ContentBlock::Unknown { text: raw.text },
        }
    }
}
