use core::fmt::{Display, Formatter, Result as FmtResult};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_value};

use crate::Result;

/// Description used for image hits the search backend left undescribed.
pub const DEFAULT_IMAGE_DESCRIPTION: &str = "No description available";

/// A tool call emitted by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Identifier the result must echo back.
    pub id: String,
    /// Wire name of the tool.
    pub name: String,
    /// Tool-specific named parameters.
    #[serde(default)]
    pub input: Value,
}

impl ToolInvocation {
    /// Creates an invocation.
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Deserializes the input mapping into the tool's argument struct.
    ///
    /// # Errors
    /// Returns [`crate::Error::Json`] when a required field is missing or mistyped.
    pub fn parse_input<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(from_value(self.input.clone())?)
    }
}

/// The envelope returned to the conversation for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "tool_result")]
pub struct ToolResult {
    /// Id of the invocation this result answers.
    pub tool_use_id: String,
    /// Ordered payload, text before images.
    pub content: Vec<ContentBlock>,
}

impl ToolResult {
    /// Wraps content for the given invocation.
    pub fn new(tool_use_id: impl Into<String>, content: Vec<ContentBlock>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content,
        }
    }

    /// Concatenated text of every text block.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of image blocks in the payload.
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.content
            .iter()
            .filter(|block| matches!(block, ContentBlock::Image { .. }))
            .count()
    }
}

/// One unit of a tool result payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text {
        /// The text itself.
        text: String,
    },
    /// An embedded image.
    Image {
        /// Encoded image bytes.
        source: ImageSource,
    },
}

impl ContentBlock {
    /// Creates a text block.
    pub fn text<T: Into<String>>(text: T) -> Self {
        Self::Text { text: text.into() }
    }

    /// Creates a base64 image block.
    pub fn base64_image(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Image {
            source: ImageSource {
                encoding: ImageEncoding::Base64,
                media_type: media_type.into(),
                data: data.into(),
            },
        }
    }

    /// Returns the text when this is a text block.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Image { .. } => None,
        }
    }
}

/// Image payload of a [`ContentBlock::Image`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    /// Encoding of `data`.
    #[serde(rename = "type")]
    pub encoding: ImageEncoding,
    /// Declared content type, e.g. `image/png`.
    pub media_type: String,
    /// Encoded bytes.
    pub data: String,
}

/// Supported image encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageEncoding {
    /// Standard base64 with padding.
    Base64,
}

/// A normalized image reference from the search backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHit {
    /// Image location without a trailing slash.
    pub url: String,
    /// Human readable description.
    pub description: String,
}

impl ImageHit {
    /// Normalizes a raw url and optional description into a hit.
    pub fn new(url: &str, description: Option<String>) -> Self {
        Self {
            url: url.strip_suffix('/').unwrap_or(url).to_owned(),
            description: description
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE_DESCRIPTION.to_owned()),
        }
    }
}

/// Storage key `project/file` for a file inside a project folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectFilePath {
    project: String,
    file_name: String,
}

impl ProjectFilePath {
    /// Builds the key for `file_name` inside `project`.
    pub fn new(project: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            file_name: file_name.into(),
        }
    }

    /// Project folder component.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// File name component.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl Display for ProjectFilePath {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        write!(formatter, "{}/{}", self.project, self.file_name)
    }
}
