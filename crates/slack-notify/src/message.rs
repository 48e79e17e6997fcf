use serde::Serialize;

/// Message is the JSON document POSTed to a Slack incoming webhook.
/// `text` is the notification fallback, and `blocks` the rich layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
}

/// Block is the subset of Slack Block Kit layout blocks we render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        text: Text,
    },
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<Text>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        fields: Vec<Text>,
    },
    Context {
        elements: Vec<Text>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    PlainText { text: String },
    Mrkdwn { text: String },
}

impl Text {
    pub fn plain(text: impl Into<String>) -> Self {
        Text::PlainText { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Text::Mrkdwn { text: text.into() }
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        match self {
            Text::PlainText { text } | Text::Mrkdwn { text } => text,
        }
    }
}

impl Block {
    pub fn header(text: impl Into<String>) -> Self {
        Block::Header {
            text: Text::plain(text),
        }
    }

    pub fn section(text: impl Into<String>) -> Self {
        Block::Section {
            text: Some(Text::mrkdwn(text)),
            fields: Vec::new(),
        }
    }

    /// Section laid out as a two-column grid of mrkdwn fields.
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Block::Section {
            text: None,
            fields: fields.into_iter().map(Text::mrkdwn).collect(),
        }
    }

    pub fn context(text: impl Into<String>) -> Self {
        Block::Context {
            elements: vec![Text::mrkdwn(text)],
        }
    }

    /// All text objects of this block, in layout order.
    #[cfg(test)]
    pub fn texts(&self) -> Vec<&Text> {
        match self {
            Block::Header { text } => vec![text],
            Block::Section { text, fields } => text.iter().chain(fields.iter()).collect(),
            Block::Context { elements } => elements.iter().collect(),
        }
    }
}
