//! Command replies rendered as embeds.

use serenity::all::CreateEmbed;

use crate::model::lifecycle::LifecycleReport;

const COLOR_SUCCESS: u32 = 0x2ecc71;
const COLOR_FAILURE: u32 = 0xe74c3c;
const COLOR_INFO: u32 = 0x5865F2; // Discord blurple

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Failure,
    Info,
}

/// Outcome of a command, independent of Discord types so it can be tested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub title: String,
    pub description: String,
    pub tone: Tone,
    pub fields: Vec<(String, String)>,
}

impl Reply {
    fn new(tone: Tone, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tone,
            fields: Vec::new(),
        }
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(Tone::Success, title, description)
    }

    pub fn failure(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(Tone::Failure, title, description)
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(Tone::Info, title, description)
    }

    /// Green or red reply carrying the report message.
    pub fn from_report(title: impl Into<String>, report: &LifecycleReport) -> Self {
        if report.success() {
            Self::success(title, report.message())
        } else {
            Self::failure(title, report.message())
        }
    }

    /// Adds an inline field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn is_success(&self) -> bool {
        self.tone != Tone::Failure
    }

    pub fn embed(&self) -> CreateEmbed {
        let color = match self.tone {
            Tone::Success => COLOR_SUCCESS,
            Tone::Failure => COLOR_FAILURE,
            Tone::Info => COLOR_INFO,
        };

        let mut embed = CreateEmbed::new()
            .title(&self.title)
            .description(&self.description)
            .color(color);

        for (name, value) in &self.fields {
            embed = embed.field(name, value, true);
        }

        embed
    }
}
