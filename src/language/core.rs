use anyhow::{anyhow, Context};
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

pub const DEFAULT_LANGUAGE: &str = "english";

/// Immutable word pool a test sequence is drawn from
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Language {
    pub name: String,
    pub words: Vec<String>,
}

impl Language {
    /// Load one of the embedded word lists by file stem
    pub fn load(name: &str) -> anyhow::Result<Self> {
        read_language_from_file(&format!("{name}.json"))
    }

    pub fn english() -> anyhow::Result<Self> {
        Self::load(DEFAULT_LANGUAGE)
    }

    /// Build a corpus from an explicit list (tests, custom pools)
    pub fn from_words<I, S>(name: &str, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn read_language_from_file(file_name: &str) -> anyhow::Result<Language> {
    let file = LANG_DIR
        .get_file(file_name)
        .ok_or_else(|| anyhow!("language file {file_name} not found"))?;

    let file_as_str = file
        .contents_utf8()
        .with_context(|| format!("{file_name} is not valid utf-8"))?;

    let lang = from_str(file_as_str).with_context(|| format!("unable to deserialize {file_name}"))?;

    Ok(lang)
}
