use std::path::{Path, PathBuf};

use quorum_core::{error::Result, template::ChatPromptTemplate};

use crate::loader::read_text_resource;

/// Paths of the system and user prompt of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptFiles {
    pub system: PathBuf,
    pub user: PathBuf,
}

impl PromptFiles {
    pub fn new(system: impl Into<PathBuf>, user: impl Into<PathBuf>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// `<dir>/<name>_system_prompt.txt` and `<dir>/<name>_user_prompt.txt`.
    pub fn named(dir: impl AsRef<Path>, name: &str) -> Self {
        let dir = dir.as_ref();
        Self::new(
            dir.join(format!("{name}_system_prompt.txt")),
            dir.join(format!("{name}_user_prompt.txt")),
        )
    }

    /// Read both files and build the template. With `with_tools` the
    /// template also reserves the agent scratchpad and task memory
    /// placeholders.
    pub fn load(&self, with_tools: bool) -> Result<ChatPromptTemplate> {
        let system = read_text_resource(&self.system)?;
        let user = read_text_resource(&self.user)?;

        if with_tools {
            ChatPromptTemplate::for_agent(&system, &user)
        } else {
            ChatPromptTemplate::from_messages(&system, &user)
        }
    }
}
