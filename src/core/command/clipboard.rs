use async_trait::async_trait;

use crate::core::command::{Command, CommandEnv};
use crate::ui::ToastType;

/// Command to copy text to the system clipboard.
pub struct CopyToClipboardCmd {
    text: String,
    toast_message: String,
    env: CommandEnv,
}

impl CopyToClipboardCmd {
    pub fn new(text: impl Into<String>, toast_message: impl Into<String>, env: CommandEnv) -> Self {
        Self {
            text: text.into(),
            toast_message: toast_message.into(),
            env,
        }
    }
}

#[async_trait]
impl Command for CopyToClipboardCmd {
    fn name(&self) -> String {
        "Copying to clipboard".to_string()
    }

    async fn execute(self: Box<Self>) -> color_eyre::Result<()> {
        self.env.set_clipboard(&self.text)?;
        self.env
            .show_toast(format!("Copied {}", self.toast_message), ToastType::Success);
        Ok(())
    }
}
