//! Confirmation dialogs shown before saving, discarding or deleting.

/// What the dialog is asking the user to confirm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfirmKind {
    #[default]
    Confirm,
    Save,
    Delete,
}

impl ConfirmKind {
    pub fn default_title(&self) -> &'static str {
        match self {
            ConfirmKind::Delete => "Delete?",
            ConfirmKind::Save => "Save?",
            ConfirmKind::Confirm => "Confirm",
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ConfirmKind::Delete => {
                "Do you really want to delete this recipe? This cannot be undone."
            }
            ConfirmKind::Save => "Save your changes?",
            ConfirmKind::Confirm => "Are you sure?",
        }
    }

    pub fn default_confirm_label(&self) -> &'static str {
        match self {
            ConfirmKind::Delete => "Yes, delete",
            ConfirmKind::Save => "Yes, save",
            ConfirmKind::Confirm => "Confirm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogResponse {
    Confirm,
    Cancel,
}

/// A confirmation prompt. Empty overrides fall back to the kind's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub kind: ConfirmKind,
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl ConfirmDialog {
    pub fn new(kind: ConfirmKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn title(&self) -> &str {
        non_empty_or(&self.title, self.kind.default_title())
    }

    pub fn message(&self) -> &str {
        non_empty_or(&self.message, self.kind.default_message())
    }

    pub fn confirm_label(&self) -> &str {
        non_empty_or(&self.confirm_label, self.kind.default_confirm_label())
    }

    pub fn cancel_label(&self) -> &str {
        non_empty_or(&self.cancel_label, "Cancel")
    }

    /// Interpret a typed answer. Only an explicit yes confirms; blank input
    /// cancels, since these actions are destructive.
    pub fn response_for_answer(answer: &str) -> DialogResponse {
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => DialogResponse::Confirm,
            _ => DialogResponse::Cancel,
        }
    }

    /// One-line prompt for a terminal.
    pub fn prompt(&self) -> String {
        format!(
            "{} {} [{} = y / {} = N] ",
            self.title(),
            self.message(),
            self.confirm_label(),
            self.cancel_label()
        )
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
