//! Screen navigation.
//!
//! The current screen is a single value. Navigating replaces it; there is
//! no history stack, so every screen has one fixed "back" target.

use serde::Serialize;

/// A screen of the application.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum View {
    /// Landing screen with the note list.
    #[default]
    Home,
    /// Application settings.
    Settings,
    /// Note editor.
    #[serde(rename = "new")]
    NewNote,
    /// A single note.
    #[serde(rename = "view")]
    ViewNote {
        /// Id of the displayed note.
        id: String,
    },
    /// EMT landing screen.
    #[serde(rename = "emt")]
    EmtDashboard,
    /// New EMT incident form.
    EmtIncident,
    /// Editing a saved EMT incident.
    EmtEdit {
        /// Position in the stored list.
        index: usize,
    },
    /// EMT incident list.
    EmtHistory,
    /// A single EMT incident, read-only.
    EmtView {
        /// Position in the stored list.
        index: usize,
    },
    /// Fire landing screen.
    FireDashboard,
    /// New fire incident form.
    FireIncident,
    /// Editing a saved fire incident.
    FireEdit {
        /// Position in the stored list.
        index: usize,
    },
    /// Fire incident list.
    FireHistory,
    /// A single fire incident, read-only.
    FireView {
        /// Position in the stored list.
        index: usize,
    },
}

impl View {
    /// The screen the back button leads to.
    #[must_use]
    pub fn back(&self) -> View {
        match self {
            Self::Home
            | Self::Settings
            | Self::NewNote
            | Self::ViewNote { .. }
            | Self::EmtDashboard
            | Self::FireDashboard => Self::Home,
            Self::EmtIncident | Self::EmtEdit { .. } | Self::EmtHistory => Self::EmtDashboard,
            Self::EmtView { .. } => Self::EmtHistory,
            Self::FireIncident | Self::FireHistory => Self::FireDashboard,
            Self::FireEdit { .. } | Self::FireView { .. } => Self::FireHistory,
        }
    }

    /// Screen name without parameters.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Settings => "settings",
            Self::NewNote => "new",
            Self::ViewNote { .. } => "view",
            Self::EmtDashboard => "emt",
            Self::EmtIncident => "emt-incident",
            Self::EmtEdit { .. } => "emt-edit",
            Self::EmtHistory => "emt-history",
            Self::EmtView { .. } => "emt-view",
            Self::FireDashboard => "fire-dashboard",
            Self::FireIncident => "fire-incident",
            Self::FireEdit { .. } => "fire-edit",
            Self::FireHistory => "fire-history",
            Self::FireView { .. } => "fire-view",
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ViewNote { id } => write!(f, "{}/{id}", self.name()),
            Self::EmtEdit { index }
            | Self::EmtView { index }
            | Self::FireEdit { index }
            | Self::FireView { index } => write!(f, "{}/{index}", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}
