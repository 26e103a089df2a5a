use serde::{
  Deserialize,
  Serialize
};

use crate::task::Task;

/// Which gesture flips a row's
/// completion flag.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
  #[default]
  Checkbox,
  Row
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Gesture {
  CheckboxChange,
  RowClick
}

impl InteractionMode {
  pub fn storage_value(
    self
  ) -> &'static str {
    match self {
      | Self::Checkbox => "checkbox",
      | Self::Row => "row"
    }
  }

  pub fn from_storage_value(
    raw: &str
  ) -> Option<Self> {
    match raw.trim() {
      | "checkbox" => {
        Some(Self::Checkbox)
      }
      | "row" => Some(Self::Row),
      | _ => None
    }
  }

  pub fn toggled(self) -> Self {
    match self {
      | Self::Checkbox => Self::Row,
      | Self::Row => Self::Checkbox
    }
  }

  pub fn toggles_on(
    self,
    gesture: Gesture
  ) -> bool {
    matches!(
      (self, gesture),
      (
        Self::Checkbox,
        Gesture::CheckboxChange
      ) | (Self::Row, Gesture::RowClick)
    )
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct ChecklistRow {
  pub id:        u64,
  pub text:      String,
  pub completed: bool
}

impl ChecklistRow {
  /// Completed rows are drawn struck
  /// through.
  pub fn struck(&self) -> bool {
    self.completed
  }

  /// Value the toggle gesture writes
  /// back.
  pub fn next_completed(&self) -> bool {
    !self.completed
  }
}

/// Display model rebuilt from the full
/// task list on every reload.
#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct Checklist {
  pub mode: InteractionMode,
  pub rows: Vec<ChecklistRow>
}

impl Checklist {
  pub fn build(
    tasks: &[Task],
    mode: InteractionMode
  ) -> Self {
    Self {
      mode,
      rows: tasks
        .iter()
        .map(|task| ChecklistRow {
          id:        task.id,
          text:      task.text.clone(),
          completed: task.completed
        })
        .collect()
    }
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn completed_count(&self) -> usize {
    self
      .rows
      .iter()
      .filter(|row| row.completed)
      .count()
  }
}
