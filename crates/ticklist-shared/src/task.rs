use serde::{
  Deserialize,
  Serialize
};

/// One to-do entry as stored in the
/// `tasks` collection.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Task {
  pub id:        u64,
  #[serde(rename = "task", alias = "text")]
  pub text:      String,
  #[serde(default)]
  pub completed: bool
}

/// Validated input for a new task.
///
/// The only validation applied is
/// trimming: anything that trims to an
/// empty string is rejected.
#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct NewTask {
  text: String
}

impl NewTask {
  pub fn parse(
    raw: &str
  ) -> Option<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      None
    } else {
      Some(Self {
        text: trimmed.to_string()
      })
    }
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn into_task(
    self,
    id: u64
  ) -> Task {
    Task {
      id,
      text: self.text,
      completed: false
    }
  }
}

#[cfg(test)]
mod tests {
  use super::{
    NewTask,
    Task
  };

  #[test]
  fn parse_trims_surrounding_whitespace()
  {
    let parsed =
      NewTask::parse("  Buy milk \n")
        .expect("non-blank input");
    assert_eq!(parsed.text(), "Buy milk");

    let task = parsed.into_task(7);
    assert_eq!(task.id, 7);
    assert!(!task.completed);
  }

  #[test]
  fn parse_rejects_blank_input() {
    assert!(NewTask::parse("").is_none());
    assert!(
      NewTask::parse(" \t\r\n ")
        .is_none()
    );
  }

  #[test]
  fn record_uses_task_field_name() {
    let task = Task {
      id:        3,
      text:      "Walk dog".to_string(),
      completed: true
    };
    let value = serde_json::to_value(
      &task
    )
    .expect("serialize");
    assert_eq!(
      value,
      serde_json::json!({
        "id": 3,
        "task": "Walk dog",
        "completed": true
      })
    );

    let aliased: Task =
      serde_json::from_str(
        r#"{"id":4,"text":"Read"}"#
      )
      .expect("deserialize alias");
    assert_eq!(aliased.text, "Read");
    assert!(!aliased.completed);
  }
}
