use ticklist_shared::Checklist;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

use super::TaskListRow;

#[derive(Properties, PartialEq)]
pub struct TaskListProps {
  pub checklist: Checklist,
  pub on_toggle: Callback<(u64, bool)>,
  pub on_delete: Callback<u64>
}

#[function_component(TaskList)]
pub fn task_list(
  props: &TaskListProps
) -> Html {
  if props.checklist.is_empty() {
    return html! {
        <div class="empty">{ "Nothing to do." }</div>
    };
  }

  html! {
      <ul class="task-list">
          {
              for props.checklist.rows.iter().cloned().map(|row| html! {
                  <TaskListRow
                      key={row.id}
                      row={row.clone()}
                      mode={props.checklist.mode}
                      on_toggle={props.on_toggle.clone()}
                      on_delete={props.on_delete.clone()}
                  />
              })
          }
      </ul>
  }
}
