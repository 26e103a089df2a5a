use ticklist_shared::{
  ChecklistRow,
  Gesture,
  InteractionMode
};
use web_sys::{
  Event,
  HtmlInputElement
};
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  TargetCast,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct TaskListRowProps {
  pub row:       ChecklistRow,
  pub mode:      InteractionMode,
  pub on_toggle: Callback<(u64, bool)>,
  pub on_delete: Callback<u64>
}

#[function_component(TaskListRow)]
pub fn task_list_row(
  props: &TaskListRowProps
) -> Html {
  let id = props.row.id;
  let mode = props.mode;
  let row_toggles =
    mode.toggles_on(Gesture::RowClick);

  let on_checkbox_change = {
    let on_toggle =
      props.on_toggle.clone();
    Callback::from(move |e: Event| {
      if !mode.toggles_on(
        Gesture::CheckboxChange
      ) {
        return;
      }
      let input: HtmlInputElement =
        e.target_unchecked_into();
      on_toggle.emit((id, input.checked()));
    })
  };

  let on_row_click = {
    let on_toggle =
      props.on_toggle.clone();
    let next = props.row.next_completed();
    Callback::from(
      move |_: MouseEvent| {
        if row_toggles {
          on_toggle.emit((id, next));
        }
      }
    )
  };

  let on_delete_click = {
    let on_delete =
      props.on_delete.clone();
    Callback::from(
      move |e: MouseEvent| {
        e.stop_propagation();
        on_delete.emit(id);
      }
    )
  };

  let text_style = if props.row.struck() {
    "text-decoration: line-through;"
  } else {
    ""
  };

  html! {
      <li
          class={classes!(row_toggles.then_some("row-toggle"))}
          onclick={on_row_click}
      >
          <input
              type="checkbox"
              class={classes!(row_toggles.then_some("passive"))}
              tabindex={if row_toggles { "-1" } else { "0" }}
              checked={props.row.completed}
              onchange={on_checkbox_change}
          />
          <span
              class={classes!("text", props.row.completed.then_some("done"))}
              style={text_style}
          >
              { &props.row.text }
          </span>
          <button class="btn danger" onclick={on_delete_click}>{ "Delete" }</button>
      </li>
  }
}
