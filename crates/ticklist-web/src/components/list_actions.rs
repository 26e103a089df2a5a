use ticklist_shared::InteractionMode;
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct ListActionsProps {
  pub total:          usize,
  pub completed:      usize,
  pub mode:           InteractionMode,
  pub on_clear:       Callback<MouseEvent>,
  pub on_toggle_mode: Callback<MouseEvent>
}

#[function_component(ListActions)]
pub fn list_actions(
  props: &ListActionsProps
) -> Html {
  let mode_label = match props.mode {
    | InteractionMode::Checkbox => {
      "Toggle: checkbox"
    }
    | InteractionMode::Row => {
      "Toggle: whole row"
    }
  };

  html! {
      <div class="actions">
          <span>{ format!("{} of {} done", props.completed, props.total) }</span>
          <span>
              <button class="btn" onclick={props.on_toggle_mode.clone()}>{ mode_label }</button>
              { " " }
              <button class="btn danger" onclick={props.on_clear.clone()}>{ "Clear all" }</button>
          </span>
      </div>
  }
}
