use web_sys::{
  HtmlInputElement,
  InputEvent,
  SubmitEvent
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct NewTaskFormProps {
  pub value:     String,
  pub on_input:  Callback<String>,
  pub on_submit: Callback<()>
}

#[function_component(NewTaskForm)]
pub fn new_task_form(
  props: &NewTaskFormProps
) -> Html {
  let on_input = {
    let on_input = props.on_input.clone();
    Callback::from(
      move |e: InputEvent| {
        let input: HtmlInputElement =
          e.target_unchecked_into();
        on_input.emit(input.value());
      }
    )
  };

  let on_submit = {
    let on_submit =
      props.on_submit.clone();
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        on_submit.emit(());
      }
    )
  };

  html! {
      <form class="new-task" onsubmit={on_submit}>
          <input
              type="text"
              placeholder="What needs doing?"
              value={props.value.clone()}
              oninput={on_input}
          />
          <button class="btn primary" type="submit">{ "Add" }</button>
      </form>
  }
}
