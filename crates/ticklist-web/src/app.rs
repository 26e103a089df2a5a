use std::rc::Rc;

use ticklist_shared::{
  Checklist,
  ClearOutcome,
  Confirm,
  Task,
  TaskStore
};
use yew::{
  Callback,
  Html,
  MouseEvent,
  UseStateHandle,
  function_component,
  html,
  use_effect_with,
  use_state
};

use crate::components::{
  ListActions,
  NewTaskForm,
  TaskList
};
use crate::storage::{
  LocalStorageBackend,
  load_interaction_mode,
  save_interaction_mode
};

type Store =
  Rc<TaskStore<LocalStorageBackend>>;

struct BrowserConfirm;

impl Confirm for BrowserConfirm {
  fn confirm(
    &self,
    message: &str
  ) -> bool {
    gloo::dialogs::confirm(message)
  }
}

fn open_store() -> Option<Store> {
  match LocalStorageBackend::open()
    .and_then(TaskStore::open)
  {
    | Ok(store) => Some(Rc::new(store)),
    | Err(error) => {
      tracing::error!(
        ?error,
        "failed opening task database"
      );
      None
    }
  }
}

/// Re-fetches every task and replaces
/// whatever is on screen.
fn reload(
  store: &Store,
  tasks: &UseStateHandle<Vec<Task>>
) {
  match store.list() {
    | Ok(list) => {
      tracing::debug!(
        count = list.len(),
        "reloaded tasks"
      );
      tasks.set(list);
    }
    | Err(error) => {
      tracing::error!(
        ?error,
        "failed loading tasks"
      );
    }
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let store = use_state(open_store);
  let tasks = use_state(Vec::<Task>::new);
  let draft = use_state(String::new);
  let mode =
    use_state(load_interaction_mode);

  {
    let store = store.clone();
    let tasks = tasks.clone();
    use_effect_with((), move |_| {
      if let Some(store) = &*store {
        reload(store, &tasks);
      }
      || ()
    });
  }

  {
    use_effect_with(
      *mode,
      move |mode| {
        save_interaction_mode(*mode);
        tracing::debug!(
          mode = mode.storage_value(),
          "persisted interaction mode"
        );
        || ()
      }
    );
  }

  let on_draft_input = {
    let draft = draft.clone();
    Callback::from(move |value: String| {
      draft.set(value);
    })
  };

  let on_submit = {
    let store = store.clone();
    let tasks = tasks.clone();
    let draft = draft.clone();
    Callback::from(move |_: ()| {
      let Some(store) = (*store).clone()
      else {
        tracing::warn!(
          "add ignored: task database \
           not open"
        );
        return;
      };

      match store.add(draft.as_str()) {
        | Ok(Some(task)) => {
          tracing::info!(
            id = task.id,
            "task added"
          );
          draft.set(String::new());
        }
        | Ok(None) => return,
        | Err(error) => {
          tracing::error!(
            ?error,
            "failed adding task"
          );
        }
      }
      reload(&store, &tasks);
    })
  };

  let on_toggle = {
    let store = store.clone();
    let tasks = tasks.clone();
    Callback::from(
      move |(id, completed): (
        u64,
        bool
      )| {
        let Some(store) =
          (*store).clone()
        else {
          return;
        };

        if let Err(error) = store
          .set_completed(id, completed)
        {
          tracing::error!(
            id,
            ?error,
            "failed updating task"
          );
        }
        reload(&store, &tasks);
      }
    )
  };

  let on_delete = {
    let store = store.clone();
    let tasks = tasks.clone();
    Callback::from(move |id: u64| {
      let Some(store) = (*store).clone()
      else {
        return;
      };

      if let Err(error) = store.delete(id)
      {
        tracing::error!(
          id,
          ?error,
          "failed deleting task"
        );
      }
      reload(&store, &tasks);
    })
  };

  let on_clear = {
    let store = store.clone();
    let tasks = tasks.clone();
    Callback::from(
      move |_: MouseEvent| {
        let Some(store) =
          (*store).clone()
        else {
          return;
        };

        match store.clear(&BrowserConfirm)
        {
          | Ok(ClearOutcome::Declined) => {
            tracing::info!(
              "clear all canceled"
            );
          }
          | Ok(ClearOutcome::Cleared {
            removed
          }) => {
            tracing::info!(
              removed,
              "cleared all tasks"
            );
            reload(&store, &tasks);
          }
          | Err(error) => {
            tracing::error!(
              ?error,
              "failed clearing tasks"
            );
            reload(&store, &tasks);
          }
        }
      }
    )
  };

  let on_toggle_mode = {
    let mode = mode.clone();
    Callback::from(
      move |_: MouseEvent| {
        mode.set(mode.toggled());
      }
    )
  };

  let checklist =
    Checklist::build(&tasks, *mode);

  html! {
      <div class="panel">
          <div class="header">{ "To-Do List" }</div>
          <NewTaskForm
              value={(*draft).clone()}
              on_input={on_draft_input}
              on_submit={on_submit}
          />
          <TaskList
              checklist={checklist.clone()}
              on_toggle={on_toggle}
              on_delete={on_delete}
          />
          <ListActions
              total={checklist.len()}
              completed={checklist.completed_count()}
              mode={*mode}
              on_clear={on_clear}
              on_toggle_mode={on_toggle_mode}
          />
      </div>
  }
}
