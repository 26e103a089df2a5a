mod app;
mod components;
mod storage;

fn main() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  let root = gloo::utils::document()
    .get_element_by_id("app");
  match root {
    | Some(root) => {
      tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "mounting ticklist"
      );
      yew::Renderer::<app::App>::with_root(
        root
      )
      .render();
    }
    | None => {
      tracing::warn!(
        "no #app element; mounting on \
         body"
      );
      yew::Renderer::<app::App>::new()
        .render();
    }
  }
}
