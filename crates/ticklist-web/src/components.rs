mod list_actions;
mod new_task_form;
mod task_list;
mod task_list_row;

pub use list_actions::ListActions;
pub use new_task_form::NewTaskForm;
pub use task_list::TaskList;
pub use task_list_row::TaskListRow;
