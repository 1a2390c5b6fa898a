pub mod app;
pub mod input;
pub mod result_list;

pub use app::App;
pub use input::SearchBar;
pub use result_list::ResultList;
