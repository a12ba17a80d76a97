mod map;
pub mod modals;
mod sidebar;
mod toolbar;

pub use map::MapWidget;
pub use sidebar::{Sidebar, SidebarAction};
pub use toolbar::Toolbar;
