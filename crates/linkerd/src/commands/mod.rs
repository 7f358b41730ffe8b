pub mod check;
pub mod plugin;
