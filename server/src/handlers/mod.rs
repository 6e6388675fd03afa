pub mod api;
pub mod forms;
pub mod health;
pub mod pages;
pub mod redirect;
