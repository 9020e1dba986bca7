pub mod form;
pub mod handlers;
pub mod pages;
pub mod repository;
pub mod text;
