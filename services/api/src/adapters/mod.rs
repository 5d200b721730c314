pub mod db;
pub mod whatsapp;

pub use db::DbAdapter;
