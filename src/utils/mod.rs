pub mod binary;
pub mod clipboard;
