pub mod constants;
pub mod text_cell;
