pub mod text_report;
pub mod tsv_writer;
