pub mod tsv_dataset_reader;
