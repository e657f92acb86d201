pub mod threaded_pair_executor;
