// Embedding pipeline tests

mod test_batches;
mod test_records;
