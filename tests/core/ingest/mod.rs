// Ingestion pipeline tests

mod test_records;
