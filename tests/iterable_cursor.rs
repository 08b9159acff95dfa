use csvtok::{make_reader, open_iter, ChunkSupplier, CursorError, Dialect, HeaderPolicy};

struct Chunks(std::vec::IntoIter<Vec<u8>>);

impl ChunkSupplier for Chunks {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, CursorError> {
        Ok(self.0.next())
    }
}

#[test]
fn reads_rows_split_across_arbitrary_chunks() {
    let chunks = vec![b"a,b".to_vec(), b"\nc,".to_vec(), b"d\n".to_vec()];
    let cursor = open_iter(Chunks(chunks.into_iter()));
    let mut reader = make_reader(cursor, Dialect::default(), HeaderPolicy::NoHeader).unwrap();

    let row = reader.next_row().unwrap().unwrap();
    assert_eq!(row.by_index(0).unwrap().raw(), b"a");
    assert_eq!(row.by_index(1).unwrap().raw(), b"b");

    let row = reader.next_row().unwrap().unwrap();
    assert_eq!(row.by_index(0).unwrap().raw(), b"c");
    assert_eq!(row.by_index(1).unwrap().raw(), b"d");

    assert!(reader.next_row().is_none());
}

#[test]
fn as_mapping_pairs_cells_with_header_names() {
    let chunks = vec![b"id,name\n1,alice\n".to_vec()];
    let cursor = open_iter(Chunks(chunks.into_iter()));
    let mut reader = make_reader(cursor, Dialect::default(), HeaderPolicy::HasHeader).unwrap();
    let row = reader.next_row().unwrap().unwrap();
    let mapping: Vec<(Vec<u8>, Vec<u8>)> =
        row.as_mapping().map(|(name, cell)| (name.to_vec(), cell.raw().to_vec())).collect();
    assert_eq!(mapping, vec![(b"id".to_vec(), b"1".to_vec()), (b"name".to_vec(), b"alice".to_vec())]);
}
