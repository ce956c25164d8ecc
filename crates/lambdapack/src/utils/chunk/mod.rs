pub mod deconflict_chunk_symbols;
pub mod finalize_chunks;
