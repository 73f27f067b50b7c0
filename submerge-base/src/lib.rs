mod bits;
mod bitvec;
pub mod dataio;
mod error;
mod intvec;
mod pool;
pub mod radix;
pub mod stream;
pub mod util;
mod valvec;
mod varint;

pub use bits::{
    bit_clear, bit_set, bit_test, count_leading_zeros, count_trailing_zeros, low_mask,
    popcount32, popcount64, popcount_trail, range_set_words, word_range_set, WORD_BITS,
};
pub use bitvec::BitVec;
pub use error::{
    bad_version, broken_pipe, data_format, delay_write, end_of_file, err, invalid_object,
    not_found_factory, open_file, out_of_space, size_value_too_large, Error, ErrorKind, Result,
};
pub use intvec::{IntVec, UintVec, MAX_WIDTH};
pub use pool::{MemPool, NO_OFFSET};
pub use valvec::ByteVec;
pub use varint::{
    decode_len30_i32, decode_len30_u32, decode_len61_i64, decode_len61_u64, decode_var_i32,
    decode_var_i32_reverse, decode_var_i64, decode_var_i64_reverse, decode_var_u32,
    decode_var_u32_fast, decode_var_u32_reverse, decode_var_u64, decode_var_u64_fast,
    decode_var_u64_reverse, encode_len30_i32, encode_len30_u32, encode_len61_i64,
    encode_len61_u64, encode_var_i32, encode_var_i64, encode_var_u32, encode_var_u64,
    zigzag_decode32, zigzag_decode64, zigzag_encode32, zigzag_encode64, LEN30_MAX_BYTES,
    LEN61_MAX_BYTES, VAR_U32_MAX_BYTES, VAR_U64_MAX_BYTES,
};
