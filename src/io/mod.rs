//! Image I/O: codecs at the pipeline boundary and input discovery.

pub mod codec;
pub mod discovery;

pub use codec::{decode, decode_as, encode, Decoded};
pub use discovery::{discover, output_path_for};
