// Packed-format layer: blob assembly and reference expansion.
//
// - `assemble` — serialize the token region and asset texts into one buffer
// - `expand`   — worklist-based expansion of packed content, the in-crate
//                counterpart of the generated C unpacker

pub mod assemble;
pub mod expand;

pub use assemble::{PackError, PackedBlob, assemble};
pub use expand::{ExpandError, Expander, max_reference_depth};
