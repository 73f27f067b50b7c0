//! Supporting utilities: small, mostly independent helpers used
//! throughout the upper layers but with no dependency on them. Each
//! submodule covers one self-contained concern.

mod fstring;
mod ini;
mod linebuf;
mod num_to_str;
mod queue;
mod rc;
mod timer;

pub use fstring::Fstring;
pub use ini::{IniDocument, IniEntry};
pub use linebuf::LineBuffer;
pub use num_to_str::{format_i64, format_u64};
pub use queue::BoundedQueue;
pub use rc::RefCounted;
pub use timer::ProfTimer;
