//! Pipeline stages for contract analysis.
//!
//! Each submodule implements exactly one step, so each can be tested in
//! isolation and the external pieces (PDF library, HTTP service) can be
//! swapped for fakes.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ decode ──▶ guard ──▶ request ──▶ transport ──▶ response
//! (file)    (text)    (≤100k)   (prompt)    (HTTP)        (typed result)
//! ```
//!
//! 1. [`input`]    : a selected file with its format tag, or pasted text
//! 2. [`decode`]   : turn bytes into text; PDF and `.docx` go through the
//!    [`collaborators`] registry ([`pdf`], [`docx`]) on the blocking pool
//! 3. [`guard`]    : reject text over the character limit
//! 4. [`request`]  : wrap the text in mode-specific instructions
//! 5. [`transport`]: one `generateContent` call; the only stage with network I/O
//! 6. [`response`] : validate and type the model output

pub mod collaborators;
pub mod decode;
pub mod docx;
pub mod guard;
pub mod input;
pub mod pdf;
pub mod request;
pub mod response;
pub mod transport;
