//! String interning over an [`Arena`].
//!
//! Every path, project name and GUID that ends up in an [`Index`](crate::index::Index)
//! is interned here once and referenced afterwards by a [`StrOffset`] handle
//! rather than by `String`/`&str`, keeping the index itself pointer-free and
//! trivially relocatable.

use std::num::NonZeroU32;

use crate::arena::Arena;
use crate::error::BoreError;

/// A handle into a [`StringTable`]'s arena. Offset 0 is reserved, so this can
/// never be null — callers that need an optional string use `Option<StrOffset>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct StrOffset(NonZeroU32);

impl StrOffset {
    fn new(raw: u32) -> Self {
        StrOffset(NonZeroU32::new(raw).expect("arena offset 0 is reserved"))
    }

    pub fn raw(self) -> u32 {
        self.0.get()
    }
}

pub struct StringTable {
    arena: Arena,
}

impl StringTable {
    pub fn new() -> Self {
        StringTable { arena: Arena::new() }
    }

    /// Copy `s` into the arena, NUL-terminated, and return its offset.
    /// No deduplication: two interns of the same text get distinct offsets,
    /// matching the original allocator's append-only string duplication.
    pub fn intern(&mut self, s: &str) -> Result<StrOffset, BoreError> {
        let bytes = s.as_bytes();
        let offset = self.arena.alloc(bytes.len() + 1)?;
        self.arena.write(offset, bytes);
        self.arena.write(offset + bytes.len() as u32, &[0]);
        Ok(StrOffset::new(offset))
    }

    pub fn get(&self, offset: StrOffset) -> &str {
        let bytes = self.arena.get_cstr(offset.raw());
        // Interned strings always originate from valid UTF-8 &str inputs.
        std::str::from_utf8(bytes).expect("interned string is valid utf-8")
    }
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}
