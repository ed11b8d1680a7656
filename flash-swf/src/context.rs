//! The side channel of flags threaded through every nested encode and decode call
//!
//! Records that change how their children are encoded (a shape declaring its colors have alpha, a
//! font declaring wide character codes) do so by opening a [`Scope`] on the context. The scope
//! derefs to the context and puts the previous flags back when it is dropped, which also happens
//! when a nested call bails out early with `?`.

use std::ops::{Deref, DerefMut};

use enumset::{EnumSet, EnumSetType};

use crate::bits::Encoding;
use crate::tag::TagCode;

/// The version assumed when none is given
pub const DEFAULT_VERSION: u8 = 10;

/// Boolean flags that change the encoding of nested records
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(EnumSetType, Debug)]
pub enum Flag {
    /// Colors carry an alpha channel
    Transparent,

    /// Character codes are two bytes wide instead of one
    WideCodes,

    /// Glyph offsets are four bytes wide instead of two
    WideOffsets,
}

/// Everything a scope can change and restore
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
struct State {
    flags: EnumSet<Flag>,
    tag: Option<TagCode>,
    fill_bits: u32,
    line_bits: u32,
}

/// Encode and decode state shared by all records of one operation
#[derive(Debug, Clone)]
pub struct Context {
    version: u8,
    state: State,
    depth: usize,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION)
    }
}

impl Context {
    /// Create a context for the given format version with every flag cleared
    pub fn new(version: u8) -> Self {
        Self {
            version,
            state: State::default(),
            depth: 0,
        }
    }

    /// The format version
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Change the format version, normally done once after reading the movie header
    pub fn set_version(&mut self, version: u8) {
        self.version = version;
    }

    /// The string encoding for the format version
    pub fn encoding(&self) -> Encoding {
        Encoding::for_version(self.version)
    }

    /// Check a flag
    #[inline]
    pub fn get(&self, flag: Flag) -> bool {
        self.state.flags.contains(flag)
    }

    /// Set or clear a flag
    ///
    /// Outside of a [`Scope`] the change is permanent for the rest of the operation.
    pub fn set(&mut self, flag: Flag, on: bool) {
        if on {
            self.state.flags.insert(flag);
        } else {
            self.state.flags.remove(flag);
        }
    }

    /// All flags that are currently set
    pub fn flags(&self) -> EnumSet<Flag> {
        self.state.flags
    }

    /// The type of the innermost enclosing tag
    pub fn tag(&self) -> Option<TagCode> {
        self.state.tag
    }

    /// Set the type of the enclosing tag
    pub fn set_tag(&mut self, tag: TagCode) {
        self.state.tag = Some(tag);
    }

    /// Width of fill style indices in shape records
    pub fn fill_bits(&self) -> u32 {
        self.state.fill_bits
    }

    /// Set the width of fill style indices in shape records
    pub fn set_fill_bits(&mut self, bits: u32) {
        self.state.fill_bits = bits;
    }

    /// Width of line style indices in shape records
    pub fn line_bits(&self) -> u32 {
        self.state.line_bits
    }

    /// Set the width of line style indices in shape records
    pub fn set_line_bits(&mut self, bits: u32) {
        self.state.line_bits = bits;
    }

    /// How many scopes are currently open
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Open a scope, every change made through it is undone when it is dropped
    pub fn scope(&mut self) -> Scope<'_> {
        let saved = self.state;
        self.depth += 1;
        Scope {
            context: self,
            saved,
        }
    }

    /// Open a scope with `flag` set to `on`
    pub fn push(&mut self, flag: Flag, on: bool) -> Scope<'_> {
        let mut scope = self.scope();
        scope.set(flag, on);
        scope
    }

    /// Open a scope inside a tag of the given type
    pub fn push_tag(&mut self, tag: TagCode) -> Scope<'_> {
        let mut scope = self.scope();
        scope.set_tag(tag);
        scope
    }
}

/// A nested region of a [`Context`], restores the previous flags when dropped
///
/// Scopes nest strictly: a scope borrows its parent mutably, so the parent can't be touched again
/// until the scope is gone.
#[must_use = "a scope restores the context as soon as it is dropped"]
pub struct Scope<'a> {
    context: &'a mut Context,
    saved: State,
}

impl Deref for Scope<'_> {
    type Target = Context;

    fn deref(&self) -> &Context {
        self.context
    }
}

impl DerefMut for Scope<'_> {
    fn deref_mut(&mut self) -> &mut Context {
        self.context
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        self.context.state = self.saved;
        self.context.depth -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Error, Result};

    #[test]
    fn scopes_restore_in_lifo_order() {
        let mut context = Context::default();
        context.set(Flag::WideCodes, true);
        {
            let mut outer = context.push(Flag::Transparent, true);
            assert!(outer.get(Flag::Transparent));
            {
                let mut inner = outer.push_tag(TagCode::DefineShape3);
                inner.set(Flag::WideCodes, false);
                inner.set_fill_bits(3);
                assert_eq!(inner.depth(), 2);
                assert!(inner.get(Flag::Transparent));
            }
            assert_eq!(outer.tag(), None);
            assert_eq!(outer.fill_bits(), 0);
            assert!(outer.get(Flag::WideCodes));
        }
        assert!(!context.get(Flag::Transparent));
        assert!(context.get(Flag::WideCodes));
        assert_eq!(context.depth(), 0);
    }

    #[test]
    fn early_returns_restore() {
        fn fails(context: &mut Context) -> Result<()> {
            let scope = context.push(Flag::Transparent, true);
            Err(Error::BufferExhausted {
                position: scope.depth(),
                requested: 1,
            })
        }

        let mut context = Context::default();
        assert!(fails(&mut context).is_err());
        assert!(!context.get(Flag::Transparent));
        assert_eq!(context.depth(), 0);
    }

    #[test]
    fn version_selects_string_encoding() {
        assert_eq!(Context::new(5).encoding(), Encoding::Latin1);
        assert_eq!(Context::new(6).encoding(), Encoding::Utf8);
    }
}
