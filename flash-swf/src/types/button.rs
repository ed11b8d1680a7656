//! `DefineButton2`, a button whose event handlers are chained by their sizes
//!
//! The button records are kept as raw bytes. Each handler starts with the distance to the next
//! handler, 0 for the last one, and the record list is preceded by the distance to the first
//! handler. All of them are written as placeholders and patched once the distance is known.

use enumset::{EnumSet, EnumSetType};

use crate::bits::{BitReader, BitWriter};
use crate::codec::{Decode, Encode};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::offset_table::Slot;
use crate::types::CharacterId;

/// Size of the size and condition words that start a handler
const HANDLER_HEADER_LEN: usize = 4;

/// Mouse transitions that trigger a handler
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(EnumSetType, Debug, Hash)]
pub enum ButtonEvent {
    IdleToOverDown,
    OutDownToIdle,
    OutDownToOverDown,
    OverDownToOutDown,
    OverDownToOverUp,
    OverUpToOverDown,
    OverUpToIdle,
    IdleToOverUp,
    OverDownToIdle,
}

const EVENT_BITS: [(ButtonEvent, u16); 9] = [
    (ButtonEvent::IdleToOverDown, 0x8000),
    (ButtonEvent::OutDownToIdle, 0x4000),
    (ButtonEvent::OutDownToOverDown, 0x2000),
    (ButtonEvent::OverDownToOutDown, 0x1000),
    (ButtonEvent::OverDownToOverUp, 0x0800),
    (ButtonEvent::OverUpToOverDown, 0x0400),
    (ButtonEvent::OverUpToIdle, 0x0200),
    (ButtonEvent::IdleToOverUp, 0x0100),
    (ButtonEvent::OverDownToIdle, 0x0001),
];

/// A key that triggers a handler, 0 for none
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(try_from = "u8"))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct KeyCode(u8);

impl TryFrom<u8> for KeyCode {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        Self::new(u32::from(code))
    }
}

impl KeyCode {
    pub const NONE: Self = KeyCode(0);
    pub const MAX: u8 = 0x7F;

    /// Create a key code, it has to fit 7 bits
    pub fn new(code: u32) -> Result<Self> {
        match u8::try_from(code) {
            Ok(code) if code <= Self::MAX => Ok(Self(code)),
            _ => Err(Error::range("button key code", code, 0, i64::from(Self::MAX))),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// An event handler of a button
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ButtonAction {
    pub events: EnumSet<ButtonEvent>,
    pub key: KeyCode,
    /// Raw action records, up to and including the end marker
    pub actions: Vec<u8>,
}

impl ButtonAction {
    fn conditions(&self) -> u16 {
        let events = EVENT_BITS
            .iter()
            .filter(|(event, _)| self.events.contains(*event))
            .fold(0, |bits, (_, bit)| bits | bit);
        events | (u16::from(self.key.0) << 1)
    }

    fn from_conditions(conditions: u16, actions: &[u8]) -> Self {
        Self {
            events: EVENT_BITS
                .iter()
                .filter(|(_, bit)| conditions & bit != 0)
                .map(|(event, _)| *event)
                .collect(),
            key: KeyCode(((conditions >> 1) & 0x7F) as u8),
            actions: actions.to_vec(),
        }
    }
}

/// The body of `DefineButton2`
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DefineButton2 {
    pub id: CharacterId,
    /// Track the button as a menu item rather than a push button
    pub track_as_menu: bool,
    /// Raw button records, up to and including the end marker
    pub characters: Vec<u8>,
    pub actions: Vec<ButtonAction>,
}

impl Decode for DefineButton2 {
    fn decode(input: &mut BitReader<'_>, context: &mut Context) -> Result<Self> {
        let id = CharacterId::decode(input, context)?;
        let track_as_menu = input.read_u8()? & 1 != 0;
        let action_offset = usize::from(input.read_u16()?);
        if action_offset == 0 {
            return Ok(Self {
                id,
                track_as_menu,
                characters: input.read_to_end()?.to_vec(),
                actions: Vec::new(),
            });
        }
        if action_offset < 2 {
            return Err(Error::range("button action offset", action_offset as i64, 2, 0xFFFF));
        }
        let characters = input.read_bytes(action_offset - 2)?.to_vec();

        let mut actions = Vec::new();
        loop {
            let size = usize::from(input.read_u16()?);
            let conditions = input.read_u16()?;
            let body = match size {
                0 => input.read_to_end()?,
                size if size < HANDLER_HEADER_LEN => {
                    return Err(Error::range(
                        "button handler size",
                        size as i64,
                        HANDLER_HEADER_LEN as i64,
                        0xFFFF,
                    ));
                }
                size => input.read_bytes(size - HANDLER_HEADER_LEN)?,
            };
            actions.push(ButtonAction::from_conditions(conditions, body));
            if size == 0 {
                break;
            }
        }

        Ok(Self {
            id,
            track_as_menu,
            characters,
            actions,
        })
    }
}

impl Encode for DefineButton2 {
    type Layout = usize;

    fn layout(&self, _context: &mut Context) -> Result<usize> {
        let handlers: usize = self
            .actions
            .iter()
            .map(|action| HANDLER_HEADER_LEN + action.actions.len())
            .sum();
        Ok(2 + 1 + 2 + self.characters.len() + handlers)
    }

    fn write_laid_out(&self, _layout: &usize, out: &mut BitWriter, context: &mut Context) -> Result<()> {
        self.id.encode(out, context)?;
        out.write_u8(u8::from(self.track_as_menu))?;

        let action_offset = Slot::reserve(out, 2)?;
        out.write_bytes(&self.characters)?;
        if self.actions.is_empty() {
            action_offset.resolve(out, 0)?;
        } else {
            let distance = (out.position() - action_offset.position()) / 8;
            action_offset.resolve(out, distance)?;
        }

        let last = self.actions.len().saturating_sub(1);
        for (index, action) in self.actions.iter().enumerate() {
            let size = Slot::reserve(out, 2)?;
            out.write_u16(action.conditions())?;
            out.write_bytes(&action.actions)?;
            if index == last {
                size.resolve(out, 0)?;
            } else {
                let distance = (out.position() - size.position()) / 8;
                size.resolve(out, distance)?;
            }
        }
        Ok(())
    }
}
