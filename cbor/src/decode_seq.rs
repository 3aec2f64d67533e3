use super::decode::{Argument, BREAK, Decoder, Error, split_head};
use super::value::{Map, Value};
use alloc::vec::Vec;

impl Decoder<'_> {
    /// Checks whether the next item of an indefinite-length container is the break marker.
    fn at_break(&self, offset: usize) -> Result<bool, Error> {
        self.data
            .get(offset)
            .map(|b| *b == BREAK)
            .ok_or(Error::ExpectedBreakMarker)
    }

    // Every item takes at least one byte, so the remaining buffer caps any
    // sane pre-allocation
    fn capacity_hint(&self, count: u64, offset: usize) -> usize {
        usize::try_from(count)
            .unwrap_or(usize::MAX)
            .min(self.data.len() - offset)
    }

    pub(crate) fn list(
        &self,
        arg: Argument,
        mut offset: usize,
        depth: usize,
    ) -> Result<(Value, usize), Error> {
        let depth = self.descend(depth)?;
        let mut items = Vec::new();
        match arg {
            Argument::Value(count) => {
                items.reserve(self.capacity_hint(count, offset));
                for _ in 0..count {
                    let (item, next) = self.value(offset, depth)?;
                    items.push(item);
                    offset = next;
                }
            }
            Argument::Indefinite => {
                while !self.at_break(offset)? {
                    let (item, next) = self.value(offset, depth)?;
                    items.push(item);
                    offset = next;
                }
                offset += 1;
            }
        }
        Ok((Value::List(items), offset))
    }

    pub(crate) fn map(
        &self,
        arg: Argument,
        mut offset: usize,
        depth: usize,
    ) -> Result<(Value, usize), Error> {
        let depth = self.descend(depth)?;
        let mut map = Map::new();
        match arg {
            Argument::Value(count) => {
                for _ in 0..count {
                    offset = self.entry(&mut map, offset, depth)?;
                }
            }
            Argument::Indefinite => {
                while !self.at_break(offset)? {
                    offset = self.entry(&mut map, offset, depth)?;
                }
                offset += 1;
            }
        }
        Ok((Value::Map(map), offset))
    }

    fn entry(&self, map: &mut Map, offset: usize, depth: usize) -> Result<usize, Error> {
        let Some(&initial) = self.data.get(offset) else {
            return Err(Error::UnexpectedEndOfPayload);
        };
        let (major, minor) = split_head(initial);
        if major != 3 {
            return Err(Error::UnexpectedMajorTypeForMapKey(major));
        }
        let (key, offset) = self.string(major, minor, offset + 1)?;
        let (value, offset) = self.value(offset, depth)?;

        // Duplicate keys: the last value wins
        map.insert(key, value);
        Ok(offset)
    }
}
