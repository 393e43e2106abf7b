//! The keyword slot index.
//!
//! Every keyword known to the system owns a fixed position ("slot") in the
//! keyword commitment vector of every document. A document fills the slots of
//! its keywords with the keywords themselves and every other slot with a
//! placeholder (`null.<slot>`), so all documents encoded against the same
//! index have the same shape.
//!
//! Slot 0 is reserved for the sentinel [`NO_CLIENT`]; per-client tags are
//! aliases of it. Keywords starting with [`PLACEHOLDER_PREFIX`] or
//! [`CLIENT_TAG_PREFIX`] cannot be registered by hand.
use std::{
    collections::HashMap,
    sync::RwLock
};
use tracing::debug;
use crate::error::MpeckError;
use crate::utils::hash::encode_keyword;

/// Sentinel keyword owning the reserved slot 0.
pub const NO_CLIENT: &str = "no-client";
/// Prefix of the placeholder filling an unused slot.
pub const PLACEHOLDER_PREFIX: &str = "null.";
/// Prefix of the per-client tag keyword.
pub const CLIENT_TAG_PREFIX: &str = "client.";

#[derive(Debug, Default)]
struct Slots {
    by_keyword: HashMap<String, usize>,
    count: usize,
}

/// Append-only mapping keyword -> slot, shared between all parties of one scheme instance.
#[derive(Debug)]
pub struct KeywordIndex {
    inner: RwLock<Slots>,
}

impl Default for KeywordIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordIndex {
    /// Creates an index holding only the reserved slot 0.
    pub fn new() -> KeywordIndex {
        let mut slots = Slots::default();
        slots.by_keyword.insert(NO_CLIENT.to_string(), 0);
        slots.count = 1;
        KeywordIndex { inner: RwLock::new(slots) }
    }

    /// Registers `keyword` and returns its slot. Registering a known keyword returns its existing slot.
    pub fn add(&self, keyword: &str) -> Result<usize, MpeckError> {
        unreserved(keyword)?;
        let mut slots = self.inner.write()?;
        if let Some(slot) = slots.by_keyword.get(keyword) {
            return Ok(*slot);
        }
        let slot = slots.count;
        slots.by_keyword.insert(keyword.to_string(), slot);
        slots.count += 1;
        debug!(slot, total = slots.count, "registered keyword slot");
        Ok(slot)
    }

    /// Lets `keyword` share the slot of `existing` without growing the index.
    pub fn add_alias(&self, keyword: &str, existing: &str) -> Result<usize, MpeckError> {
        unreserved(keyword)?;
        self.alias(keyword, existing)
    }

    fn alias(&self, keyword: &str, existing: &str) -> Result<usize, MpeckError> {
        encode_keyword(keyword)?;
        let mut slots = self.inner.write()?;
        let slot = match slots.by_keyword.get(existing) {
            Some(slot) => *slot,
            None => return Err(MpeckError::UnknownKeyword(existing.to_string())),
        };
        match slots.by_keyword.get(keyword) {
            Some(current) if *current == slot => Ok(slot),
            Some(current) => Err(MpeckError::SlotConflict(format!(
                "{} already occupies slot {}",
                keyword, current
            ))),
            None => {
                slots.by_keyword.insert(keyword.to_string(), slot);
                debug!(slot, "registered keyword alias");
                Ok(slot)
            }
        }
    }

    /// Returns the slot of `keyword`.
    pub fn get(&self, keyword: &str) -> Result<usize, MpeckError> {
        let slots = self.inner.read()?;
        lookup(&slots, keyword)
    }

    pub fn contains(&self, keyword: &str) -> Result<bool, MpeckError> {
        Ok(self.inner.read()?.by_keyword.contains_key(keyword))
    }

    /// Number of distinct slots. Aliases do not count.
    pub fn total_slots(&self) -> Result<usize, MpeckError> {
        Ok(self.inner.read()?.count)
    }

    /// Expands a keyword list into a full slot sequence of length [`total_slots`](Self::total_slots).
    ///
    /// Each keyword lands on its slot, every other slot gets the placeholder `null.<slot>`.
    /// The sequence is built from one consistent snapshot of the index.
    pub fn expand<S: AsRef<str>>(&self, keywords: &[S]) -> Result<Vec<String>, MpeckError> {
        let slots = self.inner.read()?;
        let mut sequence: Vec<Option<String>> = vec![None; slots.count];
        for keyword in keywords {
            let keyword = keyword.as_ref();
            let slot = lookup(&slots, keyword)?;
            if let Some(other) = &sequence[slot] {
                if other != keyword {
                    return Err(MpeckError::SlotConflict(format!(
                        "{} and {} both claim slot {}",
                        other, keyword, slot
                    )));
                }
            }
            sequence[slot] = Some(keyword.to_string());
        }
        Ok(sequence
            .into_iter()
            .enumerate()
            .map(|(slot, keyword)| keyword.unwrap_or_else(|| placeholder(slot)))
            .collect())
    }

    /// Resolves keywords to `(keyword, slot)` pairs, the query form a trapdoor is built from.
    pub fn query<S: AsRef<str>>(&self, keywords: &[S]) -> Result<Vec<(String, usize)>, MpeckError> {
        let slots = self.inner.read()?;
        keywords
            .iter()
            .map(|keyword| {
                let keyword = keyword.as_ref();
                lookup(&slots, keyword).map(|slot| (keyword.to_string(), slot))
            })
            .collect()
    }

    /// Registers the tag of the party with key index `index` as an alias of the reserved slot 0.
    pub fn register_client(&self, index: usize) -> Result<usize, MpeckError> {
        self.alias(&client_tag(index), NO_CLIENT)
    }
}

// placeholders and client tags are produced by the index itself; a registered
// keyword spelled like one would collide with the slot filler of other documents
fn unreserved(keyword: &str) -> Result<(), MpeckError> {
    for prefix in [PLACEHOLDER_PREFIX, CLIENT_TAG_PREFIX] {
        if keyword.starts_with(prefix) {
            return Err(MpeckError::Encoding(format!(
                "keyword {} uses the reserved prefix {}",
                keyword, prefix
            )));
        }
    }
    encode_keyword(keyword).map(|_| ())
}

/// The per-client tag keyword of the party with key index `index`.
pub fn client_tag(index: usize) -> String {
    format!("{}{}", CLIENT_TAG_PREFIX, index)
}

/// The placeholder filling `slot` when a document has no keyword there.
pub fn placeholder(slot: usize) -> String {
    format!("{}{}", PLACEHOLDER_PREFIX, slot)
}

fn lookup(slots: &Slots, keyword: &str) -> Result<usize, MpeckError> {
    slots
        .by_keyword
        .get(keyword)
        .copied()
        .ok_or_else(|| MpeckError::UnknownKeyword(keyword.to_string()))
}
