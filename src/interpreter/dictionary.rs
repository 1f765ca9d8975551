//! The user-facing dictionary: an open-addressed hash table with linear
//! probing. Removal leaves a tombstone so later probes still traverse the
//! slot; probes stop at clean empties or after one full cycle.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::error::{RunResult, RuntimeError};
use super::value::Value;

const MIN_CAPACITY: usize = 8;

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Vacant { tombstone: bool },
    Occupied { key: Value, value: Value },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    count: usize,
    slots: Vec<Slot>,
}

impl Default for Dictionary {
    fn default() -> Self {
        Dictionary::with_capacity(MIN_CAPACITY)
    }
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary::default()
    }

    fn with_capacity(capacity: usize) -> Self {
        Dictionary {
            count: 0,
            slots: vec![Slot::Vacant { tombstone: false }; capacity],
        }
    }

    pub fn from_pairs(pairs: Vec<(Value, Value)>) -> RunResult<Self> {
        let mut dictionary = Dictionary::with_capacity(initial_capacity(pairs.len()));
        for (key, value) in pairs {
            dictionary.insert(key, value)?;
        }
        Ok(dictionary)
    }

    /// Number of live pairs.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn bucket(&self, key: &Value) -> RunResult<usize> {
        Ok((key_hash(key)? % self.slots.len() as u64) as usize)
    }

    pub fn insert(&mut self, key: Value, value: Value) -> RunResult<()> {
        if self.find_slot(&key)?.is_some() {
            return Err(RuntimeError::Domain(format!(
                "a pair with the key {} already exists",
                describe(&key)
            )));
        }
        // keep the table less than half full
        if (self.count + 1) * 2 > self.slots.len() {
            self.grow()?;
        }
        self.place(key, value)
    }

    /// Probe for the first vacant slot and occupy it. The caller has
    /// already ruled out duplicates and ensured spare capacity.
    fn place(&mut self, key: Value, value: Value) -> RunResult<()> {
        let mut position = self.bucket(&key)?;
        loop {
            match &self.slots[position] {
                Slot::Vacant { .. } => {
                    self.slots[position] = Slot::Occupied { key, value };
                    self.count += 1;
                    return Ok(());
                }
                Slot::Occupied { .. } => {
                    position = (position + 1) % self.slots.len();
                }
            }
        }
    }

    /// Double the table and reinsert every live pair; tombstones do not
    /// survive a rehash.
    fn grow(&mut self) -> RunResult<()> {
        let doubled = self.slots.len() * 2;
        let old_slots = std::mem::replace(
            &mut self.slots,
            vec![Slot::Vacant { tombstone: false }; doubled],
        );
        self.count = 0;
        for slot in old_slots {
            if let Slot::Occupied { key, value } = slot {
                self.place(key, value)?;
            }
        }
        Ok(())
    }

    /// Linear probe from the key's bucket. Live slots with other keys and
    /// tombstones are stepped over; a never-used slot or a full cycle
    /// ends the search empty-handed.
    fn find_slot(&self, key: &Value) -> RunResult<Option<usize>> {
        let origin = self.bucket(key)?;
        let mut position = origin;
        loop {
            match &self.slots[position] {
                Slot::Occupied { key: occupant, .. } if occupant == key => {
                    return Ok(Some(position));
                }
                Slot::Occupied { .. } | Slot::Vacant { tombstone: true } => {
                    position = (position + 1) % self.slots.len();
                    if position == origin {
                        return Ok(None);
                    }
                }
                Slot::Vacant { tombstone: false } => return Ok(None),
            }
        }
    }

    pub fn lookup(&self, key: &Value) -> RunResult<Value> {
        if let Some(position) = self.find_slot(key)? {
            if let Slot::Occupied { value, .. } = &self.slots[position] {
                return Ok(value.clone());
            }
        }
        Err(missing_key(key))
    }

    pub fn remove(&mut self, key: &Value) -> RunResult<()> {
        let Some(position) = self.find_slot(key)? else {
            return Err(missing_key(key));
        };
        self.slots[position] = Slot::Vacant { tombstone: true };
        self.count -= 1;
        Ok(())
    }

    /// Live keys in table order.
    pub fn keys(&self) -> Vec<Value> {
        self.slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Occupied { key, .. } => Some(key.clone()),
                Slot::Vacant { .. } => None,
            })
            .collect()
    }
}

/// Starting capacity for `n` initial pairs: the power of two one step
/// above `n`, floored at the minimum so small dictionaries do not resize
/// straight away.
fn initial_capacity(pairs: usize) -> usize {
    if pairs == 0 {
        return MIN_CAPACITY;
    }
    let doubled = 1usize << ((pairs as f64).log2().round() as u32 + 1);
    doubled.max(MIN_CAPACITY)
}

/// A stable hash of the key's underlying scalar. Collections cannot be
/// keys.
fn key_hash(key: &Value) -> RunResult<u64> {
    let mut hasher = DefaultHasher::new();
    match key {
        Value::Integer(n) => n.hash(&mut hasher),
        Value::Float(f) => f.to_bits().hash(&mut hasher),
        Value::Character(c) => c.hash(&mut hasher),
        Value::Str(s) => s.hash(&mut hasher),
        Value::Boolean(b) => b.hash(&mut hasher),
        other => {
            return Err(RuntimeError::Type(format!(
                "a {} cannot be used as a dictionary key",
                other.kind()
            )))
        }
    }
    Ok(hasher.finish())
}

fn missing_key(key: &Value) -> RuntimeError {
    RuntimeError::Domain(format!(
        "the key {} is not present in the dictionary",
        describe(key)
    ))
}

fn describe(key: &Value) -> String {
    key.output_representation()
        .unwrap_or_else(|_| format!("of kind {}", key.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Value {
        Value::Integer(n)
    }

    fn text(s: &str) -> Value {
        Value::Str(s.into())
    }

    #[test]
    fn test_insert_then_lookup() {
        let mut d = Dictionary::new();
        d.insert(text("a"), int(1)).unwrap();
        d.insert(text("b"), int(2)).unwrap();
        assert_eq!(Ok(int(1)), d.lookup(&text("a")));
        assert_eq!(Ok(int(2)), d.lookup(&text("b")));
        assert_eq!(2, d.len());
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let mut d = Dictionary::new();
        d.insert(text("a"), int(1)).unwrap();
        assert!(matches!(
            d.insert(text("a"), int(2)),
            Err(RuntimeError::Domain(_))
        ));
    }

    #[test]
    fn test_remove_then_lookup_fails() {
        let mut d = Dictionary::new();
        d.insert(text("a"), int(1)).unwrap();
        d.remove(&text("a")).unwrap();
        assert!(matches!(d.lookup(&text("a")), Err(RuntimeError::Domain(_))));
        assert_eq!(0, d.len());
    }

    #[test]
    fn test_missing_key_errors() {
        let mut d = Dictionary::new();
        assert!(d.lookup(&text("nope")).is_err());
        assert!(d.remove(&text("nope")).is_err());
    }

    #[test]
    fn test_lookup_survives_rehashing() {
        let mut d = Dictionary::new();
        for n in 0..50 {
            d.insert(int(n), int(n * 10)).unwrap();
        }
        assert!(d.capacity() >= (d.len() + 1) * 2);
        for n in 0..50 {
            assert_eq!(Ok(int(n * 10)), d.lookup(&int(n)));
        }
    }

    #[test]
    fn test_probe_traverses_tombstones() {
        let mut d = Dictionary::new();
        // find two keys that collide in the fresh table
        let first = int(0);
        let home = d.bucket(&first).unwrap();
        let second = (1..1000)
            .map(int)
            .find(|key| d.bucket(key).unwrap() == home)
            .expect("some key must share the bucket");
        d.insert(first.clone(), text("first")).unwrap();
        d.insert(second.clone(), text("second")).unwrap();
        // removing the first leaves a tombstone on the second's probe path
        d.remove(&first).unwrap();
        assert_eq!(Ok(text("second")), d.lookup(&second));
        // and the tombstone is reusable by a fresh insert
        d.insert(first, text("again")).unwrap();
        assert_eq!(2, d.len());
    }

    #[test]
    fn test_initial_capacity() {
        assert_eq!(8, initial_capacity(0));
        assert_eq!(8, initial_capacity(1));
        assert_eq!(8, initial_capacity(3));
        assert_eq!(16, initial_capacity(6));
        assert_eq!(16, initial_capacity(8));
    }

    #[test]
    fn test_keys_in_table_order_and_count_matches() {
        let mut d = Dictionary::new();
        d.insert(text("a"), int(1)).unwrap();
        d.insert(text("b"), int(2)).unwrap();
        d.insert(text("c"), int(3)).unwrap();
        d.remove(&text("b")).unwrap();
        let keys = d.keys();
        assert_eq!(d.len(), keys.len());
        assert!(keys.contains(&text("a")));
        assert!(keys.contains(&text("c")));
    }

    #[test]
    fn test_collections_cannot_be_keys() {
        let mut d = Dictionary::new();
        assert!(matches!(
            d.insert(Value::Array(vec![]), int(1)),
            Err(RuntimeError::Type(_))
        ));
    }
}
