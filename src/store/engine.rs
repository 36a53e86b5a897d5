//! The typed key space.
//!
//! A key's value, kind, and expiry are read and written together under one
//! `RwLock`, so the invariant "a key's kind agrees with its expiry state" never
//! needs cross-lock reasoning to hold.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// A stored value, tagged by its own shape rather than by a parallel map.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Value {
    #[serde(rename = "string")]
    Str(String),
    #[serde(rename = "list")]
    List(VecDeque<String>),
    #[serde(rename = "set")]
    Set(BTreeSet<String>),
}

impl Value {
    fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    values: HashMap<String, Value>,
    /// Absolute unix-seconds expiry. Absent or `0` means no expiry.
    expiries: HashMap<String, i64>,
}

/// The process-wide key space.
///
/// Every operation takes the same lock; there is no sharding. `GET`, `EXISTS`,
/// `TTL` and `EXPIRE` perform lazy eviction of an elapsed key before
/// proceeding. Other readers (`LRANGE`, `SMEMBERS`, `KEYS`, `INFO`) do not —
/// they rely on the background reaper to reconcile a stale key within one
/// sweep interval.
#[derive(Debug, Default)]
pub struct Store {
    inner: RwLock<Inner>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    fn now_secs() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before unix epoch")
            .as_secs() as i64
    }

    fn is_expired(inner: &Inner, key: &str, now: i64) -> bool {
        matches!(inner.expiries.get(key), Some(&ts) if ts != 0 && ts <= now)
    }

    /// Removes `key` from both maps if its expiry has elapsed. Returns
    /// whether it was evicted.
    fn evict_if_expired(inner: &mut Inner, key: &str, now: i64) -> bool {
        if Self::is_expired(inner, key, now) {
            inner.values.remove(key);
            inner.expiries.remove(key);
            true
        } else {
            false
        }
    }

    // ---- string ----

    pub fn set(&self, key: &str, value: &str) {
        let mut inner = self.inner.write().unwrap();
        inner.values.insert(key.to_string(), Value::Str(value.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let now = Self::now_secs();
        {
            let inner = self.inner.read().unwrap();
            if !Self::is_expired(&inner, key, now) {
                return inner.values.get(key).and_then(Value::as_str).map(str::to_string);
            }
        }
        let mut inner = self.inner.write().unwrap();
        Self::evict_if_expired(&mut inner, key, now);
        None
    }

    // ---- keys / existence ----

    pub fn del(&self, key: &str) -> bool {
        let mut inner = self.inner.write().unwrap();
        let existed = inner.values.remove(key).is_some();
        inner.expiries.remove(key);
        existed
    }

    pub fn exists(&self, key: &str) -> bool {
        let now = Self::now_secs();
        {
            let inner = self.inner.read().unwrap();
            if !Self::is_expired(&inner, key, now) {
                return inner.values.contains_key(key);
            }
        }
        let mut inner = self.inner.write().unwrap();
        Self::evict_if_expired(&mut inner, key, now);
        false
    }

    pub fn keys(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap();
        let mut ks: Vec<String> = inner.values.keys().cloned().collect();
        ks.sort();
        ks
    }

    pub fn flushdb(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.values.clear();
        inner.expiries.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ---- expiry ----

    pub fn expire(&self, key: &str, seconds: i64) -> bool {
        let now = Self::now_secs();
        let mut inner = self.inner.write().unwrap();
        if Self::evict_if_expired(&mut inner, key, now) {
            return false;
        }
        if !inner.values.contains_key(key) {
            return false;
        }
        inner.expiries.insert(key.to_string(), now + seconds);
        true
    }

    /// `-2` if missing/expired, `-1` if present with no expiry, else the
    /// remaining whole seconds.
    pub fn ttl(&self, key: &str) -> i64 {
        let now = Self::now_secs();
        {
            let inner = self.inner.read().unwrap();
            if !Self::is_expired(&inner, key, now) {
                if !inner.values.contains_key(key) {
                    return -2;
                }
                return match inner.expiries.get(key).copied() {
                    Some(ts) if ts != 0 => (ts - now).max(0),
                    _ => -1,
                };
            }
        }
        let mut inner = self.inner.write().unwrap();
        Self::evict_if_expired(&mut inner, key, now);
        -2
    }

    // ---- lists ----

    pub fn lpush(&self, key: &str, values: &[String]) -> usize {
        let mut inner = self.inner.write().unwrap();
        let entry = inner
            .values
            .entry(key.to_string())
            .or_insert_with(|| Value::List(VecDeque::new()));
        if !matches!(entry, Value::List(_)) {
            *entry = Value::List(VecDeque::new());
        }
        let Value::List(list) = entry else {
            unreachable!("just normalized to Value::List")
        };
        for v in values {
            list.push_front(v.clone());
        }
        list.len()
    }

    pub fn rpush(&self, key: &str, values: &[String]) -> usize {
        let mut inner = self.inner.write().unwrap();
        let entry = inner
            .values
            .entry(key.to_string())
            .or_insert_with(|| Value::List(VecDeque::new()));
        if !matches!(entry, Value::List(_)) {
            *entry = Value::List(VecDeque::new());
        }
        let Value::List(list) = entry else {
            unreachable!("just normalized to Value::List")
        };
        for v in values {
            list.push_back(v.clone());
        }
        list.len()
    }

    pub fn lpop(&self, key: &str) -> Option<String> {
        let mut inner = self.inner.write().unwrap();
        let (popped, emptied) = match inner.values.get_mut(key) {
            Some(Value::List(list)) => {
                let popped = list.pop_front();
                (popped, list.is_empty())
            }
            _ => (None, false),
        };
        if emptied {
            inner.values.remove(key);
        }
        popped
    }

    pub fn rpop(&self, key: &str) -> Option<String> {
        let mut inner = self.inner.write().unwrap();
        let (popped, emptied) = match inner.values.get_mut(key) {
            Some(Value::List(list)) => {
                let popped = list.pop_back();
                (popped, list.is_empty())
            }
            _ => (None, false),
        };
        if emptied {
            inner.values.remove(key);
        }
        popped
    }

    pub fn lrange(&self, key: &str, start: i64, end: i64) -> Vec<String> {
        let inner = self.inner.read().unwrap();
        let Some(Value::List(list)) = inner.values.get(key) else {
            return Vec::new();
        };
        let len = list.len() as i64;
        if len == 0 {
            return Vec::new();
        }
        let start = start.max(0);
        let end = end.min(len - 1);
        if start > end || start >= len {
            return Vec::new();
        }
        list.iter()
            .skip(start as usize)
            .take((end - start + 1) as usize)
            .cloned()
            .collect()
    }

    // ---- sets ----

    pub fn sadd(&self, key: &str, values: &[String]) -> usize {
        let mut inner = self.inner.write().unwrap();
        let entry = inner
            .values
            .entry(key.to_string())
            .or_insert_with(|| Value::Set(BTreeSet::new()));
        if !matches!(entry, Value::Set(_)) {
            *entry = Value::Set(BTreeSet::new());
        }
        let Value::Set(set) = entry else {
            unreachable!("just normalized to Value::Set")
        };
        values.iter().filter(|v| set.insert((*v).clone())).count()
    }

    pub fn srem(&self, key: &str, values: &[String]) -> usize {
        let mut inner = self.inner.write().unwrap();
        match inner.values.get_mut(key) {
            Some(Value::Set(set)) => values.iter().filter(|v| set.remove(*v)).count(),
            _ => 0,
        }
    }

    pub fn smembers(&self, key: &str) -> Vec<String> {
        let inner = self.inner.read().unwrap();
        match inner.values.get(key) {
            Some(Value::Set(set)) => set.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    // ---- reaper / snapshot support ----

    /// Sweeps every key whose expiry has elapsed. Returns the number evicted.
    pub fn sweep_expired(&self) -> usize {
        let now = Self::now_secs();
        let mut inner = self.inner.write().unwrap();
        let expired: Vec<String> = inner
            .expiries
            .iter()
            .filter(|(_, &ts)| ts != 0 && ts <= now)
            .map(|(k, _)| k.clone())
            .collect();
        for k in &expired {
            inner.values.remove(k);
            inner.expiries.remove(k);
        }
        expired.len()
    }

    /// Copies the full key space out under a shared lock, for snapshotting.
    pub fn export(&self) -> (HashMap<String, Value>, HashMap<String, i64>) {
        let inner = self.inner.read().unwrap();
        (inner.values.clone(), inner.expiries.clone())
    }

    /// Replaces the full key space wholesale under an exclusive lock, for
    /// snapshot load.
    pub fn import(&self, values: HashMap<String, Value>, expiries: HashMap<String, i64>) {
        let mut inner = self.inner.write().unwrap();
        inner.values = values;
        inner.expiries = expiries;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get() {
        let store = Store::new();
        store.set("foo", "bar");
        assert_eq!(store.get("foo"), Some("bar".to_string()));
        assert!(store.exists("foo"));
    }

    #[test]
    fn test_get_missing() {
        let store = Store::new();
        assert_eq!(store.get("nope"), None);
        assert!(!store.exists("nope"));
    }

    #[test]
    fn test_del() {
        let store = Store::new();
        store.set("foo", "bar");
        assert!(store.del("foo"));
        assert!(!store.del("foo"));
        assert_eq!(store.get("foo"), None);
    }

    #[test]
    fn test_set_preserves_ttl() {
        let store = Store::new();
        store.set("k", "v1");
        assert!(store.expire("k", 100));
        store.set("k", "v2");
        assert_eq!(store.get("k"), Some("v2".to_string()));
        assert!(store.ttl("k") > 0);
    }

    #[test]
    fn test_expire_and_ttl() {
        let store = Store::new();
        assert!(!store.expire("missing", 10));
        store.set("k", "v");
        assert_eq!(store.ttl("k"), -1);
        assert!(store.expire("k", 100));
        let ttl = store.ttl("k");
        assert!(ttl > 0 && ttl <= 100);
    }

    #[test]
    fn test_expire_immediate() {
        let store = Store::new();
        store.set("k", "v");
        assert!(store.expire("k", -1));
        assert_eq!(store.get("k"), None);
        assert_eq!(store.ttl("k"), -2);
    }

    #[test]
    fn test_lpush_rpush_lpop_rpop() {
        let store = Store::new();
        assert_eq!(store.lpush("l", &["a".into(), "b".into()]), 2);
        assert_eq!(store.rpush("l", &["c".into()]), 3);
        assert_eq!(store.lpop("l"), Some("b".to_string()));
        assert_eq!(store.rpop("l"), Some("c".to_string()));
        assert_eq!(store.lrange("l", 0, i64::MAX), vec!["a".to_string()]);
    }

    #[test]
    fn test_lpop_empties_key() {
        let store = Store::new();
        store.rpush("l", &["only".into()]);
        assert_eq!(store.lpop("l"), Some("only".to_string()));
        assert!(!store.exists("l"));
    }

    #[test]
    fn test_lrange_clamping() {
        let store = Store::new();
        store.rpush("l", &["a".into(), "b".into(), "c".into()]);
        assert_eq!(store.lrange("l", -5, 100), vec!["a", "b", "c"]);
        assert_eq!(store.lrange("l", 5, 10), Vec::<String>::new());
    }

    #[test]
    fn test_sadd_srem_smembers_sorted() {
        let store = Store::new();
        assert_eq!(store.sadd("s", &["b".into(), "a".into(), "b".into()]), 2);
        assert_eq!(store.sadd("s", &["a".into()]), 0);
        assert_eq!(store.smembers("s"), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.srem("s", &["a".into()]), 1);
        assert_eq!(store.smembers("s"), vec!["b".to_string()]);
    }

    #[test]
    fn test_kind_switch_list_to_string() {
        let store = Store::new();
        store.rpush("k", &["a".into()]);
        store.set("k", "str");
        assert_eq!(store.get("k"), Some("str".to_string()));
        assert_eq!(store.lrange("k", 0, -1), Vec::<String>::new());
    }

    #[test]
    fn test_keys_sorted() {
        let store = Store::new();
        store.set("banana", "1");
        store.set("apple", "1");
        store.set("cherry", "1");
        assert_eq!(store.keys(), vec!["apple", "banana", "cherry"]);
    }

    #[test]
    fn test_flushdb_clears_expiries_too() {
        let store = Store::new();
        store.set("k", "v");
        store.expire("k", 100);
        store.flushdb();
        assert_eq!(store.len(), 0);
        assert_eq!(store.ttl("k"), -2);
    }

    #[test]
    fn test_sweep_expired() {
        let store = Store::new();
        store.set("k", "v");
        store.expire("k", -5);
        assert_eq!(store.sweep_expired(), 1);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let store = Store::new();
        store.set("a", "1");
        store.rpush("l", &["x".into()]);
        store.expire("a", 1000);
        let (values, expiries) = store.export();

        let restored = Store::new();
        restored.import(values, expiries);
        assert_eq!(restored.get("a"), Some("1".to_string()));
        assert!(restored.ttl("a") > 0);
        assert_eq!(restored.lrange("l", 0, i64::MAX), vec!["x".to_string()]);
    }
}
