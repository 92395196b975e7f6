use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};
use tokio::sync::mpsc;

/// In-memory subscribe-and-push tree store. Values live in one JSON tree
/// addressed by slash-delimited paths (`rooms/{id}/questions/{id}`); every
/// mutation pushes a fresh snapshot to the subscriptions it overlaps.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    root: Value,
    next_watcher: u64,
    watchers: HashMap<u64, Watcher>,
}

struct Watcher {
    path: Vec<String>,
    tx: mpsc::UnboundedSender<Value>,
}

pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<Value>,
    inner: Arc<Mutex<Inner>>,
}

impl Store {
    pub fn new() -> Store {
        Store {
            inner: Arc::new(Mutex::new(Inner {
                root: Value::Object(Map::new()),
                next_watcher: 0,
                watchers: HashMap::new(),
            })),
        }
    }

    /// One-shot snapshot of the subtree at `path`, `Null` if absent.
    pub fn read_once(&self, path: &str) -> Value {
        let segs = segments(path);
        let inner = lock(&self.inner);
        snapshot_at(&inner.root, &segs)
    }

    /// Full replace of the subtree at `path`. Missing intermediate nodes are
    /// created as objects, so a write under a concurrently removed parent
    /// recreates it instead of failing.
    pub fn write(&self, path: &str, value: Value) {
        let segs = segments(path);
        let mut inner = lock(&self.inner);
        *node_make(&mut inner.root, &segs) = value;
        notify(&mut inner, &segs);
    }

    /// Merge the entries of a JSON object into the subtree at `path`,
    /// leaving sibling fields alone. Anything that is not an object merges
    /// as a full replace.
    pub fn patch(&self, path: &str, fields: Value) {
        let segs = segments(path);
        let mut inner = lock(&self.inner);
        let node = node_make(&mut inner.root, &segs);
        match fields {
            Value::Object(fields) => {
                if !node.is_object() {
                    *node = Value::Object(Map::new());
                }
                let Value::Object(map) = node else { unreachable!() };
                for (key, value) in fields {
                    map.insert(key, value);
                }
            }
            fields => *node = fields,
        }
        notify(&mut inner, &segs);
    }

    /// Delete the subtree at `path` and all descendants. Absent paths are
    /// left alone and nobody is notified.
    pub fn remove(&self, path: &str) {
        let segs = segments(path);
        let Some((last, parent)) = segs.split_last() else {
            let mut inner = lock(&self.inner);
            inner.root = Value::Object(Map::new());
            notify(&mut inner, &segs);
            return;
        };

        let mut inner = lock(&self.inner);
        let removed = node_mut(&mut inner.root, parent)
            .and_then(Value::as_object_mut)
            .and_then(|map| map.remove(last));
        if removed.is_some() {
            notify(&mut inner, &segs);
        }
    }

    /// Register a listener on the subtree at `path`. The current snapshot is
    /// delivered immediately, then one snapshot per overlapping mutation.
    /// Dropping the subscription unregisters the watcher.
    pub fn subscribe(&self, path: &str) -> Subscription {
        let segs = segments(path);
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = lock(&self.inner);
        let _ = tx.send(snapshot_at(&inner.root, &segs));
        let id = inner.next_watcher;
        inner.next_watcher += 1;
        inner.watchers.insert(id, Watcher { path: segs, tx });
        Subscription { id, rx, inner: Arc::clone(&self.inner) }
    }
}

impl Default for Store {
    fn default() -> Store {
        Store::new()
    }
}

impl Subscription {
    /// Next snapshot of the subscribed subtree. `None` once the store itself
    /// is gone.
    pub async fn changed(&mut self) -> Option<Value> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        lock(&self.inner).watchers.remove(&self.id);
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|seg| !seg.is_empty())
        .map(str::to_owned)
        .collect()
}

fn node<'a>(root: &'a Value, segs: &[String]) -> Option<&'a Value> {
    segs.iter().try_fold(root, |value, seg| value.get(seg))
}

fn node_mut<'a>(root: &'a mut Value, segs: &[String]) -> Option<&'a mut Value> {
    segs.iter().try_fold(root, |value, seg| value.get_mut(seg))
}

fn node_make<'a>(root: &'a mut Value, segs: &[String]) -> &'a mut Value {
    let mut cur = root;
    for seg in segs {
        if !cur.is_object() {
            *cur = Value::Object(Map::new());
        }
        let Value::Object(map) = cur else { unreachable!() };
        cur = map.entry(seg.as_str()).or_insert(Value::Null);
    }
    cur
}

fn snapshot_at(root: &Value, segs: &[String]) -> Value {
    node(root, segs).cloned().unwrap_or(Value::Null)
}

// A change at `changed` reaches a watcher when either path is a prefix of
// the other: a room watcher sees its questions change, a question watcher
// sees its room removed.
fn overlaps(watched: &[String], changed: &[String]) -> bool {
    watched.iter().zip(changed).all(|(a, b)| a == b)
}

fn notify(inner: &mut Inner, changed: &[String]) {
    let Inner { root, watchers, .. } = inner;
    watchers.retain(|_, watcher| {
        if overlaps(&watcher.path, changed) {
            watcher.tx.send(snapshot_at(root, &watcher.path)).is_ok()
        } else {
            !watcher.tx.is_closed()
        }
    });
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn write_then_read_once() {
        let store = Store::new();
        store.write("rooms/r1", json!({"title": "Demo", "authorId": "u1"}));
        assert_eq!(
            store.read_once("rooms/r1"),
            json!({"title": "Demo", "authorId": "u1"})
        );
        assert_eq!(store.read_once("rooms/r1/title"), json!("Demo"));
        assert_eq!(store.read_once("rooms/missing"), Value::Null);
    }

    #[test]
    fn write_creates_missing_parents() {
        let store = Store::new();
        store.write("rooms/r1/questions/q1/likes/l1", json!({"authorId": "u2"}));
        assert_eq!(
            store.read_once("rooms/r1/questions/q1/likes"),
            json!({"l1": {"authorId": "u2"}})
        );
    }

    #[test]
    fn patch_merges_without_disturbing_siblings() {
        let store = Store::new();
        store.write("rooms/r1/questions/q1", json!({
            "content": "why?",
            "isAnswered": false,
            "isHighlighted": false,
        }));
        store.patch("rooms/r1/questions/q1", json!({"isAnswered": true}));
        assert_eq!(store.read_once("rooms/r1/questions/q1"), json!({
            "content": "why?",
            "isAnswered": true,
            "isHighlighted": false,
        }));
    }

    #[test]
    fn patch_is_idempotent() {
        let store = Store::new();
        store.write("rooms/r1/questions/q1", json!({"content": "why?"}));
        store.patch("rooms/r1/questions/q1", json!({"isAnswered": true}));
        let once = store.read_once("rooms/r1");
        store.patch("rooms/r1/questions/q1", json!({"isAnswered": true}));
        assert_eq!(store.read_once("rooms/r1"), once);
    }

    #[test]
    fn remove_deletes_subtree() {
        let store = Store::new();
        store.write("rooms/r1/questions/q1", json!({"content": "why?"}));
        store.write("rooms/r1/questions/q2", json!({"content": "how?"}));
        store.remove("rooms/r1/questions/q1");
        assert_eq!(store.read_once("rooms/r1/questions/q1"), Value::Null);
        assert_eq!(
            store.read_once("rooms/r1/questions"),
            json!({"q2": {"content": "how?"}})
        );
    }

    #[tokio::test]
    async fn subscribe_delivers_current_snapshot_first() {
        let store = Store::new();
        store.write("rooms/r1", json!({"title": "Demo", "authorId": "u1"}));
        let mut sub = store.subscribe("rooms/r1");
        assert_eq!(
            sub.changed().await,
            Some(json!({"title": "Demo", "authorId": "u1"}))
        );
    }

    #[tokio::test]
    async fn descendant_change_reaches_room_watcher() {
        let store = Store::new();
        store.write("rooms/r1", json!({"title": "Demo", "authorId": "u1"}));
        let mut sub = store.subscribe("rooms/r1");
        let _ = sub.changed().await;

        store.write("rooms/r1/questions/q1", json!({"content": "why?"}));
        let snapshot = sub.changed().await.unwrap();
        assert_eq!(snapshot["questions"]["q1"]["content"], json!("why?"));
    }

    #[tokio::test]
    async fn ancestor_removal_reaches_question_watcher() {
        let store = Store::new();
        store.write("rooms/r1/questions/q1", json!({"content": "why?"}));
        let mut sub = store.subscribe("rooms/r1/questions/q1");
        let _ = sub.changed().await;

        store.remove("rooms/r1");
        assert_eq!(sub.changed().await, Some(Value::Null));
    }

    #[tokio::test]
    async fn overlapping_subscriptions_are_independent() {
        let store = Store::new();
        let mut room_sub = store.subscribe("rooms/r1");
        let question_sub = store.subscribe("rooms/r1/questions/q1");
        let _ = room_sub.changed().await;
        drop(question_sub);

        store.write("rooms/r1", json!({"title": "Demo", "authorId": "u1"}));
        assert_eq!(
            room_sub.changed().await,
            Some(json!({"title": "Demo", "authorId": "u1"}))
        );
    }

    #[tokio::test]
    async fn dropping_a_subscription_releases_its_watcher() {
        let store = Store::new();
        let sub = store.subscribe("rooms/r1");
        assert_eq!(lock(&store.inner).watchers.len(), 1);
        drop(sub);
        assert!(lock(&store.inner).watchers.is_empty());
    }

    #[tokio::test]
    async fn unrelated_paths_do_not_notify() {
        let store = Store::new();
        let mut sub = store.subscribe("rooms/r1");
        let _ = sub.changed().await;

        store.write("rooms/r2", json!({"title": "Other", "authorId": "u9"}));
        store.write("rooms/r1", json!({"title": "Mine", "authorId": "u1"}));
        // the r2 write must not have queued anything for r1
        assert_eq!(
            sub.changed().await,
            Some(json!({"title": "Mine", "authorId": "u1"}))
        );
    }
}
