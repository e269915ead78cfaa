use std::sync::{Mutex, MutexGuard};

/// Last-in-first-out queue of archive paths waiting to be extracted.
///
/// Shared by every worker of an unzip pass; each pushed path is handed out by
/// [`ArchiveQueue::pop`] exactly once.
#[derive(Debug, Default)]
pub struct ArchiveQueue {
    items: Mutex<Vec<String>>,
}

impl ArchiveQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> MutexGuard<'_, Vec<String>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, path: impl Into<String>) {
        self.items().push(path.into());
    }

    /// Take the most recently pushed path, or `None` once the queue is drained
    pub fn pop(&self) -> Option<String> {
        self.items().pop()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ArchiveQueue {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            items: Mutex::new(iter.into_iter().map(Into::into).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_pop_is_lifo() {
        let queue: ArchiveQueue = ["a.zip", "b.zip", "c.zip"].into_iter().collect();
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop().as_deref(), Some("c.zip"));
        assert_eq!(queue.pop().as_deref(), Some("b.zip"));
        queue.push("d.zip");
        assert_eq!(queue.pop().as_deref(), Some("d.zip"));
        assert_eq!(queue.pop().as_deref(), Some("a.zip"));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_concurrent_pop_hands_out_each_path_once() {
        let queue: Arc<ArchiveQueue> = Arc::new((0..500).map(|i| format!("{i}.jar")).collect());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let queue = Arc::clone(&queue);
            handles.push(thread::spawn(move || {
                let mut taken = Vec::new();
                while let Some(path) = queue.pop() {
                    taken.push(path);
                }
                taken
            }));
        }

        let mut seen = HashSet::new();
        let mut total = 0;
        for handle in handles {
            for path in handle.join().unwrap() {
                total += 1;
                assert!(seen.insert(path), "path popped twice");
            }
        }
        assert_eq!(total, 500);
        assert!(queue.is_empty());
    }
}
