use std::sync::{Arc, Mutex};

/// A lock-guarded list used to hand work from one pipeline stage to the next.
///
/// Workers `push` (or `push_all`) from any thread; the coordinator calls `drain`
/// once per tick, which swaps the contents out under the lock and returns them.
/// The critical section never covers the processing of the drained entries, so a
/// worker appending mid-tick lands in the next drain instead of being processed
/// twice or dropped.
///
/// Entries come back in insertion order. Appends from different threads interleave
/// in whatever order they acquired the lock.
///
/// # Examples
///
/// ```
/// use voxel_terrain::core::Mailbox;
///
/// let mailbox = Mailbox::new();
/// mailbox.push(1);
/// mailbox.push_all(vec![2, 3]);
///
/// assert_eq!(mailbox.drain(), vec![1, 2, 3]);
/// assert!(mailbox.is_empty());
/// ```
pub struct Mailbox<T: Send> {
    entries: Arc<Mutex<Vec<T>>>,
}

impl<T: Send> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Appends a single entry.
    pub fn push(&self, entry: T) {
        self.entries.lock().unwrap().push(entry);
    }

    /// Appends every entry of `batch` within one critical section, so no drain can
    /// observe only part of the batch.
    pub fn push_all(&self, batch: impl IntoIterator<Item = T>) {
        let mut entries = self.entries.lock().unwrap();
        entries.extend(batch);
    }

    /// Moves the whole contents out and leaves the mailbox empty.
    pub fn drain(&self) -> Vec<T> {
        std::mem::take(&mut *self.entries.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Send> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn drain_empties_the_mailbox() {
        let mailbox = Mailbox::new();
        mailbox.push("a");
        mailbox.push("b");

        assert_eq!(mailbox.drain(), vec!["a", "b"]);
        assert!(mailbox.drain().is_empty());
    }

    #[test]
    fn concurrent_batches_stay_contiguous() {
        let mailbox = Mailbox::new();
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let mailbox = mailbox.clone();
                thread::spawn(move || {
                    mailbox.push_all((0..16).map(|i| worker * 100 + i));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let drained = mailbox.drain();
        assert_eq!(drained.len(), 8 * 16);
        for batch in drained.chunks(16) {
            let worker = batch[0] / 100;
            assert!(batch.iter().enumerate().all(|(i, v)| *v == worker * 100 + i as i32));
        }
    }
}
